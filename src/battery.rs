//! Battery percentage from a platform battery snapshot.

use serde::{Deserialize, Serialize};

/// Sentinel the platform uses for an unreadable charge value.
pub const UNAVAILABLE: i32 = -1;

/// Current and maximum battery charge units, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct BatterySnapshot {
    /// Current charge level, or -1 if unavailable
    pub level: i32,
    /// Maximum charge level, or -1 if unavailable
    pub scale: i32,
}

impl BatterySnapshot {
    pub fn new(level: i32, scale: i32) -> Self {
        Self { level, scale }
    }

    /// A snapshot for a platform that reports nothing.
    pub fn unavailable() -> Self {
        Self::new(UNAVAILABLE, UNAVAILABLE)
    }
}

/// Read the battery percentage from a snapshot.
///
/// Returns `None` when either value is unavailable. A missing reading must not
/// be reported as 0%, which is a meaningful level.
///
/// # Example
/// ```
/// use location_reporter::{read_battery_percent, BatterySnapshot};
///
/// assert_eq!(read_battery_percent(&BatterySnapshot::new(75, 100)), Some(75));
/// assert_eq!(read_battery_percent(&BatterySnapshot::new(-1, 100)), None);
/// ```
pub fn read_battery_percent(snapshot: &BatterySnapshot) -> Option<i32> {
    // Negative levels and non-positive scales can't produce a percentage
    if snapshot.level < 0 || snapshot.scale <= 0 {
        return None;
    }

    let percent = (snapshot.level as f32 / snapshot.scale as f32 * 100.0).round() as i32;
    Some(percent.min(100))
}
