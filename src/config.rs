//! Reporter configuration and the tracking flag store.

use std::sync::{Arc, RwLock};

use log::info;
use serde::{Deserialize, Serialize};

use crate::zones::GeofenceTransition;
use crate::{ReporterError, Result, TrackingFlags};

/// Power/accuracy tradeoff requested from the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum Priority {
    HighAccuracy,
    BalancedPowerAccuracy,
    LowPower,
    NoPower,
}

/// Policy for the continuous location subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct LocationRequest {
    /// Desired reporting interval.
    /// Default: 60 000 ms
    pub interval_ms: u64,

    /// Fastest interval the app accepts when other apps request fixes.
    /// Default: 30 000 ms
    pub fastest_interval_ms: u64,

    /// Maximum time fixes may be batched before delivery.
    /// Default: 300 000 ms
    pub max_wait_time_ms: u64,

    /// Default: BalancedPowerAccuracy
    pub priority: Priority,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            interval_ms: 60_000,
            fastest_interval_ms: 30_000,
            max_wait_time_ms: 300_000,
            priority: Priority::BalancedPowerAccuracy,
        }
    }
}

impl LocationRequest {
    /// Check the intervals are consistent with each other.
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(ReporterError::ConfigError {
                message: "interval_ms must be greater than zero".to_string(),
            });
        }
        if self.fastest_interval_ms > self.interval_ms {
            return Err(ReporterError::ConfigError {
                message: format!(
                    "fastest_interval_ms ({}) exceeds interval_ms ({})",
                    self.fastest_interval_ms, self.interval_ms
                ),
            });
        }
        Ok(())
    }
}

/// Configuration for the dispatch pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct ReporterConfig {
    /// Continuous location subscription policy
    pub location_request: LocationRequest,

    /// Transitions every zone geofence triggers on.
    /// Default: Enter and Exit
    pub geofence_transitions: Vec<GeofenceTransition>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            location_request: LocationRequest::default(),
            geofence_transitions: vec![GeofenceTransition::Enter, GeofenceTransition::Exit],
        }
    }
}

impl ReporterConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| ReporterError::ConfigError {
            message: format!("Invalid config JSON: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.location_request.validate()?;
        if self.geofence_transitions.is_empty() {
            return Err(ReporterError::ConfigError {
                message: "geofence_transitions must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tracking Settings
// ============================================================================

/// Shared store for the user's tracking flags.
///
/// The host app writes to it when settings change; the tracking policy reads
/// it on every setup, so a change applies from the next boot or re-arm
/// request onward. Clones share the same flags.
#[derive(Debug, Clone, Default)]
pub struct TrackingSettings {
    flags: Arc<RwLock<TrackingFlags>>,
}

impl TrackingSettings {
    pub fn new(flags: TrackingFlags) -> Self {
        Self {
            flags: Arc::new(RwLock::new(flags)),
        }
    }

    /// Current flags.
    pub fn flags(&self) -> TrackingFlags {
        match self.flags.read() {
            Ok(flags) => *flags,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Replace the flags.
    pub fn set_flags(&self, flags: TrackingFlags) {
        info!(
            "[TrackingSettings] background={} zones={}",
            flags.background_tracking_enabled, flags.zone_tracking_enabled
        );
        match self.flags.write() {
            Ok(mut current) => *current = flags,
            Err(poisoned) => *poisoned.into_inner() = flags,
        }
    }
}
