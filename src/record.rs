//! Conversion of raw fixes into canonical location update records.

use crate::{LocationSample, LocationUpdate};

/// Build the outbound record for a fix.
///
/// Float measurements are narrowed with `as`, which truncates toward zero
/// (12.9 -> 12, -0.5 -> 0) and maps NaN to 0. A missing vertical accuracy is
/// reported as 0. The battery reading is passed through untouched so that an
/// unreadable battery stays `None`.
pub fn build_location_update(sample: &LocationSample, battery: Option<i32>) -> LocationUpdate {
    LocationUpdate {
        gps: sample.point(),
        accuracy: sample.accuracy as i32,
        battery,
        speed: sample.speed as i32,
        altitude: sample.altitude as i32,
        bearing: sample.bearing as i32,
        vertical_accuracy: sample.vertical_accuracy.map_or(0, |v| v as i32),
    }
}
