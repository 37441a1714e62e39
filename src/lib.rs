//! # Location Reporter
//!
//! Location event dispatch and reporting core for mobile companion apps.
//!
//! This library provides:
//! - Classification of inbound platform events (boot, re-arm requests,
//!   location fixes, geofence transitions)
//! - Feature-flag driven subscription setup for continuous location and zones
//! - Normalization of raw fixes into canonical location update records
//! - Best-effort, fire-and-forget submission to the integration endpoint
//!
//! ## Features
//!
//! - **`http`** - Enable the HTTP webhook client for the integration endpoint
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use location_reporter::{build_location_update, LocationSample};
//!
//! let sample = LocationSample {
//!     latitude: 51.5074,
//!     longitude: -0.1278,
//!     accuracy: 12.9,
//!     speed: 3.7,
//!     altitude: -0.5,
//!     bearing: 359.99,
//!     vertical_accuracy: None,
//! };
//!
//! let update = build_location_update(&sample, Some(80));
//! assert_eq!(update.accuracy, 12);
//! assert_eq!(update.bearing, 359);
//! assert_eq!(update.vertical_accuracy, 0);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, ReporterError, Result};

// Configuration (location request policy, tracking flag store)
pub mod config;
pub use config::{LocationRequest, Priority, ReporterConfig, TrackingSettings};

// Battery percentage from platform snapshots
pub mod battery;
pub use battery::{read_battery_percent, BatterySnapshot};

// Raw sample -> canonical update record
pub mod record;
pub use record::build_location_update;

// Zone definitions -> geofencing request
pub mod zones;
pub use zones::{
    build_geofencing_request, Geofence, GeofenceTransition, GeofencingRequest,
};

// Capability traits supplied by the host platform
pub mod collaborators;
pub use collaborators::{
    BatterySource, Collaborators, ConfigSource, GeofenceSubscriptionProvider,
    LocationSubscriptionProvider, PermissionChecker, Submitter, GEOFENCE_CALLBACK_ID,
    LOCATION_CALLBACK_ID,
};

// Fire-and-forget task queue
pub mod scheduler;
pub use scheduler::{InlineTaskQueue, TaskQueue, TokioTaskQueue};

// Best-effort update submission
pub mod submitter;
pub use submitter::UpdateSubmitter;

// Feature-flag driven subscription setup
pub mod policy;
pub use policy::TrackingPolicy;

// Inbound event classification and routing
pub mod dispatcher;
pub use dispatcher::{EventDispatcher, GeofencingEvent, InboundEvent, Trigger};

// HTTP client for the integration webhook
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::{IntegrationClient, IntegrationConfigSource};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("LocationReporter"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use location_reporter::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A raw fix as delivered by the platform location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters
    pub accuracy: f32,
    /// Speed in m/s
    pub speed: f32,
    /// Altitude in meters
    pub altitude: f32,
    /// Bearing in degrees
    pub bearing: f32,
    /// Vertical accuracy in meters (not reported by older platforms)
    pub vertical_accuracy: Option<f32>,
}

impl LocationSample {
    /// Coordinates of this sample.
    pub fn point(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }
}

/// Canonical location record sent to the integration endpoint.
///
/// All measurements are truncated toward zero to whole units when the record
/// is built; the remote schema only accepts integers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LocationUpdate {
    pub gps: GpsPoint,
    /// Horizontal accuracy in meters
    pub accuracy: i32,
    /// Battery percentage (0-100), None when the platform cannot report it
    pub battery: Option<i32>,
    /// Speed in m/s
    pub speed: i32,
    /// Altitude in meters
    pub altitude: i32,
    /// Bearing in degrees
    pub bearing: i32,
    /// Vertical accuracy in meters, 0 when unavailable
    pub vertical_accuracy: i32,
}

/// A remotely configured zone to monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ZoneDefinition {
    /// Unique entity identifier (e.g., "zone.home")
    pub entity_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in meters
    pub radius: f32,
}

/// The two independent feature flags governing tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TrackingFlags {
    pub background_tracking_enabled: bool,
    pub zone_tracking_enabled: bool,
}

// ============================================================================
// Tests
// ============================================================================
