//! Capability traits the host platform supplies to the pipeline.
//!
//! Platform calls (permissions, subscriptions, battery) are synchronous. Calls
//! that may reach the network (flags, zones, submission) are async and only
//! ever run inside tasks on the [`TaskQueue`](crate::TaskQueue).

use std::sync::Arc;

use async_trait::async_trait;

use crate::battery::BatterySnapshot;
use crate::config::LocationRequest;
use crate::zones::GeofencingRequest;
use crate::{LocationUpdate, Result, ZoneDefinition};

/// Callback identity of the continuous location subscription.
pub const LOCATION_CALLBACK_ID: &str = "location_reporter.location_updates";

/// Callback identity of the zone geofence subscription.
pub const GEOFENCE_CALLBACK_ID: &str = "location_reporter.zone_updates";

pub trait PermissionChecker: Send + Sync {
    fn has_coarse_location_permission(&self) -> bool;
}

/// Continuous location registrations with the OS, keyed by callback id.
pub trait LocationSubscriptionProvider: Send + Sync {
    /// Remove the registration for `id`, if any.
    fn clear_location_subscription(&self, id: &str);

    fn add_location_subscription(&self, id: &str, request: &LocationRequest);
}

/// Geofence registrations with the OS, keyed by callback id.
pub trait GeofenceSubscriptionProvider: Send + Sync {
    /// Remove the registration for `id`, if any.
    fn clear_geofence_subscription(&self, id: &str);

    fn add_geofence_subscription(&self, id: &str, request: &GeofencingRequest);
}

/// Remote configuration: tracking flags and the zone list.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn is_background_tracking_enabled(&self) -> Result<bool>;

    async fn is_zone_tracking_enabled(&self) -> Result<bool>;

    async fn get_zones(&self) -> Result<Vec<ZoneDefinition>>;
}

/// The integration client that transmits location updates.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit_location_update(&self, update: &LocationUpdate) -> Result<()>;
}

pub trait BatterySource: Send + Sync {
    /// Take a fresh snapshot of the battery state.
    fn current_battery_snapshot(&self) -> BatterySnapshot;
}

/// All collaborators, supplied once at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub permissions: Arc<dyn PermissionChecker>,
    pub locations: Arc<dyn LocationSubscriptionProvider>,
    pub geofences: Arc<dyn GeofenceSubscriptionProvider>,
    pub config: Arc<dyn ConfigSource>,
    pub submitter: Arc<dyn Submitter>,
    pub battery: Arc<dyn BatterySource>,
}
