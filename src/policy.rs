//! Tracking policy: which subscriptions should be active.
//!
//! Two independent flags decide the outcome. Background tracking arms the
//! continuous location subscription, zone tracking arms one geofence per
//! remote zone. Flags are evaluated fresh on every setup, never cached, and a
//! query that fails counts as "disabled" for that setup.
//!
//! Re-registration is unconditional clear-then-add under a fixed callback id,
//! so running setup any number of times converges on the same state.

use std::sync::Arc;

use futures::FutureExt;
use log::{debug, info, warn};

use crate::collaborators::{
    Collaborators, ConfigSource, GeofenceSubscriptionProvider, LocationSubscriptionProvider,
    PermissionChecker, GEOFENCE_CALLBACK_ID, LOCATION_CALLBACK_ID,
};
use crate::config::ReporterConfig;
use crate::scheduler::TaskQueue;
use crate::zones::build_geofencing_request;
use crate::{ReporterError, Result};

/// Decides and applies the active subscriptions.
#[derive(Clone)]
pub struct TrackingPolicy {
    permissions: Arc<dyn PermissionChecker>,
    locations: Arc<dyn LocationSubscriptionProvider>,
    geofences: Arc<dyn GeofenceSubscriptionProvider>,
    config_source: Arc<dyn ConfigSource>,
    queue: Arc<dyn TaskQueue>,
    config: ReporterConfig,
}

impl TrackingPolicy {
    pub fn new(
        collaborators: &Collaborators,
        queue: Arc<dyn TaskQueue>,
        config: ReporterConfig,
    ) -> Self {
        Self {
            permissions: Arc::clone(&collaborators.permissions),
            locations: Arc::clone(&collaborators.locations),
            geofences: Arc::clone(&collaborators.geofences),
            config_source: Arc::clone(&collaborators.config),
            queue,
            config,
        }
    }

    /// (Re)arm subscriptions according to the current flags.
    ///
    /// Fails with `PermissionDenied` when coarse location isn't granted; nothing
    /// is scheduled in that case. Otherwise the flag queries and subscription
    /// changes run as one fire-and-forget task.
    pub fn setup_tracking(&self) -> Result<()> {
        if !self.permissions.has_coarse_location_permission() {
            return Err(ReporterError::PermissionDenied);
        }

        let policy = self.clone();
        self.queue.submit(async move { policy.apply().await }.boxed());
        Ok(())
    }

    async fn apply(&self) {
        match self.config_source.is_background_tracking_enabled().await {
            Ok(true) => self.request_location_updates(),
            Ok(false) => debug!("[TrackingPolicy] Background tracking disabled"),
            Err(e) => warn!(
                "[TrackingPolicy] Background tracking flag unavailable, treating as disabled: {}",
                e
            ),
        }

        match self.config_source.is_zone_tracking_enabled().await {
            Ok(true) => self.request_zone_updates().await,
            Ok(false) => debug!("[TrackingPolicy] Zone tracking disabled"),
            Err(e) => warn!(
                "[TrackingPolicy] Zone tracking flag unavailable, treating as disabled: {}",
                e
            ),
        }
    }

    fn request_location_updates(&self) {
        let request = &self.config.location_request;
        info!(
            "[TrackingPolicy] Registering location updates (interval={}ms, fastest={}ms, max_wait={}ms, {:?})",
            request.interval_ms, request.fastest_interval_ms, request.max_wait_time_ms, request.priority
        );

        self.locations.clear_location_subscription(LOCATION_CALLBACK_ID);
        self.locations
            .add_location_subscription(LOCATION_CALLBACK_ID, request);
    }

    async fn request_zone_updates(&self) {
        let zones = match self.config_source.get_zones().await {
            Ok(zones) => zones,
            Err(e) => {
                warn!(
                    "[TrackingPolicy] Zone list unavailable, leaving geofences untouched: {}",
                    e
                );
                return;
            }
        };

        let request = build_geofencing_request(&zones, &self.config.geofence_transitions);

        self.geofences.clear_geofence_subscription(GEOFENCE_CALLBACK_ID);
        match request {
            Some(request) => {
                info!(
                    "[TrackingPolicy] Registering {} zone geofences",
                    request.geofences.len()
                );
                self.geofences
                    .add_geofence_subscription(GEOFENCE_CALLBACK_ID, &request);
            }
            None => info!(
                "[TrackingPolicy] No usable zones among {} received, geofencing cleared",
                zones.len()
            ),
        }
    }
}
