//! FFI bindings for mobile platforms (iOS/Android).
//!
//! This module provides the UniFFI bindings that expose the dispatcher to
//! Kotlin and Swift. The host implements [`PlatformBridge`] for everything
//! that lives in the OS (permissions, subscriptions, battery); remote calls go
//! through the integration webhook, and scheduled work runs on the shared
//! app-lifetime runtime.

use std::sync::Arc;

use log::info;

use crate::collaborators::{
    BatterySource, Collaborators, GeofenceSubscriptionProvider, LocationSubscriptionProvider,
    PermissionChecker,
};
use crate::http::{IntegrationClient, IntegrationConfigSource};
use crate::scheduler::TokioTaskQueue;
use crate::{
    init_logging, BatterySnapshot, EventDispatcher, GeofencingRequest, InboundEvent,
    LocationRequest, ReporterConfig, ReporterError, TrackingFlags, TrackingSettings,
};

// ============================================================================
// Callback Interfaces
// ============================================================================

/// OS capabilities supplied by the host app.
/// Implement this in Kotlin/Swift.
#[uniffi::export(callback_interface)]
pub trait PlatformBridge: Send + Sync {
    fn has_coarse_location_permission(&self) -> bool;

    /// Remove the location registration under `id`, if any.
    fn clear_location_subscription(&self, id: String);

    fn add_location_subscription(&self, id: String, request: LocationRequest);

    /// Remove the geofence registration under `id`, if any.
    fn clear_geofence_subscription(&self, id: String);

    fn add_geofence_subscription(&self, id: String, request: GeofencingRequest);

    /// Current battery level/scale, -1 for values the OS can't report.
    fn battery_snapshot(&self) -> BatterySnapshot;
}

/// Adapts the single host callback to the individual capability traits.
struct BridgeAdapter {
    bridge: Box<dyn PlatformBridge>,
}

impl PermissionChecker for BridgeAdapter {
    fn has_coarse_location_permission(&self) -> bool {
        self.bridge.has_coarse_location_permission()
    }
}

impl LocationSubscriptionProvider for BridgeAdapter {
    fn clear_location_subscription(&self, id: &str) {
        self.bridge.clear_location_subscription(id.to_string());
    }

    fn add_location_subscription(&self, id: &str, request: &LocationRequest) {
        self.bridge
            .add_location_subscription(id.to_string(), request.clone());
    }
}

impl GeofenceSubscriptionProvider for BridgeAdapter {
    fn clear_geofence_subscription(&self, id: &str) {
        self.bridge.clear_geofence_subscription(id.to_string());
    }

    fn add_geofence_subscription(&self, id: &str, request: &GeofencingRequest) {
        self.bridge
            .add_geofence_subscription(id.to_string(), request.clone());
    }
}

impl BatterySource for BridgeAdapter {
    fn current_battery_snapshot(&self) -> BatterySnapshot {
        self.bridge.battery_snapshot()
    }
}

// ============================================================================
// Reporter Object
// ============================================================================

/// Get the default reporter configuration.
#[uniffi::export]
pub fn default_reporter_config() -> ReporterConfig {
    ReporterConfig::default()
}

/// Dispatcher handle owned by the host app for its whole lifetime.
#[derive(uniffi::Object)]
pub struct LocationReporter {
    dispatcher: EventDispatcher,
    settings: TrackingSettings,
}

#[uniffi::export]
impl LocationReporter {
    /// Create a reporter with the default configuration.
    #[uniffi::constructor]
    pub fn new(
        webhook_url: String,
        flags: TrackingFlags,
        bridge: Box<dyn PlatformBridge>,
    ) -> Result<Arc<Self>, ReporterError> {
        Self::with_config(webhook_url, flags, bridge, ReporterConfig::default())
    }

    /// Create a reporter with a custom configuration.
    #[uniffi::constructor]
    pub fn with_config(
        webhook_url: String,
        flags: TrackingFlags,
        bridge: Box<dyn PlatformBridge>,
        config: ReporterConfig,
    ) -> Result<Arc<Self>, ReporterError> {
        init_logging();
        config.validate()?;

        let client = Arc::new(IntegrationClient::new(&webhook_url)?);
        let settings = TrackingSettings::new(flags);
        let adapter = Arc::new(BridgeAdapter { bridge });

        let collaborators = Collaborators {
            permissions: adapter.clone(),
            locations: adapter.clone(),
            geofences: adapter.clone(),
            config: Arc::new(IntegrationConfigSource::new(
                settings.clone(),
                Arc::clone(&client),
            )),
            submitter: client,
            battery: adapter,
        };

        let queue = Arc::new(TokioTaskQueue::global()?);
        info!(
            "[LocationReporter] Created (background={}, zones={})",
            flags.background_tracking_enabled, flags.zone_tracking_enabled
        );

        Ok(Arc::new(Self {
            dispatcher: EventDispatcher::new(collaborators, queue, config),
            settings,
        }))
    }

    /// Handle an inbound platform event. Never throws.
    pub fn handle_event(&self, event: InboundEvent) {
        init_logging();
        self.dispatcher.handle(&event);
    }

    /// Store new tracking flags; they apply from the next re-arm onward.
    pub fn set_tracking_flags(&self, flags: TrackingFlags) {
        init_logging();
        self.settings.set_flags(flags);
    }

    pub fn tracking_flags(&self) -> TrackingFlags {
        self.settings.flags()
    }
}
