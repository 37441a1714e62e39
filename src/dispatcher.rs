//! # Event Dispatcher
//!
//! Entry point for platform events. Each inbound event is classified by its
//! action identifier and routed:
//!
//! - boot completed / request updates -> tracking setup
//! - process location -> report the **last** fix of the batch
//! - process geofence -> report the triggering location, unless the event
//!   carries an error status
//! - anything else -> logged and ignored
//!
//! `handle` never fails: the platform callback that invokes it has no way to
//! react to an error, so every failure ends as a log line here.

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::battery::read_battery_percent;
use crate::collaborators::{BatterySource, Collaborators};
use crate::config::ReporterConfig;
use crate::policy::TrackingPolicy;
use crate::record::build_location_update;
use crate::scheduler::TaskQueue;
use crate::submitter::UpdateSubmitter;
use crate::zones::GeofenceTransition;
use crate::{LocationSample, ReporterError, Result};

// ============================================================================
// Triggers
// ============================================================================

/// Action identifier the OS uses after a restart.
pub const ACTION_BOOT_COMPLETED: &str = "android.intent.action.BOOT_COMPLETED";
/// Explicit request to re-arm subscriptions (e.g. after a settings change).
pub const ACTION_REQUEST_UPDATES: &str = "location_reporter.background.REQUEST_UPDATES";
/// Delivery of one or more location fixes.
pub const ACTION_PROCESS_LOCATION: &str = "location_reporter.background.PROCESS_UPDATES";
/// Delivery of a geofence transition.
pub const ACTION_PROCESS_GEOFENCE: &str = "location_reporter.background.PROCESS_GEOFENCE";

/// Classification of an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    BootCompleted,
    RequestUpdates,
    ProcessLocation,
    ProcessGeofence,
    Unrecognized,
}

impl Trigger {
    pub fn from_action(action: &str) -> Self {
        match action {
            ACTION_BOOT_COMPLETED => Trigger::BootCompleted,
            ACTION_REQUEST_UPDATES => Trigger::RequestUpdates,
            ACTION_PROCESS_LOCATION => Trigger::ProcessLocation,
            ACTION_PROCESS_GEOFENCE => Trigger::ProcessGeofence,
            _ => Trigger::Unrecognized,
        }
    }

    /// Action identifier for this trigger, None for `Unrecognized`.
    pub fn action(&self) -> Option<&'static str> {
        match self {
            Trigger::BootCompleted => Some(ACTION_BOOT_COMPLETED),
            Trigger::RequestUpdates => Some(ACTION_REQUEST_UPDATES),
            Trigger::ProcessLocation => Some(ACTION_PROCESS_LOCATION),
            Trigger::ProcessGeofence => Some(ACTION_PROCESS_GEOFENCE),
            Trigger::Unrecognized => None,
        }
    }
}

// ============================================================================
// Inbound Events
// ============================================================================

/// A geofence transition as delivered by the geofencing subsystem.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GeofencingEvent {
    /// Subsystem error status; Some means the event must be discarded
    pub error_code: Option<i32>,
    pub transition: Option<GeofenceTransition>,
    /// The fix that caused the transition
    pub triggering_location: Option<LocationSample>,
    /// Request ids (zone entity ids) of the geofences that fired
    pub triggering_zone_ids: Vec<String>,
}

impl GeofencingEvent {
    pub fn has_error(&self) -> bool {
        self.error_code.is_some()
    }
}

/// An event delivered to the dispatcher.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct InboundEvent {
    pub action: String,
    /// Batched fixes, oldest first (process-location only)
    pub locations: Vec<LocationSample>,
    /// Transition payload (process-geofence only)
    pub geofencing: Option<GeofencingEvent>,
}

impl InboundEvent {
    /// An event with no payload.
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Default::default()
        }
    }

    pub fn boot_completed() -> Self {
        Self::new(ACTION_BOOT_COMPLETED)
    }

    pub fn request_updates() -> Self {
        Self::new(ACTION_REQUEST_UPDATES)
    }

    pub fn location_result(locations: Vec<LocationSample>) -> Self {
        Self {
            locations,
            ..Self::new(ACTION_PROCESS_LOCATION)
        }
    }

    pub fn geofence(event: GeofencingEvent) -> Self {
        Self {
            geofencing: Some(event),
            ..Self::new(ACTION_PROCESS_GEOFENCE)
        }
    }

    pub fn trigger(&self) -> Trigger {
        Trigger::from_action(&self.action)
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Routes inbound events to tracking setup or fix reporting.
#[derive(Clone)]
pub struct EventDispatcher {
    policy: TrackingPolicy,
    submitter: UpdateSubmitter,
    battery: Arc<dyn BatterySource>,
}

impl EventDispatcher {
    pub fn new(
        collaborators: Collaborators,
        queue: Arc<dyn TaskQueue>,
        config: ReporterConfig,
    ) -> Self {
        Self {
            policy: TrackingPolicy::new(&collaborators, Arc::clone(&queue), config),
            submitter: UpdateSubmitter::new(Arc::clone(&collaborators.submitter), queue),
            battery: collaborators.battery,
        }
    }

    /// Handle one inbound event. Never fails.
    pub fn handle(&self, event: &InboundEvent) {
        let trigger = event.trigger();
        debug!("[EventDispatcher] {} -> {:?}", event.action, trigger);

        if let Err(e) = self.route(trigger, event) {
            if e.is_expected() {
                warn!("[EventDispatcher] {}", e);
            } else {
                error!("[EventDispatcher] {}", e);
            }
        }
    }

    fn route(&self, trigger: Trigger, event: &InboundEvent) -> Result<()> {
        match trigger {
            Trigger::BootCompleted | Trigger::RequestUpdates => self.setup_tracking(),
            Trigger::ProcessLocation => {
                self.handle_location_result(&event.locations);
                Ok(())
            }
            Trigger::ProcessGeofence => match &event.geofencing {
                Some(geofencing) => self.handle_geofence(geofencing),
                None => {
                    warn!("[EventDispatcher] Geofence event without payload");
                    Ok(())
                }
            },
            Trigger::Unrecognized => Err(ReporterError::UnrecognizedTrigger {
                action: event.action.clone(),
            }),
        }
    }

    /// (Re)arm subscriptions for the current flags.
    pub fn setup_tracking(&self) -> Result<()> {
        self.policy.setup_tracking()
    }

    fn handle_location_result(&self, locations: &[LocationSample]) {
        // Last fix wins; earlier fixes in the batch are dropped
        match locations.last() {
            Some(sample) => {
                if locations.len() > 1 {
                    debug!(
                        "[EventDispatcher] Dropping {} older fixes from batch",
                        locations.len() - 1
                    );
                }
                self.report_fix(sample);
            }
            None => debug!("[EventDispatcher] Location result without fixes"),
        }
    }

    fn handle_geofence(&self, event: &GeofencingEvent) -> Result<()> {
        if let Some(code) = event.error_code {
            return Err(ReporterError::Geofencing { code });
        }

        info!(
            "[EventDispatcher] Geofence {:?} for {:?}",
            event.transition, event.triggering_zone_ids
        );

        match &event.triggering_location {
            Some(sample) => self.report_fix(sample),
            None => warn!("[EventDispatcher] Geofence event without triggering location"),
        }
        Ok(())
    }

    /// Build the update for `sample` and schedule its submission.
    pub fn report_fix(&self, sample: &LocationSample) {
        info!(
            "[EventDispatcher] Fix: ({}, {}) accuracy={} bearing={}",
            sample.latitude, sample.longitude, sample.accuracy, sample.bearing
        );

        let battery = read_battery_percent(&self.battery.current_battery_snapshot());
        let update = build_location_update(sample, battery);
        self.submitter.submit(update);
    }
}
