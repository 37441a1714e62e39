//! Recording fakes for the platform and remote collaborators.
//!
//! Every fake records what it was asked to do so tests can assert on the exact
//! subscription calls and submitted updates. Paired with `InlineTaskQueue`,
//! all scheduled work has finished by the time `handle` returns.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use location_reporter::{
    BatterySnapshot, BatterySource, Collaborators, ConfigSource, EventDispatcher,
    GeofenceSubscriptionProvider, GeofencingRequest, InlineTaskQueue, LocationRequest,
    LocationSample, LocationSubscriptionProvider, LocationUpdate, PermissionChecker,
    ReporterConfig, ReporterError, Result, Submitter, TaskQueue, ZoneDefinition,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Platform
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    ClearLocation(String),
    AddLocation(String, LocationRequest),
    ClearGeofence(String),
    AddGeofence(String, GeofencingRequest),
}

/// Fake OS: permissions, subscriptions, battery.
pub struct FakePlatform {
    pub permission_granted: AtomicBool,
    pub battery: Mutex<BatterySnapshot>,
    pub calls: Mutex<Vec<PlatformCall>>,
    pub location_subscriptions: Mutex<HashMap<String, LocationRequest>>,
    pub geofence_subscriptions: Mutex<HashMap<String, GeofencingRequest>>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            permission_granted: AtomicBool::new(true),
            battery: Mutex::new(BatterySnapshot::new(75, 100)),
            calls: Mutex::new(Vec::new()),
            location_subscriptions: Mutex::new(HashMap::new()),
            geofence_subscriptions: Mutex::new(HashMap::new()),
        }
    }
}

impl FakePlatform {
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_battery(&self, level: i32, scale: i32) {
        *self.battery.lock().unwrap() = BatterySnapshot::new(level, scale);
    }

    pub fn has_location_subscription(&self) -> bool {
        !self.location_subscriptions.lock().unwrap().is_empty()
    }

    pub fn has_geofence_subscription(&self) -> bool {
        !self.geofence_subscriptions.lock().unwrap().is_empty()
    }
}

impl PermissionChecker for FakePlatform {
    fn has_coarse_location_permission(&self) -> bool {
        self.permission_granted.load(Ordering::Relaxed)
    }
}

impl LocationSubscriptionProvider for FakePlatform {
    fn clear_location_subscription(&self, id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(PlatformCall::ClearLocation(id.to_string()));
        self.location_subscriptions.lock().unwrap().remove(id);
    }

    fn add_location_subscription(&self, id: &str, request: &LocationRequest) {
        self.calls
            .lock()
            .unwrap()
            .push(PlatformCall::AddLocation(id.to_string(), request.clone()));
        let mut subscriptions = self.location_subscriptions.lock().unwrap();
        // A second add under a live id would duplicate the registration
        assert!(
            !subscriptions.contains_key(id),
            "location subscription {} registered twice",
            id
        );
        subscriptions.insert(id.to_string(), request.clone());
    }
}

impl GeofenceSubscriptionProvider for FakePlatform {
    fn clear_geofence_subscription(&self, id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(PlatformCall::ClearGeofence(id.to_string()));
        self.geofence_subscriptions.lock().unwrap().remove(id);
    }

    fn add_geofence_subscription(&self, id: &str, request: &GeofencingRequest) {
        self.calls
            .lock()
            .unwrap()
            .push(PlatformCall::AddGeofence(id.to_string(), request.clone()));
        let mut subscriptions = self.geofence_subscriptions.lock().unwrap();
        assert!(
            !subscriptions.contains_key(id),
            "geofence subscription {} registered twice",
            id
        );
        subscriptions.insert(id.to_string(), request.clone());
    }
}

impl BatterySource for FakePlatform {
    fn current_battery_snapshot(&self) -> BatterySnapshot {
        *self.battery.lock().unwrap()
    }
}

// ============================================================================
// Remote configuration
// ============================================================================

/// Fake remote config; each answer can be switched to a failure.
pub struct FakeConfig {
    pub background: Mutex<Result<bool>>,
    pub zone: Mutex<Result<bool>>,
    pub zones: Mutex<Result<Vec<ZoneDefinition>>>,
    pub queries: AtomicU32,
}

impl FakeConfig {
    pub fn new(background: bool, zone: bool) -> Self {
        Self {
            background: Mutex::new(Ok(background)),
            zone: Mutex::new(Ok(zone)),
            zones: Mutex::new(Ok(sample_zones())),
            queries: AtomicU32::new(0),
        }
    }

    pub fn set_flags(&self, background: bool, zone: bool) {
        *self.background.lock().unwrap() = Ok(background);
        *self.zone.lock().unwrap() = Ok(zone);
    }

    pub fn queries(&self) -> u32 {
        self.queries.load(Ordering::Relaxed)
    }
}

pub fn network_error() -> ReporterError {
    ReporterError::HttpError {
        message: "connection refused".to_string(),
        status_code: None,
    }
}

#[async_trait]
impl ConfigSource for FakeConfig {
    async fn is_background_tracking_enabled(&self) -> Result<bool> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.background.lock().unwrap().clone()
    }

    async fn is_zone_tracking_enabled(&self) -> Result<bool> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.zone.lock().unwrap().clone()
    }

    async fn get_zones(&self) -> Result<Vec<ZoneDefinition>> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.zones.lock().unwrap().clone()
    }
}

pub fn sample_zones() -> Vec<ZoneDefinition> {
    vec![
        ZoneDefinition {
            entity_id: "zone.home".to_string(),
            latitude: 52.3676,
            longitude: 4.9041,
            radius: 100.0,
        },
        ZoneDefinition {
            entity_id: "zone.work".to_string(),
            latitude: 52.3791,
            longitude: 4.9003,
            radius: 250.0,
        },
    ]
}

// ============================================================================
// Submission
// ============================================================================

#[derive(Default)]
pub struct RecordingSubmitter {
    pub sent: Mutex<Vec<LocationUpdate>>,
    pub fail: AtomicBool,
}

impl RecordingSubmitter {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<LocationUpdate> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Submitter for RecordingSubmitter {
    async fn submit_location_update(&self, update: &LocationUpdate) -> Result<()> {
        self.sent.lock().unwrap().push(*update);
        if self.fail.load(Ordering::Relaxed) {
            return Err(ReporterError::Submission {
                message: "500 Internal Server Error".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub dispatcher: EventDispatcher,
    pub platform: Arc<FakePlatform>,
    pub config: Arc<FakeConfig>,
    pub submitter: Arc<RecordingSubmitter>,
}

impl Harness {
    /// Dispatcher with both flags as given and an inline task queue.
    pub fn new(background: bool, zone: bool) -> Self {
        Self::with_parts(
            FakeConfig::new(background, zone),
            RecordingSubmitter::default(),
            Arc::new(InlineTaskQueue),
        )
    }

    pub fn with_parts(
        config: FakeConfig,
        submitter: RecordingSubmitter,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        init_logging();
        let platform = Arc::new(FakePlatform::default());
        let config = Arc::new(config);
        let submitter = Arc::new(submitter);

        let collaborators = Collaborators {
            permissions: platform.clone(),
            locations: platform.clone(),
            geofences: platform.clone(),
            config: config.clone(),
            submitter: submitter.clone(),
            battery: platform.clone(),
        };

        Self {
            dispatcher: EventDispatcher::new(collaborators, queue, ReporterConfig::default()),
            platform,
            config,
            submitter,
        }
    }
}

pub fn fix(latitude: f64, longitude: f64) -> LocationSample {
    LocationSample {
        latitude,
        longitude,
        accuracy: 8.0,
        speed: 1.5,
        altitude: 12.0,
        bearing: 180.0,
        vertical_accuracy: Some(3.0),
    }
}
