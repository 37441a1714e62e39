//! Geofencing requests built from remotely configured zones.
//!
//! Each zone becomes one circular, never-expiring geofence keyed by the zone's
//! entity id. Zones the platform would reject (bad coordinates, non-positive
//! radius) are skipped with a warning rather than failing the whole batch.
//!
//! ## Example
//! ```rust
//! use location_reporter::zones::{build_geofencing_request, GeofenceTransition};
//! use location_reporter::ZoneDefinition;
//!
//! let zones = vec![ZoneDefinition {
//!     entity_id: "zone.home".to_string(),
//!     latitude: 52.3676,
//!     longitude: 4.9041,
//!     radius: 100.0,
//! }];
//! let transitions = [GeofenceTransition::Enter, GeofenceTransition::Exit];
//! let request = build_geofencing_request(&zones, &transitions).unwrap();
//! assert_eq!(request.geofences[0].request_id, "zone.home");
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{GpsPoint, ZoneDefinition};

/// A boundary crossing the geofencing subsystem can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum GeofenceTransition {
    Enter,
    Exit,
    Dwell,
}

/// A single circular region to monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Geofence {
    /// Identifier echoed back in transition events (the zone's entity id)
    pub request_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in meters
    pub radius: f32,
    /// Expiration in milliseconds, None = never expires
    pub expiration_ms: Option<u64>,
    /// Transitions that trigger an event
    pub transitions: Vec<GeofenceTransition>,
}

/// A batch of geofences registered as one subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GeofencingRequest {
    pub geofences: Vec<Geofence>,
}

impl GeofencingRequest {
    /// Entity ids of all monitored zones, in registration order.
    pub fn zone_ids(&self) -> Vec<&str> {
        self.geofences.iter().map(|g| g.request_id.as_str()).collect()
    }
}

/// Whether the platform would accept a geofence for this zone.
pub fn is_valid_zone(zone: &ZoneDefinition) -> bool {
    GpsPoint::new(zone.latitude, zone.longitude).is_valid()
        && zone.radius.is_finite()
        && zone.radius > 0.0
}

/// Build one geofence per valid zone.
///
/// Returns `None` when no zone survives validation, since a geofencing request
/// must contain at least one geofence.
pub fn build_geofencing_request(
    zones: &[ZoneDefinition],
    transitions: &[GeofenceTransition],
) -> Option<GeofencingRequest> {
    let geofences: Vec<Geofence> = zones
        .iter()
        .filter(|zone| {
            let valid = is_valid_zone(zone);
            if !valid {
                warn!(
                    "[ZoneRequest] Skipping zone {} ({}, {}, r={})",
                    zone.entity_id, zone.latitude, zone.longitude, zone.radius
                );
            }
            valid
        })
        .map(|zone| Geofence {
            request_id: zone.entity_id.clone(),
            latitude: zone.latitude,
            longitude: zone.longitude,
            radius: zone.radius,
            expiration_ms: None,
            transitions: transitions.to_vec(),
        })
        .collect();

    if geofences.is_empty() {
        return None;
    }

    Some(GeofencingRequest { geofences })
}
