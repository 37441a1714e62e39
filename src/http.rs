//! HTTP client for the integration webhook.
//!
//! All requests are JSON POSTs to the app's registered webhook URL, tagged
//! with a `type`:
//! - `update_location` carries one location update
//! - `get_zones` returns the zone entities to monitor
//!
//! There is no retry: a failed request is reported once and the caller
//! decides what to do (the update submitter drops it).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::collaborators::{ConfigSource, Submitter};
use crate::config::TrackingSettings;
use crate::{LocationUpdate, OptionExt, ReporterError, Result, ZoneDefinition};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Webhook request envelope.
#[derive(Debug, Serialize)]
struct WebhookRequest<T: Serialize> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// Wire format of a location update.
#[derive(Debug, Serialize)]
struct UpdateLocationData {
    gps: [f64; 2], // [lat, lng]
    gps_accuracy: i32,
    battery: Option<i32>,
    speed: i32,
    altitude: i32,
    course: i32,
    vertical_accuracy: i32,
}

impl From<&LocationUpdate> for UpdateLocationData {
    fn from(update: &LocationUpdate) -> Self {
        Self {
            gps: [update.gps.latitude, update.gps.longitude],
            gps_accuracy: update.accuracy,
            battery: update.battery,
            speed: update.speed,
            altitude: update.altitude,
            course: update.bearing,
            vertical_accuracy: update.vertical_accuracy,
        }
    }
}

/// API response entry for `get_zones`
#[derive(Debug, Deserialize)]
struct ZoneEntity {
    entity_id: String,
    attributes: ZoneAttributes,
}

#[derive(Debug, Deserialize)]
struct ZoneAttributes {
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius: Option<f32>,
}

fn zones_from_entities(entities: Vec<ZoneEntity>) -> Vec<ZoneDefinition> {
    entities
        .into_iter()
        .filter_map(|entity| {
            let attrs = &entity.attributes;
            match (attrs.latitude, attrs.longitude, attrs.radius) {
                (Some(latitude), Some(longitude), Some(radius)) => Some(ZoneDefinition {
                    entity_id: entity.entity_id,
                    latitude,
                    longitude,
                    radius,
                }),
                _ => {
                    warn!(
                        "[IntegrationClient] Zone {} has no position, skipping",
                        entity.entity_id
                    );
                    None
                }
            }
        })
        .collect()
}

fn http_error(e: reqwest::Error) -> ReporterError {
    ReporterError::HttpError {
        status_code: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for the integration webhook.
#[derive(Debug, Clone)]
pub struct IntegrationClient {
    client: Client,
    webhook_url: Url,
}

impl IntegrationClient {
    /// Create a client for the given webhook URL.
    pub fn new(webhook_url: &str) -> Result<Self> {
        let webhook_url = Url::parse(webhook_url).map_err(|e| ReporterError::ConfigError {
            message: format!("Invalid webhook URL '{}': {}", webhook_url, e),
        })?;
        webhook_url
            .host_str()
            .ok_or_config("Webhook URL has no host")?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ReporterError::HttpError {
                message: format!("Failed to create HTTP client: {}", e),
                status_code: None,
            })?;

        Ok(Self {
            client,
            webhook_url,
        })
    }

    pub fn webhook_url(&self) -> &str {
        self.webhook_url.as_str()
    }

    async fn post<T: Serialize>(&self, body: &WebhookRequest<T>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(body)
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReporterError::HttpError {
                message: status
                    .canonical_reason()
                    .unwrap_or("Unexpected status")
                    .to_string(),
                status_code: Some(status.as_u16()),
            });
        }
        Ok(response)
    }

    /// Send one location update.
    pub async fn update_location(&self, update: &LocationUpdate) -> Result<()> {
        let body = WebhookRequest {
            kind: "update_location",
            data: Some(UpdateLocationData::from(update)),
        };
        self.post(&body).await?;
        debug!("[IntegrationClient] update_location accepted");
        Ok(())
    }

    /// Fetch the zones to monitor. Zones without a position are skipped.
    pub async fn get_zones(&self) -> Result<Vec<ZoneDefinition>> {
        let body: WebhookRequest<()> = WebhookRequest {
            kind: "get_zones",
            data: None,
        };
        let entities: Vec<ZoneEntity> = self.post(&body).await?.json().await.map_err(|e| {
            ReporterError::HttpError {
                message: format!("Parse error: {}", e),
                status_code: None,
            }
        })?;

        let zones = zones_from_entities(entities);
        info!("[IntegrationClient] Received {} zones", zones.len());
        Ok(zones)
    }
}

#[async_trait]
impl Submitter for IntegrationClient {
    async fn submit_location_update(&self, update: &LocationUpdate) -> Result<()> {
        self.update_location(update)
            .await
            .map_err(|e| ReporterError::Submission {
                message: e.to_string(),
            })
    }
}

// ============================================================================
// Config Source
// ============================================================================

/// Tracking flags from the local settings store, zones from the webhook.
#[derive(Debug, Clone)]
pub struct IntegrationConfigSource {
    settings: TrackingSettings,
    client: Arc<IntegrationClient>,
}

impl IntegrationConfigSource {
    pub fn new(settings: TrackingSettings, client: Arc<IntegrationClient>) -> Self {
        Self { settings, client }
    }
}

#[async_trait]
impl ConfigSource for IntegrationConfigSource {
    async fn is_background_tracking_enabled(&self) -> Result<bool> {
        Ok(self.settings.flags().background_tracking_enabled)
    }

    async fn is_zone_tracking_enabled(&self) -> Result<bool> {
        Ok(self.settings.flags().zone_tracking_enabled)
    }

    async fn get_zones(&self) -> Result<Vec<ZoneDefinition>> {
        self.client.get_zones().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GpsPoint, TrackingFlags};

    fn update(battery: Option<i32>) -> LocationUpdate {
        LocationUpdate {
            gps: GpsPoint::new(52.3676, 4.9041),
            accuracy: 12,
            battery,
            speed: 3,
            altitude: 0,
            bearing: 359,
            vertical_accuracy: 0,
        }
    }

    #[test]
    fn test_update_location_payload() {
        let body = WebhookRequest {
            kind: "update_location",
            data: Some(UpdateLocationData::from(&update(Some(75)))),
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "update_location",
                "data": {
                    "gps": [52.3676, 4.9041],
                    "gps_accuracy": 12,
                    "battery": 75,
                    "speed": 3,
                    "altitude": 0,
                    "course": 359,
                    "vertical_accuracy": 0
                }
            })
        );
    }

    #[test]
    fn test_missing_battery_sent_as_null() {
        let json = serde_json::to_value(UpdateLocationData::from(&update(None))).unwrap();
        assert!(json["battery"].is_null());
    }

    #[test]
    fn test_get_zones_payload() {
        let body: WebhookRequest<()> = WebhookRequest {
            kind: "get_zones",
            data: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"type":"get_zones"}"#
        );
    }

    #[test]
    fn test_parse_zone_entities() {
        let json = r#"[
            {"entity_id": "zone.home", "state": "0",
             "attributes": {"latitude": 52.3676, "longitude": 4.9041, "radius": 100, "passive": false}},
            {"entity_id": "zone.broken", "attributes": {"radius": 50}}
        ]"#;
        let entities: Vec<ZoneEntity> = serde_json::from_str(json).unwrap();
        let zones = zones_from_entities(entities);

        assert_eq!(
            zones,
            vec![ZoneDefinition {
                entity_id: "zone.home".to_string(),
                latitude: 52.3676,
                longitude: 4.9041,
                radius: 100.0,
            }]
        );
    }

    #[test]
    fn test_invalid_webhook_url() {
        assert!(matches!(
            IntegrationClient::new("not a url"),
            Err(ReporterError::ConfigError { .. })
        ));
        assert!(IntegrationClient::new("mailto:someone@example.com").is_err());
        let client = IntegrationClient::new("https://example.com/api/webhook/abc").unwrap();
        assert_eq!(client.webhook_url(), "https://example.com/api/webhook/abc");
    }

    #[tokio::test]
    async fn test_config_source_reads_settings() {
        let settings = TrackingSettings::new(TrackingFlags {
            background_tracking_enabled: true,
            zone_tracking_enabled: false,
        });
        let client = Arc::new(IntegrationClient::new("https://example.com/api/webhook/abc").unwrap());
        let source = IntegrationConfigSource::new(settings.clone(), client);

        assert_eq!(source.is_background_tracking_enabled().await, Ok(true));
        assert_eq!(source.is_zone_tracking_enabled().await, Ok(false));

        settings.set_flags(TrackingFlags {
            background_tracking_enabled: false,
            zone_tracking_enabled: true,
        });
        assert_eq!(source.is_zone_tracking_enabled().await, Ok(true));
    }

    /// Serve `500 Internal Server Error` to every request, reading each
    /// request fully so the client sees the status rather than a reset.
    async fn spawn_failing_server() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    loop {
                        let n = match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        request.extend_from_slice(&buf[..n]);

                        let text = String::from_utf8_lossy(&request);
                        if let Some(header_end) = text.find("\r\n\r\n") {
                            let content_length = text[..header_end]
                                .lines()
                                .filter_map(|line| line.split_once(':'))
                                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                                .unwrap_or(0);
                            if request.len() >= header_end + 4 + content_length {
                                break;
                            }
                        }
                    }

                    let response = "HTTP/1.1 500 Internal Server Error\r\n\
                                    Content-Length: 0\r\n\
                                    Connection: close\r\n\r\n";
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        format!("http://{}/api/webhook/abc", addr)
    }

    #[tokio::test]
    async fn test_server_error_not_retried() {
        let url = spawn_failing_server().await;
        let client = IntegrationClient::new(&url).unwrap();

        match client.submit_location_update(&update(Some(75))).await {
            Err(ReporterError::Submission { message }) => assert!(message.contains("500")),
            other => panic!("expected Submission error, got {:?}", other),
        }

        assert!(matches!(
            client.get_zones().await,
            Err(ReporterError::HttpError {
                status_code: Some(500),
                ..
            })
        ));
    }
}
