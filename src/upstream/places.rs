use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{read_json, UpstreamError, UpstreamOutcome};
use crate::config::{non_empty, PlacesConfig};

/// Coordinates are kept as the caller sent them; the provider decides
/// whether they are valid.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceQuery {
    pub latitude: String,
    pub longitude: String,
    pub radius_meters: u32,
}

impl PlaceQuery {
    /// Absent or empty coordinates fall back to the configured location.
    pub fn from_params(params: &HashMap<String, String>, config: &PlacesConfig) -> Self {
        Self {
            latitude: coordinate(params, "latitude", config.default_latitude),
            longitude: coordinate(params, "longitude", config.default_longitude),
            radius_meters: config.radius_meters,
        }
    }
}

fn coordinate(params: &HashMap<String, String>, name: &str, default: f64) -> String {
    params
        .get(name)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Client for the Google Places nearby-search API.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    config: Arc<PlacesConfig>,
}

impl PlacesClient {
    pub fn new(client: Client, config: Arc<PlacesConfig>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &PlacesConfig {
        &self.config
    }

    pub async fn nearby(&self, query: &PlaceQuery) -> UpstreamOutcome<Value> {
        let Some(api_key) = non_empty(&self.config.api_key) else {
            error!("Places API key is not configured");
            return UpstreamOutcome::TransportFailure(UpstreamError::MissingCredential("places"));
        };

        debug!(
            latitude = %query.latitude,
            longitude = %query.longitude,
            radius = query.radius_meters,
            "Sending nearby search"
        );

        let location = format!("{},{}", query.latitude, query.longitude);
        let radius = query.radius_meters.to_string();
        let sent = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("key", api_key),
            ])
            .send()
            .await;

        let body = match sent {
            Ok(response) => read_json(response).await,
            Err(e) => Err(e.into()),
        };

        match body {
            Ok(body) => classify(body),
            Err(e) => {
                error!(error = %e, "Nearby search failed");
                UpstreamOutcome::TransportFailure(e)
            }
        }
    }
}

fn classify(mut body: Value) -> UpstreamOutcome<Value> {
    if body.get("status").and_then(Value::as_str) == Some("OK") {
        let results = body
            .get_mut("results")
            .map(Value::take)
            .unwrap_or_else(|| Value::Array(Vec::new()));
        return UpstreamOutcome::Success(results);
    }
    warn!(status = ?body.get("status"), "Places provider declared an error");
    UpstreamOutcome::ProviderError(body)
}
