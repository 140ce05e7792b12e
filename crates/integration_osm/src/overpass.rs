//! Overpass API client for nearby fuel stations
//!
//! Queries [Overpass](https://wiki.openstreetmap.org/wiki/Overpass_API) for
//! nodes tagged `amenity=fuel` within a radius of a point.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::OverpassConfig;
use crate::error::{OsmError, retry_after_secs};
use crate::models::FuelNode;

/// Trait for point-of-interest query clients
#[async_trait]
pub trait PoiClient: Send + Sync {
    /// Find fuel stations within `radius_m` meters of a point
    async fn find_fuel_stations(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    ) -> Result<Vec<FuelNode>, OsmError>;
}

/// Overpass-based point-of-interest client
#[derive(Debug)]
pub struct OverpassClient {
    client: Client,
    config: OverpassConfig,
}

impl OverpassClient {
    /// Create a new Overpass client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &OverpassConfig) -> Result<Self, OsmError> {
        config.validate().map_err(OsmError::ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| OsmError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Build the Overpass QL query for fuel nodes around a point
    fn build_query(latitude: f64, longitude: f64, radius_m: u32) -> String {
        format!(
            "[out:json][timeout:25];node[\"amenity\"=\"fuel\"](around:{radius_m},{latitude},{longitude});out body;"
        )
    }

    /// Parse an Overpass JSON response, dropping malformed elements
    fn parse_response(body: &str) -> Result<Vec<FuelNode>, OsmError> {
        let raw: RawOverpassResponse =
            serde_json::from_str(body).map_err(|e| OsmError::ParseError(e.to_string()))?;

        let total = raw.elements.len();
        let nodes: Vec<FuelNode> = raw.elements.iter().filter_map(FuelNode::from_json).collect();

        if nodes.len() < total {
            warn!(
                dropped = total - nodes.len(),
                "Dropped malformed Overpass elements"
            );
        }

        Ok(nodes)
    }
}

#[async_trait]
impl PoiClient for OverpassClient {
    #[instrument(skip(self))]
    async fn find_fuel_stations(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    ) -> Result<Vec<FuelNode>, OsmError> {
        let url = format!("{}/interpreter", self.config.base_url);
        let query = Self::build_query(latitude, longitude, radius_m);

        debug!(?url, %query, "Querying fuel stations");

        let response = self
            .client
            .get(&url)
            .query(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| OsmError::from_send(&e, self.config.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OsmError::from_status(status, retry_after_secs(&response)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| OsmError::ParseError(e.to_string()))?;

        let nodes = Self::parse_response(&body)?;
        debug!(count = nodes.len(), "Fuel stations found");
        Ok(nodes)
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawOverpassResponse {
    #[serde(default)]
    elements: Vec<Value>,
}
