//! OSRM driving route client
//!
//! Fetches a single driving route with full GeoJSON geometry from the
//! [OSRM HTTP API](https://project-osrm.org/docs/v5.24.0/api/#route-service).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::OsrmConfig;
use crate::error::{OsmError, retry_after_secs};
use crate::models::DrivingRoute;

/// OSRM response codes meaning "asked fine, but there is no route"
const NO_ROUTE_CODES: [&str; 2] = ["NoRoute", "NoSegment"];

/// Trait for routing clients
#[async_trait]
pub trait RoutingClient: Send + Sync {
    /// Fetch a route between two points
    ///
    /// Returns `Ok(None)` when the service reports that no route exists.
    async fn fetch_route(
        &self,
        from_lat: f64,
        from_lon: f64,
        to_lat: f64,
        to_lon: f64,
    ) -> Result<Option<DrivingRoute>, OsmError>;
}

/// OSRM-based routing client
#[derive(Debug)]
pub struct OsrmClient {
    client: Client,
    config: OsrmConfig,
}

impl OsrmClient {
    /// Create a new OSRM client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &OsrmConfig) -> Result<Self, OsmError> {
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

    /// Build the route URL; OSRM expects `lon,lat` order
    fn route_url(&self, from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> String {
        format!(
            "{}/route/v1/{}/{from_lon},{from_lat};{to_lon},{to_lat}",
            self.config.base_url, self.config.profile
        )
    }

    /// Interpret an OSRM response body
    fn parse_response(body: &str) -> Result<Option<DrivingRoute>, OsmError> {
        let raw: RawRouteResponse =
            serde_json::from_str(body).map_err(|e| OsmError::ParseError(e.to_string()))?;

        if let Some(code) = raw.code.as_deref() {
            if NO_ROUTE_CODES.contains(&code) {
                return Ok(None);
            }
            if code != "Ok" {
                let message = raw.message.unwrap_or_default();
                return Err(OsmError::RequestFailed(format!("{code}: {message}")));
            }
        }

        let Some(first) = raw.routes.first() else {
            return Ok(None);
        };

        DrivingRoute::from_json(first)
            .map(Some)
            .ok_or_else(|| OsmError::ParseError("route without distance or duration".to_string()))
    }
}

#[async_trait]
impl RoutingClient for OsrmClient {
    #[instrument(skip(self), fields(from = %format!("{from_lat},{from_lon}"), to = %format!("{to_lat},{to_lon}")))]
    async fn fetch_route(
        &self,
        from_lat: f64,
        from_lon: f64,
        to_lat: f64,
        to_lon: f64,
    ) -> Result<Option<DrivingRoute>, OsmError> {
        let url = self.route_url(from_lat, from_lon, to_lat, to_lon);
        let params = [("overview", "full"), ("geometries", "geojson")];

        debug!(?url, "Fetching route");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| OsmError::from_send(&e, self.config.timeout_secs))?;

        let status = response.status();
        let retry_after = retry_after_secs(&response);
        let body = response
            .text()
            .await
            .map_err(|e| OsmError::ParseError(e.to_string()))?;

        // OSRM answers "NoRoute" with a 400 status, so inspect the body first
        if !status.is_success() {
            return match Self::parse_response(&body) {
                Ok(None) => Ok(None),
                _ => Err(OsmError::from_status(status, retry_after)),
            };
        }

        let route = Self::parse_response(&body)?;
        debug!(found = route.is_some(), "Route fetched");
        Ok(route)
    }
}

// --- Raw API response types for deserialization ---

#[derive(Debug, Deserialize)]
struct RawRouteResponse {
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<Value>,
}
