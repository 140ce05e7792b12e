//! Nominatim geocoding client
//!
//! Free-text place search and reverse geocoding using the
//! [Nominatim](https://nominatim.openstreetmap.org) API (OpenStreetMap).
//!
//! Implements rate limiting (max 1 request/second per Nominatim usage policy)
//! and result caching to minimize API calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::config::{default_user_agent, validate_common};
use crate::models::Place;

/// Configuration for the Nominatim geocoding service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_geocoding_timeout_secs")]
    pub timeout_secs: u64,

    /// Cache TTL in hours (0 to disable)
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    /// Country code filter applied when the caller passes none (empty = worldwide)
    #[serde(default = "default_country_filter")]
    pub country_filter: String,

    /// Minimum spacing between requests in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// `User-Agent` header value; Nominatim rejects anonymous clients
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_geocoding_timeout_secs() -> u64 {
    5
}

const fn default_cache_ttl_hours() -> u64 {
    24
}

fn default_country_filter() -> String {
    "lk".to_string()
}

const fn default_min_interval_ms() -> u64 {
    1100
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            timeout_secs: default_geocoding_timeout_secs(),
            cache_ttl_hours: default_cache_ttl_hours(),
            country_filter: default_country_filter(),
            min_interval_ms: default_min_interval_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl NominatimConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            cache_ttl_hours: 0,
            min_interval_ms: 0,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        validate_common(&self.base_url, self.timeout_secs, &self.user_agent)
    }
}

/// Errors that can occur during geocoding
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// Connection to geocoding service failed
    #[error("Geocoding connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to geocoding service failed
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse geocoding response
    #[error("Geocoding parse error: {0}")]
    ParseError(String),

    /// Coordinates could not be resolved to an address
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// Rate limit exceeded (max 1 req/sec for Nominatim)
    #[error("Geocoding rate limit exceeded")]
    RateLimitExceeded,

    /// Request timeout
    #[error("Geocoding request timed out")]
    Timeout,

    /// Client configuration is unusable
    #[error("Geocoding configuration error: {0}")]
    ConfigurationError(String),
}

impl GeocodingError {
    fn from_send(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::ConnectionFailed(err.to_string())
        }
    }

    fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimitExceeded
        } else {
            Self::RequestFailed(format!("HTTP {status}"))
        }
    }
}

/// Trait for geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Search places by free text, best match first
    ///
    /// `country` overrides the configured country filter; `Some("")`
    /// searches worldwide.
    async fn search(
        &self,
        query: &str,
        limit: u8,
        country: Option<&str>,
    ) -> Result<Vec<Place>, GeocodingError>;

    /// Convert coordinates to a human-readable address
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, GeocodingError>;
}

/// Nominatim-based geocoding client with rate limiting and caching
#[derive(Debug)]
pub struct NominatimGeocodingClient {
    client: Client,
    config: NominatimConfig,
    search_cache: Option<Cache<String, Vec<Place>>>,
    reverse_cache: Option<Cache<String, String>>,
    last_request: Arc<Mutex<Instant>>,
}

impl NominatimGeocodingClient {
    /// Create a new Nominatim geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &NominatimConfig) -> Result<Self, GeocodingError> {
        config.validate().map_err(GeocodingError::ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GeocodingError::ConnectionFailed(e.to_string()))?;

        let (search_cache, reverse_cache) = if config.cache_ttl_hours > 0 {
            let ttl = Duration::from_secs(config.cache_ttl_hours * 3600);
            (
                Some(Cache::builder().max_capacity(500).time_to_live(ttl).build()),
                Some(Cache::builder().max_capacity(1000).time_to_live(ttl).build()),
            )
        } else {
            (None, None)
        };

        let spacing = Duration::from_millis(config.min_interval_ms);
        let last_request = Instant::now()
            .checked_sub(spacing)
            .unwrap_or_else(Instant::now);

        Ok(Self {
            client,
            config: config.clone(),
            search_cache,
            reverse_cache,
            last_request: Arc::new(Mutex::new(last_request)),
        })
    }

    /// Enforce the configured request spacing
    async fn rate_limit(&self) {
        let spacing = Duration::from_millis(self.config.min_interval_ms);
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < spacing {
            let wait = spacing.saturating_sub(elapsed);
            debug!(?wait, "Rate limiting geocoding request");
            tokio::time::sleep(wait).await;
        }
        *last = Instant::now();
    }

    /// Resolve the effective country filter for a search
    fn country_filter<'a>(&'a self, country: Option<&'a str>) -> Option<&'a str> {
        let filter = country.unwrap_or(self.config.country_filter.as_str()).trim();
        (!filter.is_empty()).then_some(filter)
    }

    /// Parse a Nominatim search response, dropping malformed entries
    fn parse_search_response(body: &str) -> Result<Vec<Place>, GeocodingError> {
        let raw: Vec<Value> =
            serde_json::from_str(body).map_err(|e| GeocodingError::ParseError(e.to_string()))?;
        Ok(raw.iter().filter_map(Place::from_json).collect())
    }

    fn reverse_cache_key(latitude: f64, longitude: f64) -> String {
        format!("{latitude:.5},{longitude:.5}")
    }
}

#[async_trait]
impl GeocodingClient for NominatimGeocodingClient {
    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        limit: u8,
        country: Option<&str>,
    ) -> Result<Vec<Place>, GeocodingError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let country = self.country_filter(country);
        let cache_key = format!(
            "{}|{limit}|{}",
            query.to_lowercase(),
            country.unwrap_or_default()
        );
        if let Some(cache) = &self.search_cache {
            if let Some(places) = cache.get(&cache_key).await {
                debug!(%query, "Search cache hit");
                return Ok(places);
            }
        }

        self.rate_limit().await;

        let url = format!("{}/search", self.config.base_url);
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(country) = country {
            params.push(("countrycodes", country.to_string()));
        }

        debug!(%query, "Searching places");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| GeocodingError::from_send(&e))?;

        if !response.status().is_success() {
            return Err(GeocodingError::from_status(response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        let mut places = Self::parse_search_response(&body)?;
        places.truncate(usize::from(limit));

        if let Some(cache) = &self.search_cache {
            cache.insert(cache_key, places.clone()).await;
        }
        debug!(%query, count = places.len(), "Places found");

        Ok(places)
    }

    #[instrument(skip(self))]
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, GeocodingError> {
        let cache_key = Self::reverse_cache_key(latitude, longitude);
        if let Some(cache) = &self.reverse_cache {
            if let Some(address) = cache.get(&cache_key).await {
                debug!(%latitude, %longitude, "Reverse geocoding cache hit");
                return Ok(address);
            }
        }

        self.rate_limit().await;

        let url = format!("{}/reverse", self.config.base_url);
        let params = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("format", "json".to_string()),
        ];

        debug!(%latitude, %longitude, "Reverse geocoding");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| GeocodingError::from_send(&e))?;

        if !response.status().is_success() {
            return Err(GeocodingError::from_status(response.status()));
        }

        let result: RawReverseResult = response
            .json()
            .await
            .map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        let address = result
            .display_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| GeocodingError::AddressNotFound(format!("{latitude},{longitude}")))?;

        if let Some(cache) = &self.reverse_cache {
            cache.insert(cache_key, address.clone()).await;
        }

        Ok(address)
    }
}

/// Raw Nominatim reverse response; an unresolvable point yields `{"error": ...}`
#[derive(Debug, Deserialize)]
struct RawReverseResult {
    display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominatim_config_default() {
        let config = NominatimConfig::default();
        assert_eq!(config.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.country_filter, "lk");
        assert_eq!(config.min_interval_ms, 1100);
    }

    #[test]
    fn test_nominatim_config_for_testing() {
        let config = NominatimConfig::for_testing();
        assert_eq!(config.cache_ttl_hours, 0);
        assert_eq!(config.min_interval_ms, 0);
    }

    #[test]
    fn test_geocoding_error_display() {
        let err = GeocodingError::AddressNotFound("6.03,80.21".to_string());
        assert!(err.to_string().contains("6.03,80.21"));

        let err = GeocodingError::Timeout;
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_country_filter_resolution() {
        let client = NominatimGeocodingClient::new(&NominatimConfig::for_testing()).unwrap();
        assert_eq!(client.country_filter(None), Some("lk"));
        assert_eq!(client.country_filter(Some("in")), Some("in"));
        assert_eq!(client.country_filter(Some("")), None);
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"[
            {"place_id": 1, "display_name": "Galle", "lat": "6.05", "lon": "80.22"},
            {"place_id": 2, "display_name": "Broken", "lat": "x", "lon": "80.22"}
        ]"#;
        let places = NominatimGeocodingClient::parse_search_response(json).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].display_name, "Galle");
    }

    #[test]
    fn test_parse_search_empty_result() {
        let places = NominatimGeocodingClient::parse_search_response("[]").unwrap();
        assert!(places.is_empty());
    }

    #[test]
    fn test_parse_search_not_an_array() {
        assert!(NominatimGeocodingClient::parse_search_response(r#"{"error":"x"}"#).is_err());
    }

    #[test]
    fn test_reverse_cache_key_rounds() {
        assert_eq!(
            NominatimGeocodingClient::reverse_cache_key(6.032_912_3, 80.216_8),
            "6.03291,80.21680"
        );
    }

    #[tokio::test]
    async fn test_blank_search_short_circuits() {
        let client = NominatimGeocodingClient::new(&NominatimConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..NominatimConfig::for_testing()
        })
        .unwrap();
        let places = client.search("   ", 5, None).await.unwrap();
        assert!(places.is_empty());
    }
}
