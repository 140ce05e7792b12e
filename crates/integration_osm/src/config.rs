//! Overpass and OSRM client configuration

use serde::{Deserialize, Serialize};

/// Identification sent with every request to the public OSM services
pub const DEFAULT_USER_AGENT: &str = "FuelTrack/1.0 (ride screen fuel station finder)";

pub(crate) fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Configuration for the Overpass point-of-interest query service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    /// Base URL of the Overpass API (the `/interpreter` endpoint is appended)
    #[serde(default = "default_overpass_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_overpass_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_overpass_base_url() -> String {
    "https://overpass-api.de/api".to_string()
}

const fn default_overpass_timeout_secs() -> u64 {
    25
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            base_url: default_overpass_base_url(),
            timeout_secs: default_overpass_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl OverpassConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
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

/// Configuration for the OSRM routing service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsrmConfig {
    /// Base URL of the OSRM HTTP API
    #[serde(default = "default_osrm_base_url")]
    pub base_url: String,

    /// Routing profile (`driving` on the public demo server)
    #[serde(default = "default_osrm_profile")]
    pub profile: String,

    /// Request timeout in seconds
    #[serde(default = "default_osrm_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_osrm_base_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_osrm_profile() -> String {
    "driving".to_string()
}

const fn default_osrm_timeout_secs() -> u64 {
    10
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: default_osrm_base_url(),
            profile: default_osrm_profile(),
            timeout_secs: default_osrm_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl OsrmConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.profile.trim().is_empty() {
            return Err("profile must not be empty".to_string());
        }
        validate_common(&self.base_url, self.timeout_secs, &self.user_agent)
    }
}

pub(crate) fn validate_common(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<(), String> {
    if base_url.is_empty() {
        return Err("base_url must not be empty".to_string());
    }

    if timeout_secs == 0 {
        return Err("timeout_secs must be greater than 0".to_string());
    }

    if user_agent.trim().is_empty() {
        return Err("user_agent must not be empty".to_string());
    }

    Ok(())
}
