//! Ride session configuration

use std::time::Duration;

use domain::Coordinate;
use serde::{Deserialize, Serialize};

use crate::ports::WatchOptions;

/// Tunables of the station session controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Position used when the device location is unavailable
    #[serde(default = "default_location")]
    pub default_location: Coordinate,

    /// Movement in kilometers since the last successful fetch that triggers a new one
    #[serde(default = "default_refetch_threshold_km")]
    pub refetch_threshold_km: f64,

    /// Station search radius in meters
    #[serde(default = "default_search_radius_m")]
    pub search_radius_m: u32,

    /// Quiet period before a place search is sent
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Shortest query (in characters, after trimming) that is searched
    #[serde(default = "default_min_search_chars")]
    pub min_search_chars: usize,

    /// Maximum number of place search results
    #[serde(default = "default_search_result_limit")]
    pub search_result_limit: u8,

    /// ISO 3166-1 country code filter for place search
    #[serde(default)]
    pub search_country: Option<String>,

    /// Position watch hints
    #[serde(default)]
    pub watch: WatchOptions,

    /// Buffer size of the session event channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

const fn default_location() -> Coordinate {
    Coordinate::DEFAULT_RIDE_ORIGIN
}

const fn default_refetch_threshold_km() -> f64 {
    2.0
}

const fn default_search_radius_m() -> u32 {
    10_000
}

const fn default_search_debounce_ms() -> u64 {
    500
}

const fn default_min_search_chars() -> usize {
    3
}

const fn default_search_result_limit() -> u8 {
    5
}

const fn default_event_capacity() -> usize {
    64
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_location: default_location(),
            refetch_threshold_km: default_refetch_threshold_km(),
            search_radius_m: default_search_radius_m(),
            search_debounce_ms: default_search_debounce_ms(),
            min_search_chars: default_min_search_chars(),
            search_result_limit: default_search_result_limit(),
            search_country: None,
            watch: WatchOptions::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl SessionConfig {
    /// Create a config for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            event_capacity: 16,
            ..Self::default()
        }
    }

    /// Debounce as a duration
    #[must_use]
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if Coordinate::new(
            self.default_location.latitude(),
            self.default_location.longitude(),
        )
        .is_err()
        {
            return Err(format!(
                "default_location out of range: {}",
                self.default_location
            ));
        }
        if !self.refetch_threshold_km.is_finite() || self.refetch_threshold_km < 0.0 {
            return Err("refetch_threshold_km must be a non-negative number".to_string());
        }
        if self.search_radius_m == 0 {
            return Err("search_radius_m must be greater than 0".to_string());
        }
        if self.min_search_chars == 0 {
            return Err("min_search_chars must be at least 1".to_string());
        }
        if self.search_result_limit == 0 {
            return Err("search_result_limit must be greater than 0".to_string());
        }
        if self.event_capacity == 0 {
            return Err("event_capacity must be greater than 0".to_string());
        }
        if let Some(country) = &self.search_country {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(format!("search_country must be a two-letter code: {country}"));
            }
        }
        Ok(())
    }
}
