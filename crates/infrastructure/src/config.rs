//! Application configuration

use std::path::Path;

use application::SessionConfig;
use domain::PriceBand;
use integration_osm::{NominatimConfig, OsrmConfig, OverpassConfig};
use serde::{Deserialize, Serialize};

use crate::telemetry::LoggingConfig;

/// Environment variable prefix, e.g. `FUELTRACK_SESSION__SEARCH_RADIUS_M`
pub const ENV_PREFIX: &str = "FUELTRACK";

/// Default configuration file name (any format the `config` crate reads)
pub const DEFAULT_CONFIG_FILE: &str = "fueltrack";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ride session behaviour
    #[serde(default)]
    pub session: SessionConfig,

    /// Band synthesized station prices are drawn from
    #[serde(default)]
    pub pricing: PriceBand,

    /// Overpass (fuel stations) client
    #[serde(default)]
    pub overpass: OverpassConfig,

    /// Nominatim (search and reverse geocoding) client
    #[serde(default)]
    pub nominatim: NominatimConfig,

    /// OSRM (routing) client
    #[serde(default)]
    pub osrm: OsrmConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from an optional `fueltrack.*` file and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
    }

    /// Load configuration from an explicit file, then the environment
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: Self = config::Config::builder()
            .add_source(file)
            // Override with environment variables (e.g., FUELTRACK_OSRM__TIMEOUT_SECS)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate().map_err(config::ConfigError::Message)?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.session
            .validate()
            .map_err(|e| format!("session: {e}"))?;
        PriceBand::new(self.pricing.min, self.pricing.max)
            .map_err(|e| format!("pricing: {e}"))?;
        self.overpass
            .validate()
            .map_err(|e| format!("overpass: {e}"))?;
        self.nominatim
            .validate()
            .map_err(|e| format!("nominatim: {e}"))?;
        self.osrm.validate().map_err(|e| format!("osrm: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use domain::Coordinate;

    use super::*;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pricing, PriceBand::SYNTHETIC);
        assert_eq!(
            config.session.default_location,
            Coordinate::DEFAULT_RIDE_ORIGIN
        );
    }

    #[test]
    fn load_from_toml_file() {
        let file = write_toml(
            r#"
            [session]
            refetch_threshold_km = 3.5
            search_country = "lk"

            [session.default_location]
            latitude = 6.9271
            longitude = 79.8612

            [pricing]
            min = 350.0
            max = 360.0

            [osrm]
            timeout_secs = 4

            [logging]
            json = true
            "#,
        );

        let config = AppConfig::load_from(file.path()).unwrap();
        assert!((config.session.refetch_threshold_km - 3.5).abs() < f64::EPSILON);
        assert_eq!(config.session.search_country.as_deref(), Some("lk"));
        assert!((config.session.default_location.latitude() - 6.9271).abs() < 1e-9);
        assert!((config.pricing.min - 350.0).abs() < f64::EPSILON);
        assert_eq!(config.osrm.timeout_secs, 4);
        assert!(config.logging.json);
        // Untouched sections keep their defaults
        assert_eq!(config.session.search_radius_m, 10_000);
        assert_eq!(config.nominatim.country_filter, "lk");
    }

    #[test]
    fn invalid_price_band_is_rejected() {
        let file = write_toml(
            r#"
            [pricing]
            min = 380.0
            max = 370.0
            "#,
        );
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("pricing"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(AppConfig::load_from(Path::new("/nonexistent/fueltrack.toml")).is_err());
    }

    #[test]
    fn validate_reports_section() {
        let mut config = AppConfig::default();
        config.session.search_radius_m = 0;
        assert!(config.validate().unwrap_err().starts_with("session:"));
    }
}
