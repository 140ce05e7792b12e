//! Construction of the production adapters from configuration

use std::sync::Arc;

use application::{GeocodingPort, StationDiscoveryPort};
use integration_osm::{
    GeocodingError, NominatimGeocodingClient, OsmError, OsrmClient, OverpassClient,
};
use thiserror::Error;
use tracing::info;

use crate::{
    adapters::{GeocodingAdapter, StationDiscoveryAdapter},
    config::AppConfig,
};

/// Errors raised while building the HTTP-backed adapters
#[derive(Debug, Error)]
pub enum WiringError {
    /// Overpass or OSRM client construction failed
    #[error(transparent)]
    Osm(#[from] OsmError),

    /// Nominatim client construction failed
    #[error(transparent)]
    Geocoding(#[from] GeocodingError),
}

/// The discovery and geocoding ports backed by OpenStreetMap services
#[derive(Clone)]
pub struct OsmAdapters {
    pub discovery: Arc<dyn StationDiscoveryPort>,
    pub geocoding: Arc<dyn GeocodingPort>,
}

impl std::fmt::Debug for OsmAdapters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsmAdapters").finish_non_exhaustive()
    }
}

/// Build Overpass, Nominatim and OSRM clients and wrap them in adapters
pub fn build_osm_adapters(config: &AppConfig) -> Result<OsmAdapters, WiringError> {
    let overpass = OverpassClient::new(&config.overpass)?;
    let nominatim = NominatimGeocodingClient::new(&config.nominatim)?;
    let osrm = OsrmClient::new(&config.osrm)?;

    info!(
        overpass = %config.overpass.base_url,
        nominatim = %config.nominatim.base_url,
        osrm = %config.osrm.base_url,
        "OSM adapters ready"
    );

    Ok(OsmAdapters {
        discovery: Arc::new(StationDiscoveryAdapter::new(
            Arc::new(overpass),
            config.pricing,
        )),
        geocoding: Arc::new(
            GeocodingAdapter::new(Arc::new(nominatim), Arc::new(osrm))
                .with_search_limit(config.session.search_result_limit),
        ),
    })
}
