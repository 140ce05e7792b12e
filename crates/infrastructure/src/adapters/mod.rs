//! Adapters implementing application ports on top of the OSM clients

mod geocoding_adapter;
mod station_discovery_adapter;

pub use geocoding_adapter::{DEFAULT_SEARCH_LIMIT, GeocodingAdapter};
pub use station_discovery_adapter::StationDiscoveryAdapter;
