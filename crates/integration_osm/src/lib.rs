//! OpenStreetMap service clients for FuelTrack
//!
//! Thin typed clients for the three public services behind the ride screen:
//!
//! - [Overpass](https://overpass-api.de): fuel stations (`amenity=fuel` nodes)
//!   around a point, via [`OverpassClient`].
//! - [Nominatim](https://nominatim.openstreetmap.org): free-text place search
//!   and reverse geocoding, via [`NominatimGeocodingClient`].
//! - [OSRM](https://router.project-osrm.org): driving routes between two
//!   points, via [`OsrmClient`].
//!
//! # Architecture
//!
//! Each service has a trait ([`PoiClient`], [`GeocodingClient`],
//! [`RoutingClient`]) and one HTTP implementation. Responses are parsed
//! element by element: a malformed entry is dropped instead of failing the
//! whole payload. All clients identify themselves with the configured
//! `User-Agent`, as the public instances require.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_osm::{OverpassClient, OverpassConfig, PoiClient};
//!
//! let client = OverpassClient::new(&OverpassConfig::default())?;
//! let nodes = client.find_fuel_stations(6.0329, 80.2168, 10_000).await?;
//! ```

mod config;
mod error;
mod geocoding;
mod models;
mod overpass;
mod routing;

pub use config::{DEFAULT_USER_AGENT, OsrmConfig, OverpassConfig};
pub use error::OsmError;
pub use geocoding::{GeocodingClient, GeocodingError, NominatimConfig, NominatimGeocodingClient};
pub use models::{DrivingRoute, FuelNode, Place};
pub use overpass::{OverpassClient, PoiClient};
pub use routing::{OsrmClient, RoutingClient};
