//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod geocoding_port;
mod location_port;
mod station_discovery_port;

#[cfg(test)]
pub use geocoding_port::MockGeocodingPort;
pub use geocoding_port::GeocodingPort;
#[cfg(test)]
pub use location_port::MockLocationPort;
pub use location_port::{
    LocationAccuracy, LocationPort, PermissionStatus, PositionWatch, WatchOptions,
    WatchSubscription,
};
#[cfg(test)]
pub use station_discovery_port::MockStationDiscoveryPort;
pub use station_discovery_port::StationDiscoveryPort;
