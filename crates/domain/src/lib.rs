//! Domain layer for FuelTrack
//!
//! Value objects and entities of the ride screen: coordinates, fuel stations,
//! routes and place search results, plus the pure geo math they rely on.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod geo;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use geo::{degrees_to_radians, great_circle_distance_m, haversine_distance_km, round_to_tenth};
pub use value_objects::*;
