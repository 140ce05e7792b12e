//! Value objects

mod coordinate;

pub use coordinate::{Coordinate, InvalidCoordinates};
