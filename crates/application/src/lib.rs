//! Application layer - Use cases and orchestration
//!
//! Defines the ports the ride screen needs from the outside world (device
//! location, station discovery, geocoding and routing) and the
//! [`StationSession`] controller that coordinates them.

pub mod config;
pub mod error;
pub mod ports;
pub mod services;

pub use config::SessionConfig;
pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
