//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports on top of the OpenStreetMap clients,
//! provides location sources, and loads configuration and logging.

pub mod adapters;
pub mod config;
pub mod location;
pub mod telemetry;
pub mod wiring;

pub use adapters::*;
pub use config::AppConfig;
pub use location::{
    ChannelLocationSource, LocationFeed, ReplayLocationSource, UnsupportedLocationSource,
};
pub use telemetry::{LoggingConfig, TelemetryError, init_logging};
pub use wiring::{OsmAdapters, WiringError, build_osm_adapters};
