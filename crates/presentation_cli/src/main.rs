//! FuelTrack CLI
//!
//! Developer harness for the ride-screen core: runs single OSM operations or
//! a whole station session from the terminal.

#![allow(clippy::print_stdout)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use application::{
    GeocodingPort, LocationPort, PermissionStatus, SessionEvent, StationDiscoveryPort,
    StationSession,
};
use clap::{Parser, Subcommand};
use domain::{Coordinate, Station};
use infrastructure::{
    AppConfig, ChannelLocationSource, ReplayLocationSource, UnsupportedLocationSource,
    build_osm_adapters, init_logging,
};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// FuelTrack CLI
#[derive(Parser)]
#[command(name = "fueltrack-cli")]
#[command(author, version, about = "FuelTrack ride-screen harness", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./fueltrack.toml if present)
    #[arg(short, long, env = "FUELTRACK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List fuel stations near a point, nearest first
    Stations {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in meters (defaults to the session radius)
        #[arg(long)]
        radius: Option<u32>,
    },

    /// Free-text place search
    Search {
        /// Text to search for
        text: String,

        /// ISO country code filter (defaults to the session filter)
        #[arg(long)]
        country: Option<String>,
    },

    /// Reverse geocode a point to an address
    Reverse {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Driving route summary between two points
    Route {
        #[arg(long, allow_hyphen_values = true)]
        from_lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        from_lon: f64,

        #[arg(long, allow_hyphen_values = true)]
        to_lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        to_lon: f64,
    },

    /// Run a station session and print its events
    ///
    /// Example: fueltrack-cli ride --track ride.json --directions
    Ride {
        /// JSON array of {latitude, longitude} points to replay
        #[arg(long)]
        track: Option<PathBuf>,

        /// Delay between replayed points in milliseconds
        #[arg(long, default_value = "2000")]
        pacing_ms: u64,

        /// Answer the location prompt with "denied"
        #[arg(long, conflicts_with = "track")]
        deny_permission: bool,

        /// Request directions to the selected station once stations arrive
        #[arg(long)]
        directions: bool,

        /// Stop after this many seconds
        #[arg(long, default_value = "60")]
        duration_secs: u64,
    },
}

fn point(lat: f64, lon: f64) -> anyhow::Result<Coordinate> {
    Coordinate::new(lat, lon).with_context(|| format!("invalid coordinate {lat}, {lon}"))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    config.context("failed to load configuration")
}

/// One line per station, as printed by `stations`
fn format_station(index: usize, station: &Station) -> String {
    format!(
        "{:>2}. {} ({:.1} km) LKR {:.2}/l [{}]",
        index + 1,
        station.name,
        station.distance_km,
        station.price_per_liter,
        station.location
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;
    let adapters = build_osm_adapters(&config)?;

    match cli.command {
        Commands::Stations { lat, lon, radius } => {
            let center = point(lat, lon)?;
            let radius = radius.unwrap_or(config.session.search_radius_m);
            let stations = adapters
                .discovery
                .find_nearby_stations(center, radius)
                .await?;

            println!("⛽ {} station(s) within {radius} m of {center}", stations.len());
            for (i, station) in stations.iter().enumerate() {
                println!("{}", format_station(i, station));
            }
        },

        Commands::Search { text, country } => {
            let country = country.or_else(|| config.session.search_country.clone());
            let results = adapters.geocoding.search_places(&text, country).await;
            if results.is_empty() {
                println!("🔍 No places found for \"{}\"", text.trim());
            }
            for result in &results {
                println!("📍 {} [{}]", result.display_name, result.location);
            }
        },

        Commands::Reverse { lat, lon } => {
            let target = point(lat, lon)?;
            match adapters.geocoding.reverse_geocode(target).await {
                Some(address) => println!("🏠 {address}"),
                None => println!("🏠 No address for {target}"),
            }
        },

        Commands::Route {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
        } => {
            let start = point(from_lat, from_lon)?;
            let end = point(to_lat, to_lon)?;
            match adapters.geocoding.fetch_route(start, end).await? {
                Some(route) => println!(
                    "🛣️  {} · {} ({} points)",
                    route.info.distance_label,
                    route.info.duration_label,
                    route.path.len()
                ),
                None => println!("🚫 No driving route from {start} to {end}"),
            }
        },

        Commands::Ride {
            track,
            pacing_ms,
            deny_permission,
            directions,
            duration_secs,
        } => {
            let location: Arc<dyn LocationPort> = if let Some(path) = track {
                let source = ReplayLocationSource::from_file(&path)?
                    .with_pacing(Duration::from_millis(pacing_ms));
                info!(points = source.len(), track = %path.display(), "Replaying track");
                Arc::new(source)
            } else if deny_permission {
                let (source, _feed) = ChannelLocationSource::new(PermissionStatus::DENIED);
                Arc::new(source)
            } else {
                Arc::new(UnsupportedLocationSource)
            };

            let session = StationSession::new(
                location,
                adapters.discovery,
                adapters.geocoding,
                config.session,
            );
            ride(&session, directions, Duration::from_secs(duration_secs)).await?;
        },
    }

    Ok(())
}

async fn ride(
    session: &StationSession,
    directions: bool,
    duration: Duration,
) -> anyhow::Result<()> {
    let mut events = session.subscribe();
    session.initialize().await;

    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);
    let mut routed = false;

    loop {
        tokio::select! {
            () = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    println!("{}", serde_json::to_string(&event)?);
                    if directions && !routed && matches!(event, SessionEvent::StationsUpdated { .. }) {
                        if let Some(station) = session.snapshot().selected_station {
                            routed = true;
                            // The result also arrives as an event
                            let _ = session.request_directions(&station).await;
                        }
                    }
                },
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed, "Event printer lagged");
                },
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    let state = session.snapshot();
    session.dispose();

    println!(
        "🏁 {} station(s), selected: {}",
        state.stations.len(),
        state
            .selected_station
            .as_ref()
            .map_or("none", |s| s.name.as_str())
    );
    if let Some(location) = state.current_location {
        if let Some(address) = session.describe_location(location).await {
            println!("📍 Last position: {address}");
        }
    }
    Ok(())
}
