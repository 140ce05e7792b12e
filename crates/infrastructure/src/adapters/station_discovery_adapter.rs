//! Station discovery adapter - Implements StationDiscoveryPort using Overpass

use std::sync::Arc;

use application::{error::ApplicationError, ports::StationDiscoveryPort};
use async_trait::async_trait;
use domain::{Coordinate, PriceBand, Station, sort_by_distance};
use integration_osm::{FuelNode, PoiClient};
use rand::Rng;
use tracing::{debug, instrument, warn};

/// Fuel stations near a point, with synthesized prices
///
/// The map data carries no prices, so every station gets a price drawn
/// uniformly from the configured [`PriceBand`].
pub struct StationDiscoveryAdapter {
    client: Arc<dyn PoiClient>,
    prices: PriceBand,
}

impl std::fmt::Debug for StationDiscoveryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationDiscoveryAdapter")
            .field("client", &"PoiClient")
            .field("prices", &self.prices)
            .finish()
    }
}

impl StationDiscoveryAdapter {
    /// Create a new adapter
    pub fn new(client: Arc<dyn PoiClient>, prices: PriceBand) -> Self {
        Self { client, prices }
    }

    fn to_station(&self, node: FuelNode, center: &Coordinate, unit: f64) -> Station {
        Station::measured_from(
            node.id.to_string(),
            node.name,
            self.prices.sample(unit),
            node.location,
            center,
        )
    }
}

#[async_trait]
impl StationDiscoveryPort for StationDiscoveryAdapter {
    #[instrument(skip(self), fields(center = %center))]
    async fn find_nearby_stations(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<Station>, ApplicationError> {
        let nodes = self
            .client
            .find_fuel_stations(center.latitude(), center.longitude(), radius_m)
            .await
            .map_err(|e| {
                warn!(error = %e, retryable = e.is_retryable(), "Fuel station query failed");
                ApplicationError::DiscoveryFailed(e.to_string())
            })?;

        let mut rng = rand::rng();
        let mut stations: Vec<Station> = nodes
            .into_iter()
            .map(|node| self.to_station(node, &center, rng.random::<f64>()))
            .collect();
        sort_by_distance(&mut stations);

        debug!(count = stations.len(), "Mapped fuel stations");
        Ok(stations)
    }
}
