//! Fuel station discovery port

use async_trait::async_trait;
use domain::{Coordinate, Station};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Finds fuel stations around a point
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StationDiscoveryPort: Send + Sync {
    /// Find stations within `radius_m` meters of `center`
    ///
    /// The result is sorted ascending by `distance_km`. An empty list means
    /// nothing was found and is not an error.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryFailed` on network, timeout or parse failure.
    async fn find_nearby_stations(
        &self,
        center: Coordinate,
        radius_m: u32,
    ) -> Result<Vec<Station>, ApplicationError>;
}
