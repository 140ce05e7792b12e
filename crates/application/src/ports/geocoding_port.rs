//! Geocoding and routing port

use async_trait::async_trait;
use domain::{Coordinate, Route, SearchResult};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Place search, reverse geocoding and driving routes
///
/// Search and reverse lookups are best effort and never fail: a failed
/// request looks the same as "nothing found". Routing distinguishes "no route
/// exists" (`Ok(None)`) from "could not ask" (`Err`).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Free-text place search, at most a handful of ranked matches
    ///
    /// Blank input returns an empty list without a request.
    async fn search_places(&self, text: &str, country_filter: Option<String>)
    -> Vec<SearchResult>;

    /// Human-readable address of a point
    async fn reverse_geocode(&self, point: Coordinate) -> Option<String>;

    /// Driving route between two points
    ///
    /// # Errors
    ///
    /// Returns `RouteFetchFailed` on network or parse failure.
    async fn fetch_route(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<Option<Route>, ApplicationError>;
}
