//! Geocoding adapter - Implements GeocodingPort using Nominatim and OSRM

use std::sync::Arc;

use application::{error::ApplicationError, ports::GeocodingPort};
use async_trait::async_trait;
use domain::{Coordinate, Route, RouteInfo, RoutePath, SearchResult};
use integration_osm::{DrivingRoute, GeocodingClient, Place, RoutingClient};
use tracing::{debug, instrument, warn};

/// Default maximum number of place search results
pub const DEFAULT_SEARCH_LIMIT: u8 = 5;

/// Place search and reverse geocoding via Nominatim, driving routes via OSRM
pub struct GeocodingAdapter {
    geocoder: Arc<dyn GeocodingClient>,
    router: Arc<dyn RoutingClient>,
    search_limit: u8,
}

impl std::fmt::Debug for GeocodingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingAdapter")
            .field("geocoder", &"GeocodingClient")
            .field("router", &"RoutingClient")
            .field("search_limit", &self.search_limit)
            .finish()
    }
}

impl GeocodingAdapter {
    /// Create a new adapter
    pub fn new(geocoder: Arc<dyn GeocodingClient>, router: Arc<dyn RoutingClient>) -> Self {
        Self {
            geocoder,
            router,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Override the maximum number of search results
    #[must_use]
    pub fn with_search_limit(mut self, limit: u8) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    fn to_search_result(place: Place) -> SearchResult {
        SearchResult {
            place_id: place.place_id,
            display_name: place.display_name,
            location: place.location,
        }
    }

    fn to_route(route: DrivingRoute) -> Route {
        Route {
            info: RouteInfo::from_measurements(route.distance_meters, route.duration_seconds),
            path: RoutePath::new(route.path),
        }
    }
}

#[async_trait]
impl GeocodingPort for GeocodingAdapter {
    #[instrument(skip(self))]
    async fn search_places(&self, text: &str, country_filter: Option<String>) -> Vec<SearchResult> {
        let query = text.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self
            .geocoder
            .search(query, self.search_limit, country_filter.as_deref())
            .await
        {
            Ok(places) => {
                debug!(count = places.len(), "Place search completed");
                places
                    .into_iter()
                    .take(usize::from(self.search_limit))
                    .map(Self::to_search_result)
                    .collect()
            },
            Err(e) => {
                let err = ApplicationError::SearchFailed(e.to_string());
                warn!(error = %err, "Place search failed, showing no results");
                Vec::new()
            },
        }
    }

    #[instrument(skip(self), fields(point = %point))]
    async fn reverse_geocode(&self, point: Coordinate) -> Option<String> {
        match self
            .geocoder
            .reverse_geocode(point.latitude(), point.longitude())
            .await
        {
            Ok(address) => Some(address),
            Err(e) => {
                warn!(error = %e, "Reverse geocoding failed");
                None
            },
        }
    }

    #[instrument(skip(self), fields(start = %start, end = %end))]
    async fn fetch_route(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<Option<Route>, ApplicationError> {
        let route = self
            .router
            .fetch_route(
                start.latitude(),
                start.longitude(),
                end.latitude(),
                end.longitude(),
            )
            .await
            .map_err(|e| ApplicationError::RouteFetchFailed(e.to_string()))?;

        if route.is_none() {
            debug!("Routing service reports no route");
        }
        Ok(route.map(Self::to_route))
    }
}
