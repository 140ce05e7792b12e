//! Observable session state

use domain::{Coordinate, Route, SearchResult, Station};
use serde::Serialize;

/// Top-level lifecycle of the ride screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for the permission answer or the first position
    #[default]
    Initializing,
    /// Following the device position
    ReadyWithLocation,
    /// No device position; anchored at the configured default location
    ReadyDefaultLocation,
}

impl SessionPhase {
    /// Whether initialisation has finished
    #[must_use]
    pub const fn is_ready(self) -> bool {
        !matches!(self, Self::Initializing)
    }
}

/// A driving route shown on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveRoute {
    /// Station the route leads to
    pub target: Station,
    /// Geometry and summary
    pub route: Route,
}

/// Place search sub-state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    /// Latest text typed by the user
    pub query: String,
    /// Results of the latest completed search
    pub results: Vec<SearchResult>,
    /// Whether the result list is shown
    pub visible: bool,
    /// A debounced search request is running
    pub in_flight: bool,
}

/// Snapshot of everything the ride screen renders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub current_location: Option<Coordinate>,
    /// Center of the last successful discovery
    pub last_fetched_location: Option<Coordinate>,
    /// Nearby stations, ascending by distance
    pub stations: Vec<Station>,
    pub selected_station: Option<Station>,
    pub discovery_in_flight: bool,
    pub route: Option<ActiveRoute>,
    pub search: SearchState,
    /// Place picked from the search results, to be highlighted on the map
    pub highlighted_place: Option<SearchResult>,
    pub disposed: bool,
}

impl SessionState {
    /// Where discovery and routing start from
    ///
    /// While initialising only a real device position counts; once ready the
    /// default location stands in for a missing one.
    #[must_use]
    pub fn reference_location(&self, default_location: Coordinate) -> Option<Coordinate> {
        match self.phase {
            SessionPhase::Initializing => self.current_location,
            SessionPhase::ReadyWithLocation | SessionPhase::ReadyDefaultLocation => {
                Some(self.current_location.unwrap_or(default_location))
            },
        }
    }

    /// Whether a route is shown
    #[must_use]
    pub const fn has_route(&self) -> bool {
        self.route.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOMBO: Coordinate = Coordinate::new_unchecked(6.9271, 79.8612);

    #[test]
    fn initial_state() {
        let state = SessionState::default();
        assert_eq!(state.phase, SessionPhase::Initializing);
        assert!(!state.phase.is_ready());
        assert!(state.stations.is_empty());
        assert!(!state.has_route());
        assert!(!state.disposed);
    }

    #[test]
    fn no_reference_while_initializing_without_position() {
        let state = SessionState::default();
        assert_eq!(state.reference_location(Coordinate::DEFAULT_RIDE_ORIGIN), None);
    }

    #[test]
    fn reference_prefers_current_location() {
        let state = SessionState {
            phase: SessionPhase::ReadyWithLocation,
            current_location: Some(COLOMBO),
            ..SessionState::default()
        };
        assert_eq!(
            state.reference_location(Coordinate::DEFAULT_RIDE_ORIGIN),
            Some(COLOMBO)
        );
    }

    #[test]
    fn reference_falls_back_to_default_when_ready() {
        let state = SessionState {
            phase: SessionPhase::ReadyDefaultLocation,
            ..SessionState::default()
        };
        assert_eq!(
            state.reference_location(Coordinate::DEFAULT_RIDE_ORIGIN),
            Some(Coordinate::DEFAULT_RIDE_ORIGIN)
        );
    }

    #[test]
    fn phase_serializes_snake_case() {
        let json = serde_json::to_string(&SessionPhase::ReadyDefaultLocation).unwrap();
        assert_eq!(json, "\"ready_default_location\"");
    }
}
