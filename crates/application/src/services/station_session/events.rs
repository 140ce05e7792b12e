//! Notifications pushed to the UI collaborator

use domain::{Coordinate, RouteInfo, SearchResult};
use serde::Serialize;

use super::state::SessionPhase;

/// Something the ride screen should react to
///
/// Delivered through a broadcast channel; a slow subscriber may miss events
/// but can always re-read the full state with `snapshot()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session left `Initializing` or switched location mode
    PhaseChanged { phase: SessionPhase },
    /// The station list was replaced
    StationsUpdated { count: usize, center: Coordinate },
    /// A discovery attempt failed; the previous list is still shown
    DiscoveryFailed { message: String },
    /// Place search results were replaced
    SearchResultsUpdated { count: usize },
    /// The map should recentre on a picked place
    FocusRequested { place: SearchResult },
    /// A route is now shown
    RouteReady { info: RouteInfo },
    /// A directions request failed
    RouteFailed { message: String },
    /// The route overlay was removed
    RouteCleared,
}
