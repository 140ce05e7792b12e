//! Driving route overlay

use serde::{Deserialize, Serialize};

use crate::geo::round_to_tenth;
use crate::value_objects::Coordinate;

/// Human-readable route summary shown on the ride screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    /// Total distance, e.g. "12.3 km"
    pub distance_label: String,
    /// Total driving time, e.g. "18 min"
    pub duration_label: String,
}

impl RouteInfo {
    /// Format raw routing measurements
    ///
    /// Distance is shown in kilometers with one decimal, duration in whole
    /// minutes rounded to the nearest minute.
    #[must_use]
    pub fn from_measurements(distance_meters: f64, duration_seconds: f64) -> Self {
        let km = round_to_tenth(distance_meters / 1000.0);
        let minutes = (duration_seconds / 60.0).round();
        Self {
            distance_label: format!("{km:.1} km"),
            duration_label: format!("{minutes:.0} min"),
        }
    }
}

/// Ordered polyline of a route, start to end
///
/// Replaced in full on every route request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePath(Vec<Coordinate>);

impl RoutePath {
    /// Wrap an ordered list of points
    #[must_use]
    pub const fn new(points: Vec<Coordinate>) -> Self {
        Self(points)
    }

    /// All points in order
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    /// Number of points
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First point of the path
    #[must_use]
    pub fn start(&self) -> Option<&Coordinate> {
        self.0.first()
    }

    /// Last point of the path
    #[must_use]
    pub fn end(&self) -> Option<&Coordinate> {
        self.0.last()
    }
}

impl From<Vec<Coordinate>> for RoutePath {
    fn from(points: Vec<Coordinate>) -> Self {
        Self(points)
    }
}

/// A fetched driving route: geometry plus its summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Route geometry
    pub path: RoutePath,
    /// Formatted summary
    pub info: RouteInfo,
}
