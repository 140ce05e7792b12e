//! Typed records parsed from the OSM service payloads
//!
//! Each `from_json` constructor validates one raw entry and returns `None`
//! for anything malformed, so a single bad element never sinks a response.

use domain::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node tagged `amenity=fuel`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelNode {
    /// OpenStreetMap node id
    pub id: i64,
    /// Node position
    pub location: Coordinate,
    /// Value of the `name` tag, if any
    pub name: Option<String>,
}

impl FuelNode {
    /// Parse one Overpass `elements[]` entry
    pub(crate) fn from_json(value: &Value) -> Option<Self> {
        let id = value.get("id")?.as_i64()?;
        let lat = value.get("lat")?.as_f64()?;
        let lon = value.get("lon")?.as_f64()?;
        let location = Coordinate::new(lat, lon).ok()?;
        let name = value
            .get("tags")
            .and_then(|tags| tags.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self { id, location, name })
    }
}

/// A place returned by Nominatim search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Nominatim place id
    pub place_id: i64,
    /// Full display name
    pub display_name: String,
    /// Place position
    pub location: Coordinate,
}

impl Place {
    /// Parse one Nominatim search result
    ///
    /// Nominatim serializes `lat`/`lon` as strings; numbers are accepted too.
    pub(crate) fn from_json(value: &Value) -> Option<Self> {
        let place_id = value.get("place_id")?.as_i64()?;
        let display_name = value.get("display_name")?.as_str()?.to_string();
        let lat = number_or_string(value.get("lat")?)?;
        let lon = number_or_string(value.get("lon")?)?;
        let location = Coordinate::new(lat, lon).ok()?;

        Some(Self {
            place_id,
            display_name,
            location,
        })
    }
}

/// A driving route as reported by OSRM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingRoute {
    /// Route geometry, reordered from GeoJSON `[lon, lat]` pairs
    pub path: Vec<Coordinate>,
    /// Total distance in meters
    pub distance_meters: f64,
    /// Total duration in seconds
    pub duration_seconds: f64,
}

impl DrivingRoute {
    /// Parse one OSRM `routes[]` entry
    pub(crate) fn from_json(value: &Value) -> Option<Self> {
        let distance_meters = value.get("distance")?.as_f64()?;
        let duration_seconds = value.get("duration")?.as_f64()?;
        let path = value
            .get("geometry")
            .and_then(|g| g.get("coordinates"))
            .and_then(Value::as_array)
            .map(|pairs| pairs.iter().filter_map(lon_lat_pair).collect())
            .unwrap_or_default();

        Some(Self {
            path,
            distance_meters,
            duration_seconds,
        })
    }
}

/// Convert a GeoJSON `[lon, lat]` pair to a coordinate
fn lon_lat_pair(pair: &Value) -> Option<Coordinate> {
    let pair = pair.as_array()?;
    let lon = pair.first()?.as_f64()?;
    let lat = pair.get(1)?.as_f64()?;
    Coordinate::new(lat, lon).ok()
}

fn number_or_string(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
