//! Great-circle math used for station distances and refetch throttling

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Convert degrees to radians
#[must_use]
pub fn degrees_to_radians(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// Round a value to one decimal place
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Haversine great-circle distance in kilometers, rounded to one decimal
///
/// The rounding happens once on the final value, so the result is symmetric
/// in its arguments and exactly `0.0` for identical points.
#[must_use]
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    round_to_tenth(EARTH_RADIUS_KM * central_angle(lat1, lon1, lat2, lon2))
}

/// Unrounded great-circle distance in meters
///
/// For sub-kilometer decisions such as minimum movement between location
/// updates, where one-decimal kilometers are too coarse.
#[must_use]
pub fn great_circle_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    EARTH_RADIUS_KM * 1000.0 * central_angle(lat1, lon1, lat2, lon2)
}

fn central_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = degrees_to_radians(lat2 - lat1);
    let d_lon = degrees_to_radians(lon2 - lon1);

    let a = (degrees_to_radians(lat1).cos() * degrees_to_radians(lat2).cos()).mul_add(
        (d_lon / 2.0).sin().powi(2),
        (d_lat / 2.0).sin().powi(2),
    );
    // Floating error can push `a` marginally outside [0, 1] for antipodal points
    let a = a.clamp(0.0, 1.0);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}
