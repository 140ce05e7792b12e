//! Fuel station entity and the synthesized price policy

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::Coordinate;

/// A fuel station discovered near a reference point
///
/// Stations are rebuilt from scratch on every discovery query; the list they
/// belong to is replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Stable external identifier (the OpenStreetMap node id)
    pub id: String,
    /// Display name
    pub name: String,
    /// Price per liter in local currency
    pub price_per_liter: f64,
    /// Station position
    pub location: Coordinate,
    /// Distance from the query center in kilometers, one decimal
    pub distance_km: f64,
}

impl Station {
    /// Name used when the map data carries no `name` tag
    pub const UNNAMED: &'static str = "Unnamed Station";

    /// Build a station, measuring its distance from `center`
    #[must_use]
    pub fn measured_from(
        id: impl Into<String>,
        name: Option<String>,
        price_per_liter: f64,
        location: Coordinate,
        center: &Coordinate,
    ) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| Self::UNNAMED.to_string());

        Self {
            id: id.into(),
            name,
            price_per_liter,
            distance_km: center.distance_km(&location),
            location,
        }
    }

    /// Formatted price label, e.g. "Rs. 368.42"
    #[must_use]
    pub fn price_label(&self) -> String {
        format!("Rs. {:.2}", self.price_per_liter)
    }
}

/// Sort stations ascending by distance
///
/// Stable, so equidistant stations keep their source order. A NaN distance
/// sorts last.
pub fn sort_by_distance(stations: &mut [Station]) {
    stations.sort_by(|a, b| match (a.distance_km.is_nan(), b.distance_km.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.distance_km.total_cmp(&b.distance_km),
    });
}

/// Band from which a price is synthesized when the map source has none
///
/// The point-of-interest service carries no pricing, so every discovered
/// station gets a plausible price drawn uniformly from this band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    /// Lowest synthesized price (inclusive)
    pub min: f64,
    /// Highest synthesized price (exclusive)
    pub max: f64,
}

impl PriceBand {
    /// Default band, in LKR per liter
    pub const SYNTHETIC: Self = Self {
        min: 365.0,
        max: 375.0,
    };

    /// Create a validated band
    ///
    /// # Errors
    ///
    /// Returns a validation error if the bounds are not finite or `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self, DomainError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(DomainError::ValidationError(
                "price band bounds must be finite".to_string(),
            ));
        }
        if min > max {
            return Err(DomainError::ValidationError(format!(
                "price band min {min} exceeds max {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Map a uniform draw in `[0, 1)` into the band
    #[must_use]
    pub fn sample(&self, unit: f64) -> f64 {
        let unit = unit.clamp(0.0, 1.0);
        (self.max - self.min).mul_add(unit, self.min)
    }

    /// Whether `price` lies inside the band
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        (self.min..=self.max).contains(&price)
    }
}

impl Default for PriceBand {
    fn default() -> Self {
        Self::SYNTHETIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, distance_km: f64) -> Station {
        Station {
            id: id.to_string(),
            name: id.to_string(),
            price_per_liter: 370.0,
            location: Coordinate::DEFAULT_RIDE_ORIGIN,
            distance_km,
        }
    }

    #[test]
    fn missing_name_defaults_to_unnamed() {
        let center = Coordinate::DEFAULT_RIDE_ORIGIN;
        let s = Station::measured_from("1", None, 370.0, center, &center);
        assert_eq!(s.name, Station::UNNAMED);

        let s = Station::measured_from("2", Some("   ".to_string()), 370.0, center, &center);
        assert_eq!(s.name, Station::UNNAMED);
    }

    #[test]
    fn measured_from_computes_distance() {
        let center = Coordinate::DEFAULT_RIDE_ORIGIN;
        let location = Coordinate::new_unchecked(6.0509, 80.2168);
        let s = Station::measured_from("7", Some("Lanka Filling".into()), 370.0, location, &center);
        assert!((s.distance_km - 2.0).abs() < f64::EPSILON);
        assert_eq!(s.name, "Lanka Filling");
    }

    #[test]
    fn sort_orders_ascending_with_nan_last() {
        let mut list = vec![
            station("c", 3.2),
            station("nan", f64::NAN),
            station("a", 0.4),
            station("b", 1.1),
        ];
        sort_by_distance(&mut list);
        let ids: Vec<_> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "nan"]);
    }

    #[test]
    fn sort_is_stable_for_equal_distances() {
        let mut list = vec![station("first", 1.0), station("second", 1.0)];
        sort_by_distance(&mut list);
        assert_eq!(list[0].id, "first");
    }

    #[test]
    fn price_band_sample_stays_in_band() {
        let band = PriceBand::SYNTHETIC;
        assert!((band.sample(0.0) - 365.0).abs() < f64::EPSILON);
        assert!((band.sample(0.5) - 370.0).abs() < f64::EPSILON);
        assert!(band.contains(band.sample(0.999)));
        assert!(band.contains(band.sample(7.0)));
    }

    #[test]
    fn price_band_rejects_inverted_bounds() {
        assert!(PriceBand::new(375.0, 365.0).is_err());
        assert!(PriceBand::new(f64::NAN, 365.0).is_err());
        assert!(PriceBand::new(300.0, 300.0).is_ok());
    }

    #[test]
    fn price_label_has_two_decimals() {
        let mut s = station("x", 1.0);
        s.price_per_liter = 368.4;
        assert_eq!(s.price_label(), "Rs. 368.40");
    }
}
