//! Validation of user-entered numbers.

use std::ops::RangeInclusive;

use depomap_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which map a value is entered for; each view has its own radius range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapView {
    #[default]
    Turkey,
    World,
}

impl MapView {
    /// Accepted coverage radius, in kilometers.
    pub fn radius_range(&self) -> RangeInclusive<f64> {
        match self {
            MapView::Turkey => 10.0..=600.0,
            MapView::World => 50.0..=500.0,
        }
    }
}

/// Accept a coverage radius for `view`.
pub fn validate_radius(view: MapView, radius_km: f64) -> Result<f64> {
    let range = view.radius_range();
    if !radius_km.is_finite() || !range.contains(&radius_km) {
        return Err(Error::invalid_number(
            "radius_km",
            radius_km,
            format!("must be within [{}, {}]", range.start(), range.end()),
        ));
    }
    Ok(radius_km)
}

/// Accept a store count: a finite, non-negative integer.
pub fn validate_count(value: f64) -> Result<u32> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(Error::invalid_number("store_count", value, "must be a non-negative integer"));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_ranges() {
        assert_eq!(validate_radius(MapView::Turkey, 10.0).unwrap(), 10.0);
        assert_eq!(validate_radius(MapView::Turkey, 600.0).unwrap(), 600.0);
        assert!(validate_radius(MapView::Turkey, 9.9).is_err());
        assert!(validate_radius(MapView::Turkey, 601.0).is_err());
        assert!(validate_radius(MapView::World, 40.0).is_err());
        assert!(validate_radius(MapView::World, 500.0).is_ok());
        assert!(validate_radius(MapView::Turkey, f64::NAN).is_err());
        assert!(validate_radius(MapView::Turkey, f64::INFINITY).is_err());
    }

    #[test]
    fn test_counts() {
        assert_eq!(validate_count(0.0).unwrap(), 0);
        assert_eq!(validate_count(42.0).unwrap(), 42);
        assert!(validate_count(-1.0).is_err());
        assert!(validate_count(2.5).is_err());
        assert!(validate_count(f64::NAN).is_err());
    }
}
