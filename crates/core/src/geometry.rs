//! Geographic points and planar bounding boxes

use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Axis-aligned bounding box on the planar map surface.
///
/// `y` grows downwards, as in SVG user space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Bounds of a single point (zero area).
    pub fn from_point(p: Coord<f64>) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    /// Bounds enclosing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Self::from_point(first);
        for p in iter {
            b.extend(p);
        }
        Some(b)
    }

    /// Grow to include `p`.
    pub fn extend(&mut self, p: Coord<f64>) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Bounding-box center.
    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: self.min_x + self.width() / 2.0,
            y: self.min_y + self.height() / 2.0,
        }
    }

    /// Point at fractional position (`fx`, `fy`) inside the box, measured
    /// from the top-left corner.
    pub fn fraction(&self, fx: f64, fy: f64) -> Coord<f64> {
        Coord {
            x: self.min_x + self.width() * fx,
            y: self.min_y + self.height() * fy,
        }
    }

    /// Check if two boxes intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points_and_center() {
        let b = Bounds::from_points([
            Coord { x: 10.0, y: 20.0 },
            Coord { x: 30.0, y: 5.0 },
            Coord { x: 15.0, y: 40.0 },
        ])
        .unwrap();

        assert_relative_eq!(b.min_x, 10.0);
        assert_relative_eq!(b.max_y, 40.0);
        let c = b.center();
        assert_relative_eq!(c.x, 20.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 22.5, epsilon = 1e-12);
    }

    #[test]
    fn test_from_points_empty() {
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_fraction() {
        let b = Bounds::new(100.0, 50.0, 200.0, 150.0);
        let p = b.fraction(0.15, 0.45);
        assert_relative_eq!(p.x, 115.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 95.0, epsilon = 1e-12);
    }

    #[test]
    fn test_union_and_intersects() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 5.0, 20.0, 12.0);
        let u = a.union(&b);
        assert_eq!(u, Bounds::new(0.0, 0.0, 20.0, 12.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&Bounds::new(11.0, 11.0, 12.0, 12.0)));
    }
}
