//! Geographic ↔ planar projections for the map surface.
//!
//! Two projections are provided:
//!
//! - [`Projection`]: linear (equirectangular) mapping of a regional bounding
//!   box onto an SVG viewport. This is what the province map uses.
//! - [`WebMercator`]: the world view projection.
//!
//! Both implement [`Project`], which is also implemented for any
//! `Fn(GeoPoint) -> Coord<f64>` so callers can pass ad hoc projections.
//!
//! ```text
//! x = vp.x + (lon - min_lon) / (max_lon - min_lon) * vp.width
//! y = vp.y + (max_lat - lat) / (max_lat - min_lat) * vp.height
//! ```
//!
//! No clamping is applied: coordinates outside the bounding box project
//! outside the viewport. Rings for large radii legitimately do that.

use std::f64::consts::{FRAC_PI_4, PI};
use std::fmt;
use std::str::FromStr;

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Bounds, GeoPoint};

/// Anything that maps a geographic point onto the planar surface.
pub trait Project {
    fn to_planar(&self, p: GeoPoint) -> Coord<f64>;
}

impl<F> Project for F
where
    F: Fn(GeoPoint) -> Coord<f64>,
{
    fn to_planar(&self, p: GeoPoint) -> Coord<f64> {
        self(p)
    }
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    /// Approximate bounding box of Turkey used by the province base map.
    pub const TURKEY: GeoBounds = GeoBounds {
        min_lon: 26.0,
        max_lon: 44.8,
        min_lat: 35.8,
        max_lat: 42.1,
    };

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lon >= self.min_lon && p.lon <= self.max_lon && p.lat >= self.min_lat && p.lat <= self.max_lat
    }

    fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self::TURKEY
    }
}

/// Destination rectangle in planar (SVG user) units, i.e. a `viewBox`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Fallback used when a base map carries no `viewBox`.
    pub const DEFAULT: Viewport = Viewport {
        x: 0.0,
        y: 0.0,
        width: 1000.0,
        height: 618.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Parse an SVG `viewBox` value: four numbers separated by whitespace
    /// and/or commas.
    pub fn parse(s: &str) -> Result<Self> {
        let nums: Vec<f64> = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::InvalidParameter {
                name: "viewBox",
                value: s.to_string(),
                reason: e.to_string(),
            })?;

        match nums.as_slice() {
            [x, y, w, h] => Ok(Self::new(*x, *y, *w, *h)),
            _ => Err(Error::InvalidParameter {
                name: "viewBox",
                value: s.to_string(),
                reason: format!("expected 4 numbers, got {}", nums.len()),
            }),
        }
    }

    /// Enlarge the viewport around its center by `factor`, which shows a
    /// wider area of the map (zoom out for `factor > 1`).
    pub fn zoomed_out(&self, factor: f64) -> Self {
        let w = self.width * factor;
        let h = self.height * factor;
        Self {
            x: self.x - (w - self.width) / 2.0,
            y: self.y - (h - self.height) / 2.0,
            width: w,
            height: h,
        }
    }

    /// Viewport framing `bounds` with `padding` (a fraction of the larger
    /// side) on every edge.
    pub fn framing(bounds: &Bounds, padding: f64) -> Self {
        let pad = bounds.width().max(bounds.height()) * padding;
        Self::new(
            bounds.min_x - pad,
            bounds.min_y - pad,
            bounds.width() + pad * 2.0,
            bounds.height() + pad * 2.0,
        )
    }

    fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::invalid_number("viewport.width", self.width, "must be > 0"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(Error::invalid_number("viewport.height", self.height, "must be > 0"));
        }
        Ok(())
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for Viewport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

/// Equirectangular mapping between a geographic box and a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    bounds: GeoBounds,
    viewport: Viewport,
}

impl Projection {
    /// Create a projection. Fails on a degenerate bounding box or an empty
    /// viewport, either of which would divide by zero.
    pub fn new(bounds: GeoBounds, viewport: Viewport) -> Result<Self> {
        if !(bounds.lon_span().is_finite() && bounds.lon_span() > 0.0) {
            return Err(Error::invalid_number(
                "bounds.max_lon",
                bounds.max_lon,
                "must be greater than min_lon",
            ));
        }
        if !(bounds.lat_span().is_finite() && bounds.lat_span() > 0.0) {
            return Err(Error::invalid_number(
                "bounds.max_lat",
                bounds.max_lat,
                "must be greater than min_lat",
            ));
        }
        viewport.validate()?;
        Ok(Self { bounds, viewport })
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Geographic → planar.
    pub fn to_planar(&self, lat: f64, lon: f64) -> Coord<f64> {
        let b = &self.bounds;
        let vp = &self.viewport;
        Coord {
            x: vp.x + (lon - b.min_lon) / b.lon_span() * vp.width,
            y: vp.y + (b.max_lat - lat) / b.lat_span() * vp.height,
        }
    }

    /// Planar → geographic. Exact inverse of [`Projection::to_planar`].
    pub fn to_geo(&self, x: f64, y: f64) -> GeoPoint {
        let b = &self.bounds;
        let vp = &self.viewport;
        GeoPoint {
            lon: b.min_lon + (x - vp.x) / vp.width * b.lon_span(),
            lat: b.max_lat - (y - vp.y) / vp.height * b.lat_span(),
        }
    }
}

impl Project for Projection {
    fn to_planar(&self, p: GeoPoint) -> Coord<f64> {
        Projection::to_planar(self, p.lat, p.lon)
    }
}

/// Spherical Web Mercator scaled onto a viewport covering the whole world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    viewport: Viewport,
}

impl WebMercator {
    /// Latitude where the square Web Mercator world ends.
    pub const MAX_LAT: f64 = 85.051_128_78;

    pub fn new(viewport: Viewport) -> Result<Self> {
        viewport.validate()?;
        Ok(Self { viewport })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn to_planar(&self, lat: f64, lon: f64) -> Coord<f64> {
        let lat = lat.clamp(-Self::MAX_LAT, Self::MAX_LAT).to_radians();
        let vp = &self.viewport;
        let merc_y = (FRAC_PI_4 + lat / 2.0).tan().ln();
        Coord {
            x: vp.x + (lon + 180.0) / 360.0 * vp.width,
            y: vp.y + (1.0 - merc_y / PI) / 2.0 * vp.height,
        }
    }

    pub fn to_geo(&self, x: f64, y: f64) -> GeoPoint {
        let vp = &self.viewport;
        let lon = (x - vp.x) / vp.width * 360.0 - 180.0;
        let merc_y = (1.0 - 2.0 * (y - vp.y) / vp.height) * PI;
        let lat = (2.0 * merc_y.exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
        GeoPoint { lat, lon }
    }
}

impl Project for WebMercator {
    fn to_planar(&self, p: GeoPoint) -> Coord<f64> {
        WebMercator::to_planar(self, p.lat, p.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn turkey() -> Projection {
        Projection::new(GeoBounds::TURKEY, Viewport::new(0.0, 0.0, 1000.0, 618.0)).unwrap()
    }

    #[test]
    fn test_corners() {
        let p = turkey();
        let nw = p.to_planar(42.1, 26.0);
        assert_relative_eq!(nw.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(nw.y, 0.0, epsilon = 1e-12);

        let se = p.to_planar(35.8, 44.8);
        assert_relative_eq!(se.x, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(se.y, 618.0, epsilon = 1e-9);
    }

    #[test]
    fn test_roundtrip_inside_bounds() {
        let p = turkey();
        let mut lat = 35.8;
        while lat <= 42.1 {
            let mut lon = 26.0;
            while lon <= 44.8 {
                let c = p.to_planar(lat, lon);
                let g = p.to_geo(c.x, c.y);
                assert_relative_eq!(g.lat, lat, epsilon = 1e-9);
                assert_relative_eq!(g.lon, lon, epsilon = 1e-9);
                lon += 0.37;
            }
            lat += 0.29;
        }
    }

    #[test]
    fn test_roundtrip_with_offset_viewport() {
        let vp = Viewport::new(-75.0, -46.35, 1150.0, 710.7);
        let p = Projection::new(GeoBounds::TURKEY, vp).unwrap();
        let c = p.to_planar(39.93, 32.85);
        let g = p.to_geo(c.x, c.y);
        assert_relative_eq!(g.lat, 39.93, epsilon = 1e-9);
        assert_relative_eq!(g.lon, 32.85, epsilon = 1e-9);
    }

    #[test]
    fn test_no_clamping_outside_box() {
        let p = turkey();
        let c = p.to_planar(45.0, 20.0);
        assert!(c.x < 0.0);
        assert!(c.y < 0.0);
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        let flat = GeoBounds { min_lon: 30.0, max_lon: 30.0, ..GeoBounds::TURKEY };
        assert!(Projection::new(flat, Viewport::DEFAULT).is_err());
        let empty = Viewport::new(0.0, 0.0, 0.0, 10.0);
        assert!(Projection::new(GeoBounds::TURKEY, empty).is_err());
    }

    #[test]
    fn test_viewport_parse() {
        let vp = Viewport::parse("0 0 1000 618").unwrap();
        assert_eq!(vp, Viewport::DEFAULT);
        let vp: Viewport = "10,20, 30 40".parse().unwrap();
        assert_eq!(vp, Viewport::new(10.0, 20.0, 30.0, 40.0));
        assert!(Viewport::parse("1 2 3").is_err());
        assert!(Viewport::parse("a b c d").is_err());
    }

    #[test]
    fn test_viewport_zoom_out_keeps_center() {
        let vp = Viewport::new(0.0, 0.0, 1000.0, 618.0);
        let z = vp.zoomed_out(1.15);
        assert_relative_eq!(z.width, 1150.0, epsilon = 1e-9);
        assert_relative_eq!(z.x, -75.0, epsilon = 1e-9);
        assert_relative_eq!(z.x + z.width / 2.0, 500.0, epsilon = 1e-9);
        assert_relative_eq!(z.y + z.height / 2.0, 309.0, epsilon = 1e-9);
    }

    #[test]
    fn test_viewport_framing() {
        let vp = Viewport::framing(&Bounds::new(10.0, 20.0, 110.0, 70.0), 0.1);
        assert_relative_eq!(vp.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(vp.y, 10.0, epsilon = 1e-9);
        assert_relative_eq!(vp.width, 120.0, epsilon = 1e-9);
        assert_relative_eq!(vp.height, 70.0, epsilon = 1e-9);
    }

    #[test]
    fn test_web_mercator_roundtrip() {
        let m = WebMercator::new(Viewport::new(0.0, 0.0, 1024.0, 1024.0)).unwrap();
        let origin = m.to_planar(0.0, 0.0);
        assert_relative_eq!(origin.x, 512.0, epsilon = 1e-9);
        assert_relative_eq!(origin.y, 512.0, epsilon = 1e-9);

        let c = m.to_planar(41.0, 29.0);
        let g = m.to_geo(c.x, c.y);
        assert_relative_eq!(g.lat, 41.0, epsilon = 1e-9);
        assert_relative_eq!(g.lon, 29.0, epsilon = 1e-9);
    }

    #[test]
    fn test_closure_implements_project() {
        let f = |p: GeoPoint| Coord { x: p.lon, y: -p.lat };
        let c = Project::to_planar(&f, GeoPoint::new(1.0, 2.0));
        assert_eq!(c, Coord { x: 2.0, y: -1.0 });
    }
}
