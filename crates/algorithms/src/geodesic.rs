//! Geodesic coverage rings
//!
//! Builds the closed polygon approximating a circle of constant great-circle
//! distance around a depot, then projects it onto the map surface.
//!
//! The declared radius is a road-travel distance; it is divided by
//! [`ROAD_DISTANCE_FACTOR`] to get the straight-line radius that is drawn.
//!
//! Destination point for bearing θ and angular distance δ = d / R:
//!
//! ```text
//! φ2 = asin(sin φ1 cos δ + cos φ1 sin δ cos θ)
//! λ2 = λ1 + atan2(sin θ sin δ cos φ1, cos δ − sin φ1 sin φ2)
//! ```
//!
//! At φ1 = ±90° the atan2 term is indeterminate; such centers are not
//! special-cased.

use std::fmt::Write;

use depomap_core::{Algorithm, Error, GeoPoint, Project, Result};
use geo::{Coord, LineString};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Road distance / straight-line distance.
pub const ROAD_DISTANCE_FACTOR: f64 = 3.5;

/// Default angular step between ring vertices, in degrees.
pub const DEFAULT_BEARING_STEP_DEG: f64 = 3.0;

/// Parameters for ring construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingParams {
    /// Declared (road) radius in kilometers
    pub radius_km: f64,
    /// Bearing increment in degrees, in (0, 360]
    pub bearing_step_deg: f64,
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            radius_km: 150.0,
            bearing_step_deg: DEFAULT_BEARING_STEP_DEG,
        }
    }
}

/// Straight-line radius drawn for a declared road radius.
pub fn effective_radius_km(radius_km: f64) -> f64 {
    radius_km / ROAD_DISTANCE_FACTOR
}

/// Point reached from `center` after `distance_km` along `bearing_deg`
/// (clockwise from north) on a spherical Earth.
pub fn destination(center: GeoPoint, distance_km: f64, bearing_deg: f64) -> GeoPoint {
    let phi1 = center.lat.to_radians();
    let lambda1 = center.lon.to_radians();
    let delta = distance_km / EARTH_RADIUS_KM;
    let theta = bearing_deg.to_radians();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();

    let sin_phi2 = sin_phi1 * cos_delta + cos_phi1 * sin_delta * theta.cos();
    let phi2 = sin_phi2.asin();
    let y = theta.sin() * sin_delta * cos_phi1;
    let x = cos_delta - sin_phi1 * sin_phi2;
    let lambda2 = lambda1 + y.atan2(x);

    GeoPoint::new(phi2.to_degrees(), lambda2.to_degrees())
}

/// Build a projected coverage ring.
///
/// Vertices are taken at bearings 0, step, 2·step, … below 360 and the
/// first vertex is repeated as the last, so step 3 yields 121 points.
/// A non-positive (or non-finite) radius yields an empty ring.
///
/// # Errors
/// `InvalidParameter` when `bearing_step_deg` is not in (0, 360].
pub fn build_ring<P>(center: GeoPoint, radius_km: f64, project: &P, bearing_step_deg: f64) -> Result<LineString<f64>>
where
    P: Project + ?Sized,
{
    if !(bearing_step_deg.is_finite() && bearing_step_deg > 0.0 && bearing_step_deg <= 360.0) {
        return Err(Error::invalid_number(
            "bearing_step_deg",
            bearing_step_deg,
            "must be in (0, 360]",
        ));
    }
    if !(radius_km.is_finite() && radius_km > 0.0) {
        return Ok(LineString::new(Vec::new()));
    }

    let distance = effective_radius_km(radius_km);
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity((360.0 / bearing_step_deg).ceil() as usize + 1);

    let mut i = 0u32;
    loop {
        let bearing = f64::from(i) * bearing_step_deg;
        if bearing >= 360.0 {
            break;
        }
        coords.push(project.to_planar(destination(center, distance, bearing)));
        i += 1;
    }
    coords.push(coords[0]);

    Ok(LineString::new(coords))
}

/// SVG path data for a ring: `M x y L x y … Z` with two decimals.
/// Empty rings render as an empty string.
pub fn ring_path_data(ring: &LineString<f64>) -> String {
    let mut points = ring.coords();
    let Some(first) = points.next() else {
        return String::new();
    };

    let mut d = format!("M {:.2} {:.2}", first.x, first.y);
    for p in points {
        let _ = write!(d, " L {:.2} {:.2}", p.x, p.y);
    }
    d.push_str(" Z");
    d
}

/// Geodesic ring builder bound to a projection
#[derive(Debug, Clone)]
pub struct GeodesicRing<P> {
    projection: P,
}

impl<P: Project> GeodesicRing<P> {
    pub fn new(projection: P) -> Self {
        Self { projection }
    }
}

impl<P: Project> Algorithm for GeodesicRing<P> {
    type Input = GeoPoint;
    type Output = LineString<f64>;
    type Params = RingParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Geodesic Ring"
    }

    fn description(&self) -> &'static str {
        "Projected polygon of constant great-circle distance around a point"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        build_ring(input, params.radius_km, &self.projection, params.bearing_step_deg)
    }
}
