//! Coverage orchestration
//!
//! For every selected depot: find its planar anchor, convert it to a
//! geographic center, pick the radius (per-depot override, else global),
//! build the geodesic ring and color it by selection position.
//!
//! Depots that cannot be anchored are skipped and reported; they still
//! occupy their palette slot.

use std::collections::HashMap;

use depomap_colormap::{Palette, Rgb};
use depomap_core::resolve::fold_key;
use depomap_core::{Bounds, GeoPoint, Project, Projection, RegionRegistry, Result, WebMercator};
use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geodesic::{build_ring, DEFAULT_BEARING_STEP_DEG};

/// Fill opacity of a ring's interior.
pub const RING_FILL_OPACITY: f64 = 0.15;
/// Stroke width of a ring's outline.
pub const RING_STROKE_WIDTH: f64 = 2.0;
/// Radius of the depot dot.
pub const DOT_RADIUS: f64 = 6.0;
/// White stroke around the depot dot.
pub const DOT_STROKE_WIDTH: f64 = 3.0;

/// Ordered set of depot identifiers.
///
/// Membership decides which rings are drawn; position only decides color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DepotSelection {
    ids: Vec<String>,
}

impl DepotSelection {
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Append a depot. Returns `false` if it was already selected (compared
    /// with case, diacritics and punctuation folded away).
    pub fn insert(&mut self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() || self.position(id).is_some() {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Remove a depot; later depots move up one palette slot.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(i) => {
                self.ids.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Position of `id` in the selection.
    pub fn position(&self, id: &str) -> Option<usize> {
        let key = fold_key(id);
        self.ids.iter().position(|s| s == id || fold_key(s) == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for DepotSelection {
    /// The seventeen operating depots.
    fn default() -> Self {
        DEFAULT_DEPOTS.iter().copied().collect()
    }
}

impl<'a> FromIterator<&'a str> for DepotSelection {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut s = Self::new();
        for id in iter {
            s.insert(id);
        }
        s
    }
}

impl From<Vec<String>> for DepotSelection {
    fn from(ids: Vec<String>) -> Self {
        ids.iter().map(String::as_str).collect()
    }
}

impl From<DepotSelection> for Vec<String> {
    fn from(s: DepotSelection) -> Self {
        s.ids
    }
}

pub const DEFAULT_DEPOTS: [&str; 17] = [
    "istanbul-and",
    "istanbul-avr",
    "ankara",
    "antalya",
    "bursa",
    "diyarbakir",
    "duzce",
    "erzurum",
    "eskisehir",
    "gaziantep",
    "izmir",
    "kayseri",
    "konya",
    "mugla",
    "samsun",
    "trabzon",
    "adana",
];

/// Radii and palette for ring construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub global_radius_km: f64,
    /// Per-depot radius; replaces the global radius for that depot.
    pub radius_overrides: HashMap<String, f64>,
    pub bearing_step_deg: f64,
    pub palette: Palette,
}

impl Default for CoverageConfig {
    /// Global radius 150 km. The per-depot radii below are placeholder
    /// defaults for the split Istanbul depots and the large eastern
    /// provinces; a config file or stored radius replaces them.
    fn default() -> Self {
        let radius_overrides = [
            ("istanbul-avr", 100.0),
            ("istanbul-and", 100.0),
            ("erzurum", 250.0),
            ("diyarbakir", 200.0),
            ("trabzon", 120.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            global_radius_km: 150.0,
            radius_overrides,
            bearing_step_deg: DEFAULT_BEARING_STEP_DEG,
            palette: Palette::ring(),
        }
    }
}

impl CoverageConfig {
    /// Settings for the world view: one global radius for every depot and
    /// the shorter world palette.
    pub fn world() -> Self {
        Self {
            radius_overrides: HashMap::new(),
            palette: Palette::world(),
            ..Self::default()
        }
    }

    /// Set a depot's radius. Any existing override naming the same depot
    /// (`Erzurum` vs `erzurum`, `İstanbul - AVR` vs `istanbul-avr`) is
    /// replaced, so a stored value always beats a built-in default.
    pub fn set_radius_override(&mut self, depot: &str, radius_km: f64) {
        self.clear_radius_override(depot);
        self.radius_overrides.insert(depot.trim().to_string(), radius_km);
    }

    /// Drop every override naming `depot`. Returns whether any existed.
    pub fn clear_radius_override(&mut self, depot: &str) -> bool {
        let key = fold_key(depot);
        let before = self.radius_overrides.len();
        self.radius_overrides.retain(|k, _| fold_key(k) != key);
        self.radius_overrides.len() != before
    }

    /// Radius for a depot: its override if present, else the global radius.
    pub fn radius_for(&self, depot_id: &str) -> f64 {
        if let Some(r) = self.radius_overrides.get(depot_id) {
            return *r;
        }
        let key = fold_key(depot_id);
        self.radius_overrides
            .iter()
            .find(|(k, _)| fold_key(k) == key)
            .map(|(_, r)| *r)
            .unwrap_or(self.global_radius_km)
    }
}

/// Geographic position of each depot, for views without a region registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepotCoordinates {
    coords: HashMap<String, GeoPoint>,
}

impl DepotCoordinates {
    pub fn new(coords: HashMap<String, GeoPoint>) -> Self {
        Self { coords }
    }

    pub fn get(&self, depot_id: &str) -> Option<GeoPoint> {
        if let Some(p) = self.coords.get(depot_id) {
            return Some(*p);
        }
        let key = fold_key(depot_id);
        self.coords
            .iter()
            .find(|(k, _)| fold_key(k) == key)
            .map(|(_, p)| *p)
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

impl Default for DepotCoordinates {
    fn default() -> Self {
        let coords = [
            ("istanbul-and", 40.883510, 29.368118),
            ("istanbul-avr", 41.077869, 28.642136),
            ("ankara", 40.047175, 32.619897),
            ("antalya", 36.931355, 30.774386),
            ("bursa", 40.234408, 29.130878),
            ("diyarbakir", 37.839425, 40.410098),
            ("duzce", 40.850518, 31.078438),
            ("erzurum", 39.931060, 41.172410),
            ("eskisehir", 39.748888, 30.675614),
            ("gaziantep", 37.087195, 37.438991),
            ("izmir", 38.388079, 27.236087),
            ("kayseri", 38.698640, 35.352849),
            ("konya", 37.928579, 32.522161),
            ("mugla", 37.228004, 28.522161),
            ("samsun", 41.236380, 36.417110),
            ("trabzon", 40.885089, 39.702102),
            ("adana", 36.970375, 35.548702),
        ]
        .into_iter()
        .map(|(id, lat, lon)| (id.to_string(), GeoPoint::new(lat, lon)))
        .collect();
        Self { coords }
    }
}

/// Where depot anchors come from.
#[derive(Debug, Clone, Copy)]
pub enum AnchorSource<'a> {
    /// Regions of the base map, projected equirectangularly.
    Registry {
        registry: &'a RegionRegistry,
        projection: &'a Projection,
    },
    /// A coordinate table, projected with Web Mercator.
    Coordinates {
        coords: &'a DepotCoordinates,
        projection: &'a WebMercator,
    },
}

/// A depot located on the map.
struct Located {
    label: String,
    anchor: Coord<f64>,
    center: GeoPoint,
}

impl AnchorSource<'_> {
    fn locate(&self, depot_id: &str) -> Option<Located> {
        match self {
            AnchorSource::Registry { registry, projection } => {
                let depot = registry.depot(depot_id)?;
                let anchor = depot.anchor();
                Some(Located {
                    label: depot.label().to_string(),
                    center: projection.to_geo(anchor.x, anchor.y),
                    anchor,
                })
            }
            AnchorSource::Coordinates { coords, projection } => {
                let center = coords.get(depot_id)?;
                Some(Located {
                    label: depot_id.to_string(),
                    anchor: Project::to_planar(*projection, center),
                    center,
                })
            }
        }
    }

    fn build(&self, center: GeoPoint, radius_km: f64, step: f64) -> Result<LineString<f64>> {
        match self {
            AnchorSource::Registry { projection, .. } => build_ring(center, radius_km, *projection, step),
            AnchorSource::Coordinates { projection, .. } => build_ring(center, radius_km, *projection, step),
        }
    }
}

/// One depot's ring, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRing {
    pub depot_id: String,
    pub label: String,
    /// Position in the selection.
    pub color_index: usize,
    pub color: Rgb,
    pub radius_km: f64,
    pub center: GeoPoint,
    /// Planar position of the depot dot.
    pub anchor: Coord<f64>,
    pub polygon: LineString<f64>,
}

/// Rings for every anchored depot, plus the ids that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageResult {
    pub rings: Vec<CoverageRing>,
    pub skipped: Vec<String>,
}

impl CoverageResult {
    /// Planar box around every ring and depot dot.
    pub fn planar_bounds(&self) -> Option<Bounds> {
        Bounds::from_points(
            self.rings
                .iter()
                .flat_map(|r| r.polygon.0.iter().copied().chain(std::iter::once(r.anchor))),
        )
    }
}

/// Compute rings for the whole selection, in selection order.
pub fn compute_rings(
    selection: &DepotSelection,
    config: &CoverageConfig,
    source: AnchorSource<'_>,
) -> Result<CoverageResult> {
    let mut result = CoverageResult::default();

    for (index, depot_id) in selection.iter().enumerate() {
        let Some(located) = source.locate(depot_id) else {
            warn!("Depot '{}' cannot be placed on the map, skipping", depot_id);
            result.skipped.push(depot_id.to_string());
            continue;
        };

        let radius_km = config.radius_for(depot_id);
        let polygon = source.build(located.center, radius_km, config.bearing_step_deg)?;
        let color = config.palette.color_for(index);
        debug!(
            "Ring for {} at ({:.4}, {:.4}): {} km, {} points, {}",
            depot_id,
            located.center.lat,
            located.center.lon,
            radius_km,
            polygon.0.len(),
            color
        );

        result.rings.push(CoverageRing {
            depot_id: depot_id.to_string(),
            label: located.label,
            color_index: index,
            color,
            radius_km,
            center: located.center,
            anchor: located.anchor,
            polygon,
        });
    }

    Ok(result)
}
