//! Named map regions

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::anchor::AnchorOffset;
use crate::geometry::Bounds;

/// A region read from the base map, before it enters a registry.
///
/// `path_data` keeps every primitive's `d` attribute (with its accumulated
/// transform, if any) so the region can be redrawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRegion {
    pub id: String,
    pub display_name: String,
    pub bounds: Bounds,
    #[serde(default)]
    pub paths: Vec<RegionPath>,
}

/// One drawable primitive of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPath {
    pub d: String,
    /// SVG `matrix(...)` of all transforms between the region group and the
    /// path, or `None` when identity.
    #[serde(default)]
    pub transform: Option<String>,
}

/// A named map region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Normalized identifier (trimmed, lowercased group id).
    pub id: String,
    pub display_name: String,
    /// Bounding-box center of all primitives. Never changes after build.
    pub centroid: Coord<f64>,
    pub bounds: Bounds,
    /// Planar nudge applied to the ring/dot anchor only.
    pub anchor_override: Option<AnchorOffset>,
    #[serde(default)]
    pub paths: Vec<RegionPath>,
}

impl Region {
    /// Point where rings and depot dots are drawn: centroid plus override.
    pub fn anchor(&self) -> Coord<f64> {
        match self.anchor_override {
            Some(o) => Coord {
                x: self.centroid.x + o.dx,
                y: self.centroid.y + o.dy,
            },
            None => self.centroid,
        }
    }
}
