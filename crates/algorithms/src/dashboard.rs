//! Dashboard state and the derived draw plan.
//!
//! The dashboard owns everything a render depends on: geometry, selection,
//! radii, counts and colors. Changing any of them rolls the render stage
//! back so the next [`Dashboard::draw_plan`] recomputes what is stale:
//!
//! ```text
//! Idle -> GeometryLoaded -> RingsComputed -> Painted
//! ```
//!
//! Selection, radius and geometry changes invalidate rings; count, color
//! and label changes only invalidate painting. Rings are always rebuilt for
//! the whole selection.

use std::collections::HashMap;

use depomap_colormap::{ReferenceColors, Rgb};
use depomap_core::io::BaseMap;
use depomap_core::region::RegionPath;
use depomap_core::{AnchorTable, Error, GeoBounds, Projection, RegionRegistry, Result, Viewport};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::coverage::{compute_rings, AnchorSource, CoverageConfig, CoverageResult, DepotSelection};
use crate::input::{validate_count, validate_radius, MapView};
use crate::labels::{LabelLayer, LabelRenderer};
use crate::paint::{PaintEngine, PaintReport};

/// The base map is shown zoomed out by this factor around its center.
pub const ZOOM_OUT_FACTOR: f64 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RenderStage {
    Idle,
    GeometryLoaded,
    RingsComputed,
    Painted,
}

/// A region with its current fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaintedRegion {
    pub id: String,
    pub display_name: String,
    pub fill: Rgb,
    pub paths: Vec<RegionPath>,
}

/// Everything needed to draw one frame, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawPlan {
    /// Zoomed-out viewport the whole plan is expressed in.
    pub viewport: Viewport,
    pub regions: Vec<PaintedRegion>,
    pub coverage: CoverageResult,
    pub labels: LabelLayer,
    pub paint: PaintReport,
}

/// Dashboard state for the province map
#[derive(Debug, Clone)]
pub struct Dashboard {
    stage: RenderStage,
    anchors: AnchorTable,
    registry: Option<RegionRegistry>,
    projection: Option<Projection>,
    selection: DepotSelection,
    coverage: CoverageConfig,
    reference: ReferenceColors,
    counts: HashMap<String, u32>,
    colors: HashMap<String, Rgb>,
    labels: LabelRenderer,
    paint: PaintEngine,
    rings: CoverageResult,
    plan: Option<DrawPlan>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(AnchorTable::default(), CoverageConfig::default(), ReferenceColors::default())
    }
}

impl Dashboard {
    pub fn new(anchors: AnchorTable, coverage: CoverageConfig, reference: ReferenceColors) -> Self {
        Self {
            stage: RenderStage::Idle,
            anchors,
            registry: None,
            projection: None,
            selection: DepotSelection::default(),
            coverage,
            reference,
            counts: HashMap::new(),
            colors: HashMap::new(),
            labels: LabelRenderer::default(),
            paint: PaintEngine::new(),
            rings: CoverageResult::default(),
            plan: None,
        }
    }

    pub fn stage(&self) -> RenderStage {
        self.stage
    }

    pub fn registry(&self) -> Option<&RegionRegistry> {
        self.registry.as_ref()
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn selection(&self) -> &DepotSelection {
        &self.selection
    }

    pub fn coverage(&self) -> &CoverageConfig {
        &self.coverage
    }

    pub fn counts(&self) -> &HashMap<String, u32> {
        &self.counts
    }

    pub fn colors(&self) -> &HashMap<String, Rgb> {
        &self.colors
    }

    fn invalidate(&mut self, to: RenderStage) {
        if self.stage > to {
            debug!("Render stage {:?} -> {:?}", self.stage, to);
            self.stage = to;
        }
        self.plan = None;
    }

    /// Index a parsed base map. Projection uses the zoomed-out viewport.
    pub fn load_geometry(&mut self, map: BaseMap) -> Result<()> {
        let viewport = map.viewport.zoomed_out(ZOOM_OUT_FACTOR);
        let projection = Projection::new(GeoBounds::TURKEY, viewport)?;
        let registry = map.into_registry(self.anchors.clone());
        info!("Geometry loaded: {} regions", registry.len());

        self.registry = Some(registry);
        self.projection = Some(projection);
        self.stage = RenderStage::GeometryLoaded;
        self.plan = None;
        Ok(())
    }

    /// Add a depot to the selection.
    pub fn select(&mut self, depot_id: &str) -> bool {
        let added = self.selection.insert(depot_id);
        if added {
            self.invalidate(RenderStage::GeometryLoaded);
        }
        added
    }

    /// Remove a depot from the selection.
    pub fn deselect(&mut self, depot_id: &str) -> bool {
        let removed = self.selection.remove(depot_id);
        if removed {
            self.invalidate(RenderStage::GeometryLoaded);
        }
        removed
    }

    pub fn set_selection(&mut self, selection: DepotSelection) {
        self.selection = selection;
        self.invalidate(RenderStage::GeometryLoaded);
    }

    /// Set the global radius. Out-of-range input is rejected and the
    /// previous radius kept.
    pub fn set_global_radius(&mut self, radius_km: f64) -> Result<()> {
        let radius_km = validate_radius(MapView::Turkey, radius_km)?;
        self.coverage.global_radius_km = radius_km;
        self.invalidate(RenderStage::GeometryLoaded);
        Ok(())
    }

    /// Set a per-depot radius, replacing any default override.
    pub fn set_radius_override(&mut self, depot_id: &str, radius_km: f64) -> Result<()> {
        let radius_km = validate_radius(MapView::Turkey, radius_km)?;
        self.coverage.set_radius_override(depot_id, radius_km);
        self.invalidate(RenderStage::GeometryLoaded);
        Ok(())
    }

    pub fn clear_radius_override(&mut self, depot_id: &str) -> bool {
        let removed = self.coverage.clear_radius_override(depot_id);
        if removed {
            self.invalidate(RenderStage::GeometryLoaded);
        }
        removed
    }

    /// Replace all store counts (e.g. after a store read).
    pub fn set_counts(&mut self, counts: HashMap<String, u32>) {
        self.counts = counts;
        self.invalidate(RenderStage::RingsComputed);
    }

    /// Set one store count from user input.
    pub fn set_count(&mut self, key: &str, value: f64) -> Result<u32> {
        let count = validate_count(value)?;
        self.counts.insert(key.trim().to_string(), count);
        self.invalidate(RenderStage::RingsComputed);
        Ok(count)
    }

    /// Replace all stored region colors.
    pub fn set_colors(&mut self, colors: HashMap<String, Rgb>) {
        self.colors = colors;
        self.invalidate(RenderStage::RingsComputed);
    }

    pub fn set_color(&mut self, key: &str, color: Rgb) {
        self.colors.insert(key.trim().to_string(), color);
        self.invalidate(RenderStage::RingsComputed);
    }

    pub fn set_show_labels(&mut self, show: bool) {
        if self.labels.show_labels != show {
            self.labels.show_labels = show;
            self.invalidate(RenderStage::RingsComputed);
        }
    }

    /// Registry and projection, borrowed field by field so other fields
    /// stay mutable.
    fn loaded<'a>(
        registry: &'a Option<RegionRegistry>,
        projection: &'a Option<Projection>,
    ) -> Result<(&'a RegionRegistry, &'a Projection)> {
        match (registry, projection) {
            (Some(r), Some(p)) => Ok((r, p)),
            _ => Err(Error::GeometrySourceUnavailable {
                source_name: "dashboard".into(),
                reason: "no base map loaded".into(),
            }),
        }
    }

    /// Rebuild every ring for the current selection.
    pub fn compute_rings(&mut self) -> Result<&CoverageResult> {
        let (registry, projection) = Self::loaded(&self.registry, &self.projection)?;
        let source = AnchorSource::Registry { registry, projection };
        let result = compute_rings(&self.selection, &self.coverage, source)?;
        if !result.skipped.is_empty() {
            warn!("{} selected depot(s) not on the map: {:?}", result.skipped.len(), result.skipped);
        }
        self.rings = result;
        self.stage = RenderStage::RingsComputed;
        self.plan = None;
        Ok(&self.rings)
    }

    /// Repaint regions and rebuild labels: neutral, then reference colors,
    /// then stored colors.
    fn paint_regions(&mut self) -> Result<DrawPlan> {
        let (registry, projection) = Self::loaded(&self.registry, &self.projection)?;
        let viewport = projection.viewport();

        self.paint.paint_all_default(registry);
        let mut report = self.paint.apply_reference(registry, &self.reference);

        let mut stored: Vec<(&str, Rgb)> = self.colors.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        stored.sort_by(|a, b| a.0.cmp(b.0));
        let stored_report = self.paint.apply_colors(registry, stored);
        report.applied += stored_report.applied;
        report.unresolved.extend(stored_report.unresolved);

        let regions = registry
            .iter()
            .map(|r| PaintedRegion {
                id: r.id.clone(),
                display_name: r.display_name.clone(),
                fill: self.paint.fill_of(&r.id),
                paths: r.paths.clone(),
            })
            .collect();

        let labels = self.labels.render(registry, &self.counts);

        Ok(DrawPlan {
            viewport,
            regions,
            coverage: self.rings.clone(),
            labels,
            paint: report,
        })
    }

    /// The plan for the current state, recomputing stale stages.
    pub fn draw_plan(&mut self) -> Result<&DrawPlan> {
        if self.stage < RenderStage::RingsComputed {
            self.compute_rings()?;
        }
        if self.stage < RenderStage::Painted || self.plan.is_none() {
            let plan = self.paint_regions()?;
            self.stage = RenderStage::Painted;
            self.plan = Some(plan);
        }
        match &self.plan {
            Some(plan) => Ok(plan),
            None => Err(Error::Other("draw plan missing after paint".into())),
        }
    }
}
