//! Region painting
//!
//! Keeps the fill of every region. Keys are resolved through the paint
//! resolver chain (normalized id, display name, diacritic fold); a key
//! that resolves to nothing is logged and ignored.

use std::collections::HashMap;

use depomap_colormap::{ReferenceColors, Rgb, NEUTRAL_FILL};
use depomap_core::{RegionRegistry, Resolver};
use serde::Serialize;
use tracing::{debug, warn};

/// Stroke drawn around every region.
pub const REGION_STROKE: Rgb = Rgb::new(0x11, 0x11, 0x11);

/// Stroke width around every region.
pub const REGION_STROKE_WIDTH: f64 = 0.7;

/// Outcome of a batch of [`PaintEngine::apply_color`] calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaintReport {
    /// Number of keys that resolved to a region
    pub applied: usize,
    /// Keys that did not resolve, in input order
    pub unresolved: Vec<String>,
}

/// Per-region fills
#[derive(Debug, Clone, Default)]
pub struct PaintEngine {
    fills: HashMap<String, Rgb>,
    resolver: Resolver,
}

impl PaintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: Resolver) -> Self {
        Self {
            fills: HashMap::new(),
            resolver,
        }
    }

    /// Set every region of `registry` to the neutral fill.
    pub fn paint_all_default(&mut self, registry: &RegionRegistry) {
        self.fills.clear();
        for region in registry.iter() {
            self.fills.insert(region.id.clone(), NEUTRAL_FILL);
        }
    }

    /// Restore the neutral state. Same result however many times it runs.
    pub fn clear(&mut self, registry: &RegionRegistry) {
        self.paint_all_default(registry);
    }

    /// Fill the region named by `key`. Returns the resolved region id, or
    /// `None` (after a warning) when nothing matches.
    pub fn apply_color(&mut self, registry: &RegionRegistry, key: &str, color: Rgb) -> Option<String> {
        match self.resolver.resolve_with(registry, key) {
            Some((region, strategy)) => {
                debug!("Painting '{}' as {} ({:?})", region.id, color, strategy);
                self.fills.insert(region.id.clone(), color);
                Some(region.id.clone())
            }
            None => {
                warn!("No region matches '{}', color {} not applied", key, color);
                None
            }
        }
    }

    /// Apply many colors; later entries win for the same region.
    pub fn apply_colors<'a, I>(&mut self, registry: &RegionRegistry, colors: I) -> PaintReport
    where
        I: IntoIterator<Item = (&'a str, Rgb)>,
    {
        let mut report = PaintReport::default();
        for (key, color) in colors {
            match self.apply_color(registry, key, color) {
                Some(_) => report.applied += 1,
                None => report.unresolved.push(key.to_string()),
            }
        }
        report
    }

    /// Apply the reference table on top of the current fills.
    pub fn apply_reference(&mut self, registry: &RegionRegistry, reference: &ReferenceColors) -> PaintReport {
        let mut entries: Vec<(&str, Rgb)> = reference.iter().collect();
        // HashMap order is arbitrary; keep the log output stable.
        entries.sort_by(|a, b| a.0.cmp(b.0));
        self.apply_colors(registry, entries)
    }

    /// Current fill of a region id; neutral when never painted.
    pub fn fill_of(&self, region_id: &str) -> Rgb {
        self.fills.get(region_id).copied().unwrap_or(NEUTRAL_FILL)
    }

    pub fn fills(&self) -> &HashMap<String, Rgb> {
        &self.fills
    }
}
