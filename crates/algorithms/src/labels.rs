//! Region name and store-count labels.
//!
//! Every region gets its name above the centroid and, when a count is known,
//! the count below it. A region split between synthetic depots gets no name
//! label; instead each synthetic anchor gets a `"{tag} {count}"` label just
//! above its dot.

use std::collections::HashMap;

use depomap_core::{RegionRegistry, Resolver};
use serde::Serialize;

/// Name labels sit this far above the centroid.
pub const NAME_OFFSET_Y: f64 = -10.0;
/// Count labels sit this far below the centroid.
pub const COUNT_OFFSET_Y: f64 = 6.0;
/// Split-region count labels sit this far above their anchor.
pub const SPLIT_COUNT_OFFSET_Y: f64 = -14.0;

pub const LABEL_FONT_SIZE: f64 = 9.0;
pub const LABEL_HALO: &str = "rgba(255,255,255,0.8)";
pub const LABEL_HALO_WIDTH: f64 = 2.0;
pub const LABEL_FONT_FAMILY: &str =
    "ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    Name,
    Count,
    SplitCount,
}

/// SVG `dominant-baseline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    Central,
    Hanging,
}

impl Baseline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Baseline::Central => "central",
            Baseline::Hanging => "hanging",
        }
    }
}

/// One text annotation, centered horizontally on `x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    /// Region (or synthetic depot) the label belongs to.
    pub owner: String,
    pub kind: LabelKind,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font_weight: u16,
    pub baseline: Baseline,
    /// Text fill, hex.
    pub fill: &'static str,
}

/// Labels in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelLayer {
    pub labels: Vec<TextLabel>,
}

impl LabelLayer {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn of_kind(&self, kind: LabelKind) -> impl Iterator<Item = &TextLabel> {
        self.labels.iter().filter(move |l| l.kind == kind)
    }
}

/// Builds the label layer from the registry and store counts.
#[derive(Debug, Clone)]
pub struct LabelRenderer {
    resolver: Resolver,
    pub show_labels: bool,
}

impl Default for LabelRenderer {
    fn default() -> Self {
        Self {
            resolver: Resolver::attribute(),
            show_labels: true,
        }
    }
}

impl LabelRenderer {
    pub fn new(show_labels: bool) -> Self {
        Self {
            show_labels,
            ..Self::default()
        }
    }

    pub fn render(&self, registry: &RegionRegistry, counts: &HashMap<String, u32>) -> LabelLayer {
        let mut layer = LabelLayer::default();
        if !self.show_labels {
            return layer;
        }
        let anchors = registry.anchors();

        for region in registry.iter() {
            if anchors.is_split(&region.id) {
                continue;
            }
            let c = region.centroid;
            layer.labels.push(TextLabel {
                owner: region.id.clone(),
                kind: LabelKind::Name,
                x: c.x,
                y: c.y + NAME_OFFSET_Y,
                text: region.display_name.clone(),
                font_weight: 500,
                baseline: Baseline::Central,
                fill: "#111111",
            });

            if let Some(count) = self.resolver.lookup_region(counts, region) {
                layer.labels.push(TextLabel {
                    owner: region.id.clone(),
                    kind: LabelKind::Count,
                    x: c.x,
                    y: c.y + COUNT_OFFSET_Y,
                    text: count.to_string(),
                    font_weight: 600,
                    baseline: Baseline::Hanging,
                    fill: "#111111",
                });
            }
        }

        for synthetic in &anchors.synthetic {
            let Some(parent) = registry.get(&synthetic.parent) else {
                continue;
            };
            let Some(count) = self.resolver.lookup(counts, &synthetic.id, &synthetic.store_key) else {
                continue;
            };
            let p = parent.bounds.fraction(synthetic.fx, synthetic.fy);
            layer.labels.push(TextLabel {
                owner: synthetic.id.clone(),
                kind: LabelKind::SplitCount,
                x: p.x,
                y: p.y + SPLIT_COUNT_OFFSET_Y,
                text: format!("{} {}", synthetic.tag, count),
                font_weight: 600,
                baseline: Baseline::Central,
                fill: "#000000",
            });
        }

        layer
    }
}

/// Render labels with the default renderer.
pub fn render_labels(registry: &RegionRegistry, counts: &HashMap<String, u32>) -> LabelLayer {
    LabelRenderer::default().render(registry, counts)
}
