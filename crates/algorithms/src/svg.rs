//! SVG output for draw plans.
//!
//! Layer order: background, regions (`#turkiye`), rings (`#rings-layer`),
//! labels (`#labels-layer`). Each ring group draws its translucent fill,
//! then its outline, then the depot dot.

use std::fmt::Write;

use depomap_colormap::Rgb;
use depomap_core::Viewport;

use crate::coverage::{
    CoverageResult, CoverageRing, DOT_RADIUS, DOT_STROKE_WIDTH, RING_FILL_OPACITY, RING_STROKE_WIDTH,
};
use crate::dashboard::{DrawPlan, PaintedRegion};
use crate::geodesic::ring_path_data;
use crate::labels::{LabelLayer, TextLabel, LABEL_FONT_FAMILY, LABEL_FONT_SIZE, LABEL_HALO, LABEL_HALO_WIDTH};
use crate::paint::{REGION_STROKE, REGION_STROKE_WIDTH};

/// Escape text for use in element content or a quoted attribute.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn open_document(s: &mut String, vp: &Viewport) {
    let _ = writeln!(
        s,
        r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" viewBox="{} {} {} {}">"#,
        vp.x, vp.y, vp.width, vp.height
    );
    let _ = writeln!(
        s,
        r##"  <rect x="{}" y="{}" width="{}" height="{}" fill="#ffffff"/>"##,
        vp.x, vp.y, vp.width, vp.height
    );
}

fn write_regions(s: &mut String, regions: &[PaintedRegion]) {
    s.push_str("  <g id=\"turkiye\">\n");
    for region in regions {
        let _ = writeln!(
            s,
            r#"    <g id="{}" data-iladi="{}">"#,
            escape(&region.id),
            escape(&region.display_name)
        );
        for path in &region.paths {
            let transform = path
                .transform
                .as_deref()
                .map(|t| format!(r#" transform="{}""#, escape(t)))
                .unwrap_or_default();
            let _ = writeln!(
                s,
                r#"      <path d="{}"{} fill="{}" stroke="{}" stroke-width="{}"/>"#,
                escape(&path.d),
                transform,
                region.fill,
                REGION_STROKE,
                REGION_STROKE_WIDTH
            );
        }
        s.push_str("    </g>\n");
    }
    s.push_str("  </g>\n");
}

fn write_ring(s: &mut String, ring: &CoverageRing) {
    let d = ring_path_data(&ring.polygon);
    let label = escape(&ring.label);
    let color = ring.color;
    let _ = writeln!(s, r#"    <g class="coverage-ring" aria-label="{label}">"#);
    let _ = writeln!(s, "      <title>{label}</title>");
    if !d.is_empty() {
        let _ = writeln!(s, r#"      <path d="{}" fill="{}"/>"#, d, color.to_rgba(RING_FILL_OPACITY));
        let _ = writeln!(
            s,
            r#"      <path d="{d}" fill="none" stroke="{color}" stroke-width="{RING_STROKE_WIDTH}" stroke-linecap="round" stroke-linejoin="round"/>"#
        );
    }
    let _ = writeln!(
        s,
        r#"      <circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
        ring.anchor.x,
        ring.anchor.y,
        DOT_RADIUS,
        color,
        Rgb::WHITE,
        DOT_STROKE_WIDTH
    );
    s.push_str("    </g>\n");
}

fn write_rings(s: &mut String, coverage: &CoverageResult) {
    s.push_str("  <g id=\"rings-layer\">\n");
    for ring in &coverage.rings {
        write_ring(s, ring);
    }
    s.push_str("  </g>\n");
}

fn write_label(s: &mut String, label: &TextLabel) {
    let _ = writeln!(
        s,
        r#"    <text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="{}" font-size="{}" font-weight="{}" font-family="{}" fill="{}" paint-order="stroke" stroke="{}" stroke-width="{}">{}</text>"#,
        label.x,
        label.y,
        label.baseline.as_str(),
        LABEL_FONT_SIZE,
        label.font_weight,
        LABEL_FONT_FAMILY,
        label.fill,
        LABEL_HALO,
        LABEL_HALO_WIDTH,
        escape(&label.text)
    );
}

fn write_labels(s: &mut String, labels: &LabelLayer) {
    s.push_str("  <g id=\"labels-layer\">\n");
    for label in &labels.labels {
        write_label(s, label);
    }
    s.push_str("  </g>\n");
}

/// Serialize a full draw plan.
pub fn render_plan(plan: &DrawPlan) -> String {
    let mut s = String::new();
    open_document(&mut s, &plan.viewport);
    write_regions(&mut s, &plan.regions);
    write_rings(&mut s, &plan.coverage);
    write_labels(&mut s, &plan.labels);
    s.push_str("</svg>\n");
    s
}

/// Serialize rings alone, e.g. for the world view.
pub fn render_rings(viewport: &Viewport, coverage: &CoverageResult) -> String {
    let mut s = String::new();
    open_document(&mut s, viewport);
    write_rings(&mut s, coverage);
    s.push_str("</svg>\n");
    s
}
