//! End-to-end: base map → dashboard → draw plan → SVG.

use std::collections::HashMap;

use approx::assert_relative_eq;
use depomap_algorithms::coverage::{CoverageConfig, DepotSelection};
use depomap_algorithms::dashboard::{Dashboard, RenderStage};
use depomap_algorithms::labels::LabelKind;
use depomap_algorithms::svg::render_plan;
use depomap_colormap::{Palette, ReferenceColors, Rgb};
use depomap_core::io::parse_basemap;

const MAP: &str = r#"<svg viewBox="0 0 1000 618"><g id="turkiye">
    <g id="istanbul" data-iladi="İstanbul"><path d="M 180 40 L 260 40 L 260 90 L 180 90 Z"/></g>
    <g id="ankara" data-iladi="Ankara"><path d="M 320 180 L 380 180 L 380 240 L 320 240 Z"/></g>
    <g id="izmir" data-iladi="İzmir"><path d="M 20 300 L 80 300 L 80 360 L 20 360 Z"/></g>
    <g id="erzurum" data-iladi="Erzurum"><path d="M 800 150 L 860 150 L 860 210 L 800 210 Z"/></g>
</g></svg>"#;

fn dashboard(selection: &[&str]) -> Dashboard {
    let mut d = Dashboard::default();
    d.set_selection(selection.iter().copied().collect::<DepotSelection>());
    d.load_geometry(parse_basemap(MAP).unwrap()).unwrap();
    d
}

#[test]
fn test_full_render() {
    let mut d = dashboard(&["ankara", "izmir", "istanbul-avr", "erzurum", "atlantis"]);
    d.set_counts(HashMap::from([("Ankara".to_string(), 3), ("İstanbul - AVR".to_string(), 7)]));
    d.set_colors(HashMap::from([
        ("izmir".to_string(), Rgb::new(0x12, 0x34, 0x56)),
        ("Nowhere".to_string(), Rgb::WHITE),
    ]));

    let plan = d.draw_plan().unwrap().clone();
    assert_eq!(d.stage(), RenderStage::Painted);

    // Rings: one per anchored depot, closed, 121 points at the default step.
    assert_eq!(plan.coverage.rings.len(), 4);
    assert_eq!(plan.coverage.skipped, vec!["atlantis".to_string()]);
    for ring in &plan.coverage.rings {
        assert_eq!(ring.polygon.0.len(), 121);
        assert_eq!(ring.polygon.0.first(), ring.polygon.0.last());
    }
    let palette = Palette::ring();
    let radii: Vec<(usize, f64)> = plan.coverage.rings.iter().map(|r| (r.color_index, r.radius_km)).collect();
    assert_eq!(radii, vec![(0, 150.0), (1, 150.0), (2, 100.0), (3, 250.0)]);
    assert_eq!(plan.coverage.rings[3].color, palette.color_for(3));

    // Fills: stored color beats reference; unknown key reported, not fatal.
    let fill = |id: &str| plan.regions.iter().find(|r| r.id == id).unwrap().fill;
    assert_eq!(fill("izmir"), Rgb::new(0x12, 0x34, 0x56));
    assert_eq!(fill("ankara"), ReferenceColors::default().get("ankara").unwrap());
    assert!(plan.paint.unresolved.iter().any(|k| k == "Nowhere"));

    // Labels: split region has no name, its synthetic depot carries the count.
    let names: Vec<&str> = plan.labels.of_kind(LabelKind::Name).map(|l| l.text.as_str()).collect();
    assert!(!names.contains(&"İstanbul"));
    assert!(names.contains(&"Ankara"));
    assert!(plan.labels.labels.iter().any(|l| l.text == "İST - AVR 7"));
    assert!(plan.labels.labels.iter().any(|l| l.text == "3"));

    let svg = render_plan(&plan);
    assert_eq!(svg.matches(r#"class="coverage-ring""#).count(), 4);
    assert!(svg.contains("fill=\"#123456\""));
}

#[test]
fn test_palette_follows_selection_order() {
    let mut a = dashboard(&["ankara", "izmir"]);
    let mut b = dashboard(&["izmir", "ankara"]);
    let ra = a.compute_rings().unwrap().clone();
    let rb = b.compute_rings().unwrap().clone();

    let color = |rings: &[depomap_algorithms::coverage::CoverageRing], id: &str| {
        rings.iter().find(|r| r.depot_id == id).unwrap().color
    };
    assert_eq!(color(&ra.rings, "ankara"), color(&rb.rings, "izmir"));
    assert_eq!(color(&ra.rings, "izmir"), color(&rb.rings, "ankara"));
    assert_ne!(color(&ra.rings, "ankara"), color(&ra.rings, "izmir"));
}

#[test]
fn test_radius_edits_recompute_rings() {
    let mut d = dashboard(&["ankara"]);
    let before = d.compute_rings().unwrap().rings[0].polygon.clone();

    d.set_radius_override("ankara", 300.0).unwrap();
    assert_eq!(d.stage(), RenderStage::GeometryLoaded);
    let after = d.compute_rings().unwrap().rings[0].clone();
    assert_eq!(after.radius_km, 300.0);

    // Bearing 0 is due north: a larger radius reaches further up the map.
    assert!(after.polygon.0[0].y < before.0[0].y);
    assert_relative_eq!(after.polygon.0[0].x, before.0[0].x, epsilon = 1e-9);

    // Rejected input keeps the previous override.
    assert!(d.set_radius_override("ankara", 5.0).is_err());
    assert_eq!(d.coverage().radius_for("ankara"), 300.0);
}

#[test]
fn test_repeat_paint_is_identical() {
    let mut d = Dashboard::new(Default::default(), CoverageConfig::default(), ReferenceColors::default());
    d.set_selection(["ankara"].into_iter().collect());
    d.load_geometry(parse_basemap(MAP).unwrap()).unwrap();
    let first = render_plan(d.draw_plan().unwrap());
    d.set_colors(HashMap::new());
    let second = render_plan(d.draw_plan().unwrap());
    assert_eq!(first, second);
}
