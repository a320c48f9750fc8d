//! Base map to registry: parsing, anchors and projection working together.

use approx::assert_relative_eq;
use depomap_core::io::parse_basemap;
use depomap_core::{AnchorTable, GeoBounds, Projection, Viewport};

const MAP: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1000 618">
  <g id="turkiye">
    <g id="istanbul" data-iladi="İstanbul"><path d="M 100 100 L 200 100 L 200 200 L 100 200 Z"/></g>
    <g id="ankara" data-iladi="Ankara">
      <g transform="translate(10 20)"><path d="M 300 300 L 340 300 L 340 340 L 300 340 Z"/></g>
    </g>
    <g id="Izmir" data-iladi="İzmir"><path d="M 0 400 Q 50 300 100 400 Z"/></g>
    <g id="ankara" data-iladi="Duplicate"><path d="M 0 0 L 1 1"/></g>
  </g>
</svg>"#;

#[test]
fn test_anchors_from_parsed_map() {
    let registry = parse_basemap(MAP).unwrap().into_registry(AnchorTable::default());
    assert_eq!(registry.len(), 3);

    // Nested transform moves the square; override (+25, -5) moves the anchor only.
    let ankara = registry.get("ankara").unwrap();
    assert_eq!(ankara.display_name, "Ankara");
    assert_relative_eq!(ankara.centroid.x, 330.0, epsilon = 1e-9);
    assert_relative_eq!(ankara.centroid.y, 340.0, epsilon = 1e-9);
    let a = registry.anchor("ankara").unwrap();
    assert_relative_eq!(a.x, 355.0, epsilon = 1e-9);
    assert_relative_eq!(a.y, 335.0, epsilon = 1e-9);

    // Curve apex at y = 350, override (0, +25).
    let izmir = registry.get("izmir").unwrap();
    assert_relative_eq!(izmir.bounds.min_y, 350.0, epsilon = 1e-9);
    let i = registry.anchor("İzmir").unwrap();
    assert_relative_eq!(i.x, 50.0, epsilon = 1e-9);
    assert_relative_eq!(i.y, 400.0, epsilon = 1e-9);
}

#[test]
fn test_synthetic_depots_inside_parent() {
    let registry = parse_basemap(MAP).unwrap().into_registry(AnchorTable::default());

    let avr = registry.anchor("istanbul-avr").unwrap();
    assert_relative_eq!(avr.x, 115.0, epsilon = 1e-9);
    assert_relative_eq!(avr.y, 145.0, epsilon = 1e-9);

    let and = registry.depot("İstanbul - AND").unwrap();
    assert_eq!(and.id(), "istanbul-and");
    assert_eq!(and.label(), "İstanbul - AND");
    assert_relative_eq!(and.anchor().x, 173.0, epsilon = 1e-9);
    assert_relative_eq!(and.anchor().y, 185.0, epsilon = 1e-9);

    assert!(registry.anchor("atlantis").is_none());
}

#[test]
fn test_anchor_round_trips_through_projection() {
    let map = parse_basemap(MAP).unwrap();
    let projection = Projection::new(GeoBounds::TURKEY, map.viewport.zoomed_out(1.15)).unwrap();
    let registry = map.into_registry(AnchorTable::empty());

    for region in registry.iter() {
        let geo = projection.to_geo(region.centroid.x, region.centroid.y);
        let back = projection.to_planar(geo.lat, geo.lon);
        assert_relative_eq!(back.x, region.centroid.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, region.centroid.y, epsilon = 1e-9);
    }
    // Without an override table, anchors are plain centroids.
    let ankara = registry.get("ankara").unwrap();
    assert_eq!(registry.anchor("ankara"), Some(ankara.centroid));
    let vp: Viewport = projection.viewport();
    assert_relative_eq!(vp.x, -75.0, epsilon = 1e-9);
    assert_relative_eq!(vp.width, 1150.0, epsilon = 1e-9);
}
