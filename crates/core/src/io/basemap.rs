//! SVG base-map reader.
//!
//! The base map is an SVG document (optionally embedded in an HTML page)
//! with a container `<g id="turkiye">` whose direct `<g id="…">` children
//! are regions. Every `<path>` below a region group, at any depth, is one
//! of its primitives. `transform` attributes between the region group and
//! a path are honored when measuring bounds; the group's own transform is
//! not, so bounds live in the group's user space.

use std::path::Path;
use std::str::FromStr;

use geo_types::Coord;
use roxmltree::{Document, Node};
use svgtypes::{SimplePathSegment, SimplifyingPathParser};
use tracing::{debug, info, warn};

use crate::anchor::AnchorTable;
use crate::error::{Error, Result};
use crate::geometry::Bounds;
use crate::projection::Viewport;
use crate::region::{RawRegion, RegionPath};
use crate::registry::RegionRegistry;

/// Id of the group holding the region groups.
pub const REGION_CONTAINER_ID: &str = "turkiye";

/// Attribute carrying a region's display name.
pub const NAME_ATTRIBUTE: &str = "data-iladi";

/// A parsed base map.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMap {
    /// The document's `viewBox`, or [`Viewport::DEFAULT`] when absent.
    pub viewport: Viewport,
    /// Regions in document order.
    pub regions: Vec<RawRegion>,
}

impl BaseMap {
    /// Index the regions into a registry.
    pub fn into_registry(self, anchors: AnchorTable) -> RegionRegistry {
        RegionRegistry::build(self.regions, anchors)
    }
}

/// Read a base map from a file.
pub fn read_basemap<P: AsRef<Path>>(path: P) -> Result<BaseMap> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::GeometrySourceUnavailable {
        source_name: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let map = parse_basemap_named(&text, &path.display().to_string())?;
    info!("Loaded base map {} ({} regions)", path.display(), map.regions.len());
    Ok(map)
}

/// Parse a base map from SVG (or HTML containing an `<svg>` element).
pub fn parse_basemap(text: &str) -> Result<BaseMap> {
    parse_basemap_named(text, "<memory>")
}

fn parse_basemap_named(text: &str, source_name: &str) -> Result<BaseMap> {
    let unavailable = |reason: String| Error::GeometrySourceUnavailable {
        source_name: source_name.to_string(),
        reason,
    };

    let svg_text = extract_svg(text).ok_or_else(|| unavailable("no <svg> element found".into()))?;
    let doc = Document::parse(svg_text).map_err(|e| unavailable(e.to_string()))?;

    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(unavailable(format!("root element is <{}>", root.tag_name().name())));
    }

    let viewport = match root.attribute("viewBox") {
        Some(vb) => Viewport::parse(vb)?,
        None => Viewport::DEFAULT,
    };

    let container = root
        .descendants()
        .find(|n| n.is_element() && n.attribute("id") == Some(REGION_CONTAINER_ID))
        .ok_or_else(|| unavailable(format!("no element with id '{}'", REGION_CONTAINER_ID)))?;

    let regions = container
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "g")
        .filter_map(read_region)
        .collect();

    Ok(BaseMap { viewport, regions })
}

/// Pick the `<svg>` element holding the region container out of a page that
/// may carry several (icons, logos). Falls back to the first one.
fn extract_svg(text: &str) -> Option<&str> {
    let elements = svg_elements(text);
    let marker = [
        format!("id=\"{REGION_CONTAINER_ID}\""),
        format!("id='{REGION_CONTAINER_ID}'"),
    ];
    elements
        .iter()
        .find(|e| marker.iter().any(|m| e.contains(m.as_str())))
        .or_else(|| elements.first())
        .copied()
}

const SVG_OPEN: &str = "<svg";
const SVG_CLOSE: &str = "</svg>";

/// Every top-level `<svg>…</svg>` slice, matching nested elements by depth.
fn svg_elements(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(rel) = text[pos..].find(SVG_OPEN) {
        let start = pos + rel;
        let Some(tag_end) = open_tag_end(text, start) else { break };
        if text[..tag_end].ends_with("/>") {
            out.push(&text[start..tag_end]);
            pos = tag_end;
            continue;
        }

        let mut depth = 1usize;
        let mut cursor = tag_end;
        let end = loop {
            let next_open = text[cursor..].find(SVG_OPEN).map(|i| cursor + i);
            let Some(next_close) = text[cursor..].find(SVG_CLOSE).map(|i| cursor + i) else {
                break None;
            };
            match next_open {
                Some(open) if open < next_close => {
                    let Some(tag_end) = open_tag_end(text, open) else { break None };
                    cursor = tag_end;
                    if !text[..cursor].ends_with("/>") {
                        depth += 1;
                    }
                }
                _ => {
                    cursor = next_close + SVG_CLOSE.len();
                    depth -= 1;
                    if depth == 0 {
                        break Some(cursor);
                    }
                }
            }
        };

        let Some(end) = end else { break };
        out.push(&text[start..end]);
        pos = end;
    }
    out
}

/// Byte offset just past the `>` closing the tag opened at `start`.
fn open_tag_end(text: &str, start: usize) -> Option<usize> {
    text[start..].find('>').map(|i| start + i + 1)
}

fn read_region(group: Node<'_, '_>) -> Option<RawRegion> {
    let id = group.attribute("id")?.trim();
    if id.is_empty() {
        return None;
    }
    let display_name = group
        .attribute(NAME_ATTRIBUTE)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(id)
        .to_string();

    let mut bounds: Option<Bounds> = None;
    let mut paths = Vec::new();

    for node in group.descendants().filter(|n| n.is_element() && n.tag_name().name() == "path") {
        let Some(d) = node.attribute("d") else { continue };
        let transform = accumulated_transform(group, node);

        match path_bounds(d, &transform) {
            Ok(Some(b)) => {
                bounds = Some(match bounds {
                    Some(acc) => acc.union(&b),
                    None => b,
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Region '{}': skipping path ({})", id, e);
                continue;
            }
        }

        paths.push(RegionPath {
            d: d.to_string(),
            transform: (!transform.is_identity()).then(|| transform.to_svg()),
        });
    }

    match bounds {
        Some(bounds) => Some(RawRegion {
            id: id.to_string(),
            display_name,
            bounds,
            paths,
        }),
        None => {
            debug!("Region '{}' has no drawable geometry", id);
            None
        }
    }
}

/// Product of every `transform` from just below `group` down to `node`.
fn accumulated_transform(group: Node<'_, '_>, node: Node<'_, '_>) -> Affine {
    let mut chain: Vec<Node> = node
        .ancestors()
        .take_while(|n| *n != group)
        .collect();
    chain.reverse();

    chain.iter().fold(Affine::IDENTITY, |acc, n| match n.attribute("transform") {
        Some(t) => match svgtypes::Transform::from_str(t) {
            Ok(t) => acc.then(&Affine::from(t)),
            Err(e) => {
                warn!("Ignoring malformed transform '{}': {}", t, e);
                acc
            }
        },
        None => acc,
    })
}

/// 2D affine transform in SVG `matrix(a b c d e f)` form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn apply(&self, p: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }

    /// `self` followed by the nested (inner) transform `inner`.
    pub fn then(&self, inner: &Affine) -> Affine {
        Affine {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn to_svg(&self) -> String {
        format!("matrix({} {} {} {} {} {})", self.a, self.b, self.c, self.d, self.e, self.f)
    }
}

impl From<svgtypes::Transform> for Affine {
    fn from(t: svgtypes::Transform) -> Self {
        Affine { a: t.a, b: t.b, c: t.c, d: t.d, e: t.e, f: t.f }
    }
}

/// Tight bounds of path data after `transform`: curve extrema are solved
/// analytically instead of using control points. `Ok(None)` for empty data.
pub fn path_bounds(d: &str, transform: &Affine) -> Result<Option<Bounds>> {
    let mut bounds: Option<Bounds> = None;
    let mut add = |p: Coord<f64>| {
        bounds = Some(match bounds {
            Some(mut b) => {
                b.extend(p);
                b
            }
            None => Bounds::from_point(p),
        });
    };

    let mut current = Coord { x: 0.0, y: 0.0 };
    let mut start = current;

    for seg in SimplifyingPathParser::from(d) {
        let seg = seg.map_err(|e| Error::PathData(e.to_string()))?;
        match seg {
            SimplePathSegment::MoveTo { x, y } => {
                current = Coord { x, y };
                start = current;
                add(transform.apply(current));
            }
            SimplePathSegment::LineTo { x, y } => {
                current = Coord { x, y };
                add(transform.apply(current));
            }
            SimplePathSegment::Quadratic { x1, y1, x, y } => {
                let p0 = transform.apply(current);
                let p1 = transform.apply(Coord { x: x1, y: y1 });
                let p2 = transform.apply(Coord { x, y });
                for t in quad_extrema(p0, p1, p2) {
                    add(quad_at(p0, p1, p2, t));
                }
                add(p2);
                current = Coord { x, y };
            }
            SimplePathSegment::CurveTo { x1, y1, x2, y2, x, y } => {
                let p0 = transform.apply(current);
                let p1 = transform.apply(Coord { x: x1, y: y1 });
                let p2 = transform.apply(Coord { x: x2, y: y2 });
                let p3 = transform.apply(Coord { x, y });
                for t in cubic_extrema(p0, p1, p2, p3) {
                    add(cubic_at(p0, p1, p2, p3, t));
                }
                add(p3);
                current = Coord { x, y };
            }
            SimplePathSegment::ClosePath => {
                current = start;
            }
        }
    }

    Ok(bounds)
}

fn quad_extrema(p0: Coord<f64>, p1: Coord<f64>, p2: Coord<f64>) -> Vec<f64> {
    let axis = |a: f64, b: f64, c: f64| {
        let denom = a - 2.0 * b + c;
        if denom.abs() < f64::EPSILON {
            None
        } else {
            Some((a - b) / denom)
        }
    };
    [axis(p0.x, p1.x, p2.x), axis(p0.y, p1.y, p2.y)]
        .into_iter()
        .flatten()
        .filter(|t| *t > 0.0 && *t < 1.0)
        .collect()
}

fn quad_at(p0: Coord<f64>, p1: Coord<f64>, p2: Coord<f64>, t: f64) -> Coord<f64> {
    let mt = 1.0 - t;
    Coord {
        x: mt * mt * p0.x + 2.0 * mt * t * p1.x + t * t * p2.x,
        y: mt * mt * p0.y + 2.0 * mt * t * p1.y + t * t * p2.y,
    }
}

fn cubic_extrema(p0: Coord<f64>, p1: Coord<f64>, p2: Coord<f64>, p3: Coord<f64>) -> Vec<f64> {
    let mut roots = Vec::with_capacity(4);
    for (v0, v1, v2, v3) in [(p0.x, p1.x, p2.x, p3.x), (p0.y, p1.y, p2.y, p3.y)] {
        // Derivative / 3 = a t^2 + b t + c
        let a = -v0 + 3.0 * v1 - 3.0 * v2 + v3;
        let b = 2.0 * (v0 - 2.0 * v1 + v2);
        let c = v1 - v0;
        if a.abs() < 1e-12 {
            if b.abs() > 1e-12 {
                roots.push(-c / b);
            }
            continue;
        }
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            continue;
        }
        let sq = disc.sqrt();
        roots.push((-b + sq) / (2.0 * a));
        roots.push((-b - sq) / (2.0 * a));
    }
    roots.retain(|t| *t > 0.0 && *t < 1.0);
    roots
}

fn cubic_at(p0: Coord<f64>, p1: Coord<f64>, p2: Coord<f64>, p3: Coord<f64>, t: f64) -> Coord<f64> {
    let mt = 1.0 - t;
    let (w0, w1, w2, w3) = (mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t);
    Coord {
        x: w0 * p0.x + w1 * p1.x + w2 * p2.x + w3 * p3.x,
        y: w0 * p0.y + w1 * p1.y + w2 * p2.y + w3 * p3.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    const SAMPLE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 800 400">
  <g id="turkiye">
    <g id="Istanbul" data-iladi="İstanbul">
      <path d="M 100 50 L 200 50 L 200 150 L 100 150 Z"/>
    </g>
    <g id="konya" data-iladi=" Konya ">
      <g transform="translate(10 20)">
        <path d="M 300 300 h 100 v 100 h -100 z"/>
      </g>
    </g>
    <g id="van">
      <path d="M 0 0 C 0 100 100 100 100 0"/>
    </g>
    <g id="empty"></g>
    <path id="stray" d="M 0 0 L 1 1"/>
  </g>
</svg>"##;

    #[test]
    fn test_parse_regions() {
        let map = parse_basemap(SAMPLE).unwrap();
        assert_eq!(map.viewport, Viewport::new(0.0, 0.0, 800.0, 400.0));
        let ids: Vec<&str> = map.regions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["Istanbul", "konya", "van"]);
        assert_eq!(map.regions[0].display_name, "İstanbul");
        assert_eq!(map.regions[1].display_name, "Konya");
        // No data-iladi: falls back to the id.
        assert_eq!(map.regions[2].display_name, "van");
    }

    #[test]
    fn test_transform_honored() {
        let map = parse_basemap(SAMPLE).unwrap();
        let konya = &map.regions[1];
        assert_eq!(konya.bounds, Bounds::new(310.0, 320.0, 410.0, 420.0));
        assert_eq!(konya.paths[0].transform.as_deref(), Some("matrix(1 0 0 1 10 20)"));
    }

    #[test]
    fn test_curve_bounds_are_tight() {
        let map = parse_basemap(SAMPLE).unwrap();
        let van = &map.regions[2];
        // Control points reach y = 100, the curve only reaches 75.
        assert_relative_eq!(van.bounds.max_y, 75.0, epsilon = 1e-9);
        assert_relative_eq!(van.bounds.max_x, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_svg_inside_html() {
        let html = format!("<!doctype html><html><body><div>{}</div></body></html>", SAMPLE);
        let map = parse_basemap(&html).unwrap();
        assert_eq!(map.regions.len(), 3);
    }

    #[test]
    fn test_html_with_icon_svgs() {
        let icon = r#"<svg viewBox="0 0 24 24"><path d="M0 0 L24 24"/></svg>"#;
        let nested = r##"<svg viewBox="0 0 10 10"><svg x="1"><circle r="1"/></svg><use href="#a"/></svg>"##;
        let html = format!(
            "<!doctype html><html><body><button>{icon}<img src=x></button>{nested}<main>{SAMPLE}</main><svg/></body></html>"
        );
        let map = parse_basemap(&html).unwrap();
        assert_eq!(map.viewport, Viewport::new(0.0, 0.0, 800.0, 400.0));
        assert_eq!(map.regions.len(), 3);

        assert_eq!(svg_elements(&html).len(), 4);
        assert_eq!(svg_elements(&html)[1], nested);
    }

    #[test]
    fn test_missing_viewbox_uses_default() {
        let svg = r#"<svg><g id="turkiye"><g id="a"><path d="M0 0 L1 1"/></g></g></svg>"#;
        let map = parse_basemap(svg).unwrap();
        assert_eq!(map.viewport, Viewport::DEFAULT);
    }

    #[test]
    fn test_missing_container_is_unavailable() {
        let err = parse_basemap(r#"<svg><g id="other"/></svg>"#).unwrap_err();
        assert!(matches!(err, Error::GeometrySourceUnavailable { .. }));
        let err = parse_basemap("not a map").unwrap_err();
        assert!(matches!(err, Error::GeometrySourceUnavailable { .. }));
    }

    #[test]
    fn test_bad_path_skipped_not_fatal() {
        let svg = r#"<svg><g id="turkiye"><g id="a"><path d="M 0 0 L 5 5"/><path d="M 1 Q"/></g></g></svg>"#;
        let map = parse_basemap(svg).unwrap();
        assert_eq!(map.regions[0].bounds, Bounds::new(0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn test_read_basemap_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let map = read_basemap(file.path()).unwrap();
        let reg = map.into_registry(AnchorTable::default());
        assert!(reg.get("istanbul").is_some());
        assert!(reg.anchor("istanbul-avr").is_some());
    }

    #[test]
    fn test_read_basemap_missing_file() {
        let err = read_basemap("/definitely/not/here.svg").unwrap_err();
        assert!(matches!(err, Error::GeometrySourceUnavailable { .. }));
    }
}
