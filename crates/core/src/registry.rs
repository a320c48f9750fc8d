//! Region registry: regions indexed by normalized id, plus depot anchors.

use std::collections::HashMap;

use geo_types::Coord;
use tracing::warn;

use crate::anchor::{AnchorTable, SyntheticAnchor};
use crate::region::{RawRegion, Region};
use crate::resolve::{fold_key, normalize_id, Resolver};

/// A depot identifier resolved against the registry.
#[derive(Debug, Clone, Copy)]
pub enum Depot<'a> {
    /// The depot is a whole region.
    Region(&'a Region),
    /// The depot shares its parent region with other depots.
    Synthetic {
        anchor: &'a SyntheticAnchor,
        parent: &'a Region,
    },
}

impl Depot<'_> {
    /// Canonical depot id.
    pub fn id(&self) -> &str {
        match self {
            Depot::Region(r) => &r.id,
            Depot::Synthetic { anchor, .. } => &anchor.id,
        }
    }

    /// Human-readable label, which is also the persistent attribute key.
    pub fn label(&self) -> &str {
        match self {
            Depot::Region(r) => &r.display_name,
            Depot::Synthetic { anchor, .. } => &anchor.store_key,
        }
    }

    /// Planar anchor of the depot's ring and dot.
    pub fn anchor(&self) -> Coord<f64> {
        match self {
            Depot::Region(r) => r.anchor(),
            Depot::Synthetic { anchor, parent } => parent.bounds.fraction(anchor.fx, anchor.fy),
        }
    }
}

/// Regions in base-map order, indexed by normalized id.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    regions: Vec<Region>,
    index: HashMap<String, usize>,
    anchors: AnchorTable,
}

impl RegionRegistry {
    /// Build a registry from parsed regions. Ids are normalized; when two
    /// regions share an id the first one wins.
    pub fn build<I>(raw_regions: I, anchors: AnchorTable) -> Self
    where
        I: IntoIterator<Item = RawRegion>,
    {
        let mut regions = Vec::new();
        let mut index = HashMap::new();

        for raw in raw_regions {
            let id = normalize_id(&raw.id);
            if id.is_empty() {
                warn!("Skipping region with empty id ({})", raw.display_name);
                continue;
            }
            if index.contains_key(&id) {
                warn!("Duplicate region id '{}', keeping the first occurrence", id);
                continue;
            }
            let region = Region {
                anchor_override: anchors.offset(&id),
                centroid: raw.bounds.center(),
                bounds: raw.bounds,
                display_name: raw.display_name,
                paths: raw.paths,
                id: id.clone(),
            };
            index.insert(id, regions.len());
            regions.push(region);
        }

        Self { regions, index, anchors }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region by normalized id.
    pub fn get(&self, id: &str) -> Option<&Region> {
        self.index.get(id).map(|&i| &self.regions[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Regions in base-map order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn anchors(&self) -> &AnchorTable {
        &self.anchors
    }

    /// Resolve a depot id: synthetic ids first (also in their store-key
    /// form), then regions through the paint resolver chain.
    pub fn depot(&self, depot_id: &str) -> Option<Depot<'_>> {
        let wanted = fold_key(depot_id);
        let synthetic = self
            .anchors
            .synthetic
            .iter()
            .find(|s| s.id == depot_id)
            .or_else(|| {
                self.anchors
                    .synthetic
                    .iter()
                    .find(|s| fold_key(&s.id) == wanted || fold_key(&s.store_key) == wanted)
            });

        if let Some(anchor) = synthetic {
            return match self.get(&anchor.parent) {
                Some(parent) => Some(Depot::Synthetic { anchor, parent }),
                None => {
                    warn!(
                        "Synthetic depot '{}' has no parent region '{}'",
                        anchor.id, anchor.parent
                    );
                    None
                }
            };
        }

        Resolver::paint().resolve(self, depot_id).map(Depot::Region)
    }

    /// Planar anchor for a depot: fractional point inside the parent for
    /// synthetic ids, centroid plus override for regions, `None` otherwise.
    pub fn anchor(&self, depot_id: &str) -> Option<Coord<f64>> {
        self.depot(depot_id).map(|d| d.anchor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use approx::assert_relative_eq;

    fn raw(id: &str, name: &str, b: Bounds) -> RawRegion {
        RawRegion {
            id: id.into(),
            display_name: name.into(),
            bounds: b,
            paths: vec![],
        }
    }

    fn registry() -> RegionRegistry {
        RegionRegistry::build(
            vec![
                raw("istanbul", "İstanbul", Bounds::new(100.0, 50.0, 200.0, 150.0)),
                raw("Izmir", "İzmir", Bounds::new(0.0, 300.0, 40.0, 360.0)),
                raw("konya", "Konya", Bounds::new(300.0, 300.0, 400.0, 400.0)),
                raw("konya", "Konya (dup)", Bounds::new(0.0, 0.0, 1.0, 1.0)),
            ],
            AnchorTable::default(),
        )
    }

    #[test]
    fn test_build_normalizes_and_dedups() {
        let reg = registry();
        assert_eq!(reg.len(), 3);
        assert!(reg.contains("izmir"));
        assert_eq!(reg.get("konya").unwrap().display_name, "Konya");
    }

    #[test]
    fn test_centroid_is_bbox_center() {
        let reg = registry();
        let c = reg.get("konya").unwrap().centroid;
        assert_relative_eq!(c.x, 350.0);
        assert_relative_eq!(c.y, 350.0);
    }

    #[test]
    fn test_override_moves_anchor_not_centroid() {
        let reg = registry();
        let izmir = reg.get("izmir").unwrap();
        assert_relative_eq!(izmir.centroid.y, 330.0);
        let a = reg.anchor("izmir").unwrap();
        assert_relative_eq!(a.x, 20.0);
        assert_relative_eq!(a.y, 355.0);
    }

    #[test]
    fn test_synthetic_anchors() {
        let reg = registry();
        let avr = reg.anchor("istanbul-avr").unwrap();
        assert_relative_eq!(avr.x, 115.0, epsilon = 1e-9);
        assert_relative_eq!(avr.y, 95.0, epsilon = 1e-9);

        let and = reg.anchor("istanbul-and").unwrap();
        assert_relative_eq!(and.x, 173.0, epsilon = 1e-9);
        assert_relative_eq!(and.y, 135.0, epsilon = 1e-9);

        // Store-key spelling resolves to the same depot.
        let d = reg.depot("İstanbul - AVR").unwrap();
        assert_eq!(d.id(), "istanbul-avr");
        assert_eq!(d.label(), "İstanbul - AVR");
    }

    #[test]
    fn test_unknown_depot() {
        let reg = registry();
        assert!(reg.anchor("atlantis").is_none());
    }

    #[test]
    fn test_synthetic_without_parent() {
        let reg = RegionRegistry::build(
            vec![raw("konya", "Konya", Bounds::new(0.0, 0.0, 1.0, 1.0))],
            AnchorTable::default(),
        );
        assert!(reg.anchor("istanbul-avr").is_none());
    }
}
