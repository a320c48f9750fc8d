//! Anchor overrides and synthetic depot anchors.
//!
//! A region's ring/dot anchor is its centroid plus an optional planar nudge.
//! Some depots sit inside a region that hosts more than one depot; those are
//! *synthetic* anchors placed at a fractional position inside the parent
//! region's bounding box.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Planar `(dx, dy)` offset in map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorOffset {
    pub dx: f64,
    pub dy: f64,
}

impl AnchorOffset {
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// A depot anchored at a fractional position inside a parent region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticAnchor {
    /// Depot identifier, e.g. `istanbul-avr`.
    pub id: String,
    /// Normalized id of the region that contains the depot.
    pub parent: String,
    /// Fraction of the parent's bounding-box width, from the left edge.
    pub fx: f64,
    /// Fraction of the parent's bounding-box height, from the top edge.
    pub fy: f64,
    /// Key under which the depot's attributes are persisted.
    pub store_key: String,
    /// Short tag used in count labels.
    pub tag: String,
}

/// Static table of anchor overrides and synthetic anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorTable {
    pub overrides: HashMap<String, AnchorOffset>,
    pub synthetic: Vec<SyntheticAnchor>,
}

impl AnchorTable {
    /// An empty table: every anchor is its region's centroid.
    pub fn empty() -> Self {
        Self {
            overrides: HashMap::new(),
            synthetic: Vec::new(),
        }
    }

    pub fn offset(&self, region_id: &str) -> Option<AnchorOffset> {
        self.overrides.get(region_id).copied()
    }

    pub fn synthetic(&self, depot_id: &str) -> Option<&SyntheticAnchor> {
        self.synthetic.iter().find(|s| s.id == depot_id)
    }

    /// Synthetic anchors whose parent is `region_id`, in table order.
    pub fn children_of<'a>(&'a self, region_id: &'a str) -> impl Iterator<Item = &'a SyntheticAnchor> + 'a {
        self.synthetic.iter().filter(move |s| s.parent == region_id)
    }

    /// Whether `region_id` is split between synthetic depots.
    pub fn is_split(&self, region_id: &str) -> bool {
        self.children_of(region_id).next().is_some()
    }
}

impl Default for AnchorTable {
    fn default() -> Self {
        let overrides = [
            ("izmir", 0.0, 25.0),
            ("eskisehir", -20.0, -15.0),
            ("ankara", 25.0, -5.0),
            ("bursa", 12.0, -8.0),
            ("adana", -30.0, 10.0),
            ("kayseri", -25.0, -15.0),
            ("mugla", 0.0, -20.0),
            ("antalya", 0.0, -8.0),
            ("gaziantep", 0.0, -8.0),
        ]
        .into_iter()
        .map(|(id, dx, dy)| (id.to_string(), AnchorOffset::new(dx, dy)))
        .collect();

        let synthetic = vec![
            SyntheticAnchor {
                id: "istanbul-avr".into(),
                parent: "istanbul".into(),
                fx: 0.15,
                fy: 0.45,
                store_key: "İstanbul - AVR".into(),
                tag: "İST - AVR".into(),
            },
            SyntheticAnchor {
                id: "istanbul-and".into(),
                parent: "istanbul".into(),
                fx: 0.73,
                fy: 0.85,
                store_key: "İstanbul - AND".into(),
                tag: "İST - AND".into(),
            },
        ];

        Self { overrides, synthetic }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let t = AnchorTable::default();
        assert_eq!(t.overrides.len(), 9);
        assert_eq!(t.offset("izmir"), Some(AnchorOffset::new(0.0, 25.0)));
        assert_eq!(t.offset("adana"), Some(AnchorOffset::new(-30.0, 10.0)));
        assert_eq!(t.offset("konya"), None);
        assert!(t.is_split("istanbul"));
        assert!(!t.is_split("ankara"));
        assert_eq!(t.children_of("istanbul").count(), 2);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let t: AnchorTable = serde_json::from_str(r#"{"overrides": {"konya": {"dx": 1, "dy": 2}}}"#).unwrap();
        assert_eq!(t.offset("konya"), Some(AnchorOffset::new(1.0, 2.0)));
        // Missing field falls back to the canonical synthetic anchors.
        assert_eq!(t.synthetic.len(), 2);
    }
}
