//! Dashboard configuration file.
//!
//! Every table is optional; missing ones keep their built-in defaults, so
//! `{}` is a valid configuration.

use std::path::Path;

use anyhow::{Context, Result};
use depomap_algorithms::coverage::{CoverageConfig, DepotCoordinates, DepotSelection};
use depomap_algorithms::dashboard::Dashboard;
use depomap_colormap::{Palette, ReferenceColors};
use depomap_core::AnchorTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub anchors: AnchorTable,
    pub coverage: CoverageConfig,
    /// Ring settings for the world view.
    pub world: WorldConfig,
    pub reference: ReferenceColors,
    pub selection: DepotSelection,
    pub depots: DepotCoordinates,
    pub show_labels: ShowLabels,
}

/// World view rings: one radius for every depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub radius_km: f64,
    pub palette: Palette,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let world = CoverageConfig::world();
        Self {
            radius_km: world.global_radius_km,
            palette: world.palette,
        }
    }
}

impl WorldConfig {
    pub fn coverage(&self) -> CoverageConfig {
        CoverageConfig {
            global_radius_km: self.radius_km,
            palette: self.palette.clone(),
            ..CoverageConfig::world()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowLabels(pub bool);

impl Default for ShowLabels {
    fn default() -> Self {
        Self(true)
    }
}

impl DashboardConfig {
    /// Read a JSON file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// A dashboard using this configuration's tables.
    pub fn dashboard(&self) -> Dashboard {
        let mut dashboard = Dashboard::new(self.anchors.clone(), self.coverage.clone(), self.reference.clone());
        dashboard.set_selection(self.selection.clone());
        dashboard.set_show_labels(self.show_labels.0);
        dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"{}").unwrap();
        let cfg = DashboardConfig::load(Some(f.path())).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert!(cfg.show_labels.0);
        assert_eq!(cfg.selection.len(), 17);
        assert_eq!(cfg.world.coverage().palette.len(), 15);
        assert!(cfg.world.coverage().radius_overrides.is_empty());
    }

    #[test]
    fn test_partial_override() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(
            br#"{
                "selection": ["ankara", "izmir"],
                "coverage": { "global_radius_km": 200 },
                "show_labels": false,
                "world": { "radius_km": 300 }
            }"#,
        )
        .unwrap();
        let cfg = DashboardConfig::load(Some(f.path())).unwrap();
        assert_eq!(cfg.selection.len(), 2);
        assert_eq!(cfg.coverage.global_radius_km, 200.0);
        // Untouched fields of a partial table keep their defaults.
        assert_eq!(cfg.coverage.radius_for("erzurum"), 250.0);
        assert!(!cfg.show_labels.0);
        assert_eq!(cfg.world.coverage().global_radius_km, 300.0);
        assert_eq!(cfg.world.palette.len(), 15);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(DashboardConfig::load(Some(Path::new("/nonexistent/depomap.json"))).is_err());
        assert!(DashboardConfig::load(None).is_ok());
    }
}
