//! # depomap Algorithms
//!
//! Coverage map computations for depomap.
//!
//! ## Modules
//!
//! - **geodesic**: projected geodesic coverage rings
//! - **coverage**: per-depot anchor, radius and color; world and province views
//! - **paint**: region fills with key resolution
//! - **labels**: region names and store counts
//! - **dashboard**: render stages and the derived draw plan
//! - **svg**: SVG serialization of draw plans
//! - **export**: printed page layout
//! - **input**: validation of user-entered radii and counts

pub mod coverage;
pub mod dashboard;
pub mod export;
pub mod geodesic;
pub mod input;
pub mod labels;
pub mod paint;
pub mod svg;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::coverage::{
        compute_rings, AnchorSource, CoverageConfig, CoverageResult, CoverageRing, DepotCoordinates,
        DepotSelection,
    };
    pub use crate::dashboard::{Dashboard, DrawPlan, RenderStage};
    pub use crate::export::{a3_layout, fit_to_page, PageLayout};
    pub use crate::geodesic::{build_ring, destination, ring_path_data, GeodesicRing, RingParams};
    pub use crate::input::{validate_count, validate_radius, MapView};
    pub use crate::labels::{render_labels, LabelLayer, LabelRenderer, TextLabel};
    pub use crate::paint::{PaintEngine, PaintReport};
    pub use crate::svg::{render_plan, render_rings};
    pub use depomap_core::prelude::*;
}
