//! # depomap Core
//!
//! Core types, traits and I/O for the depomap coverage map engine.
//!
//! This crate provides:
//! - `Projection` / `WebMercator`: geographic ↔ planar mapping
//! - `Bounds`, `GeoPoint`: planar and geographic primitives
//! - `Region`, `RegionRegistry`: named map regions with anchor overrides
//! - `Resolver`: ordered lookup strategies for region keys
//! - I/O for the SVG base map

pub mod anchor;
pub mod error;
pub mod geometry;
pub mod io;
pub mod projection;
pub mod provinces;
pub mod region;
pub mod registry;
pub mod resolve;

pub use anchor::{AnchorOffset, AnchorTable, SyntheticAnchor};
pub use error::{Error, Result};
pub use geometry::{Bounds, GeoPoint};
pub use projection::{GeoBounds, Project, Projection, Viewport, WebMercator};
pub use region::Region;
pub use registry::RegionRegistry;
pub use resolve::{fold_diacritics, fold_key, normalize_id, ResolveStrategy, Resolver};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::anchor::{AnchorTable, SyntheticAnchor};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Bounds, GeoPoint};
    pub use crate::projection::{GeoBounds, Project, Projection, Viewport, WebMercator};
    pub use crate::region::Region;
    pub use crate::registry::RegionRegistry;
    pub use crate::resolve::{ResolveStrategy, Resolver};
    pub use crate::Algorithm;
}

/// Core trait for the computational stages of depomap.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
