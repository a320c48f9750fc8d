//! I/O operations for reading the base map

mod basemap;

pub use basemap::{
    parse_basemap, path_bounds, read_basemap, Affine, BaseMap, NAME_ATTRIBUTE, REGION_CONTAINER_ID,
};
