//! # depomap Cloud
//!
//! Client for the hosted attribute store (store counts, region colors and
//! coverage radii per city) and remote base-map loading.
//!
//! The store is a PostgREST (Supabase) project. [`AttributeSync`] sits in
//! front of any [`AttributeStore`] and turns failures into empty results and
//! a [`SyncStatus`], so a store outage never blocks rendering.
//! [`DebouncedWriter`] coalesces bursts of edits per city.

pub mod basemap;
pub mod client;
pub mod debounce;
pub mod error;
pub mod http;
pub mod models;
pub mod seed;
pub mod store;

pub mod sync_api;

pub use client::{StoreConfig, SupabaseStore, STORE_KEY_ENV, STORE_URL_ENV};
pub use debounce::{DebouncedWriter, DEBOUNCE_DELAY};
pub use error::{CloudError, Result};
pub use http::HttpOptions;
pub use models::{AttributeMap, AttributeRow, AttributeValue, Collection};
pub use store::{AttributeStore, AttributeSync, MemoryStore, SyncStatus};

/// Blocking API re-exported as `blocking` module.
pub mod blocking {
    pub use crate::sync_api::*;
}
