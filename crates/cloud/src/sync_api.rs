//! Blocking (synchronous) API.
//!
//! Wraps [`AttributeSync`] and base-map loading with a Tokio runtime so
//! callers don't need to manage their own async runtime.

use std::collections::HashMap;

use depomap_colormap::{ReferenceColors, Rgb};
use depomap_core::io::BaseMap;

use crate::basemap;
use crate::client::{StoreConfig, SupabaseStore};
use crate::error::{CloudError, Result};
use crate::http::HttpOptions;
use crate::models::{AttributeMap, AttributeValue, Collection};
use crate::store::{AttributeStore, AttributeSync, SyncStatus};

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CloudError::Runtime(e.to_string()))
}

/// Blocking wrapper around [`AttributeSync`].
///
/// Uses an internal single-threaded Tokio runtime.
pub struct AttributeSyncBlocking<S> {
    rt: tokio::runtime::Runtime,
    inner: AttributeSync<S>,
}

impl AttributeSyncBlocking<SupabaseStore> {
    /// Connect to a hosted store.
    pub fn connect(config: StoreConfig) -> Result<Self> {
        let store = SupabaseStore::new(config, HttpOptions::default())?;
        Self::new(store)
    }
}

impl<S: AttributeStore> AttributeSyncBlocking<S> {
    pub fn new(store: S) -> Result<Self> {
        Ok(Self {
            rt: runtime()?,
            inner: AttributeSync::new(store),
        })
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status()
    }

    pub fn read_all(&self, collection: Collection) -> AttributeMap {
        self.rt.block_on(self.inner.read_all(collection))
    }

    pub fn counts(&self) -> HashMap<String, u32> {
        self.rt.block_on(self.inner.counts())
    }

    pub fn colors(&self) -> HashMap<String, Rgb> {
        self.rt.block_on(self.inner.colors())
    }

    pub fn radii(&self) -> HashMap<String, f64> {
        self.rt.block_on(self.inner.radii())
    }

    pub fn upsert(&self, city_name: &str, value: AttributeValue) -> bool {
        self.rt.block_on(self.inner.upsert(city_name, value))
    }

    pub fn upsert_many<I>(&self, collection: Collection, entries: I) -> bool
    where
        I: IntoIterator<Item = (String, AttributeValue)>,
    {
        self.rt.block_on(self.inner.upsert_many(collection, entries))
    }

    pub fn delete_all(&self, collection: Collection) -> bool {
        self.rt.block_on(self.inner.delete_all(collection))
    }

    pub fn clear_all(&self) -> bool {
        self.rt.block_on(self.inner.clear_all())
    }

    pub fn initialize(&self, reference: &ReferenceColors) -> bool {
        self.rt.block_on(self.inner.initialize(reference))
    }
}

/// One-shot: load a base map from a path or URL.
pub fn load_basemap(source: &str) -> Result<BaseMap> {
    runtime()?.block_on(basemap::load(source))
}
