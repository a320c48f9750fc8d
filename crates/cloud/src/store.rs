//! Attribute store abstraction and the failure-absorbing sync layer.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use depomap_colormap::Rgb;
use tracing::{info, warn};

use crate::error::{CloudError, Result};
use crate::models::{rows_to_map, AttributeMap, AttributeRow, AttributeValue, Collection};

/// Persistent storage of per-city attributes.
pub trait AttributeStore: Send + Sync {
    /// All rows of a collection, ordered by `city_id`.
    fn read_all(&self, collection: Collection) -> impl Future<Output = Result<Vec<AttributeRow>>> + Send;

    /// Insert or replace rows, matched by `city_name`.
    fn upsert_many(
        &self,
        collection: Collection,
        rows: &[AttributeRow],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Insert or replace one row.
    fn upsert(&self, row: AttributeRow) -> impl Future<Output = Result<()>> + Send {
        async move { self.upsert_many(row.collection(), std::slice::from_ref(&row)).await }
    }

    /// Remove every row of a collection.
    fn delete_all(&self, collection: Collection) -> impl Future<Output = Result<()>> + Send;
}

/// In-process store, used offline and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<Collection, BTreeMap<String, AttributeRow>>>,
    failing: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful write calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current value of one row, by display name.
    pub fn get(&self, collection: Collection, city_name: &str) -> Option<AttributeValue> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.get(&collection)?.get(city_name).map(|r| r.value)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CloudError::Network("memory store set to fail".into()));
        }
        Ok(())
    }
}

impl AttributeStore for MemoryStore {
    async fn read_all(&self, collection: Collection) -> Result<Vec<AttributeRow>> {
        self.check()?;
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let mut rows: Vec<AttributeRow> = tables
            .get(&collection)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| a.city_id.cmp(&b.city_id));
        Ok(rows)
    }

    async fn upsert_many(&self, collection: Collection, rows: &[AttributeRow]) -> Result<()> {
        self.check()?;
        if let Some(row) = rows.iter().find(|r| r.collection() != collection) {
            return Err(CloudError::Decode(format!(
                "{} value for {} written to {}",
                row.collection(),
                row.city_name,
                collection
            )));
        }
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let table = tables.entry(collection).or_default();
        for row in rows {
            table.insert(row.city_name.clone(), row.clone());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_all(&self, collection: Collection) -> Result<()> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.remove(&collection);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Whether the last store interaction succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Fresh,
    /// A read or write failed; displayed data may not match the store.
    Stale,
}

/// Store front-end that never fails: errors are logged, reads fall back to
/// empty maps, writes report `false`, and [`SyncStatus`] records the outcome.
#[derive(Debug)]
pub struct AttributeSync<S> {
    store: S,
    stale: AtomicBool,
}

impl<S: AttributeStore> AttributeSync<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            stale: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn status(&self) -> SyncStatus {
        if self.stale.load(Ordering::SeqCst) {
            SyncStatus::Stale
        } else {
            SyncStatus::Fresh
        }
    }

    pub(crate) fn record<T>(&self, what: &str, collection: Collection, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => {
                self.stale.store(false, Ordering::SeqCst);
                Some(v)
            }
            Err(e) => {
                warn!("Store {what} on {collection} failed: {e}");
                self.stale.store(true, Ordering::SeqCst);
                None
            }
        }
    }

    /// All values of a collection keyed by display name; empty on failure.
    pub async fn read_all(&self, collection: Collection) -> AttributeMap {
        let rows = self.store.read_all(collection).await;
        match self.record("read", collection, rows) {
            Some(rows) => {
                info!("Read {} rows from {}", rows.len(), collection);
                rows_to_map(rows)
            }
            None => AttributeMap::new(),
        }
    }

    pub async fn counts(&self) -> HashMap<String, u32> {
        self.read_all(Collection::StoreCounts)
            .await
            .into_iter()
            .filter_map(|(k, v)| v.as_count().map(|c| (k, c)))
            .collect()
    }

    pub async fn colors(&self) -> HashMap<String, Rgb> {
        self.read_all(Collection::Colors)
            .await
            .into_iter()
            .filter_map(|(k, v)| v.as_color().map(|c| (k, c)))
            .collect()
    }

    pub async fn radii(&self) -> HashMap<String, f64> {
        self.read_all(Collection::Radii)
            .await
            .into_iter()
            .filter_map(|(k, v)| v.as_radius().map(|r| (k, r)))
            .collect()
    }

    /// Persist one value under a display name.
    pub async fn upsert(&self, city_name: &str, value: AttributeValue) -> bool {
        let row = AttributeRow::new(city_name, value);
        let collection = row.collection();
        let result = self.store.upsert(row).await;
        self.record("upsert", collection, result).is_some()
    }

    /// Persist many values of one collection in a single request. Entries of
    /// another collection or with an empty key are dropped.
    pub async fn upsert_many<I>(&self, collection: Collection, entries: I) -> bool
    where
        I: IntoIterator<Item = (String, AttributeValue)>,
    {
        let rows: Vec<AttributeRow> = entries
            .into_iter()
            .filter(|(k, v)| !k.trim().is_empty() && v.collection() == collection)
            .map(|(k, v)| AttributeRow::new(&k, v))
            .collect();
        if rows.is_empty() {
            return true;
        }
        let result = self.store.upsert_many(collection, &rows).await;
        self.record("upsert", collection, result).is_some()
    }

    pub async fn delete_all(&self, collection: Collection) -> bool {
        let result = self.store.delete_all(collection).await;
        self.record("delete", collection, result).is_some()
    }

    /// Clear every collection; stops at the first failure.
    pub async fn clear_all(&self) -> bool {
        for collection in Collection::ALL {
            if !self.delete_all(collection).await {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_contract() {
        let store = MemoryStore::new();
        store.upsert(AttributeRow::new("Van", AttributeValue::Count(2))).await.unwrap();
        store.upsert(AttributeRow::new("Adana", AttributeValue::Count(5))).await.unwrap();
        store.upsert(AttributeRow::new("Van", AttributeValue::Count(3))).await.unwrap();

        let rows = store.read_all(Collection::StoreCounts).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].city_id, "adana");
        assert_eq!(rows[1].value, AttributeValue::Count(3));
        assert!(store.read_all(Collection::Colors).await.unwrap().is_empty());

        store.delete_all(Collection::StoreCounts).await.unwrap();
        assert!(store.read_all(Collection::StoreCounts).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_collection_rejected() {
        let store = MemoryStore::new();
        let row = AttributeRow::new("Van", AttributeValue::Radius(90.0));
        assert!(store.upsert_many(Collection::Colors, &[row]).await.is_err());
    }

    #[tokio::test]
    async fn test_sync_absorbs_failures() {
        let sync = AttributeSync::new(MemoryStore::new());
        assert!(sync.upsert("Bursa", AttributeValue::Count(4)).await);
        assert_eq!(sync.status(), SyncStatus::Fresh);

        sync.store().set_failing(true);
        assert!(sync.counts().await.is_empty());
        assert_eq!(sync.status(), SyncStatus::Stale);
        assert!(!sync.upsert("Bursa", AttributeValue::Count(9)).await);
        assert!(!sync.clear_all().await);

        sync.store().set_failing(false);
        assert_eq!(sync.counts().await.get("Bursa"), Some(&4));
        assert_eq!(sync.status(), SyncStatus::Fresh);
    }

    #[tokio::test]
    async fn test_upsert_many_filters() {
        let sync = AttributeSync::new(MemoryStore::new());
        let entries = vec![
            ("Rize".to_string(), AttributeValue::Color(Rgb::new(1, 2, 3))),
            ("  ".to_string(), AttributeValue::Color(Rgb::WHITE)),
            ("Ordu".to_string(), AttributeValue::Count(1)),
        ];
        assert!(sync.upsert_many(Collection::Colors, entries).await);
        let colors = sync.colors().await;
        assert_eq!(colors.len(), 1);
        assert_eq!(colors["Rize"], Rgb::new(1, 2, 3));
        assert_eq!(sync.store().write_count(), 1);

        // Nothing to write is a success without a request.
        assert!(sync.upsert_many(Collection::Radii, Vec::new()).await);
        assert_eq!(sync.store().write_count(), 1);
    }
}
