//! Debounced attribute writes.
//!
//! Each `(collection, key)` has at most one pending write. A newer
//! submission for the same key aborts the pending one, so only the last
//! value of a burst reaches the store, under the spelling that opened the
//! burst. Different keys never delay each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use depomap_core::fold_key;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{AttributeValue, Collection};
use crate::store::{AttributeStore, AttributeSync};

/// Quiet period before a write is sent.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

type PendingKey = (Collection, String);

/// A scheduled write and the display name it will be stored under.
struct PendingWrite {
    city_name: String,
    handle: JoinHandle<bool>,
}

/// Coalesces bursts of writes per key. Must be used inside a tokio runtime.
pub struct DebouncedWriter<S> {
    sync: Arc<AttributeSync<S>>,
    delay: Duration,
    pending: Mutex<HashMap<PendingKey, PendingWrite>>,
}

impl<S: AttributeStore + 'static> DebouncedWriter<S> {
    pub fn new(sync: Arc<AttributeSync<S>>) -> Self {
        Self::with_delay(sync, DEBOUNCE_DELAY)
    }

    pub fn with_delay(sync: Arc<AttributeSync<S>>, delay: Duration) -> Self {
        Self {
            sync,
            delay,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn sync(&self) -> &Arc<AttributeSync<S>> {
        &self.sync
    }

    /// Schedule `value` to be written under `key` after the quiet period.
    ///
    /// A key that only differs in case or diacritics from a pending one
    /// supersedes it but keeps the pending spelling, since rows are matched
    /// on the exact display name.
    pub fn submit(&self, key: &str, value: AttributeValue) {
        let collection = value.collection();
        let pending_key = (collection, fold_key(key));
        let sync = Arc::clone(&self.sync);
        let delay = self.delay;

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|_, p| !p.handle.is_finished());
        let city_name = match pending.remove(&pending_key) {
            Some(previous) => {
                debug!("Superseding pending {} write for {}", collection, previous.city_name);
                previous.handle.abort();
                previous.city_name
            }
            None => key.trim().to_string(),
        };

        let name = city_name.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sync.upsert(&name, value).await
        });
        pending.insert(pending_key, PendingWrite { city_name, handle });
    }

    /// Number of writes not yet completed.
    pub fn pending(&self) -> usize {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.values().filter(|p| !p.handle.is_finished()).count()
    }

    /// Wait for every pending write. Returns `false` if any of them failed.
    pub async fn flush(&self) -> bool {
        let handles: Vec<JoinHandle<bool>> = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.drain().map(|(_, p)| p.handle).collect()
        };

        let mut ok = true;
        for result in futures::future::join_all(handles).await {
            match result {
                Ok(written) => ok &= written,
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    debug!("Write task failed: {e}");
                    ok = false;
                }
            }
        }
        ok
    }
}

impl<S> Drop for DebouncedWriter<S> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(|e| e.into_inner());
        for (_, p) in pending.drain() {
            p.handle.abort();
        }
    }
}
