//! Integration tests for the attribute store client.
//!
//! Tests marked `#[ignore]` require network access and a real store.
//! Run with: `DEPOMAP_STORE_URL=... DEPOMAP_STORE_KEY=... cargo test -p depomap-cloud -- --ignored`

use std::sync::Arc;
use std::time::Duration;

use depomap_cloud::{
    AttributeStore, AttributeSync, AttributeValue, Collection, DebouncedWriter, HttpOptions,
    MemoryStore, StoreConfig, SupabaseStore, SyncStatus,
};
use depomap_colormap::{ReferenceColors, Rgb};

/// Seed, edit through the debounced writer, then read back.
#[tokio::test(start_paused = true)]
async fn test_seed_then_debounced_edits() {
    let sync = Arc::new(AttributeSync::new(MemoryStore::new()));
    assert!(sync.initialize(&ReferenceColors::default()).await);

    let writer = DebouncedWriter::new(Arc::clone(&sync));
    for count in 1..=5 {
        writer.submit("Eskişehir", AttributeValue::Count(count));
        tokio::time::advance(Duration::from_millis(50)).await;
    }
    writer.submit("Eskişehir", AttributeValue::Color(Rgb::new(0x12, 0x34, 0x56)));
    assert!(writer.flush().await);

    let counts = sync.counts().await;
    assert_eq!(counts.len(), 81);
    assert_eq!(counts["Eskişehir"], 5);
    assert_eq!(sync.colors().await["Eskişehir"], Rgb::new(0x12, 0x34, 0x56));
    assert_eq!(sync.status(), SyncStatus::Fresh);
}

/// A store outage leaves reads empty and the status stale, then recovers.
#[tokio::test]
async fn test_outage_and_recovery() {
    let sync = AttributeSync::new(MemoryStore::new());
    assert!(sync.upsert("Erzurum", AttributeValue::Radius(250.0)).await);

    sync.store().set_failing(true);
    assert!(sync.radii().await.is_empty());
    assert!(!sync.delete_all(Collection::Radii).await);
    assert_eq!(sync.status(), SyncStatus::Stale);

    sync.store().set_failing(false);
    assert_eq!(sync.radii().await.get("Erzurum"), Some(&250.0));
    assert_eq!(sync.status(), SyncStatus::Fresh);
}

/// Cancel a base-map load through a oneshot channel.
#[tokio::test]
async fn test_load_cancelled_by_signal() {
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    tx.send(()).unwrap();
    let out = depomap_cloud::basemap::load_cancellable("https://example.invalid/map.svg", async {
        let _ = rx.await;
    })
    .await
    .unwrap();
    assert!(out.is_none());
}

/// Read all three collections from a real store.
#[tokio::test]
#[ignore]
async fn test_read_live_store() {
    let config = StoreConfig::from_env().expect("store settings in environment");
    let store = SupabaseStore::new(config, HttpOptions::default()).expect("client");

    for collection in Collection::ALL {
        let rows = store.read_all(collection).await.expect("read");
        println!("{}: {} rows", collection, rows.len());
    }
}
