//! First-run seeding of the attribute tables.

use depomap_colormap::ReferenceColors;
use depomap_core::provinces::provinces;
use tracing::info;

use crate::models::{AttributeRow, AttributeValue, Collection};
use crate::store::{AttributeStore, AttributeSync};

/// Collections seeded by [`AttributeSync::initialize`]. Radii stay empty so
/// the configured defaults apply.
pub const SEEDED: [Collection; 2] = [Collection::StoreCounts, Collection::Colors];

/// One row per province: count 0, or the reference color (fallback gray when
/// the province has none).
pub fn seed_rows(collection: Collection, reference: &ReferenceColors) -> Vec<AttributeRow> {
    provinces()
        .filter_map(|(id, name)| {
            let value = match collection {
                Collection::StoreCounts => AttributeValue::Count(0),
                Collection::Colors => AttributeValue::Color(reference.get_or_fallback(&id)),
                Collection::Radii => return None,
            };
            Some(AttributeRow {
                city_id: id,
                city_name: name.to_string(),
                value,
            })
        })
        .collect()
}

impl<S: AttributeStore> AttributeSync<S> {
    /// Seed every empty collection in [`SEEDED`]. Collections that already
    /// hold rows are left alone. Returns `false` on the first failure.
    pub async fn initialize(&self, reference: &ReferenceColors) -> bool {
        for collection in SEEDED {
            let existing = self.store().read_all(collection).await;
            let Some(existing) = self.record("read", collection, existing) else {
                return false;
            };
            if !existing.is_empty() {
                info!("{} already holds {} rows", collection, existing.len());
                continue;
            }

            let rows = seed_rows(collection, reference);
            let result = self.store().upsert_many(collection, &rows).await;
            if self.record("seed", collection, result).is_none() {
                return false;
            }
            info!("Seeded {} with {} rows", collection, rows.len());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use depomap_colormap::{Rgb, FALLBACK_FILL};

    #[test]
    fn test_seed_rows_cover_all_provinces() {
        let reference = ReferenceColors::default();
        let counts = seed_rows(Collection::StoreCounts, &reference);
        assert_eq!(counts.len(), 81);
        assert!(counts.iter().all(|r| r.value == AttributeValue::Count(0)));

        let colors = seed_rows(Collection::Colors, &reference);
        let izmir = colors.iter().find(|r| r.city_name == "İzmir").unwrap();
        assert_eq!(izmir.city_id, "izmir");
        assert_eq!(izmir.value.as_color(), reference.get("izmir"));

        assert!(seed_rows(Collection::Radii, &reference).is_empty());
    }

    #[test]
    fn test_seed_uses_fallback_for_unknown() {
        let reference = ReferenceColors::new(Default::default());
        let colors = seed_rows(Collection::Colors, &reference);
        assert!(colors.iter().all(|r| r.value.as_color() == Some(FALLBACK_FILL)));
    }

    #[tokio::test]
    async fn test_initialize_only_fills_empty_collections() {
        let sync = AttributeSync::new(MemoryStore::new());
        assert!(sync.upsert("Ankara", AttributeValue::Color(Rgb::new(0, 0, 0))).await);

        assert!(sync.initialize(&ReferenceColors::default()).await);
        assert_eq!(sync.counts().await.len(), 81);
        let colors = sync.colors().await;
        assert_eq!(colors.len(), 1);
        assert_eq!(colors["Ankara"], Rgb::new(0, 0, 0));

        // Second run is a no-op.
        let writes = sync.store().write_count();
        assert!(sync.initialize(&ReferenceColors::default()).await);
        assert_eq!(sync.store().write_count(), writes);
    }

    #[tokio::test]
    async fn test_initialize_reports_failure() {
        let sync = AttributeSync::new(MemoryStore::new());
        sync.store().set_failing(true);
        assert!(!sync.initialize(&ReferenceColors::default()).await);
    }
}
