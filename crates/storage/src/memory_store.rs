//! In-process stats cache.
//!
//! Used by tests and by deployments configured with the `memory` backend.
//! Contents are lost when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use geostats_common::{CellStats, GeoStatsResult};

use crate::store::StatsStore;

/// Stats cache held in a `HashMap`.
#[derive(Default)]
pub struct MemoryStatsStore {
    records: RwLock<HashMap<String, CellStats>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with existing records.
    pub fn with_records(records: impl IntoIterator<Item = CellStats>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.geohash.clone(), r))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Number of entries currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn get(&self, geohash: &str) -> GeoStatsResult<Option<CellStats>> {
        Ok(self.records.read().await.get(geohash).cloned())
    }

    async fn upsert(&self, record: &CellStats) -> GeoStatsResult<()> {
        self.records
            .write()
            .await
            .insert(record.geohash.clone(), record.clone());
        Ok(())
    }

    async fn clear_all(&self) -> GeoStatsResult<u64> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn count(&self) -> GeoStatsResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geostats_common::{GeoPoint, StatValue, StatsMap};

    fn record(geohash: &str, school_count: i64) -> CellStats {
        let mut stats = StatsMap::new();
        stats.insert("school_count".to_string(), StatValue::Integer(school_count));
        CellStats::new(geohash, GeoPoint::new(37.77, -122.41), stats)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let store = MemoryStatsStore::new();
        assert!(store.get("9q8yyk").await.unwrap().is_none());

        store.upsert(&record("9q8yyk", 3)).await.unwrap();
        let hit = store.get("9q8yyk").await.unwrap().unwrap();
        assert_eq!(hit.stats["school_count"], StatValue::Integer(3));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_whole_record() {
        let store = MemoryStatsStore::new();
        store.upsert(&record("9q8yyk", 3)).await.unwrap();

        let mut replacement = CellStats::new("9q8yyk", GeoPoint::new(1.0, 2.0), StatsMap::new());
        replacement
            .stats
            .insert("park_area".to_string(), StatValue::Float(1.5));
        store.upsert(&replacement).await.unwrap();

        let stored = store.get("9q8yyk").await.unwrap().unwrap();
        assert_eq!(stored, replacement);
        assert!(!stored.stats.contains_key("school_count"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_all_reports_and_is_idempotent() {
        let store = MemoryStatsStore::with_records([record("9q8yyk", 1), record("gcpvj0d", 2)]);
        assert_eq!(store.clear_all().await.unwrap(), 2);
        assert!(store.is_empty().await);
        assert_eq!(store.clear_all().await.unwrap(), 0);
    }
}
