//! Cache store trait.

use async_trait::async_trait;

use geostats_common::{CellStats, GeoStatsResult};

/// Persistent key-value store of per-cell statistics, keyed by geohash.
///
/// Implementations must make `upsert` durable before returning and serve
/// `get` from the latest completed `upsert` for the same key.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Create the backing schema if the backend needs one.
    async fn migrate(&self) -> GeoStatsResult<()> {
        Ok(())
    }

    /// Look up a cell. A miss is `Ok(None)`.
    async fn get(&self, geohash: &str) -> GeoStatsResult<Option<CellStats>>;

    /// Insert or wholesale replace the record for `record.geohash`.
    async fn upsert(&self, record: &CellStats) -> GeoStatsResult<()>;

    /// Remove every record. Returns how many were removed.
    async fn clear_all(&self) -> GeoStatsResult<u64>;

    /// Number of cached records.
    async fn count(&self) -> GeoStatsResult<u64>;

    /// Short backend name for logs and status output.
    fn backend(&self) -> &'static str;
}
