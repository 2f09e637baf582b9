//! Redis-backed stats cache.
//!
//! One string key per cell holding the JSON-encoded record. Keys never expire;
//! records only leave the cache through `clear_all`.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tracing::debug;

use geostats_common::{CellStats, GeoStatsError, GeoStatsResult};

use crate::store::StatsStore;

const KEY_PREFIX: &str = "geostats:cell:";

fn cell_key(geohash: &str) -> String {
    format!("{}{}", KEY_PREFIX, geohash)
}

fn all_cells_pattern() -> String {
    format!("{}*", KEY_PREFIX)
}

/// Redis stats cache client.
pub struct RedisStatsStore {
    conn: MultiplexedConnection,
}

impl RedisStatsStore {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str) -> GeoStatsResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Redis connection failed: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Redis connection failed: {}", e)))?;

        Ok(Self { conn })
    }

    async fn cell_keys(&self) -> GeoStatsResult<Vec<String>> {
        let mut conn = self.conn.clone();
        redis::cmd("KEYS")
            .arg(all_cells_pattern())
            .query_async(&mut conn)
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Pattern search failed: {}", e)))
    }
}

#[async_trait]
impl StatsStore for RedisStatsStore {
    async fn get(&self, geohash: &str) -> GeoStatsResult<Option<CellStats>> {
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(cell_key(geohash))
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Cache get failed: {}", e)))?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: &CellStats) -> GeoStatsResult<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(record)?;

        let _: () = conn
            .set(cell_key(&record.geohash), json)
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Cache set failed: {}", e)))?;

        debug!(cell = %record.geohash, "Stored cell stats in Redis");
        Ok(())
    }

    async fn clear_all(&self) -> GeoStatsResult<u64> {
        let keys = self.cell_keys().await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let removed: u64 = conn
            .del(&keys)
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Delete failed: {}", e)))?;

        Ok(removed)
    }

    async fn count(&self) -> GeoStatsResult<u64> {
        Ok(self.cell_keys().await?.len() as u64)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
