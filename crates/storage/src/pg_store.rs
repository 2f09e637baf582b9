//! PostgreSQL-backed stats cache.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use tracing::{debug, info};

use geostats_common::{CellStats, GeoPoint, GeoStatsError, GeoStatsResult, StatsMap};

use crate::store::StatsStore;

/// Connection pool sizing.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Open a PostgreSQL pool. Shared by the cache store and the spatial source.
pub async fn connect_pool(database_url: &str, settings: PoolSettings) -> GeoStatsResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await
        .map_err(|e| GeoStatsError::StoreUnavailable(format!("Connection failed: {}", e)))
}

/// Stats cache stored in the `geohash_stats` table.
pub struct PgStatsStore {
    pool: PgPool,
}

impl PgStatsStore {
    /// Connect with a fresh pool.
    pub async fn connect(database_url: &str, settings: PoolSettings) -> GeoStatsResult<Self> {
        let pool = connect_pool(database_url, settings).await?;
        Ok(Self { pool })
    }

    /// Use an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StatsStore for PgStatsStore {
    async fn migrate(&self) -> GeoStatsResult<()> {
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        GeoStatsError::StoreUnavailable(format!("Migration failed: {}", e))
                    })?;
            }
        }

        info!("geohash_stats schema ready");
        Ok(())
    }

    async fn get(&self, geohash: &str) -> GeoStatsResult<Option<CellStats>> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT geohash, center_lat, center_lng, stats FROM geohash_stats WHERE geohash = $1",
        )
        .bind(geohash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GeoStatsError::StoreUnavailable(format!("Query failed: {}", e)))?;

        Ok(row.map(CellStats::from))
    }

    async fn upsert(&self, record: &CellStats) -> GeoStatsResult<()> {
        let stats = serde_json::to_value(&record.stats)?;

        sqlx::query(
            r#"
            INSERT INTO geohash_stats (geohash, center_lat, center_lng, stats, computed_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (geohash)
            DO UPDATE SET
                center_lat = EXCLUDED.center_lat,
                center_lng = EXCLUDED.center_lng,
                stats = EXCLUDED.stats,
                computed_at = EXCLUDED.computed_at
            "#,
        )
        .bind(&record.geohash)
        .bind(record.center.lat)
        .bind(record.center.lng)
        .bind(stats)
        .execute(&self.pool)
        .await
        .map_err(|e| GeoStatsError::StoreUnavailable(format!("Upsert failed: {}", e)))?;

        debug!(cell = %record.geohash, stats = record.stats.len(), "Stored cell stats");
        Ok(())
    }

    async fn clear_all(&self) -> GeoStatsResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Transaction failed: {}", e)))?;

        // Block writers so the reported count matches what TRUNCATE removes.
        sqlx::query("LOCK TABLE geohash_stats IN ACCESS EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Lock failed: {}", e)))?;

        let removed: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM geohash_stats")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Count failed: {}", e)))?;

        sqlx::query("TRUNCATE TABLE geohash_stats")
            .execute(&mut *tx)
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Truncate failed: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Commit failed: {}", e)))?;

        Ok(removed.max(0) as u64)
    }

    async fn count(&self) -> GeoStatsResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM geohash_stats")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| GeoStatsError::StoreUnavailable(format!("Count failed: {}", e)))?;

        Ok(count.max(0) as u64)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[derive(FromRow)]
struct StatsRow {
    geohash: String,
    center_lat: f64,
    center_lng: f64,
    stats: Json<StatsMap>,
}

impl From<StatsRow> for CellStats {
    fn from(row: StatsRow) -> Self {
        CellStats::new(
            row.geohash,
            GeoPoint::new(row.center_lat, row.center_lng),
            row.stats.0,
        )
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS geohash_stats (
    geohash VARCHAR(12) PRIMARY KEY,
    center_lat DOUBLE PRECISION NOT NULL,
    center_lng DOUBLE PRECISION NOT NULL,
    stats JSONB NOT NULL DEFAULT '{}'::jsonb,
    computed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_geohash_stats_computed_at ON geohash_stats(computed_at)
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use geostats_common::StatValue;

    #[test]
    fn test_schema_statements_split_cleanly() {
        let statements: Vec<&str> = SCHEMA_SQL
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS geohash_stats"));
        assert!(statements[0].contains("geohash VARCHAR(12) PRIMARY KEY"));
    }

    #[test]
    fn test_row_conversion() {
        let mut stats = StatsMap::new();
        stats.insert("school_count".into(), StatValue::Integer(3));
        let row = StatsRow {
            geohash: "9q8yyk".into(),
            center_lat: 37.77374267578125,
            center_lng: -122.4151611328125,
            stats: Json(stats.clone()),
        };

        let record = CellStats::from(row);
        assert_eq!(record.geohash, "9q8yyk");
        assert_eq!(record.center.lat, 37.77374267578125);
        assert_eq!(record.stats, stats);
    }

    #[test]
    fn test_default_pool_settings() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(30));
    }
}
