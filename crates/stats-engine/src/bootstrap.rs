//! Wiring of a [`StatsService`] from configuration.

use std::sync::Arc;

use tracing::info;

use geostats_common::GeoStatsResult;
use storage::{
    connect_pool, MemoryStatsStore, PgStatsStore, PostgisSource, RedisStatsStore, StatsStore,
};

use crate::config::{CacheBackend, StatsConfig};
use crate::registry::RegistryHandle;
use crate::service::{ServiceOptions, StatsService};

/// Connect to the configured backends, prepare the cache schema and load the
/// registry.
pub async fn build_service(config: &StatsConfig) -> GeoStatsResult<StatsService> {
    let pool = connect_pool(&config.database_url, config.pool).await?;
    info!(
        max_connections = config.pool.max_connections,
        "Connected to spatial database"
    );

    let store: Arc<dyn StatsStore> = match config.cache_backend {
        CacheBackend::Postgres => Arc::new(PgStatsStore::from_pool(pool.clone())),
        CacheBackend::Redis => Arc::new(RedisStatsStore::connect(&config.redis_url).await?),
        CacheBackend::Memory => Arc::new(MemoryStatsStore::new()),
    };
    store.migrate().await?;
    info!(backend = store.backend(), "Stats cache ready");

    let registry = Arc::new(RegistryHandle::from_dir(&config.stats_dir));
    registry.reload().await;

    let options = ServiceOptions {
        default_precision: config.default_precision,
        single_flight: config.single_flight,
    };

    Ok(StatsService::new(
        store,
        Arc::new(PostgisSource::new(pool)),
        registry,
        options,
    ))
}
