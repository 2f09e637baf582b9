//! Cache-aside statistics service.
//!
//! A request for a cell is served from the store when present. On a miss,
//! every statistic in one registry snapshot is evaluated at the cell center
//! and the complete record is stored before it is returned. A failing
//! statistic fails the whole request and nothing is stored.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use geohash_codec::{decode, encode, validate};
use geostats_common::{CellStats, GeoPoint, GeoStatsError, GeoStatsResult, StatValue, StatsMap};
use storage::{SpatialSource, StatsStore};

use crate::registry::{RegistryHandle, StatsRegistry};
use crate::single_flight::KeyLocks;

/// Tunables for [`StatsService`].
#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    /// Precision used when a point request does not give one.
    pub default_precision: usize,
    /// Coalesce concurrent misses for the same cell into one computation.
    pub single_flight: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            default_precision: geohash_codec::DEFAULT_PRECISION,
            single_flight: true,
        }
    }
}

/// Statistics for one cell as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellStatsResponse {
    pub geohash: String,
    pub center_point: GeoPoint,
    pub stats: StatsMap,
    /// Whether the result was served from the store.
    pub cached: bool,
}

impl CellStatsResponse {
    fn from_record(record: CellStats, cached: bool) -> Self {
        Self {
            geohash: record.geohash,
            center_point: record.center,
            stats: record.stats,
            cached,
        }
    }
}

/// Outcome of [`StatsService::clear_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    pub records_removed: u64,
    pub statistics_loaded: usize,
}

/// Orchestrates the registry, the cache store and the spatial source.
pub struct StatsService {
    store: Arc<dyn StatsStore>,
    source: Arc<dyn SpatialSource>,
    registry: Arc<RegistryHandle>,
    options: ServiceOptions,
    key_locks: KeyLocks,
}

impl StatsService {
    pub fn new(
        store: Arc<dyn StatsStore>,
        source: Arc<dyn SpatialSource>,
        registry: Arc<RegistryHandle>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            store,
            source,
            registry,
            options,
            key_locks: KeyLocks::new(),
        }
    }

    pub fn options(&self) -> ServiceOptions {
        self.options
    }

    pub fn store(&self) -> &Arc<dyn StatsStore> {
        &self.store
    }

    /// Statistics for the cell containing a point.
    ///
    /// `precision` falls back to the configured default.
    pub async fn compute_for_point(
        &self,
        lat: f64,
        lng: f64,
        precision: Option<usize>,
    ) -> GeoStatsResult<CellStatsResponse> {
        let precision = precision.unwrap_or(self.options.default_precision);
        let cell_id = encode(lat, lng, precision)?;
        self.compute_for_cell(&cell_id).await
    }

    /// Statistics for a cell, computed and stored on a miss.
    #[instrument(skip(self))]
    pub async fn compute_for_cell(&self, cell_id: &str) -> GeoStatsResult<CellStatsResponse> {
        validate(cell_id)?;

        let mut registry = self.registry.snapshot().await;
        if registry.is_empty() {
            registry = self.registry.reload().await;
        }

        if let Some(record) = self.lookup(cell_id).await? {
            return Ok(CellStatsResponse::from_record(record, true));
        }

        if self.options.single_flight {
            let _guard = self.key_locks.lock(cell_id).await;
            // Another request may have filled the cell while we waited.
            if let Some(record) = self.store.get(cell_id).await? {
                debug!(cell = %cell_id, "Served by concurrent computation");
                return Ok(CellStatsResponse::from_record(record, true));
            }
            self.compute_and_store(cell_id, &registry).await
        } else {
            self.compute_and_store(cell_id, &registry).await
        }
    }

    /// Empty the store, then reload the registry.
    ///
    /// The registry is left alone when the store cannot be cleared.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> GeoStatsResult<ClearReport> {
        let records_removed = self.store.clear_all().await.map_err(|e| {
            error!(error = %e, "Failed to clear stats cache");
            e
        })?;

        let registry = self.registry.reload().await;
        info!(
            records_removed,
            statistics = registry.len(),
            "Cleared stats cache"
        );

        Ok(ClearReport {
            records_removed,
            statistics_loaded: registry.len(),
        })
    }

    /// Reload the registry without touching the store.
    pub async fn reload_registry(&self) -> usize {
        self.registry.reload().await.len()
    }

    pub async fn registry_snapshot(&self) -> Arc<StatsRegistry> {
        self.registry.snapshot().await
    }

    async fn lookup(&self, cell_id: &str) -> GeoStatsResult<Option<CellStats>> {
        let record = self.store.get(cell_id).await?;
        if record.is_some() {
            counter!("geostats_cache_hits_total").increment(1);
            debug!(cell = %cell_id, "Cache hit");
        } else {
            counter!("geostats_cache_misses_total").increment(1);
            debug!(cell = %cell_id, "Cache miss");
        }
        Ok(record)
    }

    async fn compute_and_store(
        &self,
        cell_id: &str,
        registry: &StatsRegistry,
    ) -> GeoStatsResult<CellStatsResponse> {
        let center = decode(cell_id)?;
        let start = Instant::now();

        let mut stats = StatsMap::new();
        for (name, query) in registry.iter() {
            let value = self
                .source
                .query_scalar(query, center)
                .await
                .map_err(|e| {
                    counter!("geostats_computation_failures_total").increment(1);
                    error!(cell = %cell_id, statistic = %name, error = %e, "Statistic failed");
                    query_failure(name, e)
                })?;
            let value = value.unwrap_or(StatValue::ZERO);
            if !value.is_finite() {
                counter!("geostats_computation_failures_total").increment(1);
                error!(cell = %cell_id, statistic = %name, value = %value, "Statistic is not finite");
                return Err(GeoStatsError::query_failed(
                    name,
                    format!("result {} is not a finite number", value),
                ));
            }
            stats.insert(name.to_string(), value);
        }

        let record = CellStats::new(cell_id, center, stats);
        self.store.upsert(&record).await?;

        let elapsed = start.elapsed();
        counter!("geostats_computations_total").increment(1);
        histogram!("geostats_compute_duration_seconds").record(elapsed.as_secs_f64());
        info!(
            cell = %cell_id,
            statistics = record.stats.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Computed cell stats"
        );

        Ok(CellStatsResponse::from_record(record, false))
    }
}

fn query_failure(statistic: &str, err: GeoStatsError) -> GeoStatsError {
    match err {
        GeoStatsError::QueryExecutionFailure { message, .. } => {
            GeoStatsError::query_failed(statistic, message)
        }
        other => GeoStatsError::query_failed(statistic, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_failure_names_statistic() {
        let err = query_failure("school_count", GeoStatsError::Internal("boom".into()));
        match err {
            GeoStatsError::QueryExecutionFailure { statistic, message } => {
                assert_eq!(statistic, "school_count");
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_query_failure_keeps_inner_message() {
        let err = query_failure(
            "avg_income",
            GeoStatsError::query_failed("ignored", "relation \"tracts\" does not exist"),
        );
        assert_eq!(
            err.to_string(),
            "Statistic 'avg_income' failed: relation \"tracts\" does not exist"
        );
    }

    #[test]
    fn test_response_serializes_center_point() {
        let mut stats = StatsMap::new();
        stats.insert("school_count".into(), StatValue::Integer(0));
        let record = CellStats::new("9q8yyk", GeoPoint::new(37.5, -122.5), stats);
        let json = serde_json::to_value(CellStatsResponse::from_record(record, true)).unwrap();
        assert_eq!(json["geohash"], "9q8yyk");
        assert_eq!(json["center_point"]["lat"], 37.5);
        assert_eq!(json["stats"]["school_count"], 0);
        assert_eq!(json["cached"], true);
    }
}
