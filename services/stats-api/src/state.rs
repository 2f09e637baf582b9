//! Application state for the stats API.

use std::sync::Arc;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;

use stats_engine::{build_service, StatsConfig, StatsService};

/// Shared application state.
pub struct AppState {
    /// Cache-aside statistics service.
    pub service: Arc<StatsService>,

    /// Prometheus recorder handle, when one is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new AppState from environment configuration.
    pub async fn new(prometheus: Option<PrometheusHandle>) -> Result<Self> {
        let config = StatsConfig::from_env()?;
        tracing::info!(
            backend = ?config.cache_backend,
            stats_dir = %config.stats_dir.display(),
            precision = config.default_precision,
            single_flight = config.single_flight,
            "Loaded configuration"
        );

        let service = build_service(&config).await?;

        Ok(Self {
            service: Arc::new(service),
            prometheus,
        })
    }

    /// Wrap an already constructed service.
    pub fn from_service(service: StatsService) -> Self {
        Self {
            service: Arc::new(service),
            prometheus: None,
        }
    }
}
