//! Statistic registry handlers.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegistryResponse {
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
    pub statistics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub statistics_loaded: usize,
}

/// GET /stats/registry - Currently loaded statistic names
pub async fn registry_handler(Extension(state): Extension<Arc<AppState>>) -> Json<RegistryResponse> {
    let snapshot = state.service.registry_snapshot().await;
    Json(RegistryResponse {
        version: snapshot.version(),
        loaded_at: snapshot.loaded_at(),
        statistics: snapshot.names(),
    })
}

/// POST /stats/registry/reload - Re-read statistic definitions without clearing the cache
#[instrument(skip(state))]
pub async fn reload_registry_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<ReloadResponse> {
    let statistics_loaded = state.service.reload_registry().await;
    info!(statistics_loaded, "Statistic definitions reloaded");
    Json(ReloadResponse { statistics_loaded })
}
