//! Health and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub store: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_cells: Option<u64>,
    pub statistics: usize,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /ready - Readiness check (verifies the stats store is reachable)
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let store = state.service.store();
    let (store_status, cached_cells) = match store.count().await {
        Ok(count) => ("ok".to_string(), Some(count)),
        Err(e) => (format!("error: {}", e), None),
    };
    let ready = cached_cells.is_some();

    let response = ReadyResponse {
        ready,
        store: store_status,
        backend: store.backend().to_string(),
        cached_cells,
        statistics: state.service.registry_snapshot().await.len(),
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response)).into_response()
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
