//! Cache management handlers.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::error::ErrorBody;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub message: String,
    pub records_removed: u64,
    pub statistics_loaded: usize,
}

/// DELETE /stats/cache - Remove every cached cell and reload statistic definitions
#[instrument(skip(state))]
pub async fn clear_cache_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    info!("Clearing stats cache");

    match state.service.clear_all().await {
        Ok(report) => (
            StatusCode::OK,
            Json(ClearCacheResponse {
                message: "Cache successfully truncated.".to_string(),
                records_removed: report.records_removed,
                statistics_loaded: report.statistics_loaded,
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to clear stats cache");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Failed to truncate cache.".to_string(),
                }),
            )
                .into_response()
        }
    }
}
