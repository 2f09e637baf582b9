//! Router construction.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Statistics
        .route("/stats", get(handlers::stats::stats_for_point_handler))
        .route("/stats/cache", delete(handlers::cache::clear_cache_handler))
        .route("/stats/registry", get(handlers::registry::registry_handler))
        .route(
            "/stats/registry/reload",
            post(handlers::registry::reload_registry_handler),
        )
        .route("/stats/:geohash", get(handlers::stats::stats_for_cell_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
