//! Cell statistics handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use tracing::instrument;

use geostats_common::{GeoStatsError, GeoStatsResult};
use stats_engine::{CellStatsResponse, StatsService};

use crate::error::ApiError;
use crate::state::AppState;

/// Raw query string for `GET /stats`.
///
/// Values are kept as text so that a missing and an unparseable coordinate
/// are reported the same way.
#[derive(Debug, Default, Deserialize)]
pub struct PointQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub precision: Option<String>,
}

impl PointQuery {
    /// Parse into `(lat, lng, precision)`.
    pub fn parse(&self) -> GeoStatsResult<(f64, f64, Option<usize>)> {
        let lat = parse_coordinate("lat", self.lat.as_deref())?;
        let lng = parse_coordinate("lng", self.lng.as_deref())?;

        let precision = match self.precision.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
                GeoStatsError::InvalidParameter {
                    name: "precision".to_string(),
                    value: raw.to_string(),
                }
            })?),
        };

        Ok((lat, lng, precision))
    }
}

fn parse_coordinate(name: &str, raw: Option<&str>) -> GeoStatsResult<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .ok_or_else(|| GeoStatsError::MissingParameter(name.to_string()))
}

/// GET /stats?lat=&lng=[&precision=] - Statistics for the cell containing a point
#[instrument(skip(state))]
pub async fn stats_for_point_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Result<Json<CellStatsResponse>, ApiError> {
    let (lat, lng, precision) = query.parse()?;
    let service = Arc::clone(&state.service);

    let response = run_detached(service, move |service| async move {
        service.compute_for_point(lat, lng, precision).await
    })
    .await?;

    Ok(Json(response))
}

/// GET /stats/:geohash - Statistics for a cell
#[instrument(skip(state))]
pub async fn stats_for_cell_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(geohash): Path<String>,
) -> Result<Json<CellStatsResponse>, ApiError> {
    let service = Arc::clone(&state.service);

    let response = run_detached(service, move |service| async move {
        service.compute_for_cell(&geohash).await
    })
    .await?;

    Ok(Json(response))
}

/// Run a computation on its own task so that a dropped request still
/// finishes and fills the cache.
async fn run_detached<F, Fut>(service: Arc<StatsService>, f: F) -> GeoStatsResult<CellStatsResponse>
where
    F: FnOnce(Arc<StatsService>) -> Fut,
    Fut: std::future::Future<Output = GeoStatsResult<CellStatsResponse>> + Send + 'static,
{
    tokio::spawn(f(service))
        .await
        .map_err(|e| GeoStatsError::Internal(format!("Computation task failed: {}", e)))?
}
