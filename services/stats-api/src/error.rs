//! Mapping of service errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use geostats_common::GeoStatsError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by handlers.
///
/// Client errors carry their message; server errors are logged and answered
/// with a generic message.
#[derive(Debug)]
pub struct ApiError(pub GeoStatsError);

impl From<GeoStatsError> for ApiError {
    fn from(err: GeoStatsError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            error!(error = %self.0, status = status.as_u16(), "Request failed");
            match status {
                StatusCode::SERVICE_UNAVAILABLE => "Stats store unavailable".to_string(),
                _ => "Internal server error".to_string(),
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
