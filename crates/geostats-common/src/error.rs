//! Error types for geostats services.

use thiserror::Error;

/// Result type alias using GeoStatsError.
pub type GeoStatsResult<T> = Result<T, GeoStatsError>;

/// Primary error type for geostats operations.
#[derive(Debug, Error)]
pub enum GeoStatsError {
    // === Request Errors ===
    #[error("Invalid coordinate: lat={lat}, lng={lng} (expected lat in [-90, 90], lng in [-180, 180])")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("Invalid geohash precision: {0} (expected 1..=12)")]
    InvalidPrecision(usize),

    #[error("Invalid geohash '{cell_id}': {reason}")]
    InvalidCellId { cell_id: String, reason: String },

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid value for parameter {name}: '{value}'")]
    InvalidParameter { name: String, value: String },

    // === Registry Errors ===
    #[error("Failed to load statistic definitions: {0}")]
    RegistryLoadFailure(String),

    // === Computation Errors ===
    #[error("Statistic '{statistic}' failed: {message}")]
    QueryExecutionFailure { statistic: String, message: String },

    // === Storage Errors ===
    #[error("Stats store unavailable: {0}")]
    StoreUnavailable(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GeoStatsError {
    /// Build an `InvalidCellId` error.
    pub fn invalid_cell(cell_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCellId {
            cell_id: cell_id.into(),
            reason: reason.into(),
        }
    }

    /// Build a `QueryExecutionFailure` for a named statistic.
    pub fn query_failed(statistic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryExecutionFailure {
            statistic: statistic.into(),
            message: message.into(),
        }
    }

    /// Whether the caller sent something we cannot work with.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GeoStatsError::InvalidCoordinate { .. }
                | GeoStatsError::InvalidPrecision(_)
                | GeoStatsError::InvalidCellId { .. }
                | GeoStatsError::MissingParameter(_)
                | GeoStatsError::InvalidParameter { .. }
        )
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            GeoStatsError::InvalidCoordinate { .. }
            | GeoStatsError::InvalidPrecision(_)
            | GeoStatsError::InvalidCellId { .. }
            | GeoStatsError::MissingParameter(_)
            | GeoStatsError::InvalidParameter { .. } => 400,

            GeoStatsError::StoreUnavailable(_) => 503,

            _ => 500,
        }
    }
}

impl From<std::io::Error> for GeoStatsError {
    fn from(err: std::io::Error) -> Self {
        GeoStatsError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for GeoStatsError {
    fn from(err: serde_json::Error) -> Self {
        GeoStatsError::Internal(format!("JSON error: {}", err))
    }
}
