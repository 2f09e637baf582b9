//! Geographic point type.

use serde::{Deserialize, Serialize};

use crate::error::{GeoStatsError, GeoStatsResult};

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a point, rejecting coordinates outside the valid ranges.
    ///
    /// NaN is never valid.
    pub fn checked(lat: f64, lng: f64) -> GeoStatsResult<Self> {
        let valid = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng);
        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(GeoStatsError::InvalidCoordinate { lat, lng })
        }
    }
}
