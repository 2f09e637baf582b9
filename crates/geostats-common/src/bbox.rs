//! Bounding box of a geohash cell.

use serde::{Deserialize, Serialize};

use crate::point::GeoPoint;

/// A geographic bounding box in degrees.
///
/// `min_x`/`max_x` are longitudes, `min_y`/`max_y` are latitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The whole globe.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Geometric center of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_y + self.max_y) / 2.0,
            (self.min_x + self.max_x) / 2.0,
        )
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lng >= self.min_x
            && point.lng <= self.max_x
            && point.lat >= self.min_y
            && point.lat <= self.max_y
    }
}
