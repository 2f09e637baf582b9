//! Common types and utilities shared across all geostats crates.

pub mod bbox;
pub mod error;
pub mod point;
pub mod stats;

pub use bbox::BoundingBox;
pub use error::{GeoStatsError, GeoStatsResult};
pub use point::GeoPoint;
pub use stats::{CellStats, StatValue, StatsMap};
