//! Statistic values and cached cell records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::point::GeoPoint;

/// Mapping from statistic name to value. Ordered by name.
pub type StatsMap = BTreeMap<String, StatValue>;

/// A single statistic result.
///
/// Integer results (counts) stay integers through JSON and CSV output;
/// everything else is a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(i64),
    Float(f64),
}

impl StatValue {
    /// The value used when the spatial source has nothing for a point.
    pub const ZERO: StatValue = StatValue::Integer(0);

    pub fn as_f64(&self) -> f64 {
        match self {
            StatValue::Integer(v) => *v as f64,
            StatValue::Float(v) => *v,
        }
    }

    /// False for NaN and infinities, which JSON cannot carry.
    pub fn is_finite(&self) -> bool {
        match self {
            StatValue::Integer(_) => true,
            StatValue::Float(v) => v.is_finite(),
        }
    }
}

impl Default for StatValue {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Integer(v)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Float(v)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Integer(v) => write!(f, "{}", v),
            StatValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// A cached result record for one geohash cell.
///
/// Records are written whole and never merged with a previous version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellStats {
    pub geohash: String,
    pub center: GeoPoint,
    pub stats: StatsMap,
}

impl CellStats {
    pub fn new(geohash: impl Into<String>, center: GeoPoint, stats: StatsMap) -> Self {
        Self {
            geohash: geohash.into(),
            center,
            stats,
        }
    }
}
