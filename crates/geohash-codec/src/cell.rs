//! Validated geohash identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use geostats_common::{BoundingBox, GeoPoint, GeoStatsError, GeoStatsResult};

use crate::codec;

/// A well-formed geohash. Construction validates; the inner string is
/// always 1..=12 characters of the geohash alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellId(String);

impl CellId {
    /// Parse and validate an identifier.
    pub fn parse(s: impl Into<String>) -> GeoStatsResult<Self> {
        let s = s.into();
        codec::validate(&s)?;
        Ok(Self(s))
    }

    /// Cell containing a point at the given precision.
    pub fn from_point(lat: f64, lng: f64, precision: usize) -> GeoStatsResult<Self> {
        codec::encode(lat, lng, precision).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters, i.e. the precision the cell was encoded at.
    pub fn precision(&self) -> usize {
        self.0.len()
    }

    /// Center point of the cell.
    pub fn center(&self) -> GeoPoint {
        self.bounds().center()
    }

    /// Bounds of the cell.
    pub fn bounds(&self) -> BoundingBox {
        codec::bounds_of(&self.0)
    }

    /// The enclosing cell one level coarser, or `None` at precision 1.
    pub fn parent(&self) -> Option<CellId> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_string()))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CellId {
    type Err = GeoStatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CellId {
    type Error = GeoStatsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CellId> for String {
    fn from(cell: CellId) -> Self {
        cell.0
    }
}

impl AsRef<str> for CellId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let cell: CellId = "9q8yyk".parse().unwrap();
        assert_eq!(cell.to_string(), "9q8yyk");
        assert_eq!(cell.precision(), 6);
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(CellId::parse("").is_err());
        assert!(CellId::parse("hello").is_err()); // 'l' and 'o' are excluded
    }

    #[test]
    fn test_parent_chain() {
        let cell = CellId::parse("9q8").unwrap();
        let parent = cell.parent().unwrap();
        assert_eq!(parent.as_str(), "9q");
        assert_eq!(parent.parent().unwrap().as_str(), "9");
        assert!(parent.parent().unwrap().parent().is_none());
    }

    #[test]
    fn test_serde_validates() {
        let cell: CellId = serde_json::from_str("\"9q8yyk\"").unwrap();
        assert_eq!(cell.as_str(), "9q8yyk");
        assert!(serde_json::from_str::<CellId>("\"9q8yya\"").is_err());
    }
}
