//! Common test fixtures for geostats tests.
//!
//! Cells below were checked against an independent geohash implementation.

/// Well-known points.
pub mod points {
    /// San Francisco city hall area.
    pub const SAN_FRANCISCO: (f64, f64) = (37.7749, -122.4194);

    /// A point a few hundred meters from `SAN_FRANCISCO`, inside the same
    /// precision-6 cell.
    pub const SAN_FRANCISCO_NEARBY: (f64, f64) = (37.7745, -122.4180);

    /// Central London.
    pub const LONDON: (f64, f64) = (51.5074, -0.1278);

    /// Sydney.
    pub const SYDNEY: (f64, f64) = (-33.8688, 151.2093);

    /// Null island.
    pub const ORIGIN: (f64, f64) = (0.0, 0.0);

    /// Extreme corners of the valid coordinate space.
    pub const NORTH_EAST_CORNER: (f64, f64) = (90.0, 180.0);
    pub const SOUTH_WEST_CORNER: (f64, f64) = (-90.0, -180.0);
}

/// Well-known geohash cells.
pub mod cells {
    /// `SAN_FRANCISCO` at precision 6.
    pub const SAN_FRANCISCO_P6: &str = "9q8yyk";

    /// `SAN_FRANCISCO` at precision 12.
    pub const SAN_FRANCISCO_P12: &str = "9q8yyk8ytpxr";

    /// Center of `SAN_FRANCISCO_P6` as (lat, lng).
    pub const SAN_FRANCISCO_P6_CENTER: (f64, f64) = (37.77374267578125, -122.4151611328125);

    /// `LONDON` at precision 7.
    pub const LONDON_P7: &str = "gcpvj0d";

    /// `SYDNEY` at precision 6.
    pub const SYDNEY_P6: &str = "r3gx2f";

    /// Identifiers that must be rejected.
    pub const MALFORMED: [&str; 5] = ["", "9q8a", "9Q8YYK", "hello", "9q8yyk8ytpxr0"];
}

/// Statistic definition documents.
pub mod sql {
    /// A count query with a leading comment block.
    pub const SCHOOL_COUNT: &str = "-- Number of schools within 500m\n\
        SELECT count(*)\n\
        FROM schools\n\
        WHERE ST_DWithin(geom::geography, ST_MakePoint(:lng, :lat)::geography, 500);\n";

    /// An average that may return NULL when nothing is nearby.
    pub const AVG_INCOME: &str = "SELECT avg(median_income)  -- census tracts\n\
        FROM tracts\n\
        WHERE ST_Contains(geom, ST_SetSRID(ST_MakePoint(:lng, :lat), 4326))";

    /// A document with nothing but comments.
    pub const ONLY_COMMENTS: &str = "-- TODO write this query\n-- later\n";
}
