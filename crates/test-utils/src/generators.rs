//! Test data generators.
//!
//! These generators create predictable inputs that can be used across the
//! test suite.

/// Creates a regular grid of (lat, lng) points covering the valid
/// coordinate space, edges included.
///
/// # Arguments
///
/// * `rows` - Number of latitude steps (at least 2)
/// * `cols` - Number of longitude steps (at least 2)
///
/// # Example
///
/// ```
/// use test_utils::create_point_grid;
///
/// let points = create_point_grid(3, 3);
/// assert_eq!(points.len(), 9);
/// assert_eq!(points[0], (-90.0, -180.0));
/// assert_eq!(points[8], (90.0, 180.0));
/// ```
pub fn create_point_grid(rows: usize, cols: usize) -> Vec<(f64, f64)> {
    let rows = rows.max(2);
    let cols = cols.max(2);
    let mut points = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        let lat = -90.0 + 180.0 * r as f64 / (rows - 1) as f64;
        for c in 0..cols {
            let lng = -180.0 + 360.0 * c as f64 / (cols - 1) as f64;
            points.push((lat, lng));
        }
    }
    points
}

/// Creates a batch input CSV with a `geohash` column and an unrelated
/// leading column, the shape produced by upstream exports.
///
/// # Example
///
/// ```
/// use test_utils::create_geohash_csv;
///
/// let csv = create_geohash_csv(&["9q8yyk", "gcpvj0d"]);
/// assert_eq!(csv, "id,geohash\n1,9q8yyk\n2,gcpvj0d\n");
/// ```
pub fn create_geohash_csv(geohashes: &[&str]) -> String {
    let mut out = String::from("id,geohash\n");
    for (i, gh) in geohashes.iter().enumerate() {
        out.push_str(&format!("{},{}\n", i + 1, gh));
    }
    out
}
