//! Property-style tests for the geohash codec.

use geohash_codec::{decode, decode_bounds, encode, CellId, MAX_PRECISION};
use geostats_common::GeoStatsError;
use test_utils::{assert_coords_approx_eq, cells, create_point_grid, points};

// ============================================================================
// Cell identity round-trip
// ============================================================================

#[test]
fn test_center_lies_in_cell_and_reencodes_to_same_cell() {
    for (lat, lng) in create_point_grid(19, 37) {
        for precision in 1..=MAX_PRECISION {
            let hash = encode(lat, lng, precision).unwrap();
            let bbox = decode_bounds(&hash).unwrap();
            let center = decode(&hash).unwrap();

            assert!(bbox.contains(&center), "{hash}: center outside its cell");
            assert_eq!(
                encode(center.lat, center.lng, precision).unwrap(),
                hash,
                "center of {hash} re-encodes to a different cell"
            );
        }
    }
}

#[test]
fn test_original_point_lies_in_cell() {
    let samples = [
        points::SAN_FRANCISCO,
        points::LONDON,
        points::SYDNEY,
        points::ORIGIN,
        points::NORTH_EAST_CORNER,
        points::SOUTH_WEST_CORNER,
    ];
    for (lat, lng) in samples {
        for precision in [1, 3, 6, 9, 12] {
            let hash = encode(lat, lng, precision).unwrap();
            let bbox = decode_bounds(&hash).unwrap();
            assert!(lng >= bbox.min_x && lng <= bbox.max_x, "{hash} lng");
            assert!(lat >= bbox.min_y && lat <= bbox.max_y, "{hash} lat");
        }
    }
}

#[test]
fn test_known_center() {
    let center = decode(cells::SAN_FRANCISCO_P6).unwrap();
    assert_coords_approx_eq!(
        (center.lat, center.lng),
        cells::SAN_FRANCISCO_P6_CENTER,
        1e-12
    );
}

// ============================================================================
// Determinism and hierarchy
// ============================================================================

#[test]
fn test_encode_is_deterministic() {
    let (lat, lng) = points::SAN_FRANCISCO;
    let first = encode(lat, lng, 6).unwrap();
    for _ in 0..100 {
        assert_eq!(encode(lat, lng, 6).unwrap(), first);
    }
    assert_eq!(first, cells::SAN_FRANCISCO_P6);
}

#[test]
fn test_shorter_precision_is_prefix() {
    for (lat, lng) in create_point_grid(11, 11) {
        let full = encode(lat, lng, MAX_PRECISION).unwrap();
        for precision in 1..MAX_PRECISION {
            let coarse = encode(lat, lng, precision).unwrap();
            assert!(full.starts_with(&coarse), "{coarse} is not a prefix of {full}");
        }
    }
}

#[test]
fn test_nearby_points_share_a_cell() {
    let (lat1, lng1) = points::SAN_FRANCISCO;
    let (lat2, lng2) = points::SAN_FRANCISCO_NEARBY;
    assert_eq!(encode(lat1, lng1, 6).unwrap(), encode(lat2, lng2, 6).unwrap());
}

#[test]
fn test_finer_cells_are_smaller() {
    let (lat, lng) = points::LONDON;
    let mut previous_area = f64::MAX;
    for precision in 1..=MAX_PRECISION {
        let bbox = decode_bounds(&encode(lat, lng, precision).unwrap()).unwrap();
        let area = bbox.width() * bbox.height();
        assert!(area < previous_area);
        previous_area = area;
    }
}

// ============================================================================
// Error cases
// ============================================================================

#[test]
fn test_malformed_identifiers_are_rejected() {
    for bad in cells::MALFORMED {
        assert!(
            matches!(decode(bad), Err(GeoStatsError::InvalidCellId { .. })),
            "{bad:?} should be rejected"
        );
        assert!(CellId::parse(bad).is_err());
    }
}

#[test]
fn test_cell_id_from_point_matches_encode() {
    let (lat, lng) = points::SYDNEY;
    let cell = CellId::from_point(lat, lng, 6).unwrap();
    assert_eq!(cell.as_str(), cells::SYDNEY_P6);
    assert_eq!(cell.center(), decode(cells::SYDNEY_P6).unwrap());
}
