//! Encoding and decoding of geohash cell identifiers.

use geostats_common::{BoundingBox, GeoPoint, GeoStatsError, GeoStatsResult};

/// Geohash base-32 alphabet (no `a`, `i`, `l`, `o`).
pub const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Precision used when the caller does not ask for one.
pub const DEFAULT_PRECISION: usize = 6;

/// Longest identifier we produce or accept (~3.7cm x 1.9cm cells).
pub const MAX_PRECISION: usize = 12;

const BITS_PER_CHAR: u32 = 5;

/// Reverse lookup from ASCII byte to 5-bit value; -1 for bytes outside the alphabet.
const DECODE_TABLE: [i8; 128] = build_decode_table();

const fn build_decode_table() -> [i8; 128] {
    let mut table = [-1i8; 128];
    let mut i = 0;
    while i < BASE32.len() {
        table[BASE32[i] as usize] = i as i8;
        i += 1;
    }
    table
}

/// Encode a point into a geohash of `precision` characters.
///
/// # Errors
/// * `InvalidCoordinate` if `lat` is outside [-90, 90] or `lng` outside [-180, 180]
/// * `InvalidPrecision` if `precision` is 0 or above [`MAX_PRECISION`]
pub fn encode(lat: f64, lng: f64, precision: usize) -> GeoStatsResult<String> {
    let point = GeoPoint::checked(lat, lng)?;
    validate_precision(precision)?;

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lng_range = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut even_bit = true;

    while hash.len() < precision {
        let mut idx = 0usize;
        for _ in 0..BITS_PER_CHAR {
            let (range, value) = if even_bit {
                (&mut lng_range, point.lng)
            } else {
                (&mut lat_range, point.lat)
            };
            let mid = (range.0 + range.1) / 2.0;
            idx <<= 1;
            if value >= mid {
                idx |= 1;
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even_bit = !even_bit;
        }
        hash.push(BASE32[idx] as char);
    }

    Ok(hash)
}

/// Decode a geohash into the center point of its cell.
///
/// Only the cell is recoverable, not the point that was encoded.
pub fn decode(geohash: &str) -> GeoStatsResult<GeoPoint> {
    decode_bounds(geohash).map(|bbox| bbox.center())
}

/// Decode a geohash into the bounds of its cell.
pub fn decode_bounds(geohash: &str) -> GeoStatsResult<BoundingBox> {
    validate(geohash)?;
    Ok(bounds_of(geohash))
}

/// Bounds of an identifier that has already been validated.
pub(crate) fn bounds_of(geohash: &str) -> BoundingBox {
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lng_range = (-180.0_f64, 180.0_f64);
    let mut even_bit = true;

    for byte in geohash.bytes() {
        let value = DECODE_TABLE[byte as usize] as u8;
        for shift in (0..BITS_PER_CHAR).rev() {
            let bit = (value >> shift) & 1;
            let range = if even_bit {
                &mut lng_range
            } else {
                &mut lat_range
            };
            let mid = (range.0 + range.1) / 2.0;
            if bit == 1 {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even_bit = !even_bit;
        }
    }

    BoundingBox::new(lng_range.0, lat_range.0, lng_range.1, lat_range.1)
}

/// Check that `geohash` is a well-formed identifier.
pub fn validate(geohash: &str) -> GeoStatsResult<()> {
    if geohash.is_empty() {
        return Err(GeoStatsError::invalid_cell(geohash, "identifier is empty"));
    }
    if geohash.len() > MAX_PRECISION {
        return Err(GeoStatsError::invalid_cell(
            geohash,
            format!("longer than {} characters", MAX_PRECISION),
        ));
    }
    if let Some(c) = geohash.chars().find(|c| !is_base32(*c)) {
        return Err(GeoStatsError::invalid_cell(
            geohash,
            format!("character '{}' is not in the geohash alphabet", c),
        ));
    }
    Ok(())
}

/// Check that `precision` is within 1..=MAX_PRECISION.
pub fn validate_precision(precision: usize) -> GeoStatsResult<()> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(GeoStatsError::InvalidPrecision(precision));
    }
    Ok(())
}

fn is_base32(c: char) -> bool {
    c.is_ascii() && DECODE_TABLE[c as usize] >= 0
}
