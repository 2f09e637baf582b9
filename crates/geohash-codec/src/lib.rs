//! Geohash codec.
//!
//! Maps a WGS84 point to the base-32 identifier of the grid cell containing
//! it, and a cell identifier back to the cell's bounds and center.
//! Implemented from scratch; no external dependencies.
//!
//! Each character carries 5 bits, interleaving longitude and latitude
//! bisections starting with longitude. A shorter identifier is always a
//! prefix of a longer one for the same point.

pub mod cell;
pub mod codec;

pub use cell::CellId;
pub use codec::{
    decode, decode_bounds, encode, validate, validate_precision, BASE32, DEFAULT_PRECISION,
    MAX_PRECISION,
};
