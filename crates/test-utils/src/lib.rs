//! Shared test utilities for the geostats workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Known geohash cells and points
//! - Temporary statistic definition directories
//! - Point and batch input generators
//! - Float assertion macros
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, write_stats_dir, assert_approx_eq};
//! ```

pub mod fixtures;
pub mod generators;
pub mod stats_dir;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use stats_dir::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of (lat, lng) pairs.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_coords_approx_eq;
///
/// assert_coords_approx_eq!((37.7737, -122.4152), (37.77374, -122.41516), 0.001);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (lat1, lng1): (f64, f64) = $left;
        let (lat2, lng2): (f64, f64) = $right;
        $crate::assert_approx_eq!(lat1, lat2, $epsilon);
        $crate::assert_approx_eq!(lng1, lng2, $epsilon);
    }};
}
