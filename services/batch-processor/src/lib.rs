//! Batch computation of cell statistics.
//!
//! Reads geohash identifiers from a CSV (`geohash` column) or text file,
//! computes each through the stats service in fixed-size batches and writes
//! one CSV row per successful cell.

pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod report;

pub use error::{BatchError, BatchResult};
pub use input::{
    open_identifiers, parse_csv_identifiers, parse_text_identifiers, read_identifiers,
    IdentifierReader,
};
pub use output::StatsCsvWriter;
pub use pipeline::{BatchOptions, BatchProcessor};
pub use report::{BatchFailure, BatchReport};
