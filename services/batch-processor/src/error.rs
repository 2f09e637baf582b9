//! Batch processing errors.

use thiserror::Error;

pub type BatchResult<T> = Result<T, BatchError>;

/// Errors that stop a batch run.
///
/// Failures of individual cells are not errors; they are collected in the
/// report.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("The input CSV file must contain a 'geohash' column")]
    MissingGeohashColumn,

    #[error("Input file is empty")]
    EmptyInput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
