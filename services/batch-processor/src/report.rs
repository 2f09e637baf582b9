//! Batch run summary.

use std::fmt;
use std::time::Duration;

/// A cell that could not be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub geohash: String,
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<BatchFailure>,
    pub batches: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }

    pub fn cells_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.total as f64 / secs
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch run summary")?;
        writeln!(f, "  Cells:      {}", self.total)?;
        writeln!(f, "  Succeeded:  {} ({:.1}%)", self.succeeded, self.success_rate())?;
        writeln!(f, "  Failed:     {}", self.failed.len())?;
        writeln!(f, "  Batches:    {}", self.batches)?;
        write!(
            f,
            "  Elapsed:    {:.1}s ({:.1} cells/s)",
            self.elapsed.as_secs_f64(),
            self.cells_per_second()
        )?;
        for failure in &self.failed {
            write!(f, "\n  ! {}: {}", failure.geohash, failure.error)?;
        }
        Ok(())
    }
}
