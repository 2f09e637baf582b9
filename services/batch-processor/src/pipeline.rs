//! Batch pipeline.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};

use stats_engine::StatsService;

use crate::error::BatchResult;
use crate::output::StatsCsvWriter;
use crate::report::{BatchFailure, BatchReport};

/// Batch sizing.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Identifiers per batch.
    pub batch_size: usize,
    /// Computations in flight within a batch.
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            concurrency: 1,
        }
    }
}

/// Computes cells in batches and streams results to a CSV writer.
pub struct BatchProcessor {
    service: Arc<StatsService>,
    options: BatchOptions,
}

impl BatchProcessor {
    pub fn new(service: Arc<StatsService>, options: BatchOptions) -> Self {
        Self { service, options }
    }

    /// Process every identifier in input order.
    ///
    /// A cell that fails is logged and recorded in the report; only output
    /// I/O errors stop the run.
    pub async fn run<W: Write>(
        &self,
        identifiers: &[String],
        writer: &mut StatsCsvWriter<W>,
    ) -> BatchResult<BatchReport> {
        self.run_from(identifiers.iter().cloned().map(Ok), writer).await
    }

    /// Process identifiers pulled from `identifiers` one batch at a time.
    ///
    /// Only the current batch is held in memory. An input error stops the
    /// run after the batches before it have been written.
    pub async fn run_from<I, W>(
        &self,
        identifiers: I,
        writer: &mut StatsCsvWriter<W>,
    ) -> BatchResult<BatchReport>
    where
        I: IntoIterator<Item = BatchResult<String>>,
        W: Write,
    {
        let started = Instant::now();
        let batch_size = self.options.batch_size.max(1);
        let concurrency = self.options.concurrency.max(1);
        let mut identifiers = identifiers.into_iter();
        let mut report = BatchReport::default();

        for index in 0.. {
            let batch = identifiers
                .by_ref()
                .take(batch_size)
                .collect::<BatchResult<Vec<String>>>()?;
            if batch.is_empty() {
                break;
            }
            report.total += batch.len();
            let batch_started = Instant::now();

            let results: Vec<_> = stream::iter(batch.iter().cloned())
                .map(|geohash| {
                    let service = Arc::clone(&self.service);
                    async move {
                        debug!(cell = %geohash, "Processing geohash");
                        let result = service.compute_for_cell(&geohash).await;
                        (geohash, result)
                    }
                })
                .buffered(concurrency)
                .collect()
                .await;

            let mut succeeded = 0;
            for (geohash, result) in results {
                match result {
                    Ok(response) => {
                        writer.write_record(&response)?;
                        succeeded += 1;
                    }
                    Err(e) => {
                        error!(cell = %geohash, error = %e, "Error processing geohash");
                        report.failed.push(BatchFailure {
                            geohash,
                            error: e.to_string(),
                        });
                    }
                }
            }
            writer.flush()?;

            report.succeeded += succeeded;
            report.batches += 1;
            info!(
                batch = index + 1,
                size = batch.len(),
                succeeded,
                elapsed_ms = batch_started.elapsed().as_millis() as u64,
                "Batch processed"
            );
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }
}
