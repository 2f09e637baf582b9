//! Batch processor CLI.
//!
//! Computes statistics for every geohash listed in an input file and writes
//! them to a CSV, populating the shared stats cache along the way.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use batch_processor::{open_identifiers, BatchOptions, BatchProcessor, StatsCsvWriter};
use stats_engine::{build_service, StatsConfig};

#[derive(Parser, Debug)]
#[command(name = "batch-processor")]
#[command(about = "Compute geohash cell statistics for a list of cells")]
struct Args {
    /// Input file: CSV with a `geohash` column, or `.txt` with one geohash per line
    #[arg(short, long, default_value = "./data/input.csv", env = "GEOSTATS_BATCH_INPUT")]
    input: PathBuf,

    /// Output CSV file
    #[arg(short, long, default_value = "./data/output.csv", env = "GEOSTATS_BATCH_OUTPUT")]
    output: PathBuf,

    /// Geohashes per batch
    #[arg(short, long, default_value = "100", env = "GEOSTATS_BATCH_SIZE")]
    batch_size: usize,

    /// Computations in flight within a batch
    #[arg(short, long, default_value = "1", env = "GEOSTATS_BATCH_CONCURRENCY")]
    concurrency: usize,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .json()
        .init();

    info!(input = %args.input.display(), "Starting geohash processing");

    let identifiers = open_identifiers(&args.input)
        .with_context(|| format!("Failed to open input {}", args.input.display()))?;

    let config = StatsConfig::from_env()?;
    let service = build_service(&config)
        .await
        .context("Failed to initialize stats service")?;

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create output {}", args.output.display()))?;
    let mut writer = StatsCsvWriter::new(BufWriter::new(file));

    let processor = BatchProcessor::new(
        Arc::new(service),
        BatchOptions {
            batch_size: args.batch_size,
            concurrency: args.concurrency,
        },
    );
    let report = processor.run_from(identifiers, &mut writer).await?;
    writer.into_inner()?;

    info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed.len(),
        batches = report.batches,
        elapsed_ms = report.elapsed.as_millis() as u64,
        output = %args.output.display(),
        "Geohash processing completed"
    );
    println!("{}", report);

    Ok(())
}
