//! End-to-end tests for the batch pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use batch_processor::{
    open_identifiers, read_identifiers, BatchError, BatchOptions, BatchProcessor, BatchResult,
    StatsCsvWriter,
};
use geostats_common::{GeoPoint, GeoStatsError, GeoStatsResult, StatValue};
use stats_engine::{RegistryHandle, ServiceOptions, StaticSource, StatsService};
use storage::{MemoryStatsStore, SpatialSource, StatsStore};
use test_utils::{cells, create_geohash_csv};

/// Fails for points in the southern hemisphere, otherwise returns the
/// rounded latitude. Later cells answer faster so that out-of-order
/// completion would show up in the output.
#[derive(Default)]
struct HemisphereSource {
    calls: AtomicUsize,
}

#[async_trait]
impl SpatialSource for HemisphereSource {
    async fn query_scalar(&self, _template: &str, point: GeoPoint) -> GeoStatsResult<Option<StatValue>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
        tokio::time::sleep(Duration::from_millis(20u64.saturating_sub(n * 2))).await;
        if point.lat < 0.0 {
            return Err(GeoStatsError::Internal("no coverage south of the equator".into()));
        }
        Ok(Some(StatValue::Integer(point.lat.round() as i64)))
    }
}

fn service(store: Arc<MemoryStatsStore>) -> Arc<StatsService> {
    let registry = Arc::new(RegistryHandle::new(Arc::new(StaticSource::new([(
        "rounded_lat",
        "SELECT round(:lat)",
    )]))));
    Arc::new(StatsService::new(
        store,
        Arc::new(HemisphereSource::default()),
        registry,
        ServiceOptions::default(),
    ))
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

async fn run(identifiers: &[String], options: BatchOptions) -> (String, batch_processor::BatchReport) {
    let processor = BatchProcessor::new(service(Arc::new(MemoryStatsStore::new())), options);
    let mut writer = StatsCsvWriter::new(Vec::new());
    let report = processor.run(identifiers, &mut writer).await.unwrap();
    let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    (csv, report)
}

#[tokio::test]
async fn test_one_failure_in_two_yields_one_row() {
    let (csv, report) = run(&ids(&[cells::SAN_FRANCISCO_P6, "9q8a"]), BatchOptions::default()).await;

    assert_eq!(csv, "geohash,rounded_lat\n9q8yyk,38\n");
    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].geohash, "9q8a");
    assert!(report.failed[0].error.contains("Invalid geohash"));
}

#[tokio::test]
async fn test_failed_computation_is_recorded_and_run_continues() {
    let (csv, report) = run(
        &ids(&[cells::SYDNEY_P6, cells::SAN_FRANCISCO_P6, cells::LONDON_P7]),
        BatchOptions::default(),
    )
    .await;

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines, vec!["geohash,rounded_lat", "9q8yyk,38", "gcpvj0d,52"]);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed[0].geohash, cells::SYDNEY_P6);
    assert!(report.failed[0].error.contains("rounded_lat"));
}

#[tokio::test]
async fn test_batches_and_order_with_concurrency() {
    let input: Vec<String> = ["9q8yyk", "gcpvj0d", "u4pruydqqvj", "ezs42", "9q8yy"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let (csv, report) = run(
        &input,
        BatchOptions {
            batch_size: 2,
            concurrency: 4,
        },
    )
    .await;

    assert_eq!(report.batches, 3);
    assert_eq!(report.succeeded, 5);
    let written: Vec<&str> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap())
        .collect();
    assert_eq!(written, input.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_results_populate_the_cache() {
    let store = Arc::new(MemoryStatsStore::new());
    let processor = BatchProcessor::new(service(store.clone()), BatchOptions::default());
    let mut writer = StatsCsvWriter::new(Vec::new());

    processor
        .run(&ids(&[cells::SAN_FRANCISCO_P6, cells::LONDON_P7]), &mut writer)
        .await
        .unwrap();

    assert_eq!(store.count().await.unwrap(), 2);
    assert!(store.get(cells::LONDON_P7).await.unwrap().is_some());
}

#[tokio::test]
async fn test_empty_input_writes_nothing() {
    let (csv, report) = run(&[], BatchOptions::default()).await;
    assert_eq!(csv, "");
    assert_eq!(report.total, 0);
    assert_eq!(report.batches, 0);
}

#[tokio::test]
async fn test_run_from_reads_input_file_in_batches() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.csv");
    std::fs::write(
        &path,
        create_geohash_csv(&[cells::SAN_FRANCISCO_P6, cells::SYDNEY_P6, cells::LONDON_P7]),
    )
    .unwrap();

    let processor = BatchProcessor::new(
        service(Arc::new(MemoryStatsStore::new())),
        BatchOptions {
            batch_size: 2,
            concurrency: 1,
        },
    );
    let mut writer = StatsCsvWriter::new(Vec::new());
    let report = processor
        .run_from(open_identifiers(&path).unwrap(), &mut writer)
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.batches, 2);
    assert_eq!(report.succeeded, 2);
    let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    assert_eq!(csv, "geohash,rounded_lat\n9q8yyk,38\ngcpvj0d,52\n");
}

#[tokio::test]
async fn test_input_error_stops_after_completed_batches() {
    let identifiers: Vec<BatchResult<String>> = vec![
        Ok(cells::SAN_FRANCISCO_P6.to_string()),
        Ok(cells::LONDON_P7.to_string()),
        Err(BatchError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "stream did not contain valid UTF-8",
        ))),
        Ok("ezs42".to_string()),
    ];
    let processor = BatchProcessor::new(
        service(Arc::new(MemoryStatsStore::new())),
        BatchOptions {
            batch_size: 2,
            concurrency: 1,
        },
    );
    let mut writer = StatsCsvWriter::new(Vec::new());

    let err = processor.run_from(identifiers, &mut writer).await.unwrap_err();
    assert!(matches!(err, BatchError::Io(_)));
    assert_eq!(writer.rows(), 2);
}

#[test]
fn test_read_identifiers_from_files() {
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("input.csv");
    std::fs::write(&csv_path, create_geohash_csv(&["9q8yyk", "gcpvj0d"])).unwrap();
    assert_eq!(read_identifiers(&csv_path).unwrap(), vec!["9q8yyk", "gcpvj0d"]);

    let txt_path = dir.path().join("cells.txt");
    std::fs::write(&txt_path, "r3gx2f\n\n9q8yyk\n").unwrap();
    assert_eq!(read_identifiers(&txt_path).unwrap(), vec!["r3gx2f", "9q8yyk"]);

    let bad_path = dir.path().join("bad.csv");
    std::fs::write(&bad_path, "id,cell\n1,9q8yyk\n").unwrap();
    assert!(matches!(
        read_identifiers(&bad_path),
        Err(BatchError::MissingGeohashColumn)
    ));

    assert!(matches!(
        read_identifiers(&dir.path().join("missing.csv")),
        Err(BatchError::Io(_))
    ));
}
