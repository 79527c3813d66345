//! Error handling integration tests

use crate::config::{ProcessorConfig, ResampleConfig};
use crate::error::LapDataError;
use crate::processor::LapDataProcessor;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn full_lap_content() -> String {
    (0..100)
        .map(|i| format!("{};{}\n", i as f64 / 100.0, i))
        .collect()
}

fn create_base(temp_dir: &TempDir) -> PathBuf {
    let base_path = temp_dir.path().join("laps_data");
    fs::create_dir_all(base_path.join("raw")).unwrap();
    base_path
}

fn write_raw(base_path: &Path, name: &str, content: &str) {
    fs::write(base_path.join("raw").join(name), content).unwrap();
}

#[tokio::test]
async fn test_missing_raw_directory() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = temp_dir.path().join("laps_data");
    fs::create_dir_all(&base_path).unwrap();

    let processor =
        LapDataProcessor::new(ProcessorConfig::default().with_base_path(&base_path)).unwrap();
    let result = processor.process(CancellationToken::new()).await;

    match result.unwrap_err() {
        LapDataError::DirectoryNotFound { path } => {
            assert_eq!(path, base_path.join("raw"));
        }
        other => panic!("Expected DirectoryNotFound error, got {:?}", other),
    }
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let config = ProcessorConfig::default()
        .with_resample(ResampleConfig::default().with_pos_delta(0.0));

    match LapDataProcessor::new(config).unwrap_err() {
        LapDataError::Configuration { message } => assert!(message.contains("pos_delta")),
        other => panic!("Expected Configuration error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bad_files_do_not_abort_batch() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = create_base(&temp_dir);

    // Ends just past the line
    write_raw(&base_path, "Brands_Hatch_GT3.txt", "0.2;0\n0.6;40\n0.99;79\n0.05;85\n");
    // Unparseable row
    write_raw(&base_path, "Imola_GT3.txt", "0;0\nabc;def\n");
    // Time stalls
    write_raw(&base_path, "Misano_GT3.txt", "0;0\n0.5;10\n0.6;10\n");
    write_raw(&base_path, "Monza_GT3.txt", &full_lap_content());
    // Starts before the line on a track without an offset
    write_raw(&base_path, "Zolder_GT3.txt", "0.95;0\n0;5\n0.5;55\n");

    let processor =
        LapDataProcessor::new(ProcessorConfig::default().with_base_path(&base_path)).unwrap();
    let stats = processor.process(CancellationToken::new()).await.unwrap();

    assert_eq!(stats.files_discovered, 5);
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_failed, 4);
    assert_eq!(stats.total_rows, 201);

    let failed_names: Vec<String> = stats
        .failures
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        failed_names,
        vec![
            "Brands_Hatch_GT3.txt",
            "Imola_GT3.txt",
            "Misano_GT3.txt",
            "Zolder_GT3.txt"
        ]
    );

    assert!(stats.failures[0].message.contains("ends at pos 0.05000"));
    assert!(stats.failures[1].message.contains("Malformed input"));
    assert!(stats.failures[2].message.contains("diff(time)"));
    assert!(stats.failures[3].message.contains("starts at pos 0.95"));

    // Only the good file produced output
    assert!(base_path.join("Monza_GT3.txt").exists());
    for name in failed_names {
        assert!(!base_path.join(name).exists());
    }
}

#[tokio::test]
async fn test_process_file_reports_error_kind() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = create_base(&temp_dir);
    write_raw(&base_path, "Zolder_GT3.txt", "0.95;0\n0;5\n0.5;55\n");

    let processor =
        LapDataProcessor::new(ProcessorConfig::default().with_base_path(&base_path)).unwrap();
    let err = processor
        .process_file(&base_path.join("raw").join("Zolder_GT3.txt"))
        .await
        .unwrap_err();

    assert!(matches!(err, LapDataError::UnsupportedTrack { .. }));
    assert!(err.is_per_file());
}

#[tokio::test]
async fn test_track_name_in_base_path_does_not_select_offset() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = temp_dir.path().join("Spaghetti").join("laps_data");
    fs::create_dir_all(base_path.join("raw")).unwrap();
    write_raw(&base_path, "Zolder_GT3.txt", "0.95;0\n0;5\n0.5;55\n");

    let processor =
        LapDataProcessor::new(ProcessorConfig::default().with_base_path(&base_path)).unwrap();
    let stats = processor.process(CancellationToken::new()).await.unwrap();

    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.files_failed, 1);
    assert!(stats.failures[0].message.contains("Unsupported track"));
    assert!(!base_path.join("Zolder_GT3.txt").exists());
}

#[tokio::test]
async fn test_cancelled_batch_is_interrupted() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = create_base(&temp_dir);
    write_raw(&base_path, "Monza_GT3.txt", &full_lap_content());

    let processor =
        LapDataProcessor::new(ProcessorConfig::default().with_base_path(&base_path)).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let result = processor.process(token).await;
    assert!(matches!(
        result,
        Err(LapDataError::ProcessingInterrupted { .. })
    ));
    // The pending file is dropped, not finished
    assert!(!base_path.join("Monza_GT3.txt").exists());
}

#[tokio::test]
async fn test_empty_file_is_integrity_failure() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = create_base(&temp_dir);
    write_raw(&base_path, "Monza_GT3.txt", "");

    let processor =
        LapDataProcessor::new(ProcessorConfig::default().with_base_path(&base_path)).unwrap();
    let stats = processor.process(CancellationToken::new()).await.unwrap();

    assert_eq!(stats.files_failed, 1);
    assert!(stats.failures[0].message.contains("no samples"));
}
