//! Integration tests for the encoded CSV loader

use velostat::error::VelostatError;
use velostat::pipeline::{clean_dataset, load_dataset, load_dataset_with_stats};

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_loads_windows1252_header() {
    let rows = synthetic_rows(4, 3);
    let (_temp_dir, csv_path) = write_windows1252_csv(&csv_text(&rows));

    let df = load_dataset(&csv_path, "windows-1252", 100).unwrap();

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    // The degree symbol survives the decode intact
    assert!(names.iter().any(|n| n == "Temperature(°C)"));
    assert!(names.iter().any(|n| n == "Dew point temperature(°C)"));
    assert_eq!(df.height(), 12);
}

#[test]
fn test_missing_file_is_read_error() {
    let err = load_dataset(
        std::path::Path::new("definitely/not/here.csv"),
        "windows-1252",
        100,
    )
    .unwrap_err();

    assert!(matches!(err, VelostatError::Read { .. }));
}

#[test]
fn test_unknown_encoding_label_is_read_error() {
    let rows = synthetic_rows(2, 2);
    let (_temp_dir, csv_path) = write_windows1252_csv(&csv_text(&rows));

    let err = load_dataset(&csv_path, "klingon-9", 100).unwrap_err();
    assert!(matches!(err, VelostatError::Read { .. }));
    assert!(err.to_string().contains("klingon-9"));
}

#[test]
fn test_wrong_encoding_garbles_header() {
    // Write the file as UTF-8: the degree symbol becomes two bytes that
    // windows-1252 decodes into mojibake, so the expected raw header is
    // gone and cleaning fails on the schema.
    let rows = synthetic_rows(2, 2);
    let temp_dir = tempfile::TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("utf8.csv");
    std::fs::write(&csv_path, csv_text(&rows)).unwrap();

    let df = load_dataset(&csv_path, "windows-1252", 100).unwrap();
    let err = clean_dataset(df).unwrap_err();
    assert!(matches!(err, VelostatError::Schema(_)));
}

#[test]
fn test_stats_report_shape() {
    let rows = synthetic_rows(5, 4);
    let (_temp_dir, csv_path) = write_windows1252_csv(&csv_text(&rows));

    let (df, n_rows, n_cols, memory_mb) =
        load_dataset_with_stats(&csv_path, "windows-1252", 100).unwrap();

    assert_eq!((n_rows, n_cols), df.shape());
    assert_eq!(n_rows, 20);
    assert_eq!(n_cols, 14);
    assert!(memory_mb > 0.0);
}

#[test]
fn test_full_schema_inference_scan() {
    let rows = synthetic_rows(3, 2);
    let (_temp_dir, csv_path) = write_windows1252_csv(&csv_text(&rows));

    // 0 means a full table scan
    let df = load_dataset(&csv_path, "windows-1252", 0).unwrap();
    assert_eq!(df.height(), 6);
}
