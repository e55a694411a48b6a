//! Integration tests for column renaming, label validation, and date
//! parsing

use polars::prelude::*;
use velostat::error::VelostatError;
use velostat::pipeline::{
    clean_dataset, FunctioningDay, Holiday, Season, DATE, FUNC_DAY, HOLIDAY, LABEL_COLUMNS,
    RENAMES, SEASON,
};

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_no_raw_header_survives() {
    let cleaned = clean_dataset(raw_frame(&synthetic_rows(6, 3))).unwrap();
    let names: Vec<String> = cleaned
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for (raw, short) in RENAMES {
        assert!(!names.iter().any(|n| n == raw));
        assert!(names.iter().any(|n| n == short));
    }
}

#[test]
fn test_label_columns_draw_only_from_fixed_levels() {
    let cleaned = clean_dataset(raw_frame(&synthetic_rows(12, 2))).unwrap();

    for (column, levels) in LABEL_COLUMNS {
        let ca = cleaned.column(column).unwrap().str().unwrap().clone();
        for value in ca.into_iter().flatten() {
            assert!(
                levels.contains(&value),
                "'{}' holds out-of-set value '{}'",
                column,
                value
            );
        }
    }
}

#[test]
fn test_level_sets_are_exactly_the_documented_ones() {
    assert_eq!(Season::LEVELS, ["Winter", "Spring", "Summer", "Autumn"]);
    assert_eq!(Holiday::LEVELS, ["No Holiday", "Holiday"]);
    assert_eq!(FunctioningDay::LEVELS, ["Yes", "No"]);
}

#[test]
fn test_out_of_set_holiday_value_rejected() {
    let mut df = raw_frame(&synthetic_rows(2, 2));
    df.replace(
        "Holiday",
        Series::new(
            "Holiday".into(),
            ["No Holiday", "Bank Holiday", "No Holiday", "No Holiday"],
        ),
    )
    .unwrap();

    let err = clean_dataset(df).unwrap_err();
    assert!(matches!(err, VelostatError::Parse { .. }));
    assert!(err.to_string().contains("Bank Holiday"));
}

#[test]
fn test_null_label_rejected() {
    let mut df = raw_frame(&synthetic_rows(2, 2));
    df.replace(
        "Functioning Day",
        Series::new(
            "Functioning Day".into(),
            [Some("Yes"), None, Some("Yes"), Some("Yes")],
        ),
    )
    .unwrap();

    let err = clean_dataset(df).unwrap_err();
    assert!(matches!(err, VelostatError::Parse { .. }));
}

#[test]
fn test_dates_parse_to_date_dtype() {
    let cleaned = clean_dataset(raw_frame(&synthetic_rows(3, 2))).unwrap();
    assert_eq!(cleaned.column(DATE).unwrap().dtype(), &DataType::Date);
}

#[test]
fn test_iso_date_text_rejected() {
    let mut df = raw_frame(&synthetic_rows(2, 2));
    df.replace(
        "Date",
        Series::new(
            "Date".into(),
            ["01/01/2018", "01/01/2018", "2018-01-02", "02/01/2018"],
        ),
    )
    .unwrap();

    let err = clean_dataset(df).unwrap_err();
    assert!(matches!(err, VelostatError::Parse { .. }));
}

#[test]
fn test_clean_via_loaded_csv_roundtrip() {
    let rows = synthetic_rows(8, 3);
    let (_temp_dir, csv_path) = write_windows1252_csv(&csv_text(&rows));

    let raw = velostat::pipeline::load_dataset(&csv_path, "windows-1252", 100).unwrap();
    let cleaned = clean_dataset(raw).unwrap();

    assert_eq!(cleaned.height(), 24);
    // Seasons and holidays as generated
    let seasons = cleaned.column(SEASON).unwrap().str().unwrap().clone();
    assert!(seasons.into_iter().flatten().all(|s| Season::LEVELS.contains(&s)));
    let holidays = cleaned.column(HOLIDAY).unwrap().str().unwrap().clone();
    assert!(holidays.into_iter().flatten().all(|h| Holiday::LEVELS.contains(&h)));
    let func = cleaned.column(FUNC_DAY).unwrap().str().unwrap().clone();
    assert!(func.into_iter().flatten().all(|f| f == "Yes"));
}
