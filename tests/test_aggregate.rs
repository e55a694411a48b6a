//! Integration tests for the hourly-to-daily aggregation

use polars::prelude::*;
use velostat::pipeline::{
    aggregate_daily, clean_dataset, functioning_rental_total, DATE, MEAN_TEMP, TOTAL_RENT_BIKE,
};

#[path = "common/mod.rs"]
mod common;

use common::*;

/// Two days, two hours each, hand-picked rental counts.
fn two_day_frame(func_flags: [&'static str; 4]) -> DataFrame {
    let mut rows = synthetic_rows(2, 2);
    rows[0].rent_bike = 10;
    rows[1].rent_bike = 20;
    rows[2].rent_bike = 5;
    rows[3].rent_bike = 15;
    for (row, flag) in rows.iter_mut().zip(func_flags) {
        row.func_day = flag;
    }
    raw_frame(&rows)
}

fn daily_totals(daily: &DataFrame) -> Vec<i64> {
    daily
        .column(TOTAL_RENT_BIKE)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}

#[test]
fn test_two_day_worked_example() {
    let cleaned = clean_dataset(two_day_frame(["Yes"; 4])).unwrap();
    let daily = aggregate_daily(&cleaned).unwrap();

    assert_eq!(daily.height(), 2);
    assert_eq!(daily_totals(&daily), vec![30, 20]);
}

#[test]
fn test_non_functioning_hour_excluded_from_date_total() {
    // Hour two of day one is not functioning; its 20 rentals must not
    // count, while the date itself stays present.
    let cleaned = clean_dataset(two_day_frame(["Yes", "No", "Yes", "Yes"])).unwrap();
    let daily = aggregate_daily(&cleaned).unwrap();

    assert_eq!(daily.height(), 2);
    assert_eq!(daily_totals(&daily), vec![10, 20]);
}

#[test]
fn test_fully_non_functioning_date_absent() {
    // Every hour of day one is down: no zero-row, the date disappears.
    let cleaned = clean_dataset(two_day_frame(["No", "No", "Yes", "Yes"])).unwrap();
    let daily = aggregate_daily(&cleaned).unwrap();

    assert_eq!(daily.height(), 1);
    assert_eq!(daily_totals(&daily), vec![20]);
}

#[test]
fn test_rental_totals_are_conserved() {
    let mut rows = synthetic_rows(30, 4);
    // Take a scatter of hours out of service
    for (i, row) in rows.iter_mut().enumerate() {
        if i % 11 == 0 {
            row.func_day = "No";
        }
    }
    let cleaned = clean_dataset(raw_frame(&rows)).unwrap();
    let daily = aggregate_daily(&cleaned).unwrap();

    let aggregated: i64 = daily_totals(&daily).iter().sum();
    let expected = functioning_rental_total(&cleaned).unwrap();
    assert_eq!(aggregated, expected);
}

#[test]
fn test_one_row_per_date_sorted() {
    let daily = synthetic_daily(15, 3);

    assert_eq!(daily.height(), 15);
    let dates: Vec<i32> = daily
        .column(DATE)
        .unwrap()
        .cast(&DataType::Int32)
        .unwrap()
        .i32()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    let mut sorted = dates.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(dates, sorted, "dates must be unique and ascending");
}

#[test]
fn test_means_cover_operating_hours_only() {
    // Day one: temps 0 and 10 but the second hour is down, so the daily
    // mean is 0, not 5.
    let mut rows = synthetic_rows(1, 2);
    rows[0].temp = 0.0;
    rows[1].temp = 10.0;
    rows[1].func_day = "No";

    let cleaned = clean_dataset(raw_frame(&rows)).unwrap();
    let daily = aggregate_daily(&cleaned).unwrap();

    let mean_temp = daily
        .column(MEAN_TEMP)
        .unwrap()
        .f64()
        .unwrap()
        .get(0)
        .unwrap();
    assert!((mean_temp - 0.0).abs() < 1e-12);
}
