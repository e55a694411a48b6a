//! Shared test utilities and fixture generators

use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

use velostat::pipeline::{aggregate_daily, clean_dataset};

/// Raw CSV header of the hourly export, exactly as the loader sees it
/// after decoding.
pub const RAW_HEADER: &str = "Date,Rented Bike Count,Hour,Temperature(°C),Humidity(%),\
Wind speed (m/s),Visibility (10m),Dew point temperature(°C),Solar Radiation (MJ/m2),\
Rainfall(mm),Snowfall (cm),Seasons,Holiday,Functioning Day";

/// Deterministic pseudo-variation in [0, 1) without an RNG, so fixtures are
/// bit-identical across runs.
pub fn wobble(day: usize, hour: usize, k: usize) -> f64 {
    ((day * 31 + hour * 17 + k * 53) % 97) as f64 / 97.0
}

fn season_for_day(day: usize, days: usize) -> &'static str {
    // Contiguous season blocks so every season holds several dates
    let block = (days / 4).max(1);
    match (day / block).min(3) {
        0 => "Winter",
        1 => "Spring",
        2 => "Summer",
        _ => "Autumn",
    }
}

fn date_for_day(day: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap() + Duration::days(day as i64)
}

/// One synthetic hourly row of raw values.
pub struct RawRow {
    pub date: String,
    pub rent_bike: i64,
    pub hour: i64,
    pub temp: f64,
    pub humidity: f64,
    pub wind: f64,
    pub visibility: f64,
    pub dew_point: f64,
    pub solar_rad: f64,
    pub rain: f64,
    pub snow: f64,
    pub season: &'static str,
    pub holiday: &'static str,
    pub func_day: &'static str,
}

/// Generate deterministic synthetic hourly rows spanning all four seasons.
pub fn synthetic_rows(days: usize, hours_per_day: usize) -> Vec<RawRow> {
    let mut rows = Vec::with_capacity(days * hours_per_day);
    for day in 0..days {
        let date = date_for_day(day).format("%d/%m/%Y").to_string();
        let season = season_for_day(day, days);
        // Dense enough that every season block keeps holidays in any
        // train/fold subset, so interaction columns never collapse to zero
        let holiday = if day % 3 == 1 { "Holiday" } else { "No Holiday" };

        for hour in 0..hours_per_day {
            let temp = -5.0 + 0.05 * day as f64 + 0.4 * hour as f64 + 10.0 * wobble(day, hour, 1);
            let humidity = 50.0 + 25.0 * wobble(day, hour, 2);
            let rain = 2.0 * wobble(day, hour, 7);
            let rent = (120.0 + 12.0 * temp + 1.5 * humidity - 8.0 * rain
                + 25.0 * wobble(day, hour, 9))
            .max(0.0)
            .round() as i64;

            rows.push(RawRow {
                date: date.clone(),
                rent_bike: rent,
                hour: hour as i64,
                temp,
                humidity,
                wind: 1.5 + 3.0 * wobble(day, hour, 3),
                visibility: 1200.0 + 700.0 * wobble(day, hour, 4),
                dew_point: -8.0 + 0.04 * day as f64 + 9.0 * wobble(day, hour, 5),
                solar_rad: 0.3 + 2.4 * wobble(day, hour, 6),
                rain,
                snow: 1.2 * wobble(day, hour, 8),
                season,
                holiday,
                func_day: "Yes",
            });
        }
    }
    rows
}

/// Build a raw-header DataFrame from rows, matching what the loader
/// produces for a clean file.
pub fn raw_frame(rows: &[RawRow]) -> DataFrame {
    df! {
        "Date" => rows.iter().map(|r| r.date.clone()).collect::<Vec<_>>(),
        "Rented Bike Count" => rows.iter().map(|r| r.rent_bike).collect::<Vec<_>>(),
        "Hour" => rows.iter().map(|r| r.hour).collect::<Vec<_>>(),
        "Temperature(°C)" => rows.iter().map(|r| r.temp).collect::<Vec<_>>(),
        "Humidity(%)" => rows.iter().map(|r| r.humidity).collect::<Vec<_>>(),
        "Wind speed (m/s)" => rows.iter().map(|r| r.wind).collect::<Vec<_>>(),
        "Visibility (10m)" => rows.iter().map(|r| r.visibility).collect::<Vec<_>>(),
        "Dew point temperature(°C)" => rows.iter().map(|r| r.dew_point).collect::<Vec<_>>(),
        "Solar Radiation (MJ/m2)" => rows.iter().map(|r| r.solar_rad).collect::<Vec<_>>(),
        "Rainfall(mm)" => rows.iter().map(|r| r.rain).collect::<Vec<_>>(),
        "Snowfall (cm)" => rows.iter().map(|r| r.snow).collect::<Vec<_>>(),
        "Seasons" => rows.iter().map(|r| r.season).collect::<Vec<_>>(),
        "Holiday" => rows.iter().map(|r| r.holiday).collect::<Vec<_>>(),
        "Functioning Day" => rows.iter().map(|r| r.func_day).collect::<Vec<_>>(),
    }
    .unwrap()
}

/// Render rows as CSV text with the raw header.
pub fn csv_text(rows: &[RawRow]) -> String {
    let mut text = String::from(RAW_HEADER);
    text.push('\n');
    for r in rows {
        text.push_str(&format!(
            "{},{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{},{},{}\n",
            r.date,
            r.rent_bike,
            r.hour,
            r.temp,
            r.humidity,
            r.wind,
            r.visibility,
            r.dew_point,
            r.solar_rad,
            r.rain,
            r.snow,
            r.season,
            r.holiday,
            r.func_day
        ));
    }
    text
}

/// Write text to a temp CSV file encoded as windows-1252 (the header's
/// degree symbol becomes a single non-UTF-8 byte).
pub fn write_windows1252_csv(text: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("rentals.csv");

    let (encoded, _, had_errors) = encoding_rs::WINDOWS_1252.encode(text);
    assert!(!had_errors, "fixture text must be windows-1252 encodable");
    std::fs::write(&csv_path, encoded).unwrap();

    (temp_dir, csv_path)
}

/// Clean and aggregate a synthetic dataset in one step.
pub fn synthetic_daily(days: usize, hours_per_day: usize) -> DataFrame {
    let rows = synthetic_rows(days, hours_per_day);
    let cleaned = clean_dataset(raw_frame(&rows)).unwrap();
    aggregate_daily(&cleaned).unwrap()
}
