//! Column renaming, category validation, and date parsing
//!
//! The raw export carries verbose unit-laden headers and day-month-year date
//! text. Cleaning renames every column to a short stable identifier,
//! validates the three label columns against their fixed level sets, and
//! parses dates. Out-of-set label values are rejected rather than coerced to
//! a catch-all level.

use polars::prelude::*;

use crate::error::{Result, VelostatError};

/// Short stable column identifiers used by the rest of the pipeline.
pub const DATE: &str = "date";
pub const RENT_BIKE: &str = "rent_bike";
pub const HOUR: &str = "hour";
pub const TEMP: &str = "temp";
pub const HUMIDITY: &str = "humidity";
pub const WIND: &str = "wind";
pub const VISIBILITY: &str = "visibility";
pub const DEW_POINT: &str = "dew_point";
pub const SOLAR_RAD: &str = "solar_rad";
pub const RAIN: &str = "rain";
pub const SNOW: &str = "snow";
pub const SEASON: &str = "season";
pub const HOLIDAY: &str = "holiday";
pub const FUNC_DAY: &str = "func_day";

/// Raw header -> short identifier. The raw headers embed measurement units
/// (including a non-ASCII degree symbol) and survive only until this step.
pub const RENAMES: [(&str, &str); 14] = [
    ("Date", DATE),
    ("Rented Bike Count", RENT_BIKE),
    ("Hour", HOUR),
    ("Temperature(°C)", TEMP),
    ("Humidity(%)", HUMIDITY),
    ("Wind speed (m/s)", WIND),
    ("Visibility (10m)", VISIBILITY),
    ("Dew point temperature(°C)", DEW_POINT),
    ("Solar Radiation (MJ/m2)", SOLAR_RAD),
    ("Rainfall(mm)", RAIN),
    ("Snowfall (cm)", SNOW),
    ("Seasons", SEASON),
    ("Holiday", HOLIDAY),
    ("Functioning Day", FUNC_DAY),
];

/// Expected day-month-year date format of the raw export.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// The four seasons, in calendar order. The first level is the baseline for
/// drop-first indicator encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const LEVELS: [&'static str; 4] = ["Winter", "Spring", "Summer", "Autumn"];
}

/// Whether a calendar day is a public holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holiday {
    NoHoliday,
    Holiday,
}

impl Holiday {
    pub const LEVELS: [&'static str; 2] = ["No Holiday", "Holiday"];
}

/// Whether the rental system was operating during a recorded hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctioningDay {
    Yes,
    No,
}

impl FunctioningDay {
    pub const LEVELS: [&'static str; 2] = ["Yes", "No"];

    pub const YES: &'static str = "Yes";
}

/// Label columns and their allowed level sets.
pub const LABEL_COLUMNS: [(&str, &[&str]); 3] = [
    (SEASON, &Season::LEVELS),
    (HOLIDAY, &Holiday::LEVELS),
    (FUNC_DAY, &FunctioningDay::LEVELS),
];

/// Numeric measurement columns, cast to Float64 during cleaning.
pub const MEASUREMENT_COLUMNS: [&str; 8] = [
    TEMP, HUMIDITY, WIND, VISIBILITY, DEW_POINT, SOLAR_RAD, RAIN, SNOW,
];

/// Clean the freshly loaded hourly table.
///
/// Applied in order: (a) rename every raw header to its short identifier,
/// (b) validate the three label columns against their fixed level sets,
/// (c) parse the date column from day-month-year text, (d) settle numeric
/// dtypes. After this step no raw header name remains.
pub fn clean_dataset(df: DataFrame) -> Result<DataFrame> {
    let mut df = rename_columns(df)?;
    for (column, levels) in LABEL_COLUMNS {
        validate_levels(&df, column, levels)?;
    }
    df = parse_dates(df)?;
    settle_numeric_types(df)
}

/// Rename raw headers to short identifiers. A missing raw column is a
/// schema mismatch.
pub fn rename_columns(mut df: DataFrame) -> Result<DataFrame> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for (raw, short) in RENAMES {
        if !present.iter().any(|c| c == raw) {
            return Err(VelostatError::Schema(format!(
                "missing column '{}' (found: {:?})",
                raw, present
            )));
        }
        df.rename(raw, short.into())?;
    }

    Ok(df)
}

/// Reject any value of `column` outside the fixed `levels` set. Nulls are
/// rejected too: the raw export has no legitimate missing labels.
pub fn validate_levels(df: &DataFrame, column: &str, levels: &[&str]) -> Result<()> {
    let ca = df
        .column(column)?
        .str()
        .map_err(|_| {
            VelostatError::Schema(format!("column '{}' is not a text column", column))
        })?
        .clone();

    if ca.null_count() > 0 {
        return Err(VelostatError::Parse {
            what: format!("column '{}'", column),
            message: format!("{} missing value(s)", ca.null_count()),
        });
    }

    let unique = ca.unique()?;
    for value in unique.into_iter().flatten() {
        if !levels.contains(&value) {
            return Err(VelostatError::Parse {
                what: format!("column '{}'", column),
                message: format!(
                    "unexpected value '{}' (allowed: {:?})",
                    value, levels
                ),
            });
        }
    }

    Ok(())
}

/// Parse the date column from day-month-year text into a date dtype.
/// Parsing is strict: any row that does not match the pattern aborts.
pub fn parse_dates(df: DataFrame) -> Result<DataFrame> {
    df.lazy()
        .with_column(col(DATE).str().to_date(StrptimeOptions {
            format: Some(DATE_FORMAT.into()),
            strict: true,
            ..Default::default()
        }))
        .collect()
        .map_err(|e| VelostatError::Parse {
            what: format!("column '{}'", DATE),
            message: format!("expected '{}' dates: {}", DATE_FORMAT, e),
        })
}

/// Cast the count columns to Int64 and the weather measurements to Float64.
/// A column that cannot be cast (e.g. text where a number belongs) is a
/// schema mismatch.
pub fn settle_numeric_types(df: DataFrame) -> Result<DataFrame> {
    let mut casts: Vec<Expr> = vec![
        col(RENT_BIKE).cast(DataType::Int64),
        col(HOUR).cast(DataType::Int64),
    ];
    casts.extend(
        MEASUREMENT_COLUMNS
            .iter()
            .map(|c| col(*c).cast(DataType::Float64)),
    );

    df.lazy()
        .with_columns(casts)
        .collect()
        .map_err(|e| VelostatError::Schema(format!("numeric column has unusable type: {}", e)))
}
