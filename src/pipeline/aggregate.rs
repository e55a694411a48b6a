//! Hourly-to-daily aggregation
//!
//! Only hours with the functioning-day flag set contribute; a date with no
//! operating hours is absent from the output rather than emitted as a zero
//! row.

use polars::prelude::*;

use crate::error::Result;
use crate::pipeline::clean::{
    DATE, DEW_POINT, FUNC_DAY, FunctioningDay, HOLIDAY, HUMIDITY, RAIN, RENT_BIKE, SEASON, SNOW,
    SOLAR_RAD, TEMP, VISIBILITY, WIND,
};

/// Daily summary column identifiers.
pub const TOTAL_RENT_BIKE: &str = "total_rent_bike";
pub const TOTAL_RAIN: &str = "total_rain";
pub const TOTAL_SNOW: &str = "total_snow";
pub const MEAN_TEMP: &str = "mean_temp";
pub const MEAN_HUMIDITY: &str = "mean_humidity";
pub const MEAN_WIND: &str = "mean_wind";
pub const MEAN_VISIBILITY: &str = "mean_visibility";
pub const MEAN_DEW_POINT: &str = "mean_dew_point";
pub const MEAN_SOLAR_RAD: &str = "mean_solar_rad";

/// The eight continuous predictors of the daily table, in design-matrix
/// order.
pub const DAILY_PREDICTORS: [&str; 8] = [
    TOTAL_RAIN,
    TOTAL_SNOW,
    MEAN_TEMP,
    MEAN_HUMIDITY,
    MEAN_WIND,
    MEAN_VISIBILITY,
    MEAN_DEW_POINT,
    MEAN_SOLAR_RAD,
];

/// Reduce the cleaned hourly table to one row per operating date.
///
/// Rows with `func_day != "Yes"` are dropped first, the remainder is grouped
/// by (date, season, holiday) and reduced: rented-bike count, rainfall and
/// snowfall are summed, the six weather measurements are averaged over the
/// date's operating hours. Output is sorted by date.
pub fn aggregate_daily(df: &DataFrame) -> Result<DataFrame> {
    let daily = df
        .clone()
        .lazy()
        .filter(col(FUNC_DAY).eq(lit(FunctioningDay::YES)))
        .group_by([col(DATE), col(SEASON), col(HOLIDAY)])
        .agg([
            col(RENT_BIKE).sum().alias(TOTAL_RENT_BIKE),
            col(RAIN).sum().alias(TOTAL_RAIN),
            col(SNOW).sum().alias(TOTAL_SNOW),
            col(TEMP).mean().alias(MEAN_TEMP),
            col(HUMIDITY).mean().alias(MEAN_HUMIDITY),
            col(WIND).mean().alias(MEAN_WIND),
            col(VISIBILITY).mean().alias(MEAN_VISIBILITY),
            col(DEW_POINT).mean().alias(MEAN_DEW_POINT),
            col(SOLAR_RAD).mean().alias(MEAN_SOLAR_RAD),
        ])
        .sort([DATE], SortMultipleOptions::default())
        .collect()?;

    Ok(daily)
}

/// Sum of the rented-bike count over all functioning input hours. The
/// aggregated `total_rent_bike` column must sum to exactly this value.
pub fn functioning_rental_total(df: &DataFrame) -> Result<i64> {
    let total = df
        .clone()
        .lazy()
        .filter(col(FUNC_DAY).eq(lit(FunctioningDay::YES)))
        .select([col(RENT_BIKE).sum()])
        .collect()?
        .column(RENT_BIKE)?
        .i64()?
        .get(0)
        .unwrap_or(0);

    Ok(total)
}
