//! Terminal-rendered descriptive charts
//!
//! Diagnostic only: a season/holiday bar chart, a histogram of daily
//! rentals, and rentals-vs-weather scatter plots. Nothing downstream
//! depends on them.

use console::style;
use polars::prelude::*;

use crate::error::Result;
use crate::pipeline::aggregate::TOTAL_RENT_BIKE;
use crate::pipeline::clean::{Holiday, Season, HOLIDAY, SEASON};

const BAR_WIDTH: usize = 36;
const SCATTER_COLS: usize = 56;
const SCATTER_ROWS: usize = 14;

fn season_glyph(season: &str) -> console::StyledObject<&'static str> {
    match season {
        "Winter" => style("W").cyan(),
        "Spring" => style("P").green(),
        "Summer" => style("S").yellow(),
        "Autumn" => style("A").red(),
        _ => style("?").dim(),
    }
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let ca = df.column(name)?.cast(&DataType::Float64)?;
    Ok(ca.f64()?.into_iter().flatten().collect())
}

fn string_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or("").to_string())
        .collect())
}

/// Grouped bar chart: operating days per season, split by holiday status.
pub fn print_season_holiday_bars(daily: &DataFrame) -> Result<()> {
    let counts = daily
        .clone()
        .lazy()
        .group_by([col(SEASON), col(HOLIDAY)])
        .agg([len().alias("days")])
        .collect()?;

    let seasons = string_values(&counts, SEASON)?;
    let holidays = string_values(&counts, HOLIDAY)?;
    let days: Vec<u32> = counts
        .column("days")?
        .u32()?
        .into_iter()
        .flatten()
        .collect();

    let lookup = |season: &str, holiday: &str| -> usize {
        seasons
            .iter()
            .zip(holidays.iter())
            .zip(days.iter())
            .find(|((s, h), _)| s.as_str() == season && h.as_str() == holiday)
            .map(|(_, &n)| n as usize)
            .unwrap_or(0)
    };

    let max = Season::LEVELS
        .iter()
        .flat_map(|s| Holiday::LEVELS.iter().map(move |h| lookup(s, h)))
        .max()
        .unwrap_or(0)
        .max(1);

    println!("      Operating days by season and holiday");
    for season in Season::LEVELS {
        println!("      {} {}", season_glyph(season), style(season).bold());
        for holiday in Holiday::LEVELS {
            let n = lookup(season, holiday);
            let bar_len = n * BAR_WIDTH / max;
            println!(
                "        {:<10} {} {}",
                holiday,
                style("█".repeat(bar_len)).cyan(),
                style(n).yellow()
            );
        }
    }
    println!();

    Ok(())
}

/// Histogram of total daily rentals.
pub fn print_rentals_histogram(daily: &DataFrame, bins: usize) -> Result<()> {
    let values = column_values(daily, TOTAL_RENT_BIKE)?;
    if values.is_empty() || bins == 0 {
        return Ok(());
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = ((max - min) / bins as f64).max(f64::EPSILON);

    let mut counts = vec![0usize; bins];
    for &v in &values {
        let bin = (((v - min) / width) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    let tallest = counts.iter().copied().max().unwrap_or(1).max(1);

    println!("      Distribution of total daily rentals");
    for (i, &n) in counts.iter().enumerate() {
        let lo = min + i as f64 * width;
        let hi = lo + width;
        let bar_len = n * BAR_WIDTH / tallest;
        println!(
            "        {:>9.0}-{:<9.0} {} {}",
            lo,
            hi,
            style("█".repeat(bar_len)).cyan(),
            style(n).yellow()
        );
    }
    println!();

    Ok(())
}

/// Character-grid scatter plot of total daily rentals against a weather
/// column, with one glyph per season.
pub fn print_scatter(daily: &DataFrame, x_column: &str, x_label: &str) -> Result<()> {
    let xs = column_values(daily, x_column)?;
    let ys = column_values(daily, TOTAL_RENT_BIKE)?;
    let seasons = string_values(daily, SEASON)?;
    if xs.is_empty() {
        return Ok(());
    }

    let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let y_min = ys.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let x_span = (x_max - x_min).max(f64::EPSILON);
    let y_span = (y_max - y_min).max(f64::EPSILON);

    // Later points overwrite earlier ones in the same cell; acceptable for
    // a diagnostic glance.
    let mut grid: Vec<Vec<Option<&str>>> = vec![vec![None; SCATTER_COLS]; SCATTER_ROWS];
    for ((&x, &y), season) in xs.iter().zip(ys.iter()).zip(seasons.iter()) {
        let col = (((x - x_min) / x_span) * (SCATTER_COLS - 1) as f64).round() as usize;
        let row = (((y - y_min) / y_span) * (SCATTER_ROWS - 1) as f64).round() as usize;
        grid[SCATTER_ROWS - 1 - row][col] = Some(match season.as_str() {
            "Winter" => "Winter",
            "Spring" => "Spring",
            "Summer" => "Summer",
            _ => "Autumn",
        });
    }

    println!("      Total daily rentals vs {}", style(x_label).bold());
    for row in &grid {
        print!("        {}", style("│").dim());
        for cell in row {
            match cell {
                Some(season) => print!("{}", season_glyph(season)),
                None => print!(" "),
            }
        }
        println!();
    }
    println!(
        "        {}{}",
        style("└").dim(),
        style("─".repeat(SCATTER_COLS)).dim()
    );
    println!(
        "         {:<28}{:>28}",
        format!("{:.1}", x_min),
        format!("{:.1}", x_max)
    );
    println!(
        "        {} {}=Winter {}=Spring {}=Summer {}=Autumn",
        style("Legend:").dim(),
        season_glyph("Winter"),
        season_glyph("Spring"),
        season_glyph("Summer"),
        season_glyph("Autumn")
    );
    println!();

    Ok(())
}
