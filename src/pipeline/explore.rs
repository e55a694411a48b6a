//! Exploratory diagnostics: missingness, summary statistics, contingency
//! counts, and a Pearson correlation matrix.
//!
//! Nothing downstream consumes these results; they are printed and
//! forgotten.

use polars::prelude::*;
use rayon::prelude::*;

use crate::error::{Result, VelostatError};

/// Per-column missing-entry counts, in column order.
pub fn missing_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count()))
        .collect()
}

/// Summary statistics for one numeric column.
#[derive(Debug, Clone)]
pub struct NumericSummary {
    pub column: String,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}

/// Compute mean/median/min/max/standard-deviation for every numeric column.
/// Nulls are skipped; an all-null numeric column is omitted.
pub fn numeric_summaries(df: &DataFrame) -> Result<Vec<NumericSummary>> {
    let mut summaries = Vec::new();

    for column in df.get_columns() {
        if !column.dtype().is_primitive_numeric() {
            continue;
        }

        let ca = column.cast(&DataType::Float64)?;
        let values: Vec<f64> = ca.f64()?.into_iter().flatten().collect();
        if values.is_empty() {
            continue;
        }

        summaries.push(NumericSummary {
            column: column.name().to_string(),
            mean: mean(&values),
            median: median(&values),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            std: sample_std(&values),
        });
    }

    Ok(summaries)
}

/// Frequency table for a label column: level -> row count, sorted by level.
pub fn level_counts(df: &DataFrame, column: &str) -> Result<Vec<(String, usize)>> {
    let counts = df
        .clone()
        .lazy()
        .group_by([col(column)])
        .agg([len().alias("count")])
        .sort([column], SortMultipleOptions::default())
        .collect()?;

    let levels = counts.column(column)?.str()?.clone();
    let ns = counts.column("count")?.u32()?.clone();

    Ok(levels
        .into_iter()
        .zip(ns.into_iter())
        .map(|(level, n)| {
            (
                level.unwrap_or("<null>").to_string(),
                n.unwrap_or(0) as usize,
            )
        })
        .collect())
}

/// Pairwise Pearson correlation matrix over the named numeric columns.
///
/// Pairs are computed in parallel; the diagonal is 1. A constant column
/// yields NaN against every other column.
pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
    let mut series: Vec<(String, Vec<f64>)> = Vec::with_capacity(columns.len());
    for name in columns {
        let ca = df.column(name)?.cast(&DataType::Float64)?;
        let values: Vec<f64> = ca
            .f64()?
            .into_iter()
            .map(|v| {
                v.ok_or_else(|| {
                    VelostatError::Schema(format!("null value in numeric column '{}'", name))
                })
            })
            .collect::<Result<_>>()?;
        series.push((name.to_string(), values));
    }

    let n = series.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();

    let computed: Vec<((usize, usize), f64)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let r = pearson_correlation(&series[i].1, &series[j].1).unwrap_or(f64::NAN);
            ((i, j), r)
        })
        .collect();

    let mut matrix = vec![vec![1.0; n]; n];
    for ((i, j), r) in computed {
        matrix[i][j] = r;
        matrix[j][i] = r;
    }

    let names = series.into_iter().map(|(name, _)| name).collect();
    Ok((names, matrix))
}

/// Single-pass Welford Pearson correlation. Returns None when either series
/// has zero variance or the lengths differ.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.is_empty() || xs.len() != ys.len() {
        return None;
    }

    let mut count = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (&x, &y) in xs.iter().zip(ys.iter()) {
        count += 1.0;
        let dx = x - mean_x;
        let dy = y - mean_y;
        mean_x += dx / count;
        mean_y += dy / count;
        var_x += dx * (x - mean_x);
        var_y += dy * (y - mean_y);
        cov_xy += dx * (y - mean_y);
    }

    let std_x = (var_x / count).sqrt();
    let std_y = (var_y / count).sqrt();

    if std_x == 0.0 || std_y == 0.0 {
        return None;
    }

    Some(cov_xy / (count * std_x * std_y))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
