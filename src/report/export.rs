//! Model report export: a JSON document with run metadata, the
//! cross-validation comparison, and the final coefficient table, plus the
//! coefficient table alone as CSV.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use crate::model::evaluate::{FinalEvaluation, RecipeComparison};
use crate::model::ols::Coefficient;

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// Velostat version
    pub velostat_version: String,
    /// Input file path
    pub input_file: String,
    /// Character encoding the input was decoded with
    pub encoding: String,
    /// Seed driving the split and fold assignment
    pub seed: u64,
    /// Number of cross-validation folds
    pub folds: usize,
    /// Training fraction of the stratified split
    pub train_fraction: f64,
    /// Daily records in the training partition
    pub train_days: usize,
    /// Daily records in the test partition
    pub test_days: usize,
}

/// Cross-validated metrics of one recipe
#[derive(Serialize)]
pub struct RecipeMetricsExport {
    pub recipe: String,
    pub n_terms: usize,
    pub mean_rmse: f64,
    pub rmse_se: f64,
    pub mean_r2: f64,
    pub r2_se: f64,
}

/// One term of the final coefficient table
#[derive(Serialize)]
pub struct CoefficientExport {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

/// Complete model report
#[derive(Serialize)]
pub struct ModelReportExport {
    pub metadata: RunMetadata,
    pub comparison: Vec<RecipeMetricsExport>,
    pub selected_recipe: String,
    pub train_rmse: f64,
    pub train_r2: f64,
    pub test_rmse: f64,
    pub test_r2: f64,
    pub coefficients: Vec<CoefficientExport>,
}

/// Run parameters carried into the report metadata
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub encoding: &'a str,
    pub seed: u64,
    pub folds: usize,
    pub train_fraction: f64,
    pub train_days: usize,
    pub test_days: usize,
}

/// Write the full model report as pretty-printed JSON.
pub fn export_model_report(
    output_path: &Path,
    params: &ExportParams,
    comparisons: &[RecipeComparison],
    evaluation: &FinalEvaluation,
) -> Result<()> {
    let comparison = comparisons
        .iter()
        .map(|c| RecipeMetricsExport {
            recipe: c.name().to_string(),
            n_terms: c.n_terms,
            mean_rmse: c.mean_rmse,
            rmse_se: c.rmse_se,
            mean_r2: c.mean_r2,
            r2_se: c.r2_se,
        })
        .collect();

    let coefficients = evaluation
        .coefficients
        .iter()
        .map(|c| CoefficientExport {
            term: c.term.clone(),
            estimate: c.estimate,
            std_error: c.std_error,
            t_value: c.t_value,
            p_value: c.p_value,
        })
        .collect();

    let export = ModelReportExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            velostat_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            encoding: params.encoding.to_string(),
            seed: params.seed,
            folds: params.folds,
            train_fraction: params.train_fraction,
            train_days: params.train_days,
            test_days: params.test_days,
        },
        comparison,
        selected_recipe: evaluation.name().to_string(),
        train_rmse: evaluation.train_rmse,
        train_r2: evaluation.train_r2,
        test_rmse: evaluation.test_rmse,
        test_r2: evaluation.test_r2,
        coefficients,
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize model report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write model report to {}", output_path.display()))?;

    Ok(())
}

/// Write the coefficient table as CSV.
pub fn write_coefficients_csv(output_path: &Path, coefficients: &[Coefficient]) -> Result<()> {
    let mut df = df! {
        "term" => coefficients.iter().map(|c| c.term.clone()).collect::<Vec<_>>(),
        "estimate" => coefficients.iter().map(|c| c.estimate).collect::<Vec<_>>(),
        "std_error" => coefficients.iter().map(|c| c.std_error).collect::<Vec<_>>(),
        "t_value" => coefficients.iter().map(|c| c.t_value).collect::<Vec<_>>(),
        "p_value" => coefficients.iter().map(|c| c.p_value).collect::<Vec<_>>(),
    }
    .context("Failed to assemble coefficient table")?;

    let mut file = std::fs::File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    CsvWriter::new(&mut file)
        .finish(&mut df)
        .with_context(|| format!("Failed to write CSV file: {}", output_path.display()))?;

    Ok(())
}
