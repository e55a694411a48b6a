//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// Velostat - Analyze hourly bike-rental logs and compare regression recipes
#[derive(Parser, Debug)]
#[command(name = "velostat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input CSV file with hourly rental records
    #[arg(short, long)]
    pub input: PathBuf,

    /// Character encoding of the input file (any WHATWG label).
    /// The canonical dataset carries a degree symbol in its header and is
    /// not valid UTF-8.
    #[arg(long, default_value = "windows-1252")]
    pub encoding: String,

    /// Random seed for the train/test split and fold assignment.
    /// Fixing the seed makes every reported metric reproducible.
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Fraction of daily records assigned to the training partition,
    /// stratified by season
    #[arg(long, default_value = "0.75", value_parser = validate_train_fraction)]
    pub train_fraction: f64,

    /// Number of cross-validation folds built from the training partition
    #[arg(long, default_value = "10", value_parser = validate_folds)]
    pub folds: usize,

    /// Directory for the JSON report and coefficient CSV.
    /// Defaults to the input file's directory.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of rows to use for CSV schema inference.
    /// Use 0 for a full table scan (slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Skip the terminal charts (bar chart, histogram, scatter plots)
    #[arg(long, default_value = "false")]
    pub no_charts: bool,
}

impl Cli {
    fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            self.input
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    fn input_stem(&self) -> &str {
        self.input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("velostat")
    }

    /// Path of the JSON model report, derived from the input file name.
    pub fn model_report_path(&self) -> PathBuf {
        self.resolved_output_dir()
            .join(format!("{}_model_report.json", self.input_stem()))
    }

    /// Path of the coefficient table CSV, derived from the input file name.
    pub fn coefficients_path(&self) -> PathBuf {
        self.resolved_output_dir()
            .join(format!("{}_coefficients.csv", self.input_stem()))
    }
}

/// Validator for the train_fraction parameter
fn validate_train_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(value > 0.0 && value < 1.0) {
        Err(format!(
            "train_fraction must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}

/// Validator for the folds parameter
fn validate_folds(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid integer", s))?;

    if value < 2 {
        Err(format!("folds must be at least 2, got {}", value))
    } else {
        Ok(value)
    }
}
