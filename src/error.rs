//! Error types for the analysis pipeline.
//!
//! Every stage fails fast: the first unmet precondition aborts the run with
//! a descriptive message. There is no retry or partial-result mode.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, cleaning, or modeling the dataset.
#[derive(Debug, Error)]
pub enum VelostatError {
    /// Input file is missing, unreadable, or not decodable with the
    /// requested character encoding.
    #[error("failed to read '{}': {message}", path.display())]
    Read {
        /// Path of the input file
        path: PathBuf,
        /// Detailed cause
        message: String,
    },

    /// A date or category value does not match the expected format.
    #[error("failed to parse {what}: {message}")]
    Parse {
        /// What was being parsed (column name, value)
        what: String,
        /// Detailed cause
        message: String,
    },

    /// An expected column is absent or has an unusable type.
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// The model could not be fitted (singular or rank-deficient design
    /// matrix, underdetermined system, constant predictor).
    #[error("model fit failed: {0}")]
    Fit(String),

    /// A dataframe operation failed unexpectedly.
    #[error("dataframe operation failed: {0}")]
    Frame(#[from] polars::error::PolarsError),

    /// I/O error outside of the initial dataset read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the pipeline and model modules.
pub type Result<T> = std::result::Result<T, VelostatError>;
