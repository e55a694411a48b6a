//! Dataset loader for CSV files in a non-default character encoding

use std::io::Cursor;
use std::path::Path;

use encoding_rs::Encoding;
use polars::prelude::*;

use crate::error::{Result, VelostatError};

/// Load a delimited dataset, decoding it from the given character encoding
/// before parsing.
///
/// The canonical input is not valid UTF-8 (the temperature header carries a
/// degree symbol), so the file is read as raw bytes and decoded first.
/// `encoding_label` accepts any WHATWG label, e.g. `windows-1252`.
pub fn load_dataset(
    path: &Path,
    encoding_label: &str,
    infer_schema_length: usize,
) -> Result<DataFrame> {
    let encoding =
        Encoding::for_label(encoding_label.as_bytes()).ok_or_else(|| VelostatError::Read {
            path: path.to_path_buf(),
            message: format!("unknown encoding label '{}'", encoding_label),
        })?;

    let bytes = std::fs::read(path).map_err(|e| VelostatError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(VelostatError::Read {
            path: path.to_path_buf(),
            message: format!("input is not valid {}", encoding.name()),
        });
    }

    let infer = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer)
        .into_reader_with_file_handle(Cursor::new(text.into_owned().into_bytes()))
        .finish()
        .map_err(|e| VelostatError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Load a dataset and return it together with row count, column count, and
/// estimated in-memory size in megabytes.
pub fn load_dataset_with_stats(
    path: &Path,
    encoding_label: &str,
    infer_schema_length: usize,
) -> Result<(DataFrame, usize, usize, f64)> {
    let df = load_dataset(path, encoding_label, infer_schema_length)?;
    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    Ok((df, rows, cols, memory_mb))
}
