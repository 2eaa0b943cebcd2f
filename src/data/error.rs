use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Failures while loading a listing file. Every variant is fatal for the
/// load that produced it; no partial dataset is returned.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing CSV")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON")]
    Json(#[from] serde_json::Error),

    #[error("reading parquet")]
    Parquet(#[from] ParquetError),

    #[error("converting arrow column")]
    Arrow(#[from] ArrowError),

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("column '{column}' has no values to compute a median from")]
    EmptyColumn { column: &'static str },
}
