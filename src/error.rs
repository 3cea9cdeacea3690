//! Error types for lipd-qc
//!
//! Only fatal conditions live here. Domain validation failures are not errors:
//! they are recorded as `failed` outcomes in the report.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// lipd-qc error types
#[derive(Error, Debug)]
pub enum Error {
    /// Data directory does not exist or is not a directory
    #[error("Data directory not found: {}\nPass --data with the directory holding the .lpd files", .0.display())]
    DataDirNotFound(PathBuf),

    /// A LiPD archive could not be read
    #[error("Invalid LiPD file {}: {reason}\nRe-run with --skip-invalid to report it in the workbook instead", path.display())]
    InvalidLipd {
        /// Path of the offending archive
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Time-series filter expression could not be parsed
    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),

    /// Dataset cache snapshot is unreadable
    #[error("Cache error: {0}\nDelete the cache file to force a fresh load")]
    Cache(String),

    /// Workbook could not be assembled
    #[error("Report error: {0}")]
    Report(String),

    /// Invalid configuration input (accepted-failures or country table)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Zip container error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Workbook serialization error
    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
