use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the EV dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A CSV document could not be parsed.
    #[error("Failed to parse CSV in {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// The dataset file has an extension the loader does not understand.
    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(PathBuf),

    /// A JSON document parsed, but its top level holds no record list.
    #[error("No record array found in {0}")]
    NoRecordArray(PathBuf),

    /// The dataset path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No dataset files were found under the given directory.
    #[error("No dataset files found in {0}")]
    NoDataFiles(PathBuf),

    /// A year range whose lower bound exceeds its upper bound.
    #[error("Invalid year range: {min} > {max}")]
    InvalidYearRange { min: i32, max: i32 },

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
