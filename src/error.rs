//! Error types for the eye mouse library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Calibration CSV could not be read or written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML (config or model file) could not be parsed or written
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Not enough calibration data, or the data is degenerate
    #[error("Insufficient calibration data: {0}")]
    InsufficientData(String),

    /// No calibration model at the given path
    #[error("Calibration model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    /// No calibration sample file at the given path
    #[error("Calibration data not found: {}", .0.display())]
    CalibrationDataNotFound(PathBuf),

    /// The landmark source failed (camera gone, stream broken)
    #[error("Capture error: {0}")]
    Capture(String),

    /// A stop was requested before the operation finished
    #[error("Operation cancelled")]
    Cancelled,

    /// Cursor control operation failed
    #[error("Cursor control error: {0}")]
    CursorControl(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Gaze filter initialization error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
