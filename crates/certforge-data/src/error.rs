//! Error types for roster loading.

use thiserror::Error;

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading a roster
#[derive(Debug, Error)]
pub enum DataError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Failed to open workbook
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    /// Sheet not found in workbook
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// The roster lacks a column the run needs
    #[error("Missing required columns: {required}")]
    MissingColumns { required: String },

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV delimiter outside the single-byte ASCII range
    #[error("CSV delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

impl DataError {
    /// Create a missing columns error
    pub fn missing_columns(required: impl Into<String>) -> Self {
        Self::MissingColumns {
            required: required.into(),
        }
    }
}
