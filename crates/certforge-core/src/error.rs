//! Error types for certificate batches.

use std::path::PathBuf;

use certforge_data::DataError;
use certforge_pptx::PptxError;
use thiserror::Error;

/// Result type for batch operations
pub type Result<T> = std::result::Result<T, CertError>;

/// Errors that stop a whole run
#[derive(Debug, Error)]
pub enum CertError {
    /// Configuration rejected before any record was processed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Template unusable, or a sentinel miss under the abort policy
    #[error(transparent)]
    Template(#[from] PptxError),

    /// Roster unreadable or missing required columns
    #[error(transparent)]
    Roster(#[from] DataError),

    /// Writing the output archive failed
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CertError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// A single record's conversion failure; the batch carries on
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Converter program could not be started
    #[error("failed to start converter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Converter exited unsuccessfully
    #[error("converter exited with code {code}: {stderr}")]
    Exit { code: i32, stderr: String },

    /// Converter reported success but produced no PDF
    #[error("converter produced no output at {}", .0.display())]
    MissingOutput(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_error_is_transparent() {
        let err: CertError = DataError::missing_columns("Dni | Identifier | Id").into();
        assert_eq!(
            err.to_string(),
            "Missing required columns: Dni | Identifier | Id"
        );
    }

    #[test]
    fn test_convert_error_display() {
        let err = ConvertError::Exit {
            code: 1,
            stderr: "source file could not be loaded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "converter exited with code 1: source file could not be loaded"
        );

        let err = ConvertError::MissingOutput(PathBuf::from("/tmp/out/Certificado_Ana.pdf"));
        assert!(err.to_string().contains("Certificado_Ana.pdf"));
    }
}
