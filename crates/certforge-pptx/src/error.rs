//! Error types for PPTX template handling.

use thiserror::Error;

/// Result type for PPTX operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Errors that can occur while opening, filling or saving a template
#[derive(Error, Debug)]
pub enum PptxError {
    /// Template file not found or inaccessible
    #[error("Template not found: {path}")]
    TemplateNotFound { path: String },

    /// Template is invalid or corrupted
    #[error("Invalid template: {reason}")]
    InvalidTemplate { reason: String },

    /// Required part missing from the package
    #[error("Missing part '{path}' in template")]
    MissingPart { path: String },

    /// No run in the deck contained any sentinel
    #[error("No placeholder found in template (looked for {sentinels})")]
    SentinelNotFound { sentinels: String },

    /// Field style outside the accepted fonts or sizes
    #[error("Invalid field style: {reason}")]
    InvalidStyle { reason: String },

    /// XML generation or parsing error
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// ZIP archive error
    #[error("Archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PptxError {
    /// Create a template not found error
    pub fn template_not_found(path: impl Into<String>) -> Self {
        Self::TemplateNotFound { path: path.into() }
    }

    /// Create an invalid template error
    pub fn invalid_template(reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            reason: reason.into(),
        }
    }

    /// Create a missing part error
    pub fn missing_part(path: impl Into<String>) -> Self {
        Self::MissingPart { path: path.into() }
    }

    /// Create a sentinel miss error listing what was searched for
    pub fn sentinel_not_found<'a>(sentinels: impl IntoIterator<Item = &'a str>) -> Self {
        let sentinels = sentinels
            .into_iter()
            .map(|s| format!("'{}'", s))
            .collect::<Vec<_>>()
            .join(", ");
        Self::SentinelNotFound { sentinels }
    }

    /// Create an invalid style error
    pub fn invalid_style(reason: impl Into<String>) -> Self {
        Self::InvalidStyle {
            reason: reason.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::TemplateNotFound { .. } => "PPTX001",
            Self::InvalidTemplate { .. } => "PPTX002",
            Self::MissingPart { .. } => "PPTX003",
            Self::SentinelNotFound { .. } => "PPTX004",
            Self::InvalidStyle { .. } => "PPTX005",
            Self::XmlError(_) => "PPTX006",
            Self::ZipError(_) => "PPTX007",
            Self::IoError(_) => "PPTX008",
        }
    }

    /// Whether this error means the template lacked every sentinel
    pub fn is_sentinel_miss(&self) -> bool {
        matches!(self, Self::SentinelNotFound { .. })
    }
}
