//! Document conversion to PDF.
//!
//! The converter is an external program treated as a black box: given a
//! document and an output directory it must leave `<stem>.pdf` there.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::ConvertError;

/// Converts one document into a PDF inside `out_dir`
pub trait DocumentConverter {
    /// Convert `input`, returning the path of the produced PDF
    fn convert(&self, input: &Path, out_dir: &Path) -> Result<PathBuf, ConvertError>;
}

/// Headless LibreOffice (or a compatible `soffice` binary)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibreOfficeConverter {
    program: String,
}

impl LibreOfficeConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for LibreOfficeConverter {
    fn default() -> Self {
        Self::new("libreoffice")
    }
}

impl DocumentConverter for LibreOfficeConverter {
    fn convert(&self, input: &Path, out_dir: &Path) -> Result<PathBuf, ConvertError> {
        debug!(program = %self.program, input = %input.display(), "converting to PDF");

        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(input)
            .output()
            .map_err(|source| ConvertError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            return Err(ConvertError::Exit {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let pdf = expected_pdf_path(input, out_dir);
        if !pdf.is_file() {
            return Err(ConvertError::MissingOutput(pdf));
        }

        Ok(pdf)
    }
}

/// Where a converter is expected to leave the PDF for `input`
pub fn expected_pdf_path(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".pdf");
    out_dir.join(name)
}
