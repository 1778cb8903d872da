//! Tabular source implementations.
//!
//! Rosters arrive either as spreadsheet workbooks (XLSX, XLS, ODS) or as
//! delimited text. Both are flattened to rows of strings; the first row is
//! the header.

pub mod csv;
pub mod excel;

pub use self::csv::{CsvOptions, CsvSource};
pub use self::excel::ExcelSource;

use crate::error::Result;

/// ZIP local file header (XLSX, ODS)
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// OLE compound document header (legacy XLS)
const OLE_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Trait for sources that can provide a whole table of cells
pub trait TabularSource {
    /// Read every row, header included, as strings
    fn read_rows(&self) -> Result<Vec<Vec<String>>>;
}

/// Detected on-disk format of a roster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Spreadsheet workbook handled by calamine
    Workbook,
    /// Delimited text
    Csv,
}

impl SourceFormat {
    /// Guess the format from the leading bytes
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_SIGNATURE) || bytes.starts_with(OLE_SIGNATURE) {
            SourceFormat::Workbook
        } else {
            SourceFormat::Csv
        }
    }
}
