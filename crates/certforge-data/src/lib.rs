//! # certforge-data
//!
//! Roster loading for certforge - read attendance lists from Excel, ODS or
//! CSV files and turn them into certificate records.
//!
//! ## Features
//!
//! - **Workbook Support**: XLSX/XLS/ODS through `calamine`, first sheet by default
//! - **CSV Support**: delimited text with a configurable separator
//! - **Roster Derivation**: header aliases, attendance filter, title-cased names
//!
//! ## Example
//!
//! ```rust,ignore
//! use certforge_data::{load_roster_file, RosterOptions};
//!
//! let roster = load_roster_file("asistentes.xlsx", &RosterOptions::default())?;
//! for name in roster.names() {
//!     println!("{}", name);
//! }
//! ```

pub mod error;
pub mod roster;
pub mod sources;

use std::path::Path;

// Re-exports
pub use error::{DataError, Result};
pub use roster::{title_case, NameSource, Roster, RosterOptions, RosterRecord, RosterSummary};
pub use sources::{CsvOptions, CsvSource, ExcelSource, SourceFormat, TabularSource};

/// Load a roster from uploaded bytes, sniffing workbook vs. CSV
pub fn load_roster_bytes(bytes: &[u8], options: &RosterOptions) -> Result<Roster> {
    let rows = match SourceFormat::sniff(bytes) {
        SourceFormat::Workbook => {
            let mut source = ExcelSource::from_bytes(bytes.to_vec())?;
            if let Some(sheet) = &options.sheet {
                source = source.with_sheet(sheet.clone());
            }
            source.read_rows()?
        }
        SourceFormat::Csv => {
            let delimiter = options.csv_delimiter;
            if !delimiter.is_ascii() {
                return Err(DataError::InvalidDelimiter(delimiter));
            }
            let csv_options = CsvOptions::default().with_delimiter(delimiter as u8);
            CsvSource::from_bytes(bytes.to_vec(), csv_options).read_rows()?
        }
    };

    Roster::from_rows(rows, options)
}

/// Load a roster from a file path
pub fn load_roster_file(path: impl AsRef<Path>, options: &RosterOptions) -> Result<Roster> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DataError::FileNotFound(path.display().to_string()));
    }

    load_roster_bytes(&std::fs::read(path)?, options)
}
