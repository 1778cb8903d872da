//! CSV data source.

use std::path::Path;

use crate::error::{DataError, Result};
use crate::sources::TabularSource;

/// Options for CSV parsing
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether to trim whitespace from fields
    pub trim: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
        }
    }
}

impl CsvOptions {
    /// Create options for semicolon-separated values (common in Spanish locales)
    pub fn semicolon() -> Self {
        Self {
            delimiter: b';',
            ..Default::default()
        }
    }

    /// Use a different delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Delimited text data source
pub struct CsvSource {
    /// Raw file contents
    data: Vec<u8>,
    /// Parsing options
    options: CsvOptions,
}

impl CsvSource {
    /// Create a new CSV source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    /// Create a new CSV source with custom options
    pub fn with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        Ok(Self::from_bytes(std::fs::read(path)?, options))
    }

    /// Create a CSV source over in-memory bytes
    pub fn from_bytes(data: impl Into<Vec<u8>>, options: CsvOptions) -> Self {
        Self {
            data: data.into(),
            options,
        }
    }

    /// Parsing options in effect
    pub fn options(&self) -> &CsvOptions {
        &self.options
    }
}

impl TabularSource for CsvSource {
    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .has_headers(false) // The header row is resolved by the roster
            .trim(if self.options.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .flexible(true)
            .from_reader(self.data.as_slice());

        let mut result = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            result.push(record.iter().map(|s| s.to_string()).collect());
        }

        Ok(result)
    }
}
