//! Spreadsheet data source using calamine.
//!
//! Accepts any workbook format calamine can sniff (XLSX, XLSM, XLS, ODS).

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use crate::error::{DataError, Result};
use crate::sources::TabularSource;

/// Workbook data source
pub struct ExcelSource {
    /// Raw workbook bytes
    data: Vec<u8>,
    /// Sheet names cache
    sheet_names: Vec<String>,
    /// Sheet to read (first sheet when unset)
    sheet: Option<String>,
}

impl ExcelSource {
    /// Create a new workbook source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        Self::from_bytes(std::fs::read(path)?)
    }

    /// Create a new workbook source from uploaded bytes
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self> {
        let data = data.into();

        let workbook = open_workbook_auto_from_rs(Cursor::new(data.clone()))
            .map_err(|e| DataError::WorkbookOpen(e.to_string()))?;

        let sheet_names = workbook.sheet_names().to_vec();

        Ok(Self {
            data,
            sheet_names,
            sheet: None,
        })
    }

    /// Read a specific sheet instead of the first one
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// List available sheets
    pub fn list_sheets(&self) -> &[String] {
        &self.sheet_names
    }

    /// Get the default sheet name
    pub fn default_sheet(&self) -> Option<&str> {
        self.sheet_names.first().map(|s| s.as_str())
    }

    /// Read the used range of a sheet as strings
    pub fn read_sheet(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        // Re-open workbook for reading (calamine requires this pattern)
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(self.data.clone()))
            .map_err(|e| DataError::WorkbookOpen(e.to_string()))?;

        let sheet_range = workbook
            .worksheet_range(sheet)
            .map_err(|e| DataError::SheetNotFound(format!("{}: {}", sheet, e)))?;

        Ok(Self::range_rows(&sheet_range))
    }

    /// Convert a calamine cell to a string
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => {
                // Integral floats are usually IDs typed as numbers
                if f.fract() == 0.0 {
                    format!("{:.0}", f)
                } else {
                    f.to_string()
                }
            }
            Data::Bool(b) => b.to_string(),
            Data::Error(e) => format!("#ERROR: {:?}", e),
            Data::DateTime(dt) => format!("{}", dt),
            Data::DateTimeIso(s) => s.clone(),
            Data::DurationIso(s) => s.clone(),
        }
    }

    fn range_rows(sheet_range: &Range<Data>) -> Vec<Vec<String>> {
        sheet_range
            .rows()
            .map(|row| row.iter().map(Self::cell_to_string).collect())
            .collect()
    }
}

impl TabularSource for ExcelSource {
    fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        let sheet = match &self.sheet {
            Some(s) => s.clone(),
            None => self
                .default_sheet()
                .map(|s| s.to_string())
                .ok_or_else(|| DataError::SheetNotFound("No sheets in workbook".to_string()))?,
        };

        self.read_sheet(&sheet)
    }
}
