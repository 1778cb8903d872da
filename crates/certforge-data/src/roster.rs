//! Roster derivation: header resolution, attendance filtering and
//! full-name normalization.
//!
//! Column names are matched after trimming and title-casing, so
//! `" APELLIDO "` and `"apellido"` both resolve to the last-name column.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Accepted headers for the last-name column
pub const LAST_NAME_COLUMNS: &[&str] = &["Apellido", "Last Name"];

/// Accepted headers for the first-name column
pub const FIRST_NAME_COLUMNS: &[&str] = &["Nombre", "First Name"];

/// Accepted headers for a single combined-name column
pub const FULL_NAME_COLUMNS: &[&str] = &["Nombre Y Apellido", "Full Name"];

/// Accepted headers for the attendance column
pub const ATTENDED_COLUMNS: &[&str] = &["Asistió", "Asistio", "Attended"];

/// Accepted headers for the identifier column
pub const IDENTIFIER_COLUMNS: &[&str] = &["Dni", "Identifier", "Id"];

/// One certificate's worth of data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    /// Title-cased display name, never empty
    pub full_name: String,
    /// Identifier value when identifier mode is on and the cell is filled
    pub identifier: Option<String>,
}

/// Where the full name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameSource {
    /// Last-name and first-name columns joined
    LastFirst,
    /// A single combined-name column
    FullName,
}

/// Options controlling roster derivation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterOptions {
    /// Require an identifier column and keep one record per row
    #[serde(skip)]
    pub include_identifier: bool,
    /// Values of the attendance column that count as present
    pub attended_markers: Vec<String>,
    /// Workbook sheet to read (first sheet when unset)
    pub sheet: Option<String>,
    /// Delimiter for CSV rosters
    pub csv_delimiter: char,
}

impl Default for RosterOptions {
    fn default() -> Self {
        Self {
            include_identifier: false,
            attended_markers: vec!["SI".to_string()],
            sheet: None,
            csv_delimiter: ',',
        }
    }
}

impl RosterOptions {
    /// Options for identifier mode
    pub fn with_identifier(mut self, include: bool) -> Self {
        self.include_identifier = include;
        self
    }

    fn is_affirmative(&self, value: &str) -> bool {
        let value = value.trim();
        self.attended_markers
            .iter()
            .any(|marker| marker.trim().to_uppercase() == value.to_uppercase())
    }
}

/// Validation outcome of a roster load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterSummary {
    /// Data rows read (header excluded)
    pub total_rows: usize,
    /// Rows removed by the attendance filter
    pub absent_rows: usize,
    /// Rows dropped because the derived name was empty
    pub blank_names: usize,
    /// Rows dropped as repeated names
    pub duplicate_names: usize,
    /// Columns the names were derived from
    pub name_source: NameSource,
    /// Whether an attendance column was present
    pub attendance_filtered: bool,
}

/// A loaded roster
#[derive(Debug, Clone)]
pub struct Roster {
    /// Records in first-seen order
    pub records: Vec<RosterRecord>,
    /// Load statistics
    pub summary: RosterSummary,
}

impl Roster {
    /// Derive a roster from raw rows; the first row is the header
    pub fn from_rows(rows: Vec<Vec<String>>, options: &RosterOptions) -> Result<Self> {
        let mut rows = rows.into_iter();
        let header: Vec<String> = rows
            .next()
            .unwrap_or_default()
            .iter()
            .map(|h| title_case(h.trim()))
            .collect();

        let find = |aliases: &[&str]| header.iter().position(|h| aliases.contains(&h.as_str()));

        let name_columns = match (find(LAST_NAME_COLUMNS), find(FIRST_NAME_COLUMNS)) {
            (Some(last), Some(first)) => NameColumns::LastFirst { last, first },
            _ => match find(FULL_NAME_COLUMNS) {
                Some(full) => NameColumns::Full(full),
                None => {
                    return Err(DataError::missing_columns(
                        "expected 'Apellido' and 'Nombre', or 'Nombre y Apellido'",
                    ))
                }
            },
        };

        let identifier_column = if options.include_identifier {
            Some(find(IDENTIFIER_COLUMNS).ok_or_else(|| {
                DataError::missing_columns("identifier mode requires a 'Dni' column")
            })?)
        } else {
            None
        };

        let attended_column = find(ATTENDED_COLUMNS);

        let mut summary = RosterSummary {
            total_rows: 0,
            absent_rows: 0,
            blank_names: 0,
            duplicate_names: 0,
            name_source: name_columns.source(),
            attendance_filtered: attended_column.is_some(),
        };
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for row in rows {
            summary.total_rows += 1;
            let cell = |idx: usize| row.get(idx).map(|s| s.as_str()).unwrap_or("");

            if let Some(col) = attended_column {
                if !options.is_affirmative(cell(col)) {
                    summary.absent_rows += 1;
                    continue;
                }
            }

            let full_name = name_columns.derive(&cell);
            if full_name.is_empty() {
                summary.blank_names += 1;
                continue;
            }

            let identifier = match identifier_column {
                Some(col) => {
                    let value = cell(col).trim();
                    (!value.is_empty()).then(|| value.to_string())
                }
                None => {
                    // One certificate per distinct name
                    if !seen.insert(full_name.clone()) {
                        summary.duplicate_names += 1;
                        continue;
                    }
                    None
                }
            };

            records.push(RosterRecord {
                full_name,
                identifier,
            });
        }

        Ok(Self { records, summary })
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the roster produced no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Display names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.full_name.as_str())
    }
}

enum NameColumns {
    LastFirst { last: usize, first: usize },
    Full(usize),
}

impl NameColumns {
    fn source(&self) -> NameSource {
        match self {
            NameColumns::LastFirst { .. } => NameSource::LastFirst,
            NameColumns::Full(_) => NameSource::FullName,
        }
    }

    fn derive<'a>(&self, cell: &impl Fn(usize) -> &'a str) -> String {
        let joined = match *self {
            NameColumns::LastFirst { last, first } => {
                format!("{} {}", cell(last).trim(), cell(first).trim())
            }
            NameColumns::Full(col) => cell(col).trim().to_string(),
        };
        title_case(joined.trim())
    }
}

/// Title-case a string: letters following a non-letter are uppercased,
/// all other letters lowercased.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }

    out
}
