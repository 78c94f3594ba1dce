//! Table normalization and placeholder synthesis
//!
//! A table is never dropped for lack of data. Missing headers or rows are
//! replaced by placeholders and the replacement is reported, so the caller
//! can tell the user which tables need attention.

use std::fmt;

use serde::Serialize;

use crate::block::TableBlock;

/// Cell text used when a table has no rows
pub const PLACEHOLDER_CELL: &str = "\u{2014}";

/// Minimum column count of a synthesized header row
const MIN_SYNTHESIZED_COLUMNS: usize = 2;

/// A correction applied while normalizing a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFix {
    /// No headers were supplied
    MissingHeaders,
    /// No rows were supplied
    MissingRows,
    /// Some header names were blank
    BlankHeaders,
    /// Rows were wider than the header row
    ExtendedHeaders,
}

impl fmt::Display for TableFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TableFix::MissingHeaders => "missing headers",
            TableFix::MissingRows => "missing rows",
            TableFix::BlankHeaders => "blank header names",
            TableFix::ExtendedHeaders => "rows wider than headers",
        };
        f.write_str(text)
    }
}

/// A rectangular table ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTable {
    /// At least one header
    pub headers: Vec<String>,
    /// At least one row, each exactly `headers.len()` wide
    pub rows: Vec<Vec<String>>,
    /// Corrections applied, empty when the input was complete
    pub fixes: Vec<TableFix>,
}

impl NormalizedTable {
    /// Whether any placeholder content was synthesized
    pub fn synthesized(&self) -> bool {
        !self.fixes.is_empty()
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.headers.len()
    }
}

impl TableBlock {
    /// Produce a non-empty rectangular table from the supplied data
    pub fn normalize(&self) -> NormalizedTable {
        let mut fixes = Vec::new();
        let widest_row = self.rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut headers = self.headers.clone();
        if headers.is_empty() {
            fixes.push(TableFix::MissingHeaders);
            let width = widest_row.max(MIN_SYNTHESIZED_COLUMNS);
            headers = (1..=width).map(generic_header).collect();
        } else {
            if headers.iter().any(|h| h.trim().is_empty()) {
                fixes.push(TableFix::BlankHeaders);
                for (i, header) in headers.iter_mut().enumerate() {
                    if header.trim().is_empty() {
                        *header = generic_header(i + 1);
                    }
                }
            }
            if widest_row > headers.len() {
                fixes.push(TableFix::ExtendedHeaders);
                let start = headers.len() + 1;
                headers.extend((start..=widest_row).map(generic_header));
            }
        }

        let width = headers.len();
        let rows = if self.rows.is_empty() {
            fixes.push(TableFix::MissingRows);
            vec![vec![PLACEHOLDER_CELL.to_string(); width]]
        } else {
            self.rows
                .iter()
                .map(|row| {
                    let mut row = row.clone();
                    row.resize(width, String::new());
                    row
                })
                .collect()
        };

        NormalizedTable {
            headers,
            rows,
            fixes,
        }
    }
}

fn generic_header(index: usize) -> String {
    format!("Column {}", index)
}
