//! Full spreadsheet state for one resource

use crate::cell::{Cell, CellFormat, CellRef};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Grid dimensions of the default template
pub const DEFAULT_ROWS: u32 = 10;
/// Grid dimensions of the default template
pub const DEFAULT_COLS: u32 = 10;
/// Title of the default template
pub const DEFAULT_TITLE: &str = "Untitled Spreadsheet";
/// Stage label of the default template
pub const DEFAULT_STAGE: &str = "Draft";

/// Document metadata block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Document title
    pub title: String,
    /// Free-text stage label
    pub stage: String,
    /// Event date
    pub date: NaiveDate,
    /// Creation timestamp
    pub created: DateTime<Utc>,
    /// Refreshed on every write that reaches the queue or the remote store
    pub last_modified: DateTime<Utc>,
}

impl Metadata {
    /// Creates metadata for a fresh document with the given title
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            title: title.into(),
            stage: DEFAULT_STAGE.to_string(),
            date: now.date_naive(),
            created: now,
            last_modified: now,
        }
    }
}

/// Full spreadsheet state for one resource id
///
/// Cells and header labels are sparse mappings; absent entries render as
/// empty. The serialized layout is camelCase JSON with `"row-col"` cell
/// keys, compatible with previously cached documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Row count, always at least 1
    pub rows: u32,
    /// Column count, always at least 1
    pub cols: u32,
    /// Sparse mapping from coordinate to cell contents
    #[serde(default)]
    pub cells: HashMap<CellRef, Cell>,
    /// Sparse mapping from row index to row label
    #[serde(default)]
    pub row_headers: HashMap<u32, String>,
    /// Sparse mapping from column index to column label
    #[serde(default)]
    pub column_headers: HashMap<u32, String>,
    /// Metadata block
    pub metadata: Metadata,
}

impl Document {
    /// Creates the default template document
    pub fn template() -> Self {
        Self::titled(DEFAULT_TITLE)
    }

    /// Creates a default template document with the given title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            cells: HashMap::new(),
            row_headers: HashMap::new(),
            column_headers: HashMap::new(),
            metadata: Metadata::new(title),
        }
    }

    /// Refreshes the last-modified timestamp
    pub fn touch(&mut self) {
        self.metadata.last_modified = Utc::now();
    }

    /// Returns the cell at the given coordinate, if set
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&CellRef::new(row, col))
    }

    /// Sets the value and formatting of one cell
    pub fn set_cell(
        &mut self,
        row: u32,
        col: u32,
        value: impl Into<String>,
        formatting: Option<CellFormat>,
    ) {
        self.cells.insert(
            CellRef::new(row, col),
            Cell {
                value: value.into(),
                formatting,
            },
        );
    }

    /// Returns the label of the given row, if set
    pub fn row_header(&self, row: u32) -> Option<&str> {
        self.row_headers.get(&row).map(String::as_str)
    }

    /// Sets the label of the given row
    pub fn set_row_header(&mut self, row: u32, label: impl Into<String>) {
        self.row_headers.insert(row, label.into());
    }

    /// Returns the label of the given column, if set
    pub fn column_header(&self, col: u32) -> Option<&str> {
        self.column_headers.get(&col).map(String::as_str)
    }

    /// Sets the label of the given column
    pub fn set_column_header(&mut self, col: u32, label: impl Into<String>) {
        self.column_headers.insert(col, label.into());
    }

    /// Renames the document
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.metadata.title = title.into();
        self.touch();
    }

    /// Updates the stage label
    pub fn set_stage(&mut self, stage: impl Into<String>) {
        self.metadata.stage = stage.into();
        self.touch();
    }

    /// Updates the event date
    pub fn set_date(&mut self, date: NaiveDate) {
        self.metadata.date = date;
        self.touch();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::template()
    }
}
