//! Core document model for Livepatch spreadsheets
//!
//! This crate defines the full spreadsheet state for one resource:
//! - Grid dimensions and the sparse cell mapping
//! - Row and column header labels
//! - Document metadata (title, stage, date, timestamps)
//! - Structural edit operations (insert/remove/append rows and columns)
//!
//! Documents serialize to the camelCase JSON layout shared with previously
//! cached data, with cell keys in `"row-col"` form.
//!
//! # Example
//!
//! ```rust
//! use livepatch_core::Document;
//!
//! let mut doc = Document::template();
//! doc.set_cell(0, 0, "Main Stage", None);
//! doc.insert_row_at(1);
//! assert_eq!(doc.rows, 11);
//! ```

mod cell;
mod document;
mod error;
mod grid;

pub use cell::{Cell, CellFormat, CellRef};
pub use document::{
    Document, Metadata, DEFAULT_COLS, DEFAULT_ROWS, DEFAULT_STAGE, DEFAULT_TITLE,
};
pub use error::{DocumentError, DocumentResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        // Verify all types are exported
        let _: CellRef = CellRef::new(0, 0);
        let _: Cell = Cell::new("x");
        let _: CellFormat = CellFormat::default();
        let _: Document = Document::template();
    }
}
