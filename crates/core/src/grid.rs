//! Structural edit operations on the spreadsheet grid
//!
//! Every shifting operation rebuilds the affected sparse mappings in a
//! single pass over fresh maps, so a key is never rewritten twice.

use crate::cell::CellRef;
use crate::document::Document;
use std::collections::HashMap;

impl Document {
    /// Appends a row at the bottom of the grid
    pub fn push_row(&mut self) {
        self.rows += 1;
    }

    /// Appends a column at the right edge of the grid
    pub fn push_column(&mut self) {
        self.cols += 1;
    }

    /// Removes the last row; no-op when only one row remains
    pub fn pop_row(&mut self) -> bool {
        if self.rows <= 1 {
            return false;
        }
        self.rows -= 1;
        let dropped = self.rows;
        self.cells.retain(|cell_ref, _| cell_ref.row < dropped);
        self.row_headers.remove(&dropped);
        true
    }

    /// Removes the last column; no-op when only one column remains
    pub fn pop_column(&mut self) -> bool {
        if self.cols <= 1 {
            return false;
        }
        self.cols -= 1;
        let dropped = self.cols;
        self.cells.retain(|cell_ref, _| cell_ref.col < dropped);
        self.column_headers.remove(&dropped);
        true
    }

    /// Inserts a row at the given index
    ///
    /// Cells and row labels at or below `index` shift down by one; an index
    /// at or past the current row count behaves as an append.
    pub fn insert_row_at(&mut self, index: u32) {
        let mut cells = HashMap::with_capacity(self.cells.len());
        for (cell_ref, cell) in self.cells.drain() {
            let row = if cell_ref.row >= index {
                cell_ref.row + 1
            } else {
                cell_ref.row
            };
            cells.insert(CellRef::new(row, cell_ref.col), cell);
        }
        self.cells = cells;
        self.row_headers = shift_up_from(std::mem::take(&mut self.row_headers), index);
        self.rows += 1;
    }

    /// Inserts a column at the given index
    ///
    /// Cells and column labels at or right of `index` shift right by one;
    /// an index at or past the current column count behaves as an append.
    pub fn insert_column_at(&mut self, index: u32) {
        let mut cells = HashMap::with_capacity(self.cells.len());
        for (cell_ref, cell) in self.cells.drain() {
            let col = if cell_ref.col >= index {
                cell_ref.col + 1
            } else {
                cell_ref.col
            };
            cells.insert(CellRef::new(cell_ref.row, col), cell);
        }
        self.cells = cells;
        self.column_headers = shift_up_from(std::mem::take(&mut self.column_headers), index);
        self.cols += 1;
    }

    /// Removes the row at the given index
    ///
    /// Cells and labels in the row are dropped, later rows shift up.
    /// Rejected (no-op, returns false) when the grid has a single row or
    /// the index is out of range.
    pub fn remove_row_at(&mut self, index: u32) -> bool {
        if self.rows <= 1 || index >= self.rows {
            return false;
        }
        let mut cells = HashMap::with_capacity(self.cells.len());
        for (cell_ref, cell) in self.cells.drain() {
            if cell_ref.row == index {
                continue;
            }
            let row = if cell_ref.row > index {
                cell_ref.row - 1
            } else {
                cell_ref.row
            };
            cells.insert(CellRef::new(row, cell_ref.col), cell);
        }
        self.cells = cells;
        self.row_headers = shift_down_from(std::mem::take(&mut self.row_headers), index);
        self.rows -= 1;
        true
    }

    /// Removes the column at the given index
    ///
    /// Cells and labels in the column are dropped, later columns shift
    /// left. Rejected (no-op, returns false) when the grid has a single
    /// column or the index is out of range.
    pub fn remove_column_at(&mut self, index: u32) -> bool {
        if self.cols <= 1 || index >= self.cols {
            return false;
        }
        let mut cells = HashMap::with_capacity(self.cells.len());
        for (cell_ref, cell) in self.cells.drain() {
            if cell_ref.col == index {
                continue;
            }
            let col = if cell_ref.col > index {
                cell_ref.col - 1
            } else {
                cell_ref.col
            };
            cells.insert(CellRef::new(cell_ref.row, col), cell);
        }
        self.cells = cells;
        self.column_headers = shift_down_from(std::mem::take(&mut self.column_headers), index);
        self.cols -= 1;
        true
    }
}

/// Shifts header labels at or above `index` up by one slot
fn shift_up_from(headers: HashMap<u32, String>, index: u32) -> HashMap<u32, String> {
    headers
        .into_iter()
        .map(|(i, label)| if i >= index { (i + 1, label) } else { (i, label) })
        .collect()
}

/// Drops the label at `index` and shifts later labels down by one slot
fn shift_down_from(headers: HashMap<u32, String>, index: u32) -> HashMap<u32, String> {
    headers
        .into_iter()
        .filter(|(i, _)| *i != index)
        .map(|(i, label)| if i > index { (i - 1, label) } else { (i, label) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn grid_with(cells: &[(u32, u32)]) -> Document {
        let mut doc = Document::template();
        for &(row, col) in cells {
            doc.set_cell(row, col, format!("{row}-{col}"), None);
        }
        doc
    }

    #[test]
    fn test_insert_row_shifts_cells_and_headers() {
        // 5-row grid, cell at (4, 1), headers around the insertion point
        let mut doc = grid_with(&[(4, 1)]);
        doc.rows = 5;
        doc.set_row_header(2, "before");
        doc.set_row_header(3, "at");
        doc.set_row_header(4, "after");

        // Insert after index 2, i.e. at index 3
        doc.insert_row_at(3);

        assert_eq!(doc.rows, 6);
        assert!(doc.cell(4, 1).is_none());
        assert_eq!(doc.cell(5, 1).unwrap().value, "4-1");
        assert_eq!(doc.row_header(2), Some("before"));
        assert_eq!(doc.row_header(4), Some("at"));
        assert_eq!(doc.row_header(5), Some("after"));
        assert_eq!(doc.row_header(3), None);
    }

    #[test]
    fn test_insert_then_remove_round_trips() {
        let mut doc = grid_with(&[(0, 0), (2, 3), (7, 9)]);
        doc.set_row_header(2, "two");
        doc.set_row_header(7, "seven");
        let original = doc.clone();

        doc.insert_row_at(3);
        assert!(doc.remove_row_at(3));

        assert_eq!(doc.rows, original.rows);
        assert_eq!(doc.cells, original.cells);
        assert_eq!(doc.row_headers, original.row_headers);
    }

    #[test]
    fn test_insert_column_round_trips() {
        let mut doc = grid_with(&[(1, 0), (1, 4), (5, 5)]);
        doc.set_column_header(4, "slot");
        let original = doc.clone();

        doc.insert_column_at(2);
        assert!(doc.remove_column_at(2));

        assert_eq!(doc.cols, original.cols);
        assert_eq!(doc.cells, original.cells);
        assert_eq!(doc.column_headers, original.column_headers);
    }

    #[test]
    fn test_insert_column_never_collides() {
        // Dense 10x10 grid: shifting must keep every cell distinct
        let coords: Vec<(u32, u32)> = (0..10).flat_map(|r| (0..10).map(move |c| (r, c))).collect();
        let mut doc = grid_with(&coords);

        doc.insert_column_at(4);

        assert_eq!(doc.cells.len(), 100);
        for (cell_ref, cell) in &doc.cells {
            let expected_col = if cell_ref.col > 4 { cell_ref.col - 1 } else { cell_ref.col };
            assert_eq!(cell.value, format!("{}-{}", cell_ref.row, expected_col));
        }
    }

    #[test]
    fn test_remove_row_drops_and_shifts() {
        let mut doc = grid_with(&[(1, 0), (2, 0), (3, 0)]);
        doc.set_row_header(2, "gone");
        doc.set_row_header(3, "stays");

        assert!(doc.remove_row_at(2));

        assert_eq!(doc.rows, 9);
        assert_eq!(doc.cell(1, 0).unwrap().value, "1-0");
        assert_eq!(doc.cell(2, 0).unwrap().value, "3-0");
        assert!(doc.cell(3, 0).is_none());
        assert_eq!(doc.row_header(2), Some("stays"));
    }

    #[test]
    fn test_remove_row_rejects_out_of_range() {
        let mut doc = Document::template();
        assert!(!doc.remove_row_at(10));
        assert_eq!(doc.rows, 10);
    }

    #[test]
    fn test_pop_column_stops_at_floor() {
        let mut doc = Document::template();
        for _ in 0..9 {
            assert!(doc.pop_column());
        }
        assert_eq!(doc.cols, 1);
        // Tenth call is a no-op at the floor of one column
        assert!(!doc.pop_column());
        assert_eq!(doc.cols, 1);
    }

    #[test]
    fn test_pop_row_drops_last_row_contents() {
        let mut doc = grid_with(&[(9, 2), (0, 0)]);
        doc.set_row_header(9, "last");

        assert!(doc.pop_row());

        assert_eq!(doc.rows, 9);
        assert!(doc.cell(9, 2).is_none());
        assert_eq!(doc.cell(0, 0).unwrap().value, "0-0");
        assert_eq!(doc.row_header(9), None);
    }

    #[test]
    fn test_push_row_and_column_leave_keys_untouched() {
        let mut doc = grid_with(&[(3, 3)]);
        doc.set_row_header(3, "act");
        doc.push_row();
        doc.push_column();

        assert_eq!(doc.rows, 11);
        assert_eq!(doc.cols, 11);
        assert_eq!(doc.cell(3, 3), Some(&Cell::new("3-3")));
        assert_eq!(doc.row_header(3), Some("act"));
    }

    #[test]
    fn test_insert_past_end_behaves_as_append() {
        let mut doc = grid_with(&[(2, 2)]);
        doc.insert_row_at(doc.rows);
        assert_eq!(doc.rows, 11);
        assert_eq!(doc.cell(2, 2).unwrap().value, "2-2");
    }
}
