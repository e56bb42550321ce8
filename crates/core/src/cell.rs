//! Cell coordinates, contents and cosmetic formatting

use crate::error::DocumentError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Zero-based cell coordinate, the unique key of the sparse cell mapping
///
/// Serializes as a `"row-col"` string so the cell mapping round-trips as a
/// plain JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    /// Row index
    pub row: u32,
    /// Column index
    pub col: u32,
}

impl CellRef {
    /// Creates a cell reference
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

impl FromStr for CellRef {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once('-')
            .ok_or_else(|| DocumentError::InvalidCellKey(s.to_string()))?;
        let row = row
            .parse()
            .map_err(|_| DocumentError::InvalidCellKey(s.to_string()))?;
        let col = col
            .parse()
            .map_err(|_| DocumentError::InvalidCellKey(s.to_string()))?;
        Ok(Self { row, col })
    }
}

impl Serialize for CellRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

/// Contents of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Text value
    pub value: String,
    /// Cosmetic formatting, absent for plain cells
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<CellFormat>,
}

impl Cell {
    /// Creates a plain cell with the given value
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            formatting: None,
        }
    }

    /// Attaches formatting to the cell
    pub fn with_formatting(mut self, formatting: CellFormat) -> Self {
        self.formatting = Some(formatting);
        self
    }
}

/// Cosmetic style flags for a cell
///
/// Unset flags are omitted from the serialized form to keep cached
/// documents sparse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellFormat {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    /// CSS-style color value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_ref_display() {
        assert_eq!(CellRef::new(4, 1).to_string(), "4-1");
    }

    #[test]
    fn test_cell_ref_parse() {
        let cell_ref: CellRef = "12-3".parse().unwrap();
        assert_eq!(cell_ref, CellRef::new(12, 3));
    }

    #[test]
    fn test_cell_ref_parse_rejects_garbage() {
        assert!("12".parse::<CellRef>().is_err());
        assert!("a-b".parse::<CellRef>().is_err());
        assert!("".parse::<CellRef>().is_err());
    }

    #[test]
    fn test_cell_map_serializes_as_object() {
        use std::collections::HashMap;

        let mut cells = HashMap::new();
        cells.insert(CellRef::new(2, 7), Cell::new("hello"));

        let json = serde_json::to_value(&cells).unwrap();
        assert_eq!(json["2-7"]["value"], "hello");

        let back: HashMap<CellRef, Cell> = serde_json::from_value(json).unwrap();
        assert_eq!(back[&CellRef::new(2, 7)].value, "hello");
    }

    #[test]
    fn test_plain_cell_omits_formatting() {
        let json = serde_json::to_value(Cell::new("x")).unwrap();
        assert!(json.get("formatting").is_none());
    }

    #[test]
    fn test_format_flags_stay_sparse() {
        let format = CellFormat {
            bold: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&format).unwrap();
        assert_eq!(json["bold"], true);
        assert!(json.get("italic").is_none());
        assert!(json.get("color").is_none());
    }
}
