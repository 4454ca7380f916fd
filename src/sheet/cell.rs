//! Cell values and styled cells.

use chrono::{NaiveDate, NaiveDateTime};

use crate::style::Style;

/// Types of data that can be stored in a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell
    Empty,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// Text string
    Text(String),
    /// Calendar date, written as a 1900-system serial number
    Date(NaiveDate),
    /// Date and time, written as a 1900-system serial number
    DateTime(NaiveDateTime),
    /// Formula, stored without a cached result
    Formula(String),
    /// Error value (e.g., `#DIV/0!`)
    Error(String),
}

impl CellValue {
    /// Check if the value is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Get the text content, if this is a text value.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric value for numbers, dates and times.
    ///
    /// Dates and times convert to their serial numbers. Text, booleans,
    /// formulas and errors return `None`.
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Date(d) => Some(crate::common::datetime::date_to_serial(*d)),
            Self::DateTime(dt) => Some(crate::common::datetime::datetime_to_serial(*dt)),
            _ => None,
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for CellValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Empty,
        }
    }
}

/// A cell: a value plus an optional style override.
///
/// A cell without a style inherits the row style, or the workbook default
/// when the row has none either.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// The cell value
    pub value: CellValue,
    /// Style override for this cell
    pub style: Option<Style>,
}

impl Cell {
    /// Create an unstyled cell from any convertible value.
    #[inline]
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            style: None,
        }
    }

    /// Create a styled cell.
    #[inline]
    pub fn styled(value: impl Into<CellValue>, style: Style) -> Self {
        Self {
            value: value.into(),
            style: Some(style),
        }
    }

    /// Create an empty cell.
    ///
    /// Empty cells are omitted from the output unless their effective style
    /// is visible on an empty cell (fill or border).
    #[inline]
    pub fn empty() -> Self {
        Self::new(CellValue::Empty)
    }

    /// Create a formula cell.
    #[inline]
    pub fn formula(formula: impl Into<String>) -> Self {
        Self::new(CellValue::Formula(formula.into()))
    }

    /// Check if the cell holds no value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl<T: Into<CellValue>> From<T> for Cell {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::from(12), CellValue::Int(12));
        assert_eq!(CellValue::from(3.5), CellValue::Float(3.5));
        assert_eq!(CellValue::from(true), CellValue::Bool(true));
        assert_eq!(CellValue::from("abc"), CellValue::Text("abc".to_string()));
        assert_eq!(CellValue::from(None::<i64>), CellValue::Empty);
        assert_eq!(CellValue::from(Some("x")), CellValue::Text("x".to_string()));
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(CellValue::Int(5).numeric_value(), Some(5.0));
        assert_eq!(CellValue::Float(0.25).numeric_value(), Some(0.25));
        assert_eq!(CellValue::Text("5".into()).numeric_value(), None);

        let date = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
        assert_eq!(CellValue::Date(date).numeric_value(), Some(39448.0));
    }

    #[test]
    fn test_cell_construction() {
        let plain = Cell::new("hello");
        assert!(plain.style.is_none());
        assert!(!plain.is_empty());

        let styled = Cell::styled(1, Style::builder().bold().build());
        assert!(styled.style.is_some());

        assert!(Cell::empty().is_empty());
        assert_eq!(
            Cell::formula("SUM(A1:A3)").value,
            CellValue::Formula("SUM(A1:A3)".to_string())
        );
    }
}
