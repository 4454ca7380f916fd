//! Rows of cells.

use crate::style::Style;

use super::cell::Cell;

/// A row of cells with an optional row-level style.
///
/// The row style applies to every cell that does not carry its own style
/// override. Rows are written and forgotten; the writer never buffers more
/// than the row currently being serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// The cells of this row, left to right
    pub cells: Vec<Cell>,
    /// Style applied to cells without their own
    pub style: Option<Style>,
}

impl Row {
    /// Create a row from pre-built cells.
    #[inline]
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells, style: None }
    }

    /// Create an empty row.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a row by converting each value into an unstyled cell.
    ///
    /// ```rust
    /// use longan::sheet::Row;
    ///
    /// let row = Row::from_values(["north", "south", "east"]);
    /// assert_eq!(row.cells.len(), 3);
    /// ```
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cell>,
    {
        Self::new(values.into_iter().map(Into::into).collect())
    }

    /// Attach a row-level style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Append a cell.
    #[inline]
    pub fn push(&mut self, cell: impl Into<Cell>) {
        self.cells.push(cell.into());
    }

    /// Number of cells in the row.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<T: Into<Cell>> FromIterator<T> for Row {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}
