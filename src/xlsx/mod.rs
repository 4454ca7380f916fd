//! XLSX (Office Open XML spreadsheet) support.
//!
//! The write path streams rows into a ZIP container part by part and never
//! buffers a full sheet in memory. The read path opens a finished package
//! and iterates rows lazily. Both share the style, cell and text handling
//! from [`crate::style`], [`crate::sheet`] and [`crate::common`].

// Submodule declarations
pub(crate) mod container;
pub mod read;
pub mod write;

// Re-exports for convenience
pub use read::{RowIter, WorkbookReader};
pub use write::{SheetWriter, Workbook, WorkbookOptions};

/// Highest row count a worksheet can hold.
pub const MAX_ROWS: u32 = 1_048_576;

/// Highest column count a worksheet can hold.
pub const MAX_COLUMNS: u32 = 16_384;
