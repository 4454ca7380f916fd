//! Streaming XLSX writing.
//!
//! [`Workbook`] owns the output container and the style registry,
//! [`SheetWriter`] streams rows into one worksheet part at a time. Rows are
//! serialized and flushed as they arrive; only the style table, the shared
//! string table and the package manifest wait for [`Workbook::finish`].

// Submodule declarations
mod resolver;
mod sheet;
mod strings;
mod styles;
mod workbook;

// Re-exports for convenience
pub use sheet::SheetWriter;
pub use workbook::{Workbook, WorkbookOptions};
