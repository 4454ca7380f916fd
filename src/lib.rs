//! Longan - A streaming writer and reader for XLSX spreadsheets
//!
//! This library writes XLSX workbooks row by row: each row is serialized and
//! handed to the deflated archive the moment it arrives, so memory use stays
//! flat no matter how many rows a sheet receives. The reading side re-opens
//! workbooks and iterates their rows lazily with typed cell decoding.
//!
//! # Features
//!
//! - **Streaming writes**: rows go straight to the archive, nothing is buffered
//! - **Typed cells**: text, integers, floats, booleans, dates, times, formulas
//! - **Styling**: fonts, fills, borders, alignment, wrapping and number
//!   formats, deduplicated automatically across the workbook
//! - **Shared strings**: optional deduplicating string table for repeated text
//! - **Reader**: lazy row iteration with shared-string resolution and
//!   date-format detection
//! - **Document properties**: title, author, timestamps and friends
//!
//! # Example - Writing a workbook
//!
//! ```no_run
//! use longan::sheet::{Cell, Row};
//! use longan::xlsx::Workbook;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workbook = Workbook::create("report.xlsx")?;
//!
//! let mut sheet = workbook.new_sheet("Summary")?;
//! sheet.write_row(Row::from_values(["region", "total"]))?;
//! sheet.write_row(Row::new(vec![Cell::new("north"), Cell::new(1042)]))?;
//! sheet.finish()?;
//!
//! workbook.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Styled cells
//!
//! ```no_run
//! use longan::sheet::{Cell, Row};
//! use longan::style::{Color, Style};
//! use longan::xlsx::Workbook;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let header = Style::builder()
//!     .bold()
//!     .background_color(Color::new(0xDD, 0xEE, 0xFF))
//!     .build();
//!
//! let mut workbook = Workbook::create("styled.xlsx")?;
//! let mut sheet = workbook.new_sheet("Inventory")?;
//! sheet.write_row(Row::from_values(["item", "count"]).with_style(header))?;
//! sheet.write_row(Row::new(vec![Cell::new("bolts"), Cell::new(412)]))?;
//! sheet.finish()?;
//! workbook.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading rows back
//!
//! ```no_run
//! use longan::xlsx::WorkbookReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reader = WorkbookReader::open("report.xlsx")?;
//!
//! for row in reader.sheet_rows("Summary")? {
//!     let row = row?;
//!     for cell in &row.cells {
//!         print!("{:?} ", cell.value);
//!     }
//!     println!();
//! }
//! # Ok(())
//! # }
//! ```

/// Shared primitives: errors, cell references, serial dates, XML text
/// handling and document properties
pub mod common;

/// Sheet data model: cells, values and rows
pub mod sheet;

/// Cell style descriptors and the style builder
pub mod style;

/// The XLSX document format: streaming writer and reader
pub mod xlsx;

// Re-export commonly used types for convenience
pub use common::{DocumentProperties, Error, Result};
pub use sheet::{Cell, CellValue, Row};
pub use style::{Style, StyleBuilder};
pub use xlsx::{Workbook, WorkbookOptions, WorkbookReader};
