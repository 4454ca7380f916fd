//! Unified error types for the Longan library.
//!
//! A single error enum covers the whole crate: contract violations of the
//! writer API, I/O and container failures, validation failures raised before
//! any markup is emitted, and parse failures on the reading side.
use thiserror::Error;

/// Main error type for Longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// A style identifier that was never issued by the registry
    #[error("Unknown style id: {0}")]
    UnknownStyleId(u32),

    /// Row pushed to a sheet writer that has already been finalized
    #[error("Sheet '{0}' is already closed")]
    SheetClosed(String),

    /// Workbook finalized (or a new sheet opened) while a sheet writer is
    /// still open
    #[error("Sheet '{0}' is still open")]
    SheetStillOpen(String),

    /// Sheet name already used within the workbook
    #[error("Duplicate sheet name: '{0}'")]
    DuplicateSheetName(String),

    /// Sheet name rejected by the naming rules
    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName {
        /// The rejected name
        name: String,
        /// Which rule was violated
        reason: &'static str,
    },

    /// Sheet row capacity exhausted
    #[error("Sheet '{sheet}' cannot hold row {row}: the format allows at most {limit} rows")]
    RowLimitExceeded {
        /// Sheet being written
        sheet: String,
        /// 1-based index of the rejected row
        row: u32,
        /// Maximum number of rows per sheet
        limit: u32,
    },

    /// Row wider than the sheet column capacity
    #[error("Row {row} of sheet '{sheet}' has {columns} cells: the format allows at most {limit} columns")]
    ColumnLimitExceeded {
        /// Sheet being written
        sheet: String,
        /// 1-based index of the rejected row
        row: u32,
        /// Number of cells in the rejected row
        columns: usize,
        /// Maximum number of columns per row
        limit: u32,
    },

    /// Style attribute outside the range the format can represent
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    /// Malformed or unexpected document content
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Package part not found
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Requested sheet does not exist in the workbook
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Zip(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}

// Markup is assembled in String buffers with `write!`.
impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

/// Result type for Longan operations.
pub type Result<T> = std::result::Result<T, Error>;
