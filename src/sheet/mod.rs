//! Sheet data model: cells, values and rows.
//!
//! These types are the unit of exchange between callers and the streaming
//! writer. A [`Row`] is handed to the writer, serialized immediately and
//! dropped; nothing row-shaped is retained afterwards.

mod cell;
mod row;

pub use cell::{Cell, CellValue};
pub use row::Row;
