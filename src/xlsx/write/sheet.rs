//! Streaming worksheet writer.
//!
//! Rows are serialized into a reused buffer and flushed to the container
//! part immediately; memory use does not grow with row count. The writer
//! borrows the workbook mutably, so only one sheet can receive rows at a
//! time and the borrow ends when the writer goes out of scope after
//! [`SheetWriter::finish`].

use std::fmt;
use std::io::{Seek, Write};

use crate::common::xml::{escape_cell_text, escape_xml, needs_space_preserve};
use crate::common::{Error, Result, cellref, datetime};
use crate::sheet::{CellValue, Row};
use crate::xlsx::write::resolver;
use crate::xlsx::write::strings::SharedStrings;
use crate::xlsx::write::workbook::Workbook;
use crate::xlsx::{MAX_COLUMNS, MAX_ROWS};

/// Writer for one worksheet of a workbook.
///
/// Created by [`Workbook::new_sheet`]. Rows go out in the order they are
/// written; a finished writer rejects further rows. Dropping the writer
/// without calling [`SheetWriter::finish`] leaves the sheet part
/// unterminated and the workbook will refuse to continue.
pub struct SheetWriter<'a, W: Write + Seek> {
    workbook: &'a mut Workbook<W>,
    index: usize,
    /// 1-based number of the next row
    next_row: u32,
    closed: bool,
    /// Reused row serialization buffer
    buf: String,
}

impl<'a, W: Write + Seek> SheetWriter<'a, W> {
    pub(crate) fn new(workbook: &'a mut Workbook<W>, index: usize) -> Self {
        Self {
            workbook,
            index,
            next_row: 1,
            closed: false,
            buf: String::with_capacity(512),
        }
    }

    /// Name of the sheet being written.
    pub fn name(&self) -> &str {
        &self.workbook.sheets[self.index].name
    }

    /// Number of rows written so far.
    pub fn rows_written(&self) -> u32 {
        self.next_row - 1
    }

    /// Serialize one row and append it to the sheet part.
    ///
    /// Cell styles are resolved (wrap text for multiline content, date
    /// formats for bare date cells) and registered as the row streams past.
    /// Empty cells whose effective style is invisible on an empty cell are
    /// omitted from the markup; explicit references keep positions
    /// unambiguous for the remaining cells.
    pub fn write_row(&mut self, row: Row) -> Result<()> {
        if self.closed {
            return Err(Error::SheetClosed(self.name().to_string()));
        }
        let row_num = self.next_row;
        if row_num > MAX_ROWS {
            return Err(Error::RowLimitExceeded {
                sheet: self.name().to_string(),
                row: row_num,
                limit: MAX_ROWS,
            });
        }
        if row.cells.len() > MAX_COLUMNS as usize {
            return Err(Error::ColumnLimitExceeded {
                sheet: self.name().to_string(),
                row: row_num,
                columns: row.cells.len(),
                limit: MAX_COLUMNS,
            });
        }

        let wb = &mut *self.workbook;

        // Row-level resolution happens once; cells without their own style
        // share the registered row style.
        let declared = row.style.as_ref().unwrap_or(&wb.default_style);
        let row_style = resolver::apply_extra_styles(declared, &row.cells);
        let row_id = wb.registry.register(&row_style)?.id;

        self.buf.clear();
        self.buf.push_str("<row r=\"");
        let mut num = itoa::Buffer::new();
        self.buf.push_str(num.format(row_num));
        self.buf.push_str("\">");

        for (i, cell) in row.cells.iter().enumerate() {
            // Cell references are 1-based: the first cell of row 1 is A1.
            let col = i as u32 + 1;

            let style_id = match &cell.style {
                Some(own) => {
                    let wrapped = resolver::apply_extra_styles(own, std::slice::from_ref(cell));
                    let full = resolver::apply_date_format(wrapped.as_ref(), &cell.value);
                    wb.registry.register(full.as_ref())?.id
                },
                None => {
                    let full = resolver::apply_date_format(row_style.as_ref(), &cell.value);
                    match full {
                        std::borrow::Cow::Owned(derived) => wb.registry.register(&derived)?.id,
                        std::borrow::Cow::Borrowed(_) => row_id,
                    }
                },
            };

            // Sparse encoding: an empty cell is only worth writing when its
            // style shows without content.
            if cell.is_empty() && !wb.registry.requires_empty_cell_rendering(style_id)? {
                continue;
            }

            write_cell(
                &mut self.buf,
                wb.shared.as_mut(),
                &cell.value,
                style_id,
                col,
                row_num,
                &wb.sheets[self.index].name,
            )?;
        }

        self.buf.push_str("</row>");
        wb.container.write(self.buf.as_bytes())?;
        self.next_row += 1;
        Ok(())
    }

    /// Write every row of a single-pass sequence, in order.
    pub fn write_rows<I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = Row>,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Close the sheet: write the trailing markup and end the container
    /// part. Idempotent; calls after the first are a no-op.
    pub fn finish(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let wb = &mut *self.workbook;
        wb.container.write(b"</sheetData></worksheet>")?;
        wb.container.end_part()?;
        wb.open_sheet = None;
        self.closed = true;
        Ok(())
    }
}

// The workbook borrow is not itself Debug, so derive is out.
impl<W: Write + Seek> fmt::Debug for SheetWriter<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetWriter")
            .field("name", &self.name())
            .field("next_row", &self.next_row)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// Serialize one cell into the row buffer.
fn write_cell(
    buf: &mut String,
    shared: Option<&mut SharedStrings>,
    value: &CellValue,
    style_id: u32,
    col: u32,
    row_num: u32,
    sheet: &str,
) -> Result<()> {
    buf.push_str("<c r=\"");
    cellref::push_cell_ref(buf, col, row_num);
    buf.push('"');
    if style_id != 0 {
        buf.push_str(" s=\"");
        let mut num = itoa::Buffer::new();
        buf.push_str(num.format(style_id));
        buf.push('"');
    }

    match value {
        CellValue::Empty => buf.push_str("/>"),
        CellValue::Bool(b) => {
            buf.push_str(" t=\"b\"><v>");
            buf.push_str(if *b { "1" } else { "0" });
            buf.push_str("</v></c>");
        },
        CellValue::Int(i) => {
            buf.push_str("><v>");
            let mut num = itoa::Buffer::new();
            buf.push_str(num.format(*i));
            buf.push_str("</v></c>");
        },
        CellValue::Float(f) => {
            push_number(buf, *f, col, row_num, sheet)?;
        },
        CellValue::Text(text) => match shared {
            Some(table) => {
                let index = table.intern(text);
                buf.push_str(" t=\"s\"><v>");
                let mut num = itoa::Buffer::new();
                buf.push_str(num.format(index));
                buf.push_str("</v></c>");
            },
            None => {
                buf.push_str(" t=\"inlineStr\"><is><t");
                if needs_space_preserve(text) {
                    buf.push_str(" xml:space=\"preserve\"");
                }
                buf.push('>');
                let escaped = escape_cell_text(text);
                buf.push_str(&escape_xml(&escaped));
                buf.push_str("</t></is></c>");
            },
        },
        CellValue::Date(date) => {
            // Date serials are whole days.
            buf.push_str("><v>");
            let mut num = itoa::Buffer::new();
            buf.push_str(num.format(datetime::date_to_serial(*date) as i64));
            buf.push_str("</v></c>");
        },
        CellValue::DateTime(dt) => {
            push_number(buf, datetime::datetime_to_serial(*dt), col, row_num, sheet)?;
        },
        CellValue::Formula(formula) => {
            buf.push_str("><f>");
            buf.push_str(&escape_xml(formula));
            buf.push_str("</f></c>");
        },
        CellValue::Error(code) => {
            buf.push_str(" t=\"e\"><v>");
            buf.push_str(&escape_xml(code));
            buf.push_str("</v></c>");
        },
    }
    Ok(())
}

/// Write a numeric `<v>` body, rejecting values the format cannot hold.
fn push_number(buf: &mut String, value: f64, col: u32, row_num: u32, sheet: &str) -> Result<()> {
    if !value.is_finite() {
        let mut cell_ref = String::new();
        cellref::push_cell_ref(&mut cell_ref, col, row_num);
        return Err(Error::InvalidFormat(format!(
            "non-finite number in cell {cell_ref} of sheet '{sheet}'"
        )));
    }
    buf.push_str("><v>");
    let mut num = ryu::Buffer::new();
    buf.push_str(num.format_finite(value));
    buf.push_str("</v></c>");
    Ok(())
}
