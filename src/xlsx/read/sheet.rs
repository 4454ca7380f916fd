//! Lazy row iteration over a worksheet part.

use std::io::Cursor;

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::common::xml::{decode_cell_text, unescape_xml};
use crate::common::{Error, Result, cellref, datetime};
use crate::sheet::{Cell, CellValue, Row};

/// How the `t` attribute says a cell's `<v>` is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellType {
    /// No `t` attribute or `t="n"`: a number, or a date when the style says so
    Number,
    /// `t="s"`: index into the shared string table
    Shared,
    /// `t="str"`: cached formula string result
    FormulaString,
    /// `t="inlineStr"`: text inline in an `<is>` block
    Inline,
    /// `t="b"`
    Bool,
    /// `t="d"`: ISO 8601 date text
    IsoDate,
    /// `t="e"`
    Error,
}

/// Streaming iterator over the rows of one worksheet.
///
/// Yields rows in document order as they appear in the part; rows the
/// producer skipped entirely are not resurrected. Empty cells between
/// written cells come back as [`CellValue::Empty`] so column positions
/// are preserved.
pub struct RowIter<'a> {
    reader: Reader<Cursor<Vec<u8>>>,
    buf: Vec<u8>,
    shared: &'a [String],
    date_styles: &'a [bool],
    done: bool,
}

impl<'a> RowIter<'a> {
    pub(crate) fn new(content: String, shared: &'a [String], date_styles: &'a [bool]) -> Self {
        Self {
            reader: Reader::from_reader(Cursor::new(content.into_bytes())),
            buf: Vec::new(),
            shared,
            date_styles,
            done: false,
        }
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        let shared = self.shared;
        let date_styles = self.date_styles;

        let mut cells: Vec<Cell> = Vec::new();
        let mut in_row = false;

        // Per-cell state
        let mut cell_type = CellType::Number;
        let mut cell_col: Option<u32> = None;
        let mut date_style = false;
        let mut value = String::new();
        let mut formula: Option<String> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_text = false;

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"row" => in_row = true,
                    b"c" if in_row => {
                        let (col, ty, style_index) = parse_cell_start(e)?;
                        cell_col = col;
                        cell_type = ty;
                        date_style = date_styles.get(style_index).copied().unwrap_or(false);
                        value.clear();
                        formula = None;
                    },
                    b"v" => in_value = true,
                    b"f" => {
                        in_formula = true;
                        formula = Some(String::new());
                    },
                    b"t" if cell_type == CellType::Inline => in_inline_text = true,
                    _ => {},
                },
                Event::Empty(ref e) => match e.local_name().as_ref() {
                    b"row" => return Ok(Some(Row::empty())),
                    b"c" if in_row => {
                        let (col, _, _) = parse_cell_start(e)?;
                        pad_to_column(&mut cells, col);
                        cells.push(Cell::empty());
                    },
                    _ => {},
                },
                Event::Text(ref t) => {
                    if in_value || in_formula || in_inline_text {
                        let raw = std::str::from_utf8(t).unwrap_or_default();
                        let target = match &mut formula {
                            Some(f) if in_formula => f,
                            _ => &mut value,
                        };
                        target.push_str(&unescape_xml(raw));
                    }
                },
                Event::GeneralRef(ref e) => {
                    if in_value || in_formula || in_inline_text {
                        let target = match &mut formula {
                            Some(f) if in_formula => f,
                            _ => &mut value,
                        };
                        super::push_general_ref(target, e);
                    }
                },
                Event::CData(ref e) => {
                    if in_value || in_formula || in_inline_text {
                        let raw = std::str::from_utf8(e).unwrap_or_default();
                        let target = match &mut formula {
                            Some(f) if in_formula => f,
                            _ => &mut value,
                        };
                        target.push_str(raw);
                    }
                },
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"t" => in_inline_text = false,
                    b"c" if in_row => {
                        pad_to_column(&mut cells, cell_col);
                        let decoded =
                            decode_cell(shared, cell_type, date_style, &value, formula.take())?;
                        cells.push(Cell::new(decoded));
                        cell_type = CellType::Number;
                        cell_col = None;
                        date_style = false;
                        value.clear();
                    },
                    b"row" => return Ok(Some(Row::new(cells))),
                    _ => {},
                },
                Event::Eof => return Ok(None),
                _ => {},
            }
        }
    }
}

impl Iterator for RowIter<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(err) => {
                self.done = true;
                Some(Err(err))
            },
        }
    }
}

/// Pull reference, type and style index off a `<c>` tag.
fn parse_cell_start(e: &BytesStart) -> Result<(Option<u32>, CellType, usize)> {
    let mut col = None;
    let mut cell_type = CellType::Number;
    let mut style_index = 0usize;

    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"r" => {
                let reference = std::str::from_utf8(&attr.value).unwrap_or_default();
                let (c, _) = cellref::parse_cell_ref(reference)?;
                col = Some(c);
            },
            b"t" => {
                cell_type = match attr.value.as_ref() {
                    b"n" => CellType::Number,
                    b"s" => CellType::Shared,
                    b"str" => CellType::FormulaString,
                    b"inlineStr" => CellType::Inline,
                    b"b" => CellType::Bool,
                    b"d" => CellType::IsoDate,
                    b"e" => CellType::Error,
                    other => {
                        return Err(Error::InvalidFormat(format!(
                            "unknown cell type '{}'",
                            String::from_utf8_lossy(other)
                        )));
                    },
                };
            },
            b"s" => {
                style_index = atoi_simd::parse(attr.value.as_ref()).unwrap_or(0);
            },
            _ => {},
        }
    }

    Ok((col, cell_type, style_index))
}

/// Turn collected cell state into a value.
fn decode_cell(
    shared: &[String],
    cell_type: CellType,
    date_style: bool,
    value: &str,
    formula: Option<String>,
) -> Result<CellValue> {
    match cell_type {
        CellType::Shared => {
            let index: usize = atoi_simd::parse(value.as_bytes()).map_err(|_| {
                Error::InvalidFormat(format!("invalid shared string index '{value}'"))
            })?;
            match shared.get(index) {
                Some(text) => Ok(CellValue::Text(text.clone())),
                None => Err(Error::InvalidFormat(format!(
                    "shared string index {index} out of range"
                ))),
            }
        },
        CellType::FormulaString | CellType::Inline => {
            Ok(CellValue::Text(decode_cell_text(value).into_owned()))
        },
        CellType::Bool => match value {
            "1" => Ok(CellValue::Bool(true)),
            "0" => Ok(CellValue::Bool(false)),
            other => Err(Error::InvalidFormat(format!(
                "invalid boolean cell value '{other}'"
            ))),
        },
        CellType::IsoDate => {
            if let Ok(dt) = value.parse::<NaiveDateTime>() {
                Ok(CellValue::DateTime(dt))
            } else if let Ok(date) = value.parse::<NaiveDate>() {
                Ok(CellValue::Date(date))
            } else {
                Ok(CellValue::Text(value.to_string()))
            }
        },
        CellType::Error => Ok(CellValue::Error(value.to_string())),
        CellType::Number => {
            // A formula without a cached value stays a formula.
            if value.is_empty() {
                return Ok(match formula {
                    Some(f) => CellValue::Formula(f),
                    None => CellValue::Empty,
                });
            }
            if let Ok(int_value) = atoi_simd::parse::<i64>(value.as_bytes()) {
                if date_style {
                    return serial_to_date_value(int_value as f64);
                }
                return Ok(CellValue::Int(int_value));
            }
            if let Ok(float_value) = fast_float2::parse::<f64, _>(value) {
                if date_style {
                    return serial_to_date_value(float_value);
                }
                return Ok(CellValue::Float(float_value));
            }
            // Not numeric after all; keep the raw text.
            Ok(CellValue::Text(value.to_string()))
        },
    }
}

/// Insert empty cells so the next push lands at `col` (1-based).
fn pad_to_column(cells: &mut Vec<Cell>, col: Option<u32>) {
    if let Some(col) = col {
        while (cells.len() as u32) < col.saturating_sub(1) {
            cells.push(Cell::empty());
        }
    }
}

/// Map a serial number to a Date or DateTime value.
fn serial_to_date_value(serial: f64) -> Result<CellValue> {
    let out_of_range = || Error::InvalidFormat(format!("date serial {serial} out of range"));
    if serial.fract() == 0.0 {
        let date = datetime::serial_to_date(serial).ok_or_else(out_of_range)?;
        Ok(CellValue::Date(date))
    } else {
        let dt = datetime::serial_to_datetime(serial).ok_or_else(out_of_range)?;
        Ok(CellValue::DateTime(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(sheet_xml: &str, shared: &[String], date_styles: &[bool]) -> Vec<Row> {
        let content = format!(
            r#"<?xml version="1.0"?><worksheet><sheetData>{sheet_xml}</sheetData></worksheet>"#
        );
        RowIter::new(content, shared, date_styles)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn decodes_value_types() {
        let rows = rows_of(
            concat!(
                r#"<row r="1">"#,
                r#"<c r="A1" t="b"><v>1</v></c>"#,
                r#"<c r="B1"><v>42</v></c>"#,
                r#"<c r="C1" t="n"><v>1.5</v></c>"#,
                r#"<c r="D1" t="inlineStr"><is><t>hi</t></is></c>"#,
                r#"<c r="E1" t="e"><v>#NAME?</v></c>"#,
                "</row>"
            ),
            &[],
            &[],
        );
        assert_eq!(rows.len(), 1);
        let cells = &rows[0].cells;
        assert_eq!(cells[0].value, CellValue::Bool(true));
        assert_eq!(cells[1].value, CellValue::Int(42));
        assert_eq!(cells[2].value, CellValue::Float(1.5));
        assert_eq!(cells[3].value, CellValue::Text("hi".to_string()));
        assert_eq!(cells[4].value, CellValue::Error("#NAME?".to_string()));
    }

    #[test]
    fn shared_indices_resolved() {
        let shared = vec!["alpha".to_string(), "beta".to_string()];
        let rows = rows_of(
            r#"<row r="1"><c r="A1" t="s"><v>1</v></c><c r="B1" t="s"><v>0</v></c></row>"#,
            &shared,
            &[],
        );
        assert_eq!(rows[0].cells[0].value, CellValue::Text("beta".to_string()));
        assert_eq!(rows[0].cells[1].value, CellValue::Text("alpha".to_string()));
    }

    #[test]
    fn out_of_range_shared_index_is_an_error() {
        let content = r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>7</v></c></row></sheetData></worksheet>"#;
        let mut iter = RowIter::new(content.to_string(), &[], &[]);
        assert!(matches!(iter.next(), Some(Err(Error::InvalidFormat(_)))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn gaps_padded_with_empty_cells() {
        let rows = rows_of(
            r#"<row r="1"><c r="B1"><v>5</v></c><c r="D1"><v>6</v></c></row>"#,
            &[],
            &[],
        );
        let cells = &rows[0].cells;
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].value, CellValue::Empty);
        assert_eq!(cells[1].value, CellValue::Int(5));
        assert_eq!(cells[2].value, CellValue::Empty);
        assert_eq!(cells[3].value, CellValue::Int(6));
    }

    #[test]
    fn styled_empty_cells_come_back_empty() {
        let rows = rows_of(
            r#"<row r="1"><c r="A1"><v>1</v></c><c r="B1" s="1"/></row>"#,
            &[],
            &[],
        );
        let cells = &rows[0].cells;
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1].value, CellValue::Empty);
    }

    #[test]
    fn date_styles_turn_serials_into_dates() {
        let rows = rows_of(
            r#"<row r="1"><c r="A1" s="1"><v>39448</v></c><c r="B1" s="1"><v>39448.5</v></c><c r="C1"><v>39448</v></c></row>"#,
            &[],
            &[false, true],
        );
        let cells = &rows[0].cells;
        let date = chrono::NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
        assert_eq!(cells[0].value, CellValue::Date(date));
        assert_eq!(
            cells[1].value,
            CellValue::DateTime(date.and_hms_opt(12, 0, 0).unwrap())
        );
        assert_eq!(cells[2].value, CellValue::Int(39448));
    }

    #[test]
    fn iso_date_cells_parsed() {
        let rows = rows_of(
            r#"<row r="1"><c r="A1" t="d"><v>2008-01-01</v></c><c r="B1" t="d"><v>2008-01-01T06:30:00</v></c></row>"#,
            &[],
            &[],
        );
        let date = chrono::NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
        assert_eq!(rows[0].cells[0].value, CellValue::Date(date));
        assert_eq!(
            rows[0].cells[1].value,
            CellValue::DateTime(date.and_hms_opt(6, 30, 0).unwrap())
        );
    }

    #[test]
    fn formulas_without_cached_values_survive() {
        let rows = rows_of(
            r#"<row r="1"><c r="A1"><f>SUM(B1:B9)</f></c><c r="B1"><f>1+1</f><v>2</v></c></row>"#,
            &[],
            &[],
        );
        let cells = &rows[0].cells;
        assert_eq!(cells[0].value, CellValue::Formula("SUM(B1:B9)".to_string()));
        // A cached value wins over its formula.
        assert_eq!(cells[1].value, CellValue::Int(2));
    }

    #[test]
    fn multiple_rows_in_document_order() {
        let rows = rows_of(
            r#"<row r="1"><c r="A1"><v>1</v></c></row><row r="3"><c r="A3"><v>3</v></c></row>"#,
            &[],
            &[],
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells[0].value, CellValue::Int(1));
        assert_eq!(rows[1].cells[0].value, CellValue::Int(3));
    }

    #[test]
    fn inline_text_unescaped_and_decoded() {
        let rows = rows_of(
            r#"<row r="1"><c r="A1" t="inlineStr"><is><t xml:space="preserve">a &amp; b_x000B_c</t></is></c></row>"#,
            &[],
            &[],
        );
        assert_eq!(
            rows[0].cells[0].value,
            CellValue::Text("a & b\u{b}c".to_string())
        );
    }

    #[test]
    fn non_numeric_untyped_value_falls_back_to_text() {
        let rows = rows_of(r#"<row r="1"><c r="A1"><v>12 apples</v></c></row>"#, &[], &[]);
        assert_eq!(
            rows[0].cells[0].value,
            CellValue::Text("12 apples".to_string())
        );
    }

    #[test]
    fn empty_sheet_yields_nothing() {
        let content = r#"<worksheet><sheetData></sheetData></worksheet>"#.to_string();
        let mut iter = RowIter::new(content, &[], &[]);
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }
}
