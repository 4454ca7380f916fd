//! Cell reference arithmetic: column numbers to letters and `A1`-style
//! reference parsing.
//!
//! Columns are 1-based throughout (A = 1, Z = 26, AA = 27), matching how
//! references appear in sheet markup.

use crate::common::error::{Error, Result};
use crate::xlsx::MAX_COLUMNS;

/// Append the letter form of a 1-based column number to `out`.
///
/// Writing into a caller-provided buffer keeps the per-cell hot path free of
/// allocations.
pub fn push_column_letters(out: &mut String, col: u32) {
    // Seven letters cover the entire u32 range
    let mut buf = [0u8; 8];
    let mut n = 0;
    let mut col = col;

    while col > 0 {
        col -= 1;
        buf[n] = b'A' + (col % 26) as u8;
        n += 1;
        col /= 26;
    }

    for i in (0..n).rev() {
        out.push(buf[i] as char);
    }
}

/// Convert a 1-based column number to letters (A=1, B=2, ..., Z=26, AA=27).
///
/// # Examples
///
/// ```
/// use longan::common::cellref::column_to_letters;
/// assert_eq!(column_to_letters(1), "A");
/// assert_eq!(column_to_letters(27), "AA");
/// assert_eq!(column_to_letters(16384), "XFD");
/// ```
pub fn column_to_letters(col: u32) -> String {
    let mut letters = String::new();
    push_column_letters(&mut letters, col);
    letters
}

/// Append a full `A1`-style reference for (1-based) column and row.
pub fn push_cell_ref(out: &mut String, col: u32, row: u32) {
    push_column_letters(out, col);
    let mut itoa_buf = itoa::Buffer::new();
    out.push_str(itoa_buf.format(row));
}

/// Convert an `A1`-style reference to (column, row) coordinates, both 1-based.
///
/// # Examples
///
/// ```
/// use longan::common::cellref::parse_cell_ref;
/// assert_eq!(parse_cell_ref("A1").unwrap(), (1, 1));
/// assert_eq!(parse_cell_ref("AB12").unwrap(), (28, 12));
/// ```
pub fn parse_cell_ref(reference: &str) -> Result<(u32, u32)> {
    let bytes = reference.as_bytes();
    let mut col_str_end = 0;

    // Find where column letters end and row digits begin
    for (i, &byte) in bytes.iter().enumerate() {
        if byte.is_ascii_digit() {
            col_str_end = i;
            break;
        }
    }

    if col_str_end == 0 {
        return Err(Error::InvalidFormat(format!(
            "invalid cell reference: {reference}"
        )));
    }

    // Convert column letters to number (A=1, B=2, ..., Z=26, AA=27, etc.)
    // Checked arithmetic and the column cap keep a hostile reference from
    // overflowing or inflating the padded row downstream.
    let mut col_num = 0u32;
    for &byte in &bytes[..col_str_end] {
        if !byte.is_ascii_alphabetic() {
            return Err(Error::InvalidFormat(format!(
                "invalid column in reference: {reference}"
            )));
        }
        col_num = col_num
            .checked_mul(26)
            .and_then(|n| n.checked_add((byte.to_ascii_uppercase() - b'A' + 1) as u32))
            .filter(|&n| n <= MAX_COLUMNS)
            .ok_or_else(|| {
                Error::InvalidFormat(format!("column out of range in reference: {reference}"))
            })?;
    }

    // Parse the row number using fast integer parsing
    let row_part = &bytes[col_str_end..];
    let row_num = atoi_simd::parse(row_part).map_err(|_| {
        Error::InvalidFormat(format!("invalid row number in reference: {reference}"))
    })?;

    Ok((col_num, row_num))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(column_to_letters(1), "A");
        assert_eq!(column_to_letters(2), "B");
        assert_eq!(column_to_letters(26), "Z");
        assert_eq!(column_to_letters(27), "AA");
        assert_eq!(column_to_letters(52), "AZ");
        assert_eq!(column_to_letters(53), "BA");
        assert_eq!(column_to_letters(702), "ZZ");
        assert_eq!(column_to_letters(703), "AAA");
        assert_eq!(column_to_letters(16384), "XFD");
    }

    #[test]
    fn test_push_cell_ref() {
        let mut buf = String::new();
        push_cell_ref(&mut buf, 3, 7);
        assert_eq!(buf, "C7");
        buf.clear();
        push_cell_ref(&mut buf, 16384, 1_048_576);
        assert_eq!(buf, "XFD1048576");
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1").unwrap(), (1, 1));
        assert_eq!(parse_cell_ref("Z99").unwrap(), (26, 99));
        assert_eq!(parse_cell_ref("AA100").unwrap(), (27, 100));
        assert_eq!(parse_cell_ref("XFD1048576").unwrap(), (16384, 1_048_576));
    }

    #[test]
    fn test_parse_cell_ref_rejects_garbage() {
        assert!(parse_cell_ref("").is_err());
        assert!(parse_cell_ref("123").is_err());
        assert!(parse_cell_ref("ABC").is_err());
        assert!(parse_cell_ref("A1B2").is_err());
    }

    #[test]
    fn test_parse_cell_ref_rejects_columns_past_the_sheet_limit() {
        // XFD (16384) is the last legal column.
        assert!(parse_cell_ref("XFD1").is_ok());
        assert!(matches!(
            parse_cell_ref("XFE1"),
            Err(Error::InvalidFormat(msg)) if msg.contains("column out of range")
        ));
        // Long enough to overflow u32 without checked arithmetic.
        assert!(parse_cell_ref("ZZZZZZZ1").is_err());
    }

    #[test]
    fn test_letters_parse_roundtrip() {
        for col in [1u32, 25, 26, 27, 700, 703, 16_000, 16_384] {
            let reference = format!("{}42", column_to_letters(col));
            assert_eq!(parse_cell_ref(&reference).unwrap(), (col, 42));
        }
    }
}
