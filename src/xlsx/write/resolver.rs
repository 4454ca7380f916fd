//! Content-sensitive style resolution.
//!
//! Callers supply raw content, not rendering hints, so visual correctness
//! rules are applied here as rows stream past: text containing a line break
//! must have wrap-text enabled, or most consumers render it as a single
//! line, and date cells need a date number format, or their serial number
//! shows as a bare integer. Each row is scanned once; styles that already
//! satisfy a rule pass through untouched so re-resolution never derives a
//! new descriptor.

use std::borrow::Cow;

use memchr::memchr2;

use crate::sheet::{Cell, CellValue};
use crate::style::Style;

/// Resolve the declared style against the row's cell values.
///
/// Returns the declared style unchanged unless a text cell contains a line
/// break and the style does not wrap yet; in that case a wrap-enabled copy
/// is derived. Idempotent.
pub(crate) fn apply_extra_styles<'a>(style: &'a Style, cells: &[Cell]) -> Cow<'a, Style> {
    if !style.wrap_text && cells.iter().any(cell_has_line_break) {
        Cow::Owned(style.with_wrap_text(true))
    } else {
        Cow::Borrowed(style)
    }
}

/// Give Date/DateTime cells a number format when their style has none.
///
/// Serial numbers only render as dates through a date format, so a bare
/// style would silently show `39448` instead of a date. Styles that already
/// carry any number format pass through unchanged.
pub(crate) fn apply_date_format<'a>(style: &'a Style, value: &CellValue) -> Cow<'a, Style> {
    use crate::style::NumberFormat;

    if style.number_format.is_some() {
        return Cow::Borrowed(style);
    }
    let format = match value {
        CellValue::Date(_) => NumberFormat::date(),
        CellValue::DateTime(_) => NumberFormat::datetime(),
        _ => return Cow::Borrowed(style),
    };
    let mut derived = style.clone();
    derived.number_format = Some(format);
    Cow::Owned(derived)
}

fn cell_has_line_break(cell: &Cell) -> bool {
    match &cell.value {
        CellValue::Text(text) => memchr2(b'\n', b'\r', text.as_bytes()).is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_forced_for_multiline_content() {
        let style = Style::default();
        assert!(!style.wrap_text);

        let cells = vec![
            Cell::new(12),
            Cell::new("single line"),
            Cell::new("multi\nlines"),
            Cell::empty(),
        ];
        let resolved = apply_extra_styles(&style, &cells);

        assert!(resolved.wrap_text);
        assert!(matches!(resolved, Cow::Owned(_)));
        // The declared style is untouched.
        assert!(!style.wrap_text);
    }

    #[test]
    fn test_wrap_text_noop_when_already_wrapped() {
        let style = Style::builder().wrap_text().build();
        assert!(style.wrap_text);

        let cells = vec![Cell::new("multi\nlines")];
        let resolved = apply_extra_styles(&style, &cells);

        assert!(resolved.wrap_text);
        assert!(matches!(resolved, Cow::Borrowed(_)));
    }

    #[test]
    fn test_single_line_content_passes_through() {
        let style = Style::builder().bold().build();
        let cells = vec![Cell::new("single line"), Cell::new(1.5)];
        let resolved = apply_extra_styles(&style, &cells);

        assert!(!resolved.wrap_text);
        assert!(matches!(resolved, Cow::Borrowed(_)));
    }

    #[test]
    fn test_carriage_return_counts_as_line_break() {
        let style = Style::default();
        let cells = vec![Cell::new("line one\rline two")];
        assert!(apply_extra_styles(&style, &cells).wrap_text);
    }

    #[test]
    fn test_non_text_values_never_trigger_wrapping() {
        let style = Style::default();
        let cells = vec![Cell::new(3.5), Cell::formula("A1&\"\n\"&A2"), Cell::empty()];
        assert!(!apply_extra_styles(&style, &cells).wrap_text);
    }

    #[test]
    fn test_date_cells_get_default_format() {
        use crate::style::NumberFormat;
        use chrono::NaiveDate;

        let plain = Style::default();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

        let derived = apply_date_format(&plain, &CellValue::Date(date));
        assert_eq!(derived.number_format, Some(NumberFormat::date()));
        assert!(matches!(derived, Cow::Owned(_)));

        let derived = apply_date_format(&plain, &CellValue::DateTime(date.and_hms_opt(9, 30, 0).unwrap()));
        assert_eq!(derived.number_format, Some(NumberFormat::datetime()));
    }

    #[test]
    fn test_existing_format_is_not_overridden() {
        use crate::style::NumberFormat;
        use chrono::NaiveDate;

        let formatted = Style::builder()
            .number_format(NumberFormat::new("dd/mm/yyyy"))
            .build();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

        let resolved = apply_date_format(&formatted, &CellValue::Date(date));
        assert!(matches!(resolved, Cow::Borrowed(_)));
        assert_eq!(resolved.number_format, Some(NumberFormat::new("dd/mm/yyyy")));
    }

    #[test]
    fn test_non_date_values_keep_general_format() {
        let plain = Style::default();
        let resolved = apply_date_format(&plain, &CellValue::Float(39448.0));
        assert!(matches!(resolved, Cow::Borrowed(_)));
        assert!(resolved.number_format.is_none());
    }

}
