//! Streaming XLSX reading.
//!
//! [`WorkbookReader`] opens a finished package, loads the sheet list, the
//! shared string table and the style table's date-format classification,
//! then hands out lazy per-sheet row iterators.

// Submodule declarations
mod shared_strings;
mod sheet;
mod styles;
mod workbook;

// Re-exports for convenience
pub use sheet::RowIter;
pub use workbook::WorkbookReader;

/// Resolve a general entity reference to its character.
///
/// Covers the five predefined entities and decimal/hex character
/// references; anything else returns `None` and the caller keeps the
/// reference literally.
pub(crate) fn resolve_general_ref(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = if let Some(hex) =
                digits.strip_prefix('x').or_else(|| digits.strip_prefix('X'))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse().ok()?
            };
            char::from_u32(code)
        },
    }
}

/// Append the resolution of a general reference to `out`.
///
/// Unresolvable references are kept in their literal `&name;` form so no
/// content is lost.
pub(crate) fn push_general_ref(out: &mut String, raw: &[u8]) {
    let name = std::str::from_utf8(raw).unwrap_or_default();
    match resolve_general_ref(name) {
        Some(ch) => out.push(ch),
        None => {
            out.push('&');
            out.push_str(name);
            out.push(';');
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_and_char_refs() {
        assert_eq!(resolve_general_ref("amp"), Some('&'));
        assert_eq!(resolve_general_ref("lt"), Some('<'));
        assert_eq!(resolve_general_ref("quot"), Some('"'));
        assert_eq!(resolve_general_ref("#65"), Some('A'));
        assert_eq!(resolve_general_ref("#x41"), Some('A'));
        assert_eq!(resolve_general_ref("#x1F600"), Some('\u{1F600}'));
        assert_eq!(resolve_general_ref("nbsp"), None);
        assert_eq!(resolve_general_ref("#xZZ"), None);
    }

    #[test]
    fn unknown_refs_kept_literally() {
        let mut out = String::new();
        push_general_ref(&mut out, b"amp");
        push_general_ref(&mut out, b"custom");
        assert_eq!(out, "&&custom;");
    }
}
