use std::borrow::Cow;

use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

// Use LeftmostLongest to ensure longer entities are matched first (e.g., &amp; instead of &lt;)
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("Failed to build XML unescaper")
});

const XML_ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];
const XML_CHARS: [&str; 5] = ["&", "<", ">", "\"", "'"];

/// Escape XML special characters.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping.
///
/// # Examples
///
/// ```
/// use longan::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// assert_eq!(escape_xml("plain"), "plain");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    if XML_ESCAPER.is_match(s) {
        Cow::Owned(XML_ESCAPER.replace_all(s, &XML_ENTITIES))
    } else {
        Cow::Borrowed(s)
    }
}

/// Unescape XML special characters.
///
/// Replaces the five standard XML entities with their corresponding characters.
/// Unknown or malformed entities are left unchanged.
///
/// # Examples
///
/// ```
/// use longan::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&quot;hello&apos;"), "\"hello'");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;"); // &amp; is matched first
/// assert_eq!(unescape_xml("a & b"), "a & b"); // unchanged
/// assert_eq!(unescape_xml("&invalid;"), "&invalid;"); // unknown entity
/// ```
#[inline]
pub fn unescape_xml(s: &str) -> Cow<'_, str> {
    if memchr::memchr(b'&', s.as_bytes()).is_some() {
        Cow::Owned(XML_UNESCAPER.replace_all(s, &XML_CHARS))
    } else {
        Cow::Borrowed(s)
    }
}

/// Control characters that must be encoded in cell text. Tab, line feed and
/// carriage return are legal XML characters and stay as-is.
#[inline]
const fn is_escapable_control(c: u32) -> bool {
    c < 0x20 && !matches!(c, 0x09 | 0x0A | 0x0D)
}

/// Check whether `bytes[at..]` starts with four uppercase hex digits
/// followed by an underscore (the tail of an `_xHHHH_` sequence).
#[inline]
fn is_hex_quad(bytes: &[u8], at: usize) -> bool {
    bytes.len() >= at + 5
        && bytes[at..at + 4]
            .iter()
            .all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'F'))
        && bytes[at + 4] == b'_'
}

/// Position of the next decodable `_xHHHH_` sequence at or after `from`.
fn find_cell_escape(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while let Some(p) = memchr::memchr(b'_', &bytes[i..]) {
        let pos = i + p;
        if bytes.get(pos + 1) == Some(&b'x') && is_hex_quad(bytes, pos + 2) {
            return Some(pos);
        }
        i = pos + 1;
    }
    None
}

/// Encode cell text for storage: control characters outside tab/newline/
/// carriage return become `_xHHHH_`, and literal sequences that already look
/// like `_xHHHH_` get their leading underscore encoded as `_x005F_` so the
/// decoder cannot confuse them with real escapes.
///
/// Entity escaping is a separate concern handled by [`escape_xml`] when the
/// text is placed into markup.
///
/// # Examples
///
/// ```
/// use longan::common::xml::escape_cell_text;
/// assert_eq!(escape_cell_text("a\u{0008}b"), "a_x0008_b");
/// assert_eq!(escape_cell_text("_x0041_"), "_x005F_x0041_");
/// assert_eq!(escape_cell_text("line\nbreaks kept"), "line\nbreaks kept");
/// ```
pub fn escape_cell_text(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let needs_escaping = s.char_indices().any(|(i, c)| {
        is_escapable_control(c as u32)
            || (c == '_' && bytes.get(i + 1) == Some(&b'x') && is_hex_quad(bytes, i + 2))
    });
    if !needs_escaping {
        return Cow::Borrowed(s);
    }

    const HEX: [char; 16] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
    ];
    let mut out = String::with_capacity(s.len() + 8);
    for (i, c) in s.char_indices() {
        let code = c as u32;
        if is_escapable_control(code) {
            out.push_str("_x");
            for shift in [12u32, 8, 4, 0] {
                out.push(HEX[((code >> shift) & 0xF) as usize]);
            }
            out.push('_');
        } else if c == '_' && bytes.get(i + 1) == Some(&b'x') && is_hex_quad(bytes, i + 2) {
            out.push_str("_x005F_");
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Decode `_xHHHH_` sequences produced by [`escape_cell_text`] (or by any
/// other producer of the format) back into characters.
///
/// Underscores protected as `_x005F_` decode to a plain underscore, which
/// restores protected literals without a second pass. Sequences that decode
/// to an invalid scalar value (surrogate range) are left untouched.
///
/// # Examples
///
/// ```
/// use longan::common::xml::decode_cell_text;
/// assert_eq!(decode_cell_text("a_x0008_b"), "a\u{0008}b");
/// assert_eq!(decode_cell_text("_x005F_x0041_"), "_x0041_");
/// assert_eq!(decode_cell_text("_x00zz_"), "_x00zz_"); // not a hex quad
/// ```
pub fn decode_cell_text(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let Some(first) = find_cell_escape(bytes, 0) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut i = first;
    loop {
        let hex = &s[i + 2..i + 6];
        let code = u32::from_str_radix(hex, 16).unwrap_or(u32::MAX);
        match char::from_u32(code) {
            Some(c) => out.push(c),
            // Surrogate code points have no char representation
            None => out.push_str(&s[i..i + 7]),
        }
        i += 7;
        match find_cell_escape(bytes, i) {
            Some(next) => {
                out.push_str(&s[i..next]);
                i = next;
            },
            None => {
                out.push_str(&s[i..]);
                break;
            },
        }
    }
    Cow::Owned(out)
}

/// Whether a text run must carry `xml:space="preserve"` to survive
/// whitespace normalization by XML consumers.
#[inline]
pub fn needs_space_preserve(s: &str) -> bool {
    s.starts_with(|c: char| c == ' ' || c == '\t')
        || s.ends_with(|c: char| c == ' ' || c == '\t')
        || memchr::memchr2(b'\n', b'\r', s.as_bytes()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml_borrows_clean_input() {
        assert!(matches!(escape_xml("no entities here"), Cow::Borrowed(_)));
        assert!(matches!(escape_xml("a < b"), Cow::Owned(_)));
    }

    #[test]
    fn test_escape_unescape_roundtrip() {
        let input = r#"<a href="x">Fish & 'Chips'</a>"#;
        let escaped = escape_xml(input);
        assert_eq!(
            escaped,
            "&lt;a href=&quot;x&quot;&gt;Fish &amp; &apos;Chips&apos;&lt;/a&gt;"
        );
        assert_eq!(unescape_xml(&escaped), input);
    }

    #[test]
    fn test_escape_cell_text_control_chars() {
        assert_eq!(escape_cell_text("ab\u{0000}cd"), "ab_x0000_cd");
        assert_eq!(escape_cell_text("\u{001F}"), "_x001F_");
        // Tab, LF and CR are legal and stay put
        assert_eq!(escape_cell_text("a\tb\nc\rd"), "a\tb\nc\rd");
    }

    #[test]
    fn test_escape_cell_text_protects_literals() {
        assert_eq!(escape_cell_text("_x0041_"), "_x005F_x0041_");
        // Lowercase hex is not an escape sequence, so no protection needed
        assert_eq!(escape_cell_text("_x00ff_"), "_x00ff_");
        // An incomplete sequence is not protected either
        assert_eq!(escape_cell_text("_x004"), "_x004");
    }

    #[test]
    fn test_decode_cell_text() {
        assert_eq!(decode_cell_text("ab_x0000_cd"), "ab\u{0000}cd");
        assert_eq!(decode_cell_text("_x005F_x0041_"), "_x0041_");
        assert_eq!(decode_cell_text("_x0041__x0042_"), "AB");
        assert_eq!(decode_cell_text("plain text"), "plain text");
        // Surrogate range decodes to nothing valid and is preserved
        assert_eq!(decode_cell_text("_xD800_"), "_xD800_");
    }

    #[test]
    fn test_needs_space_preserve() {
        assert!(needs_space_preserve(" leading"));
        assert!(needs_space_preserve("trailing "));
        assert!(needs_space_preserve("\tindent"));
        assert!(needs_space_preserve("two\nlines"));
        assert!(!needs_space_preserve("inner space only"));
    }

    mod props {
        use proptest::prelude::*;

        use super::super::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn prop_entity_roundtrip(s in ".*") {
                let escaped = escape_xml(&s);
                let unescaped = unescape_xml(&escaped);
                prop_assert_eq!(unescaped.as_ref(), s.as_str());
            }

            #[test]
            fn prop_cell_text_roundtrip(s in ".*") {
                let escaped = escape_cell_text(&s);
                let decoded = decode_cell_text(&escaped);
                prop_assert_eq!(decoded.as_ref(), s.as_str());
            }

            #[test]
            fn prop_escaped_cell_text_has_no_bare_controls(s in ".*") {
                let escaped = escape_cell_text(&s);
                prop_assert!(!escaped.chars().any(|c| (c as u32) < 0x20
                    && !matches!(c, '\t' | '\n' | '\r')));
            }
        }
    }
}
