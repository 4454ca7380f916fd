//! Shared string table parsing.

use std::io::Cursor;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::Result;
use crate::common::xml::{decode_cell_text, unescape_xml};

/// Parse `xl/sharedStrings.xml` into an index-addressable table.
///
/// Rich-text runs inside an `<si>` are flattened to their concatenated
/// text. Phonetic runs are skipped.
pub(crate) fn parse_shared_strings(xml: String) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(Cursor::new(xml.into_bytes()));
    let mut buf = Vec::new();
    let mut strings = Vec::new();

    let mut current = String::new();
    let mut in_item = false;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    in_item = true;
                    current.clear();
                },
                b"t" if in_item && !in_phonetic => in_text = true,
                b"rPh" => in_phonetic = true,
                _ => {},
            },
            Event::Text(ref t) => {
                if in_text {
                    let raw = std::str::from_utf8(t).unwrap_or_default();
                    let unescaped = unescape_xml(raw);
                    current.push_str(&decode_cell_text(&unescaped));
                }
            },
            Event::GeneralRef(ref e) => {
                if in_text {
                    super::push_general_ref(&mut current, e);
                }
            },
            Event::CData(ref e) => {
                if in_text {
                    current.push_str(std::str::from_utf8(e).unwrap_or_default());
                }
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                b"si" => {
                    in_item = false;
                    strings.push(std::mem::take(&mut current));
                },
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Vec<String> {
        parse_shared_strings(xml.to_string()).unwrap()
    }

    #[test]
    fn plain_items() {
        let strings = parse(
            r#"<?xml version="1.0"?><sst count="2" uniqueCount="2"><si><t>alpha</t></si><si><t>beta</t></si></sst>"#,
        );
        assert_eq!(strings, vec!["alpha", "beta"]);
    }

    #[test]
    fn rich_runs_flattened() {
        let strings = parse(
            r#"<sst><si><r><t>bold </t></r><r><t>plain</t></r></si></sst>"#,
        );
        assert_eq!(strings, vec!["bold plain"]);
    }

    #[test]
    fn phonetic_runs_skipped() {
        let strings = parse(
            r#"<sst><si><t>漢字</t><rPh sb="0" eb="2"><t>かんじ</t></rPh></si></sst>"#,
        );
        assert_eq!(strings, vec!["漢字"]);
    }

    #[test]
    fn entities_and_control_escapes_decoded() {
        let strings = parse(
            r#"<sst><si><t>a &amp; b</t></si><si><t xml:space="preserve">line_x000B_feed</t></si></sst>"#,
        );
        assert_eq!(strings, vec!["a & b", "line\u{b}feed"]);
    }

    #[test]
    fn empty_item_keeps_its_slot() {
        let strings = parse(r#"<sst><si><t>a</t></si><si><t/></si><si><t>c</t></si></sst>"#);
        assert_eq!(strings, vec!["a", "", "c"]);
    }
}
