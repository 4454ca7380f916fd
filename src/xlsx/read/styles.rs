//! Style table parsing for date detection.
//!
//! The reader does not reconstruct full styles; the only thing row decoding
//! needs from `xl/styles.xml` is which cell formats render serial numbers
//! as dates.

use std::collections::HashMap;
use std::io::Cursor;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::common::Result;
use crate::common::xml::unescape_xml;
use crate::style::number_format::{builtin_format_code, is_date_format};

/// Parse `xl/styles.xml` into a per-`cellXfs`-entry date flag.
///
/// The returned vector is indexed by the `s` attribute of cell markup.
pub(crate) fn parse_date_styles(xml: String) -> Result<Vec<bool>> {
    let mut reader = Reader::from_reader(Cursor::new(xml.into_bytes()));
    let mut buf = Vec::new();

    let mut custom_formats: HashMap<u32, String> = HashMap::new();
    let mut date_styles = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"numFmt" => {
                    if let Some((id, code)) = parse_num_fmt(e)? {
                        custom_formats.insert(id, code);
                    }
                },
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    let id = parse_num_fmt_id(e)?;
                    date_styles.push(is_date_style(id, &custom_formats));
                },
                _ => {},
            },
            Event::End(ref e) => {
                if e.local_name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(date_styles)
}

fn is_date_style(num_fmt_id: u32, custom_formats: &HashMap<u32, String>) -> bool {
    if let Some(code) = custom_formats.get(&num_fmt_id) {
        return is_date_format(code);
    }
    builtin_format_code(num_fmt_id).is_some_and(is_date_format)
}

fn parse_num_fmt(e: &BytesStart) -> Result<Option<(u32, String)>> {
    let mut id = None;
    let mut code = None;
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"numFmtId" => id = atoi_simd::parse(&attr.value).ok(),
            b"formatCode" => {
                let raw = std::str::from_utf8(&attr.value).unwrap_or_default();
                code = Some(unescape_xml(raw).into_owned());
            },
            _ => {},
        }
    }
    Ok(match (id, code) {
        (Some(id), Some(code)) => Some((id, code)),
        _ => None,
    })
}

fn parse_num_fmt_id(e: &BytesStart) -> Result<u32> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"numFmtId" {
            return Ok(atoi_simd::parse(&attr.value).unwrap_or(0));
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_cell_xfs() {
        let xml = r#"<styleSheet>
            <numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts>
            <cellStyleXfs count="1"><xf numFmtId="164" fontId="0"/></cellStyleXfs>
            <cellXfs count="4">
                <xf numFmtId="0" fontId="0"/>
                <xf numFmtId="164" fontId="0" applyNumberFormat="1"/>
                <xf numFmtId="14" fontId="0"/>
                <xf numFmtId="2" fontId="0"/>
            </cellXfs>
        </styleSheet>"#;
        let flags = parse_date_styles(xml.to_string()).unwrap();
        // cellStyleXfs entries are not counted; only cellXfs order matters.
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn xf_with_alignment_child_still_counted() {
        let xml = r#"<styleSheet><cellXfs count="2">
            <xf numFmtId="0"><alignment wrapText="1"/></xf>
            <xf numFmtId="22"/>
        </cellXfs></styleSheet>"#;
        let flags = parse_date_styles(xml.to_string()).unwrap();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn missing_sections_yield_empty() {
        let flags = parse_date_styles("<styleSheet/>".to_string()).unwrap();
        assert!(flags.is_empty());
    }

    #[test]
    fn escaped_format_codes_unescaped_before_classification() {
        let xml = r#"<styleSheet>
            <numFmts count="1"><numFmt numFmtId="165" formatCode="&quot;on &quot;yyyy-mm-dd"/></numFmts>
            <cellXfs count="1"><xf numFmtId="165"/></cellXfs>
        </styleSheet>"#;
        let flags = parse_date_styles(xml.to_string()).unwrap();
        assert_eq!(flags, vec![true]);
    }
}
