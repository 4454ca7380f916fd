//! Compile-time XML template minification.
//!
//! OPC packages carry a handful of fixed XML parts whose templates read best
//! indented in source but should ship as a single line. These macros run the
//! minifier once at compile time, so runtime code only ever sees the
//! collapsed form.

use std::collections::HashMap;

use proc_macro::{Spacing, TokenStream, TokenTree};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quote::quote;

/// Minify an XML string literal at compile time.
///
/// Comments and processing instructions are dropped, whitespace between
/// elements is removed, text content is trimmed, and `<tag></tag>` pairs
/// collapse to `<tag/>`. The XML declaration is kept. Expands to a
/// `&'static str`.
///
/// ```ignore
/// const RELS: &str = minified_xml_str!(r#"
///     <?xml version="1.0"?>
///     <Relationships>
///         <Relationship Id="rId1" Target="xl/workbook.xml"/>
///     </Relationships>
/// "#);
/// ```
#[proc_macro]
pub fn minified_xml_str(input: TokenStream) -> TokenStream {
    let trees: Vec<TokenTree> = input.into_iter().collect();
    if trees.len() != 1 {
        panic!("minified_xml_str! takes exactly one string literal");
    }
    let minified = minify(&literal_text(&trees[0]));
    TokenStream::from(quote! { #minified })
}

/// Minify an XML template and splice `format!`-style arguments into it.
///
/// Placeholders follow `format!`: `{}` for the next positional argument,
/// `{0}` for an indexed one, `{name}` for a named one, `{{`/`}}` for literal
/// braces. The template is minified at compile time; the expansion builds a
/// `String` sized to the static parts and writes each argument through its
/// `Display` impl.
///
/// ```ignore
/// let part = minified_xml_format!(
///     r#"
///     <?xml version="1.0"?>
///     <Properties>
///         <Application>{}</Application>
///     </Properties>
///     "#,
///     app_name
/// );
/// ```
#[proc_macro]
pub fn minified_xml_format(input: TokenStream) -> TokenStream {
    let trees: Vec<TokenTree> = input.into_iter().collect();
    if trees.is_empty() {
        panic!("minified_xml_format! requires a template string");
    }

    // Placeholder braces would confuse the XML parser, so each placeholder
    // is swapped for a plain-text slot marker and swapped back after the
    // minifier has run.
    let template = literal_text(&trees[0]);
    let (shielded, slots) = shield_args(&template);
    let minified = unshield_args(&minify(&shielded), &slots);

    let (positional, named) = split_args(&trees[1..]);
    expand(&split_segments(&minified), &positional, &named)
}

/// Text of a string-literal token, raw or cooked.
fn literal_text(tree: &TokenTree) -> String {
    let TokenTree::Literal(lit) = tree else {
        panic!("expected a string literal template");
    };
    let repr = lit.to_string();
    let open = repr.find('"').expect("template must be a string literal");
    let close = repr.rfind('"').expect("template must be a string literal");
    if open >= close {
        panic!("template must be a string literal");
    }
    let body = &repr[open + 1..close];
    if repr.starts_with('r') {
        body.to_string()
    } else {
        body.replace("\\\"", "\"")
            .replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace("\\t", "\t")
            .replace("\\\\", "\\")
    }
}

/// Replace `{...}` placeholders with slot markers, collecting the originals.
///
/// Escaped `{{` and `}}` pass through untouched.
fn shield_args(template: &str) -> (String, Vec<String>) {
    let mut shielded = String::with_capacity(template.len());
    let mut slots = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                shielded.push_str("{{");
            },
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                shielded.push_str("}}");
            },
            '{' => {
                let mut placeholder = String::from('{');
                loop {
                    match chars.next() {
                        Some('}') => {
                            placeholder.push('}');
                            break;
                        },
                        Some(inner) => placeholder.push(inner),
                        None => panic!("unclosed placeholder in template"),
                    }
                }
                shielded.push_str(&slot_marker(slots.len()));
                slots.push(placeholder);
            },
            other => shielded.push(other),
        }
    }
    (shielded, slots)
}

/// Put the collected placeholders back in place of their slot markers.
fn unshield_args(minified: &str, slots: &[String]) -> String {
    let mut restored = minified.to_string();
    for (index, placeholder) in slots.iter().enumerate() {
        restored = restored.replace(&slot_marker(index), placeholder);
    }
    restored
}

fn slot_marker(index: usize) -> String {
    format!("xmf-slot-{index}-tols-fmx")
}

/// One piece of the minified template.
#[derive(Debug)]
enum Segment {
    /// Literal text to append as-is
    Lit(String),
    /// An argument to write through `Display`
    Arg(ArgRef),
}

#[derive(Debug)]
enum ArgRef {
    /// `{}`
    Auto,
    /// `{0}`, `{1}`, ...
    Index(usize),
    /// `{name}`
    Named(String),
}

/// Split the restored template into literal runs and argument references.
fn split_segments(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut lit = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                lit.push('{');
            },
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                lit.push('}');
            },
            '{' => {
                if !lit.is_empty() {
                    segments.push(Segment::Lit(std::mem::take(&mut lit)));
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(inner) => name.push(inner),
                        None => panic!("unclosed placeholder in template"),
                    }
                }
                let arg = if name.is_empty() {
                    ArgRef::Auto
                } else if name.bytes().all(|b| b.is_ascii_digit()) {
                    ArgRef::Index(name.parse().expect("placeholder index out of range"))
                } else {
                    ArgRef::Named(name)
                };
                segments.push(Segment::Arg(arg));
            },
            '}' => panic!("unmatched '}}' in template"),
            other => lit.push(other),
        }
    }
    if !lit.is_empty() {
        segments.push(Segment::Lit(lit));
    }
    segments
}

/// Split the argument tokens on top-level commas into positional expressions
/// and `name = value` pairs, each rendered back to source text.
fn split_args(trees: &[TokenTree]) -> (Vec<String>, HashMap<String, String>) {
    let mut positional = Vec::new();
    let mut named = HashMap::new();

    let mut i = 0;
    // Leading comma after the template string.
    if matches!(trees.first(), Some(TokenTree::Punct(p)) if p.as_char() == ',') {
        i = 1;
    }

    while i < trees.len() {
        // `name = value`, but not `==`, which starts an expression.
        let name = match (trees.get(i), trees.get(i + 1)) {
            (Some(TokenTree::Ident(ident)), Some(TokenTree::Punct(p)))
                if p.as_char() == '=' && p.spacing() == Spacing::Alone =>
            {
                i += 2;
                Some(ident.to_string())
            },
            _ => None,
        };

        let mut expr = String::new();
        while i < trees.len() {
            if let TokenTree::Punct(p) = &trees[i] {
                if p.as_char() == ',' {
                    i += 1;
                    break;
                }
            }
            expr.push_str(&trees[i].to_string());
            i += 1;
        }
        if expr.is_empty() {
            continue;
        }
        match name {
            Some(name) => {
                named.insert(name, expr);
            },
            None => positional.push(expr),
        }
    }
    (positional, named)
}

/// Generate the `String`-building expansion.
fn expand(
    segments: &[Segment],
    positional: &[String],
    named: &HashMap<String, String>,
) -> TokenStream {
    let fixed: usize = segments
        .iter()
        .map(|segment| match segment {
            Segment::Lit(text) => text.len(),
            Segment::Arg(_) => 0,
        })
        .sum();

    let mut src = format!(
        "{{ let mut __xml = ::std::string::String::with_capacity({});",
        fixed + 64
    );
    let mut auto = 0usize;
    for segment in segments {
        match segment {
            Segment::Lit(text) => {
                src.push_str(&format!("__xml.push_str({text:?});"));
            },
            Segment::Arg(arg) => {
                let expr = match arg {
                    ArgRef::Auto => {
                        let expr = positional
                            .get(auto)
                            .unwrap_or_else(|| panic!("missing positional argument {auto}"));
                        auto += 1;
                        expr
                    },
                    ArgRef::Index(index) => positional
                        .get(*index)
                        .unwrap_or_else(|| panic!("missing positional argument {index}")),
                    ArgRef::Named(name) => named
                        .get(name)
                        .unwrap_or_else(|| panic!("missing named argument '{name}'")),
                };
                src.push_str(&format!(
                    "{{ use ::std::fmt::Write as _; \
                     let _ = ::std::write!(__xml, \"{{}}\", {expr}); }}"
                ));
            },
        }
    }
    src.push_str("__xml }");
    src.parse().expect("generated expansion failed to parse")
}

/// Collapse an XML document to a single line.
///
/// Start tags are held back until content forces them open, so element
/// pairs with nothing between them become self-closing. Comments and
/// processing instructions are dropped; the declaration, DOCTYPE, CDATA
/// and entity references pass through.
fn minify(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut out = Vec::with_capacity(xml.len());
    let mut pending: Vec<BytesStart<'static>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Err(err) => panic!("invalid XML template: {err}"),
            Ok(Event::Eof) => break,
            Ok(Event::Decl(e)) => {
                out.extend_from_slice(b"<?");
                out.extend_from_slice(e.as_ref());
                out.extend_from_slice(b"?>");
            },
            Ok(Event::DocType(e)) => {
                out.extend_from_slice(b"<!DOCTYPE ");
                out.extend_from_slice(e.as_ref());
                out.push(b'>');
            },
            Ok(Event::Comment(_)) | Ok(Event::PI(_)) => {},
            Ok(Event::Start(e)) => pending.push(e.to_owned()),
            Ok(Event::Empty(e)) => {
                open_pending(&mut out, &mut pending);
                write_tag(&mut out, &e, true);
            },
            Ok(Event::End(e)) => {
                match pending.pop() {
                    Some(start) if start.name() == e.name() => {
                        // Nothing was written between the pair.
                        open_pending(&mut out, &mut pending);
                        write_tag(&mut out, &start, true);
                    },
                    Some(start) => {
                        pending.push(start);
                        open_pending(&mut out, &mut pending);
                        write_end_tag(&mut out, e.name().as_ref());
                    },
                    None => write_end_tag(&mut out, e.name().as_ref()),
                }
            },
            Ok(Event::Text(e)) => {
                let text = e.as_ref().trim_ascii();
                if !text.is_empty() {
                    open_pending(&mut out, &mut pending);
                    out.extend_from_slice(text);
                }
            },
            Ok(Event::CData(e)) => {
                open_pending(&mut out, &mut pending);
                out.extend_from_slice(b"<![CDATA[");
                out.extend_from_slice(e.as_ref());
                out.extend_from_slice(b"]]>");
            },
            Ok(Event::GeneralRef(e)) => {
                open_pending(&mut out, &mut pending);
                out.push(b'&');
                out.extend_from_slice(e.as_ref());
                out.push(b';');
            },
        }
        buf.clear();
    }

    open_pending(&mut out, &mut pending);
    String::from_utf8(out).expect("minified XML is not UTF-8")
}

/// Write the held-back start tags in document order.
fn open_pending(out: &mut Vec<u8>, pending: &mut Vec<BytesStart<'static>>) {
    for tag in pending.drain(..) {
        write_tag(out, &tag, false);
    }
}

fn write_tag(out: &mut Vec<u8>, tag: &BytesStart, self_close: bool) {
    out.push(b'<');
    out.extend_from_slice(tag.name().as_ref());
    for attr in tag.attributes() {
        let attr = attr.expect("invalid attribute in XML template");
        out.push(b' ');
        out.extend_from_slice(attr.key.as_ref());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(&attr.value);
        out.push(b'"');
    }
    if self_close {
        out.extend_from_slice(b"/>");
    } else {
        out.push(b'>');
    }
}

fn write_end_tag(out: &mut Vec<u8>, name: &[u8]) {
    out.extend_from_slice(b"</");
    out.extend_from_slice(name);
    out.push(b'>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_and_comments_removed() {
        let minified = minify(
            r#"
            <root>
                <!-- dropped -->
                <child attr="value">
                    text content
                </child>
            </root>
        "#,
        );
        assert_eq!(
            minified,
            r#"<root><child attr="value">text content</child></root>"#
        );
    }

    #[test]
    fn empty_pairs_collapse() {
        assert_eq!(minify("<root><empty></empty></root>"), "<root><empty/></root>");
        assert_eq!(
            minify("<a><b><c></c></b></a>"),
            "<a><b><c/></b></a>"
        );
    }

    #[test]
    fn declaration_kept() {
        let minified = minify(r#"<?xml version="1.0" encoding="UTF-8"?>  <root/>"#);
        assert_eq!(minified, r#"<?xml version="1.0" encoding="UTF-8"?><root/>"#);
    }

    #[test]
    fn cdata_and_entities_pass_through() {
        assert_eq!(
            minify("<r><![CDATA[a < b]]></r>"),
            "<r><![CDATA[a < b]]></r>"
        );
        assert_eq!(minify("<r>a &amp; b</r>"), "<r>a &amp; b</r>");
    }

    #[test]
    fn attributes_survive_minification() {
        let minified = minify(
            r#"
            <Relationship Id="rId1"
                          Target="xl/workbook.xml"/>
        "#,
        );
        assert_eq!(
            minified,
            r#"<Relationship Id="rId1" Target="xl/workbook.xml"/>"#
        );
    }

    #[test]
    fn shield_and_unshield_are_inverse() {
        let template = "<r><a>{}</a><b>{title}</b><c>{{lit}}</c></r>";
        let (shielded, slots) = shield_args(template);
        assert!(!shielded.contains("{}"));
        assert!(!shielded.contains("{title}"));
        assert_eq!(slots, vec!["{}", "{title}"]);
        assert_eq!(unshield_args(&shielded, &slots), template);
    }

    #[test]
    fn segments_split_on_placeholders() {
        let segments = split_segments("<r><a>{}</a><b>{2}</b><c>{id}</c></r>");
        assert_eq!(segments.len(), 7);
        assert!(matches!(&segments[0], Segment::Lit(s) if s == "<r><a>"));
        assert!(matches!(&segments[1], Segment::Arg(ArgRef::Auto)));
        assert!(matches!(&segments[3], Segment::Arg(ArgRef::Index(2))));
        assert!(matches!(&segments[5], Segment::Arg(ArgRef::Named(n)) if n == "id"));
        assert!(matches!(&segments[6], Segment::Lit(s) if s == "</c></r>"));
    }

    #[test]
    fn escaped_braces_stay_literal() {
        let segments = split_segments("a {{b}} c");
        assert_eq!(segments.len(), 1);
        assert!(matches!(&segments[0], Segment::Lit(s) if s == "a {b} c"));
    }

    #[test]
    fn format_placeholders_survive_minification() {
        let template = r#"
            <Properties>
                <Application>{}</Application>
                <Pages>{count}</Pages>
            </Properties>
        "#;
        let (shielded, slots) = shield_args(template);
        let minified = unshield_args(&minify(&shielded), &slots);
        assert_eq!(
            minified,
            "<Properties><Application>{}</Application><Pages>{count}</Pages></Properties>"
        );
    }
}
