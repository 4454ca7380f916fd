//! Shared string table for written workbooks.
//!
//! Interning is optional: inline strings keep writing single-pass and
//! memory-flat, while the shared table shrinks output when the same text
//! repeats across many rows. The table grows while rows stream past and is
//! serialized once at workbook finish, like the style table.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::common::Result;
use crate::common::xml::{escape_cell_text, escape_xml, needs_space_preserve};

/// Deduplicated string table, serialized as `xl/sharedStrings.xml`.
#[derive(Debug, Default)]
pub(crate) struct SharedStrings {
    /// Distinct strings in first-seen order
    strings: Vec<String>,
    /// String -> table index
    lookup: HashMap<String, u32>,
    /// Total number of references interned
    references: u64,
}

impl SharedStrings {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Intern a string and return its table index.
    pub(crate) fn intern(&mut self, text: &str) -> u32 {
        self.references += 1;
        if let Some(&index) = self.lookup.get(text) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.strings.push(text.to_string());
        self.lookup.insert(text.to_string(), index);
        index
    }

    /// Number of distinct strings.
    pub(crate) fn len(&self) -> usize {
        self.strings.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Generate the complete sharedStrings.xml part.
    pub(crate) fn write_table(&self) -> Result<String> {
        let mut xml = String::with_capacity(256 + self.strings.len() * 16);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            self.references,
            self.strings.len()
        )?;
        for text in &self.strings {
            let escaped = escape_cell_text(text);
            if needs_space_preserve(text) {
                write!(
                    xml,
                    r#"<si><t xml:space="preserve">{}</t></si>"#,
                    escape_xml(&escaped)
                )?;
            } else {
                write!(xml, "<si><t>{}</t></si>", escape_xml(&escaped))?;
            }
        }
        xml.push_str("</sst>");
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut strings = SharedStrings::new();
        assert_eq!(strings.intern("north"), 0);
        assert_eq!(strings.intern("south"), 1);
        assert_eq!(strings.intern("north"), 0);
        assert_eq!(strings.len(), 2);
    }

    #[test]
    fn test_table_counts() {
        let mut strings = SharedStrings::new();
        strings.intern("a");
        strings.intern("a");
        strings.intern("b");

        let xml = strings.write_table().unwrap();
        assert!(xml.contains(r#"count="3" uniqueCount="2""#));
        assert!(xml.contains("<si><t>a</t></si>"));
        assert!(xml.contains("<si><t>b</t></si>"));
    }

    #[test]
    fn test_table_escapes_and_preserves_space() {
        let mut strings = SharedStrings::new();
        strings.intern("a < b");
        strings.intern("  padded  ");

        let xml = strings.write_table().unwrap();
        assert!(xml.contains("<si><t>a &lt; b</t></si>"));
        assert!(xml.contains(r#"<si><t xml:space="preserve">  padded  </t></si>"#));
    }
}
