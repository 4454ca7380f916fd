//! Style registration and styles.xml generation.
//!
//! The registry assigns each distinct style descriptor a dense identifier:
//! the workbook default takes 0 at construction and every newly seen
//! descriptor takes the next integer. Cells reference these identifiers in
//! their `s=` attribute, so the identifier space and the `cellXfs` table are
//! the same thing. Registration happens while rows stream past; the table is
//! serialized exactly once, after the last sheet has finished, because an
//! earlier serialization would miss identifiers still to be handed out.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::common::xml::escape_xml;
use crate::common::{Error, Result};
use crate::style::number_format::FIRST_CUSTOM_FORMAT_ID;
use crate::style::{
    Border, BorderSide, Color, Fill, Font, RegisteredStyle, Style, Underline, DEFAULT_FONT_NAME,
    DEFAULT_FONT_SIZE,
};

/// Largest font size in points the format accepts.
const MAX_FONT_SIZE: f64 = 409.0;

/// Longest number format code the format accepts.
const MAX_FORMAT_CODE_LEN: usize = 255;

/// Content-addressed style table.
///
/// Registration deduplicates by structural equality and is idempotent:
/// registering an already-known descriptor returns the identifier assigned
/// the first time. Identifiers are stable for the life of the workbook.
pub(crate) struct StyleRegistry {
    /// Registered descriptors, indexed by identifier
    styles: Vec<Style>,
    /// Descriptor -> identifier lookup
    lookup: HashMap<Style, u32>,
    /// Identifier -> "style is visible on an empty cell"
    empty_render: Vec<bool>,
}

impl StyleRegistry {
    /// Create a registry with `default_style` pre-registered as identifier 0.
    pub(crate) fn new(default_style: Style) -> Result<Self> {
        let mut registry = Self {
            styles: Vec::new(),
            lookup: HashMap::new(),
            empty_render: Vec::new(),
        };
        registry.register(&default_style)?;
        Ok(registry)
    }

    /// Register a descriptor and return it with its identifier.
    ///
    /// A descriptor equal to an already-registered one reuses the existing
    /// identifier. Validation runs before admission, so a rejected
    /// descriptor leaves the registry unchanged.
    pub(crate) fn register(&mut self, style: &Style) -> Result<RegisteredStyle> {
        if let Some(&id) = self.lookup.get(style) {
            return Ok(RegisteredStyle {
                id,
                style: style.clone(),
            });
        }

        validate(style)?;

        let id = self.styles.len() as u32;
        self.styles.push(style.clone());
        self.lookup.insert(style.clone(), id);
        self.empty_render.push(style.has_fill() || style.has_border());

        Ok(RegisteredStyle {
            id,
            style: style.clone(),
        })
    }

    /// Check if the identified style must be written even for empty cells.
    ///
    /// True iff the descriptor has a fill or any border side; fonts and
    /// alignment are invisible without content. Unknown identifiers are a
    /// caller bug.
    pub(crate) fn requires_empty_cell_rendering(&self, id: u32) -> Result<bool> {
        self.empty_render
            .get(id as usize)
            .copied()
            .ok_or(Error::UnknownStyleId(id))
    }

    /// Number of registered styles (the default included).
    pub(crate) fn len(&self) -> usize {
        self.styles.len()
    }

    /// Generate the complete styles.xml part.
    ///
    /// Deduplicated component tables are built here, in identifier order, so
    /// that the table layout depends only on the sequence of registrations.
    /// Reachable only from the workbook's finish path.
    pub(crate) fn write_stylesheet(&self) -> Result<String> {
        // Component tables. Fill slots 0 and 1 are reserved by the format
        // for the `none` and `gray125` patterns; solid fills start at 2.
        let mut fonts: Vec<&Font> = Vec::new();
        let mut font_ids: HashMap<&Font, usize> = HashMap::new();
        let mut fills: Vec<&Fill> = Vec::new();
        let mut fill_ids: HashMap<&Fill, usize> = HashMap::new();
        let mut borders: Vec<&Border> = Vec::new();
        let mut border_ids: HashMap<&Border, usize> = HashMap::new();
        let mut formats: Vec<&str> = Vec::new();
        let mut format_ids: HashMap<&str, u32> = HashMap::new();

        struct Xf {
            font_id: usize,
            fill_id: usize,
            border_id: usize,
            num_fmt_id: u32,
        }

        let xfs: Vec<Xf> = self
            .styles
            .iter()
            .map(|style| {
                let font_id = *font_ids.entry(&style.font).or_insert_with(|| {
                    fonts.push(&style.font);
                    fonts.len() - 1
                });
                let fill_id = match &style.fill {
                    Some(fill) => *fill_ids.entry(fill).or_insert_with(|| {
                        fills.push(fill);
                        fills.len() + 1
                    }),
                    None => 0,
                };
                let border_id = *border_ids.entry(&style.border).or_insert_with(|| {
                    borders.push(&style.border);
                    borders.len() - 1
                });
                let num_fmt_id = match &style.number_format {
                    Some(format) => *format_ids.entry(format.code()).or_insert_with(|| {
                        formats.push(format.code());
                        FIRST_CUSTOM_FORMAT_ID + (formats.len() as u32 - 1)
                    }),
                    None => 0,
                };
                Xf {
                    font_id,
                    fill_id,
                    border_id,
                    num_fmt_id,
                }
            })
            .collect();

        let mut xml = String::with_capacity(4096);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !formats.is_empty() {
            write!(xml, r#"<numFmts count="{}">"#, formats.len())?;
            for (i, code) in formats.iter().enumerate() {
                write!(
                    xml,
                    r#"<numFmt numFmtId="{}" formatCode="{}"/>"#,
                    FIRST_CUSTOM_FORMAT_ID + i as u32,
                    escape_xml(code)
                )?;
            }
            xml.push_str("</numFmts>");
        }

        write!(xml, r#"<fonts count="{}">"#, fonts.len())?;
        for font in &fonts {
            write_font(&mut xml, font)?;
        }
        xml.push_str("</fonts>");

        write!(xml, r#"<fills count="{}">"#, fills.len() + 2)?;
        xml.push_str(r#"<fill><patternFill patternType="none"/></fill>"#);
        xml.push_str(r#"<fill><patternFill patternType="gray125"/></fill>"#);
        for fill in &fills {
            write_fill(&mut xml, fill)?;
        }
        xml.push_str("</fills>");

        write!(xml, r#"<borders count="{}">"#, borders.len())?;
        for border in &borders {
            write_border(&mut xml, border)?;
        }
        xml.push_str("</borders>");

        xml.push_str(
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
        );

        write!(xml, r#"<cellXfs count="{}">"#, xfs.len())?;
        for (xf, style) in xfs.iter().zip(&self.styles) {
            write!(
                xml,
                r#"<xf numFmtId="{}" fontId="{}" fillId="{}" borderId="{}""#,
                xf.num_fmt_id, xf.font_id, xf.fill_id, xf.border_id
            )?;
            if xf.font_id != 0 {
                xml.push_str(r#" applyFont="1""#);
            }
            if xf.fill_id != 0 {
                xml.push_str(r#" applyFill="1""#);
            }
            if xf.border_id != 0 {
                xml.push_str(r#" applyBorder="1""#);
            }
            if xf.num_fmt_id != 0 {
                xml.push_str(r#" applyNumberFormat="1""#);
            }
            if style.has_alignment() {
                xml.push_str(r#" applyAlignment="1">"#);
                write_alignment(&mut xml, style)?;
                xml.push_str("</xf>");
            } else {
                xml.push_str("/>");
            }
        }
        xml.push_str("</cellXfs>");

        xml.push_str(
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
        );
        xml.push_str("</styleSheet>");

        Ok(xml)
    }
}

/// Validate descriptor attributes against the format's legal ranges.
fn validate(style: &Style) -> Result<()> {
    if let Some(size) = style.font.size {
        if !size.is_finite() || size <= 0.0 || size > MAX_FONT_SIZE {
            return Err(Error::InvalidStyle(format!(
                "font size {size} is outside the legal range (0, {MAX_FONT_SIZE}]"
            )));
        }
    }
    if let Some(format) = &style.number_format {
        if format.code().is_empty() {
            return Err(Error::InvalidStyle(
                "number format code must not be empty".to_string(),
            ));
        }
        if format.code().len() > MAX_FORMAT_CODE_LEN {
            return Err(Error::InvalidStyle(format!(
                "number format code exceeds {MAX_FORMAT_CODE_LEN} characters"
            )));
        }
    }
    Ok(())
}

fn write_font(xml: &mut String, font: &Font) -> Result<()> {
    xml.push_str("<font>");
    if font.bold {
        xml.push_str("<b/>");
    }
    if font.italic {
        xml.push_str("<i/>");
    }
    if let Some(underline) = font.underline {
        match underline {
            Underline::Single => xml.push_str("<u/>"),
            Underline::Double => write!(xml, r#"<u val="{}"/>"#, underline.as_str())?,
        }
    }
    if font.strikethrough {
        xml.push_str("<strike/>");
    }
    write!(xml, r#"<sz val="{}"/>"#, font.size.unwrap_or(DEFAULT_FONT_SIZE))?;
    if let Some(color) = font.color {
        write_color(xml, color)?;
    }
    write!(
        xml,
        r#"<name val="{}"/>"#,
        escape_xml(font.name.as_deref().unwrap_or(DEFAULT_FONT_NAME))
    )?;
    xml.push_str("</font>");
    Ok(())
}

fn write_fill(xml: &mut String, fill: &Fill) -> Result<()> {
    write!(
        xml,
        r#"<fill><patternFill patternType="solid"><fgColor rgb="{}"/></patternFill></fill>"#,
        fill.color.to_argb()
    )?;
    Ok(())
}

fn write_border(xml: &mut String, border: &Border) -> Result<()> {
    xml.push_str("<border>");
    write_border_side(xml, "left", border.left.as_ref())?;
    write_border_side(xml, "right", border.right.as_ref())?;
    write_border_side(xml, "top", border.top.as_ref())?;
    write_border_side(xml, "bottom", border.bottom.as_ref())?;
    xml.push_str("<diagonal/>");
    xml.push_str("</border>");
    Ok(())
}

fn write_border_side(xml: &mut String, side: &str, border_side: Option<&BorderSide>) -> Result<()> {
    match border_side {
        Some(bs) => {
            write!(xml, r#"<{} style="{}">"#, side, bs.style.as_str())?;
            if let Some(color) = bs.color {
                write_color(xml, color)?;
            }
            write!(xml, "</{side}>")?;
        },
        None => write!(xml, "<{side}/>")?,
    }
    Ok(())
}

fn write_color(xml: &mut String, color: Color) -> Result<()> {
    write!(xml, r#"<color rgb="{}"/>"#, color.to_argb())?;
    Ok(())
}

fn write_alignment(xml: &mut String, style: &Style) -> Result<()> {
    xml.push_str("<alignment");
    if let Some(horizontal) = style.horizontal_align {
        write!(xml, r#" horizontal="{}""#, horizontal.as_str())?;
    }
    if let Some(vertical) = style.vertical_align {
        write!(xml, r#" vertical="{}""#, vertical.as_str())?;
    }
    if style.wrap_text {
        xml.push_str(r#" wrapText="1""#);
    }
    xml.push_str("/>");
    Ok(())
}
