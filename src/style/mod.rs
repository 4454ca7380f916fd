//! Cell styles for spreadsheet writing and reading.
//!
//! A [`Style`] is an immutable value describing every formatting aspect of a
//! cell: font, background fill, borders, alignment, text wrapping and number
//! format. Styles are plain data; they carry no identifier. The workbook's
//! style registry assigns identifiers at registration time and deduplicates
//! structurally equal descriptors, so building the same style twice costs one
//! table entry, not two.
//!
//! # Architecture
//!
//! - `color`: RGB color values
//! - `font`: font attributes
//! - `fill`: solid background fills
//! - `border`: per-side borders and line styles
//! - `alignment`: horizontal/vertical alignment keywords
//! - `number_format`: format codes, built-in table, date detection
//!
//! # Example
//!
//! ```rust
//! use longan::style::{BorderSide, BorderStyle, Color, Style};
//!
//! let header = Style::builder()
//!     .bold()
//!     .font_size(14.0)
//!     .background_color(Color::new(0xDD, 0xEE, 0xFF))
//!     .build();
//!
//! let footer = header.with_wrap_text(true);
//! assert!(!header.wrap_text);
//! assert!(footer.wrap_text);
//! ```

mod alignment;
mod border;
mod color;
mod fill;
mod font;
pub(crate) mod number_format;

pub use alignment::{HorizontalAlignment, VerticalAlignment};
pub use border::{Border, BorderSide, BorderStyle};
pub use color::Color;
pub use fill::Fill;
pub use font::{Font, Underline};
pub use number_format::{NumberFormat, is_date_format};

use serde::{Deserialize, Serialize};

/// Font name emitted when a style does not override it.
pub(crate) const DEFAULT_FONT_NAME: &str = "Calibri";

/// Font size in points emitted when a style does not override it.
pub(crate) const DEFAULT_FONT_SIZE: f64 = 11.0;

/// An immutable cell style descriptor.
///
/// Equality and hashing are structural, which makes the descriptor usable as
/// a deduplication key. All derivations (for example [`Style::with_wrap_text`])
/// return a new value and leave the original untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    /// Font attributes
    pub font: Font,
    /// Solid background fill, if any
    pub fill: Option<Fill>,
    /// Cell borders
    pub border: Border,
    /// Horizontal alignment override
    pub horizontal_align: Option<HorizontalAlignment>,
    /// Vertical alignment override
    pub vertical_align: Option<VerticalAlignment>,
    /// Wrap cell text at line breaks
    pub wrap_text: bool,
    /// Number format; `General` when absent
    pub number_format: Option<NumberFormat>,
}

impl Style {
    /// Create a style with no formatting at all.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a style.
    #[inline]
    pub fn builder() -> StyleBuilder {
        StyleBuilder::new()
    }

    /// Derive a copy of this style with the wrap-text flag set to `wrap`.
    ///
    /// Returns a new value; `self` is unchanged.
    pub fn with_wrap_text(&self, wrap: bool) -> Self {
        let mut derived = self.clone();
        derived.wrap_text = wrap;
        derived
    }

    /// Check if this style sets a background fill.
    #[inline]
    pub fn has_fill(&self) -> bool {
        self.fill.is_some()
    }

    /// Check if this style draws any border side.
    #[inline]
    pub fn has_border(&self) -> bool {
        self.border.has_sides()
    }

    /// Check if alignment settings need an `<alignment>` record.
    pub(crate) fn has_alignment(&self) -> bool {
        self.wrap_text || self.horizontal_align.is_some() || self.vertical_align.is_some()
    }
}

/// Builder for [`Style`] values.
///
/// # Example
///
/// ```rust
/// use longan::style::{NumberFormat, Style};
///
/// let style = Style::builder()
///     .font_name("Courier New")
///     .italic()
///     .number_format(NumberFormat::two_decimals())
///     .build();
/// assert!(style.font.italic);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StyleBuilder {
    style: Style,
}

impl StyleBuilder {
    /// Create a builder starting from the unformatted style.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font name.
    pub fn font_name(mut self, name: impl Into<String>) -> Self {
        self.style.font.name = Some(name.into());
        self
    }

    /// Set the font size in points.
    pub fn font_size(mut self, size: f64) -> Self {
        self.style.font.size = Some(size);
        self
    }

    /// Make the font bold.
    pub fn bold(mut self) -> Self {
        self.style.font.bold = true;
        self
    }

    /// Make the font italic.
    pub fn italic(mut self) -> Self {
        self.style.font.italic = true;
        self
    }

    /// Underline the font with a single line.
    pub fn underline(mut self) -> Self {
        self.style.font.underline = Some(Underline::Single);
        self
    }

    /// Underline the font with the given style.
    pub fn underline_style(mut self, underline: Underline) -> Self {
        self.style.font.underline = Some(underline);
        self
    }

    /// Strike the font through.
    pub fn strikethrough(mut self) -> Self {
        self.style.font.strikethrough = true;
        self
    }

    /// Set the font color.
    pub fn font_color(mut self, color: Color) -> Self {
        self.style.font.color = Some(color);
        self
    }

    /// Set a solid background fill.
    pub fn background_color(mut self, color: Color) -> Self {
        self.style.fill = Some(Fill::solid(color));
        self
    }

    /// Set the cell borders.
    pub fn border(mut self, border: Border) -> Self {
        self.style.border = border;
        self
    }

    /// Set the horizontal alignment.
    pub fn horizontal_align(mut self, align: HorizontalAlignment) -> Self {
        self.style.horizontal_align = Some(align);
        self
    }

    /// Set the vertical alignment.
    pub fn vertical_align(mut self, align: VerticalAlignment) -> Self {
        self.style.vertical_align = Some(align);
        self
    }

    /// Wrap cell text at line breaks.
    pub fn wrap_text(mut self) -> Self {
        self.style.wrap_text = true;
        self
    }

    /// Set the number format.
    pub fn number_format(mut self, format: NumberFormat) -> Self {
        self.style.number_format = Some(format);
        self
    }

    /// Finish building.
    #[inline]
    pub fn build(self) -> Style {
        self.style
    }
}

/// A style descriptor together with the identifier the registry assigned it.
///
/// Identifiers are dense and stable: the workbook default is 0 and each newly
/// seen descriptor takes the next integer. Registering a structurally equal
/// descriptor again returns the existing identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredStyle {
    /// Identifier within the workbook's style table
    pub id: u32,
    /// The registered descriptor
    pub style: Style,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_all_attributes() {
        let style = Style::builder()
            .font_name("Courier New")
            .font_size(10.5)
            .bold()
            .italic()
            .underline()
            .strikethrough()
            .font_color(Color::RED)
            .background_color(Color::YELLOW)
            .border(Border::all(BorderSide::new(BorderStyle::Thin)))
            .horizontal_align(HorizontalAlignment::Center)
            .vertical_align(VerticalAlignment::Top)
            .wrap_text()
            .number_format(NumberFormat::percent())
            .build();

        assert_eq!(style.font.name.as_deref(), Some("Courier New"));
        assert_eq!(style.font.size, Some(10.5));
        assert!(style.font.bold && style.font.italic && style.font.strikethrough);
        assert_eq!(style.font.underline, Some(Underline::Single));
        assert_eq!(style.font.color, Some(Color::RED));
        assert_eq!(style.fill, Some(Fill::solid(Color::YELLOW)));
        assert!(style.has_border());
        assert_eq!(style.horizontal_align, Some(HorizontalAlignment::Center));
        assert_eq!(style.vertical_align, Some(VerticalAlignment::Top));
        assert!(style.wrap_text);
        assert_eq!(style.number_format, Some(NumberFormat::percent()));
    }

    #[test]
    fn test_equal_builds_are_equal() {
        let a = Style::builder().bold().background_color(Color::BLUE).build();
        let b = Style::builder().bold().background_color(Color::BLUE).build();
        assert_eq!(a, b);
    }

    #[test]
    fn test_with_wrap_text_derives_new_value() {
        let base = Style::builder().bold().build();
        let wrapped = base.with_wrap_text(true);

        assert!(!base.wrap_text);
        assert!(wrapped.wrap_text);
        assert_eq!(wrapped.font, base.font);
        assert_ne!(base, wrapped);

        // Already-set flag stays set, value unchanged.
        let again = wrapped.with_wrap_text(true);
        assert_eq!(again, wrapped);
    }

    #[test]
    fn test_default_style_is_plain() {
        let style = Style::new();
        assert!(!style.font.has_formatting());
        assert!(!style.has_fill());
        assert!(!style.has_border());
        assert!(!style.has_alignment());
        assert!(style.number_format.is_none());
    }
}
