//! Font attributes of a style descriptor.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::color::Color;

/// Font attributes.
///
/// `None` values inherit the document defaults at serialization time. The
/// all-default font therefore means "no font override".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Font {
    /// Font name/family (e.g., "Calibri", "Arial")
    pub name: Option<String>,
    /// Font size in points
    pub size: Option<f64>,
    /// Bold flag
    pub bold: bool,
    /// Italic flag
    pub italic: bool,
    /// Underline style
    pub underline: Option<Underline>,
    /// Strike-through flag
    pub strikethrough: bool,
    /// Font color
    pub color: Option<Color>,
}

impl Font {
    /// Create a new default font.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the font overrides anything over the document default.
    #[inline]
    pub fn has_formatting(&self) -> bool {
        self.name.is_some()
            || self.size.is_some()
            || self.bold
            || self.italic
            || self.underline.is_some()
            || self.strikethrough
            || self.color.is_some()
    }
}

// Equality and hashing compare the size bit-exactly so the descriptor can
// serve as a deduplication key.
impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.size.map(f64::to_bits) == other.size.map(f64::to_bits)
            && self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.strikethrough == other.strikethrough
            && self.color == other.color
    }
}

impl Eq for Font {}

impl Hash for Font {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.map(f64::to_bits).hash(state);
        self.bold.hash(state);
        self.italic.hash(state);
        self.underline.hash(state);
        self.strikethrough.hash(state);
        self.color.hash(state);
    }
}

/// Underline styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Underline {
    Single,
    Double,
}

impl Underline {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of(font: &Font) -> u64 {
        let mut hasher = DefaultHasher::new();
        font.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_default_has_no_formatting() {
        assert!(!Font::new().has_formatting());
        assert!(
            Font {
                bold: true,
                ..Default::default()
            }
            .has_formatting()
        );
    }

    #[test]
    fn test_size_compared_bit_exactly() {
        let a = Font {
            size: Some(11.0),
            ..Default::default()
        };
        let b = Font {
            size: Some(11.0),
            ..Default::default()
        };
        let c = Font {
            size: Some(11.5),
            ..Default::default()
        };
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn test_underline_keywords() {
        assert_eq!(Underline::Single.as_str(), "single");
        assert_eq!(Underline::Double.as_str(), "double");
    }
}
