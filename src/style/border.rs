//! Border attributes of a style descriptor.

use serde::{Deserialize, Serialize};

use super::color::Color;

/// Borders for the four sides of a cell.
///
/// A side set to `None` draws nothing; the default value has no visible
/// borders at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Border {
    /// Left border
    pub left: Option<BorderSide>,
    /// Right border
    pub right: Option<BorderSide>,
    /// Top border
    pub top: Option<BorderSide>,
    /// Bottom border
    pub bottom: Option<BorderSide>,
}

impl Border {
    /// Create a border with no visible sides.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same side on all four edges.
    pub fn all(side: BorderSide) -> Self {
        Self {
            left: Some(side.clone()),
            right: Some(side.clone()),
            top: Some(side.clone()),
            bottom: Some(side),
        }
    }

    /// Check if any side is visible.
    #[inline]
    pub fn has_sides(&self) -> bool {
        self.left.is_some() || self.right.is_some() || self.top.is_some() || self.bottom.is_some()
    }
}

/// One visible border side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderSide {
    /// Line style
    pub style: BorderStyle,
    /// Line color; the consumer's automatic color when absent
    pub color: Option<Color>,
}

impl BorderSide {
    /// Create a border side with the given line style and no explicit color.
    #[inline]
    pub const fn new(style: BorderStyle) -> Self {
        Self { style, color: None }
    }

    /// Create a border side with an explicit color.
    #[inline]
    pub const fn colored(style: BorderStyle, color: Color) -> Self {
        Self {
            style,
            color: Some(color),
        }
    }
}

/// Border line styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorderStyle {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderStyle {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Thin => "thin",
            Self::Medium => "medium",
            Self::Thick => "thick",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Double => "double",
            Self::Hair => "hair",
            Self::MediumDashed => "mediumDashed",
            Self::DashDot => "dashDot",
            Self::MediumDashDot => "mediumDashDot",
            Self::DashDotDot => "dashDotDot",
            Self::MediumDashDotDot => "mediumDashDotDot",
            Self::SlantDashDot => "slantDashDot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_sides() {
        assert!(!Border::new().has_sides());
    }

    #[test]
    fn test_single_side_counts() {
        let border = Border {
            bottom: Some(BorderSide::colored(BorderStyle::Thin, Color::GREEN)),
            ..Default::default()
        };
        assert!(border.has_sides());
    }

    #[test]
    fn test_all_sides() {
        let border = Border::all(BorderSide::new(BorderStyle::Medium));
        assert_eq!(border.left, border.right);
        assert_eq!(border.top, border.bottom);
        assert!(border.has_sides());
    }

    #[test]
    fn test_style_keywords() {
        assert_eq!(BorderStyle::Thin.as_str(), "thin");
        assert_eq!(BorderStyle::MediumDashDotDot.as_str(), "mediumDashDotDot");
        assert_eq!(BorderStyle::SlantDashDot.as_str(), "slantDashDot");
    }
}
