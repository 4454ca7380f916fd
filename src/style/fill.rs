//! Background fill of a style descriptor.

use serde::{Deserialize, Serialize};

use super::color::Color;

/// Solid background fill.
///
/// Serialized as a solid pattern fill; the mandatory `none` and `gray125`
/// pattern entries of the style table are supplied by the registry, not
/// modeled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fill {
    /// Background color
    pub color: Color,
}

impl Fill {
    /// Create a solid fill with the given color.
    #[inline]
    pub const fn solid(color: Color) -> Self {
        Self { color }
    }
}
