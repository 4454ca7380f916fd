//! XML text utilities shared by the writing and reading paths.

// Submodule declarations
pub mod escape;

// Re-exports for convenience
pub use escape::{
    decode_cell_text, escape_cell_text, escape_xml, needs_space_preserve, unescape_xml,
};
