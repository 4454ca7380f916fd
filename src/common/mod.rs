//! Common types and utilities shared across the crate.
//!
//! This module provides the unified error type, cell reference arithmetic,
//! serial date conversions, document properties and XML text utilities used
//! by both the writing and reading paths.

// Submodule declarations
pub mod cellref;
pub mod datetime;
pub mod error;
pub mod metadata;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use metadata::DocumentProperties;
