//! Core utilities for the archgen type generator.
//!
//! This crate provides the leaf-level building blocks used by the
//! generator: identifier normalization, case conversion, and the
//! reference-model type-resolution oracle.

mod normalize;
mod registry;
mod utils;

// Identifier normalization
pub use normalize::{PLACEHOLDER_LEN, normalize, placeholder, sanitize_leading_digit, try_normalize};
// Type resolution
pub use registry::{ExpandedField, RmTypeRegistry, TypeResolver, resolve_scalar};
// String utilities
pub use utils::{abbreviate, camel_to_snake, to_camel_case, to_upper_snake};
