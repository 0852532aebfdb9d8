//! Loading of generator configuration (`archgen.toml`) and template documents.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod manifest;
mod template;

pub use error::{Error, Result, SourceContext};
pub use manifest::{
    DEFAULT_MAX_WIDTH, DEFAULT_PACKAGE, GeneratorSection, Language, Manifest, ParseContext,
};
pub use template::{load_template, parse_template_str};
