//! Validation context and utilities for manifest parsing.

use std::sync::Arc;

use miette::SourceSpan;

use crate::{Error, Result, error::SourceContext};

/// Scalar names accepted besides reference-model class names.
pub(crate) const SCALAR_NAMES: &[&str] = &[
    "text",
    "string",
    "boolean",
    "bool",
    "integer",
    "int",
    "decimal",
    "float",
    "date_time",
    "duration",
    "uri",
];

/// Parsing and validation context that carries source information.
///
/// Carries the source and the current key path through the manifest so
/// nested validation can name where a problem is.
///
/// # Example
///
/// ```ignore
/// let ctx = ParseContext::new(src, "archgen.toml");
/// ctx.push("expand").push("DV_QUANTITY").validate_scalar("units", "text")?;
/// ```
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    /// Source context for error reporting (shared across nested contexts)
    source: Arc<SourceContext>,
    /// Key path segments (e.g., ["expand", "DV_QUANTITY"])
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    /// Create a new parse context with the given source and filename.
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(SourceContext::new(src, filename)),
            path: Vec::new(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        self.source.src()
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut new_path = self.path.clone();
        new_path.push(segment);
        Self {
            source: Arc::clone(&self.source),
            path: new_path,
        }
    }

    /// Get the current path as a dot-separated string.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Dotted path of `key` below the current path.
    pub fn key_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path_string(), key)
        }
    }

    /// Validation error located at a key's assignment, if it can be found.
    pub fn validation_error(&self, message: impl Into<String>, key: &str) -> Box<Error> {
        let message = format!("{}: {}", self.key_path(key), message.into());
        match find_key_span(self.src(), key) {
            Some(span) => self.source.validation_error_at(message, span),
            None => self.source.validation_error(message),
        }
    }

    /// Validate that a base package is a dotted list of identifiers.
    pub fn validate_package(&self, package: &str) -> Result<()> {
        if let Some(reason) = validate_package(package) {
            let message = format!("invalid package '{}': {}", package, reason);
            return Err(match find_value_span(self.src(), package) {
                Some(span) if !package.is_empty() => self.source.validation_error_at(message, span),
                _ => self.validation_error(message, "package"),
            });
        }
        Ok(())
    }

    /// Validate a scalar name assigned to `key`.
    pub fn validate_scalar(&self, key: &str, scalar: &str) -> Result<()> {
        if is_known_scalar(scalar) {
            return Ok(());
        }
        Err(self.source.unknown_scalar_error(
            scalar,
            self.key_path(key),
            find_value_span(self.src(), scalar),
        ))
    }
}

/// Returns true for a known scalar or a reference-model class name.
pub(crate) fn is_known_scalar(name: &str) -> bool {
    if SCALAR_NAMES.contains(&name) {
        return true;
    }
    is_rm_class(name.strip_prefix("rm:").unwrap_or(name))
}

/// Reference-model class names are upper snake case, e.g. `DV_QUANTITY`.
fn is_rm_class(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Returns None if valid, Some(reason) if invalid.
pub(crate) fn validate_package(package: &str) -> Option<&'static str> {
    if package.is_empty() {
        return Some("package cannot be empty");
    }
    for segment in package.split('.') {
        let mut chars = segment.chars();
        match chars.next() {
            None => return Some("package segments cannot be empty"),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            Some(_) => return Some("package segments must start with a letter or underscore"),
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Some("package segments must contain only letters, numbers, and underscores");
        }
    }
    None
}

/// Find the span of a quoted string value in the TOML source.
pub(crate) fn find_value_span(src: &str, value: &str) -> Option<SourceSpan> {
    for quote in ['"', '\''] {
        let pattern = format!("{quote}{value}{quote}");
        if let Some(pos) = src.find(&pattern) {
            // +1 to skip the opening quote
            return Some(SourceSpan::from((pos + 1, value.len())));
        }
    }
    None
}

/// Find the span of a key at the start of a line, e.g. `key = ...`.
pub(crate) fn find_key_span(src: &str, key: &str) -> Option<SourceSpan> {
    let mut offset = 0;
    for line in src.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(SourceSpan::from((offset + indent, key.len())));
        }
        offset += line.len();
    }
    None
}
