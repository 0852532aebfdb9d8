use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest and template loading (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the source content and filename, reducing parameter passing
/// in error factory functions.
///
/// # Example
///
/// ```ignore
/// let ctx = SourceContext::new(content, "archgen.toml");
/// ctx.validation_error("package cannot be empty");
/// ctx.unknown_scalar_error("decimel", "types.DV_PROPORTION", span);
/// ```
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a template error from a JSON error.
    ///
    /// serde_json reports 1-based line/column positions; these are mapped
    /// back to a byte offset in the source.
    pub fn template_error(&self, source: serde_json::Error) -> Box<Error> {
        let span = byte_offset(&self.src, source.line(), source.column())
            .map(|offset| SourceSpan::from((offset, 0)));
        Box::new(Error::Template {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error without a span.
    pub fn validation_error(&self, message: impl Into<String>) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: None,
            message: message.into(),
        })
    }

    /// Create a validation error with a span.
    pub fn validation_error_at(
        &self,
        message: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: Some(span.into()),
            message: message.into(),
        })
    }

    /// Create an unknown scalar error.
    pub fn unknown_scalar_error(
        &self,
        name: impl Into<String>,
        context: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::UnknownScalar {
            src: self.named_source(),
            span,
            name: name.into(),
            context: context.into(),
        })
    }
}

/// Byte offset of a 1-based line/column position.
fn byte_offset(src: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let line_text = src[line_start..].lines().next().unwrap_or("");
    let within: usize = line_text
        .chars()
        .take(column.saturating_sub(1))
        .map(char::len_utf8)
        .sum();
    Some((line_start + within).min(src.len()))
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("check that the file exists and is readable"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse archgen.toml")]
    #[diagnostic(code(archgen::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse template")]
    #[diagnostic(
        code(archgen::template_error),
        help("a template is a JSON object with 'templateId' and 'tree'")
    )]
    Template {
        #[source_code]
        src: NamedSource<String>,
        #[label("{source}")]
        span: Option<SourceSpan>,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(archgen::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("unknown scalar '{name}' in {context}")]
    #[diagnostic(
        code(archgen::unknown_scalar),
        help(
            "valid scalars are: text, boolean, integer, decimal, date_time, duration, uri, or an upper-case RM class name such as DV_QUANTITY"
        )
    )]
    UnknownScalar {
        #[source_code]
        src: NamedSource<String>,
        #[label("unknown scalar")]
        span: Option<SourceSpan>,
        name: String,
        context: String,
    },
}
