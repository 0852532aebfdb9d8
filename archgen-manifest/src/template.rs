//! Template document loading.

use std::path::Path;

use archgen_ir::Template;

use crate::{Error, Result, error::SourceContext};

/// Load a template JSON document from the given path.
pub fn load_template(path: impl AsRef<Path>) -> Result<Template> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })?;
    parse_template_str(&content, &path.display().to_string())
}

/// Parse a template JSON document with a filename for error reporting.
pub fn parse_template_str(content: &str, filename: &str) -> Result<Template> {
    let source_ctx = SourceContext::new(content, filename);
    serde_json::from_str(content).map_err(|e| source_ctx.template_error(e))
}
