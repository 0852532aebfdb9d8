//! Manifest parsing from files and strings.

use std::{path::Path, str::FromStr};

use super::{Manifest, validate::ParseContext};
use crate::{Error, Result, error::SourceContext};

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, "archgen.toml")
    }
}

impl Manifest {
    /// Parse an archgen.toml file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_manifest(&content, &path.display().to_string())
    }

    /// Parse an archgen.toml from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_manifest(content, filename)
    }

    /// Replace the base package, validated the same way as the manifest value.
    ///
    /// `origin` names where the value came from (e.g. a command-line flag)
    /// in error reports.
    pub fn override_package(&mut self, package: &str, origin: &str) -> Result<()> {
        ParseContext::new(package, origin).validate_package(package)?;
        self.generator.package = package.to_string();
        Ok(())
    }
}

/// Parse a manifest from content with the given filename for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let manifest: Manifest = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    validate_manifest(&manifest, content, filename)?;
    Ok(manifest)
}

/// Validate the manifest after parsing.
fn validate_manifest(manifest: &Manifest, src: &str, filename: &str) -> Result<()> {
    let ctx = ParseContext::new(src, filename);

    let generator = ctx.push("generator");
    generator.validate_package(&manifest.generator.package)?;
    if manifest.generator.class_name_max_width < 2 {
        return Err(generator.validation_error(
            "class_name_max_width must be at least 2",
            "class_name_max_width",
        ));
    }

    let types = ctx.push("types");
    for (rm_type, scalar) in &manifest.types {
        types.validate_scalar(rm_type, scalar)?;
    }

    for (rm_type, attributes) in &manifest.expand {
        let expand = ctx.push("expand").push(rm_type);
        for (attribute, scalar) in attributes {
            expand.validate_scalar(attribute, scalar)?;
        }
    }
    Ok(())
}
