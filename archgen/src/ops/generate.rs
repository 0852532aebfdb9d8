//! Generate operation - configuration loading and one generation run.

use std::path::Path;

use archgen_codegen::{Generation, Generator, GeneratorConfig, registry_from_manifest};
use archgen_core::RmTypeRegistry;
use archgen_manifest::{Manifest, load_template};
use eyre::{Context, Result};
use tracing::debug;

use crate::commands::UnwrapOrExit;

/// Manifest looked up in the working directory when none is given.
pub const DEFAULT_MANIFEST: &str = "archgen.toml";

/// Everything a run needs besides the template.
pub struct Settings {
    pub config: GeneratorConfig,
    pub registry: RmTypeRegistry,
}

impl Settings {
    /// Load settings from `path`, or from `archgen.toml` when it exists.
    ///
    /// Without any manifest the built-in defaults apply. Manifest errors,
    /// including an invalid `package` override, are reported and end the
    /// process.
    pub fn load(path: Option<&Path>, package: Option<&str>) -> Self {
        Self::try_load(path, package).unwrap_or_exit()
    }

    /// Like [`Settings::load`], returning manifest errors to the caller.
    pub fn try_load(path: Option<&Path>, package: Option<&str>) -> archgen_manifest::Result<Self> {
        let mut manifest = match path {
            Some(path) => Manifest::from_file(path)?,
            None if Path::new(DEFAULT_MANIFEST).is_file() => {
                Manifest::from_file(DEFAULT_MANIFEST)?
            }
            None => {
                debug!("no {} found, using defaults", DEFAULT_MANIFEST);
                Manifest::default()
            }
        };

        if let Some(package) = package {
            manifest.override_package(package, "--package")?;
        }
        Ok(Self {
            config: GeneratorConfig::from_manifest(&manifest),
            registry: registry_from_manifest(&manifest),
        })
    }
}

/// Load a template and run generation over it.
pub fn generate(template_path: &Path, settings: &Settings) -> Result<Generation> {
    let template = load_template(template_path).unwrap_or_exit();
    Generator::new(&settings.config, &settings.registry)
        .generate(&template)
        .wrap_err_with(|| format!("Failed to generate types for {}", template_path.display()))
}
