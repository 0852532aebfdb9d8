//! Manifest types and parsing for archgen.toml files.

mod language;
mod parse;
mod validate;

use std::collections::BTreeMap;

use archgen_ir::ScalarType;
use indexmap::IndexMap;
pub use language::Language;
use serde::{Deserialize, Serialize};
pub use validate::ParseContext;

/// Base package used when none is configured.
pub const DEFAULT_PACKAGE: &str = "org.ehrbase.generated";
/// Type names longer than this are abbreviated by default.
pub const DEFAULT_MAX_WIDTH: usize = 80;

/// Root manifest for archgen.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Generator settings
    #[serde(default)]
    pub generator: GeneratorSection,

    /// Extra or overriding rmType -> scalar mappings
    #[serde(default)]
    pub types: BTreeMap<String, String>,

    /// Leaf expansions, keyed by rmType. Attribute order is kept.
    #[serde(default)]
    pub expand: BTreeMap<String, IndexMap<String, String>>,
}

/// `[generator]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorSection {
    #[serde(default = "default_package")]
    pub package: String,
    #[serde(default)]
    pub naming: Language,
    #[serde(default = "default_max_width")]
    pub class_name_max_width: usize,
    #[serde(default = "default_true")]
    pub identity_field: bool,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            package: default_package(),
            naming: Language::default(),
            class_name_max_width: DEFAULT_MAX_WIDTH,
            identity_field: true,
        }
    }
}

fn default_package() -> String {
    DEFAULT_PACKAGE.to_string()
}

fn default_max_width() -> usize {
    DEFAULT_MAX_WIDTH
}

fn default_true() -> bool {
    true
}

impl Manifest {
    /// Resolved `[types]` entries.
    pub fn type_overrides(&self) -> impl Iterator<Item = (&str, ScalarType)> {
        self.types
            .iter()
            .map(|(rm_type, scalar)| (rm_type.as_str(), ScalarType::from_name(scalar)))
    }

    /// Resolved `[expand.*]` entries, attributes in declaration order.
    pub fn expansions(&self) -> impl Iterator<Item = (&str, Vec<(&str, ScalarType)>)> {
        self.expand.iter().map(|(rm_type, attributes)| {
            let fields = attributes
                .iter()
                .map(|(attribute, scalar)| (attribute.as_str(), ScalarType::from_name(scalar)))
                .collect();
            (rm_type.as_str(), fields)
        })
    }
}
