//! Generator configuration.

use archgen_core::{ExpandedField, RmTypeRegistry};
use archgen_ir::TypeRef;
use archgen_manifest::{DEFAULT_MAX_WIDTH, DEFAULT_PACKAGE, Language, Manifest};

/// Package of the shared, protocol-level code-phrase enumerations.
pub const SHARED_DEFINITION_PACKAGE: &str = "org.ehrbase.shareddefinition";

/// Field labels whose code-phrase type is a fixed shared enumeration.
const WELL_KNOWN_CODE_PHRASES: &[(&str, &str)] = &[
    ("language", "Language"),
    ("setting_defining_code", "SettingDefiningCode"),
    ("category_defining_code", "CategoryDefiningCode"),
    ("territory", "Territory"),
    ("math_function_defining_code", "MathFunctionDefiningCode"),
];

/// Shared enumeration for a well-known code-phrase field label.
pub fn well_known_code_phrase(label: &str) -> Option<TypeRef> {
    WELL_KNOWN_CODE_PHRASES
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, name)| TypeRef::new(SHARED_DEFINITION_PACKAGE, *name))
}

/// In-memory form of the `[generator]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Base package of generated types.
    pub package: String,
    /// Target whose reserved words identifiers must avoid.
    pub naming: Language,
    /// Type names longer than this are abbreviated.
    pub class_name_max_width: usize,
    /// Add the version-uid identity field to the root record.
    pub identity_field: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            naming: Language::default(),
            class_name_max_width: DEFAULT_MAX_WIDTH,
            identity_field: true,
        }
    }
}

impl GeneratorConfig {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let generator = &manifest.generator;
        Self {
            package: generator.package.clone(),
            naming: generator.naming,
            class_name_max_width: generator.class_name_max_width,
            identity_field: generator.identity_field,
        }
    }

    /// Override the base package.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }
}

/// The openEHR registry with the manifest's `[types]` and `[expand]` applied.
pub fn registry_from_manifest(manifest: &Manifest) -> RmTypeRegistry {
    let mut registry = RmTypeRegistry::openehr();
    for (rm_type, scalar) in manifest.type_overrides() {
        registry.register(rm_type, scalar);
    }
    for (rm_type, fields) in manifest.expansions() {
        let fields = fields
            .into_iter()
            .map(|(attribute, scalar)| ExpandedField::new(attribute, scalar))
            .collect();
        registry.expand(rm_type, fields);
    }
    registry
}
