//! Reference-model type resolution.
//!
//! The generator asks a [`TypeResolver`] which host-native scalar a leaf's
//! rmType maps to. Resolution is a pure lookup; no I/O happens mid-walk.

use std::collections::HashMap;

use archgen_ir::ScalarType;

/// Oracle mapping reference-model types to native scalars.
///
/// Implement this trait to plug in a custom reference-model registry.
pub trait TypeResolver {
    /// Look up the native scalar for a reference-model type.
    fn resolve(&self, rm_type: &str) -> Option<ScalarType>;

    /// Sub-fields a leaf of this type is expanded into, if any.
    fn expansion(&self, rm_type: &str) -> Option<&[ExpandedField]> {
        let _ = rm_type;
        None
    }
}

/// Resolve a leaf's rmType, handling the fixed primitive names first.
pub fn resolve_scalar(resolver: &dyn TypeResolver, rm_type: &str) -> Option<ScalarType> {
    match rm_type {
        "STRING" => Some(ScalarType::Text),
        "BOOLEAN" => Some(ScalarType::Boolean),
        "INTEGER" => Some(ScalarType::Integer),
        other => resolver.resolve(other),
    }
}

/// One sub-field of an expanded leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedField {
    /// Reference-model attribute name (e.g. "definingCode").
    pub attribute: String,
    pub scalar: ScalarType,
}

impl ExpandedField {
    pub fn new(attribute: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            attribute: attribute.into(),
            scalar,
        }
    }
}

/// Table-driven [`TypeResolver`].
#[derive(Debug, Clone, Default)]
pub struct RmTypeRegistry {
    types: HashMap<String, ScalarType>,
    expansions: HashMap<String, Vec<ExpandedField>>,
}

/// Data-value and support classes that resolve to themselves.
const OPENEHR_CLASSES: &[&str] = &[
    "CODE_PHRASE",
    "DV_TEXT",
    "DV_CODED_TEXT",
    "DV_QUANTITY",
    "DV_COUNT",
    "DV_ORDINAL",
    "DV_SCALE",
    "DV_PROPORTION",
    "DV_BOOLEAN",
    "DV_DATE_TIME",
    "DV_DATE",
    "DV_TIME",
    "DV_DURATION",
    "DV_URI",
    "DV_EHR_URI",
    "DV_IDENTIFIER",
    "DV_MULTIMEDIA",
    "DV_PARSABLE",
    "DV_STATE",
    "PARTY_PROXY",
    "PARTY_IDENTIFIED",
    "PARTY_SELF",
    "OBJECT_REF",
    "PARTICIPATION",
    "FEEDER_AUDIT",
    "ISM_TRANSITION",
    "INSTRUCTION_DETAILS",
];

impl RmTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the openEHR reference model.
    pub fn openehr() -> Self {
        let mut registry = Self::new();
        for class in OPENEHR_CLASSES {
            registry.register(*class, ScalarType::rm(*class));
        }

        let value = |scalar| vec![ExpandedField::new("value", scalar)];
        registry
            .expand(
                "DV_CODED_TEXT",
                vec![
                    ExpandedField::new("value", ScalarType::Text),
                    ExpandedField::new("definingCode", ScalarType::rm(ScalarType::CODE_PHRASE)),
                ],
            )
            .expand("DV_TEXT", value(ScalarType::Text))
            .expand(
                "DV_QUANTITY",
                vec![
                    ExpandedField::new("magnitude", ScalarType::Decimal),
                    ExpandedField::new("units", ScalarType::Text),
                ],
            )
            .expand(
                "DV_COUNT",
                vec![ExpandedField::new("magnitude", ScalarType::Integer)],
            )
            .expand("DV_DATE_TIME", value(ScalarType::DateTime))
            .expand("DV_DATE", value(ScalarType::DateTime))
            .expand("DV_TIME", value(ScalarType::DateTime))
            .expand("DV_DURATION", value(ScalarType::Duration))
            .expand("DV_BOOLEAN", value(ScalarType::Boolean))
            .expand("DV_URI", value(ScalarType::Uri))
            .expand("DV_EHR_URI", value(ScalarType::Uri))
            .expand(
                "DV_PROPORTION",
                vec![
                    ExpandedField::new("numerator", ScalarType::Decimal),
                    ExpandedField::new("denominator", ScalarType::Decimal),
                ],
            )
            .expand(
                "DV_ORDINAL",
                vec![
                    ExpandedField::new("value", ScalarType::Integer),
                    ExpandedField::new("symbol", ScalarType::rm(ScalarType::CODED_TEXT)),
                ],
            );
        registry
    }

    /// Register (or replace) the scalar for an rmType.
    pub fn register(&mut self, rm_type: impl Into<String>, scalar: ScalarType) -> &mut Self {
        self.types.insert(rm_type.into(), scalar);
        self
    }

    /// Declare (or replace) the expansion of an rmType.
    ///
    /// An empty field list removes the expansion.
    pub fn expand(&mut self, rm_type: impl Into<String>, fields: Vec<ExpandedField>) -> &mut Self {
        let rm_type = rm_type.into();
        if fields.is_empty() {
            self.expansions.remove(&rm_type);
        } else {
            self.expansions.insert(rm_type, fields);
        }
        self
    }

    /// Number of registered rmTypes.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeResolver for RmTypeRegistry {
    fn resolve(&self, rm_type: &str) -> Option<ScalarType> {
        self.types.get(rm_type).cloned()
    }

    fn expansion(&self, rm_type: &str) -> Option<&[ExpandedField]> {
        self.expansions.get(rm_type).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_bypass_registry() {
        let empty = RmTypeRegistry::new();
        assert_eq!(resolve_scalar(&empty, "STRING"), Some(ScalarType::Text));
        assert_eq!(resolve_scalar(&empty, "BOOLEAN"), Some(ScalarType::Boolean));
        assert_eq!(resolve_scalar(&empty, "INTEGER"), Some(ScalarType::Integer));
        assert_eq!(resolve_scalar(&empty, "DV_TEXT"), None);
    }

    #[test]
    fn test_openehr_registry() {
        let registry = RmTypeRegistry::openehr();
        assert_eq!(
            resolve_scalar(&registry, "DV_QUANTITY"),
            Some(ScalarType::rm("DV_QUANTITY"))
        );
        assert_eq!(resolve_scalar(&registry, "CLUSTER"), None);

        let coded = registry.expansion("DV_CODED_TEXT").unwrap();
        assert_eq!(coded.len(), 2);
        assert_eq!(coded[1].attribute, "definingCode");
        assert!(coded[1].scalar.is_code_phrase());
        assert!(registry.expansion("CODE_PHRASE").is_none());
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = RmTypeRegistry::openehr();
        registry
            .register("DV_PROPORTION", ScalarType::Decimal)
            .expand("DV_QUANTITY", vec![]);

        assert_eq!(registry.resolve("DV_PROPORTION"), Some(ScalarType::Decimal));
        assert!(registry.expansion("DV_QUANTITY").is_none());
    }
}
