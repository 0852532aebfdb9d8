//! Enumerations built from terminology value sets.

use std::collections::BTreeSet;

use archgen_core::{placeholder, to_upper_snake, try_normalize};
use archgen_ir::{EnumConstant, EnumType, GeneratedType, TerminologyBinding, TypeRef};

use crate::{
    context::GenerationContext,
    naming::{NameTable, SEGMENT_SEPARATOR},
};

/// Value-set identity: terminology id plus the set of terms.
///
/// Term order does not matter; two bindings listing the same terms in a
/// different order share one enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueSetKey {
    terminology_id: String,
    terms: BTreeSet<(String, String, String)>,
}

impl ValueSetKey {
    pub fn of(binding: &TerminologyBinding) -> Self {
        Self {
            terminology_id: binding.terminology().to_string(),
            terms: binding
                .terms
                .iter()
                .map(|term| {
                    (
                        term.code.clone(),
                        term.label.clone(),
                        term.description().to_string(),
                    )
                })
                .collect(),
        }
    }
}

/// Enumeration for a binding, built once per value set for the whole run.
///
/// `label` names the enumeration when it is first built.
pub fn enum_for(ctx: &mut GenerationContext, label: &str, binding: &TerminologyBinding) -> TypeRef {
    let key = ValueSetKey::of(binding);
    if let Some(existing) = ctx.enums.get(&key) {
        tracing::debug!(name = %existing.name, "reusing enumeration for value set");
        ctx.reused += 1;
        return existing.clone();
    }

    let name = ctx.type_name(label, false);
    let enumeration = build_enum(name, binding, ctx);
    let type_ref = ctx.emit(GeneratedType::Enum(enumeration));
    ctx.enums.insert(key, type_ref.clone());
    type_ref
}

fn build_enum(name: String, binding: &TerminologyBinding, ctx: &GenerationContext) -> EnumType {
    let terminology_id = binding.terminology().to_string();
    let mut identifiers = NameTable::new();
    let mut seen = BTreeSet::new();
    let mut constants = Vec::with_capacity(binding.terms.len());

    for term in &binding.terms {
        if !seen.insert(term.code.as_str()) {
            continue;
        }
        let identifier = identifiers
            .claim([constant_identifier(&term.label, &term.code)], ctx.naming())
            .name;
        constants.push(EnumConstant {
            identifier,
            value: term.label.clone(),
            description: term.description().to_string(),
            terminology_id: terminology_id.clone(),
            code: term.code.clone(),
        });
    }

    EnumType {
        name,
        terminology_id,
        constants,
    }
}

/// UPPER_SNAKE identifier of a term: its label's last segment, or its code.
fn constant_identifier(label: &str, code: &str) -> String {
    let last = label
        .split(SEGMENT_SEPARATOR)
        .rev()
        .find(|segment| !segment.trim().is_empty())
        .unwrap_or_default();
    let normalized = try_normalize(last, false)
        .or_else(|| try_normalize(code, false))
        .unwrap_or_else(|| placeholder(false));
    to_upper_snake(&normalized)
}

#[cfg(test)]
mod tests {
    use archgen_ir::Term;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::naming::RUST_NAMING;

    fn binding(terms: &[(&str, &str)]) -> TerminologyBinding {
        TerminologyBinding::coded(
            "local",
            terms
                .iter()
                .map(|(code, label)| Term::new(*code, *label))
                .collect(),
        )
    }

    fn context() -> GenerationContext {
        let mut ctx = GenerationContext::new("org.example", "t", &RUST_NAMING, 80);
        ctx.root_name = Some("Root".into());
        ctx
    }

    #[test]
    fn test_constant_identifier() {
        assert_eq!(constant_identifier("Left arm", "at0001"), "LEFT_ARM");
        assert_eq!(constant_identifier("Arm_right side", "at0002"), "RIGHT_SIDE");
        assert_eq!(constant_identifier("1st visit", "at0003"), "N1ST_VISIT");
        assert_eq!(constant_identifier("  ", "at0004"), "AT0004");
    }

    #[test]
    fn test_enum_payload() {
        let mut ctx = context();
        let binding = TerminologyBinding::coded(
            "local",
            vec![
                Term::new("at0001", "Left arm").described("en", "The left arm"),
                Term::new("at0002", "Right arm"),
            ],
        );
        let type_ref = enum_for(&mut ctx, "location_defining_code", &binding);
        assert_eq!(type_ref, TypeRef::new("org.example.root.definition", "Code"));

        let enumeration = ctx.output.enums().next().unwrap();
        assert_eq!(
            enumeration.constants[0],
            EnumConstant {
                identifier: "LEFT_ARM".into(),
                value: "Left arm".into(),
                description: "The left arm".into(),
                terminology_id: "local".into(),
                code: "at0001".into(),
            }
        );
        assert_eq!(enumeration.constants[1].description, "Right arm");
    }

    #[test]
    fn test_memoized_by_value_set() {
        let mut ctx = context();
        let first = enum_for(&mut ctx, "a_code", &binding(&[("1", "One"), ("2", "Two")]));
        let second = enum_for(&mut ctx, "b_code", &binding(&[("2", "Two"), ("1", "One")]));
        assert_eq!(first, second);
        assert_eq!(ctx.output.enums().count(), 1);
        assert_eq!(ctx.reused, 1);

        let other = enum_for(&mut ctx, "a_code", &binding(&[("1", "One")]));
        assert_ne!(first, other);
        assert_eq!(ctx.output.enums().count(), 2);
    }

    #[test]
    fn test_constant_identifiers_unique() {
        let mut ctx = context();
        enum_for(
            &mut ctx,
            "x",
            &binding(&[("1", "Same"), ("2", "same"), ("2", "same"), ("3", "Other")]),
        );
        let identifiers: Vec<_> = ctx
            .output
            .enums()
            .next()
            .unwrap()
            .constants
            .iter()
            .map(|c| c.identifier.as_str())
            .collect();
        assert_eq!(identifiers, vec!["SAME", "SAME2", "OTHER"]);
    }
}
