//! Template tree walker and type builder.
//!
//! The walk is a depth-first pre-order traversal: a node is named before
//! any of its children, and children are visited in template order. Name
//! collisions are resolved first come, first served, so this order is
//! part of the output contract.

use std::borrow::Cow;

use archgen_core::{TypeResolver, camel_to_snake, resolve_scalar};
use archgen_ir::{
    ELEMENT, EVENT, FieldType, GeneratedField, GeneratedType, INTERVAL_EVENT, InterfaceType,
    POINT_EVENT, RecordType, ScalarType, TemplateNode, TerminologyBinding, TypeRef, relative_path,
};
use tracing::{debug, warn};

use crate::{
    GenerateError,
    config::{GeneratorConfig, well_known_code_phrase},
    context::GenerationContext,
    diagnostic::{Diagnostic, Phase},
    structure::{ChoiceKey, RecordKey},
    valueset::enum_for,
};

/// Field name used for a leaf held directly by an `ELEMENT`.
const ELEMENT_VALUE_FIELD: &str = "value";
/// Name of the identity field added to the root record.
const IDENTITY_FIELD_NAME: &str = "versionUid";

/// Alternatives sharing one template position.
struct ChoiceGroup<'t> {
    path: String,
    alternatives: Vec<Cow<'t, TemplateNode>>,
}

/// Builds records for one generation run.
pub(crate) struct TypeBuilder<'a> {
    resolver: &'a dyn TypeResolver,
    config: &'a GeneratorConfig,
    pub(crate) ctx: GenerationContext,
}

impl<'a> TypeBuilder<'a> {
    pub(crate) fn new(
        resolver: &'a dyn TypeResolver,
        config: &'a GeneratorConfig,
        ctx: GenerationContext,
    ) -> Self {
        Self {
            resolver,
            config,
            ctx,
        }
    }

    /// Build the record for `node`, emitting every nested type on the way.
    ///
    /// The returned record itself is not emitted; the caller decides where
    /// it goes.
    pub(crate) fn build(&mut self, node: &TemplateNode) -> Result<RecordType, GenerateError> {
        let name = self.record_name(node);
        self.ctx.enter(node);
        let result = self.build_entered(node, name);
        self.ctx.leave(node);
        result
    }

    fn record_name(&mut self, node: &TemplateNode) -> String {
        if self.ctx.nodes.is_empty() {
            let label = format!("{}_{}", camel_to_snake(&self.ctx.template_id), node.rm_type);
            let name = self.ctx.type_name(&label, false);
            self.ctx.root_name = Some(name.clone());
            return name;
        }
        let label = format!("{}_{}", camel_to_snake(&node.name), node.rm_type);
        let widen = !self.ctx.archetypes.is_empty() && self.ctx.nodes.len() > 1;
        self.ctx.type_name(&label, widen)
    }

    fn build_entered(
        &mut self,
        node: &TemplateNode,
        name: String,
    ) -> Result<RecordType, GenerateError> {
        let mut record = RecordType::new(name);
        if node.is_archetype_root {
            record.archetype_id = node.node_id.clone();
        }

        let mut groups: Vec<ChoiceGroup<'_>> = node
            .choices_in_children()
            .into_iter()
            .map(|(path, members)| ChoiceGroup {
                path: path.to_string(),
                alternatives: members.into_iter().map(Cow::Borrowed).collect(),
            })
            .collect();
        let is_choice_member = |child: &TemplateNode| groups.iter().any(|g| g.path == child.path);
        let (events, plain): (Vec<&TemplateNode>, Vec<&TemplateNode>) = node
            .children
            .iter()
            .filter(|child| !is_choice_member(*child))
            .partition(|child| child.rm_type == EVENT);

        for child in plain.iter().copied() {
            let relative = relative_path(&child.path, &node.path)?;
            if child.is_leaf() {
                self.add_leaf(&mut record, relative, child);
            } else {
                self.add_nested(&mut record, relative, child)?;
            }
        }

        if plain.is_empty() && events.is_empty() {
            self.add_leaf(&mut record, "", node);
        }

        groups.extend(events.into_iter().map(split_event));
        for group in &groups {
            self.add_choice(&mut record, node, group)?;
        }

        if self.ctx.at_root() && self.config.identity_field {
            let name = self.ctx.exact_field_name(IDENTITY_FIELD_NAME, &node.path);
            record.fields.push(
                GeneratedField::new(
                    name,
                    FieldType::Scalar(ScalarType::rm(ScalarType::VERSION_UID)),
                    "",
                )
                .identity(),
            );
        }
        Ok(record)
    }

    /// Emit (or reuse) the record for a child with children of its own.
    fn add_nested(
        &mut self,
        record: &mut RecordType,
        relative: &str,
        child: &TemplateNode,
    ) -> Result<(), GenerateError> {
        let key = RecordKey::of(child)?;
        let type_ref = match self.ctx.records.get(&key) {
            Some(existing) => {
                debug!(name = %existing.name, path = %child.path, "reusing record for identical sub-tree");
                self.ctx.reused += 1;
                existing.clone()
            }
            None => {
                let nested = self.build(child)?;
                let type_ref = self.ctx.emit(GeneratedType::Record(nested));
                self.ctx.records.insert(key, type_ref.clone());
                type_ref
            }
        };

        let ty = FieldType::Named(type_ref).list_if(child.is_multi());
        self.add_field(record, relative, &child.name, ty, false);
        Ok(())
    }

    /// Emit (or reuse) the interface of a choice group and its alternatives.
    fn add_choice(
        &mut self,
        record: &mut RecordType,
        node: &TemplateNode,
        group: &ChoiceGroup<'_>,
    ) -> Result<(), GenerateError> {
        let [first, _, ..] = group.alternatives.as_slice() else {
            return Err(GenerateError::ChoiceTooSmall {
                path: group.path.clone(),
                alternatives: group.alternatives.len(),
            });
        };

        let key = ChoiceKey::of(&group.path, group.alternatives.iter().map(|alt| &**alt))?;
        let interface = match self.ctx.choices.get(&key) {
            Some(existing) => {
                debug!(name = %existing.name, path = %group.path, "reusing interface for identical choice");
                self.ctx.reused += 1;
                existing.clone()
            }
            None => {
                let label = format!("{}_choice", camel_to_snake(&first.name));
                let widen = !self.ctx.archetypes.is_empty();
                let name = self.ctx.type_name(&label, widen);
                let interface = TypeRef::new(self.ctx.definition_package(), name);
                self.ctx.choices.insert(key, interface.clone());

                let mut implementors = Vec::with_capacity(group.alternatives.len());
                for alternative in &group.alternatives {
                    let mut variant = self.build(alternative)?;
                    variant.implements = Some(interface.clone());
                    variant.discriminant = Some(alternative.rm_type.clone());
                    implementors.push(variant);
                }

                self.ctx.emit(GeneratedType::Interface(InterfaceType {
                    name: interface.name.clone(),
                    implementors: implementors
                        .iter()
                        .map(|variant| TypeRef::new(interface.package.clone(), variant.name.clone()))
                        .collect(),
                }));
                for variant in implementors {
                    self.ctx.emit(GeneratedType::Record(variant));
                }
                interface
            }
        };

        let multi = group.alternatives.iter().any(|alt| alt.is_multi());
        let relative = relative_path(&group.path, &node.path)?;
        let ty = FieldType::Named(interface).list_if(multi);
        self.add_field(record, relative, &first.name, ty, true);
        Ok(())
    }

    /// Emit the field(s) of a leaf, or a diagnostic when its type is unknown.
    fn add_leaf(&mut self, record: &mut RecordType, relative: &str, leaf: &TemplateNode) {
        let Some(scalar) = resolve_scalar(self.resolver, &leaf.rm_type) else {
            warn!(rm_type = %leaf.rm_type, path = %leaf.path, "no scalar type for leaf, skipping field");
            self.ctx.diagnostics.push(
                Diagnostic::warning(
                    Phase::Resolve,
                    format!("no scalar type for rmType '{}'; field skipped", leaf.rm_type),
                )
                .at(leaf.path.clone()),
            );
            return;
        };
        let binding = leaf.coded_binding();
        let resolver = self.resolver;

        match resolver.expansion(&leaf.rm_type) {
            Some(expansion) => {
                for expanded in expansion {
                    let attribute = camel_to_snake(&expanded.attribute);
                    let label = format!("{}_{}", leaf.name, attribute);
                    let path = format!("{}|{}", relative, attribute);
                    let ty = self
                        .leaf_type(&label, expanded.scalar.clone(), binding)
                        .list_if(leaf.is_multi());
                    self.add_field(record, &path, &label, ty, false);
                }
            }
            None => {
                let ty = self
                    .leaf_type(&leaf.name, scalar, binding)
                    .list_if(leaf.is_multi());
                self.add_field(record, relative, &leaf.name, ty, false);
            }
        }
    }

    /// Type of one leaf field, routing code-bearing scalars to enumerations.
    fn leaf_type(
        &mut self,
        label: &str,
        scalar: ScalarType,
        binding: Option<&TerminologyBinding>,
    ) -> FieldType {
        if scalar.is_code_phrase()
            && let Some(shared) = well_known_code_phrase(label)
        {
            return FieldType::Named(shared);
        }
        match binding {
            Some(binding) if scalar.is_coded() => {
                FieldType::Named(enum_for(&mut self.ctx, label, binding))
            }
            _ => FieldType::Scalar(scalar),
        }
    }

    fn add_field(
        &mut self,
        record: &mut RecordType,
        relative: &str,
        label: &str,
        ty: FieldType,
        variant_selector: bool,
    ) {
        let in_element = self
            .ctx
            .current()
            .is_some_and(|frame| frame.rm_type == ELEMENT);
        let candidate = if in_element {
            ELEMENT_VALUE_FIELD.to_string()
        } else {
            let (parent, child) = split_last_segment(relative);
            format!("{}_{}_{}", parent, child, label)
        };

        let name = self.ctx.field_name(&candidate, relative);
        let field = GeneratedField::new(name, ty, relative);
        record.fields.push(if variant_selector {
            field.variant_selector()
        } else {
            field
        });
    }
}

/// Split a relative path at its last `/`.
fn split_last_segment(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(index) => (&path[..index], &path[index + 1..]),
        None => ("", path),
    }
}

/// Replace an `EVENT` child by its interval and point variants.
///
/// Only the interval variant carries the synthetic `width` and
/// `math_function` leaves.
fn split_event(event: &TemplateNode) -> ChoiceGroup<'_> {
    let mut point = event.clone();
    point.rm_type = POINT_EVENT.to_string();

    let mut interval = event.clone();
    interval.rm_type = INTERVAL_EVENT.to_string();
    interval.children.push(TemplateNode::new(
        "width",
        "width",
        "DV_DURATION",
        format!("{}/width", event.path),
    ));
    interval.children.push(TemplateNode::new(
        "math_function",
        "math_function",
        ScalarType::CODED_TEXT,
        format!("{}/math_function", event.path),
    ));

    ChoiceGroup {
        path: interval.path.clone(),
        alternatives: vec![Cow::Owned(interval), Cow::Owned(point)],
    }
}
