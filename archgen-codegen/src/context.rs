//! Mutable state of one generation run.

use std::collections::HashMap;

use archgen_core::{abbreviate, camel_to_snake, placeholder, try_normalize};
use archgen_ir::{GeneratedType, OutputModel, TemplateNode, TypeRef};

use crate::{
    diagnostic::{Diagnostic, Phase},
    naming::{NameTable, NamingConvention, split_segments, widening_labels},
    structure::{ChoiceKey, RecordKey},
    valueset::ValueSetKey,
};

/// Marker appended to abbreviated type names.
pub const ABBREVIATION_MARKER: &str = "_";

/// A node currently being built.
#[derive(Debug, Clone)]
pub struct Frame {
    pub path: String,
    pub rm_type: String,
}

/// Context threaded through the recursive walk.
///
/// Created fresh for every run and discarded afterwards; nothing here is
/// shared between runs.
#[derive(Debug)]
pub struct GenerationContext {
    /// Base package from the configuration.
    pub base_package: String,
    /// Run-wide template identifier.
    pub template_id: String,
    /// Name of the root record, set when the root is named.
    pub root_name: Option<String>,
    /// Names of the archetypes enclosing the current node, innermost last.
    pub archetypes: Vec<String>,
    /// Nodes being built, innermost last.
    pub nodes: Vec<Frame>,
    /// Run-wide type-name scope.
    pub type_names: NameTable,
    /// One field scope per record being built, innermost last.
    pub field_scopes: Vec<NameTable>,
    pub records: HashMap<RecordKey, TypeRef>,
    pub choices: HashMap<ChoiceKey, TypeRef>,
    pub enums: HashMap<ValueSetKey, TypeRef>,
    /// Number of references served from a dedup cache.
    pub reused: usize,
    pub output: OutputModel,
    pub diagnostics: Vec<Diagnostic>,
    naming: &'static NamingConvention,
    max_width: usize,
}

impl GenerationContext {
    pub fn new(
        base_package: impl Into<String>,
        template_id: impl Into<String>,
        naming: &'static NamingConvention,
        max_width: usize,
    ) -> Self {
        Self {
            base_package: base_package.into(),
            template_id: template_id.into(),
            root_name: None,
            archetypes: Vec::new(),
            nodes: Vec::new(),
            type_names: NameTable::new(),
            field_scopes: Vec::new(),
            records: HashMap::new(),
            choices: HashMap::new(),
            enums: HashMap::new(),
            reused: 0,
            output: OutputModel::new(),
            diagnostics: Vec::new(),
            naming,
            max_width,
        }
    }

    pub fn naming(&self) -> &'static NamingConvention {
        self.naming
    }

    /// Enter a node: push its frame, a fresh field scope and, for archetype
    /// roots, the archetype name.
    pub fn enter(&mut self, node: &TemplateNode) {
        if node.is_archetype_root {
            self.archetypes.push(node.name.clone());
        }
        self.field_scopes.push(NameTable::new());
        self.nodes.push(Frame {
            path: node.path.clone(),
            rm_type: node.rm_type.clone(),
        });
    }

    /// Leave the node entered last.
    pub fn leave(&mut self, node: &TemplateNode) {
        if node.is_archetype_root {
            self.archetypes.pop();
        }
        self.field_scopes.pop();
        self.nodes.pop();
    }

    /// The node being built.
    pub fn current(&self) -> Option<&Frame> {
        self.nodes.last()
    }

    /// True while the root node is the one being built.
    pub fn at_root(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Package of the root record.
    pub fn root_package(&self) -> String {
        format!("{}.{}", self.base_package, self.root_segment())
    }

    /// Package of every other generated type.
    pub fn definition_package(&self) -> String {
        format!("{}.{}.definition", self.base_package, self.root_segment())
    }

    fn root_segment(&self) -> String {
        self.root_name.as_deref().unwrap_or_default().to_lowercase()
    }

    /// Append a non-root type to the definition package.
    pub fn emit(&mut self, ty: GeneratedType) -> TypeRef {
        let package = self.definition_package();
        tracing::debug!(package = %package, name = ty.name(), kind = ty.kind().as_str(), "emitted type");
        self.output.push(package, ty)
    }

    /// Claim a type name for `label` in the run-wide scope.
    ///
    /// With `widen`, the innermost archetype name is prepended to every
    /// candidate.
    pub fn type_name(&mut self, label: &str, widen: bool) -> String {
        let prefix = if widen {
            self.archetypes.last().map(|name| camel_to_snake(name))
        } else {
            None
        };
        let max_width = self.max_width;
        let candidates = self
            .candidates(label, prefix.as_deref(), true)
            .into_iter()
            .map(|candidate| abbreviate(&candidate, ABBREVIATION_MARKER, max_width));
        let claimed = self.type_names.claim(candidates, self.naming);
        if claimed.suffixed {
            let diagnostic = Diagnostic::info(
                Phase::Naming,
                format!(
                    "type name '{}' for '{}' needed a numeric suffix",
                    claimed.name, label
                ),
            );
            self.report_here(diagnostic);
        }
        claimed.name
    }

    /// Claim a field name for `label` in the current record's scope.
    pub fn field_name(&mut self, label: &str, location: &str) -> String {
        let candidates = self.candidates(label, None, false);
        self.claim_field(candidates, location)
    }

    /// Claim a fixed field name, suffixing it only on collision.
    pub fn exact_field_name(&mut self, name: &str, location: &str) -> String {
        self.claim_field(vec![name.to_string()], location)
    }

    fn claim_field(&mut self, candidates: Vec<String>, location: &str) -> String {
        let naming = self.naming;
        let Some(scope) = self.field_scopes.last_mut() else {
            return NameTable::new().claim(candidates, naming).name;
        };
        let claimed = scope.claim(candidates, naming);
        if claimed.suffixed {
            self.diagnostics.push(
                Diagnostic::info(
                    Phase::Naming,
                    format!("field name '{}' needed a numeric suffix", claimed.name),
                )
                .at(location),
            );
        }
        claimed.name
    }

    /// Normalized widening candidates for a label.
    ///
    /// Candidates that normalize to nothing are skipped; when none is left
    /// a random placeholder is the only candidate.
    fn candidates(
        &mut self,
        label: &str,
        prefix: Option<&str>,
        capitalize_first: bool,
    ) -> Vec<String> {
        let segments = split_segments(label);
        let candidates: Vec<String> = widening_labels(&segments, prefix)
            .iter()
            .filter_map(|raw| try_normalize(raw, capitalize_first))
            .collect();
        if !candidates.is_empty() {
            return candidates;
        }

        tracing::warn!(label, "label has no identifier characters, using a placeholder");
        let diagnostic = Diagnostic::warning(
            Phase::Naming,
            format!(
                "label '{}' has no identifier characters; a random placeholder is used",
                label
            ),
        );
        self.report_here(diagnostic);
        vec![placeholder(capitalize_first)]
    }

    /// Record a diagnostic located at the node being built.
    fn report_here(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match self.current() {
            Some(frame) => diagnostic.at(frame.path.clone()),
            None => diagnostic,
        };
        self.diagnostics.push(diagnostic);
    }
}
