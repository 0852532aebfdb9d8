//! Structural identity of template sub-trees.
//!
//! Two sub-trees are the same shape when they are equal after every path
//! has been made relative to the sub-tree's own position. The relativized
//! clone is the dedup key, so sub-trees found at different places in the
//! template map to a single generated type.

use archgen_ir::TemplateNode;

use crate::GenerateError;

/// Dedup key of a nested record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey(TemplateNode);

impl RecordKey {
    /// Canonicalize `node` against its own path.
    pub fn of(node: &TemplateNode) -> Result<Self, GenerateError> {
        Ok(Self(node.relativized(&node.path)?))
    }
}

/// Dedup key of a choice group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChoiceKey(Vec<TemplateNode>);

impl ChoiceKey {
    /// Canonicalize every alternative against the group's shared path.
    pub fn of<'a>(
        path: &str,
        alternatives: impl IntoIterator<Item = &'a TemplateNode>,
    ) -> Result<Self, GenerateError> {
        alternatives
            .into_iter()
            .map(|alternative| alternative.relativized(path).map_err(GenerateError::from))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
