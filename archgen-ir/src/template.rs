//! Template tree model.
//!
//! A template tree is a normalized hierarchy of named, typed,
//! cardinality-constrained nodes. Every descendant's `path` is prefixed by
//! its parent's `path`. Nodes are read-only inputs; the generator clones
//! them when it needs derived variants.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reference-model type of the canonical scalar holder.
pub const ELEMENT: &str = "ELEMENT";
/// Reference-model type that is split into point and interval variants.
pub const EVENT: &str = "EVENT";
pub const POINT_EVENT: &str = "POINT_EVENT";
pub const INTERVAL_EVENT: &str = "INTERVAL_EVENT";

/// A template document: the tree plus the run-wide template identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template identifier, used to name the root type.
    pub template_id: String,
    /// Root node of the template tree.
    pub tree: TemplateNode,
}

/// A node in the template tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNode {
    /// Node identifier (attribute or archetype node name).
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// Reference-model type tag (e.g. "OBSERVATION", "DV_QUANTITY").
    pub rm_type: String,
    /// Position in the template, unique within the tree.
    pub path: String,
    /// Upper cardinality bound; `-1` means unbounded.
    #[serde(default = "single")]
    pub max_occurs: i32,
    /// Whether this node is the root of an archetype.
    #[serde(default)]
    pub is_archetype_root: bool,
    /// Archetype or at-code identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Ordered children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TemplateNode>,
    /// Terminology bindings attached to this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<TerminologyBinding>,
}

fn single() -> i32 {
    1
}

impl TemplateNode {
    /// Create a single-valued node with no children.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        rm_type: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rm_type: rm_type.into(),
            path: path.into(),
            max_occurs: 1,
            is_archetype_root: false,
            node_id: None,
            children: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Set the upper cardinality bound.
    pub fn with_max(mut self, max_occurs: i32) -> Self {
        self.max_occurs = max_occurs;
        self
    }

    /// Mark this node as an archetype root with the given archetype id.
    pub fn archetype(mut self, node_id: impl Into<String>) -> Self {
        self.is_archetype_root = true;
        self.node_id = Some(node_id.into());
        self
    }

    /// Append a child node.
    pub fn with_child(mut self, child: TemplateNode) -> Self {
        self.children.push(child);
        self
    }

    /// Attach a terminology binding.
    pub fn with_input(mut self, input: TerminologyBinding) -> Self {
        self.inputs.push(input);
        self
    }

    /// Returns true if this node maps to a list (`maxOccurs != 1`).
    pub fn is_multi(&self) -> bool {
        self.max_occurs != 1
    }

    /// Returns true if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Group children that share a path.
    ///
    /// Only groups with at least two alternatives are returned, in order of
    /// their first appearance.
    pub fn choices_in_children(&self) -> IndexMap<&str, Vec<&TemplateNode>> {
        let mut groups: IndexMap<&str, Vec<&TemplateNode>> = IndexMap::new();
        for child in &self.children {
            groups.entry(child.path.as_str()).or_default().push(child);
        }
        groups.retain(|_, members| members.len() > 1);
        groups
    }

    /// First coded-text binding carrying at least one term.
    pub fn coded_binding(&self) -> Option<&TerminologyBinding> {
        self.inputs
            .iter()
            .find(|input| input.binding_type == BindingType::CodedText && !input.terms.is_empty())
    }

    /// Clone this sub-tree with every path made relative to `base`.
    ///
    /// Fails if any path in the sub-tree is not prefixed by `base`.
    pub fn relativized(&self, base: &str) -> Result<TemplateNode, NotNested> {
        let mut node = self.clone();
        node.relativize(base)?;
        Ok(node)
    }

    fn relativize(&mut self, base: &str) -> Result<(), NotNested> {
        self.path = relative_path(&self.path, base)?.to_string();
        for child in &mut self.children {
            child.relativize(base)?;
        }
        Ok(())
    }
}

/// A path that is not nested under the expected parent path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotNested {
    pub path: String,
    pub parent: String,
}

/// Strip the `base` prefix from `path`.
///
/// The prefix must end on a segment boundary: `/a/b[x]` and `/a/b/c` are
/// nested under `/a/b`, `/a/bc` is not.
pub fn relative_path<'a>(path: &'a str, base: &str) -> Result<&'a str, NotNested> {
    match path.strip_prefix(base) {
        Some(rest)
            if rest.is_empty()
                || base.ends_with('/')
                || rest.starts_with(['/', '|', '[']) =>
        {
            Ok(rest)
        }
        _ => Err(NotNested {
            path: path.to_string(),
            parent: base.to_string(),
        }),
    }
}

/// Kind of terminology binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindingType {
    CodedText,
    Text,
    Decimal,
    Integer,
    Boolean,
    Date,
    Time,
    DateTime,
    Duration,
    #[serde(other)]
    Other,
}

/// A terminology binding: a set of coded terms from one terminology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerminologyBinding {
    #[serde(rename = "type")]
    pub binding_type: BindingType,
    #[serde(
        default,
        rename = "terminology",
        skip_serializing_if = "Option::is_none"
    )]
    pub terminology_id: Option<String>,
    #[serde(default, rename = "list")]
    pub terms: Vec<Term>,
}

impl TerminologyBinding {
    /// Terminology id used when a binding does not name one.
    pub const LOCAL: &'static str = "local";

    /// Create a coded-text binding.
    pub fn coded(terminology_id: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            binding_type: BindingType::CodedText,
            terminology_id: Some(terminology_id.into()),
            terms,
        }
    }

    /// Terminology id, defaulting to `local`.
    pub fn terminology(&self) -> &str {
        self.terminology_id.as_deref().unwrap_or(Self::LOCAL)
    }
}

/// A coded term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "value")]
    pub code: String,
    pub label: String,
    #[serde(
        default,
        rename = "localizedDescriptions",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub descriptions: BTreeMap<String, String>,
}

impl Term {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            descriptions: BTreeMap::new(),
        }
    }

    /// Add a localized description.
    pub fn described(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.descriptions.insert(language.into(), text.into());
        self
    }

    /// Description text, falling back to the label.
    pub fn description(&self) -> &str {
        self.descriptions
            .values()
            .next()
            .map(String::as_str)
            .unwrap_or(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn element(name: &str, path: &str) -> TemplateNode {
        TemplateNode::new(name, name, "DV_TEXT", path)
    }

    #[test]
    fn test_is_multi() {
        let node = element("a", "/a");
        assert!(!node.is_multi());
        assert!(node.clone().with_max(-1).is_multi());
        assert!(node.with_max(3).is_multi());
    }

    #[test]
    fn test_choices_in_children() {
        let parent = TemplateNode::new("p", "p", "CLUSTER", "/p")
            .with_child(element("a", "/p/a"))
            .with_child(TemplateNode::new("b", "b", "DV_TEXT", "/p/b"))
            .with_child(TemplateNode::new("b", "b", "DV_CODED_TEXT", "/p/b"))
            .with_child(element("c", "/p/c"));

        let choices = parent.choices_in_children();
        assert_eq!(choices.len(), 1);
        let group = &choices["/p/b"];
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].rm_type, "DV_TEXT");
        assert_eq!(group[1].rm_type, "DV_CODED_TEXT");
    }

    #[test]
    fn test_relativized() {
        let node = TemplateNode::new("p", "p", "CLUSTER", "/x/p")
            .with_child(element("a", "/x/p/a"))
            .with_child(element("b", "/x/p/b"));

        let relative = node.relativized("/x/p").unwrap();
        assert_eq!(relative.path, "");
        assert_eq!(relative.children[0].path, "/a");
        assert_eq!(relative.children[1].path, "/b");
        // the source node is untouched
        assert_eq!(node.children[0].path, "/x/p/a");
    }

    #[test]
    fn test_relativized_rejects_foreign_path() {
        let node = TemplateNode::new("p", "p", "CLUSTER", "/x/p").with_child(element("a", "/y/a"));
        let err = node.relativized("/x/p").unwrap_err();
        assert_eq!(err.path, "/y/a");
        assert_eq!(err.parent, "/x/p");
    }

    #[test]
    fn test_relative_path_segment_boundary() {
        assert_eq!(relative_path("/a/b", "/a/b"), Ok(""));
        assert_eq!(relative_path("/a/b/c", "/a/b"), Ok("/c"));
        assert_eq!(relative_path("/a/b[at0001]", "/a/b"), Ok("[at0001]"));
        assert_eq!(relative_path("/a/b|magnitude", "/a/b"), Ok("|magnitude"));
        assert_eq!(relative_path("/content[bp]", "/"), Ok("content[bp]"));

        let err = relative_path("/a/bc", "/a/b").unwrap_err();
        assert_eq!(
            err,
            NotNested {
                path: "/a/bc".into(),
                parent: "/a/b".into(),
            }
        );
    }

    #[test]
    fn test_relativized_rejects_sibling_prefix() {
        let node = TemplateNode::new("p", "p", "CLUSTER", "/x/p").with_child(element("a", "/x/pa"));
        let err = node.relativized("/x/p").unwrap_err();
        assert_eq!(err.path, "/x/pa");
    }

    #[test]
    fn test_term_description_fallback() {
        let term = Term::new("at0001", "Left arm");
        assert_eq!(term.description(), "Left arm");

        let term = term.described("en", "The left upper arm");
        assert_eq!(term.description(), "The left upper arm");
    }

    #[test]
    fn test_coded_binding() {
        let node = element("a", "/a")
            .with_input(TerminologyBinding {
                binding_type: BindingType::Text,
                terminology_id: None,
                terms: vec![],
            })
            .with_input(TerminologyBinding::coded(
                "local",
                vec![Term::new("at1", "One")],
            ));
        assert_eq!(node.coded_binding().unwrap().terms.len(), 1);
    }

    #[test]
    fn test_deserialize_defaults() {
        let node: TemplateNode = serde_json::from_str(
            r#"{
                "id": "systolic",
                "name": "Systolic",
                "rmType": "DV_QUANTITY",
                "path": "/data/systolic",
                "inputs": [
                    { "type": "CODED_TEXT", "list": [ { "value": "at1", "label": "One" } ] },
                    { "type": "SOMETHING_NEW" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(node.max_occurs, 1);
        assert!(!node.is_archetype_root);
        assert!(node.children.is_empty());
        assert_eq!(node.inputs[0].terminology(), "local");
        assert_eq!(node.inputs[1].binding_type, BindingType::Other);
    }
}
