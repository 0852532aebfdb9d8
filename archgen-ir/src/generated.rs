//! Generated type definitions.
//!
//! These are the products of a generation run: records, polymorphic variant
//! groups (interfaces), and enumerations.

use serde::{Deserialize, Serialize};

use crate::{FieldType, TypeRef};

/// A generated type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratedType {
    Record(RecordType),
    Interface(InterfaceType),
    Enum(EnumType),
}

/// Discriminant of [`GeneratedType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Record,
    Interface,
    Enum,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Record => "record",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
        }
    }
}

impl GeneratedType {
    /// Type name, unique within a generation run.
    pub fn name(&self) -> &str {
        match self {
            GeneratedType::Record(record) => &record.name,
            GeneratedType::Interface(interface) => &interface.name,
            GeneratedType::Enum(enumeration) => &enumeration.name,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            GeneratedType::Record(_) => TypeKind::Record,
            GeneratedType::Interface(_) => TypeKind::Interface,
            GeneratedType::Enum(_) => TypeKind::Enum,
        }
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            GeneratedType::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match self {
            GeneratedType::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            GeneratedType::Enum(enumeration) => Some(enumeration),
            _ => None,
        }
    }
}

/// A record: an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<GeneratedField>,
    /// Interface this record implements, for choice alternatives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implements: Option<TypeRef>,
    /// Variant tag (the source rmType) used to pick this record when
    /// deserializing a choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminant: Option<String>,
    /// Archetype id, when built from an archetype-root node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype_id: Option<String>,
    /// Template id, set on the root record only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            implements: None,
            discriminant: None,
            archetype_id: None,
            template_id: None,
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&GeneratedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by its source path.
    pub fn field_at(&self, source_path: &str) -> Option<&GeneratedField> {
        self.fields.iter().find(|f| f.source_path == source_path)
    }
}

/// A polymorphic variant group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceType {
    pub name: String,
    /// Records implementing this interface, in template order.
    pub implementors: Vec<TypeRef>,
}

/// An enumeration built from a terminology value set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub terminology_id: String,
    pub constants: Vec<EnumConstant>,
}

/// One enumeration constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConstant {
    /// UPPER_SNAKE identifier.
    pub identifier: String,
    /// Display value of the term.
    pub value: String,
    pub description: String,
    pub terminology_id: String,
    pub code: String,
}

/// A field of a generated record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedField {
    /// Disambiguated identifier, unique within its record.
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Template path this field was derived from, relative to its record.
    pub source_path: String,
    /// True when the field's type is an interface (a choice).
    #[serde(default)]
    pub is_variant_selector: bool,
    /// True for the synthetic version-uid identity field.
    #[serde(default)]
    pub is_identity: bool,
}

impl GeneratedField {
    pub fn new(name: impl Into<String>, ty: FieldType, source_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            source_path: source_path.into(),
            is_variant_selector: false,
            is_identity: false,
        }
    }

    /// Mark this field as a choice selector.
    pub fn variant_selector(mut self) -> Self {
        self.is_variant_selector = true;
        self
    }

    /// Mark this field as the identity field.
    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }
}
