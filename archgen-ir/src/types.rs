//! Core type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host-native scalar a leaf resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Text,
    Boolean,
    /// 64-bit signed integer.
    Integer,
    Decimal,
    DateTime,
    Duration,
    Uri,
    /// A reference-model class, kept by its rmType name.
    Rm(String),
}

impl ScalarType {
    pub const CODE_PHRASE: &'static str = "CODE_PHRASE";
    pub const CODED_TEXT: &'static str = "DV_CODED_TEXT";
    pub const VERSION_UID: &'static str = "VERSION_UID";

    /// Reference-model class scalar.
    pub fn rm(name: impl Into<String>) -> Self {
        ScalarType::Rm(name.into())
    }

    /// Parse a scalar name as used in configuration files.
    ///
    /// Unknown names are taken as reference-model class names; an explicit
    /// `rm:` prefix is stripped.
    pub fn from_name(name: &str) -> Self {
        match name {
            "text" | "string" => ScalarType::Text,
            "boolean" | "bool" => ScalarType::Boolean,
            "integer" | "int" => ScalarType::Integer,
            "decimal" | "float" => ScalarType::Decimal,
            "date_time" => ScalarType::DateTime,
            "duration" => ScalarType::Duration,
            "uri" => ScalarType::Uri,
            other => ScalarType::Rm(other.strip_prefix("rm:").unwrap_or(other).to_string()),
        }
    }

    /// Get the lowercase name, or the rmType for reference-model classes.
    pub fn as_str(&self) -> &str {
        match self {
            ScalarType::Text => "text",
            ScalarType::Boolean => "boolean",
            ScalarType::Integer => "integer",
            ScalarType::Decimal => "decimal",
            ScalarType::DateTime => "date_time",
            ScalarType::Duration => "duration",
            ScalarType::Uri => "uri",
            ScalarType::Rm(name) => name,
        }
    }

    /// Returns true for the code-phrase shape.
    pub fn is_code_phrase(&self) -> bool {
        matches!(self, ScalarType::Rm(name) if name == Self::CODE_PHRASE)
    }

    /// Returns true if values of this scalar carry a terminology code.
    pub fn is_coded(&self) -> bool {
        matches!(self, ScalarType::Rm(name) if name == Self::CODE_PHRASE || name == Self::CODED_TEXT)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Rm(name) => write!(f, "rm:{}", name),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Reference to a generated (or shared) type by package and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub package: String,
    pub name: String,
}

impl TypeRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

/// Type of a generated field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Scalar(ScalarType),
    Named(TypeRef),
    List(Box<FieldType>),
}

impl FieldType {
    /// Wrap in a list when `multi` is set.
    pub fn list_if(self, multi: bool) -> Self {
        if multi {
            FieldType::List(Box::new(self))
        } else {
            self
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::List(_))
    }

    /// The element type with every list layer removed.
    pub fn element(&self) -> &FieldType {
        match self {
            FieldType::List(inner) => inner.element(),
            other => other,
        }
    }

    /// The referenced type, looking through lists.
    pub fn target(&self) -> Option<&TypeRef> {
        match self.element() {
            FieldType::Named(target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(scalar) => write!(f, "{}", scalar),
            FieldType::Named(target) => f.write_str(&target.name),
            FieldType::List(inner) => write!(f, "list<{}>", inner),
        }
    }
}
