//! Intermediate representation types for the archgen type generator.
//!
//! This crate holds both ends of a generation run: the template tree the
//! generator consumes and the bag of type definitions it produces.
//!
//! # Architecture
//!
//! ```text
//! template.json → archgen-manifest (parsing) → TemplateNode tree
//!               → archgen-codegen (walk) → OutputModel
//! ```
//!
//! The IR types are designed to be:
//! - Host-language agnostic (no rendering concerns)
//! - Immutable once appended to an [`OutputModel`]
//! - Serializable, so a downstream emitter can consume them out of process

mod generated;
mod output;
mod template;
mod types;

pub use generated::{
    EnumConstant, EnumType, GeneratedField, GeneratedType, InterfaceType, RecordType, TypeKind,
};
pub use output::OutputModel;
pub use template::{
    BindingType, ELEMENT, EVENT, INTERVAL_EVENT, NotNested, POINT_EVENT, Template, TemplateNode,
    Term, TerminologyBinding, relative_path,
};
pub use types::{FieldType, ScalarType, TypeRef};
