//! Output model of one generation run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{EnumType, GeneratedType, InterfaceType, RecordType, TypeRef};

/// Generated types grouped by package, in emission order.
///
/// Each type appears under exactly one package. Types are never modified
/// after being pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputModel {
    /// The root record of the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<TypeRef>,
    packages: IndexMap<String, Vec<GeneratedType>>,
}

impl OutputModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a type to a package and return a reference to it.
    pub fn push(&mut self, package: impl Into<String>, ty: GeneratedType) -> TypeRef {
        let package = package.into();
        let type_ref = TypeRef::new(package.clone(), ty.name());
        self.packages.entry(package).or_default().push(ty);
        type_ref
    }

    /// Record which type is the root of the run.
    pub fn set_root(&mut self, root: TypeRef) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<&TypeRef> {
        self.root.as_ref()
    }

    /// The root record, if set.
    pub fn root_record(&self) -> Option<&RecordType> {
        self.root
            .as_ref()
            .and_then(|root| self.get(root))
            .and_then(GeneratedType::as_record)
    }

    /// Iterate packages in insertion order.
    pub fn packages(&self) -> impl Iterator<Item = (&str, &[GeneratedType])> {
        self.packages
            .iter()
            .map(|(name, types)| (name.as_str(), types.as_slice()))
    }

    /// Types of a single package.
    pub fn package(&self, name: &str) -> Option<&[GeneratedType]> {
        self.packages.get(name).map(Vec::as_slice)
    }

    /// Iterate every type with its package.
    pub fn types(&self) -> impl Iterator<Item = (&str, &GeneratedType)> {
        self.packages
            .iter()
            .flat_map(|(name, types)| types.iter().map(move |ty| (name.as_str(), ty)))
    }

    /// Resolve a type reference.
    pub fn get(&self, type_ref: &TypeRef) -> Option<&GeneratedType> {
        self.packages
            .get(&type_ref.package)?
            .iter()
            .find(|ty| ty.name() == type_ref.name)
    }

    /// Find a type by name in any package.
    pub fn find(&self, name: &str) -> Option<&GeneratedType> {
        self.types().map(|(_, ty)| ty).find(|ty| ty.name() == name)
    }

    pub fn records(&self) -> impl Iterator<Item = &RecordType> {
        self.types().filter_map(|(_, ty)| ty.as_record())
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceType> {
        self.types().filter_map(|(_, ty)| ty.as_interface())
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumType> {
        self.types().filter_map(|(_, ty)| ty.as_enum())
    }

    /// Total number of types across all packages.
    pub fn len(&self) -> usize {
        self.packages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::EnumType;

    #[test]
    fn test_push_and_lookup() {
        let mut model = OutputModel::new();
        assert!(model.is_empty());

        let device = model.push("a.b.definition", GeneratedType::Record(RecordType::new("Device")));
        let root = model.push("a.b", GeneratedType::Record(RecordType::new("Root")));
        model.set_root(root.clone());

        assert_eq!(device, TypeRef::new("a.b.definition", "Device"));
        assert_eq!(model.len(), 2);
        assert_eq!(model.root_record().unwrap().name, "Root");
        assert_eq!(model.find("Device").unwrap().name(), "Device");
        assert!(model.get(&TypeRef::new("a.b", "Device")).is_none());

        let packages: Vec<_> = model.packages().map(|(name, _)| name).collect();
        assert_eq!(packages, vec!["a.b.definition", "a.b"]);
    }

    #[test]
    fn test_kind_iterators() {
        let mut model = OutputModel::new();
        model.push("p", GeneratedType::Record(RecordType::new("A")));
        model.push(
            "p",
            GeneratedType::Enum(EnumType {
                name: "E".into(),
                terminology_id: "local".into(),
                constants: vec![],
            }),
        );

        assert_eq!(model.records().count(), 1);
        assert_eq!(model.enums().count(), 1);
        assert_eq!(model.interfaces().count(), 0);
        assert_eq!(model.package("p").unwrap().len(), 2);
    }
}
