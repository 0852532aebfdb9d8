use archgen_ir::NotNested;
use thiserror::Error;

/// A template tree that breaks the structural contract of the generator.
///
/// Any of these aborts the run; no partial output model is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("path '{path}' is not nested under its parent path '{parent}'")]
    PathNotNested { path: String, parent: String },

    #[error("choice group at '{path}' has {alternatives} alternative(s), expected at least 2")]
    ChoiceTooSmall { path: String, alternatives: usize },

    #[error("template id is empty")]
    EmptyTemplateId,
}

impl From<NotNested> for GenerateError {
    fn from(err: NotNested) -> Self {
        GenerateError::PathNotNested {
            path: err.path,
            parent: err.parent,
        }
    }
}
