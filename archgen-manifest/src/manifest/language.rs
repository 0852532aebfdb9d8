//! Naming targets.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Host language whose reserved words generated identifiers must avoid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Rust,
    TypeScript,
    Go,
}

impl Language {
    /// Returns the language identifier as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::TypeScript => "typescript",
            Language::Go => "go",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rust" | "rs" => Ok(Language::Rust),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "go" | "golang" => Ok(Language::Go),
            _ => Err(format!(
                "unknown naming target '{}', expected 'rust', 'typescript' or 'go'",
                s
            )),
        }
    }
}
