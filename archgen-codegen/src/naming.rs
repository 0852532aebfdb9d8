//! Naming conventions and name disambiguation.
//!
//! A [`NameTable`] is one collision scope: the run-wide type-name scope or
//! the field scope of a single record. Names are claimed from a sequence of
//! ever wider candidates; when all of them are taken a numeric suffix is
//! appended to the widest one.

use std::collections::HashMap;

use archgen_manifest::Language;
use tracing::trace;

/// Separator between the segments of a name label.
pub const SEGMENT_SEPARATOR: char = '_';

/// Language-specific naming constraints.
#[derive(Debug, Clone, Copy)]
pub struct NamingConvention {
    /// Words that may not be used as identifiers.
    pub reserved_words: &'static [&'static str],
}

impl NamingConvention {
    /// Naming convention for a target language.
    pub fn for_language(language: Language) -> &'static NamingConvention {
        match language {
            Language::Rust => &RUST_NAMING,
            Language::TypeScript => &TYPESCRIPT_NAMING,
            Language::Go => &GO_NAMING,
        }
    }

    /// Check if a name is a reserved word.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_words.contains(&name)
    }

    /// Check that a name is a well-formed, non-reserved identifier.
    pub fn is_valid_identifier(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let well_formed = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        well_formed && !self.is_reserved(name)
    }
}

/// Rust naming conventions.
pub const RUST_NAMING: NamingConvention = NamingConvention {
    reserved_words: &[
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
        "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
        "final", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
    ],
};

/// TypeScript naming conventions.
pub const TYPESCRIPT_NAMING: NamingConvention = NamingConvention {
    reserved_words: &[
        "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
        "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
        "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
        "true", "try", "typeof", "var", "void", "while", "with", "as", "implements", "interface",
        "let", "package", "private", "protected", "public", "static", "yield", "any", "boolean",
        "constructor", "declare", "get", "module", "require", "number", "set", "string",
        "symbol", "type", "from", "of", "async", "await",
    ],
};

/// Go naming conventions.
pub const GO_NAMING: NamingConvention = NamingConvention {
    reserved_words: &[
        "break",
        "case",
        "chan",
        "const",
        "continue",
        "default",
        "defer",
        "else",
        "fallthrough",
        "for",
        "func",
        "go",
        "goto",
        "if",
        "import",
        "interface",
        "map",
        "package",
        "range",
        "return",
        "select",
        "struct",
        "switch",
        "type",
        "var",
    ],
};

/// Split a name label into its non-blank segments, outermost first.
pub fn split_segments(label: &str) -> Vec<&str> {
    label
        .split(SEGMENT_SEPARATOR)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Labels to try for a segment list, innermost segment alone first, then
/// progressively including outer segments.
pub fn widening_labels(segments: &[&str], prefix: Option<&str>) -> Vec<String> {
    (1..=segments.len().max(1))
        .map(|width| {
            let start = segments.len().saturating_sub(width);
            let joined = segments[start..].join("_");
            match prefix {
                Some(prefix) => format!("{}_{}", prefix, joined),
                None => joined,
            }
        })
        .collect()
}

/// A name claimed from a [`NameTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claimed {
    pub name: String,
    /// True when every candidate was taken and a numeric suffix was added.
    pub suffixed: bool,
}

/// One name-collision scope.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    /// Times each base name has been handed out.
    counts: HashMap<String, usize>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.counts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Claim the first free, valid candidate.
    ///
    /// Falls back to suffixing the last candidate with the next free count.
    /// The accepted name is always recorded in the table.
    pub fn claim<I>(&mut self, candidates: I, naming: &NamingConvention) -> Claimed
    where
        I: IntoIterator<Item = String>,
    {
        let mut last = None;
        for candidate in candidates {
            if !self.contains(&candidate) && naming.is_valid_identifier(&candidate) {
                self.counts.insert(candidate.clone(), 1);
                return Claimed {
                    name: candidate,
                    suffixed: false,
                };
            }
            trace!(candidate = %candidate, "name unavailable, widening");
            last = Some(candidate);
        }

        let base = last.unwrap_or_else(|| "_".to_string());
        let mut count = self.counts.get(&base).copied().unwrap_or(0);
        let name = loop {
            count += 1;
            let name = format!("{}{}", base, count);
            if !self.contains(&name) && naming.is_valid_identifier(&name) {
                break name;
            }
        };
        self.counts.insert(base, count);
        self.counts.insert(name.clone(), 1);
        Claimed {
            name,
            suffixed: true,
        }
    }
}
