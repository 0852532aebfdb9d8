//! Diagnostic types for a generation run.
//!
//! Non-fatal conditions never abort generation; they are collected here and
//! returned next to the output model.

use serde::Serialize;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something was left out of the output.
    Warning,
    /// Informational message about how a name or type was derived.
    Info,
}

impl Severity {
    /// Returns true if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Which step of the walk produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Leaf type resolution.
    Resolve,
    /// Identifier derivation.
    Naming,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Resolve => "resolve",
            Phase::Naming => "naming",
        }
    }
}

/// A diagnostic message from a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The step that produced this diagnostic.
    pub phase: Phase,
    /// The diagnostic message.
    pub message: String,
    /// Optional template path the diagnostic refers to.
    pub location: Option<String>,
}

impl Diagnostic {
    /// Create a new warning diagnostic.
    pub fn warning(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            phase,
            message: message.into(),
            location: None,
        }
    }

    /// Create a new info diagnostic.
    pub fn info(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            phase,
            message: message.into(),
            location: None,
        }
    }

    /// Add a location to this diagnostic.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.phase.as_str(), self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}
