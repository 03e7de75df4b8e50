//! Diagnostics
//!
//! Collects the non-fatal warnings raised while generating code. Each
//! distinct message is reported once per run, in the order it was first
//! raised, and forwarded to `tracing` at warn level as it arrives.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// What kind of identifier a generator had to conform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// Package or namespace conformed to a module name
    ConformedModuleName,
    /// Trait or specification name conformed to a class name
    ConformedClassName,
    /// Property id conformed to a variable name
    ConformedVariableName,
    /// Property id conformed to a property accessor name
    ConformedPropertyAccessor,
    /// Trait reference conformed to a trait getter name
    ConformedTraitGetter,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConformedModuleName => "W001",
            Self::ConformedClassName => "W002",
            Self::ConformedVariableName => "W003",
            Self::ConformedPropertyAccessor => "W004",
            Self::ConformedTraitGetter => "W005",
        }
    }

    /// The phrase used for this kind of identifier in messages
    pub fn subject(&self) -> &'static str {
        match self {
            Self::ConformedModuleName => "module name",
            Self::ConformedClassName => "class name",
            Self::ConformedVariableName => "variable name",
            Self::ConformedPropertyAccessor => "property accessor name",
            Self::ConformedTraitGetter => "trait getter name",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticItem {
    pub code: DiagnosticCode,
    pub message: String,
}

impl DiagnosticItem {
    /// A warning that `original` was rewritten as `conformed`
    pub fn conformed(code: DiagnosticCode, original: &str, conformed: &str) -> Self {
        Self {
            code,
            message: format!(
                "Conforming '{}' to '{}' for {}",
                original,
                conformed,
                code.subject()
            ),
        }
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Per-run collection of warnings, deduplicated by message
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
    seen: HashSet<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning unless the same message was already recorded.
    ///
    /// Returns whether the warning was new.
    pub fn push(&mut self, item: DiagnosticItem) -> bool {
        if !self.seen.insert(item.message.clone()) {
            return false;
        }
        warn!(code = item.code.as_str(), "{}", item.message);
        self.items.push(item);
        true
    }

    /// Record that an identifier was conformed
    pub fn conformed(&mut self, code: DiagnosticCode, original: &str, conformed: &str) {
        self.push(DiagnosticItem::conformed(code, original, conformed));
    }

    /// Warning messages in the order first raised
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        self.items
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conformed_message() {
        let item = DiagnosticItem::conformed(DiagnosticCode::ConformedClassName, "t&", "T");
        assert_eq!(item.message, "Conforming 't&' to 'T' for class name");
        assert_eq!(item.to_string(), "[W002] Conforming 't&' to 'T' for class name");
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.conformed(DiagnosticCode::ConformedModuleName, "a-b", "a_b");
        diagnostics.conformed(DiagnosticCode::ConformedVariableName, "x$", "x");
        diagnostics.conformed(DiagnosticCode::ConformedModuleName, "a-b", "a_b");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics.messages().collect::<Vec<_>>(),
            vec![
                "Conforming 'a-b' to 'a_b' for module name",
                "Conforming 'x$' to 'x' for variable name"
            ]
        );
    }

    #[test]
    fn test_same_input_different_subject_is_distinct() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.conformed(DiagnosticCode::ConformedPropertyAccessor, "p$", "P");
        diagnostics.conformed(DiagnosticCode::ConformedVariableName, "p$", "p");
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_new_run_starts_empty() {
        let mut first = Diagnostics::new();
        first.conformed(DiagnosticCode::ConformedClassName, "t&", "T");
        let second = Diagnostics::new();
        assert!(second.is_empty());
        assert_eq!(second.format_all(), "");
    }
}
