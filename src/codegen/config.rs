//! Codegen Configuration
//!
//! Per-language render profiles: property type mappings, reserved words and
//! identifier rules for each supported target.
//!
//! Key principle: the model is language-agnostic. Only sanitizing and
//! emission consult a profile.

use std::collections::HashSet;

use crate::error::{Result, TraitgenError};
use crate::model::PropertyType;

// =============================================================================
// Render Profile (Per-Language)
// =============================================================================

/// Language-specific rendering configuration
#[derive(Debug, Clone)]
pub struct RenderProfile {
    /// Language identifier
    pub language: Language,

    /// Type mappings for property types
    pub types: TypeMappings,

    /// Words that can never be used as identifiers
    pub keywords: HashSet<&'static str>,

    /// Whether the C++ reserved forms apply: `__` anywhere, or a leading
    /// `_` followed by an upper-case letter
    pub cpp_reserved_names: bool,
}

/// Supported target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Cpp,
    Python,
}

impl Language {
    /// Name used in error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cpp => "C++",
            Self::Python => "Python",
        }
    }
}

/// Target types for each supported property type
#[derive(Debug, Clone)]
pub struct TypeMappings {
    pub string: String,
    pub integer: String,
    pub float: String,
    pub boolean: String,
}

// =============================================================================
// Default Profiles
// =============================================================================

impl RenderProfile {
    /// The C++ profile (OpenAssetIO core types)
    pub fn cpp() -> Self {
        Self {
            language: Language::Cpp,
            types: TypeMappings {
                string: "openassetio::Str".to_string(),
                integer: "openassetio::Int".to_string(),
                float: "openassetio::Float".to_string(),
                boolean: "openassetio::Bool".to_string(),
            },
            keywords: CPP_KEYWORDS.iter().copied().collect(),
            cpp_reserved_names: true,
        }
    }

    /// The Python profile (builtin types)
    pub fn python() -> Self {
        Self {
            language: Language::Python,
            types: TypeMappings {
                string: "str".to_string(),
                integer: "int".to_string(),
                float: "float".to_string(),
                boolean: "bool".to_string(),
            },
            keywords: PYTHON_KEYWORDS.iter().copied().collect(),
            cpp_reserved_names: false,
        }
    }
}

// =============================================================================
// Render Helpers
// =============================================================================

impl RenderProfile {
    /// Get the target type for a property type
    pub fn scalar_type(&self, property_type: PropertyType) -> Result<&str> {
        match property_type {
            PropertyType::String => Ok(&self.types.string),
            PropertyType::Integer => Ok(&self.types.integer),
            PropertyType::Float => Ok(&self.types.float),
            PropertyType::Bool => Ok(&self.types.boolean),
            PropertyType::Dict => Err(TraitgenError::TypeMapping(
                "Dictionary types are not yet supported as trait properties".to_string(),
            )),
        }
    }

    /// Whether values of this type are worth moving rather than copying
    pub fn is_moveable(&self, property_type: PropertyType) -> bool {
        matches!(property_type, PropertyType::String | PropertyType::Dict)
    }

    pub fn is_keyword(&self, name: &str) -> bool {
        self.keywords.contains(name)
    }

    /// Whether a name matches a pattern reserved for the implementation
    pub fn is_reserved_pattern(&self, name: &str) -> bool {
        if name.starts_with("__") {
            return true;
        }
        if !self.cpp_reserved_names {
            return false;
        }
        let mut chars = name.chars();
        name.contains("__")
            || (chars.next() == Some('_') && chars.next().map_or(false, |c| c.is_ascii_uppercase()))
    }
}

// =============================================================================
// Keywords
// =============================================================================

const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "atomic_cancel", "atomic_commit",
    "atomic_noexcept", "auto", "bitand", "bitor", "bool", "break", "case", "catch",
    "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept", "const",
    "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double",
    "dynamic_cast", "else", "enum", "explicit", "export", "extern", "false", "float",
    "for", "friend", "goto", "if", "inline", "int", "long", "mutable", "namespace",
    "new", "noexcept", "not", "not_eq", "nullptr", "operator", "or", "or_eq",
    "private", "protected", "public", "reflexpr", "register", "reinterpret_cast",
    "requires", "return", "short", "signed", "sizeof", "static", "static_assert",
    "static_cast", "struct", "switch", "synchronized", "template", "this",
    "thread_local", "throw", "true", "try", "typedef", "typeid", "typename", "union",
    "unsigned", "using", "virtual", "void", "volatile", "wchar_t", "while", "xor",
    "xor_eq",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];
