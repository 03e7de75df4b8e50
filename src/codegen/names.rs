//! Identifier Sanitizing
//!
//! Conforms arbitrary (possibly non-ASCII) model strings to legal
//! identifiers of a target language:
//! - Module names: `-` becomes `_` silently, anything else outside
//!   `[A-Za-z0-9_]` becomes `_`
//! - Class names and property accessors: upper camel case, alphanumeric only
//! - Variable names and trait getters: lower camel case, alphanumeric only
//!
//! Any change beyond the expected one is reported through `Diagnostics`.
//! The conformed result is then validated against the profile's keywords
//! and reserved patterns, which are hard errors.

use regex::Regex;

use super::config::RenderProfile;
use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::{Result, TraitgenError};
use crate::model::PropertyType;

/// Module names used for the generated package structure itself
const STRUCTURAL_NAMES: &[&str] = &["traits", "specifications"];

// =============================================================================
// Case Conversion
// =============================================================================

/// Split on runs of non-alphanumeric characters, upper-case the first
/// character of each token and join.
pub fn to_upper_camel_alnum(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(upper_first)
        .collect()
}

/// As `to_upper_camel_alnum`, with the first character lower-cased
pub fn to_lower_camel_alnum(s: &str) -> String {
    lower_first(&to_upper_camel_alnum(s))
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

// =============================================================================
// Sanitizer
// =============================================================================

/// Conforms model strings to identifiers for one target language
pub struct Sanitizer {
    profile: RenderProfile,
    /// Characters never allowed in a module name
    module_illegal: Regex,
    /// A complete legal identifier
    identifier: Regex,
}

impl Sanitizer {
    pub fn new(profile: RenderProfile) -> Self {
        Self {
            profile,
            module_illegal: Regex::new(r"[^a-zA-Z0-9_]").unwrap(),
            identifier: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap(),
        }
    }

    pub fn cpp() -> Self {
        Self::new(RenderProfile::cpp())
    }

    pub fn python() -> Self {
        Self::new(RenderProfile::python())
    }

    /// Conform a package or namespace id to a module name
    pub fn to_module_name(&self, s: &str, diagnostics: &mut Diagnostics) -> Result<String> {
        let no_hyphens = s.replace('-', "_");
        let module_name = self.module_illegal.replace_all(&no_hyphens, "_").into_owned();
        if module_name != no_hyphens {
            diagnostics.conformed(DiagnosticCode::ConformedModuleName, s, &module_name);
        }
        self.validate(&module_name, s, true)?;
        Ok(module_name)
    }

    /// Conform a trait or specification name to a class name
    pub fn to_class_name(&self, s: &str, diagnostics: &mut Diagnostics) -> Result<String> {
        let class_name = to_upper_camel_alnum(s);
        if class_name != s {
            diagnostics.conformed(DiagnosticCode::ConformedClassName, s, &class_name);
        }
        self.validate(&class_name, s, false)?;
        Ok(class_name)
    }

    /// Conform a property id to a variable name
    pub fn to_var_name(&self, s: &str, diagnostics: &mut Diagnostics) -> Result<String> {
        let var_name = to_lower_camel_alnum(s);
        if var_name != s {
            diagnostics.conformed(DiagnosticCode::ConformedVariableName, s, &var_name);
        }
        self.validate(&var_name, s, false)?;
        Ok(var_name)
    }

    /// Conform a property id to the suffix of its `get`/`set` accessors
    pub fn to_var_accessor_name(&self, s: &str, diagnostics: &mut Diagnostics) -> Result<String> {
        let accessor_name = to_upper_camel_alnum(s);
        if accessor_name != upper_first(s) {
            diagnostics.conformed(DiagnosticCode::ConformedPropertyAccessor, s, &accessor_name);
        }
        self.validate(&accessor_name, s, false)?;
        Ok(accessor_name)
    }

    /// Conform a trait reference's unique name parts to a getter name
    pub fn to_trait_accessor_name(
        &self,
        name_parts: &[String],
        diagnostics: &mut Diagnostics,
    ) -> Result<String> {
        let unique_name: String = name_parts.iter().map(|p| to_upper_camel_alnum(p)).collect();
        let accessor_name = to_lower_camel_alnum(&unique_name);
        if accessor_name != lower_first(&unique_name) {
            diagnostics.conformed(
                DiagnosticCode::ConformedTraitGetter,
                &unique_name,
                &accessor_name,
            );
        }
        self.validate(&accessor_name, &unique_name, false)?;
        Ok(accessor_name)
    }

    /// Target type for a property type
    pub fn to_type(&self, property_type: PropertyType) -> Result<&str> {
        self.profile.scalar_type(property_type)
    }

    pub fn is_moveable_type(&self, property_type: PropertyType) -> bool {
        self.profile.is_moveable(property_type)
    }

    fn validate(&self, conformed: &str, original: &str, is_module: bool) -> Result<()> {
        if conformed.is_empty() {
            return Err(TraitgenError::Identifier(format!(
                "Could not conform '{}' to a valid identifier.",
                original
            )));
        }
        if self.profile.is_keyword(conformed) {
            return Err(TraitgenError::Identifier(format!(
                "'{}' (from '{}') is a reserved keyword.",
                conformed, original
            )));
        }
        if self.profile.is_reserved_pattern(conformed)
            || (is_module && STRUCTURAL_NAMES.contains(&conformed))
        {
            return Err(TraitgenError::Identifier(format!(
                "'{}' (from '{}') is a reserved name.",
                conformed, original
            )));
        }
        if !self.identifier.is_match(conformed) {
            return Err(TraitgenError::Identifier(format!(
                "'{}' (from '{}') is not a valid {} identifier.",
                conformed,
                original,
                self.profile.language.display_name()
            )));
        }
        Ok(())
    }
}
