//! Code Generation
//!
//! Generators turn a resolved `PackageDeclaration` into a tree of source
//! files for one target language.
//!
//! Architecture:
//! - RenderProfile (`config`): per-language types, keywords and reserved names
//! - Sanitizer (`names`): conforms model strings to identifiers, with warnings
//! - Generators (`cpp`, `python`): emit files from the model and a sanitizer
//!
//! The key constraint: generators never see the raw description, only the
//! immutable model.

pub mod config;
pub mod cpp;
pub mod names;
pub mod python;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::Datelike;
use serde_json::Value;

use crate::diagnostics::Diagnostics;
use crate::error::{Result, TraitgenError};
use crate::model::{PackageDeclaration, SpecificationDeclaration};

pub use config::{Language, RenderProfile};
pub use names::Sanitizer;

/// Free-form values made available to generated file headers
pub type TemplateGlobals = serde_json::Map<String, Value>;

// =============================================================================
// Generator Interface
// =============================================================================

/// A target-language code generator
pub trait Generator {
    /// Name used to select this generator
    fn name(&self) -> &'static str;

    /// Generate code for `package` under `output_dir`.
    ///
    /// `on_create` is called once for every file or directory created, in
    /// creation order. Conformed identifiers are reported to `diagnostics`.
    fn generate(
        &self,
        package: &PackageDeclaration,
        globals: &TemplateGlobals,
        output_dir: &Path,
        on_create: &mut dyn FnMut(&Path),
        diagnostics: &mut Diagnostics,
    ) -> Result<()>;
}

/// Look up a built-in generator by name
pub fn generator_for(name: &str) -> Result<Box<dyn Generator>> {
    match name {
        "" => Err(TraitgenError::Configuration("No generator specified".to_string())),
        "cpp" => Ok(Box::new(cpp::CppGenerator::new())),
        "python" => Ok(Box::new(python::PythonGenerator::new())),
        other => Err(TraitgenError::Configuration(format!(
            "Could not find generator {}",
            other
        ))),
    }
}

// =============================================================================
// Template Globals
// =============================================================================

/// Globals every generation starts from
pub fn default_template_globals() -> TemplateGlobals {
    let mut globals = TemplateGlobals::new();
    globals.insert(
        "copyrightDate".to_string(),
        Value::String(chrono::Local::now().year().to_string()),
    );
    globals.insert(
        "spdxLicenseIdentifier".to_string(),
        Value::String("Apache-2.0".to_string()),
    );
    globals
}

/// Render a global as plain text, if set
pub fn global_str(globals: &TemplateGlobals, key: &str) -> Option<String> {
    match globals.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Lines of the copyright/licence header.
///
/// Empty unless `copyrightOwner` is set.
pub fn license_header(globals: &TemplateGlobals) -> Vec<String> {
    let Some(owner) = global_str(globals, "copyrightOwner") else {
        return Vec::new();
    };
    let mut lines = Vec::with_capacity(2);
    match global_str(globals, "copyrightDate") {
        Some(date) => lines.push(format!("Copyright {} {}", date, owner)),
        None => lines.push(format!("Copyright {}", owner)),
    }
    if let Some(spdx) = global_str(globals, "spdxLicenseIdentifier") {
        lines.push(format!("SPDX-License-Identifier: {}", spdx));
    }
    lines
}

/// The "do not edit" banner line
pub fn generated_banner(globals: &TemplateGlobals) -> String {
    match global_str(globals, "generator") {
        Some(generator) => format!(
            "WARNING: This file is auto-generated by traitgen ({} generator), do not edit.",
            generator
        ),
        None => "WARNING: This file is auto-generated by traitgen, do not edit.".to_string(),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Sorted ids of packages other than `package_id` referenced by the trait
/// sets of `specifications`
pub fn package_dependencies(
    package_id: &str,
    specifications: &[SpecificationDeclaration],
) -> Vec<String> {
    specifications
        .iter()
        .flat_map(|s| s.trait_set.iter())
        .filter(|r| r.is_external_to(package_id))
        .map(|r| r.package.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Documentation body for a declaration: description, usage and any
/// deprecation notice
pub fn doc_lines(description: &str, usage: &[String], deprecated: bool) -> Vec<String> {
    let mut lines: Vec<String> = description.lines().map(str::to_string).collect();
    if !usage.is_empty() {
        lines.push(format!("Usage: {}", usage.join(", ")));
    }
    if deprecated {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("@deprecated This declaration is deprecated.".to_string());
    }
    lines
}

/// Create a directory (and parents), reporting it once
pub(crate) fn create_dir(path: &Path, on_create: &mut dyn FnMut(&Path)) -> Result<()> {
    fs::create_dir_all(path)?;
    on_create(path);
    Ok(())
}

/// Write a file, reporting it once
pub(crate) fn write_file(
    path: &Path,
    contents: &str,
    on_create: &mut dyn FnMut(&Path),
) -> Result<()> {
    fs::write(path, contents)?;
    on_create(path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TraitReference;
    use crate::version::VersionToken;

    fn reference(package: &str, name: &str) -> TraitReference {
        TraitReference {
            id: format!("{}:ns.{}", package, name),
            package: package.to_string(),
            namespace: "ns".to_string(),
            name: name.to_string(),
            version: VersionToken::DEFAULT,
            unique_name_parts: vec![name.to_string()],
        }
    }

    fn specification(trait_set: Vec<TraitReference>) -> SpecificationDeclaration {
        SpecificationDeclaration {
            id: "S".to_string(),
            version: VersionToken::DEFAULT,
            description: String::new(),
            usage: vec![],
            deprecated: false,
            trait_set,
        }
    }

    #[test]
    fn test_generator_lookup() {
        assert_eq!(generator_for("cpp").unwrap().name(), "cpp");
        assert_eq!(generator_for("python").unwrap().name(), "python");
    }

    #[test]
    fn test_unknown_generator() {
        let err = generator_for("Algol").err().unwrap();
        assert_eq!(err.to_string(), "Could not find generator Algol");
        assert!(err.is_configuration());
        let err = generator_for("").err().unwrap();
        assert_eq!(err.to_string(), "No generator specified");
    }

    #[test]
    fn test_default_globals() {
        let globals = default_template_globals();
        let year = chrono::Local::now().year().to_string();
        assert_eq!(global_str(&globals, "copyrightDate"), Some(year));
        assert_eq!(global_str(&globals, "spdxLicenseIdentifier").as_deref(), Some("Apache-2.0"));
        assert!(!globals.contains_key("copyrightOwner"));
    }

    #[test]
    fn test_license_header_requires_owner() {
        let mut globals = default_template_globals();
        assert!(license_header(&globals).is_empty());

        globals.insert("copyrightOwner".to_string(), Value::String("Me".to_string()));
        globals.insert("copyrightDate".to_string(), Value::from(2023));
        assert_eq!(
            license_header(&globals),
            vec!["Copyright 2023 Me", "SPDX-License-Identifier: Apache-2.0"]
        );
    }

    #[test]
    fn test_package_dependencies_are_sorted_and_external() {
        let specifications = vec![
            specification(vec![reference("zed", "A"), reference("local", "B")]),
            specification(vec![reference("alpha", "C"), reference("zed", "D")]),
        ];
        assert_eq!(package_dependencies("local", &specifications), vec!["alpha", "zed"]);
    }

    #[test]
    fn test_doc_lines() {
        let usage = vec!["entity".to_string(), "relationship".to_string()];
        assert_eq!(
            doc_lines("A trait.", &usage, false),
            vec!["A trait.", "Usage: entity, relationship"]
        );
        assert_eq!(
            doc_lines("Old.", &[], true),
            vec!["Old.", "", "@deprecated This declaration is deprecated."]
        );
    }
}
