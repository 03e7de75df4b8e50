//! Traitgen
//!
//! Generates strongly-typed trait and specification view classes from
//! declarative package descriptions.
//!
//! ## Pipeline
//!
//! ```text
//! description.yaml
//!   └─ description::load_path    untyped tree (serde_json::Value)
//!      └─ validate::validate     typed PackageDescription (schema-checked)
//!         └─ builder::build      resolved, sorted PackageDeclaration
//!            └─ codegen          cpp / python file trees
//! ```
//!
//! ## Features
//!
//! - **Strict input**: descriptions are validated against an embedded JSON
//!   Schema before anything is built
//! - **Deterministic model**: namespaces, members and trait sets are sorted,
//!   so generated output never depends on input ordering
//! - **Cross-package references**: specifications may compose traits from
//!   previously built packages
//! - **Safe identifiers**: every emitted name is conformed to the target
//!   language, with a warning whenever a name had to change

pub mod builder;
pub mod codegen;
pub mod config;
pub mod description;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod validate;
pub mod version;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

pub use builder::{build, TraitIndex};
pub use codegen::{default_template_globals, generator_for, Generator, TemplateGlobals};
pub use config::TraitgenConfig;
pub use diagnostics::Diagnostics;
pub use error::{Result, TraitgenError};
pub use model::{
    NamespaceDeclaration, PackageDeclaration, PropertyDeclaration, PropertyType,
    SpecificationDeclaration, TraitDeclaration, TraitReference,
};
pub use version::VersionToken;

/// Options for a single description-to-code run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// The description to generate from
    pub description_path: PathBuf,
    /// Root directory for generated files
    pub output_dir: PathBuf,
    /// Name of the generator to run
    pub generator: String,
    /// Validate, build and log the structure, but generate nothing
    pub dry_run: bool,
    /// Merged over `default_template_globals()`
    pub template_globals: TemplateGlobals,
}

/// Load, validate and build a description.
///
/// Traits of `known_packages` may be referenced by its specifications.
pub fn load_package(
    path: &Path,
    known_packages: &[PackageDeclaration],
) -> Result<PackageDeclaration> {
    let raw = description::load_path(path)?;
    let description = validate::validate(&raw)?;
    builder::build(&description, known_packages)
}

/// Generate code for one description with a built-in generator.
///
/// Returns the built package so it can be passed on as a known package to
/// later runs. The generator is only looked up when not a dry run.
pub fn generate(
    options: &GenerateOptions,
    known_packages: &[PackageDeclaration],
    on_create: &mut dyn FnMut(&Path),
) -> Result<PackageDeclaration> {
    let package = load_package(&options.description_path, known_packages)?;
    log_structure(&package);

    if options.dry_run {
        return Ok(package);
    }

    let generator = generator_for(&options.generator)?;
    run_generator(&package, generator.as_ref(), options, on_create)?;
    Ok(package)
}

/// As `generate`, with a caller-supplied generator
pub fn generate_with(
    options: &GenerateOptions,
    generator: &dyn Generator,
    known_packages: &[PackageDeclaration],
    on_create: &mut dyn FnMut(&Path),
) -> Result<PackageDeclaration> {
    let package = load_package(&options.description_path, known_packages)?;
    log_structure(&package);

    if !options.dry_run {
        run_generator(&package, generator, options, on_create)?;
    }
    Ok(package)
}

/// The globals a generator is run with: defaults, then the caller's
/// values, then the generator name (which cannot be overridden).
pub fn template_globals_for(generator: &str, overrides: &TemplateGlobals) -> TemplateGlobals {
    let mut globals = default_template_globals();
    for (key, value) in overrides {
        globals.insert(key.clone(), value.clone());
    }
    globals.insert("generator".to_string(), Value::String(generator.to_string()));
    globals
}

fn run_generator(
    package: &PackageDeclaration,
    generator: &dyn Generator,
    options: &GenerateOptions,
    on_create: &mut dyn FnMut(&Path),
) -> Result<()> {
    let globals = template_globals_for(generator.name(), &options.template_globals);
    let mut diagnostics = Diagnostics::new();

    info!("Generating with generator {}...", generator.name());
    generator.generate(package, &globals, &options.output_dir, on_create, &mut diagnostics)?;

    if !diagnostics.is_empty() {
        info!(warnings = diagnostics.len(), "Generation finished with conformed identifiers");
    }
    Ok(())
}

/// Log the package's namespaces and member names at info level
fn log_structure(package: &PackageDeclaration) {
    info!("Package: {}", package.id);
    info!("Traits:");
    for namespace in &package.traits {
        info!("{}:", namespace.id);
        for name in namespace.member_names() {
            info!("  - {}", name);
        }
    }
    info!("Specifications:");
    for namespace in &package.specifications {
        info!("{}:", namespace.id);
        for name in namespace.member_names() {
            info!("  - {}", name);
        }
    }
}
