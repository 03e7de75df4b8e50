//! End-to-end tests of `generate` and `generate_with`

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use serde_json::Value;

use traitgen::{
    generate, generate_with, Diagnostics, GenerateOptions, Generator, PackageDeclaration,
    Result, TemplateGlobals, TraitgenError,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn options(description: &str, output_dir: &Path, generator: &str) -> GenerateOptions {
    GenerateOptions {
        description_path: fixture(description),
        output_dir: output_dir.to_path_buf(),
        generator: generator.to_string(),
        ..Default::default()
    }
}

/// Records what it was called with instead of writing files
#[derive(Default)]
struct RecordingGenerator {
    calls: RefCell<Vec<(String, TemplateGlobals)>>,
}

impl Generator for RecordingGenerator {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn generate(
        &self,
        package: &PackageDeclaration,
        globals: &TemplateGlobals,
        output_dir: &Path,
        on_create: &mut dyn FnMut(&Path),
        _diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        self.calls.borrow_mut().push((package.id.clone(), globals.clone()));
        on_create(output_dir);
        Ok(())
    }
}

#[test]
fn test_dry_run_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options("minimal.yaml", dir.path(), "cpp");
    options.dry_run = true;

    let mut created = Vec::new();
    let package =
        generate(&options, &[], &mut |path: &Path| created.push(path.to_path_buf())).unwrap();

    assert_eq!(package.id, "p-p");
    assert!(created.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_dry_run_does_not_need_a_generator() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options("minimal.yaml", dir.path(), "");
    options.dry_run = true;
    assert!(generate(&options, &[], &mut |_: &Path| {}).is_ok());
}

#[test]
fn test_unknown_generator_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate(&options("minimal.yaml", dir.path(), "Algol"), &[], &mut |_: &Path| {})
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(err.to_string(), "Could not find generator Algol");
}

#[test]
fn test_missing_generator_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err =
        generate(&options("minimal.yaml", dir.path(), ""), &[], &mut |_: &Path| {}).unwrap_err();
    assert_eq!(err.to_string(), "No generator specified");
}

#[test]
fn test_invalid_description_fails_before_generating() {
    let dir = tempfile::tempdir().unwrap();
    let mut created = 0;
    let options = options("invalid.yaml", dir.path(), "python");
    let err = generate(&options, &[], &mut |_: &Path| created += 1).unwrap_err();
    assert!(matches!(err, TraitgenError::Schema { .. }));
    assert_eq!(created, 0);
}

#[test]
fn test_generate_with_passes_merged_globals() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options("minimal.yaml", dir.path(), "ignored");
    options
        .template_globals
        .insert("copyrightOwner".to_string(), Value::String("Me".to_string()));
    options
        .template_globals
        .insert("generator".to_string(), Value::String("overridden".to_string()));

    let generator = RecordingGenerator::default();
    let mut created = Vec::new();
    generate_with(&options, &generator, &[], &mut |path: &Path| created.push(path.to_path_buf()))
        .unwrap();

    let calls = generator.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (package_id, globals) = &calls[0];
    assert_eq!(package_id, "p-p");
    assert_eq!(globals["generator"], "recording");
    assert_eq!(globals["copyrightOwner"], "Me");
    assert_eq!(globals["spdxLicenseIdentifier"], "Apache-2.0");
    assert!(globals.contains_key("copyrightDate"));
    assert_eq!(created, vec![dir.path().to_path_buf()]);
}

#[test]
fn test_generated_packages_chain_as_known_packages() {
    let dir = tempfile::tempdir().unwrap();
    let mut known = Vec::new();
    for description in ["traits-only.yaml", "all.yaml", "specifications-only.yaml"] {
        let options = options(description, dir.path(), "python");
        let package = generate(&options, &known, &mut |_: &Path| {}).unwrap();
        known.push(package);
    }

    let ids: Vec<&str> = known.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "openassetio-traitgen-test-traits-only",
            "openassetio-traitgen-test-all",
            "openassetio-traitgen-test-specifications-only",
        ]
    );
    for module in [
        "openassetio_traitgen_test_traits_only/__init__.py",
        "openassetio_traitgen_test_all/__init__.py",
        "openassetio_traitgen_test_specifications_only/specifications/test.py",
    ] {
        assert!(dir.path().join(module).is_file(), "missing {}", module);
    }
}
