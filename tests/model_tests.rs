//! Model Building Tests
//!
//! Builds the fixture packages and checks ids, ordering and trait
//! resolution across packages.

use std::path::{Path, PathBuf};

use serde_json::Value;

use traitgen::description::parse_str;
use traitgen::validate::validate;
use traitgen::{build, load_package, PackageDeclaration, TraitgenError};

const ALL: &str = "openassetio-traitgen-test-all";
const TRAITS_ONLY: &str = "openassetio-traitgen-test-traits-only";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn traits_only() -> PackageDeclaration {
    load_package(&fixture("traits-only.yaml"), &[]).unwrap()
}

fn all_package() -> PackageDeclaration {
    load_package(&fixture("all.yaml"), &[traits_only()]).unwrap()
}

fn member_ids<M>(
    namespace: &traitgen::NamespaceDeclaration<M>,
    id: impl Fn(&M) -> String,
) -> Vec<String> {
    namespace.members.iter().map(id).collect()
}

// =============================================================================
// Traits
// =============================================================================

#[test]
fn test_trait_namespaces_are_sorted() {
    let package = all_package();
    let ids: Vec<&str> = package.traits.iter().map(|ns| ns.id.as_str()).collect();
    assert_eq!(ids, vec!["aNamespace", "anotherNamespace"]);
}

#[test]
fn test_trait_ids_include_non_default_versions() {
    let package = all_package();
    let ids = member_ids(&package.traits[0], |t| t.id.clone());
    assert_eq!(
        ids,
        vec![
            format!("{}:aNamespace.AllProperties", ALL),
            format!("{}:aNamespace.MultipleVersions", ALL),
            format!("{}:aNamespace.MultipleVersions.v2", ALL),
            format!("{}:aNamespace.NoProperties", ALL),
            format!("{}:aNamespace.NoPropertiesMultipleUsage", ALL),
        ]
    );
}

#[test]
fn test_trait_properties_and_usage() {
    let package = all_package();
    let all_properties = &package.traits[0].members[0];
    let properties: Vec<&str> = all_properties.properties.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(properties, vec!["boolProperty", "floatProperty", "intProperty", "stringProperty"]);
    assert_eq!(all_properties.properties[0].description, "A boolean property.");

    let multiple_usage = &package.traits[0].members[4];
    assert_eq!(multiple_usage.usage, vec!["entity", "relationship"]);
    assert!(multiple_usage.properties.is_empty());
}

#[test]
fn test_versions_have_their_own_properties() {
    let package = all_package();
    let v1 = &package.traits[0].members[1];
    let v2 = &package.traits[0].members[2];
    assert_eq!(v1.properties[0].id, "oldProperty");
    assert_eq!(v2.properties[0].id, "newProperty");
    assert_eq!(v2.version.number(), 2);
}

// =============================================================================
// Specifications
// =============================================================================

#[test]
fn test_specifications_are_sorted_by_name_and_version() {
    let package = all_package();
    let test = &package.specifications[0];
    assert_eq!(test.id, "test");
    let ids = member_ids(test, |s| format!("{}{}", s.id, s.version.id_suffix()));
    assert_eq!(
        ids,
        vec![
            "LocalAndExternalTrait",
            "MultipleVersionsOfTrait",
            "MultipleVersionsOfTrait.v2",
            "OneExternalTrait",
            "TwoLocalTraits",
        ]
    );
}

#[test]
fn test_local_and_external_trait_needs_package_to_disambiguate() {
    let package = all_package();
    let spec = &package.specifications[0].members[0];
    assert_eq!(spec.usage, vec!["entity", "managementPolicy"]);

    let ids: Vec<&str> = spec.trait_set.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            format!("{}:aNamespace.NoProperties", ALL),
            format!("{}:aNamespace.NoProperties", TRAITS_ONLY),
        ]
    );
    assert_eq!(spec.trait_set[0].unique_name_parts, vec![ALL, "aNamespace", "NoProperties"]);
    assert_eq!(
        spec.trait_set[1].unique_name_parts,
        vec![TRAITS_ONLY, "aNamespace", "NoProperties"]
    );
    assert!(!spec.trait_set[0].is_external_to(ALL));
    assert!(spec.trait_set[1].is_external_to(ALL));
}

#[test]
fn test_multiple_versions_of_trait_resolve_to_each_version() {
    let package = all_package();
    let v1 = &package.specifications[0].members[1];
    let v2 = &package.specifications[0].members[2];

    assert_eq!(v1.trait_set[0].id, format!("{}:aNamespace.MultipleVersions", ALL));
    assert_eq!(v2.trait_set[0].id, format!("{}:aNamespace.MultipleVersions.v2", ALL));
    for spec in [v1, v2] {
        let parts: Vec<&Vec<String>> =
            spec.trait_set.iter().map(|r| &r.unique_name_parts).collect();
        assert_eq!(
            parts,
            vec![&vec!["MultipleVersions".to_string()], &vec!["NoProperties".to_string()]]
        );
    }
}

#[test]
fn test_one_external_trait() {
    let package = all_package();
    let spec = &package.specifications[0].members[3];
    assert_eq!(spec.trait_set.len(), 1);
    assert_eq!(spec.trait_set[0].id, format!("{}:test.Another", TRAITS_ONLY));
    assert_eq!(spec.trait_set[0].unique_name_parts, vec!["Another"]);
}

#[test]
fn test_two_local_traits_need_namespace_to_disambiguate() {
    let package = all_package();
    let spec = &package.specifications[0].members[4];
    let parts: Vec<Vec<String>> =
        spec.trait_set.iter().map(|r| r.unique_name_parts.clone()).collect();
    assert_eq!(
        parts,
        vec![vec!["aNamespace", "NoProperties"], vec!["anotherNamespace", "NoProperties"]]
    );
}

#[test]
fn test_specifications_only_package_references_two_packages() {
    let traits_only = traits_only();
    let all = load_package(&fixture("all.yaml"), &[traits_only.clone()]).unwrap();
    let package = load_package(&fixture("specifications-only.yaml"), &[traits_only, all]).unwrap();

    assert!(package.traits.is_empty());
    let spec = &package.specifications[0].members[0];
    let ids: Vec<&str> = spec.trait_set.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            format!("{}:aNamespace.AllProperties", ALL),
            format!("{}:test.Another", TRAITS_ONLY),
        ]
    );
    assert!(spec.trait_set.iter().all(|r| r.is_external_to(&package.id)));
}

// =============================================================================
// Determinism
// =============================================================================

/// Reverse every mapping and sequence in a description tree
fn reversed(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.reverse();
            Value::Object(entries.into_iter().map(|(k, v)| (k, reversed(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().rev().map(reversed).collect()),
        other => other,
    }
}

#[test]
fn test_model_does_not_depend_on_input_order() {
    let text = include_str!("fixtures/all.yaml");
    let raw = parse_str(text, "all.yaml").unwrap();
    let known = vec![traits_only()];

    let forward = build(&validate(&raw).unwrap(), &known).unwrap();
    let backward = build(&validate(&reversed(raw)).unwrap(), &known).unwrap();

    // Properties and usage keep declaration order, so only compare the rest
    let strip = |mut package: PackageDeclaration| {
        for namespace in &mut package.traits {
            for declaration in &mut namespace.members {
                declaration.properties.sort_by(|a, b| a.id.cmp(&b.id));
                declaration.usage.sort();
            }
        }
        for namespace in &mut package.specifications {
            for declaration in &mut namespace.members {
                declaration.usage.sort();
            }
        }
        package
    };
    assert_eq!(strip(forward), strip(backward));
}

#[test]
fn test_known_package_with_same_id_is_ignored() {
    let traits_only = traits_only();
    let first = load_package(&fixture("all.yaml"), &[traits_only.clone()]).unwrap();
    let second = load_package(&fixture("all.yaml"), &[traits_only, first.clone()]).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_missing_external_package_is_resolution_error() {
    let err = load_package(&fixture("all.yaml"), &[]).unwrap_err();
    match err {
        TraitgenError::Resolution(message) => {
            assert!(message.starts_with("Unable to resolve trait"), "{}", message);
            assert!(message.contains(TRAITS_ONLY), "{}", message);
        }
        other => panic!("Expected Resolution error, got {:?}", other),
    }
}

#[test]
fn test_unresolved_trait_is_named() {
    let err = load_package(&fixture("unresolved.yaml"), &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unable to resolve trait 'elsewhere:ns.Missing.v3' referenced by specification \
         'test.Dangling' of package 'unresolved'"
    );
}

#[test]
fn test_invalid_description_is_schema_error() {
    let err = load_package(&fixture("invalid.yaml"), &[]).unwrap_err();
    match err {
        TraitgenError::Schema { path, .. } => {
            assert_eq!(path, "/traits/ns/members/Broken/versions/1/properties/value/type");
        }
        other => panic!("Expected Schema error, got {:?}", other),
    }
}
