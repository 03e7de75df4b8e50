//! Model Builder
//!
//! Turns a validated description into a resolved `PackageDeclaration`:
//!
//! 1. Expand every member into one declaration per version.
//! 2. Sort namespaces by id and members by (name, version). Properties keep
//!    their declared order since generated accessors follow it.
//! 3. Resolve every trait-set entry against a read-only `TraitIndex` built
//!    from the package's own traits and all known packages.
//! 4. Compute the shortest disambiguating `unique_name_parts` for each
//!    reference within its specification.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::description::{
    NamespaceDescription, PackageDescription, SpecificationMember, TraitMember, TraitSetEntry,
};
use crate::error::{Result, TraitgenError};
use crate::model::{
    NamespaceDeclaration, PackageDeclaration, PropertyDeclaration, SpecificationDeclaration,
    TraitDeclaration, TraitReference,
};
use crate::version::VersionToken;

// =============================================================================
// Trait Index
// =============================================================================

/// Lookup key for a trait declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraitKey {
    pub package: String,
    pub namespace: String,
    pub name: String,
    pub version: VersionToken,
}

impl TraitKey {
    /// The declaration id this key would have
    pub fn declaration_id(&self) -> String {
        format!(
            "{}:{}.{}{}",
            self.package,
            self.namespace,
            self.name,
            self.version.id_suffix()
        )
    }
}

/// Read-only index of every trait visible to a package being built.
///
/// Built once, before any specification is resolved.
#[derive(Debug, Default)]
pub struct TraitIndex {
    ids: HashMap<TraitKey, String>,
}

impl TraitIndex {
    /// Index the traits of the given packages
    pub fn new<'a>(packages: impl IntoIterator<Item = &'a PackageDeclaration>) -> Self {
        let mut index = Self::default();
        for package in packages {
            index.insert_traits(&package.id, &package.traits);
        }
        index
    }

    fn insert_traits(
        &mut self,
        package_id: &str,
        namespaces: &[NamespaceDeclaration<TraitDeclaration>],
    ) {
        for namespace in namespaces {
            for declaration in &namespace.members {
                let key = TraitKey {
                    package: package_id.to_string(),
                    namespace: namespace.id.clone(),
                    name: declaration.name.clone(),
                    version: declaration.version,
                };
                self.ids.insert(key, declaration.id.clone());
            }
        }
    }

    /// Get the declaration id for a key, if declared
    pub fn get(&self, key: &TraitKey) -> Option<&str> {
        self.ids.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Build the resolved model for a description.
///
/// `known_packages` are previously built packages whose traits may be
/// referenced by this package's specifications. A known package with the
/// same id as the description is ignored in favour of the description.
pub fn build(
    description: &PackageDescription,
    known_packages: &[PackageDeclaration],
) -> Result<PackageDeclaration> {
    let package_id = description.package.as_str();

    let traits = build_namespaces(&description.traits, |ns_id, name, member| {
        build_traits(package_id, ns_id, name, member)
    });

    let mut index = TraitIndex::new(known_packages.iter().filter(|p| p.id != package_id));
    index.insert_traits(package_id, &traits);
    debug!(package = package_id, traits = index.len(), "Built trait index");

    let specifications = try_build_namespaces(&description.specifications, |ns_id, name, member| {
        build_specifications(package_id, ns_id, name, member, &index)
    })?;

    Ok(PackageDeclaration {
        id: description.package.clone(),
        description: description.description.clone(),
        traits,
        specifications,
    })
}

// =============================================================================
// Namespaces
// =============================================================================

fn build_namespaces<M, D, F>(
    namespaces: &IndexMap<String, NamespaceDescription<M>>,
    mut build_member: F,
) -> Vec<NamespaceDeclaration<D>>
where
    F: FnMut(&str, &str, &M) -> Vec<D>,
    D: crate::model::Member,
{
    try_build_namespaces(namespaces, |ns, name, member| Ok(build_member(ns, name, member)))
        .unwrap_or_default()
}

fn try_build_namespaces<M, D, F>(
    namespaces: &IndexMap<String, NamespaceDescription<M>>,
    mut build_member: F,
) -> Result<Vec<NamespaceDeclaration<D>>>
where
    F: FnMut(&str, &str, &M) -> Result<Vec<D>>,
    D: crate::model::Member,
{
    let mut declarations = Vec::with_capacity(namespaces.len());

    for (ns_id, namespace) in namespaces {
        let mut members = Vec::new();
        for (name, member) in &namespace.members {
            members.extend(build_member(ns_id, name, member)?);
        }
        members.sort_by(|a, b| (a.name(), a.version()).cmp(&(b.name(), b.version())));

        debug!(namespace = ns_id.as_str(), members = members.len(), "Built namespace");
        declarations.push(NamespaceDeclaration {
            id: ns_id.clone(),
            description: namespace.description.clone(),
            members,
        });
    }

    declarations.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(declarations)
}

// =============================================================================
// Traits
// =============================================================================

fn build_traits(
    package_id: &str,
    ns_id: &str,
    name: &str,
    member: &TraitMember,
) -> Vec<TraitDeclaration> {
    member
        .resolved_versions()
        .into_iter()
        .map(|(version, body)| {
            let key = TraitKey {
                package: package_id.to_string(),
                namespace: ns_id.to_string(),
                name: name.to_string(),
                version,
            };
            TraitDeclaration {
                id: key.declaration_id(),
                name: name.to_string(),
                version,
                description: body
                    .description
                    .or_else(|| member.description.clone())
                    .unwrap_or_default(),
                usage: body.usage.or_else(|| member.usage.clone()).unwrap_or_default(),
                deprecated: body.deprecated.or(member.deprecated).unwrap_or(false),
                properties: body
                    .properties
                    .into_iter()
                    .map(|(id, property)| PropertyDeclaration {
                        id,
                        type_: property.type_,
                        description: property.description,
                    })
                    .collect(),
            }
        })
        .collect()
}

// =============================================================================
// Specifications
// =============================================================================

fn build_specifications(
    package_id: &str,
    ns_id: &str,
    name: &str,
    member: &SpecificationMember,
    index: &TraitIndex,
) -> Result<Vec<SpecificationDeclaration>> {
    member
        .resolved_versions()
        .into_iter()
        .map(|(version, body)| {
            let owner = format!("{}.{}{}", ns_id, name, version.id_suffix());
            let trait_set = resolve_trait_set(package_id, &owner, &body.trait_set, index)?;
            Ok(SpecificationDeclaration {
                id: name.to_string(),
                version,
                description: body
                    .description
                    .or_else(|| member.description.clone())
                    .unwrap_or_default(),
                usage: body.usage.or_else(|| member.usage.clone()).unwrap_or_default(),
                deprecated: body.deprecated.or(member.deprecated).unwrap_or(false),
                trait_set,
            })
        })
        .collect()
}

/// Resolve a specification's trait set, sorted by trait id with exact
/// duplicates removed.
fn resolve_trait_set(
    package_id: &str,
    owner: &str,
    entries: &[TraitSetEntry],
    index: &TraitIndex,
) -> Result<Vec<TraitReference>> {
    let mut resolved: Vec<(TraitKey, String)> = Vec::with_capacity(entries.len());

    for entry in entries {
        let version = match &entry.version {
            Some(value) => value.token().ok_or_else(|| {
                TraitgenError::Resolution(format!(
                    "Invalid trait version in specification '{}' of package '{}'",
                    owner, package_id
                ))
            })?,
            None => VersionToken::DEFAULT,
        };
        let key = TraitKey {
            package: entry.package.clone().unwrap_or_else(|| package_id.to_string()),
            namespace: entry.namespace.clone(),
            name: entry.name.clone(),
            version,
        };
        let id = index.get(&key).map(str::to_string).ok_or_else(|| {
            TraitgenError::Resolution(format!(
                "Unable to resolve trait '{}' referenced by specification '{}' of package '{}'",
                key.declaration_id(),
                owner,
                package_id
            ))
        })?;
        resolved.push((key, id));
    }

    resolved.sort_by(|a, b| a.1.cmp(&b.1));
    resolved.dedup_by(|a, b| a.1 == b.1);

    let mut seen = HashSet::new();
    for (key, _) in &resolved {
        if !seen.insert((&key.package, &key.namespace, &key.name)) {
            return Err(TraitgenError::Resolution(format!(
                "Specification '{}' of package '{}' references more than one version of trait '{}:{}.{}'",
                owner, package_id, key.package, key.namespace, key.name
            )));
        }
    }

    let keys: Vec<&TraitKey> = resolved.iter().map(|(key, _)| key).collect();
    let parts = unique_name_parts(&keys);

    Ok(resolved
        .iter()
        .zip(parts)
        .map(|((key, id), unique_name_parts)| TraitReference {
            id: id.clone(),
            package: key.package.clone(),
            namespace: key.namespace.clone(),
            name: key.name.clone(),
            version: key.version,
            unique_name_parts,
        })
        .collect())
}

/// Shortest unique (package, namespace, name) suffix for each key.
///
/// Keys must be unique by (package, namespace, name).
pub fn unique_name_parts(keys: &[&TraitKey]) -> Vec<Vec<String>> {
    keys.iter()
        .map(|key| {
            let same_name = keys.iter().filter(|other| other.name == key.name).count();
            if same_name == 1 {
                return vec![key.name.clone()];
            }
            let same_namespace = keys
                .iter()
                .filter(|other| other.name == key.name && other.namespace == key.namespace)
                .count();
            if same_namespace == 1 {
                vec![key.namespace.clone(), key.name.clone()]
            } else {
                vec![key.package.clone(), key.namespace.clone(), key.name.clone()]
            }
        })
        .collect()
}
