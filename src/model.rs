//! Resolved package model
//!
//! The object graph produced by the builder and consumed by generators.
//! Everything here is immutable once built: generators only ever see a
//! `&PackageDeclaration`.

use serde::{Deserialize, Serialize};

use crate::version::VersionToken;

/// Type of a trait property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "boolean")]
    Bool,
    /// Valid in descriptions but not yet supported by code generation
    #[serde(rename = "dictionary")]
    Dict,
}

/// A single typed property of a trait
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDeclaration {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: PropertyType,
    pub description: String,
}

/// One version of a trait
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitDeclaration {
    /// Fully qualified id: `package:namespace.name[.vN]`
    pub id: String,
    pub name: String,
    pub version: VersionToken,
    pub description: String,
    pub usage: Vec<String>,
    pub deprecated: bool,
    /// In declaration order
    pub properties: Vec<PropertyDeclaration>,
}

/// A specification's resolved pointer to a trait declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitReference {
    /// Id of the referenced trait declaration
    pub id: String,
    pub package: String,
    pub namespace: String,
    pub name: String,
    pub version: VersionToken,
    /// Shortest (package, namespace, name) suffix that is unique among
    /// the references of the owning specification.
    pub unique_name_parts: Vec<String>,
}

impl TraitReference {
    /// Whether the referenced trait lives in a package other than `package_id`
    pub fn is_external_to(&self, package_id: &str) -> bool {
        self.package != package_id
    }
}

/// One version of a specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecificationDeclaration {
    /// The member name of the specification within its namespace
    pub id: String,
    pub version: VersionToken,
    pub description: String,
    pub usage: Vec<String>,
    pub deprecated: bool,
    /// Sorted by referenced trait id
    pub trait_set: Vec<TraitReference>,
}

/// Common view of namespace members, used for ordering and reporting
pub trait Member {
    fn name(&self) -> &str;
    fn version(&self) -> VersionToken;
}

impl Member for TraitDeclaration {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> VersionToken {
        self.version
    }
}

impl Member for SpecificationDeclaration {
    fn name(&self) -> &str {
        &self.id
    }

    fn version(&self) -> VersionToken {
        self.version
    }
}

/// A named group of traits or of specifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceDeclaration<M> {
    pub id: String,
    pub description: String,
    /// Sorted by (name, version)
    pub members: Vec<M>,
}

impl<M: Member> NamespaceDeclaration<M> {
    /// Distinct member names, in member order
    pub fn member_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.members.len());
        for member in &self.members {
            if names.last() != Some(&member.name()) {
                names.push(member.name());
            }
        }
        names
    }
}

/// Root of the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDeclaration {
    pub id: String,
    pub description: String,
    /// Sorted by namespace id
    pub traits: Vec<NamespaceDeclaration<TraitDeclaration>>,
    /// Sorted by namespace id
    pub specifications: Vec<NamespaceDeclaration<SpecificationDeclaration>>,
}
