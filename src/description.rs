//! Description loading
//!
//! Reads package description text (YAML, or JSON as a YAML subset) into an
//! untyped `serde_json::Value` tree for validation, and defines the typed
//! description the validator produces.
//!
//! ## Example description
//! ```yaml
//! package: my-package
//! description: Some traits.
//! traits:
//!   aNamespace:
//!     description: A namespace.
//!     members:
//!       Example:
//!         versions:
//!           1:
//!             description: An example trait.
//!             usage: [entity]
//!             properties:
//!               name: { type: string, description: A name. }
//! specifications:
//!   test:
//!     members:
//!       Simple:
//!         versions:
//!           1:
//!             traitSet:
//!               - { namespace: aNamespace, name: Example, version: 1 }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{Result, TraitgenError};
use crate::model::PropertyType;
use crate::version::VersionToken;

// =============================================================================
// Typed description
// =============================================================================

/// A validated package description.
///
/// Maps keep the order they were written in; the builder decides what gets
/// sorted.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageDescription {
    pub package: String,
    pub description: String,
    #[serde(default)]
    pub traits: IndexMap<String, NamespaceDescription<TraitMember>>,
    #[serde(default)]
    pub specifications: IndexMap<String, NamespaceDescription<SpecificationMember>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceDescription<M> {
    #[serde(default)]
    pub description: String,
    pub members: IndexMap<String, M>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDescription {
    #[serde(rename = "type")]
    pub type_: PropertyType,
    #[serde(default)]
    pub description: String,
}

/// A trait member: either versioned, or an inline (implicitly version 1)
/// body.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraitMember {
    pub description: Option<String>,
    pub usage: Option<Vec<String>>,
    pub deprecated: Option<bool>,
    pub properties: Option<IndexMap<String, PropertyDescription>>,
    pub versions: Option<IndexMap<VersionToken, TraitVersion>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraitVersion {
    pub description: Option<String>,
    pub usage: Option<Vec<String>>,
    pub deprecated: Option<bool>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDescription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecificationMember {
    pub description: Option<String>,
    pub usage: Option<Vec<String>>,
    pub deprecated: Option<bool>,
    #[serde(rename = "traitSet")]
    pub trait_set: Option<Vec<TraitSetEntry>>,
    pub versions: Option<IndexMap<VersionToken, SpecificationVersion>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecificationVersion {
    pub description: Option<String>,
    pub usage: Option<Vec<String>>,
    pub deprecated: Option<bool>,
    #[serde(rename = "traitSet", default)]
    pub trait_set: Vec<TraitSetEntry>,
}

/// An unresolved reference from a specification to a trait
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraitSetEntry {
    /// Defaults to the package being described
    pub package: Option<String>,
    pub namespace: String,
    pub name: String,
    /// Defaults to version 1
    pub version: Option<VersionValue>,
}

/// A version written either as a string or as a bare integer
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VersionValue {
    Number(u64),
    Text(String),
}

impl VersionValue {
    pub fn token(&self) -> Option<VersionToken> {
        match self {
            VersionValue::Number(n) => VersionToken::parse(&n.to_string()),
            VersionValue::Text(s) => VersionToken::parse(s),
        }
    }
}

impl TraitMember {
    /// Versions of this member in numeric order, with inline bodies
    /// expanded to an implicit version 1.
    pub fn resolved_versions(&self) -> Vec<(VersionToken, TraitVersion)> {
        match &self.versions {
            Some(versions) => sorted_versions(versions),
            None => vec![(
                VersionToken::DEFAULT,
                TraitVersion {
                    description: None,
                    usage: None,
                    deprecated: None,
                    properties: self.properties.clone().unwrap_or_default(),
                },
            )],
        }
    }

    pub(crate) fn is_ambiguous(&self) -> bool {
        self.versions.is_some() && self.properties.is_some()
    }
}

impl SpecificationMember {
    /// Versions of this member in numeric order, with inline bodies
    /// expanded to an implicit version 1.
    pub fn resolved_versions(&self) -> Vec<(VersionToken, SpecificationVersion)> {
        match &self.versions {
            Some(versions) => sorted_versions(versions),
            None => vec![(
                VersionToken::DEFAULT,
                SpecificationVersion {
                    description: None,
                    usage: None,
                    deprecated: None,
                    trait_set: self.trait_set.clone().unwrap_or_default(),
                },
            )],
        }
    }

    pub(crate) fn is_ambiguous(&self) -> bool {
        self.versions.is_some() && self.trait_set.is_some()
    }
}

fn sorted_versions<V: Clone>(versions: &IndexMap<VersionToken, V>) -> Vec<(VersionToken, V)> {
    let mut resolved: Vec<(VersionToken, V)> = versions
        .iter()
        .map(|(version, body)| (*version, body.clone()))
        .collect();
    resolved.sort_by_key(|(version, _)| *version);
    resolved
}

// =============================================================================
// Loading
// =============================================================================

/// Load a description file into an untyped tree
pub fn load_path(path: &Path) -> Result<Value> {
    let origin = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| TraitgenError::Load {
        path: origin.clone(),
        message: e.to_string(),
    })?;
    parse_str(&text, &origin)
}

/// Parse description text into an untyped tree.
///
/// `origin` names the source in error messages.
pub fn parse_str(text: &str, origin: &str) -> Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| TraitgenError::Load {
        path: origin.to_string(),
        message: e.to_string(),
    })?;
    yaml_to_json(yaml).map_err(|message| TraitgenError::Load {
        path: origin.to_string(),
        message,
    })
}

/// Convert a YAML tree to JSON, stringifying scalar mapping keys so that
/// `versions: {1: ...}` reads the same as `versions: {"1": ...}`.
fn yaml_to_json(value: serde_yaml::Value) -> std::result::Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_u64() {
                Value::from(i)
            } else if let Some(i) = n.as_i64() {
                Value::from(i)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("Unsupported number '{}'", n))?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(format!("Unsupported mapping key {:?}", other)),
                };
                if object.contains_key(&key) {
                    return Err(format!("Duplicate mapping key '{}'", key));
                }
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => return Err(format!("Unsupported YAML tag '{}'", tagged.tag)),
    })
}
