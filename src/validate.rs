//! Description Validation
//!
//! Checks an untyped description tree against the embedded description
//! schema (JSON Schema draft 7) before any model is built.
//!
//! Validation is fail-fast: the first violation aborts with a
//! `TraitgenError::Schema` carrying the JSON pointer of the offending
//! location. Unknown keys are errors. Identifier legality is not checked
//! here; generators conform names and warn instead.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::description::PackageDescription;
use crate::error::{Result, TraitgenError};
use crate::version::VersionToken;

/// The embedded description schema
pub const DESCRIPTION_SCHEMA: &str = include_str!("../schema/traitgen.schema.json");

/// Compiled description schema
pub struct DescriptionValidator {
    schema: JSONSchema,
}

impl DescriptionValidator {
    /// Compile the embedded description schema
    pub fn new() -> Result<Self> {
        let document: Value = serde_json::from_str(DESCRIPTION_SCHEMA)?;
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&document)
            .map_err(|e| {
                TraitgenError::Configuration(format!("Invalid description schema: {}", e))
            })?;
        Ok(Self { schema })
    }

    /// Validate a raw description, returning its typed form
    pub fn validate(&self, raw: &Value) -> Result<PackageDescription> {
        if let Err(mut errors) = self.schema.validate(raw) {
            if let Some(first) = errors.next() {
                let path = first.instance_path.to_string();
                return Err(TraitgenError::schema(display_path(&path), first.to_string()));
            }
        }

        check_versions(raw)?;

        let description: PackageDescription = serde_json::from_value(raw.clone())
            .map_err(|e| TraitgenError::schema("(root)", e.to_string()))?;

        check_member_forms(&description)?;
        Ok(description)
    }
}

/// Validate a raw description with a freshly compiled schema
pub fn validate(raw: &Value) -> Result<PackageDescription> {
    DescriptionValidator::new()?.validate(raw)
}

/// A member either lists `versions` or inlines a single body, never both.
fn check_member_forms(description: &PackageDescription) -> Result<()> {
    for (ns_id, namespace) in &description.traits {
        for (name, member) in &namespace.members {
            if member.is_ambiguous() {
                return Err(TraitgenError::schema(
                    pointer(&["traits", ns_id, "members", name]),
                    "'properties' cannot be combined with 'versions'",
                ));
            }
        }
    }
    for (ns_id, namespace) in &description.specifications {
        for (name, member) in &namespace.members {
            if member.is_ambiguous() {
                return Err(TraitgenError::schema(
                    pointer(&["specifications", ns_id, "members", name]),
                    "'traitSet' cannot be combined with 'versions'",
                ));
            }
        }
    }
    Ok(())
}

/// Every `versions` key and trait-set `version` must fit a `VersionToken`.
///
/// The schema only checks their shape, not their range.
fn check_versions(raw: &Value) -> Result<()> {
    for kind in ["traits", "specifications"] {
        for (ns_id, namespace) in entries(raw.get(kind)) {
            for (name, member) in entries(namespace.get("members")) {
                let member_path = [kind, ns_id.as_str(), "members", name.as_str()];
                check_trait_set(member, &member_path)?;
                for (key, body) in entries(member.get("versions")) {
                    let mut path = member_path.to_vec();
                    path.extend(["versions", key.as_str()]);
                    if VersionToken::parse(key).is_none() {
                        return Err(TraitgenError::schema(
                            pointer(&path),
                            format!("'{}' is not a valid version", key),
                        ));
                    }
                    check_trait_set(body, &path)?;
                }
            }
        }
    }
    Ok(())
}

fn check_trait_set(body: &Value, path: &[&str]) -> Result<()> {
    let Some(entries) = body.get("traitSet").and_then(Value::as_array) else {
        return Ok(());
    };
    for (index, entry) in entries.iter().enumerate() {
        let valid = match entry.get("version") {
            None => true,
            Some(Value::String(s)) => VersionToken::parse(s).is_some(),
            Some(other) => VersionToken::parse(&other.to_string()).is_some(),
        };
        if !valid {
            let index = index.to_string();
            let mut path = path.to_vec();
            path.extend(["traitSet", index.as_str(), "version"]);
            return Err(TraitgenError::schema(
                pointer(&path),
                format!("{} is not a valid version", entry["version"]),
            ));
        }
    }
    Ok(())
}

fn entries(value: Option<&Value>) -> impl Iterator<Item = (&String, &Value)> {
    value.and_then(Value::as_object).into_iter().flatten()
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}

/// Build a JSON pointer (RFC 6901) from raw segments
fn pointer(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| format!("/{}", s.replace('~', "~0").replace('/', "~1")))
        .collect()
}
