//! Declaration version tokens

use serde::{Deserialize, Serialize};
use std::fmt;

/// The version of a trait or specification declaration.
///
/// Versions are positive integers, written in descriptions as plain tokens
/// ("1", "2"). Version 1 is the default and is the only version whose
/// declaration id carries no suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct VersionToken(u32);

impl VersionToken {
    /// The implicit version of an unversioned declaration
    pub const DEFAULT: VersionToken = VersionToken(1);

    /// Parse a version token, tolerating a leading 'v'
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let token = token.strip_prefix('v').unwrap_or(token);
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match token.parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(Self(n)),
        }
    }

    /// Get the numeric value
    pub fn number(&self) -> u32 {
        self.0
    }

    /// Whether this is the implicit default version
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Suffix appended to a declaration id (e.g. ".v2"), empty for version 1
    pub fn id_suffix(&self) -> String {
        if self.is_default() {
            String::new()
        } else {
            format!(".v{}", self.0)
        }
    }

    /// Suffix appended to generated class names (e.g. "_v2")
    pub fn class_suffix(&self) -> String {
        format!("_v{}", self.0)
    }
}

impl Default for VersionToken {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<VersionToken> for String {
    fn from(version: VersionToken) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for VersionToken {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("'{}' is not a valid version", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!(VersionToken::parse("1"), Some(VersionToken::DEFAULT));
        assert_eq!(VersionToken::parse("12").map(|v| v.number()), Some(12));
        assert_eq!(VersionToken::parse("v2").map(|v| v.number()), Some(2));
    }

    #[test]
    fn test_invalid_versions() {
        assert_eq!(VersionToken::parse(""), None);
        assert_eq!(VersionToken::parse("0"), None);
        assert_eq!(VersionToken::parse("1.0"), None);
        assert_eq!(VersionToken::parse("-1"), None);
        assert_eq!(VersionToken::parse("one"), None);
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(VersionToken::DEFAULT.id_suffix(), "");
        assert_eq!(VersionToken::parse("2").unwrap().id_suffix(), ".v2");
        assert_eq!(VersionToken::DEFAULT.class_suffix(), "_v1");
    }

    #[test]
    fn test_numeric_ordering() {
        let mut versions: Vec<_> = ["10", "2", "1"]
            .iter()
            .filter_map(|v| VersionToken::parse(v))
            .collect();
        versions.sort();
        let ordered: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(ordered, vec!["1", "2", "10"]);
    }
}
