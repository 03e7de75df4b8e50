//! Error types for description loading, model building and generation

use thiserror::Error;

/// Result type for traitgen operations
pub type Result<T> = std::result::Result<T, TraitgenError>;

/// Errors raised anywhere in the description-to-code pipeline.
///
/// Every variant is fatal: the pipeline is a pure transformation with
/// nothing transient to retry.
#[derive(Error, Debug)]
pub enum TraitgenError {
    /// The description text could not be read or parsed.
    #[error("Failed to load description '{path}': {message}")]
    Load { path: String, message: String },

    /// The description does not conform to the description schema.
    #[error("Invalid description at {path}: {message}")]
    Schema { path: String, message: String },

    /// A specification references a trait that is not in the current or
    /// any known package.
    #[error("{0}")]
    Resolution(String),

    /// A name could not be conformed to a legal target identifier.
    #[error("{0}")]
    Identifier(String),

    /// A property type has no target-language mapping.
    #[error("{0}")]
    TypeMapping(String),

    /// Unknown generator, missing input or bad configuration.
    #[error("{0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TraitgenError {
    pub(crate) fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this is a user-facing configuration problem rather than a
    /// problem with the description itself.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_error_is_verbatim() {
        let err = TraitgenError::Identifier("'class' (from 'class') is a reserved keyword.".into());
        assert_eq!(err.to_string(), "'class' (from 'class') is a reserved keyword.");
    }

    #[test]
    fn test_schema_error_names_location() {
        let err = TraitgenError::schema("/traits/ns", "'members' is a required property");
        assert_eq!(
            err.to_string(),
            "Invalid description at /traits/ns: 'members' is a required property"
        );
    }

    #[test]
    fn test_is_configuration() {
        let err = TraitgenError::Configuration("Could not find generator x".into());
        assert!(err.is_configuration());
        assert!(!TraitgenError::Resolution("missing".into()).is_configuration());
    }
}
