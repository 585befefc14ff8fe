//! Error types for crr-core

use thiserror::Error;

/// Result type alias using crr-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for plan synthesis
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Schema validation error
    #[error("Schema validation failed:\n{errors}")]
    SchemaValidation { errors: String },

    /// Schema not found
    #[error("Schema not found: {name}")]
    SchemaNotFound { name: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Two constructs registered under the same path
    #[error("There is already a construct with path '{path}' in stack {stack}")]
    DuplicateConstruct { stack: String, path: String },

    /// Two resources rendered to the same logical id
    #[error("Duplicate logical id '{logical_id}' in stack {stack}")]
    DuplicateLogicalId { stack: String, logical_id: String },

    /// A resource was looked up by logical id but is not part of the template
    #[error("Resource '{logical_id}' not found in stack {stack}")]
    ResourceNotFound { stack: String, logical_id: String },

    /// A token references a resource that does not exist in the same template
    #[error("Resource '{resource}' in stack {stack} references unknown resource '{target}'")]
    UnresolvedReference {
        stack: String,
        resource: String,
        target: String,
    },

    /// Circular dependency between resources or stacks
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// A stack dependency names a stack that is not part of the app
    #[error("Stack {stack} depends on unknown stack {dependency}")]
    UnknownStack { stack: String, dependency: String },

    /// A physical name or ARN needs a concrete environment value
    #[error("Cannot generate a physical name for {resource}: stack {stack} has no concrete {field}")]
    UnresolvedEnvironment {
        stack: String,
        resource: String,
        field: String,
    },

    /// A resource is consumed from another environment without a synthesis-time name
    #[error(
        "Cannot use resource '{resource}' in a cross-environment fashion: \
         it has no physical name known at synthesis time"
    )]
    CrossEnvironmentReference { resource: String },

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(String),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a schema validation error from a list of errors
    pub fn schema_validation(errors: Vec<String>) -> Self {
        Self::SchemaValidation {
            errors: errors.join("\n"),
        }
    }

    /// Create a schema not found error
    pub fn schema_not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }

    /// Create a circular dependency error from the nodes involved
    pub fn circular_dependency(nodes: &[String]) -> Self {
        Self::CircularDependency {
            cycle: nodes.join(" -> "),
        }
    }

    /// Create an unresolved environment error
    pub fn unresolved_environment(
        stack: impl Into<String>,
        resource: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::UnresolvedEnvironment {
            stack: stack.into(),
            resource: resource.into(),
            field: field.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config_not_found("/path/to/crr.yaml");
        assert_eq!(
            err.to_string(),
            "Configuration file not found: /path/to/crr.yaml"
        );

        let err = Error::invalid_config("account must be 12 digits");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: account must be 12 digits"
        );
    }

    #[test]
    fn test_schema_validation_joins_errors() {
        let err = Error::schema_validation(vec!["  - a".to_string(), "  - b".to_string()]);
        assert_eq!(err.to_string(), "Schema validation failed:\n  - a\n  - b");
    }

    #[test]
    fn test_circular_dependency_formats_cycle() {
        let err = Error::circular_dependency(&["A".to_string(), "B".to_string(), "A".to_string()]);
        assert_eq!(err.to_string(), "Circular dependency detected: A -> B -> A");
    }
}
