//! Configuration validation for sbom-codec.

use super::types::{SerializerConfig, ToolIdentity};

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl Validatable for SerializerConfig {
    fn validate(&self) -> Vec<ConfigError> {
        self.tool.as_ref().map(Validatable::validate).unwrap_or_default()
    }
}

impl Validatable for ToolIdentity {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.vendor.trim().is_empty() {
            errors.push(ConfigError {
                field: "tool.vendor".to_string(),
                message: "must not be empty; it is used to detect an existing tool entry"
                    .to_string(),
            });
        }
        if self.name.trim().is_empty() {
            errors.push(ConfigError {
                field: "tool.name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if let Some(version) = &self.version {
            if version.trim().is_empty() {
                errors.push(ConfigError {
                    field: "tool.version".to_string(),
                    message: "omit the field instead of leaving it blank".to_string(),
                });
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SerializerConfig::default().is_valid());
        assert!(SerializerConfig::without_tool_identity().is_valid());
    }

    #[test]
    fn test_blank_tool_fields_are_rejected() {
        let config = SerializerConfig::builder()
            .tool(ToolIdentity {
                vendor: " ".to_string(),
                name: String::new(),
                version: Some(String::new()),
            })
            .build();

        let errors = config.validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["tool.vendor", "tool.name", "tool.version"]);
    }
}
