//! Serializer configuration.
//!
//! The identity of the tool writing a document, and a few output options,
//! are passed explicitly into every serializer call as a
//! [`SerializerConfig`]. Configurations can be built in code, loaded from a
//! YAML file, or discovered from standard locations:
//!
//! ```yaml
//! tool:
//!   vendor: Acme
//!   name: acme-sbom
//!   version: 2.1.0
//! pretty: false
//! generate_serial_number: true
//! ```

pub mod file;
mod types;
mod validation;

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};
pub use types::{SerializerConfig, SerializerConfigBuilder, ToolIdentity, CRATE_TOOL_NAME};
pub use validation::{ConfigError, Validatable};

/// Generate a JSON Schema for the YAML configuration format.
pub fn generate_json_schema() -> serde_json::Result<String> {
    let schema = schemars::schema_for!(SerializerConfig);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_lists_fields() {
        let schema = generate_json_schema().unwrap();
        assert!(schema.contains("\"tool\""));
        assert!(schema.contains("\"generate_serial_number\""));
    }
}
