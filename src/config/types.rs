//! Configuration types for serializer calls.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::CreationTool;

/// Vendor and name under which this crate announces itself.
pub const CRATE_TOOL_NAME: &str = "sbom-codec";

// ============================================================================
// Tool identity
// ============================================================================

/// The tool that writes a document, recorded in its creation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolIdentity {
    /// Vendor used to decide whether the tool is already listed
    pub vendor: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ToolIdentity {
    /// Identity of this crate at its compiled version.
    #[must_use]
    pub fn this_crate() -> Self {
        Self {
            vendor: CRATE_TOOL_NAME.to_string(),
            name: CRATE_TOOL_NAME.to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }

    /// Model representation, as stored in creation metadata.
    #[must_use]
    pub fn to_creation_tool(&self) -> CreationTool {
        let mut tool = CreationTool::new(&self.name).with_vendor(&self.vendor);
        tool.version.clone_from(&self.version);
        tool
    }
}

impl Default for ToolIdentity {
    fn default() -> Self {
        Self::this_crate()
    }
}

// ============================================================================
// Serializer configuration
// ============================================================================

/// Options passed to every serializer call.
///
/// Nothing here is process-global: two calls with different configurations
/// may run side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SerializerConfig {
    /// Tool recorded as a document creator. `None` writes documents as-is.
    pub tool: Option<ToolIdentity>,
    /// Indent JSON and XML output
    pub pretty: bool,
    /// Derive a `urn:uuid:` serial number for CycloneDX documents without one
    pub generate_serial_number: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            tool: Some(ToolIdentity::this_crate()),
            pretty: true,
            generate_serial_number: false,
        }
    }
}

impl SerializerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SerializerConfigBuilder {
        SerializerConfigBuilder::default()
    }

    /// Default configuration that leaves creator metadata untouched.
    #[must_use]
    pub fn without_tool_identity() -> Self {
        Self {
            tool: None,
            ..Self::default()
        }
    }
}

/// Builder for constructing `SerializerConfig` with a fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct SerializerConfigBuilder {
    config: SerializerConfig,
}

impl SerializerConfigBuilder {
    /// Announce a different tool as the writer.
    pub fn tool(mut self, tool: ToolIdentity) -> Self {
        self.config.tool = Some(tool);
        self
    }

    /// Do not add any tool to creator metadata.
    pub fn no_tool(mut self) -> Self {
        self.config.tool = None;
        self
    }

    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.config.pretty = pretty;
        self
    }

    pub const fn generate_serial_number(mut self, generate: bool) -> Self {
        self.config.generate_serial_number = generate;
        self
    }

    pub fn build(self) -> SerializerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_announces_this_crate() {
        let config = SerializerConfig::default();
        let tool = config.tool.expect("default has a tool");
        assert_eq!(tool.vendor, "sbom-codec");
        assert_eq!(tool.version.as_deref(), Some(env!("CARGO_PKG_VERSION")));
        assert!(config.pretty);
    }

    #[test]
    fn test_builder() {
        let config = SerializerConfig::builder()
            .no_tool()
            .pretty(false)
            .generate_serial_number(true)
            .build();
        assert!(config.tool.is_none());
        assert!(!config.pretty);
        assert!(config.generate_serial_number);
    }

    #[test]
    fn test_to_creation_tool() {
        let tool = ToolIdentity {
            vendor: "Acme".to_string(),
            name: "scanner".to_string(),
            version: None,
        }
        .to_creation_tool();
        assert_eq!(tool.vendor.as_deref(), Some("Acme"));
        assert_eq!(tool.name.as_deref(), Some("scanner"));
        assert!(tool.version.is_none());
    }
}
