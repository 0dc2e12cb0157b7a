//! Serde shapes of the CycloneDX 1.4 object model, in its JSON spelling.
//!
//! The JSON codec reads and writes these directly. The XML codec converts
//! its element tree into the same shapes so that both syntaxes share one
//! mapping to and from the document model.

use serde::{Deserialize, Deserializer, Serialize};

use crate::codec::one_or_many::{lenient_option, lenient_vec};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CdxBom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bom_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "number_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<u64>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CdxMetadata>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub components: Vec<CdxComponent>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub external_references: Vec<CdxExternalReference>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<CdxDependency>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CdxMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub tools: Option<CdxTools>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<CdxContact>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub component: Option<Box<CdxComponent>>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub manufacture: Option<CdxOrganization>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub supplier: Option<CdxOrganization>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<CdxLicenseChoice>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<CdxProperty>,
}

impl CdxMetadata {
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_none()
            && self.tools.as_ref().map_or(true, CdxTools::is_empty)
            && self.authors.is_empty()
            && self.component.is_none()
            && self.manufacture.is_none()
            && self.supplier.is_none()
            && self.licenses.is_empty()
            && self.properties.is_empty()
    }
}

/// `metadata.tools`: a plain list in 1.4, an object of components and
/// services from 1.5 on. Both are read; the list form is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum CdxTools {
    List(#[serde(deserialize_with = "lenient_vec")] Vec<CdxTool>),
    Components {
        #[serde(default, deserialize_with = "lenient_vec")]
        components: Vec<CdxComponent>,
    },
}

impl CdxTools {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(tools) => tools.is_empty(),
            Self::Components { components } => components.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CdxTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub hashes: Vec<CdxHash>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub external_references: Vec<CdxExternalReference>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CdxContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CdxOrganization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub url: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<CdxContact>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CdxComponent {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(rename = "mime-type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(rename = "bom-ref", skip_serializing_if = "Option::is_none")]
    pub bom_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub supplier: Option<CdxOrganization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub hashes: Vec<CdxHash>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<CdxLicenseChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub external_references: Vec<CdxExternalReference>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<CdxProperty>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<CdxComponent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CdxHash {
    pub alg: String,
    pub content: String,
}

/// One `licenses` entry: a listed or named license, or an expression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CdxLicenseChoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<CdxLicense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CdxLicense {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CdxExternalReference {
    pub url: String,
    #[serde(rename = "type")]
    pub ref_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub hashes: Vec<CdxHash>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CdxProperty {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CdxDependency {
    #[serde(rename = "ref")]
    pub dependency_ref: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub depends_on: Vec<String>,
}

/// BOM version as a JSON number, tolerating producers that quote it.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
