//! CycloneDX 1.4 codecs.
//!
//! Both syntaxes go through the same serde shapes in [`schema`]: the JSON
//! codec decodes them directly, the XML codec converts its element tree
//! into them first. [`mapping`] is the only place that knows how the
//! shapes correspond to the document model.
//!
//! CycloneDX has no slot for a few model fields. They travel as
//! component or metadata properties under the `sbom-codec:` prefix so that
//! documents written by this crate read back unchanged.

mod json;
mod mapping;
mod schema;
mod xml;

pub use json::CycloneDxJsonCodec;
pub use xml::CycloneDxXmlCodec;

/// Value of `bomFormat`.
pub const BOM_FORMAT: &str = "CycloneDX";

/// Spec version written when the document did not come from CycloneDX.
pub const DEFAULT_CDX_VERSION: &str = "1.4";

/// Namespace of CycloneDX 1.4 XML documents.
pub const XML_NAMESPACE: &str = "http://cyclonedx.org/schema/bom/1.4";

pub(crate) const EXTRA_CPE_PROPERTY: &str = "sbom-codec:cpe";
pub(crate) const EXTRA_PURL_PROPERTY: &str = "sbom-codec:purl";
pub(crate) const SUMMARY_PROPERTY: &str = "sbom-codec:summary";
pub(crate) const CREATOR_COMMENT_PROPERTY: &str = "sbom-codec:creatorComment";

/// Component types defined by CycloneDX 1.4.
const COMPONENT_TYPES: &[&str] = &[
    "application",
    "framework",
    "library",
    "container",
    "operating-system",
    "device",
    "firmware",
    "file",
];

/// Map a model component type onto the CycloneDX enumeration, if it has a
/// counterpart there.
pub(crate) fn cdx_component_type(component_type: &str) -> Option<&'static str> {
    let lowered = component_type.trim().to_lowercase().replace('_', "-");
    COMPONENT_TYPES.iter().copied().find(|t| *t == lowered)
}

/// Hash algorithm name in CycloneDX spelling (`SHA-256`, `BLAKE2b-256`).
///
/// SPDX writes the same algorithms without the dash (`SHA256`).
pub(crate) fn cdx_algorithm(algorithm: &str) -> String {
    let upper = algorithm.trim().to_uppercase();
    for (family, spelling) in [("SHA3", "SHA3"), ("BLAKE2B", "BLAKE2b"), ("SHA", "SHA")] {
        if let Some(bits) = upper.strip_prefix(family) {
            let bits = bits.trim_start_matches('-');
            if !bits.is_empty() && bits.chars().all(|c| c.is_ascii_digit()) {
                return format!("{spelling}-{bits}");
            }
        }
    }
    algorithm.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdx_algorithm() {
        assert_eq!(cdx_algorithm("SHA256"), "SHA-256");
        assert_eq!(cdx_algorithm("sha-512"), "SHA-512");
        assert_eq!(cdx_algorithm("SHA1"), "SHA-1");
        assert_eq!(cdx_algorithm("SHA3-256"), "SHA3-256");
        assert_eq!(cdx_algorithm("BLAKE2b-256"), "BLAKE2b-256");
        assert_eq!(cdx_algorithm("MD5"), "MD5");
    }

    #[test]
    fn test_component_type() {
        assert_eq!(cdx_component_type("LIBRARY"), Some("library"));
        assert_eq!(cdx_component_type("OPERATING_SYSTEM"), Some("operating-system"));
        assert_eq!(cdx_component_type("SOURCE"), None);
    }
}
