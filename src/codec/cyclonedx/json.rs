//! CycloneDX 1.4 JSON codec.

use regex::Regex;
use std::sync::LazyLock;

use super::mapping::{document_from_bom, document_to_bom};
use super::schema::CdxBom;
use super::BOM_FORMAT;
use crate::codec::traits::{
    FormatConfidence, FormatDetection, SbomDeserializer, SbomSerializer, Schema,
    SerializationFormat,
};
use crate::config::SerializerConfig;
use crate::error::{ParseErrorKind, Result, SbomCodecError};
use crate::model::Document;

static JSON_SPEC_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""specVersion"\s*:\s*"([^"]+)""#).expect("static regex")
});

/// Reads and writes CycloneDX 1.4 JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycloneDxJsonCodec;

impl CycloneDxJsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl SbomDeserializer for CycloneDxJsonCodec {
    fn deserialize(&self, content: &str) -> Result<Document> {
        let bom: CdxBom = serde_json::from_str(content)?;
        match bom.bom_format.as_deref() {
            Some(format) if format.eq_ignore_ascii_case(BOM_FORMAT) => {}
            Some(other) => {
                return Err(SbomCodecError::parse(
                    "CycloneDX JSON document",
                    ParseErrorKind::InvalidValue {
                        field: "bomFormat".to_string(),
                        message: format!("'{other}' is not '{BOM_FORMAT}'"),
                    },
                ));
            }
            None if bom.spec_version.is_some() => {
                tracing::warn!("CycloneDX document has no bomFormat; reading it anyway");
            }
            None => {
                return Err(SbomCodecError::missing_field(
                    "bomFormat",
                    "CycloneDX JSON document",
                ));
            }
        }

        let doc = document_from_bom(bom)?;
        tracing::info!(
            components = doc.component_count(),
            relationships = doc.relationships.len(),
            "Deserialized CycloneDX JSON document"
        );
        Ok(doc)
    }

    fn schema(&self) -> Schema {
        Schema::CycloneDx14
    }

    fn format(&self) -> SerializationFormat {
        SerializationFormat::Json
    }

    fn detect(&self, content: &str) -> FormatDetection {
        if !content.trim_start().starts_with('{') {
            return FormatDetection::no_match();
        }
        let has_bom_format = content.contains("\"bomFormat\"");
        let says_cyclonedx = content.contains("\"CycloneDX\"");
        let has_spec_version = content.contains("\"specVersion\"");
        let has_bom_ref = content.contains("\"bom-ref\"");

        let mut detection = if has_bom_format && says_cyclonedx {
            FormatDetection::with_confidence(FormatConfidence::CERTAIN)
        } else if has_bom_format || (has_spec_version && has_bom_ref) {
            FormatDetection::with_confidence(FormatConfidence::HIGH)
        } else if has_bom_ref {
            FormatDetection::with_confidence(FormatConfidence::LOW)
                .warning("Missing bomFormat field")
        } else {
            return FormatDetection::no_match();
        };
        if let Some(caps) = JSON_SPEC_VERSION.captures(content) {
            detection = detection.version(&caps[1]);
        }
        detection
    }
}

impl SbomSerializer for CycloneDxJsonCodec {
    fn serialize(&self, document: &Document, config: &SerializerConfig) -> Result<String> {
        let bom = document_to_bom(document, config);
        let text = if config.pretty {
            serde_json::to_string_pretty(&bom)
        } else {
            serde_json::to_string(&bom)
        }
        .map_err(|e| SbomCodecError::serialize("CycloneDX JSON", e.to_string()))?;

        tracing::info!(
            components = document.component_count(),
            relationships = document.relationships.len(),
            "Serialized CycloneDX JSON document"
        );
        Ok(text)
    }

    fn schema(&self) -> Schema {
        Schema::CycloneDx14
    }

    fn format(&self) -> SerializationFormat {
        SerializationFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentFields, PackageBuilder, Relationship, SbomFormat, DEPENDS_ON};
    use serde_json::{json, Value};

    fn minimal() -> String {
        json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.4",
            "serialNumber": "urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79",
            "version": 1,
            "metadata": {
                "timestamp": "2023-04-01T12:00:00Z",
                "tools": [{"vendor": "Acme", "name": "scanner", "version": "2.1"}],
                "component": {"type": "application", "bom-ref": "app", "name": "app"}
            },
            "components": [{
                "type": "library",
                "bom-ref": "pkg:npm/left-pad@1.3.0",
                "name": "left-pad",
                "version": "1.3.0",
                "purl": "pkg:npm/left-pad@1.3.0",
                "licenses": [{"license": {"id": "MIT"}}],
                "hashes": [{"alg": "SHA-256", "content": "abc123"}]
            }],
            "dependencies": [{"ref": "app", "dependsOn": ["pkg:npm/left-pad@1.3.0"]}]
        })
        .to_string()
    }

    #[test]
    fn test_deserialize_minimal() {
        let doc = CycloneDxJsonCodec.deserialize(&minimal()).unwrap();
        assert_eq!(doc.format, SbomFormat::CycloneDx);
        assert_eq!(doc.spec_version.as_deref(), Some("1.4"));
        assert_eq!(doc.version.as_deref(), Some("1"));
        assert_eq!(doc.root_component.as_ref().map(|c| c.uid()), Some("app"));

        let pad = doc.component("pkg:npm/left-pad@1.3.0").unwrap();
        let core = pad.core();
        assert!(core.licenses.declared.contains("MIT"));
        assert_eq!(core.hashes.get("SHA-256").map(String::as_str), Some("abc123"));

        let edges = doc.relationships.get("app").unwrap();
        assert!(edges.contains(&Relationship::new("pkg:npm/left-pad@1.3.0", DEPENDS_ON)));

        let tools = &doc.creation_data.as_ref().unwrap().tools;
        assert_eq!(tools.iter().next().and_then(|t| t.vendor.as_deref()), Some("Acme"));
    }

    #[test]
    fn test_dependencies_written_per_source() {
        let mut builder = Document::builder(SbomFormat::CycloneDx);
        for uid in ["A", "B", "C"] {
            let mut package = PackageBuilder::new();
            package.uid(uid).name(uid);
            builder.add_component(package.build().unwrap());
        }
        builder.add_relationship("A", Relationship::new("B", DEPENDS_ON));
        builder.add_relationship("A", Relationship::new("C", DEPENDS_ON));
        let doc = builder.build().unwrap();

        let text = CycloneDxJsonCodec
            .serialize(&doc, &SerializerConfig::without_tool_identity())
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value["dependencies"],
            json!([{"ref": "A", "dependsOn": ["B", "C"]}])
        );
        assert_eq!(value["bomFormat"], "CycloneDX");
        assert_eq!(value["specVersion"], "1.4");
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_rejects_other_bom_format() {
        let err = CycloneDxJsonCodec
            .deserialize(r#"{"bomFormat": "SPDX", "specVersion": "1.4"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SbomCodecError::Parse {
                source: ParseErrorKind::InvalidValue { ref field, .. },
                ..
            } if field == "bomFormat"
        ));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = CycloneDxJsonCodec.deserialize("{ not json").unwrap_err();
        assert!(matches!(err, SbomCodecError::Parse { .. }));
    }

    #[test]
    fn test_detect() {
        let detection = CycloneDxJsonCodec.detect(&minimal());
        assert_eq!(detection.confidence, FormatConfidence::CERTAIN);
        assert_eq!(detection.version.as_deref(), Some("1.4"));

        let spdx = r#"{"spdxVersion": "SPDX-2.3", "SPDXID": "SPDXRef-DOCUMENT"}"#;
        assert!(!CycloneDxJsonCodec.detect(spdx).confidence.can_parse());
    }
}
