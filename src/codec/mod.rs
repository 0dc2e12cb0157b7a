//! Serializers and deserializers between [`Document`] and its external forms.
//!
//! | Schema        | JSON | tag-value | XML |
//! |---------------|------|-----------|-----|
//! | SPDX 2.3      | yes  | yes       | no  |
//! | CycloneDX 1.4 | yes  | no        | yes |
//!
//! ## Usage
//!
//! ```
//! use sbom_codec::codec::{self, Schema, SerializationFormat};
//! use sbom_codec::config::SerializerConfig;
//!
//! let text = "SPDXVersion: SPDX-2.3\nDataLicense: CC0-1.0\nSPDXID: SPDXRef-DOCUMENT\nDocumentName: demo\n";
//! let doc = codec::deserialize(text).unwrap();
//! let json = codec::serialize(
//!     &doc,
//!     Schema::CycloneDx14,
//!     SerializationFormat::Json,
//!     &SerializerConfig::default(),
//! )
//! .unwrap();
//! assert!(json.contains("\"bomFormat\""));
//! ```

pub mod cyclonedx;
mod detection;
pub mod one_or_many;
pub mod spdx;
mod traits;
mod xml_tree;

pub use self::cyclonedx::{CycloneDxJsonCodec, CycloneDxXmlCodec};
pub use self::spdx::{SpdxJsonCodec, SpdxTagValueCodec};
pub use detection::{DetectionResult, FormatDetector, MIN_CONFIDENCE_THRESHOLD};
pub use traits::{
    FormatConfidence, FormatDetection, SbomDeserializer, SbomSerializer, Schema,
    SerializationFormat, MAX_SBOM_FILE_SIZE,
};

use std::path::Path;

use crate::config::SerializerConfig;
use crate::error::{ErrorContext, Result, SbomCodecError};
use crate::model::Document;

const SUPPORTED: &str = "SPDX 2.3 JSON, SPDX 2.3 tag-value, CycloneDX 1.4 JSON, CycloneDX 1.4 XML";

fn unsupported(schema: Schema, format: SerializationFormat) -> SbomCodecError {
    SbomCodecError::unsupported(format!("{schema} {format}"), SUPPORTED)
}

/// The deserializer for one schema and syntax.
pub fn deserializer_for(
    schema: Schema,
    format: SerializationFormat,
) -> Result<Box<dyn SbomDeserializer>> {
    match (schema, format) {
        (Schema::Spdx23, SerializationFormat::Json) => Ok(Box::new(SpdxJsonCodec)),
        (Schema::Spdx23, SerializationFormat::TagValue) => Ok(Box::new(SpdxTagValueCodec)),
        (Schema::CycloneDx14, SerializationFormat::Json) => Ok(Box::new(CycloneDxJsonCodec)),
        (Schema::CycloneDx14, SerializationFormat::Xml) => Ok(Box::new(CycloneDxXmlCodec)),
        (schema, format) => Err(unsupported(schema, format)),
    }
}

/// The serializer for one schema and syntax.
pub fn serializer_for(
    schema: Schema,
    format: SerializationFormat,
) -> Result<Box<dyn SbomSerializer>> {
    match (schema, format) {
        (Schema::Spdx23, SerializationFormat::Json) => Ok(Box::new(SpdxJsonCodec)),
        (Schema::Spdx23, SerializationFormat::TagValue) => Ok(Box::new(SpdxTagValueCodec)),
        (Schema::CycloneDx14, SerializationFormat::Json) => Ok(Box::new(CycloneDxJsonCodec)),
        (Schema::CycloneDx14, SerializationFormat::Xml) => Ok(Box::new(CycloneDxXmlCodec)),
        (schema, format) => Err(unsupported(schema, format)),
    }
}

/// Detect the schema and syntax of `content`, then deserialize it.
pub fn deserialize(content: &str) -> Result<Document> {
    FormatDetector::new().deserialize(content)
}

/// Deserialize `content` as a known schema and syntax.
pub fn deserialize_as(
    content: &str,
    schema: Schema,
    format: SerializationFormat,
) -> Result<Document> {
    deserializer_for(schema, format)?.deserialize(content)
}

pub fn serialize(
    document: &Document,
    schema: Schema,
    format: SerializationFormat,
    config: &SerializerConfig,
) -> Result<String> {
    serializer_for(schema, format)?.serialize(document, config)
}

/// Read and auto-detect a document from a file.
pub fn deserialize_path(path: &Path) -> Result<Document> {
    let content = traits::read_sbom_file(path)?;
    deserialize(&content).with_context(|| format!("deserializing {}", path.display()))
}

pub fn serialize_to_path(
    document: &Document,
    schema: Schema,
    format: SerializationFormat,
    config: &SerializerConfig,
    path: &Path,
) -> Result<()> {
    serializer_for(schema, format)?.serialize_to_path(document, config, path)
}

/// Detection result, or `None` when no codec is confident enough.
pub fn detect_format(content: &str) -> Option<DetectionResult> {
    let detector = FormatDetector::new();
    let result = detector.detect(content);
    detector.accepts(&result).then_some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    #[test]
    fn test_unsupported_pairs() {
        for (schema, format) in [
            (Schema::Spdx23, SerializationFormat::Xml),
            (Schema::CycloneDx14, SerializationFormat::TagValue),
        ] {
            let err = serializer_for(schema, format).err().unwrap();
            assert!(matches!(
                err,
                SbomCodecError::Parse {
                    source: ParseErrorKind::UnsupportedVersion { .. },
                    ..
                }
            ));
            assert!(deserializer_for(schema, format).is_err());
        }
    }

    #[test]
    fn test_dispatch_reports_codec() {
        let codec = deserializer_for(Schema::CycloneDx14, SerializationFormat::Xml).unwrap();
        assert_eq!(codec.format_name(), "CycloneDX 1.4 XML");
        let codec = serializer_for(Schema::Spdx23, SerializationFormat::TagValue).unwrap();
        assert_eq!(codec.format(), SerializationFormat::TagValue);
    }

    #[test]
    fn test_detect_format_rejects_noise() {
        assert!(detect_format("just some words").is_none());
        let found = detect_format(r#"{"bomFormat": "CycloneDX", "specVersion": "1.4"}"#).unwrap();
        assert_eq!(found.version.as_deref(), Some("1.4"));
    }
}
