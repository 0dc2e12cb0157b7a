//! Serializer/deserializer trait definitions and format identifiers.
//!
//! Each codec implements [`SbomDeserializer`], [`SbomSerializer`], or both.
//! Deserializers also report how confident they are that a piece of content
//! is theirs, which drives auto-detection in [`super::FormatDetector`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::SerializerConfig;
use crate::error::{ErrorContext, Result, SbomCodecError};
use crate::model::{Document, SbomFormat};

/// Maximum input size accepted by the path-based helpers (512 MB).
pub const MAX_SBOM_FILE_SIZE: u64 = 512 * 1024 * 1024;

// ============================================================================
// Format identifiers
// ============================================================================

/// Document standard and version handled by a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    Spdx23,
    CycloneDx14,
}

impl Schema {
    /// Spec version string without prefix.
    pub const fn spec_version(self) -> &'static str {
        match self {
            Self::Spdx23 => "2.3",
            Self::CycloneDx14 => "1.4",
        }
    }

    pub const fn sbom_format(self) -> SbomFormat {
        match self {
            Self::Spdx23 => SbomFormat::Spdx,
            Self::CycloneDx14 => SbomFormat::CycloneDx,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spdx23 => write!(f, "SPDX 2.3"),
            Self::CycloneDx14 => write!(f, "CycloneDX 1.4"),
        }
    }
}

impl FromStr for Schema {
    type Err = SbomCodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' ', '.'], "").as_str() {
            "spdx" | "spdx23" => Ok(Self::Spdx23),
            "cdx" | "cdx14" | "cyclonedx" | "cyclonedx14" => Ok(Self::CycloneDx14),
            _ => Err(SbomCodecError::unsupported(s, "SPDX 2.3, CycloneDX 1.4")),
        }
    }
}

/// Concrete syntax of a serialized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializationFormat {
    Json,
    TagValue,
    Xml,
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "JSON"),
            Self::TagValue => write!(f, "tag-value"),
            Self::Xml => write!(f, "XML"),
        }
    }
}

impl FromStr for SerializationFormat {
    type Err = SbomCodecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "json" => Ok(Self::Json),
            "tagvalue" | "tv" | "spdx" => Ok(Self::TagValue),
            "xml" => Ok(Self::Xml),
            _ => Err(SbomCodecError::unsupported(s, "JSON, tag-value, XML")),
        }
    }
}

impl SerializationFormat {
    /// Guess the syntax from the first significant character.
    pub fn sniff(content: &str) -> Option<Self> {
        let trimmed = content.trim_start_matches('\u{feff}').trim_start();
        match trimmed.chars().next()? {
            '{' => Some(Self::Json),
            '<' => Some(Self::Xml),
            c if c.is_ascii_alphabetic() || c == '#' => trimmed
                .lines()
                .any(|l| l.trim_start().starts_with("SPDXVersion:"))
                .then_some(Self::TagValue),
            _ => None,
        }
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Confidence level for format detection
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct FormatConfidence(f32);

impl FormatConfidence {
    /// Definitely not this format
    pub const NONE: Self = Self(0.0);
    /// Might be this format
    pub const LOW: Self = Self(0.25);
    /// Likely this format
    pub const MEDIUM: Self = Self(0.5);
    /// Almost certainly this format
    pub const HIGH: Self = Self(0.75);
    /// Definitely this format
    pub const CERTAIN: Self = Self(1.0);

    #[must_use]
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    #[must_use]
    pub const fn value(&self) -> f32 {
        self.0
    }

    /// Whether this confidence is enough to attempt deserialization
    #[must_use]
    pub fn can_parse(&self) -> bool {
        self.0 >= Self::LOW.0
    }
}

/// What a deserializer thinks of a piece of content.
#[derive(Debug, Clone, Default)]
pub struct FormatDetection {
    pub confidence: FormatConfidence,
    /// Spec version found in the content, if any
    pub version: Option<String>,
    pub warnings: Vec<String>,
}

impl FormatDetection {
    #[must_use]
    pub fn no_match() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_confidence(confidence: FormatConfidence) -> Self {
        Self {
            confidence,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    #[must_use]
    pub fn warning(mut self, warning: &str) -> Self {
        self.warnings.push(warning.to_string());
        self
    }
}

// ============================================================================
// Codec traits
// ============================================================================

/// Reads one concrete syntax of one schema into a [`Document`].
///
/// Implementations are stateless; each call allocates its own builders.
pub trait SbomDeserializer {
    /// Deserialize a document from text.
    fn deserialize(&self, content: &str) -> Result<Document>;

    /// Deserialize a document from a file, refusing oversized input.
    fn deserialize_path(&self, path: &Path) -> Result<Document> {
        let content = read_sbom_file(path)?;
        self.deserialize(&content)
            .with_context(|| format!("deserializing {}", path.display()))
    }

    fn schema(&self) -> Schema;

    fn format(&self) -> SerializationFormat;

    /// Human-readable name, e.g. "SPDX 2.3 tag-value".
    fn format_name(&self) -> String {
        format!("{} {}", self.schema(), self.format())
    }

    /// Lightweight structural check without a full parse.
    fn detect(&self, content: &str) -> FormatDetection;

    fn confidence(&self, content: &str) -> FormatConfidence {
        self.detect(content).confidence
    }
}

/// Writes a [`Document`] as one concrete syntax of one schema.
pub trait SbomSerializer {
    /// Serialize a document to text.
    ///
    /// The configuration carries the identity of the tool doing the writing.
    fn serialize(&self, document: &Document, config: &SerializerConfig) -> Result<String>;

    /// Serialize a document straight to a file.
    fn serialize_to_path(
        &self,
        document: &Document,
        config: &SerializerConfig,
        path: &Path,
    ) -> Result<()> {
        let text = self.serialize(document, config)?;
        std::fs::write(path, text).map_err(|e| SbomCodecError::io(path, e))
    }

    fn schema(&self) -> Schema;

    fn format(&self) -> SerializationFormat;
}

/// Read a file, refusing anything larger than [`MAX_SBOM_FILE_SIZE`].
pub(crate) fn read_sbom_file(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path).map_err(|e| SbomCodecError::io(path, e))?;
    if metadata.len() > MAX_SBOM_FILE_SIZE {
        return Err(SbomCodecError::io(
            path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "SBOM file is {} MB, exceeding the {} MB limit",
                    metadata.len() / (1024 * 1024),
                    MAX_SBOM_FILE_SIZE / (1024 * 1024),
                ),
            ),
        ));
    }
    std::fs::read_to_string(path).map_err(|e| SbomCodecError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_from_str() {
        assert_eq!("SPDX-2.3".parse::<Schema>().ok(), Some(Schema::Spdx23));
        assert_eq!("cdx14".parse::<Schema>().ok(), Some(Schema::CycloneDx14));
        assert_eq!("CycloneDX".parse::<Schema>().ok(), Some(Schema::CycloneDx14));
        assert!("swid".parse::<Schema>().is_err());
    }

    #[test]
    fn test_serialization_format_from_str() {
        assert_eq!(
            "tag-value".parse::<SerializationFormat>().ok(),
            Some(SerializationFormat::TagValue)
        );
        assert_eq!(
            "XML".parse::<SerializationFormat>().ok(),
            Some(SerializationFormat::Xml)
        );
        assert!("protobuf".parse::<SerializationFormat>().is_err());
    }

    #[test]
    fn test_sniff() {
        assert_eq!(
            SerializationFormat::sniff("  {\"a\":1}"),
            Some(SerializationFormat::Json)
        );
        assert_eq!(
            SerializationFormat::sniff("<?xml version=\"1.0\"?><bom/>"),
            Some(SerializationFormat::Xml)
        );
        assert_eq!(
            SerializationFormat::sniff("SPDXVersion: SPDX-2.3\nDataLicense: CC0-1.0"),
            Some(SerializationFormat::TagValue)
        );
        assert_eq!(SerializationFormat::sniff("hello world"), None);
        assert_eq!(SerializationFormat::sniff(""), None);
    }

    #[test]
    fn test_confidence_clamps() {
        assert_eq!(FormatConfidence::new(3.0).value(), 1.0);
        assert!(!FormatConfidence::new(0.1).can_parse());
        assert!(FormatConfidence::MEDIUM.can_parse());
    }
}
