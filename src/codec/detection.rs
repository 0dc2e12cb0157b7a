//! Content-based format detection across every deserializer.
//!
//! Each deserializer scores the content on its own; the detector takes the
//! best score above a threshold and refuses to guess below it.

use super::traits::{FormatConfidence, SbomDeserializer, Schema, SerializationFormat};
use super::{CycloneDxJsonCodec, CycloneDxXmlCodec, SpdxJsonCodec, SpdxTagValueCodec};
use crate::error::{Result, SbomCodecError};
use crate::model::Document;

/// Minimum confidence for accepting a detection (LOW, 0.25).
pub const MIN_CONFIDENCE_THRESHOLD: f32 = 0.25;

/// Outcome of running every deserializer's detector over some content.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub schema: Option<Schema>,
    pub format: Option<SerializationFormat>,
    pub confidence: FormatConfidence,
    /// Spec version found in the content, if any
    pub version: Option<String>,
    pub warnings: Vec<String>,
}

impl DetectionResult {
    /// No format detected.
    pub fn unknown(reason: &str) -> Self {
        Self {
            schema: None,
            format: None,
            confidence: FormatConfidence::NONE,
            version: None,
            warnings: vec![reason.to_string()],
        }
    }

    /// Human-readable name of the detected codec, e.g. "CycloneDX 1.4 XML".
    pub fn format_name(&self) -> Option<String> {
        Some(format!("{} {}", self.schema?, self.format?))
    }
}

/// Picks the deserializer most confident about a piece of content.
#[derive(Debug, Clone, Copy)]
pub struct FormatDetector {
    min_confidence: f32,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector {
    pub fn new() -> Self {
        Self {
            min_confidence: MIN_CONFIDENCE_THRESHOLD,
        }
    }

    /// Detector with a custom confidence threshold.
    pub fn with_threshold(min_confidence: f32) -> Self {
        Self {
            min_confidence: min_confidence.clamp(0.0, 1.0),
        }
    }

    fn candidates() -> [Box<dyn SbomDeserializer>; 4] {
        [
            Box::new(SpdxJsonCodec),
            Box::new(SpdxTagValueCodec),
            Box::new(CycloneDxJsonCodec),
            Box::new(CycloneDxXmlCodec),
        ]
    }

    /// Whether a detection result clears this detector's threshold.
    pub fn accepts(&self, result: &DetectionResult) -> bool {
        result.schema.is_some() && result.confidence.value() >= self.min_confidence
    }

    pub fn detect(&self, content: &str) -> DetectionResult {
        if content.trim().is_empty() {
            return DetectionResult::unknown("Empty content");
        }

        let mut best: Option<DetectionResult> = None;
        for candidate in Self::candidates() {
            let detection = candidate.detect(content);
            tracing::debug!(
                "Format detection: {}={:.2}, threshold={:.2}",
                candidate.format_name(),
                detection.confidence.value(),
                self.min_confidence
            );
            let better = best
                .as_ref()
                .map_or(true, |b| detection.confidence > b.confidence);
            if better && detection.confidence.value() > 0.0 {
                best = Some(DetectionResult {
                    schema: Some(candidate.schema()),
                    format: Some(candidate.format()),
                    confidence: detection.confidence,
                    version: detection.version,
                    warnings: detection.warnings,
                });
            }
        }

        match best {
            Some(result) if self.accepts(&result) => result,
            Some(result) => {
                let mut unknown = DetectionResult::unknown(
                    "Could not detect SBOM format with sufficient confidence",
                );
                if let Some(name) = result.format_name() {
                    unknown.warnings.push(format!(
                        "{name} detection: {:.0}% confidence (threshold: {:.0}%)",
                        result.confidence.value() * 100.0,
                        self.min_confidence * 100.0
                    ));
                }
                unknown
            }
            None => DetectionResult::unknown("No SBOM markers found"),
        }
    }

    /// Detect, then deserialize with the winning codec.
    pub fn deserialize(&self, content: &str) -> Result<Document> {
        let detection = self.detect(content);
        for warning in &detection.warnings {
            tracing::warn!("{}", warning);
        }
        match (detection.schema, detection.format) {
            (Some(schema), Some(format)) if self.accepts(&detection) => {
                super::deserializer_for(schema, format)?.deserialize(content)
            }
            _ => Err(SbomCodecError::unknown_format(
                "Could not detect SBOM format. Expected SPDX or CycloneDX.",
            )),
        }
    }
}
