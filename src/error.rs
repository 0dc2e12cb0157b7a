//! Unified error types for sbom-codec.
//!
//! Codecs are permissive: a malformed field degrades the output and is logged,
//! it does not produce an error. The variants here are reserved for input whose
//! root cannot be read at all, for documents that fail structural validation,
//! and for IO and configuration problems.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::ValidationIssue;

/// Main error type for sbom-codec operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomCodecError {
    /// Errors while reading a document
    #[error("Failed to deserialize SBOM: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors while writing a document
    #[error("Failed to serialize SBOM as {format}: {message}")]
    Serialize { format: String, message: String },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Structural validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Unknown SBOM format - expected CycloneDX or SPDX markers")]
    UnknownFormat,

    #[error("Unsupported format version: {version} (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid XML structure: {0}")]
    InvalidXml(String),

    #[error("Invalid tag-value document: {0}")]
    InvalidTagValue(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Invalid field value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sbom-codec operations
pub type Result<T> = std::result::Result<T, SbomCodecError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomCodecError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for content that matches no known format
    pub fn unknown_format(context: impl Into<String>) -> Self {
        Self::parse(context, ParseErrorKind::UnknownFormat)
    }

    /// Create a parse error for a format/version pairing this crate cannot handle
    pub fn unsupported(version: impl Into<String>, supported: impl Into<String>) -> Self {
        Self::parse(
            "unsupported format",
            ParseErrorKind::UnsupportedVersion {
                version: version.into(),
                supported: supported.into(),
            },
        )
    }

    /// Create a parse error for missing field
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::parse(
            "missing required field",
            ParseErrorKind::MissingField {
                field: field.into(),
                context: context.into(),
            },
        )
    }

    /// Create a serialization error
    pub fn serialize(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialize {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a validation error summarising a list of issues
    pub fn from_issues(issues: &[ValidationIssue]) -> Self {
        let joined = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation(joined)
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for SbomCodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SbomCodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<quick_xml::Error> for SbomCodecError {
    fn from(err: quick_xml::Error) -> Self {
        Self::parse(
            "XML deserialization",
            ParseErrorKind::InvalidXml(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The new context is prepended to whatever context the error already
/// carries, so nested calls read outermost-first.
///
/// ```ignore
/// use sbom_codec::error::ErrorContext;
///
/// let text = std::fs::read_to_string(path).context("reading SBOM file")?;
/// let doc = sbom_codec::deserialize(&text)
///     .with_context(|| format!("deserializing {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomCodecError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: SbomCodecError, new_ctx: &str) -> SbomCodecError {
    match err {
        SbomCodecError::Parse {
            context: existing,
            source,
        } => SbomCodecError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomCodecError::Serialize { format, message } => SbomCodecError::Serialize {
            format,
            message: chain_context(new_ctx, &message),
        },
        SbomCodecError::Io {
            path,
            message,
            source,
        } => SbomCodecError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        SbomCodecError::Config(msg) => SbomCodecError::Config(chain_context(new_ctx, &msg)),
        SbomCodecError::Validation(msg) => {
            SbomCodecError::Validation(chain_context(new_ctx, &msg))
        }
    }
}

/// Returns "`new`: `existing`", or just `new` when nothing is chained yet.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
