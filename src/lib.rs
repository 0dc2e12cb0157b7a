//! # sbom-codec
//!
//! `sbom-codec` reads and writes Software Bills of Materials in the SPDX and
//! CycloneDX standards through one format-independent document model.
//!
//! ## Key Features
//!
//! - **Multiple syntaxes**: SPDX 2.3 as JSON and tag-value, CycloneDX 1.4 as
//!   JSON and XML.
//! - **Format detection**: content is scored by every deserializer and the
//!   most confident one wins, so callers rarely need to name the format.
//! - **Lenient reading**: single values where lists are expected, `NONE` and
//!   `NOASSERTION` placeholders, unknown tags and missing optional fields are
//!   tolerated with a warning instead of failing the whole document.
//! - **Cross-format conversion**: a document read from one schema can be
//!   written to the other; the lossy cases are documented per codec.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the [`Document`] and [`Component`] types plus builders
//!   that enforce uid and relationship-endpoint invariants.
//! - **[`codec`]**: the [`SbomDeserializer`]/[`SbomSerializer`] traits, one
//!   codec per schema and syntax, and the [`FormatDetector`].
//! - **[`config`]**: [`SerializerConfig`], loadable from a YAML or JSON file.
//! - **[`error`]**: [`SbomCodecError`] and the context helpers used to build it.
//!
//! ## Getting Started
//!
//! ### Converting between formats
//!
//! ```
//! use sbom_codec::{deserialize, serialize, Schema, SerializationFormat, SerializerConfig};
//!
//! let spdx = r#"{
//!   "spdxVersion": "SPDX-2.3",
//!   "dataLicense": "CC0-1.0",
//!   "SPDXID": "SPDXRef-DOCUMENT",
//!   "name": "demo",
//!   "packages": [{"SPDXID": "SPDXRef-pkg", "name": "left-pad", "versionInfo": "1.3.0"}]
//! }"#;
//!
//! let doc = deserialize(spdx)?;
//! assert_eq!(doc.component_count(), 1);
//!
//! let xml = serialize(
//!     &doc,
//!     Schema::CycloneDx14,
//!     SerializationFormat::Xml,
//!     &SerializerConfig::default(),
//! )?;
//! assert!(xml.contains("<name>left-pad</name>"));
//! # Ok::<(), sbom_codec::SbomCodecError>(())
//! ```
//!
//! ### Building a document by hand
//!
//! ```
//! use sbom_codec::model::{ComponentFields, Document, PackageBuilder, Relationship, SbomFormat, DEPENDS_ON};
//!
//! let mut builder = Document::builder(SbomFormat::Spdx);
//! for uid in ["SPDXRef-app", "SPDXRef-lib"] {
//!     let mut package = PackageBuilder::new();
//!     package.uid(uid).name(uid.trim_start_matches("SPDXRef-"));
//!     builder.add_component(package.build()?);
//! }
//! builder.add_relationship("SPDXRef-app", Relationship::new("SPDXRef-lib", DEPENDS_ON));
//! let doc = builder.build()?;
//! assert_eq!(doc.relationships.len(), 1);
//! # Ok::<(), sbom_codec::SbomCodecError>(())
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Variable names like `spdx`/`cdx` are clear in context
    clippy::similar_names
)]

pub mod codec;
pub mod config;
pub mod error;
pub mod model;

// Re-export main types for convenience
pub use codec::{
    deserialize, deserialize_as, deserialize_path, detect_format, serialize, serialize_to_path,
};
pub use codec::{
    CycloneDxJsonCodec, CycloneDxXmlCodec, DetectionResult, FormatDetector, SbomDeserializer,
    SbomSerializer, Schema, SerializationFormat, SpdxJsonCodec, SpdxTagValueCodec,
};
pub use config::{ConfigError, SerializerConfig, SerializerConfigBuilder, ToolIdentity, Validatable};
pub use error::{ErrorContext, ParseErrorKind, Result, SbomCodecError};
pub use model::{Component, ComponentFields, Document, DocumentBuilder, SbomFormat};
