//! Canonical document model shared by every codec.
//!
//! A [`Document`] owns its components (a package-or-file [`Component`]
//! enum keyed by uid), the [`RelationshipMap`] between them and the
//! [`CreationData`] describing who produced it. Nothing here knows about
//! SPDX or CycloneDX field names.
//!
//! Records are produced by builders ([`DocumentBuilder`], [`PackageBuilder`],
//! [`FileBuilder`]) and treated as immutable afterwards.

mod component;
mod creation;
mod document;
mod license;
mod reference;
mod relationship;
mod validation;

pub use component::*;
pub use creation::*;
pub use document::*;
pub use license::*;
pub use reference::*;
pub use relationship::*;
pub use validation::{IssueSeverity, ValidationIssue};
