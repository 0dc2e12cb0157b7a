//! The document root and its builder.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::{
    validation, Component, CreationData, ExternalReference, ExtractedLicense, Relationship,
    RelationshipMap,
};
use crate::error::{Result, SbomCodecError};

/// Which standard a document originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SbomFormat {
    #[serde(rename = "SPDX")]
    Spdx,
    #[serde(rename = "CycloneDX")]
    CycloneDx,
}

impl fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spdx => write!(f, "SPDX"),
            Self::CycloneDx => write!(f, "CycloneDX"),
        }
    }
}

/// Canonical, format-independent SBOM.
///
/// Equality is semantic: components are compared as a map keyed by uid and
/// every multi-valued field is a set, so two documents that differ only in
/// ordering compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub format: SbomFormat,
    /// Spec version without any prefix (`2.3`, `1.4`)
    pub spec_version: Option<String>,
    pub name: Option<String>,
    /// SPDX document namespace or CycloneDX serial number
    pub uid: Option<String>,
    /// CycloneDX BOM revision
    pub version: Option<String>,
    pub document_comment: Option<String>,
    pub licenses: BTreeSet<String>,
    pub creation_data: Option<CreationData>,
    /// The component the document describes, kept apart from `components`
    pub root_component: Option<Component>,
    pub components: IndexMap<String, Component>,
    pub relationships: RelationshipMap,
    pub external_references: BTreeSet<ExternalReference>,
    pub license_list_version: Option<String>,
    pub extracted_licenses: BTreeMap<String, ExtractedLicense>,
}

impl Document {
    /// Create an empty document of the given format.
    #[must_use]
    pub fn new(format: SbomFormat) -> Self {
        Self {
            format,
            spec_version: None,
            name: None,
            uid: None,
            version: None,
            document_comment: None,
            licenses: BTreeSet::new(),
            creation_data: None,
            root_component: None,
            components: IndexMap::new(),
            relationships: RelationshipMap::new(),
            external_references: BTreeSet::new(),
            license_list_version: None,
            extracted_licenses: BTreeMap::new(),
        }
    }

    pub fn builder(format: SbomFormat) -> DocumentBuilder {
        DocumentBuilder::new(format)
    }

    /// Look up a component (root included) by uid.
    pub fn component(&self, uid: &str) -> Option<&Component> {
        self.components.get(uid).or_else(|| {
            self.root_component
                .as_ref()
                .filter(|root| root.uid() == uid)
        })
    }

    /// Root first, then the rest in insertion order.
    pub fn all_components(&self) -> impl Iterator<Item = &Component> {
        self.root_component.iter().chain(self.components.values())
    }

    pub fn component_count(&self) -> usize {
        self.components.len() + usize::from(self.root_component.is_some())
    }
}

/// Builder for [`Document`].
///
/// `build` refuses documents whose relationships point at identifiers that
/// do not exist, which is the one structural error deserializers surface.
#[derive(Debug)]
#[must_use]
pub struct DocumentBuilder {
    document: Document,
    collisions: usize,
}

impl DocumentBuilder {
    pub fn new(format: SbomFormat) -> Self {
        Self {
            document: Document::new(format),
            collisions: 0,
        }
    }

    pub fn spec_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.document.spec_version = Some(version.into());
        self
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.document.name = Some(name.into());
        self
    }

    pub fn uid(&mut self, uid: impl Into<String>) -> &mut Self {
        self.document.uid = Some(uid.into());
        self
    }

    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.document.version = Some(version.into());
        self
    }

    pub fn document_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.document.document_comment = Some(comment.into());
        self
    }

    pub fn license(&mut self, license: impl Into<String>) -> &mut Self {
        self.document.licenses.insert(license.into());
        self
    }

    /// Attach creation metadata. Empty metadata is stored as absent.
    pub fn creation_data(&mut self, data: CreationData) -> &mut Self {
        self.document.creation_data = (!data.is_empty()).then_some(data);
        self
    }

    pub fn root_component(&mut self, component: Component) -> &mut Self {
        self.document.root_component = Some(component);
        self
    }

    /// Add a component. Returns true when it replaced one with the same uid.
    pub fn add_component(&mut self, component: Component) -> bool {
        let uid = component.uid().to_string();
        let replaced = self.document.components.insert(uid, component);
        if let Some(previous) = &replaced {
            self.collisions += 1;
            tracing::warn!(
                uid = previous.uid(),
                "Duplicate component identifier; later record replaces '{}'",
                previous.display_name()
            );
        }
        replaced.is_some()
    }

    pub fn add_relationship(
        &mut self,
        source: impl Into<String>,
        relationship: Relationship,
    ) -> &mut Self {
        self.document.relationships.add(source, relationship);
        self
    }

    pub fn external_reference(&mut self, reference: ExternalReference) -> &mut Self {
        self.document.external_references.insert(reference);
        self
    }

    pub fn license_list_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.document.license_list_version = Some(version.into());
        self
    }

    pub fn extracted_license(&mut self, license: ExtractedLicense) -> &mut Self {
        self.document
            .extracted_licenses
            .insert(license.id.clone(), license);
        self
    }

    /// Uids added so far, root included.
    pub fn contains_component(&self, uid: &str) -> bool {
        self.document.component(uid).is_some()
    }

    /// Peek at a component added so far, root included.
    pub fn component(&self, uid: &str) -> Option<&Component> {
        self.document.component(uid)
    }

    /// Mutable access to the relationship map while the document is open.
    pub fn relationships_mut(&mut self) -> &mut RelationshipMap {
        &mut self.document.relationships
    }

    /// Take a component out again, e.g. to promote it to root.
    pub fn take_component(&mut self, uid: &str) -> Option<Component> {
        self.document.components.shift_remove(uid)
    }

    /// Freeze the document, rejecting relationships to unknown identifiers.
    pub fn build(self) -> Result<Document> {
        if self.collisions > 0 {
            tracing::info!(
                collisions = self.collisions,
                "{} component records shared an identifier with an earlier record",
                self.collisions
            );
        }
        let dangling = validation::dangling_relationships(&self.document);
        if !dangling.is_empty() {
            return Err(SbomCodecError::from_issues(&dangling));
        }
        Ok(self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentFields, PackageBuilder, DEPENDS_ON};

    fn package(uid: &str, name: &str) -> Component {
        let mut builder = PackageBuilder::new();
        builder.uid(uid).name(name);
        builder.build().expect("uid set")
    }

    #[test]
    fn test_builder_rejects_dangling_relationship() {
        let mut builder = Document::builder(SbomFormat::CycloneDx);
        builder.add_component(package("a", "alpha"));
        builder.add_relationship("a", Relationship::new("missing", DEPENDS_ON));

        let err = builder.build().unwrap_err();
        assert!(matches!(err, SbomCodecError::Validation(ref msg) if msg.contains("missing")));
    }

    #[test]
    fn test_builder_accepts_root_as_endpoint() {
        let mut builder = Document::builder(SbomFormat::CycloneDx);
        builder.root_component(package("app", "app"));
        builder.add_component(package("lib", "lib"));
        builder.add_relationship("app", Relationship::new("lib", DEPENDS_ON));

        let doc = builder.build().expect("valid document");
        assert_eq!(doc.component_count(), 2);
        assert!(doc.component("app").is_some());
    }

    #[test]
    fn test_duplicate_uid_replaces() {
        let mut builder = Document::builder(SbomFormat::Spdx);
        assert!(!builder.add_component(package("SPDXRef-1", "first")));
        assert!(builder.add_component(package("SPDXRef-1", "second")));

        let doc = builder.build().expect("valid document");
        assert_eq!(doc.components.len(), 1);
        assert_eq!(doc.components["SPDXRef-1"].name(), Some("second"));
    }

    #[test]
    fn test_equality_ignores_component_order() {
        let mut first = Document::builder(SbomFormat::Spdx);
        first.add_component(package("x", "x"));
        first.add_component(package("y", "y"));

        let mut second = Document::builder(SbomFormat::Spdx);
        second.add_component(package("y", "y"));
        second.add_component(package("x", "x"));

        assert_eq!(first.build().ok(), second.build().ok());
    }

    #[test]
    fn test_empty_creation_data_is_absent() {
        let mut builder = Document::builder(SbomFormat::Spdx);
        builder.creation_data(CreationData::new());
        let doc = builder.build().expect("valid document");
        assert!(doc.creation_data.is_none());
    }
}
