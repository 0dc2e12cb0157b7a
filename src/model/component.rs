//! Components: packages and files.
//!
//! A [`Component`] is either a [`PackageRecord`] or a [`FileRecord`]. The
//! variant is chosen once, by the builder that produced it, and never
//! re-derived from field contents afterwards.
//!
//! Deserializers build components with a fresh [`PackageBuilder`] or
//! [`FileBuilder`] per record. The setters shared by both live on the
//! [`ComponentFields`] trait, so bring it into scope when building:
//!
//! ```
//! use sbom_codec::model::{ComponentFields, PackageBuilder};
//!
//! let mut builder = PackageBuilder::new();
//! builder.uid("SPDXRef-foo").name("foo").version("1.0");
//! let component = builder.build().unwrap();
//! assert_eq!(component.name(), Some("foo"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Description, ExternalReference, LicenseCollection, Organization};
use crate::error::{Result, SbomCodecError};

/// Which variant a component is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Package,
    File,
}

/// Fields every component carries, whatever its variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCore {
    /// Document-unique identifier (`SPDXRef-*` or a CycloneDX `bom-ref`)
    pub uid: String,
    pub name: Option<String>,
    pub version: Option<String>,
    /// Type or purpose tag (`LIBRARY`, `SOURCE`, `application`, ...)
    pub component_type: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub supplier: Option<Organization>,
    pub copyright: Option<String>,
    pub licenses: LicenseCollection,
    /// Algorithm name to digest value
    pub hashes: BTreeMap<String, String>,
    pub cpes: BTreeSet<String>,
    pub purls: BTreeSet<String>,
    pub external_references: BTreeSet<ExternalReference>,
    pub description: Option<Description>,
    pub comment: Option<String>,
    pub attribution_text: Option<String>,
    pub mime_type: Option<String>,
    pub scope: Option<String>,
    pub group: Option<String>,
    pub properties: BTreeMap<String, BTreeSet<String>>,
}

/// A package and its distribution metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    #[serde(flatten)]
    pub core: ComponentCore,
    pub download_location: Option<String>,
    pub file_name: Option<String>,
    pub files_analyzed: Option<bool>,
    pub verification_code: Option<String>,
    pub home_page: Option<String>,
    pub source_info: Option<String>,
    pub release_date: Option<String>,
    pub built_date: Option<String>,
    pub valid_until_date: Option<String>,
}

/// A single file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(flatten)]
    pub core: ComponentCore,
    pub notice: Option<String>,
    /// Every contributor, in document order
    pub contributors: Vec<String>,
}

/// One package or one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Component {
    Package(PackageRecord),
    File(FileRecord),
}

impl Component {
    pub fn core(&self) -> &ComponentCore {
        match self {
            Self::Package(p) => &p.core,
            Self::File(f) => &f.core,
        }
    }

    pub fn uid(&self) -> &str {
        &self.core().uid
    }

    pub fn name(&self) -> Option<&str> {
        self.core().name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.core().version.as_deref()
    }

    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Package(_) => ComponentKind::Package,
            Self::File(_) => ComponentKind::File,
        }
    }

    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub const fn as_package(&self) -> Option<&PackageRecord> {
        match self {
            Self::Package(p) => Some(p),
            Self::File(_) => None,
        }
    }

    pub const fn as_file(&self) -> Option<&FileRecord> {
        match self {
            Self::File(f) => Some(f),
            Self::Package(_) => None,
        }
    }

    /// Name for log messages: the name if present, otherwise the uid.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or_else(|| self.uid())
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Setters shared by [`PackageBuilder`] and [`FileBuilder`].
///
/// Every setter stores exactly what it is given. A field nobody sets stays
/// absent and is omitted by serializers.
pub trait ComponentFields {
    /// Direct access to the shared fields, for callers holding `Option`s.
    fn core_mut(&mut self) -> &mut ComponentCore;

    fn uid(&mut self, uid: impl Into<String>) -> &mut Self {
        self.core_mut().uid = uid.into();
        self
    }

    fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.core_mut().name = Some(name.into());
        self
    }

    fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.core_mut().version = Some(version.into());
        self
    }

    fn component_type(&mut self, component_type: impl Into<String>) -> &mut Self {
        self.core_mut().component_type = Some(component_type.into());
        self
    }

    fn author(&mut self, author: impl Into<String>) -> &mut Self {
        self.core_mut().author = Some(author.into());
        self
    }

    fn publisher(&mut self, publisher: impl Into<String>) -> &mut Self {
        self.core_mut().publisher = Some(publisher.into());
        self
    }

    fn supplier(&mut self, supplier: Organization) -> &mut Self {
        self.core_mut().supplier = Some(supplier);
        self
    }

    fn copyright(&mut self, copyright: impl Into<String>) -> &mut Self {
        self.core_mut().copyright = Some(copyright.into());
        self
    }

    fn concluded_license(&mut self, license: impl Into<String>) -> &mut Self {
        self.core_mut().licenses.add_concluded(license);
        self
    }

    fn declared_license(&mut self, license: impl Into<String>) -> &mut Self {
        self.core_mut().licenses.add_declared(license);
        self
    }

    fn info_from_files_license(&mut self, license: impl Into<String>) -> &mut Self {
        self.core_mut().licenses.add_info_from_files(license);
        self
    }

    fn license_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.core_mut().licenses.comment = Some(comment.into());
        self
    }

    fn hash(&mut self, algorithm: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.core_mut().hashes.insert(algorithm.into(), value.into());
        self
    }

    fn cpe(&mut self, cpe: impl Into<String>) -> &mut Self {
        self.core_mut().cpes.insert(cpe.into());
        self
    }

    fn purl(&mut self, purl: impl Into<String>) -> &mut Self {
        self.core_mut().purls.insert(purl.into());
        self
    }

    fn external_reference(&mut self, reference: ExternalReference) -> &mut Self {
        self.core_mut().external_references.insert(reference);
        self
    }

    fn summary(&mut self, summary: impl Into<String>) -> &mut Self {
        self.core_mut()
            .description
            .get_or_insert_with(Description::default)
            .summary = Some(summary.into());
        self
    }

    fn details(&mut self, details: impl Into<String>) -> &mut Self {
        self.core_mut()
            .description
            .get_or_insert_with(Description::default)
            .details = Some(details.into());
        self
    }

    fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.core_mut().comment = Some(comment.into());
        self
    }

    fn attribution_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.core_mut().attribution_text = Some(text.into());
        self
    }

    fn mime_type(&mut self, mime_type: impl Into<String>) -> &mut Self {
        self.core_mut().mime_type = Some(mime_type.into());
        self
    }

    fn scope(&mut self, scope: impl Into<String>) -> &mut Self {
        self.core_mut().scope = Some(scope.into());
        self
    }

    fn group(&mut self, group: impl Into<String>) -> &mut Self {
        self.core_mut().group = Some(group.into());
        self
    }

    fn property(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.core_mut()
            .properties
            .entry(name.into())
            .or_default()
            .insert(value.into());
        self
    }
}

fn require_uid(core: &ComponentCore, kind: &str) -> Result<()> {
    if core.uid.trim().is_empty() {
        let context = match &core.name {
            Some(name) => format!("{kind} '{name}'"),
            None => kind.to_string(),
        };
        return Err(SbomCodecError::missing_field("uid", context));
    }
    Ok(())
}

/// Builder for a [`PackageRecord`].
#[derive(Debug, Default)]
#[must_use]
pub struct PackageBuilder {
    record: PackageRecord,
}

impl ComponentFields for PackageBuilder {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.record.core
    }
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn download_location(&mut self, location: impl Into<String>) -> &mut Self {
        self.record.download_location = Some(location.into());
        self
    }

    pub fn file_name(&mut self, file_name: impl Into<String>) -> &mut Self {
        self.record.file_name = Some(file_name.into());
        self
    }

    pub fn files_analyzed(&mut self, analyzed: bool) -> &mut Self {
        self.record.files_analyzed = Some(analyzed);
        self
    }

    pub fn verification_code(&mut self, code: impl Into<String>) -> &mut Self {
        self.record.verification_code = Some(code.into());
        self
    }

    pub fn home_page(&mut self, home_page: impl Into<String>) -> &mut Self {
        self.record.home_page = Some(home_page.into());
        self
    }

    pub fn source_info(&mut self, source_info: impl Into<String>) -> &mut Self {
        self.record.source_info = Some(source_info.into());
        self
    }

    pub fn release_date(&mut self, date: impl Into<String>) -> &mut Self {
        self.record.release_date = Some(date.into());
        self
    }

    pub fn built_date(&mut self, date: impl Into<String>) -> &mut Self {
        self.record.built_date = Some(date.into());
        self
    }

    pub fn valid_until_date(&mut self, date: impl Into<String>) -> &mut Self {
        self.record.valid_until_date = Some(date.into());
        self
    }

    /// Freeze the record. Fails only when no uid was set.
    pub fn build(self) -> Result<Component> {
        require_uid(&self.record.core, "package")?;
        Ok(Component::Package(self.record))
    }
}

/// Builder for a [`FileRecord`].
#[derive(Debug, Default)]
#[must_use]
pub struct FileBuilder {
    record: FileRecord,
}

impl ComponentFields for FileBuilder {
    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.record.core
    }
}

impl FileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(&mut self, notice: impl Into<String>) -> &mut Self {
        self.record.notice = Some(notice.into());
        self
    }

    pub fn contributor(&mut self, contributor: impl Into<String>) -> &mut Self {
        self.record.contributors.push(contributor.into());
        self
    }

    /// Freeze the record. Fails only when no uid was set.
    pub fn build(self) -> Result<Component> {
        require_uid(&self.record.core, "file")?;
        Ok(Component::File(self.record))
    }
}
