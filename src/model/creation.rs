//! Document creation metadata: who and what produced the SBOM.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::ExternalReference;

/// A person or mailbox. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Contact {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Organization information (supplier, manufacturer, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Organization {
    pub name: Option<String>,
    pub url: Option<String>,
    pub contacts: BTreeSet<Contact>,
}

impl Organization {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contacts.insert(contact);
        self
    }

    /// First contact carrying an email address, used by single-mailbox encodings.
    pub fn primary_email(&self) -> Option<&str> {
        self.contacts.iter().find_map(|c| c.email.as_deref())
    }
}

/// A tool that took part in producing the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreationTool {
    pub vendor: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub hashes: BTreeMap<String, String>,
    pub external_references: BTreeSet<ExternalReference>,
}

impl CreationTool {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Creation metadata for a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationData {
    /// Creation timestamp as written in the source (normally RFC 3339)
    pub created: Option<String>,
    pub creator_comment: Option<String>,
    pub tools: BTreeSet<CreationTool>,
    pub authors: BTreeSet<Contact>,
    pub manufacture: Option<Organization>,
    pub supplier: Option<Organization>,
    /// Free-form property bag; a key may carry several values
    pub properties: BTreeMap<String, BTreeSet<String>>,
}

impl CreationData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties
            .entry(name.into())
            .or_default()
            .insert(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_none()
            && self.creator_comment.is_none()
            && self.tools.is_empty()
            && self.authors.is_empty()
            && self.manufacture.is_none()
            && self.supplier.is_none()
            && self.properties.is_empty()
    }
}
