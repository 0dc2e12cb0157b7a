//! External references and descriptive text attached to components.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A link from a component or document to something outside it.
///
/// SPDX names the locator/category/type triple; CycloneDX names url/type
/// and has no category, so codecs that cannot carry a field encode it
/// elsewhere or leave it out.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExternalReference {
    /// Locator or URL
    pub url: String,
    /// Reference type (`website`, `purl`, `cpe23Type`, ...)
    pub ref_type: String,
    /// SPDX reference category (`SECURITY`, `PACKAGE-MANAGER`, `OTHER`, ...)
    pub category: Option<String>,
    pub comment: Option<String>,
    /// Algorithm name to digest value
    pub hashes: BTreeMap<String, String>,
}

impl ExternalReference {
    /// Create a reference with a locator and type
    #[must_use]
    pub fn new(url: impl Into<String>, ref_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ref_type: ref_type.into(),
            category: None,
            comment: None,
            hashes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn with_hash(mut self, algorithm: impl Into<String>, value: impl Into<String>) -> Self {
        self.hashes.insert(algorithm.into(), value.into());
        self
    }
}

/// Short summary plus longer free-text details.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Description {
    pub summary: Option<String>,
    pub details: Option<String>,
}

impl Description {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.details.is_none()
    }
}
