//! Structural and content checks over a finished [`Document`].

use packageurl::PackageUrl;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::{is_valid_spdx_expression, Document, SPDX_DOCUMENT_ID};
use crate::error::{Result, SbomCodecError};

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueSeverity {
    /// The document is structurally invalid
    Error,
    /// The document is usable but carries suspicious content
    Warning,
}

/// A single finding from [`Document::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    /// Component uid or document element the issue is about
    pub element: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    fn error(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            element: Some(element.into()),
            message: message.into(),
        }
    }

    fn warning(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            element: Some(element.into()),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
        };
        match &self.element {
            Some(element) => write!(f, "[{level}] {element}: {}", self.message),
            None => write!(f, "[{level}] {}", self.message),
        }
    }
}

/// Identifiers a relationship may point at without naming a component.
fn is_special_endpoint(doc: &Document, uid: &str) -> bool {
    uid == SPDX_DOCUMENT_ID
        || uid == "NONE"
        || uid == "NOASSERTION"
        || uid.starts_with("DocumentRef-")
        || doc.uid.as_deref() == Some(uid)
}

/// Relationship endpoints that match no component.
pub(crate) fn dangling_relationships(doc: &Document) -> Vec<ValidationIssue> {
    let known = |uid: &str| doc.component(uid).is_some() || is_special_endpoint(doc, uid);

    let mut issues = Vec::new();
    for (source, rel) in doc.relationships.edges() {
        if !known(source) {
            issues.push(ValidationIssue::error(
                source,
                format!("relationship source '{source}' is not a known component"),
            ));
        }
        if !known(rel.other_uid.as_str()) {
            issues.push(ValidationIssue::error(
                source,
                format!(
                    "{} target '{}' is not a known component",
                    rel.relationship_type, rel.other_uid
                ),
            ));
        }
    }
    issues
}

impl Document {
    /// Run every check and return all findings, errors first.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = dangling_relationships(self);

        if let Some(root) = &self.root_component {
            if self.components.contains_key(root.uid()) {
                issues.push(ValidationIssue::error(
                    root.uid(),
                    "root component uid is also used by a regular component",
                ));
            }
        }

        let mut seen_purls = HashSet::new();
        for component in self.all_components() {
            let core = component.core();
            for purl in &core.purls {
                if PackageUrl::from_str(purl).is_err() {
                    issues.push(ValidationIssue::warning(
                        &core.uid,
                        format!("'{purl}' is not a valid package URL"),
                    ));
                }
                if !seen_purls.insert(purl.as_str()) {
                    issues.push(ValidationIssue::warning(
                        &core.uid,
                        format!("package URL '{purl}' is shared with another component"),
                    ));
                }
            }
            for license in core.licenses.all() {
                if !license.starts_with("LicenseRef-") && !is_valid_spdx_expression(license) {
                    issues.push(ValidationIssue::warning(
                        &core.uid,
                        format!("'{license}' is not a valid SPDX license expression"),
                    ));
                }
            }
        }

        if let Some(created) = self.creation_data.as_ref().and_then(|c| c.created.as_deref()) {
            if chrono::DateTime::parse_from_rfc3339(created).is_err() {
                issues.push(ValidationIssue::warning(
                    "creationInfo.created",
                    format!("'{created}' is not an RFC 3339 timestamp"),
                ));
            }
        }

        for issue in issues.iter().filter(|i| !i.is_error()) {
            tracing::debug!("{issue}");
        }
        issues.sort_by_key(|i| !i.is_error());
        issues
    }

    /// Fail when [`validate`](Self::validate) reports any error-severity issue.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors: Vec<_> = self.validate().into_iter().filter(ValidationIssue::is_error).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SbomCodecError::from_issues(&errors))
        }
    }
}
