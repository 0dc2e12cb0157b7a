//! License data structures and SPDX expression handling.
//!
//! License values are kept as the raw strings found in the source document.
//! The `spdx` crate is only consulted to classify them (plain license id,
//! compound expression, or free text) when a target format needs to know.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The three license sets SPDX distinguishes, plus a free-text comment.
///
/// The union of all three sets is what a consumer should treat as every
/// license touching the component.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LicenseCollection {
    /// Licenses concluded by whoever produced the document
    pub concluded: BTreeSet<String>,
    /// Licenses declared by the component's authors
    pub declared: BTreeSet<String>,
    /// Licenses found in the component's files
    pub info_from_files: BTreeSet<String>,
    /// Free-text comment about the licensing
    pub comment: Option<String>,
}

impl LicenseCollection {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_concluded(&mut self, license: impl Into<String>) {
        self.concluded.insert(license.into());
    }

    pub fn add_declared(&mut self, license: impl Into<String>) {
        self.declared.insert(license.into());
    }

    pub fn add_info_from_files(&mut self, license: impl Into<String>) {
        self.info_from_files.insert(license.into());
    }

    /// Union of concluded, declared and info-from-files licenses.
    pub fn all(&self) -> BTreeSet<&str> {
        self.concluded
            .iter()
            .chain(&self.declared)
            .chain(&self.info_from_files)
            .map(String::as_str)
            .collect()
    }

    /// True when no license value or comment has been recorded.
    pub fn is_empty(&self) -> bool {
        self.concluded.is_empty()
            && self.declared.is_empty()
            && self.info_from_files.is_empty()
            && self.comment.is_none()
    }
}

/// A license that is not on the SPDX list, with its full text.
///
/// SPDX documents carry these under `hasExtractedLicensingInfos` (JSON) or
/// the `### Extracted Licensing Info` section (tag-value), keyed by a
/// `LicenseRef-` identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExtractedLicense {
    pub id: String,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cross_references: BTreeSet<String>,
    pub comment: Option<String>,
}

impl ExtractedLicense {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// How a license string should be expressed in formats that distinguish
/// between listed ids, compound expressions and free-form names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseForm {
    /// A single identifier from the SPDX license list
    SpdxId,
    /// A compound expression such as `MIT OR Apache-2.0`
    Expression,
    /// Anything else, including `LicenseRef-` ids
    Name,
}

/// Classify a raw license string.
pub fn classify_license(license: &str) -> LicenseForm {
    let trimmed = license.trim();
    if spdx::license_id(trimmed).is_some() {
        return LicenseForm::SpdxId;
    }
    if trimmed.contains(char::is_whitespace) && is_valid_spdx_expression(trimmed) {
        return LicenseForm::Expression;
    }
    LicenseForm::Name
}

/// Whether a string parses as an SPDX license expression (lax mode).
///
/// The `NOASSERTION` and `NONE` sentinels are accepted as valid.
pub fn is_valid_spdx_expression(expr: &str) -> bool {
    let expr = expr.trim();
    if expr.is_empty() {
        return false;
    }
    if expr == "NOASSERTION" || expr == "NONE" {
        return true;
    }
    spdx::Expression::parse_mode(expr, spdx::ParseMode::LAX).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_union_of_sets() {
        let mut licenses = LicenseCollection::new();
        licenses.add_concluded("MIT");
        licenses.add_declared("MIT");
        licenses.add_declared("Apache-2.0");
        licenses.add_info_from_files("BSD-3-Clause");

        let all = licenses.all();
        assert_eq!(all.len(), 3);
        assert!(all.contains("Apache-2.0"));
        assert!(all.contains("BSD-3-Clause"));
    }

    #[test]
    fn test_comment_alone_is_not_empty() {
        let mut licenses = LicenseCollection::new();
        assert!(licenses.is_empty());
        licenses.comment = Some("reviewed by legal".to_string());
        assert!(!licenses.is_empty());
    }

    #[test]
    fn test_classify_license() {
        assert_eq!(classify_license("MIT"), LicenseForm::SpdxId);
        assert_eq!(
            classify_license("MIT OR Apache-2.0"),
            LicenseForm::Expression
        );
        assert_eq!(classify_license("LicenseRef-custom"), LicenseForm::Name);
        assert_eq!(classify_license("My Own License"), LicenseForm::Name);
    }

    #[test]
    fn test_expression_validation() {
        assert!(is_valid_spdx_expression("GPL-2.0-only WITH Classpath-exception-2.0"));
        assert!(is_valid_spdx_expression("NOASSERTION"));
        assert!(!is_valid_spdx_expression(""));
        assert!(!is_valid_spdx_expression("not (a license"));
    }
}
