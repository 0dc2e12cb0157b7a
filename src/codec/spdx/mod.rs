//! SPDX 2.3 codecs.
//!
//! Both SPDX syntaxes share the pieces defined here: the creator-string
//! grammar (`Tool: `, `Person: `, `Organization: `), the `NOASSERTION`
//! sentinel handling, supplier/originator encodings, external-reference
//! demultiplexing into CPE/PURL sets, and promotion of the described
//! package to the document root.

mod json;
mod tag_value;
mod tag_value_writer;

pub use json::SpdxJsonCodec;
pub use tag_value::SpdxTagValueCodec;

use regex::Regex;
use std::sync::LazyLock;

use crate::config::SerializerConfig;
use crate::model::{
    Component, ComponentCore, ComponentFields, Contact, CreationData, CreationTool, Document,
    DocumentBuilder, ExternalReference, Organization, Relationship, SbomFormat, DESCRIBES,
    SPDX_DOCUMENT_ID,
};

/// Value SPDX uses for "the producer made no attempt to determine this".
pub const NOASSERTION: &str = "NOASSERTION";
/// Value SPDX uses for "determined to be absent".
pub const NONE: &str = "NONE";
/// The only data license SPDX documents may carry.
pub const DATA_LICENSE: &str = "CC0-1.0";
/// Spec version written when the document does not carry an SPDX one.
pub const DEFAULT_SPDX_VERSION: &str = "2.3";

const SPDX_VERSION_PREFIX: &str = "SPDX-";
/// Category under which external document references are kept in the model.
pub(crate) const DOCUMENT_REF_CATEGORY: &str = "DOCUMENT";

static TOOL_CREATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:tool):\s*(?:(.+)-(\d\S*?)|(.+?))\s*$").expect("static regex")
});
static CONTACT_CREATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Person|Organization):\s*(.*?)\s*(?:\(([^()]*)\))?\s*$").expect("static regex")
});

// ============================================================================
// Sentinels and versions
// ============================================================================

/// Trimmed value, or `None` for empty strings and `NOASSERTION`.
pub(crate) fn asserted(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && value != NOASSERTION).then_some(value)
}

/// `SPDX-2.3` to `2.3`.
pub(crate) fn strip_version_prefix(version: &str) -> &str {
    let version = version.trim();
    version.strip_prefix(SPDX_VERSION_PREFIX).unwrap_or(version)
}

/// Version line for output: the document's own version when it is an SPDX
/// document, otherwise the version this crate writes.
pub(crate) fn version_string(doc: &Document) -> String {
    let version = match (doc.format, doc.spec_version.as_deref()) {
        (SbomFormat::Spdx, Some(v)) => v,
        _ => DEFAULT_SPDX_VERSION,
    };
    format!("{SPDX_VERSION_PREFIX}{version}")
}

/// Digest algorithm spelled the SPDX way (`SHA-256` becomes `SHA256`).
pub(crate) fn spdx_algorithm(algorithm: &str) -> String {
    match algorithm.strip_prefix("SHA-") {
        Some(bits) if !bits.is_empty() && bits.chars().all(|c| c.is_ascii_digit()) => {
            format!("SHA{bits}")
        }
        _ => algorithm.to_string(),
    }
}

// ============================================================================
// Creator grammar
// ============================================================================

/// A classified `creators` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Creator {
    Tool(CreationTool),
    Person(Contact),
    Organization(Contact),
}

/// Classify a creator string. Returns `None` when it matches no pattern.
pub(crate) fn parse_creator(line: &str) -> Option<Creator> {
    let line = line.trim();
    if let Some(caps) = TOOL_CREATOR.captures(line) {
        // Split at the last dash followed by a digit.
        let name = caps.get(1).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        let mut tool = CreationTool::new(name.trim());
        tool.version = caps.get(2).map(|m| m.as_str().to_string());
        return Some(Creator::Tool(tool));
    }
    let caps = CONTACT_CREATOR.captures(line)?;
    let contact = Contact {
        name: non_empty(&caps[2]),
        email: caps.get(3).and_then(|m| non_empty(m.as_str())),
        phone: None,
    };
    if contact.is_empty() {
        return None;
    }
    match &caps[1] {
        "Person" => Some(Creator::Person(contact)),
        _ => Some(Creator::Organization(contact)),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Fold one creator string into creation metadata.
///
/// The first organization becomes the supplier; later ones are kept as
/// authors so that nothing is dropped.
pub(crate) fn apply_creator(data: &mut CreationData, line: &str) {
    match parse_creator(line) {
        Some(Creator::Tool(tool)) => {
            data.tools.insert(tool);
        }
        Some(Creator::Person(contact)) => {
            data.authors.insert(contact);
        }
        Some(Creator::Organization(contact)) if data.supplier.is_none() => {
            data.supplier = Some(organization_from_contact(contact));
        }
        Some(Creator::Organization(contact)) => {
            data.authors.insert(contact);
        }
        None => tracing::debug!("Ignoring unrecognized creator '{}'", line),
    }
}

fn organization_from_contact(contact: Contact) -> Organization {
    let mut org = Organization {
        name: contact.name,
        ..Organization::default()
    };
    if let Some(email) = contact.email {
        org.contacts.insert(Contact {
            email: Some(email),
            ..Contact::default()
        });
    }
    org
}

fn format_contact(kind: &str, name: Option<&str>, email: Option<&str>) -> Option<String> {
    let name = name?;
    Some(match email {
        Some(email) => format!("{kind}: {name} ({email})"),
        None => format!("{kind}: {name}"),
    })
}

pub(crate) fn format_tool(tool: &CreationTool) -> Option<String> {
    let name = tool.name.as_deref()?;
    Some(match &tool.version {
        Some(version) => format!("Tool: {name}-{version}"),
        None => format!("Tool: {name}"),
    })
}

/// Creator strings for a document, with the configured tool added when no
/// tool of the same name is already listed.
pub(crate) fn creator_lines(data: Option<&CreationData>, config: &SerializerConfig) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(data) = data {
        lines.extend(data.tools.iter().filter_map(format_tool));
    }
    if let Some(own) = &config.tool {
        let listed = data.is_some_and(|d| {
            d.tools
                .iter()
                .any(|t| t.name.as_deref() == Some(own.name.as_str()))
        });
        if !listed {
            lines.extend(format_tool(&own.to_creation_tool()));
        }
    }
    if let Some(data) = data {
        if let Some(supplier) = &data.supplier {
            lines.extend(format_organization(supplier));
        }
        lines.extend(
            data.authors
                .iter()
                .filter_map(|c| format_contact("Person", c.name.as_deref(), c.email.as_deref())),
        );
    }
    lines
}

// ============================================================================
// Supplier and originator
// ============================================================================

/// `Organization: name (email)` for an organization with a name.
pub(crate) fn format_organization(org: &Organization) -> Option<String> {
    format_contact("Organization", org.name.as_deref(), org.primary_email())
}

/// Package supplier from either contact form.
pub(crate) fn parse_supplier(value: &str) -> Option<Organization> {
    let value = asserted(value)?;
    match parse_creator(value) {
        Some(Creator::Person(c) | Creator::Organization(c)) => Some(organization_from_contact(c)),
        _ => Some(Organization::new(value)),
    }
}

/// Originator as written: `Person: ` is implied when no prefix is present.
pub(crate) fn format_originator(author: &str) -> String {
    if author.starts_with("Person: ") || author.starts_with("Organization: ") {
        author.to_string()
    } else {
        format!("Person: {author}")
    }
}

/// Originator as stored: only the implied `Person: ` prefix is removed.
pub(crate) fn parse_originator(value: &str) -> Option<String> {
    let value = asserted(value)?;
    Some(value.strip_prefix("Person: ").unwrap_or(value).trim().to_string())
}

// ============================================================================
// External references
// ============================================================================

/// One SPDX external reference in its flat on-the-wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RefEntry {
    pub category: String,
    pub ref_type: String,
    pub locator: String,
    pub comment: Option<String>,
}

/// Route an external reference into the CPE set, the PURL set, or the
/// generic reference set of the component being built.
pub(crate) fn apply_external_ref<B: ComponentFields>(builder: &mut B, entry: RefEntry) {
    let ref_type = entry.ref_type.trim();
    if ref_type.eq_ignore_ascii_case("cpe23type") || ref_type.eq_ignore_ascii_case("cpe22type") {
        builder.cpe(entry.locator);
    } else if ref_type.eq_ignore_ascii_case("purl") {
        builder.purl(entry.locator);
    } else {
        let mut reference = ExternalReference::new(entry.locator, ref_type);
        if !entry.category.is_empty() {
            reference.category = Some(entry.category);
        }
        reference.comment = entry.comment;
        builder.external_reference(reference);
    }
}

/// Every external reference a component should be written with: CPEs,
/// then PURLs, then its explicit references.
pub(crate) fn external_ref_entries(core: &ComponentCore) -> Vec<RefEntry> {
    let cpes = core.cpes.iter().map(|cpe| RefEntry {
        category: "SECURITY".to_string(),
        ref_type: "cpe23Type".to_string(),
        locator: cpe.clone(),
        comment: None,
    });
    let purls = core.purls.iter().map(|purl| RefEntry {
        category: "PACKAGE-MANAGER".to_string(),
        ref_type: "purl".to_string(),
        locator: purl.clone(),
        comment: None,
    });
    let others = core.external_references.iter().map(|r| RefEntry {
        category: r.category.clone().unwrap_or_else(|| "OTHER".to_string()),
        ref_type: r.ref_type.clone(),
        locator: r.url.clone(),
        comment: r.comment.clone(),
    });
    cpes.chain(purls).chain(others).collect()
}

/// Document-level reference for an SPDX external document reference.
pub(crate) fn external_document_ref(
    id: &str,
    document_uri: &str,
    checksum: Option<(&str, &str)>,
) -> ExternalReference {
    let mut reference =
        ExternalReference::new(document_uri, id).with_category(DOCUMENT_REF_CATEGORY);
    if let Some((algorithm, value)) = checksum {
        reference = reference.with_hash(algorithm, value);
    }
    reference
}

/// Document-level references that SPDX can carry as external document refs.
pub(crate) fn external_document_refs(doc: &Document) -> impl Iterator<Item = &ExternalReference> {
    doc.external_references.iter().filter(|r| {
        let keep = r.category.as_deref() == Some(DOCUMENT_REF_CATEGORY);
        if !keep {
            tracing::debug!(
                "SPDX has no slot for document reference '{}' ({})",
                r.url,
                r.ref_type
            );
        }
        keep
    })
}

// ============================================================================
// Root component and relationships
// ============================================================================

/// Uids the document describes: the root first, then any other targets of
/// `SPDXRef-DOCUMENT DESCRIBES`.
pub(crate) fn described_uids(doc: &Document) -> Vec<String> {
    let mut uids: Vec<String> = doc
        .root_component
        .iter()
        .map(|root| root.uid().to_string())
        .collect();
    if let Some(edges) = doc.relationships.get(SPDX_DOCUMENT_ID) {
        for rel in edges.iter().filter(|r| r.relationship_type == DESCRIBES) {
            if !uids.contains(&rel.other_uid) {
                uids.push(rel.other_uid.clone());
            }
        }
    }
    uids
}

/// Every relationship to write, the root's DESCRIBES edge first.
pub(crate) fn relationship_edges(doc: &Document) -> Vec<(String, Relationship)> {
    let mut edges = Vec::with_capacity(doc.relationships.len() + 1);
    let root_edge = doc
        .root_component
        .as_ref()
        .map(|root| Relationship::new(root.uid(), DESCRIBES));
    if let Some(edge) = &root_edge {
        edges.push((SPDX_DOCUMENT_ID.to_string(), edge.clone()));
    }
    edges.extend(
        doc.relationships
            .edges()
            .filter(|(source, rel)| *source != SPDX_DOCUMENT_ID || Some(*rel) != root_edge.as_ref())
            .map(|(source, rel)| (source.to_string(), rel.clone())),
    );
    edges
}

/// Make the first package the document describes its root, consuming the
/// uncommented `SPDXRef-DOCUMENT DESCRIBES` edge that names it.
///
/// `first_described` is the first described uid in document order; writers
/// put the root there. Other DESCRIBES edges stay relationships. Nothing is
/// promoted when that uid is a file or its edge carries a comment.
pub(crate) fn promote_described_root(builder: &mut DocumentBuilder, first_described: Option<&str>) {
    let Some(uid) = first_described else {
        return;
    };
    let edge = Relationship::new(uid, DESCRIBES);
    let has_edge = builder
        .relationships_mut()
        .get(SPDX_DOCUMENT_ID)
        .is_some_and(|rels| rels.contains(&edge));
    if !has_edge {
        return;
    }
    if !matches!(builder.component(uid), Some(Component::Package(_))) {
        return;
    }
    if let Some(root) = builder.take_component(uid) {
        builder.relationships_mut().remove(SPDX_DOCUMENT_ID, &edge);
        tracing::debug!(uid = root.uid(), "Promoting described package to document root");
        builder.root_component(root);
    }
}

/// Components in SPDX output order (root first), split into packages and files.
pub(crate) fn partition_components(doc: &Document) -> (Vec<&Component>, Vec<&Component>) {
    doc.all_components().partition(|c| !c.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PackageBuilder;

    #[test]
    fn test_tool_creator_splits_before_version() {
        assert_eq!(
            parse_creator("Tool: sbom-codec-0.1.0"),
            Some(Creator::Tool(
                CreationTool::new("sbom-codec").with_version("0.1.0")
            ))
        );
        assert_eq!(
            parse_creator("Tool: scanner"),
            Some(Creator::Tool(CreationTool::new("scanner")))
        );
        assert_eq!(
            parse_creator("Tool: my-scanner"),
            Some(Creator::Tool(CreationTool::new("my-scanner")))
        );
        assert_eq!(
            parse_creator("Tool: go-1password-scanner-2.0-rc1"),
            Some(Creator::Tool(
                CreationTool::new("go-1password-scanner").with_version("2.0-rc1")
            ))
        );
    }

    #[test]
    fn test_contact_creators() {
        assert_eq!(
            parse_creator("Person: Jane Doe (jane@example.com)"),
            Some(Creator::Person(
                Contact::new("Jane Doe").with_email("jane@example.com")
            ))
        );
        assert_eq!(
            parse_creator("Organization: Acme Corp"),
            Some(Creator::Organization(Contact::new("Acme Corp")))
        );
        assert_eq!(
            parse_creator("Person: Jane Doe ()"),
            Some(Creator::Person(Contact::new("Jane Doe")))
        );
        assert_eq!(parse_creator("Robot: R2"), None);
    }

    #[test]
    fn test_first_organization_becomes_supplier() {
        let mut data = CreationData::new();
        apply_creator(&mut data, "Organization: Acme (sbom@acme.test)");
        apply_creator(&mut data, "Organization: Other Org");
        apply_creator(&mut data, "Tool: builder-2.0");
        apply_creator(&mut data, "garbage");

        let supplier = data.supplier.as_ref().expect("supplier set");
        assert_eq!(supplier.name.as_deref(), Some("Acme"));
        assert_eq!(supplier.primary_email(), Some("sbom@acme.test"));
        assert!(data.authors.contains(&Contact::new("Other Org")));
        assert_eq!(data.tools.len(), 1);
    }

    #[test]
    fn test_creator_lines_add_own_tool_once() {
        let config = SerializerConfig::default();
        let lines = creator_lines(None, &config);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Tool: sbom-codec-"));

        let mut data = CreationData::new();
        data.tools.insert(CreationTool::new("sbom-codec").with_version("0.0.1"));
        let lines = creator_lines(Some(&data), &config);
        assert_eq!(lines, vec!["Tool: sbom-codec-0.0.1"]);
    }

    #[test]
    fn test_originator_prefix_handling() {
        assert_eq!(format_originator("Jane"), "Person: Jane");
        assert_eq!(format_originator("Organization: Acme"), "Organization: Acme");
        assert_eq!(parse_originator("Person: Jane").as_deref(), Some("Jane"));
        assert_eq!(
            parse_originator("Organization: Acme").as_deref(),
            Some("Organization: Acme")
        );
        assert_eq!(parse_originator(NOASSERTION), None);
    }

    #[test]
    fn test_external_refs_demultiplex_case_insensitively() {
        let mut builder = PackageBuilder::new();
        builder.uid("SPDXRef-1");
        for (ty, locator) in [
            ("CPE23TYPE", "cpe:2.3:a:acme:lib:1.0:*:*:*:*:*:*:*"),
            ("PURL", "pkg:npm/lib@1.0"),
            ("website", "https://lib.example"),
        ] {
            apply_external_ref(
                &mut builder,
                RefEntry {
                    category: "OTHER".to_string(),
                    ref_type: ty.to_string(),
                    locator: locator.to_string(),
                    comment: None,
                },
            );
        }
        let component = builder.build().unwrap();
        let core = component.core();
        assert_eq!(core.cpes.len(), 1);
        assert_eq!(core.purls.len(), 1);
        assert_eq!(core.external_references.len(), 1);
        assert_eq!(external_ref_entries(core).len(), 3);
    }

    #[test]
    fn test_algorithm_spelling() {
        assert_eq!(spdx_algorithm("SHA-256"), "SHA256");
        assert_eq!(spdx_algorithm("SHA1"), "SHA1");
        assert_eq!(spdx_algorithm("SHA3-256"), "SHA3-256");
        assert_eq!(strip_version_prefix("SPDX-2.3"), "2.3");
        assert_eq!(asserted(" NOASSERTION "), None);
        assert_eq!(asserted(NONE), Some(NONE));
    }

    #[test]
    fn test_single_describes_edge_promotes_package() {
        let mut builder = Document::builder(SbomFormat::Spdx);
        let mut root = PackageBuilder::new();
        root.uid("SPDXRef-app");
        builder.add_component(root.build().unwrap());
        builder.add_relationship(SPDX_DOCUMENT_ID, Relationship::new("SPDXRef-app", DESCRIBES));

        promote_described_root(&mut builder, Some("SPDXRef-app"));
        let doc = builder.build().unwrap();
        assert_eq!(doc.root_component.as_ref().map(Component::uid), Some("SPDXRef-app"));
        assert!(doc.components.is_empty());
        assert!(doc.relationships.is_empty());
        assert_eq!(relationship_edges(&doc).len(), 1);
        assert_eq!(described_uids(&doc), vec!["SPDXRef-app"]);
    }

    #[test]
    fn test_root_edge_is_written_first_and_promoted_back() {
        let mut builder = Document::builder(SbomFormat::Spdx);
        let mut root = PackageBuilder::new();
        root.uid("SPDXRef-z-app");
        builder.root_component(root.build().unwrap());
        let mut other = PackageBuilder::new();
        other.uid("SPDXRef-a-extra");
        builder.add_component(other.build().unwrap());
        builder.add_relationship(SPDX_DOCUMENT_ID, Relationship::new("SPDXRef-a-extra", DESCRIBES));
        builder.add_relationship(SPDX_DOCUMENT_ID, Relationship::new("SPDXRef-z-app", DESCRIBES));
        let doc = builder.build().unwrap();

        let edges = relationship_edges(&doc);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].1.other_uid, "SPDXRef-z-app");
        assert_eq!(described_uids(&doc), vec!["SPDXRef-z-app", "SPDXRef-a-extra"]);

        let mut reread = Document::builder(SbomFormat::Spdx);
        let mut app = PackageBuilder::new();
        app.uid("SPDXRef-z-app");
        reread.add_component(app.build().unwrap());
        let mut extra = PackageBuilder::new();
        extra.uid("SPDXRef-a-extra");
        reread.add_component(extra.build().unwrap());
        for (source, rel) in edges {
            reread.add_relationship(source, rel);
        }
        promote_described_root(&mut reread, Some("SPDXRef-z-app"));
        let reread = reread.build().unwrap();
        assert_eq!(reread.root_component.as_ref().map(Component::uid), Some("SPDXRef-z-app"));
        assert_eq!(
            reread.relationships.get(SPDX_DOCUMENT_ID).map(|r| r.len()),
            Some(1)
        );
    }

    #[test]
    fn test_commented_or_file_description_keeps_the_edge() {
        let mut builder = Document::builder(SbomFormat::Spdx);
        let mut app = PackageBuilder::new();
        app.uid("SPDXRef-app");
        builder.add_component(app.build().unwrap());
        builder.add_relationship(
            SPDX_DOCUMENT_ID,
            Relationship::new("SPDXRef-app", DESCRIBES).with_comment("primary"),
        );

        promote_described_root(&mut builder, Some("SPDXRef-app"));
        let doc = builder.build().unwrap();
        assert!(doc.root_component.is_none());
        assert_eq!(doc.relationships.len(), 1);
    }
}
