//! Correspondence between the CycloneDX schema shapes and the document model.

use std::collections::{BTreeMap, BTreeSet};
use xxhash_rust::xxh3::xxh3_128;

use super::schema::{
    CdxBom, CdxComponent, CdxContact, CdxDependency, CdxExternalReference, CdxHash, CdxLicense,
    CdxLicenseChoice, CdxMetadata, CdxOrganization, CdxProperty, CdxTool, CdxTools,
};
use super::{
    cdx_algorithm, cdx_component_type, BOM_FORMAT, CREATOR_COMMENT_PROPERTY, DEFAULT_CDX_VERSION,
    EXTRA_CPE_PROPERTY, EXTRA_PURL_PROPERTY, SUMMARY_PROPERTY,
};
use crate::config::SerializerConfig;
use crate::error::Result;
use crate::model::{
    classify_license, Component, ComponentFields, Contact, CreationData, CreationTool, Document,
    DocumentBuilder, ExternalReference, FileBuilder, LicenseForm, Organization, PackageBuilder,
    Relationship, SbomFormat, DEPENDS_ON, SPDX_DOCUMENT_ID,
};

const CATEGORY_PREFIX: &str = "Category: ";
const CATEGORY_SEPARATOR: &str = " | ";

// ============================================================================
// Reading
// ============================================================================

pub(crate) fn document_from_bom(bom: CdxBom) -> Result<Document> {
    let mut builder = Document::builder(SbomFormat::CycloneDx);
    if let Some(version) = &bom.spec_version {
        builder.spec_version(version.trim());
    }
    if let Some(serial) = bom.serial_number {
        builder.uid(serial);
    }
    if let Some(version) = bom.version {
        builder.version(version.to_string());
    }

    if let Some(metadata) = bom.metadata {
        apply_metadata(&mut builder, metadata);
    }

    tracing::debug!(components = bom.components.len(), "Read CycloneDX components");
    add_components(&mut builder, bom.components);

    for reference in bom.external_references {
        builder.external_reference(reference_from_cdx(reference));
    }

    for dependency in bom.dependencies {
        for target in dependency.depends_on {
            builder.add_relationship(
                dependency.dependency_ref.clone(),
                Relationship::new(target, DEPENDS_ON),
            );
        }
    }

    builder.build()
}

fn apply_metadata(builder: &mut DocumentBuilder, metadata: CdxMetadata) {
    let mut data = CreationData::new();
    data.created = metadata.timestamp;

    match metadata.tools {
        Some(CdxTools::List(tools)) => {
            data.tools.extend(tools.into_iter().map(tool_from_cdx));
        }
        Some(CdxTools::Components { components }) => {
            data.tools
                .extend(components.into_iter().map(tool_from_component));
        }
        None => {}
    }

    data.authors.extend(
        metadata
            .authors
            .into_iter()
            .map(contact_from_cdx)
            .filter(|c| !c.is_empty()),
    );
    data.manufacture = metadata.manufacture.map(organization_from_cdx);
    data.supplier = metadata.supplier.map(organization_from_cdx);

    for license in metadata.licenses.into_iter().filter_map(license_from_cdx) {
        builder.license(license);
    }

    for property in metadata.properties {
        let value = property.value.unwrap_or_default();
        if property.name == CREATOR_COMMENT_PROPERTY || property.name == "creatorComment" {
            data.creator_comment = Some(value);
        } else {
            data.add_property(property.name, value);
        }
    }
    builder.creation_data(data);

    if let Some(root) = metadata.component {
        let mut root = *root;
        let children = std::mem::take(&mut root.components);
        match component_from_cdx(root) {
            Ok(component) => {
                builder.root_component(component);
            }
            Err(e) => tracing::warn!("Ignoring CycloneDX metadata component: {}", e),
        }
        add_components(builder, children);
    }
}

/// Add components depth-first, lifting nested `components` to the top level.
fn add_components(builder: &mut DocumentBuilder, components: Vec<CdxComponent>) {
    for mut component in components {
        let children = std::mem::take(&mut component.components);
        match component_from_cdx(component) {
            Ok(component) => {
                builder.add_component(component);
            }
            Err(e) => tracing::warn!("Skipping CycloneDX component: {}", e),
        }
        add_components(builder, children);
    }
}

/// `bom-ref`, else the purl, else `name@version`.
fn component_uid(component: &CdxComponent) -> Option<String> {
    if let Some(bom_ref) = component.bom_ref.as_deref().filter(|r| !r.trim().is_empty()) {
        return Some(bom_ref.to_string());
    }
    if let Some(purl) = component.purl.as_deref().filter(|p| !p.trim().is_empty()) {
        return Some(purl.to_string());
    }
    let name = component.name.as_deref()?;
    Some(match component.version.as_deref() {
        Some(version) => format!("{name}@{version}"),
        None => name.to_string(),
    })
}

fn component_from_cdx(component: CdxComponent) -> Result<Component> {
    let is_file = component
        .component_type
        .as_deref()
        .is_some_and(|t| t.eq_ignore_ascii_case("file"));
    if is_file {
        let mut builder = FileBuilder::new();
        apply_component(&mut builder, component);
        builder.build()
    } else {
        let mut builder = PackageBuilder::new();
        apply_component(&mut builder, component);
        builder.build()
    }
}

fn apply_component<B: ComponentFields>(builder: &mut B, component: CdxComponent) {
    if let Some(uid) = component_uid(&component) {
        builder.uid(uid);
    }
    let core = builder.core_mut();
    core.name = component.name;
    core.version = component.version;
    core.component_type = component.component_type;
    core.mime_type = component.mime_type;
    core.group = component.group;
    core.scope = component.scope;
    core.author = component.author;
    core.publisher = component.publisher;
    core.copyright = component.copyright;
    core.supplier = component.supplier.map(organization_from_cdx);

    if let Some(details) = component.description {
        builder.details(details);
    }
    for hash in component.hashes {
        builder.hash(hash.alg, hash.content);
    }
    for license in component.licenses.into_iter().filter_map(license_from_cdx) {
        builder.declared_license(license);
    }
    if let Some(cpe) = component.cpe {
        builder.cpe(cpe);
    }
    if let Some(purl) = component.purl {
        builder.purl(purl);
    }
    for reference in component.external_references {
        builder.external_reference(reference_from_cdx(reference));
    }
    for property in component.properties {
        let value = property.value.unwrap_or_default();
        if property.name == EXTRA_CPE_PROPERTY {
            builder.cpe(value);
        } else if property.name == EXTRA_PURL_PROPERTY {
            builder.purl(value);
        } else if property.name == SUMMARY_PROPERTY {
            builder.summary(value);
        } else {
            builder.property(property.name, value);
        }
    }
}

/// License id, else name, else expression.
fn license_from_cdx(choice: CdxLicenseChoice) -> Option<String> {
    let from_license = choice.license.and_then(|l| l.id.or(l.name));
    from_license
        .or(choice.expression)
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

fn contact_from_cdx(contact: CdxContact) -> Contact {
    Contact {
        name: contact.name,
        email: contact.email,
        phone: contact.phone,
    }
}

fn organization_from_cdx(org: CdxOrganization) -> Organization {
    Organization {
        name: org.name,
        url: org.url.into_iter().next(),
        contacts: org
            .contact
            .into_iter()
            .map(contact_from_cdx)
            .filter(|c| !c.is_empty())
            .collect(),
    }
}

fn tool_from_cdx(tool: CdxTool) -> CreationTool {
    CreationTool {
        vendor: tool.vendor,
        name: tool.name,
        version: tool.version,
        hashes: tool.hashes.into_iter().map(|h| (h.alg, h.content)).collect(),
        external_references: tool
            .external_references
            .into_iter()
            .map(reference_from_cdx)
            .collect(),
    }
}

/// 1.5-style tool entry: a component whose supplier or publisher is the vendor.
fn tool_from_component(component: CdxComponent) -> CreationTool {
    let vendor = component
        .supplier
        .and_then(|s| s.name)
        .or(component.publisher)
        .or(component.group);
    CreationTool {
        vendor,
        name: component.name,
        version: component.version,
        hashes: component
            .hashes
            .into_iter()
            .map(|h| (h.alg, h.content))
            .collect(),
        external_references: component
            .external_references
            .into_iter()
            .map(reference_from_cdx)
            .collect(),
    }
}

fn reference_from_cdx(reference: CdxExternalReference) -> ExternalReference {
    let (category, comment) = split_category(reference.comment);
    let mut result = ExternalReference::new(reference.url, reference.ref_type);
    result.category = category;
    result.comment = comment;
    result.hashes = reference
        .hashes
        .into_iter()
        .map(|h| (h.alg, h.content))
        .collect();
    result
}

/// Undo [`join_category`].
fn split_category(comment: Option<String>) -> (Option<String>, Option<String>) {
    let Some(comment) = comment else {
        return (None, None);
    };
    match comment.strip_prefix(CATEGORY_PREFIX) {
        Some(rest) => match rest.split_once(CATEGORY_SEPARATOR) {
            Some((category, text)) => (Some(category.to_string()), Some(text.to_string())),
            None => (Some(rest.to_string()), None),
        },
        None => (None, Some(comment)),
    }
}

// ============================================================================
// Writing
// ============================================================================

pub(crate) fn document_to_bom(doc: &Document, config: &SerializerConfig) -> CdxBom {
    let spec_version = match (doc.format, doc.spec_version.as_deref()) {
        (SbomFormat::CycloneDx, Some(version)) => version.to_string(),
        _ => DEFAULT_CDX_VERSION.to_string(),
    };

    CdxBom {
        bom_format: Some(BOM_FORMAT.to_string()),
        spec_version: Some(spec_version),
        serial_number: serial_number(doc, config),
        version: doc.version.as_deref().and_then(|v| v.trim().parse().ok()),
        metadata: metadata_to_cdx(doc, config),
        components: doc.components.values().map(component_to_cdx).collect(),
        external_references: doc.external_references.iter().map(reference_to_cdx).collect(),
        dependencies: dependencies_to_cdx(doc),
    }
}

fn serial_number(doc: &Document, config: &SerializerConfig) -> Option<String> {
    if doc.uid.is_some() {
        return doc.uid.clone();
    }
    config
        .generate_serial_number
        .then(|| derived_serial_number(doc))
}

/// A `urn:uuid:` that depends only on the document name and component uids.
pub(crate) fn derived_serial_number(doc: &Document) -> String {
    let mut uids: Vec<&str> = doc.all_components().map(Component::uid).collect();
    uids.sort_unstable();

    let mut input = doc.name.clone().unwrap_or_default();
    for uid in uids {
        input.push('\n');
        input.push_str(uid);
    }

    let mut bytes = xxh3_128(input.as_bytes()).to_be_bytes();
    // RFC 9562 version 8 (custom), variant 10
    bytes[6] = (bytes[6] & 0x0f) | 0x80;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "urn:uuid:{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

fn metadata_to_cdx(doc: &Document, config: &SerializerConfig) -> Option<CdxMetadata> {
    let creation = doc.creation_data.as_ref();

    let mut tools: Vec<CdxTool> = creation
        .map(|c| c.tools.iter().map(tool_to_cdx).collect())
        .unwrap_or_default();
    if let Some(identity) = &config.tool {
        let listed = tools
            .iter()
            .any(|t| t.vendor.as_deref() == Some(identity.vendor.as_str()));
        if !listed {
            tools.push(tool_to_cdx(&identity.to_creation_tool()));
        }
    }

    let mut properties = Vec::new();
    if let Some(creation) = creation {
        if let Some(comment) = &creation.creator_comment {
            properties.push(CdxProperty {
                name: CREATOR_COMMENT_PROPERTY.to_string(),
                value: Some(comment.clone()),
            });
        }
        properties.extend(flatten_properties(&creation.properties));
    }

    let metadata = CdxMetadata {
        timestamp: creation.and_then(|c| c.created.clone()),
        tools: (!tools.is_empty()).then_some(CdxTools::List(tools)),
        authors: creation
            .map(|c| c.authors.iter().map(contact_to_cdx).collect())
            .unwrap_or_default(),
        component: doc
            .root_component
            .as_ref()
            .map(|root| Box::new(component_to_cdx(root))),
        manufacture: creation
            .and_then(|c| c.manufacture.as_ref())
            .map(organization_to_cdx),
        supplier: creation
            .and_then(|c| c.supplier.as_ref())
            .map(organization_to_cdx),
        licenses: doc
            .licenses
            .iter()
            .map(String::as_str)
            .map(license_to_cdx)
            .collect(),
        properties,
    };
    (!metadata.is_empty()).then_some(metadata)
}

fn component_to_cdx(component: &Component) -> CdxComponent {
    let core = component.core();
    let component_type = if component.is_file() {
        "file"
    } else {
        core.component_type
            .as_deref()
            .and_then(cdx_component_type)
            .unwrap_or("library")
    };

    let mut cpes = core.cpes.iter();
    let mut purls = core.purls.iter();
    let cpe = cpes.next().cloned();
    let purl = purls.next().cloned();

    let mut properties: Vec<CdxProperty> = Vec::new();
    properties.extend(cpes.map(|cpe| property(EXTRA_CPE_PROPERTY, cpe)));
    properties.extend(purls.map(|purl| property(EXTRA_PURL_PROPERTY, purl)));
    let description = core.description.as_ref();
    if let Some(summary) = description.and_then(|d| d.summary.as_deref()) {
        properties.push(property(SUMMARY_PROPERTY, summary));
    }
    properties.extend(flatten_properties(&core.properties));

    CdxComponent {
        component_type: Some(component_type.to_string()),
        mime_type: core.mime_type.clone(),
        bom_ref: Some(core.uid.clone()),
        supplier: core.supplier.as_ref().map(organization_to_cdx),
        author: core.author.clone(),
        publisher: core.publisher.clone(),
        group: core.group.clone(),
        name: core.name.clone(),
        version: core.version.clone(),
        description: description.and_then(|d| d.details.clone()),
        scope: core.scope.clone(),
        hashes: core
            .hashes
            .iter()
            .map(|(alg, content)| CdxHash {
                alg: cdx_algorithm(alg),
                content: content.clone(),
            })
            .collect(),
        licenses: core.licenses.all().into_iter().map(license_to_cdx).collect(),
        copyright: core.copyright.clone(),
        cpe,
        purl,
        external_references: core
            .external_references
            .iter()
            .map(reference_to_cdx)
            .collect(),
        properties,
        components: Vec::new(),
    }
}

fn license_to_cdx(license: &str) -> CdxLicenseChoice {
    match classify_license(license) {
        LicenseForm::SpdxId => CdxLicenseChoice {
            license: Some(CdxLicense {
                id: Some(license.trim().to_string()),
                ..CdxLicense::default()
            }),
            expression: None,
        },
        LicenseForm::Expression => CdxLicenseChoice {
            license: None,
            expression: Some(license.trim().to_string()),
        },
        LicenseForm::Name => CdxLicenseChoice {
            license: Some(CdxLicense {
                name: Some(license.to_string()),
                ..CdxLicense::default()
            }),
            expression: None,
        },
    }
}

fn property(name: &str, value: &str) -> CdxProperty {
    CdxProperty {
        name: name.to_string(),
        value: Some(value.to_string()),
    }
}

/// One `{name, value}` per value: CycloneDX properties are single-valued.
fn flatten_properties(
    bag: &BTreeMap<String, BTreeSet<String>>,
) -> impl Iterator<Item = CdxProperty> + '_ {
    bag.iter()
        .flat_map(|(name, values)| values.iter().map(move |value| property(name, value)))
}

fn contact_to_cdx(contact: &Contact) -> CdxContact {
    CdxContact {
        name: contact.name.clone(),
        email: contact.email.clone(),
        phone: contact.phone.clone(),
    }
}

fn organization_to_cdx(org: &Organization) -> CdxOrganization {
    CdxOrganization {
        name: org.name.clone(),
        url: org.url.iter().cloned().collect(),
        contact: org.contacts.iter().map(contact_to_cdx).collect(),
    }
}

fn tool_to_cdx(tool: &CreationTool) -> CdxTool {
    CdxTool {
        vendor: tool.vendor.clone(),
        name: tool.name.clone(),
        version: tool.version.clone(),
        hashes: tool
            .hashes
            .iter()
            .map(|(alg, content)| CdxHash {
                alg: cdx_algorithm(alg),
                content: content.clone(),
            })
            .collect(),
        external_references: tool.external_references.iter().map(reference_to_cdx).collect(),
    }
}

fn reference_to_cdx(reference: &ExternalReference) -> CdxExternalReference {
    CdxExternalReference {
        url: reference.url.clone(),
        ref_type: reference.ref_type.clone(),
        comment: join_category(reference.category.as_deref(), reference.comment.as_deref()),
        hashes: reference
            .hashes
            .iter()
            .map(|(alg, content)| CdxHash {
                alg: cdx_algorithm(alg),
                content: content.clone(),
            })
            .collect(),
    }
}

/// Fold the category into the comment, which is the only free-text slot.
fn join_category(category: Option<&str>, comment: Option<&str>) -> Option<String> {
    match (category, comment) {
        (Some(category), Some(comment)) => Some(format!(
            "{CATEGORY_PREFIX}{category}{CATEGORY_SEPARATOR}{comment}"
        )),
        (Some(category), None) => Some(format!("{CATEGORY_PREFIX}{category}")),
        (None, comment) => comment.map(str::to_string),
    }
}

/// One entry per source component. Edges from the SPDX document node are
/// carried by `metadata.component` instead.
fn dependencies_to_cdx(doc: &Document) -> Vec<CdxDependency> {
    doc.relationships
        .iter()
        .filter(|(source, _)| *source != SPDX_DOCUMENT_ID)
        .map(|(source, relationships)| {
            let targets: BTreeSet<&str> = relationships
                .iter()
                .map(|r| r.other_uid.as_str())
                .collect();
            CdxDependency {
                dependency_ref: source.to_string(),
                depends_on: targets.into_iter().map(str::to_string).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bom(value: serde_json::Value) -> CdxBom {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_uid_fallbacks() {
        let doc = document_from_bom(bom(json!({
            "bomFormat": "CycloneDX",
            "components": [
                {"type": "library", "bom-ref": "ref-a", "name": "a"},
                {"type": "library", "name": "b", "purl": "pkg:npm/b@2.0.0"},
                {"type": "library", "name": "c", "version": "3.0"},
                {"type": "library"}
            ]
        })))
        .unwrap();

        assert!(doc.component("ref-a").is_some());
        assert!(doc.component("pkg:npm/b@2.0.0").is_some());
        assert!(doc.component("c@3.0").is_some());
        assert_eq!(doc.components.len(), 3);
    }

    #[test]
    fn test_metadata_licenses_are_document_licenses() {
        let doc = document_from_bom(bom(json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.4",
            "metadata": {"licenses": [{"license": {"id": "MIT"}}]}
        })))
        .unwrap();
        assert!(doc.licenses.contains("MIT"));
        assert!(doc.creation_data.is_none());

        let written = document_to_bom(&doc, &SerializerConfig::without_tool_identity());
        let metadata = written.metadata.as_ref().unwrap();
        assert_eq!(metadata.licenses.len(), 1);
        assert_eq!(document_from_bom(written).unwrap(), doc);
    }

    #[test]
    fn test_nested_components_are_flattened() {
        let doc = document_from_bom(bom(json!({
            "bomFormat": "CycloneDX",
            "components": [{
                "type": "framework", "bom-ref": "outer", "name": "outer",
                "components": [{"type": "library", "bom-ref": "inner", "name": "inner"}]
            }]
        })))
        .unwrap();
        let uids: Vec<&str> = doc.components.keys().map(String::as_str).collect();
        assert_eq!(uids, vec!["outer", "inner"]);
    }

    #[test]
    fn test_file_type_builds_file_record() {
        let doc = document_from_bom(bom(json!({
            "bomFormat": "CycloneDX",
            "components": [{"type": "file", "bom-ref": "f", "name": "main.c"}]
        })))
        .unwrap();
        assert!(doc.components["f"].is_file());
    }

    #[test]
    fn test_license_id_preferred_over_name() {
        let choice = CdxLicenseChoice {
            license: Some(CdxLicense {
                id: Some("MIT".to_string()),
                name: Some("The MIT License".to_string()),
                url: None,
            }),
            expression: None,
        };
        assert_eq!(license_from_cdx(choice).as_deref(), Some("MIT"));
    }

    #[test]
    fn test_license_forms_on_write() {
        let id = serde_json::to_value(license_to_cdx("Apache-2.0")).unwrap();
        assert_eq!(id, json!({"license": {"id": "Apache-2.0"}}));
        let expr = serde_json::to_value(license_to_cdx("MIT OR Apache-2.0")).unwrap();
        assert_eq!(expr, json!({"expression": "MIT OR Apache-2.0"}));
        let name = serde_json::to_value(license_to_cdx("LicenseRef-acme")).unwrap();
        assert_eq!(name, json!({"license": {"name": "LicenseRef-acme"}}));
    }

    #[test]
    fn test_category_comment_encoding() {
        let joined = join_category(Some("SECURITY"), Some("advisory feed"));
        assert_eq!(joined.as_deref(), Some("Category: SECURITY | advisory feed"));
        assert_eq!(
            split_category(joined),
            (Some("SECURITY".to_string()), Some("advisory feed".to_string()))
        );
        assert_eq!(
            split_category(Some("plain".to_string())),
            (None, Some("plain".to_string()))
        );
    }

    #[test]
    fn test_derived_serial_number_is_stable_uuid() {
        let mut builder = Document::builder(SbomFormat::CycloneDx);
        builder.name("app");
        let mut package = PackageBuilder::new();
        package.uid("a").name("a");
        builder.add_component(package.build().unwrap());
        let doc = builder.build().unwrap();

        let first = derived_serial_number(&doc);
        assert_eq!(first, derived_serial_number(&doc.clone()));
        let uuid = first.strip_prefix("urn:uuid:").unwrap();
        let groups: Vec<&str> = uuid.split('-').collect();
        assert_eq!(groups.iter().map(|g| g.len()).collect::<Vec<_>>(), vec![8, 4, 4, 4, 12]);
        assert!(groups[2].starts_with('8'));
        assert!(matches!(groups[3].chars().next(), Some('8' | '9' | 'a' | 'b')));
    }

    #[test]
    fn test_tool_identity_deduplicated_by_vendor() {
        let mut builder = Document::builder(SbomFormat::CycloneDx);
        let mut data = CreationData::new();
        data.tools.insert(
            CreationTool::new("sbom-codec")
                .with_vendor("sbom-codec")
                .with_version("0.0.1"),
        );
        builder.creation_data(data);
        let doc = builder.build().unwrap();

        let bom = document_to_bom(&doc, &SerializerConfig::default());
        let Some(CdxTools::List(tools)) = bom.metadata.and_then(|m| m.tools) else {
            panic!("expected a tool list");
        };
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].version.as_deref(), Some("0.0.1"));
    }
}
