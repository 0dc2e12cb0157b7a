//! SPDX 2.3 JSON codec.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::{
    apply_creator, apply_external_ref, asserted, creator_lines, described_uids,
    external_document_ref, external_document_refs, external_ref_entries, format_organization,
    format_originator, parse_originator, parse_supplier, partition_components,
    promote_described_root, relationship_edges, spdx_algorithm, strip_version_prefix,
    version_string, RefEntry, DATA_LICENSE, NOASSERTION,
};
use crate::codec::one_or_many::{lenient_vec, OneOrMany};
use crate::codec::traits::{
    FormatConfidence, FormatDetection, SbomDeserializer, SbomSerializer, Schema,
    SerializationFormat,
};
use crate::config::SerializerConfig;
use crate::error::{Result, SbomCodecError};
use crate::model::{
    Component, ComponentFields, CreationData, Document, ExtractedLicense, FileBuilder,
    PackageBuilder, Relationship, SbomFormat, DESCRIBES, SPDX_DOCUMENT_ID,
};

static JSON_SPDX_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""spdxVersion"\s*:\s*"SPDX-([^"]+)""#).expect("static regex")
});

/// Reads and writes SPDX 2.3 JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxJsonCodec;

impl SpdxJsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl SbomDeserializer for SpdxJsonCodec {
    fn deserialize(&self, content: &str) -> Result<Document> {
        let raw: JsonDocument = serde_json::from_str(content)?;
        if raw.spdx_version.is_none() && raw.spdx_id.is_none() {
            return Err(SbomCodecError::missing_field("spdxVersion", "SPDX JSON document"));
        }
        let doc = document_from_json(raw)?;
        tracing::info!(
            components = doc.component_count(),
            relationships = doc.relationships.len(),
            "Deserialized SPDX JSON document"
        );
        Ok(doc)
    }

    fn schema(&self) -> Schema {
        Schema::Spdx23
    }

    fn format(&self) -> SerializationFormat {
        SerializationFormat::Json
    }

    fn detect(&self, content: &str) -> FormatDetection {
        if !content.trim_start().starts_with('{') {
            return FormatDetection::no_match();
        }
        let has_spdx_version = content.contains("\"spdxVersion\"");
        let has_spdx_id = content.contains("\"SPDXID\"");
        let has_data_license = content.contains("\"dataLicense\"");

        let mut detection = if has_spdx_version && has_spdx_id {
            FormatDetection::with_confidence(FormatConfidence::CERTAIN)
        } else if has_spdx_version || (has_spdx_id && has_data_license) {
            FormatDetection::with_confidence(FormatConfidence::HIGH)
        } else if has_spdx_id {
            FormatDetection::with_confidence(FormatConfidence::LOW)
                .warning("Missing spdxVersion field")
        } else {
            return FormatDetection::no_match();
        };
        if let Some(caps) = JSON_SPDX_VERSION.captures(content) {
            detection = detection.version(&caps[1]);
        }
        detection
    }
}

impl SbomSerializer for SpdxJsonCodec {
    fn serialize(&self, document: &Document, config: &SerializerConfig) -> Result<String> {
        let json = document_to_json(document, config);
        let text = if config.pretty {
            serde_json::to_string_pretty(&json)
        } else {
            serde_json::to_string(&json)
        }
        .map_err(|e| SbomCodecError::serialize("SPDX JSON", e.to_string()))?;

        tracing::info!(
            components = document.component_count(),
            relationships = document.relationships.len(),
            "Serialized SPDX JSON document"
        );
        Ok(text)
    }

    fn schema(&self) -> Schema {
        Schema::Spdx23
    }

    fn format(&self) -> SerializationFormat {
        SerializationFormat::Json
    }
}

// ============================================================================
// Reading
// ============================================================================

fn document_from_json(raw: JsonDocument) -> Result<Document> {
    let mut builder = Document::builder(SbomFormat::Spdx);
    if let Some(version) = &raw.spdx_version {
        builder.spec_version(strip_version_prefix(version));
    }
    if let Some(name) = raw.name {
        builder.name(name);
    }
    if let Some(namespace) = raw.document_namespace {
        builder.uid(namespace);
    }
    if let Some(comment) = raw.comment {
        builder.document_comment(comment);
    }
    if let Some(license) = raw.data_license.as_deref().and_then(asserted) {
        builder.license(license);
    }

    if let Some(info) = raw.creation_info {
        let mut data = CreationData::new();
        data.created = info.created;
        data.creator_comment = info.comment;
        for creator in &info.creators {
            apply_creator(&mut data, creator);
        }
        builder.creation_data(data);
        if let Some(version) = info.license_list_version {
            builder.license_list_version(version);
        }
    }

    for doc_ref in raw.external_document_refs {
        let checksum = doc_ref
            .checksum
            .as_ref()
            .map(|c| (c.algorithm.as_str(), c.checksum_value.as_str()));
        builder.external_reference(external_document_ref(
            &doc_ref.external_document_id,
            &doc_ref.spdx_document,
            checksum,
        ));
    }

    for info in raw.has_extracted_licensing_infos {
        let mut license = ExtractedLicense::new(info.license_id);
        license.name = info.name;
        license.text = info.extracted_text;
        license.comment = info.comment;
        license.cross_references = info.see_alsos.into_iter().collect();
        builder.extracted_license(license);
    }

    let package_count = raw.packages.len();
    for package in raw.packages {
        match package_from_json(package) {
            Ok(component) => {
                builder.add_component(component);
            }
            Err(e) => tracing::warn!("Skipping SPDX package: {}", e),
        }
    }
    let file_count = raw.files.len();
    for file in raw.files {
        match file_from_json(file) {
            Ok(component) => {
                builder.add_component(component);
            }
            Err(e) => tracing::warn!("Skipping SPDX file: {}", e),
        }
    }
    tracing::debug!(packages = package_count, files = file_count, "Read SPDX components");

    let first_described = raw.document_describes.first().cloned().or_else(|| {
        raw.relationships
            .iter()
            .find(|r| r.spdx_element_id == SPDX_DOCUMENT_ID && r.relationship_type == DESCRIBES)
            .map(|r| r.related_spdx_element.clone())
    });
    for rel in raw.relationships {
        let mut relationship = Relationship::new(rel.related_spdx_element, rel.relationship_type);
        relationship.comment = rel.comment;
        builder.add_relationship(rel.spdx_element_id, relationship);
    }
    for uid in raw.document_describes {
        builder.add_relationship(SPDX_DOCUMENT_ID, Relationship::new(uid, DESCRIBES));
    }
    promote_described_root(&mut builder, first_described.as_deref());

    builder.build()
}

fn add_licenses(values: Option<OneOrMany<String>>, mut add: impl FnMut(&str)) {
    for value in values.into_iter().flatten() {
        if let Some(license) = asserted(&value) {
            add(license);
        }
    }
}

fn package_from_json(pkg: JsonPackage) -> Result<Component> {
    let mut builder = PackageBuilder::new();
    builder.uid(pkg.spdx_id.unwrap_or_default());
    if let Some(name) = pkg.name {
        builder.name(name);
    }
    if let Some(version) = pkg.version_info {
        builder.version(version);
    }
    if let Some(purpose) = pkg.primary_package_purpose {
        builder.component_type(purpose.to_ascii_lowercase());
    }
    if let Some(supplier) = pkg.supplier.as_deref().and_then(parse_supplier) {
        builder.supplier(supplier);
    }
    if let Some(author) = pkg.originator.as_deref().and_then(parse_originator) {
        builder.author(author);
    }
    if let Some(copyright) = pkg.copyright_text.as_deref().and_then(asserted) {
        builder.copyright(copyright);
    }
    add_licenses(pkg.license_concluded, |l| {
        builder.concluded_license(l);
    });
    add_licenses(pkg.license_declared, |l| {
        builder.declared_license(l);
    });
    add_licenses(pkg.license_info_from_files, |l| {
        builder.info_from_files_license(l);
    });
    if let Some(comment) = pkg.license_comments {
        builder.license_comment(comment);
    }
    for checksum in pkg.checksums {
        builder.hash(checksum.algorithm, checksum.checksum_value);
    }
    for external_ref in pkg.external_refs {
        apply_external_ref(
            &mut builder,
            RefEntry {
                category: external_ref.reference_category,
                ref_type: external_ref.reference_type,
                locator: external_ref.reference_locator,
                comment: external_ref.comment,
            },
        );
    }
    if let Some(summary) = pkg.summary {
        builder.summary(summary);
    }
    if let Some(description) = pkg.description {
        builder.details(description);
    }
    if let Some(comment) = pkg.comment {
        builder.comment(comment);
    }
    if !pkg.attribution_texts.is_empty() {
        builder.attribution_text(pkg.attribution_texts.join("\n"));
    }

    if let Some(location) = pkg.download_location.as_deref().and_then(asserted) {
        builder.download_location(location);
    }
    if let Some(file_name) = pkg.package_file_name {
        builder.file_name(file_name);
    }
    if let Some(analyzed) = pkg.files_analyzed {
        builder.files_analyzed(analyzed);
    }
    if let Some(code) = pkg.package_verification_code {
        builder.verification_code(code.package_verification_code_value);
    }
    if let Some(home_page) = pkg.homepage.as_deref().and_then(asserted) {
        builder.home_page(home_page);
    }
    if let Some(source_info) = pkg.source_info {
        builder.source_info(source_info);
    }
    if let Some(date) = pkg.release_date {
        builder.release_date(date);
    }
    if let Some(date) = pkg.built_date {
        builder.built_date(date);
    }
    if let Some(date) = pkg.valid_until_date {
        builder.valid_until_date(date);
    }
    builder.build()
}

fn file_from_json(file: JsonFile) -> Result<Component> {
    let mut builder = FileBuilder::new();
    builder.uid(file.spdx_id.unwrap_or_default());
    if let Some(name) = file.file_name {
        builder.name(name);
    }
    let mut file_types = file.file_types.into_iter();
    if let Some(file_type) = file_types.next() {
        builder.component_type(file_type);
    }
    if file_types.len() > 0 {
        tracing::debug!("Keeping only the first of several fileTypes");
    }
    for checksum in file.checksums {
        builder.hash(checksum.algorithm, checksum.checksum_value);
    }
    add_licenses(file.license_concluded, |l| {
        builder.concluded_license(l);
    });
    add_licenses(file.license_declared, |l| {
        builder.declared_license(l);
    });
    add_licenses(file.license_info_in_files, |l| {
        builder.info_from_files_license(l);
    });
    if let Some(comment) = file.license_comments {
        builder.license_comment(comment);
    }
    if let Some(copyright) = file.copyright_text.as_deref().and_then(asserted) {
        builder.copyright(copyright);
    }
    if let Some(comment) = file.comment {
        builder.comment(comment);
    }
    if !file.attribution_texts.is_empty() {
        builder.attribution_text(file.attribution_texts.join("\n"));
    }
    if let Some(notice) = file.notice_text {
        builder.notice(notice);
    }
    for contributor in file.file_contributors {
        builder.contributor(contributor);
    }
    builder.build()
}

// ============================================================================
// Writing
// ============================================================================

fn document_to_json(doc: &Document, config: &SerializerConfig) -> JsonDocument {
    let creation = doc.creation_data.as_ref();
    let creators = creator_lines(creation, config);
    let creation_info = (!creators.is_empty()
        || creation.is_some()
        || doc.license_list_version.is_some())
    .then(|| JsonCreationInfo {
        created: creation.and_then(|c| c.created.clone()),
        creators,
        license_list_version: doc.license_list_version.clone(),
        comment: creation.and_then(|c| c.creator_comment.clone()),
    });

    let (packages, files) = partition_components(doc);

    JsonDocument {
        spdx_id: Some(SPDX_DOCUMENT_ID.to_string()),
        spdx_version: Some(version_string(doc)),
        name: doc.name.clone(),
        document_namespace: doc.uid.clone(),
        comment: doc.document_comment.clone(),
        data_license: Some(DATA_LICENSE.to_string()),
        external_document_refs: external_document_refs(doc)
            .map(|r| JsonExternalDocumentRef {
                external_document_id: r.ref_type.clone(),
                spdx_document: r.url.clone(),
                checksum: r.hashes.iter().next().map(|(alg, value)| JsonChecksum {
                    algorithm: spdx_algorithm(alg),
                    checksum_value: value.clone(),
                }),
            })
            .collect(),
        document_describes: described_uids(doc),
        creation_info,
        has_extracted_licensing_infos: doc
            .extracted_licenses
            .values()
            .map(|l| JsonExtractedLicense {
                license_id: l.id.clone(),
                extracted_text: l.text.clone(),
                name: l.name.clone(),
                see_alsos: l.cross_references.iter().cloned().collect(),
                comment: l.comment.clone(),
            })
            .collect(),
        packages: packages.into_iter().map(package_to_json).collect(),
        files: files.into_iter().map(file_to_json).collect(),
        relationships: relationship_edges(doc)
            .into_iter()
            .map(|(source, rel)| JsonRelationship {
                spdx_element_id: source,
                relationship_type: rel.relationship_type,
                related_spdx_element: rel.other_uid,
                comment: rel.comment,
            })
            .collect(),
    }
}

fn license_field<'a>(licenses: impl IntoIterator<Item = &'a String>) -> Option<OneOrMany<String>> {
    OneOrMany::from_vec(licenses.into_iter().cloned().collect())
}

fn checksums(component: &Component) -> Vec<JsonChecksum> {
    component
        .core()
        .hashes
        .iter()
        .map(|(alg, value)| JsonChecksum {
            algorithm: spdx_algorithm(alg),
            checksum_value: value.clone(),
        })
        .collect()
}

fn package_to_json(component: &Component) -> JsonPackage {
    let core = component.core();
    let extras = component.as_package();
    let description = core.description.as_ref();

    JsonPackage {
        spdx_id: Some(core.uid.clone()),
        name: core.name.clone(),
        version_info: core.version.clone(),
        package_file_name: extras.and_then(|p| p.file_name.clone()),
        supplier: core.supplier.as_ref().and_then(format_organization),
        originator: core.author.as_deref().map(format_originator),
        download_location: Some(
            extras
                .and_then(|p| p.download_location.clone())
                .unwrap_or_else(|| NOASSERTION.to_string()),
        ),
        files_analyzed: extras.and_then(|p| p.files_analyzed),
        package_verification_code: extras.and_then(|p| p.verification_code.clone()).map(
            |value| JsonVerificationCode {
                package_verification_code_value: value,
                package_verification_code_excluded_files: Vec::new(),
            },
        ),
        checksums: checksums(component),
        homepage: extras.and_then(|p| p.home_page.clone()),
        source_info: extras.and_then(|p| p.source_info.clone()),
        license_concluded: license_field(&core.licenses.concluded),
        license_declared: license_field(&core.licenses.declared),
        license_info_from_files: license_field(&core.licenses.info_from_files),
        license_comments: core.licenses.comment.clone(),
        copyright_text: Some(
            core.copyright
                .clone()
                .unwrap_or_else(|| NOASSERTION.to_string()),
        ),
        summary: description.and_then(|d| d.summary.clone()),
        description: description.and_then(|d| d.details.clone()),
        comment: core.comment.clone(),
        external_refs: external_ref_entries(core)
            .into_iter()
            .map(|entry| JsonExternalRef {
                reference_category: entry.category,
                reference_type: entry.ref_type,
                reference_locator: entry.locator,
                comment: entry.comment,
            })
            .collect(),
        attribution_texts: core.attribution_text.iter().cloned().collect(),
        primary_package_purpose: core.component_type.as_deref().map(str::to_uppercase),
        release_date: extras.and_then(|p| p.release_date.clone()),
        built_date: extras.and_then(|p| p.built_date.clone()),
        valid_until_date: extras.and_then(|p| p.valid_until_date.clone()),
    }
}

fn file_to_json(component: &Component) -> JsonFile {
    let core = component.core();
    let extras = component.as_file();
    JsonFile {
        spdx_id: Some(core.uid.clone()),
        file_name: core.name.clone(),
        file_types: core.component_type.iter().cloned().collect(),
        checksums: checksums(component),
        license_concluded: license_field(&core.licenses.concluded),
        license_declared: license_field(&core.licenses.declared),
        license_info_in_files: license_field(&core.licenses.info_from_files),
        license_comments: core.licenses.comment.clone(),
        copyright_text: Some(
            core.copyright
                .clone()
                .unwrap_or_else(|| NOASSERTION.to_string()),
        ),
        comment: core.comment.clone(),
        notice_text: extras.and_then(|f| f.notice.clone()),
        file_contributors: extras.map(|f| f.contributors.clone()).unwrap_or_default(),
        attribution_texts: core.attribution_text.iter().cloned().collect(),
    }
}

// ============================================================================
// SPDX JSON structures
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonDocument {
    #[serde(rename = "SPDXID", skip_serializing_if = "Option::is_none")]
    spdx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spdx_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_license: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    external_document_refs: Vec<JsonExternalDocumentRef>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    document_describes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creation_info: Option<JsonCreationInfo>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    has_extracted_licensing_infos: Vec<JsonExtractedLicense>,
    #[serde(default, deserialize_with = "lenient_vec")]
    packages: Vec<JsonPackage>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    files: Vec<JsonFile>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    relationships: Vec<JsonRelationship>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonCreationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    #[serde(default)]
    creators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_list_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonPackage {
    #[serde(rename = "SPDXID")]
    spdx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    package_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    originator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    files_analyzed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    package_verification_code: Option<JsonVerificationCode>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    checksums: Vec<JsonChecksum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_concluded: Option<OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_declared: Option<OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_info_from_files: Option<OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_comments: Option<String>,
    #[serde(alias = "copyright", skip_serializing_if = "Option::is_none")]
    copyright_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    external_refs: Vec<JsonExternalRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attribution_texts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_package_purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    built_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_until_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonFile {
    #[serde(rename = "SPDXID")]
    spdx_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    file_types: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    checksums: Vec<JsonChecksum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_concluded: Option<OneOrMany<String>>,
    /// Not an SPDX 2.3 file property; keeps licenses declared on a file
    /// (as CycloneDX file components carry them) across a round trip.
    #[serde(skip_serializing_if = "Option::is_none")]
    license_declared: Option<OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_info_in_files: Option<OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    copyright_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    file_contributors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attribution_texts: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonChecksum {
    algorithm: String,
    checksum_value: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonVerificationCode {
    package_verification_code_value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    package_verification_code_excluded_files: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonExternalRef {
    reference_category: String,
    reference_type: String,
    reference_locator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonRelationship {
    spdx_element_id: String,
    relationship_type: String,
    related_spdx_element: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonExternalDocumentRef {
    external_document_id: String,
    spdx_document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    checksum: Option<JsonChecksum>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonExtractedLicense {
    license_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    extracted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    see_alsos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentKind, DEPENDS_ON};

    const MINIMAL: &str = r#"{
        "SPDXID": "SPDXRef-DOCUMENT",
        "spdxVersion": "SPDX-2.3",
        "name": "demo",
        "dataLicense": "CC0-1.0",
        "documentNamespace": "https://example.com/demo",
        "creationInfo": {
            "created": "2024-01-01T00:00:00Z",
            "creators": ["Tool: scanner-1.2", "Person: Jane (jane@example.com)"]
        },
        "documentDescribes": ["SPDXRef-app"],
        "packages": [
            {
                "SPDXID": "SPDXRef-app",
                "name": "app",
                "versionInfo": "1.0",
                "downloadLocation": "NOASSERTION",
                "licenseConcluded": "MIT",
                "licenseDeclared": ["MIT", "Apache-2.0"],
                "externalRefs": [
                    {"referenceCategory": "PACKAGE-MANAGER", "referenceType": "purl",
                     "referenceLocator": "pkg:npm/app@1.0"}
                ]
            },
            {"SPDXID": "SPDXRef-lib", "name": "lib", "supplier": "Organization: Acme (a@acme.test)"},
            {"name": "no-id"}
        ],
        "files": [
            {"SPDXID": "SPDXRef-f1", "fileName": "./a.c", "fileTypes": ["SOURCE"],
             "fileContributors": ["Alice", "Bob"]}
        ],
        "relationships": [
            {"spdxElementId": "SPDXRef-DOCUMENT", "relationshipType": "DESCRIBES",
             "relatedSpdxElement": "SPDXRef-app"},
            {"spdxElementId": "SPDXRef-app", "relationshipType": "DEPENDS_ON",
             "relatedSpdxElement": "SPDXRef-lib"},
            {"spdxElementId": "SPDXRef-app"}
        ]
    }"#;

    #[test]
    fn test_deserialize_minimal_document() {
        let doc = SpdxJsonCodec.deserialize(MINIMAL).unwrap();

        assert_eq!(doc.spec_version.as_deref(), Some("2.3"));
        assert!(doc.licenses.contains("CC0-1.0"));
        let root = doc.root_component.as_ref().expect("described package is root");
        assert_eq!(root.uid(), "SPDXRef-app");
        assert_eq!(root.core().licenses.declared.len(), 2);
        assert!(root.core().purls.contains("pkg:npm/app@1.0"));
        assert!(root.as_package().unwrap().download_location.is_none());

        assert_eq!(doc.components.len(), 2, "package without SPDXID is skipped");
        let file = &doc.components["SPDXRef-f1"];
        assert_eq!(file.kind(), ComponentKind::File);
        assert_eq!(file.as_file().unwrap().contributors, vec!["Alice", "Bob"]);
        assert_eq!(
            doc.components["SPDXRef-lib"].core().supplier.as_ref().and_then(|s| s.primary_email()),
            Some("a@acme.test")
        );

        assert_eq!(doc.relationships.len(), 1);
        assert!(doc
            .relationships
            .get("SPDXRef-app")
            .unwrap()
            .contains(&Relationship::new("SPDXRef-lib", DEPENDS_ON)));

        let creation = doc.creation_data.as_ref().unwrap();
        assert_eq!(creation.tools.len(), 1);
        assert_eq!(creation.authors.len(), 1);
    }

    #[test]
    fn test_serialize_emits_sentinels_and_identifiers() {
        let mut package = PackageBuilder::new();
        package
            .uid("SPDXRef-x")
            .name("x")
            .cpe("cpe:2.3:a:acme:x:1:*:*:*:*:*:*:*")
            .purl("pkg:generic/x@1")
            .concluded_license("MIT");
        let mut builder = Document::builder(SbomFormat::Spdx);
        builder.add_component(package.build().unwrap());
        let doc = builder.build().unwrap();

        let config = SerializerConfig::without_tool_identity();
        let text = SpdxJsonCodec.serialize(&doc, &config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["spdxVersion"], "SPDX-2.3");
        assert_eq!(value["dataLicense"], "CC0-1.0");
        let pkg = &value["packages"][0];
        assert_eq!(pkg["downloadLocation"], NOASSERTION);
        assert_eq!(pkg["licenseConcluded"], "MIT");
        assert!(pkg.get("licenseDeclared").is_none());
        let refs = pkg["externalRefs"].as_array().unwrap();
        assert_eq!(refs[0]["referenceCategory"], "SECURITY");
        assert_eq!(refs[0]["referenceType"], "cpe23Type");
        assert_eq!(refs[1]["referenceCategory"], "PACKAGE-MANAGER");
        assert!(value.get("creationInfo").is_none());
    }

    #[test]
    fn test_rejects_non_spdx_json() {
        assert!(SpdxJsonCodec.deserialize(r#"{"bomFormat": "CycloneDX"}"#).is_err());
        assert!(SpdxJsonCodec.deserialize("[1, 2]").is_err());
        assert!(SpdxJsonCodec.deserialize("{ not json").is_err());
    }

    #[test]
    fn test_detect() {
        let detection = SpdxJsonCodec.detect(MINIMAL);
        assert_eq!(detection.confidence, FormatConfidence::CERTAIN);
        assert_eq!(detection.version.as_deref(), Some("2.3"));
        assert!(!SpdxJsonCodec.detect("SPDXVersion: SPDX-2.3").confidence.can_parse());
    }
}
