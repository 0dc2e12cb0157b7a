//! SPDX 2.3 tag-value reader.
//!
//! Parsing happens in three passes over the text:
//!
//! 1. The text is split into lines of `Tag: value`, keeping `<text>...</text>`
//!    values whole even when they span lines or contain blank lines.
//!    Single-line values are trimmed; the content of a `<text>` value is
//!    kept verbatim.
//! 2. `Relationship:` entries (with an optional `RelationshipComment:` right
//!    after them) are pulled out of the line stream wherever they appear.
//!    Lines inside a `<text>` value are never read as relationships.
//! 3. Lines are grouped by the `###` section markers. Text before the first
//!    marker is the header; `### Package: name` sections hold one package
//!    each; `### Unpackaged Files` and `### Extracted Licensing Info` hold
//!    blank-line separated records.
//!
//! Sections may appear in any order, and header-only tags such as `Creator:`
//! are picked up wherever they are found.

use regex::Regex;
use std::sync::LazyLock;

use super::{
    apply_creator, apply_external_ref, asserted, external_document_ref, parse_originator,
    parse_supplier, promote_described_root, strip_version_prefix, RefEntry,
};
use crate::codec::traits::{
    FormatConfidence, FormatDetection, SbomDeserializer, Schema, SerializationFormat,
};
use crate::error::{ParseErrorKind, Result, SbomCodecError};
use crate::model::{
    Component, ComponentFields, CreationData, Document, DocumentBuilder, ExtractedLicense,
    FileBuilder, PackageBuilder, Relationship, SbomFormat, DESCRIBES, SPDX_DOCUMENT_ID,
};

static RELATIONSHIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(\S+)\s+(\S+)").expect("static regex"));
static EXTERNAL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(\S+)\s+(.+)$").expect("static regex"));
static EXTERNAL_DOCUMENT_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(\S+)(?:\s+([^:\s]+):\s*(\S+))?\s*$").expect("static regex")
});
static VERSION_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*SPDXVersion:\s*SPDX-(\S+)").expect("static regex")
});

/// Tags that belong to the document header wherever they appear.
const HEADER_TAGS: &[&str] = &[
    "SPDXVersion",
    "DataLicense",
    "DocumentName",
    "DocumentNamespace",
    "LicenseListVersion",
    "Creator",
    "Created",
    "CreatorComment",
    "DocumentComment",
    "ExternalDocumentRef",
];

/// Reads and writes SPDX 2.3 tag-value documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpdxTagValueCodec;

impl SpdxTagValueCodec {
    pub fn new() -> Self {
        Self
    }
}

impl SbomDeserializer for SpdxTagValueCodec {
    fn deserialize(&self, content: &str) -> Result<Document> {
        if content.trim().is_empty() {
            return Err(SbomCodecError::unknown_format("empty tag-value input"));
        }
        let text = content.replace('\r', "");
        let lines = tokenize(&text);
        if !lines.iter().any(|l| matches!(l, Line::Entry(_))) {
            return Err(SbomCodecError::parse(
                "SPDX tag-value",
                ParseErrorKind::InvalidTagValue("no 'Tag: value' lines found".to_string()),
            ));
        }
        let (lines, relationships) = extract_relationships(lines);
        let sections = group_sections(lines);
        tracing::debug!(
            packages = sections.packages.len(),
            files = sections.files.len(),
            licenses = sections.licenses.len(),
            relationships = relationships.len(),
            "Split SPDX tag-value sections"
        );

        let mut builder = Document::builder(SbomFormat::Spdx);
        apply_header(&mut builder, sections.header);
        for block in sections.packages {
            match package_from_block(block) {
                Ok(component) => {
                    builder.add_component(component);
                }
                Err(e) => tracing::warn!("Skipping SPDX package block: {}", e),
            }
        }
        for block in sections.files {
            match file_from_block(block) {
                Ok(component) => {
                    builder.add_component(component);
                }
                Err(e) => tracing::warn!("Skipping SPDX file block: {}", e),
            }
        }
        for block in sections.licenses {
            match license_from_block(block) {
                Some(license) => {
                    builder.extracted_license(license);
                }
                None => tracing::warn!("Skipping extracted license block without LicenseID"),
            }
        }
        let first_described = relationships
            .iter()
            .find(|(source, rel)| source == SPDX_DOCUMENT_ID && rel.relationship_type == DESCRIBES)
            .map(|(_, rel)| rel.other_uid.clone());
        for (source, relationship) in relationships {
            builder.add_relationship(source, relationship);
        }
        promote_described_root(&mut builder, first_described.as_deref());

        let doc = builder.build()?;
        tracing::info!(
            components = doc.component_count(),
            relationships = doc.relationships.len(),
            "Deserialized SPDX tag-value document"
        );
        Ok(doc)
    }

    fn schema(&self) -> Schema {
        Schema::Spdx23
    }

    fn format(&self) -> SerializationFormat {
        SerializationFormat::TagValue
    }

    fn detect(&self, content: &str) -> FormatDetection {
        let trimmed = content.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('<') {
            return FormatDetection::no_match();
        }
        let has_spdx_id = content.contains("SPDXID:");
        let has_data_license = content.contains("DataLicense:");
        let mut detection = match VERSION_TAG.captures(content) {
            Some(caps) => {
                let confidence = if has_spdx_id && has_data_license {
                    FormatConfidence::CERTAIN
                } else {
                    FormatConfidence::HIGH
                };
                FormatDetection::with_confidence(confidence).version(&caps[1])
            }
            None if content.contains("SPDXVersion:") => {
                FormatDetection::with_confidence(FormatConfidence::HIGH)
            }
            None if has_spdx_id && has_data_license => {
                FormatDetection::with_confidence(FormatConfidence::LOW)
            }
            None => return FormatDetection::no_match(),
        };
        if !content.contains("##") {
            detection = detection.warning("No section markers; only header tags will be read");
        }
        detection
    }
}

// ============================================================================
// Pass 1: lines
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    tag: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Marker(String),
    Entry(Entry),
    Blank,
}

fn tokenize(text: &str) -> Vec<Line> {
    let mut out = Vec::new();
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            out.push(Line::Blank);
            continue;
        }
        if trimmed.starts_with('#') {
            if trimmed.starts_with("##") {
                out.push(Line::Marker(trimmed.trim_start_matches('#').trim().to_string()));
            }
            continue;
        }
        let Some((tag, value)) = line.split_once(':') else {
            tracing::debug!("Ignoring line without a tag: '{}'", trimmed);
            continue;
        };
        let tag = tag.trim();
        if tag.is_empty() || tag.contains(char::is_whitespace) {
            tracing::debug!("Ignoring line without a tag: '{}'", trimmed);
            continue;
        }
        let value = value.trim_start();
        let value = match value.strip_prefix("<text>") {
            Some(rest) => collect_text(rest, &mut lines),
            None => value.trim_end().to_string(),
        };
        out.push(Line::Entry(Entry {
            tag: tag.to_string(),
            value,
        }));
    }
    out
}

/// Gather a `<text>` value up to its closing tag, consuming the lines it spans.
fn collect_text<'a>(first: &'a str, lines: &mut impl Iterator<Item = &'a str>) -> String {
    if let Some(end) = first.find("</text>") {
        return first[..end].to_string();
    }
    let mut parts = vec![first];
    for line in lines.by_ref() {
        if let Some(end) = line.find("</text>") {
            parts.push(&line[..end]);
            return parts.join("\n");
        }
        parts.push(line);
    }
    tracing::warn!("Unterminated <text> value; reading to end of document");
    parts.join("\n")
}

// ============================================================================
// Pass 2: relationships
// ============================================================================

fn extract_relationships(lines: Vec<Line>) -> (Vec<Line>, Vec<(String, Relationship)>) {
    let mut remaining = Vec::with_capacity(lines.len());
    let mut relationships: Vec<(String, Relationship)> = Vec::new();
    let mut after_relationship = false;

    for line in lines {
        let entry = match line {
            Line::Entry(entry) => entry,
            other => {
                after_relationship = false;
                remaining.push(other);
                continue;
            }
        };
        match entry.tag.as_str() {
            "Relationship" => {
                after_relationship = false;
                match RELATIONSHIP.captures(&entry.value) {
                    Some(caps) => {
                        relationships
                            .push((caps[1].to_string(), Relationship::new(&caps[3], &caps[2])));
                        after_relationship = true;
                    }
                    None => tracing::warn!("Malformed Relationship '{}'", entry.value),
                }
            }
            "RelationshipComment" => {
                match relationships.last_mut().filter(|_| after_relationship) {
                    Some((_, relationship)) => relationship.comment = Some(entry.value),
                    None => tracing::debug!("RelationshipComment without a preceding Relationship"),
                }
                after_relationship = false;
            }
            _ => {
                after_relationship = false;
                remaining.push(Line::Entry(entry));
            }
        }
    }
    (remaining, relationships)
}

// ============================================================================
// Pass 3: sections
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Package,
    Files,
    Licenses,
    Other,
}

impl Section {
    fn from_marker(title: &str) -> Self {
        let title = title.to_ascii_lowercase();
        if title.starts_with("package") {
            Self::Package
        } else if title.starts_with("unpackaged file") || title.starts_with("file") {
            Self::Files
        } else if title.starts_with("extracted licens") {
            Self::Licenses
        } else {
            Self::Other
        }
    }

    /// Tags whose second appearance starts a new record.
    fn record_tags(self) -> &'static [&'static str] {
        match self {
            Self::Package => &["SPDXID", "PackageName"],
            Self::Files => &["SPDXID", "FileName"],
            Self::Licenses => &["LicenseID"],
            Self::Header | Self::Other => &[],
        }
    }
}

#[derive(Debug, Default)]
struct Sections {
    header: Vec<Entry>,
    packages: Vec<Vec<Entry>>,
    files: Vec<Vec<Entry>>,
    licenses: Vec<Vec<Entry>>,
}

impl Sections {
    fn flush(&mut self, section: Section, block: &mut Vec<Entry>) {
        if block.is_empty() {
            return;
        }
        let block = std::mem::take(block);
        match section {
            Section::Header => self.header.extend(block),
            Section::Package => self.packages.push(block),
            Section::Files => self.files.push(block),
            Section::Licenses => self.licenses.push(block),
            Section::Other => {
                tracing::debug!("Ignoring {} lines in an unsupported section", block.len());
            }
        }
    }
}

fn group_sections(lines: Vec<Line>) -> Sections {
    let mut sections = Sections::default();
    let mut current = Section::Header;
    let mut block = Vec::new();

    for line in lines {
        match line {
            Line::Marker(title) => {
                sections.flush(current, &mut block);
                current = Section::from_marker(&title);
            }
            Line::Blank => {
                if matches!(current, Section::Files | Section::Licenses) {
                    sections.flush(current, &mut block);
                }
            }
            Line::Entry(entry) => {
                if current != Section::Header && HEADER_TAGS.contains(&entry.tag.as_str()) {
                    sections.header.push(entry);
                    continue;
                }
                let starts_record = current.record_tags().contains(&entry.tag.as_str())
                    && block.iter().any(|e: &Entry| e.tag == entry.tag);
                if starts_record {
                    sections.flush(current, &mut block);
                }
                block.push(entry);
            }
        }
    }
    sections.flush(current, &mut block);

    if current == Section::Header
        && sections
            .header
            .iter()
            .any(|e| e.tag == "PackageName" || e.tag == "FileName")
    {
        tracing::warn!("Document has no '###' section markers; package and file tags are ignored");
    }
    sections
}

// ============================================================================
// Records
// ============================================================================

fn apply_header(builder: &mut DocumentBuilder, entries: Vec<Entry>) {
    let mut creation = CreationData::new();
    for Entry { tag, value } in entries {
        match tag.as_str() {
            "SPDXVersion" => {
                builder.spec_version(strip_version_prefix(&value));
            }
            "DataLicense" => {
                if let Some(license) = asserted(&value) {
                    builder.license(license);
                }
            }
            "SPDXID" => {}
            "DocumentName" => {
                builder.name(value);
            }
            "DocumentNamespace" => {
                builder.uid(value);
            }
            "LicenseListVersion" => {
                builder.license_list_version(value);
            }
            "Creator" => apply_creator(&mut creation, &value),
            "Created" => creation.created = Some(value),
            "CreatorComment" => creation.creator_comment = Some(value),
            "DocumentComment" => {
                builder.document_comment(value);
            }
            "ExternalDocumentRef" => match EXTERNAL_DOCUMENT_REF.captures(&value) {
                Some(caps) => {
                    let checksum = caps.get(3).zip(caps.get(4)).map(|(a, v)| (a.as_str(), v.as_str()));
                    builder.external_reference(external_document_ref(&caps[1], &caps[2], checksum));
                }
                None => tracing::warn!("Malformed ExternalDocumentRef '{}'", value),
            },
            other => tracing::debug!("Ignoring header tag '{}'", other),
        }
    }
    builder.creation_data(creation);
}

/// `ALG: VALUE`
fn split_checksum(value: &str) -> Option<(&str, &str)> {
    let (algorithm, digest) = value.split_once(':')?;
    let (algorithm, digest) = (algorithm.trim(), digest.trim());
    (!algorithm.is_empty() && !digest.is_empty()).then_some((algorithm, digest))
}

fn parse_external_ref(value: &str) -> Option<RefEntry> {
    let caps = EXTERNAL_REF.captures(value.trim())?;
    Some(RefEntry {
        category: caps[1].to_string(),
        ref_type: caps[2].to_string(),
        locator: caps[3].trim().to_string(),
        comment: None,
    })
}

fn package_from_block(block: Vec<Entry>) -> Result<Component> {
    let mut builder = PackageBuilder::new();
    let mut refs: Vec<RefEntry> = Vec::new();

    for Entry { tag, value } in block {
        match tag.as_str() {
            "SPDXID" => {
                builder.uid(value);
            }
            "PackageName" => {
                builder.name(value);
            }
            "PackageVersion" => {
                builder.version(value);
            }
            "PrimaryPackagePurpose" => {
                builder.component_type(value.to_ascii_lowercase());
            }
            "PackageSupplier" => {
                if let Some(supplier) = parse_supplier(&value) {
                    builder.supplier(supplier);
                }
            }
            "PackageOriginator" => {
                if let Some(author) = parse_originator(&value) {
                    builder.author(author);
                }
            }
            "PackageCopyrightText" => {
                if let Some(copyright) = asserted(&value) {
                    builder.copyright(copyright);
                }
            }
            "PackageLicenseConcluded" => {
                if let Some(license) = asserted(&value) {
                    builder.concluded_license(license);
                }
            }
            "PackageLicenseDeclared" => {
                if let Some(license) = asserted(&value) {
                    builder.declared_license(license);
                }
            }
            "PackageLicenseInfoFromFiles" => {
                if let Some(license) = asserted(&value) {
                    builder.info_from_files_license(license);
                }
            }
            "PackageLicenseComments" => {
                builder.license_comment(value);
            }
            "PackageChecksum" => match split_checksum(&value) {
                Some((algorithm, digest)) => {
                    builder.hash(algorithm, digest);
                }
                None => tracing::warn!("Malformed PackageChecksum '{}'", value),
            },
            "PackageSummary" => {
                builder.summary(value);
            }
            "PackageDescription" => {
                builder.details(value);
            }
            "PackageComment" => {
                builder.comment(value);
            }
            "PackageAttributionText" => {
                builder.attribution_text(value);
            }
            "PackageDownloadLocation" => {
                if let Some(location) = asserted(&value) {
                    builder.download_location(location);
                }
            }
            "PackageFileName" => {
                builder.file_name(value);
            }
            "FilesAnalyzed" => {
                builder.files_analyzed(value.trim().eq_ignore_ascii_case("true"));
            }
            "PackageVerificationCode" => {
                builder.verification_code(value);
            }
            "PackageHomePage" => {
                if let Some(home_page) = asserted(&value) {
                    builder.home_page(home_page);
                }
            }
            "PackageSourceInfo" => {
                builder.source_info(value);
            }
            "ReleaseDate" => {
                builder.release_date(value);
            }
            "BuiltDate" => {
                builder.built_date(value);
            }
            "ValidUntilDate" => {
                builder.valid_until_date(value);
            }
            "ExternalRef" => match parse_external_ref(&value) {
                Some(entry) => refs.push(entry),
                None => tracing::warn!("Malformed ExternalRef '{}'", value),
            },
            "ExternalRefComment" => match refs.last_mut() {
                Some(entry) => entry.comment = Some(value),
                None => tracing::debug!("ExternalRefComment without a preceding ExternalRef"),
            },
            other => tracing::debug!("Ignoring package tag '{}'", other),
        }
    }
    for entry in refs {
        apply_external_ref(&mut builder, entry);
    }
    builder.build()
}

fn file_from_block(block: Vec<Entry>) -> Result<Component> {
    let mut builder = FileBuilder::new();
    let mut has_type = false;

    for Entry { tag, value } in block {
        match tag.as_str() {
            "SPDXID" => {
                builder.uid(value);
            }
            "FileName" => {
                builder.name(value);
            }
            "FileType" if !has_type => {
                has_type = true;
                builder.component_type(value);
            }
            "FileType" => tracing::debug!("Keeping only the first FileType"),
            "FileChecksum" | "PackageChecksum" => match split_checksum(&value) {
                Some((algorithm, digest)) => {
                    builder.hash(algorithm, digest);
                }
                None => tracing::warn!("Malformed {} '{}'", tag, value),
            },
            "LicenseConcluded" => {
                if let Some(license) = asserted(&value) {
                    builder.concluded_license(license);
                }
            }
            "LicenseDeclared" => {
                if let Some(license) = asserted(&value) {
                    builder.declared_license(license);
                }
            }
            "LicenseInfoInFile" => {
                if let Some(license) = asserted(&value) {
                    builder.info_from_files_license(license);
                }
            }
            "LicenseComments" => {
                builder.license_comment(value);
            }
            "FileCopyrightText" => {
                if let Some(copyright) = asserted(&value) {
                    builder.copyright(copyright);
                }
            }
            "FileComment" => {
                builder.comment(value);
            }
            "FileNotice" => {
                builder.notice(value);
            }
            "FileContributor" => {
                builder.contributor(value);
            }
            "FileAttributionText" => {
                builder.attribution_text(value);
            }
            other => tracing::debug!("Ignoring file tag '{}'", other),
        }
    }
    builder.build()
}

fn license_from_block(block: Vec<Entry>) -> Option<ExtractedLicense> {
    let mut license: Option<ExtractedLicense> = None;
    let mut pending = Vec::new();
    for entry in block {
        if entry.tag == "LicenseID" {
            license = Some(ExtractedLicense::new(entry.value));
        } else {
            pending.push(entry);
        }
    }
    let mut license = license?;
    for Entry { tag, value } in pending {
        match tag.as_str() {
            "ExtractedText" => license.text = Some(value),
            "LicenseName" => license.name = Some(value),
            "LicenseCrossReference" => {
                license.cross_references.insert(value);
            }
            "LicenseComment" => license.comment = Some(value),
            other => tracing::debug!("Ignoring extracted license tag '{}'", other),
        }
    }
    Some(license)
}
