//! SPDX 2.3 tag-value writer.

use super::{
    creator_lines, external_document_refs, external_ref_entries, format_organization,
    format_originator, partition_components, relationship_edges, spdx_algorithm,
    version_string, SpdxTagValueCodec, DATA_LICENSE, NOASSERTION,
};
use crate::codec::traits::{SbomSerializer, Schema, SerializationFormat};
use crate::config::SerializerConfig;
use crate::error::Result;
use crate::model::{Component, Document, ExtractedLicense, SPDX_DOCUMENT_ID};

impl SbomSerializer for SpdxTagValueCodec {
    fn serialize(&self, document: &Document, config: &SerializerConfig) -> Result<String> {
        let mut out = TagValueWriter::default();
        write_header(&mut out, document, config);

        let (packages, files) = partition_components(document);
        for package in &packages {
            write_package(&mut out, package);
        }
        if !files.is_empty() {
            out.section("Unpackaged Files");
            for file in &files {
                write_file(&mut out, file);
            }
        }
        if !document.extracted_licenses.is_empty() {
            out.section("Extracted Licensing Info");
            for license in document.extracted_licenses.values() {
                write_extracted_license(&mut out, license);
            }
        }
        for (source, relationship) in relationship_edges(document) {
            out.tag(
                "Relationship",
                &format!(
                    "{} {} {}",
                    source, relationship.relationship_type, relationship.other_uid
                ),
            );
            out.opt("RelationshipComment", relationship.comment.as_deref());
        }

        tracing::info!(
            packages = packages.len(),
            files = files.len(),
            relationships = document.relationships.len(),
            "Serialized SPDX tag-value document"
        );
        Ok(out.finish())
    }

    fn schema(&self) -> Schema {
        Schema::Spdx23
    }

    fn format(&self) -> SerializationFormat {
        SerializationFormat::TagValue
    }
}

/// Line-oriented output buffer.
#[derive(Debug, Default)]
struct TagValueWriter {
    buf: String,
}

impl TagValueWriter {
    /// `Tag: value`, switching to `<text>` for values spanning lines or
    /// carrying surrounding whitespace, which a plain value would lose.
    fn tag(&mut self, tag: &str, value: &str) {
        if value.contains('\n') || value.trim() != value {
            self.text_tag(tag, value);
        } else {
            self.buf.push_str(tag);
            self.buf.push_str(": ");
            self.buf.push_str(value);
            self.buf.push('\n');
        }
    }

    /// `Tag: <text>value</text>`, whatever the value.
    fn text_tag(&mut self, tag: &str, value: &str) {
        self.buf.push_str(tag);
        self.buf.push_str(": <text>");
        self.buf.push_str(value);
        self.buf.push_str("</text>\n");
    }

    fn opt(&mut self, tag: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.tag(tag, value);
        }
    }

    fn each<'a>(&mut self, tag: &str, values: impl IntoIterator<Item = &'a String>) {
        for value in values {
            self.tag(tag, value);
        }
    }

    fn blank(&mut self) {
        self.buf.push('\n');
    }

    fn section(&mut self, title: &str) {
        self.buf.push_str("### ");
        self.buf.push_str(title);
        self.buf.push_str("\n\n");
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn write_header(out: &mut TagValueWriter, doc: &Document, config: &SerializerConfig) {
    out.tag("SPDXVersion", &version_string(doc));
    out.tag("DataLicense", DATA_LICENSE);
    out.tag("SPDXID", SPDX_DOCUMENT_ID);
    out.opt("DocumentName", doc.name.as_deref());
    out.opt("DocumentNamespace", doc.uid.as_deref());
    for reference in external_document_refs(doc) {
        let line = match reference.hashes.iter().next() {
            Some((algorithm, value)) => format!(
                "{} {} {}: {}",
                reference.ref_type,
                reference.url,
                spdx_algorithm(algorithm),
                value
            ),
            None => format!("{} {}", reference.ref_type, reference.url),
        };
        out.tag("ExternalDocumentRef", &line);
    }
    out.opt("DocumentComment", doc.document_comment.as_deref());
    out.opt("LicenseListVersion", doc.license_list_version.as_deref());

    let creation = doc.creation_data.as_ref();
    for creator in creator_lines(creation, config) {
        out.tag("Creator", &creator);
    }
    out.opt("Created", creation.and_then(|c| c.created.as_deref()));
    out.opt(
        "CreatorComment",
        creation.and_then(|c| c.creator_comment.as_deref()),
    );
    out.blank();
}

fn write_checksums(out: &mut TagValueWriter, tag: &str, component: &Component) {
    for (algorithm, value) in &component.core().hashes {
        out.tag(tag, &format!("{}: {}", spdx_algorithm(algorithm), value));
    }
}

fn write_package(out: &mut TagValueWriter, component: &Component) {
    let core = component.core();
    let extras = component.as_package();
    let description = core.description.as_ref();

    out.section(&format!("Package: {}", component.display_name()));
    out.tag("SPDXID", &core.uid);
    out.opt("PackageName", core.name.as_deref());
    out.opt("PackageVersion", core.version.as_deref());
    out.opt("PackageFileName", extras.and_then(|p| p.file_name.as_deref()));
    if let Some(supplier) = core.supplier.as_ref().and_then(format_organization) {
        out.tag("PackageSupplier", &supplier);
    }
    if let Some(author) = &core.author {
        out.tag("PackageOriginator", &format_originator(author));
    }
    out.tag(
        "PackageDownloadLocation",
        extras
            .and_then(|p| p.download_location.as_deref())
            .unwrap_or(NOASSERTION),
    );
    if let Some(analyzed) = extras.and_then(|p| p.files_analyzed) {
        out.tag("FilesAnalyzed", if analyzed { "true" } else { "false" });
    }
    out.opt(
        "PackageVerificationCode",
        extras.and_then(|p| p.verification_code.as_deref()),
    );
    write_checksums(out, "PackageChecksum", component);
    out.opt("PackageHomePage", extras.and_then(|p| p.home_page.as_deref()));
    out.opt("PackageSourceInfo", extras.and_then(|p| p.source_info.as_deref()));
    out.each("PackageLicenseConcluded", &core.licenses.concluded);
    out.each("PackageLicenseInfoFromFiles", &core.licenses.info_from_files);
    out.each("PackageLicenseDeclared", &core.licenses.declared);
    out.opt("PackageLicenseComments", core.licenses.comment.as_deref());
    out.tag(
        "PackageCopyrightText",
        core.copyright.as_deref().unwrap_or(NOASSERTION),
    );
    out.opt("PackageSummary", description.and_then(|d| d.summary.as_deref()));
    out.opt("PackageDescription", description.and_then(|d| d.details.as_deref()));
    out.opt("PackageComment", core.comment.as_deref());
    for entry in external_ref_entries(core) {
        out.tag(
            "ExternalRef",
            &format!("{} {} {}", entry.category, entry.ref_type, entry.locator),
        );
        out.opt("ExternalRefComment", entry.comment.as_deref());
    }
    out.opt("PackageAttributionText", core.attribution_text.as_deref());
    if let Some(purpose) = &core.component_type {
        out.tag("PrimaryPackagePurpose", &purpose.to_uppercase());
    }
    out.opt("ReleaseDate", extras.and_then(|p| p.release_date.as_deref()));
    out.opt("BuiltDate", extras.and_then(|p| p.built_date.as_deref()));
    out.opt("ValidUntilDate", extras.and_then(|p| p.valid_until_date.as_deref()));
    out.blank();
}

fn write_file(out: &mut TagValueWriter, component: &Component) {
    let core = component.core();
    let extras = component.as_file();

    out.tag("SPDXID", &core.uid);
    out.opt("FileName", core.name.as_deref());
    out.opt("FileType", core.component_type.as_deref());
    write_checksums(out, "FileChecksum", component);
    out.each("LicenseConcluded", &core.licenses.concluded);
    out.each("LicenseDeclared", &core.licenses.declared);
    out.each("LicenseInfoInFile", &core.licenses.info_from_files);
    out.opt("LicenseComments", core.licenses.comment.as_deref());
    out.tag(
        "FileCopyrightText",
        core.copyright.as_deref().unwrap_or(NOASSERTION),
    );
    out.opt("FileComment", core.comment.as_deref());
    out.opt("FileNotice", extras.and_then(|f| f.notice.as_deref()));
    if let Some(file) = extras {
        out.each("FileContributor", &file.contributors);
    }
    out.opt("FileAttributionText", core.attribution_text.as_deref());
    out.blank();
}

fn write_extracted_license(out: &mut TagValueWriter, license: &ExtractedLicense) {
    out.tag("LicenseID", &license.id);
    if let Some(text) = &license.text {
        out.text_tag("ExtractedText", text);
    }
    out.opt("LicenseName", license.name.as_deref());
    out.each("LicenseCrossReference", &license.cross_references);
    out.opt("LicenseComment", license.comment.as_deref());
    out.blank();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::traits::SbomDeserializer;
    use crate::model::{
        ComponentFields, CreationData, FileBuilder, PackageBuilder, Relationship, SbomFormat,
        DEPENDS_ON,
    };

    fn sample() -> Document {
        let mut foo = PackageBuilder::new();
        foo.uid("SPDXRef-foo").name("foo").version("1.0");
        let mut bar = PackageBuilder::new();
        bar.uid("SPDXRef-bar").name("bar").declared_license("MIT");
        let mut file = FileBuilder::new();
        file.uid("SPDXRef-file").name("./README").contributor("Alice");

        let mut creation = CreationData::new();
        creation.created = Some("2024-05-01T12:00:00Z".to_string());

        let mut builder = Document::builder(SbomFormat::Spdx);
        builder
            .spec_version("2.3")
            .name("sample")
            .uid("https://example.com/sample")
            .license("CC0-1.0")
            .creation_data(creation);
        builder.add_component(foo.build().unwrap());
        builder.add_component(bar.build().unwrap());
        builder.add_component(file.build().unwrap());
        builder.add_relationship("SPDXRef-foo", Relationship::new("SPDXRef-bar", DEPENDS_ON));
        builder.build().unwrap()
    }

    #[test]
    fn test_header_snapshot() {
        let config = SerializerConfig::without_tool_identity();
        let text = SpdxTagValueCodec.serialize(&sample(), &config).unwrap();
        let header = text.split("### ").next().unwrap().trim_end();
        insta::assert_snapshot!(header, @r"
        SPDXVersion: SPDX-2.3
        DataLicense: CC0-1.0
        SPDXID: SPDXRef-DOCUMENT
        DocumentName: sample
        DocumentNamespace: https://example.com/sample
        Created: 2024-05-01T12:00:00Z
        ");
    }

    #[test]
    fn test_package_block_layout() {
        let config = SerializerConfig::without_tool_identity();
        let text = SpdxTagValueCodec.serialize(&sample(), &config).unwrap();

        assert!(text.contains(
            "### Package: foo\n\nSPDXID: SPDXRef-foo\nPackageName: foo\nPackageVersion: 1.0\n"
        ));
        assert!(text.contains("PackageDownloadLocation: NOASSERTION\n"));
        assert!(text.contains("### Unpackaged Files\n\nSPDXID: SPDXRef-file\nFileName: ./README\n"));
        assert!(text.contains("FileContributor: Alice\n"));
        assert!(text.ends_with("Relationship: SPDXRef-foo DEPENDS_ON SPDXRef-bar\n"));
    }

    #[test]
    fn test_written_document_reads_back_equal() {
        let doc = sample();
        let config = SerializerConfig::without_tool_identity();
        let text = SpdxTagValueCodec.serialize(&doc, &config).unwrap();
        let back = SpdxTagValueCodec.deserialize(&text).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_multiline_values_use_text_blocks() {
        let mut package = PackageBuilder::new();
        package.uid("SPDXRef-x").name("x").comment("line one\nline two");
        let mut builder = Document::builder(SbomFormat::Spdx);
        builder.add_component(package.build().unwrap());
        let doc = builder.build().unwrap();

        let text = SpdxTagValueCodec
            .serialize(&doc, &SerializerConfig::without_tool_identity())
            .unwrap();
        assert!(text.contains("PackageComment: <text>line one\nline two</text>\n"));
    }

    #[test]
    fn test_comment_that_looks_like_a_relationship_reads_back() {
        let mut package = PackageBuilder::new();
        package
            .uid("SPDXRef-x")
            .name("x")
            .comment("notes:\nRelationship: SPDXRef-x DEPENDS_ON SPDXRef-y")
            .attribution_text("  indented ");
        let mut builder = Document::builder(SbomFormat::Spdx);
        builder.add_component(package.build().unwrap());
        let doc = builder.build().unwrap();

        let text = SpdxTagValueCodec
            .serialize(&doc, &SerializerConfig::without_tool_identity())
            .unwrap();
        assert!(text.contains("PackageAttributionText: <text>  indented </text>\n"));
        let back = SpdxTagValueCodec.deserialize(&text).unwrap();
        assert_eq!(back.component_count(), 1);
        assert_eq!(back.components, doc.components);
    }

    #[test]
    fn test_file_declared_license_is_written() {
        let mut file = FileBuilder::new();
        file.uid("SPDXRef-f").name("./f.c").declared_license("MIT");
        let mut builder = Document::builder(SbomFormat::Spdx);
        builder.add_component(file.build().unwrap());
        let doc = builder.build().unwrap();

        let text = SpdxTagValueCodec
            .serialize(&doc, &SerializerConfig::without_tool_identity())
            .unwrap();
        assert!(text.contains("LicenseDeclared: MIT\n"));
        let back = SpdxTagValueCodec.deserialize(&text).unwrap();
        assert!(back.component("SPDXRef-f").unwrap().core().licenses.declared.contains("MIT"));
    }
}
