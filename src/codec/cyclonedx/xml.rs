//! CycloneDX 1.4 XML codec.
//!
//! Reading goes XML → node tree ([`crate::codec::xml_tree`]) → the typed
//! `Xml*` shapes below → the shared JSON-spelled schema → the model. Every
//! repeatable child is declared with `lenient_one_or_many`, so one
//! `<component>` and several decode the same way.
//!
//! Writing renders the shared schema with a `quick_xml::Writer`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use serde::Deserialize;
use std::fmt::Display;
use std::sync::LazyLock;

use super::mapping::{document_from_bom, document_to_bom};
use super::schema::{
    CdxBom, CdxComponent, CdxContact, CdxDependency, CdxExternalReference, CdxHash, CdxLicense,
    CdxLicenseChoice, CdxMetadata, CdxOrganization, CdxProperty, CdxTool, CdxTools,
};
use super::{BOM_FORMAT, DEFAULT_CDX_VERSION};
use crate::codec::one_or_many::{lenient_one_or_many, lenient_option};
use crate::codec::traits::{
    FormatConfidence, FormatDetection, SbomDeserializer, SbomSerializer, Schema,
    SerializationFormat,
};
use crate::codec::xml_tree;
use crate::config::SerializerConfig;
use crate::error::{ParseErrorKind, Result, SbomCodecError};
use crate::model::Document;

static XML_SPEC_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"cyclonedx\.org/schema/bom/(\d+(?:\.\d+)*)").expect("static regex")
});

/// Reads and writes CycloneDX 1.4 XML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycloneDxXmlCodec;

impl CycloneDxXmlCodec {
    pub fn new() -> Self {
        Self
    }
}

impl SbomDeserializer for CycloneDxXmlCodec {
    fn deserialize(&self, content: &str) -> Result<Document> {
        let (root, tree) = xml_tree::parse(content)?;
        if root != "bom" {
            return Err(SbomCodecError::parse(
                format!("XML root element <{root}>"),
                ParseErrorKind::UnknownFormat,
            ));
        }

        let xml: XmlBom = if tree.is_null() {
            XmlBom::default()
        } else {
            serde_json::from_value(tree).map_err(|e| {
                SbomCodecError::parse(
                    "CycloneDX XML document",
                    ParseErrorKind::InvalidXml(e.to_string()),
                )
            })?
        };

        let mut bom = CdxBom::from(xml);
        bom.spec_version = XML_SPEC_VERSION
            .captures(content)
            .map(|caps| caps[1].to_string());

        let doc = document_from_bom(bom)?;
        tracing::info!(
            components = doc.component_count(),
            relationships = doc.relationships.len(),
            "Deserialized CycloneDX XML document"
        );
        Ok(doc)
    }

    fn schema(&self) -> Schema {
        Schema::CycloneDx14
    }

    fn format(&self) -> SerializationFormat {
        SerializationFormat::Xml
    }

    fn detect(&self, content: &str) -> FormatDetection {
        let trimmed = content.trim_start_matches('\u{feff}').trim_start();
        if !trimmed.starts_with('<') {
            return FormatDetection::no_match();
        }
        let namespace = XML_SPEC_VERSION.captures(content);
        let has_bom = content.contains("<bom") || content.contains(":bom");

        let mut detection = match (namespace.is_some(), has_bom) {
            (true, true) => FormatDetection::with_confidence(FormatConfidence::CERTAIN),
            (true, false) => FormatDetection::with_confidence(FormatConfidence::MEDIUM),
            (false, true) => FormatDetection::with_confidence(FormatConfidence::LOW)
                .warning("No CycloneDX namespace on <bom>"),
            (false, false) => return FormatDetection::no_match(),
        };
        if let Some(caps) = namespace {
            detection = detection.version(&caps[1]);
        }
        detection
    }
}

impl SbomSerializer for CycloneDxXmlCodec {
    fn serialize(&self, document: &Document, config: &SerializerConfig) -> Result<String> {
        let bom = document_to_bom(document, config);
        let mut out = XmlOut::new(config.pretty);
        out.bom(&bom)?;
        let text = out.finish()?;

        tracing::info!(
            components = document.component_count(),
            relationships = document.relationships.len(),
            "Serialized CycloneDX XML document"
        );
        Ok(text)
    }

    fn schema(&self) -> Schema {
        Schema::CycloneDx14
    }

    fn format(&self) -> SerializationFormat {
        SerializationFormat::Xml
    }
}

// ============================================================================
// XML shapes
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct XmlBom {
    #[serde(rename = "@serialNumber")]
    serial_number: Option<String>,
    #[serde(rename = "@version")]
    version: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    metadata: Option<XmlMetadata>,
    #[serde(default, deserialize_with = "lenient_option")]
    components: Option<XmlComponents>,
    #[serde(rename = "externalReferences", default, deserialize_with = "lenient_option")]
    external_references: Option<XmlReferences>,
    #[serde(default, deserialize_with = "lenient_option")]
    dependencies: Option<XmlDependencies>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlMetadata {
    timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    tools: Option<XmlTools>,
    #[serde(default, deserialize_with = "lenient_option")]
    authors: Option<XmlAuthors>,
    #[serde(default, deserialize_with = "lenient_option")]
    component: Option<XmlComponent>,
    #[serde(default, deserialize_with = "lenient_option")]
    manufacture: Option<XmlOrganization>,
    #[serde(default, deserialize_with = "lenient_option")]
    supplier: Option<XmlOrganization>,
    #[serde(default, deserialize_with = "lenient_option")]
    licenses: Option<XmlLicenses>,
    #[serde(default, deserialize_with = "lenient_option")]
    properties: Option<XmlProperties>,
}

/// `<tools>`: `<tool>` children in 1.4, a `<components>` list from 1.5 on.
#[derive(Debug, Default, Deserialize)]
struct XmlTools {
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    tool: Vec<XmlTool>,
    #[serde(default, deserialize_with = "lenient_option")]
    components: Option<XmlComponents>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlTool {
    vendor: Option<String>,
    name: Option<String>,
    version: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    hashes: Option<XmlHashes>,
    #[serde(rename = "externalReferences", default, deserialize_with = "lenient_option")]
    external_references: Option<XmlReferences>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlAuthors {
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    author: Vec<XmlContact>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlContact {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlOrganization {
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    url: Vec<String>,
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    contact: Vec<XmlContact>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlComponents {
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    component: Vec<XmlComponent>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlComponent {
    #[serde(rename = "@type")]
    component_type: Option<String>,
    #[serde(rename = "@mime-type")]
    mime_type: Option<String>,
    #[serde(rename = "@bom-ref")]
    bom_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    supplier: Option<XmlOrganization>,
    author: Option<String>,
    publisher: Option<String>,
    group: Option<String>,
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    scope: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    hashes: Option<XmlHashes>,
    #[serde(default, deserialize_with = "lenient_option")]
    licenses: Option<XmlLicenses>,
    copyright: Option<String>,
    cpe: Option<String>,
    purl: Option<String>,
    #[serde(rename = "externalReferences", default, deserialize_with = "lenient_option")]
    external_references: Option<XmlReferences>,
    #[serde(default, deserialize_with = "lenient_option")]
    properties: Option<XmlProperties>,
    #[serde(default, deserialize_with = "lenient_option")]
    components: Option<XmlComponents>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlHashes {
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    hash: Vec<XmlHash>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlHash {
    #[serde(rename = "@alg")]
    alg: Option<String>,
    #[serde(rename = "$text")]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlLicenses {
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    license: Vec<XmlLicense>,
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    expression: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlLicense {
    id: Option<String>,
    name: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlReferences {
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    reference: Vec<XmlReference>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlReference {
    #[serde(rename = "@type")]
    ref_type: Option<String>,
    url: Option<String>,
    comment: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    hashes: Option<XmlHashes>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlProperties {
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    property: Vec<XmlProperty>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlProperty {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "$text")]
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlDependencies {
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    dependency: Vec<XmlDependency>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlDependency {
    #[serde(rename = "@ref")]
    dependency_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient_one_or_many")]
    dependency: Vec<XmlDependency>,
}

// ============================================================================
// XML shapes → schema
// ============================================================================

fn hashes(hashes: Option<XmlHashes>) -> Vec<CdxHash> {
    hashes
        .map(|h| h.hash)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|h| {
            Some(CdxHash {
                alg: h.alg?,
                content: h.content?,
            })
        })
        .collect()
}

fn licenses(licenses: Option<XmlLicenses>) -> Vec<CdxLicenseChoice> {
    let Some(licenses) = licenses else {
        return Vec::new();
    };
    let listed = licenses.license.into_iter().map(|l| CdxLicenseChoice {
        license: Some(CdxLicense {
            id: l.id,
            name: l.name,
            url: l.url,
        }),
        expression: None,
    });
    let expressions = licenses.expression.into_iter().map(|e| CdxLicenseChoice {
        license: None,
        expression: Some(e),
    });
    listed.chain(expressions).collect()
}

fn references(references: Option<XmlReferences>) -> Vec<CdxExternalReference> {
    references
        .map(|r| r.reference)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| {
            let Some(url) = r.url else {
                tracing::warn!("Skipping CycloneDX XML external reference without <url>");
                return None;
            };
            Some(CdxExternalReference {
                url,
                ref_type: r.ref_type.unwrap_or_else(|| "other".to_string()),
                comment: r.comment,
                hashes: hashes(r.hashes),
            })
        })
        .collect()
}

fn properties(properties: Option<XmlProperties>) -> Vec<CdxProperty> {
    properties
        .map(|p| p.property)
        .unwrap_or_default()
        .into_iter()
        .map(|p| CdxProperty {
            name: p.name,
            value: p.value,
        })
        .collect()
}

fn components(components: Option<XmlComponents>) -> Vec<CdxComponent> {
    components
        .map(|c| c.component)
        .unwrap_or_default()
        .into_iter()
        .map(CdxComponent::from)
        .collect()
}

impl From<XmlContact> for CdxContact {
    fn from(contact: XmlContact) -> Self {
        Self {
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
        }
    }
}

impl From<XmlOrganization> for CdxOrganization {
    fn from(org: XmlOrganization) -> Self {
        Self {
            name: org.name,
            url: org.url,
            contact: org.contact.into_iter().map(CdxContact::from).collect(),
        }
    }
}

impl From<XmlComponent> for CdxComponent {
    fn from(component: XmlComponent) -> Self {
        Self {
            component_type: component.component_type,
            mime_type: component.mime_type,
            bom_ref: component.bom_ref,
            supplier: component.supplier.map(CdxOrganization::from),
            author: component.author,
            publisher: component.publisher,
            group: component.group,
            name: component.name,
            version: component.version,
            description: component.description,
            scope: component.scope,
            hashes: hashes(component.hashes),
            licenses: licenses(component.licenses),
            copyright: component.copyright,
            cpe: component.cpe,
            purl: component.purl,
            external_references: references(component.external_references),
            properties: properties(component.properties),
            components: components(component.components),
        }
    }
}

impl From<XmlTools> for CdxTools {
    fn from(tools: XmlTools) -> Self {
        if tools.tool.is_empty() {
            if let Some(nested) = tools.components {
                return Self::Components {
                    components: components(Some(nested)),
                };
            }
        }
        Self::List(
            tools
                .tool
                .into_iter()
                .map(|t| CdxTool {
                    vendor: t.vendor,
                    name: t.name,
                    version: t.version,
                    hashes: hashes(t.hashes),
                    external_references: references(t.external_references),
                })
                .collect(),
        )
    }
}

impl From<XmlMetadata> for CdxMetadata {
    fn from(metadata: XmlMetadata) -> Self {
        Self {
            timestamp: metadata.timestamp,
            tools: metadata.tools.map(CdxTools::from),
            authors: metadata
                .authors
                .map(|a| a.author)
                .unwrap_or_default()
                .into_iter()
                .map(CdxContact::from)
                .collect(),
            component: metadata
                .component
                .map(|c| Box::new(CdxComponent::from(c))),
            manufacture: metadata.manufacture.map(CdxOrganization::from),
            supplier: metadata.supplier.map(CdxOrganization::from),
            licenses: licenses(metadata.licenses),
            properties: properties(metadata.properties),
        }
    }
}

impl From<XmlBom> for CdxBom {
    fn from(bom: XmlBom) -> Self {
        let dependencies = bom
            .dependencies
            .map(|d| d.dependency)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|d| {
                let Some(dependency_ref) = d.dependency_ref else {
                    tracing::warn!("Skipping CycloneDX XML dependency without a ref attribute");
                    return None;
                };
                Some(CdxDependency {
                    dependency_ref,
                    depends_on: d.dependency.into_iter().filter_map(|t| t.dependency_ref).collect(),
                })
            })
            .collect();

        Self {
            bom_format: Some(BOM_FORMAT.to_string()),
            spec_version: None,
            serial_number: bom.serial_number,
            version: bom.version.and_then(|v| v.trim().parse().ok()),
            metadata: bom.metadata.map(CdxMetadata::from),
            components: components(bom.components),
            external_references: references(bom.external_references),
            dependencies,
        }
    }
}

// ============================================================================
// Schema → XML
// ============================================================================

fn write_error(e: impl Display) -> SbomCodecError {
    SbomCodecError::serialize("CycloneDX XML", e.to_string())
}

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new(pretty: bool) -> Self {
        let writer = if pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        Self { writer }
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(write_error)
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(write_error)
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.event(Event::Start(element))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.event(Event::Empty(element))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attributes)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn opt(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => self.text(name, &[], value),
            None => Ok(()),
        }
    }

    fn bom(&mut self, bom: &CdxBom) -> Result<()> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let spec_version = bom.spec_version.as_deref().unwrap_or(DEFAULT_CDX_VERSION);
        let namespace = format!("http://cyclonedx.org/schema/bom/{spec_version}");
        let version = bom.version.map(|v| v.to_string());
        let mut attributes = vec![("xmlns", namespace.as_str())];
        if let Some(serial) = &bom.serial_number {
            attributes.push(("serialNumber", serial.as_str()));
        }
        if let Some(version) = &version {
            attributes.push(("version", version.as_str()));
        }
        self.start("bom", &attributes)?;

        if let Some(metadata) = &bom.metadata {
            self.metadata(metadata)?;
        }
        if !bom.components.is_empty() {
            self.start("components", &[])?;
            for component in &bom.components {
                self.component("component", component)?;
            }
            self.end("components")?;
        }
        self.references(&bom.external_references)?;
        if !bom.dependencies.is_empty() {
            self.start("dependencies", &[])?;
            for dependency in &bom.dependencies {
                let attributes = [("ref", dependency.dependency_ref.as_str())];
                if dependency.depends_on.is_empty() {
                    self.empty("dependency", &attributes)?;
                    continue;
                }
                self.start("dependency", &attributes)?;
                for target in &dependency.depends_on {
                    self.empty("dependency", &[("ref", target.as_str())])?;
                }
                self.end("dependency")?;
            }
            self.end("dependencies")?;
        }

        self.end("bom")
    }

    fn metadata(&mut self, metadata: &CdxMetadata) -> Result<()> {
        self.start("metadata", &[])?;
        self.opt("timestamp", metadata.timestamp.as_deref())?;
        match &metadata.tools {
            Some(CdxTools::List(tools)) if !tools.is_empty() => {
                self.start("tools", &[])?;
                for tool in tools {
                    self.start("tool", &[])?;
                    self.opt("vendor", tool.vendor.as_deref())?;
                    self.opt("name", tool.name.as_deref())?;
                    self.opt("version", tool.version.as_deref())?;
                    self.hashes(&tool.hashes)?;
                    self.references(&tool.external_references)?;
                    self.end("tool")?;
                }
                self.end("tools")?;
            }
            Some(CdxTools::Components { components }) if !components.is_empty() => {
                self.start("tools", &[])?;
                self.start("components", &[])?;
                for component in components {
                    self.component("component", component)?;
                }
                self.end("components")?;
                self.end("tools")?;
            }
            _ => {}
        }
        if !metadata.authors.is_empty() {
            self.start("authors", &[])?;
            for author in &metadata.authors {
                self.contact("author", author)?;
            }
            self.end("authors")?;
        }
        if let Some(component) = &metadata.component {
            self.component("component", component)?;
        }
        if let Some(org) = &metadata.manufacture {
            self.organization("manufacture", org)?;
        }
        if let Some(org) = &metadata.supplier {
            self.organization("supplier", org)?;
        }
        self.licenses(&metadata.licenses)?;
        self.properties(&metadata.properties)?;
        self.end("metadata")
    }

    fn component(&mut self, tag: &str, component: &CdxComponent) -> Result<()> {
        let mut attributes = Vec::new();
        if let Some(t) = &component.component_type {
            attributes.push(("type", t.as_str()));
        }
        if let Some(mime) = &component.mime_type {
            attributes.push(("mime-type", mime.as_str()));
        }
        if let Some(bom_ref) = &component.bom_ref {
            attributes.push(("bom-ref", bom_ref.as_str()));
        }
        self.start(tag, &attributes)?;

        if let Some(org) = &component.supplier {
            self.organization("supplier", org)?;
        }
        self.opt("author", component.author.as_deref())?;
        self.opt("publisher", component.publisher.as_deref())?;
        self.opt("group", component.group.as_deref())?;
        self.opt("name", component.name.as_deref())?;
        self.opt("version", component.version.as_deref())?;
        self.opt("description", component.description.as_deref())?;
        self.opt("scope", component.scope.as_deref())?;
        self.hashes(&component.hashes)?;
        self.licenses(&component.licenses)?;
        self.opt("copyright", component.copyright.as_deref())?;
        self.opt("cpe", component.cpe.as_deref())?;
        self.opt("purl", component.purl.as_deref())?;
        self.references(&component.external_references)?;
        self.properties(&component.properties)?;
        if !component.components.is_empty() {
            self.start("components", &[])?;
            for nested in &component.components {
                self.component("component", nested)?;
            }
            self.end("components")?;
        }

        self.end(tag)
    }

    fn contact(&mut self, tag: &str, contact: &CdxContact) -> Result<()> {
        self.start(tag, &[])?;
        self.opt("name", contact.name.as_deref())?;
        self.opt("email", contact.email.as_deref())?;
        self.opt("phone", contact.phone.as_deref())?;
        self.end(tag)
    }

    fn organization(&mut self, tag: &str, org: &CdxOrganization) -> Result<()> {
        self.start(tag, &[])?;
        self.opt("name", org.name.as_deref())?;
        for url in &org.url {
            self.text("url", &[], url)?;
        }
        for contact in &org.contact {
            self.contact("contact", contact)?;
        }
        self.end(tag)
    }

    fn hashes(&mut self, hashes: &[CdxHash]) -> Result<()> {
        if hashes.is_empty() {
            return Ok(());
        }
        self.start("hashes", &[])?;
        for hash in hashes {
            self.text("hash", &[("alg", hash.alg.as_str())], &hash.content)?;
        }
        self.end("hashes")
    }

    fn licenses(&mut self, licenses: &[CdxLicenseChoice]) -> Result<()> {
        if licenses.is_empty() {
            return Ok(());
        }
        self.start("licenses", &[])?;
        for choice in licenses {
            if let Some(license) = &choice.license {
                self.start("license", &[])?;
                self.opt("id", license.id.as_deref())?;
                self.opt("name", license.name.as_deref())?;
                self.opt("url", license.url.as_deref())?;
                self.end("license")?;
            }
            if let Some(expression) = &choice.expression {
                self.text("expression", &[], expression)?;
            }
        }
        self.end("licenses")
    }

    fn references(&mut self, references: &[CdxExternalReference]) -> Result<()> {
        if references.is_empty() {
            return Ok(());
        }
        self.start("externalReferences", &[])?;
        for reference in references {
            self.start("reference", &[("type", reference.ref_type.as_str())])?;
            self.text("url", &[], &reference.url)?;
            self.opt("comment", reference.comment.as_deref())?;
            self.hashes(&reference.hashes)?;
            self.end("reference")?;
        }
        self.end("externalReferences")
    }

    fn properties(&mut self, properties: &[CdxProperty]) -> Result<()> {
        if properties.is_empty() {
            return Ok(());
        }
        self.start("properties", &[])?;
        for property in properties {
            let attributes = [("name", property.name.as_str())];
            match property.value.as_deref() {
                Some(value) if !value.is_empty() => self.text("property", &attributes, value)?,
                _ => self.empty("property", &attributes)?,
            }
        }
        self.end("properties")
    }
}
