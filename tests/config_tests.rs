//! Configuration files driving serializer output.

use sbom_codec::config::{load_config_file, load_or_default, ConfigFileError};
use sbom_codec::model::{ComponentFields, Document, PackageBuilder, SbomFormat};
use sbom_codec::{Schema, SerializationFormat, SerializerConfig};
use serde_json::Value;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, yaml: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, yaml).unwrap();
    path
}

fn sample() -> Document {
    let mut builder = Document::builder(SbomFormat::Spdx);
    builder.name("configured");
    let mut package = PackageBuilder::new();
    package.uid("SPDXRef-a").name("a");
    builder.add_component(package.build().unwrap());
    builder.build().unwrap()
}

#[test]
fn test_tool_identity_from_yaml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        ".sbom-codec.yaml",
        "tool:\n  vendor: Acme\n  name: acme-sbom\n  version: 2.1.0\n",
    );
    let config = load_config_file(&path).unwrap();

    let text = sbom_codec::serialize(
        &sample(),
        Schema::Spdx23,
        SerializationFormat::TagValue,
        &config,
    )
    .unwrap();
    assert!(text.contains("Creator: Tool: acme-sbom-2.1.0\n"));
    assert!(!text.contains("sbom-codec"));

    let json = sbom_codec::serialize(
        &sample(),
        Schema::CycloneDx14,
        SerializationFormat::Json,
        &config,
    )
    .unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["metadata"]["tools"][0]["vendor"], "Acme");
}

#[test]
fn test_compact_output_and_serial_number() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "config.yml",
        "tool: null\npretty: false\ngenerate_serial_number: true\n",
    );
    let config = load_config_file(&path).unwrap();

    let json = sbom_codec::serialize(
        &sample(),
        Schema::CycloneDx14,
        SerializationFormat::Json,
        &config,
    )
    .unwrap();
    assert!(!json.contains('\n'));
    let value: Value = serde_json::from_str(&json).unwrap();
    let serial = value["serialNumber"].as_str().unwrap();
    assert!(serial.starts_with("urn:uuid:"));

    // Same document, same serial number.
    let again = sbom_codec::serialize(
        &sample(),
        Schema::CycloneDx14,
        SerializationFormat::Json,
        &config,
    )
    .unwrap();
    assert_eq!(json, again);
}

#[test]
fn test_invalid_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "broken.yaml", "tool:\n  vendor: ''\n  name: ''\n");

    assert!(matches!(
        load_config_file(&path),
        Err(ConfigFileError::Invalid(ref errors)) if errors.len() == 2
    ));
    let (config, used) = load_or_default(Some(&path));
    assert_eq!(config, SerializerConfig::default());
    assert!(used.is_none());
}

#[test]
fn test_unparseable_file_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.yaml", "pretty: [not, a, bool\n");
    let err = load_config_file(&path).unwrap_err();
    assert!(matches!(err, ConfigFileError::Parse(_)));

    let codec_err: sbom_codec::SbomCodecError = err.into();
    assert!(codec_err.to_string().starts_with("Invalid configuration"));
}

#[test]
fn test_explicit_path_is_used() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "custom.yaml", "pretty: false\n");
    let (config, used) = load_or_default(Some(&path));
    assert!(!config.pretty);
    assert_eq!(used, Some(path));
}
