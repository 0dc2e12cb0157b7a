//! Throughput of every codec on synthetic documents.
//!
//! Run with: cargo bench --bench codec_benchmark

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sbom_codec::codec::{deserializer_for, serializer_for, SbomDeserializer, SbomSerializer};
use sbom_codec::model::{
    ComponentFields, Document, PackageBuilder, Relationship, SbomFormat, DEPENDS_ON,
};
use sbom_codec::{Schema, SerializationFormat, SerializerConfig};
use std::hint::black_box;

const CODECS: [(Schema, SerializationFormat, &str); 4] = [
    (Schema::Spdx23, SerializationFormat::Json, "spdx_json"),
    (Schema::Spdx23, SerializationFormat::TagValue, "spdx_tag_value"),
    (Schema::CycloneDx14, SerializationFormat::Json, "cdx_json"),
    (Schema::CycloneDx14, SerializationFormat::Xml, "cdx_xml"),
];

/// Generate a document with `count` packages in a dependency chain.
fn generate_document(count: usize) -> Document {
    let mut builder = Document::builder(SbomFormat::Spdx);
    builder.spec_version("2.3").name("bench").uid("https://example.com/bench");

    for i in 0..count {
        let name = format!("component-{i}");
        let version = format!("1.{}.{}", i % 10, i % 100);
        let mut package = PackageBuilder::new();
        package
            .uid(format!("SPDXRef-{i}"))
            .name(name.as_str())
            .version(version.as_str())
            .declared_license(if i % 3 == 0 { "MIT" } else { "Apache-2.0" })
            .hash("SHA256", format!("{i:064x}"))
            .purl(format!("pkg:npm/{name}@{version}"));
        package.download_location(format!("https://registry.example.com/{name}.tgz"));
        builder.add_component(package.build().expect("uid set"));
        if i > 0 {
            builder.add_relationship(
                format!("SPDXRef-{}", i - 1),
                Relationship::new(format!("SPDXRef-{i}"), DEPENDS_ON),
            );
        }
    }

    builder.build().expect("valid document")
}

fn bench_serialize(c: &mut Criterion) {
    let doc = generate_document(1000);
    let config = SerializerConfig::default();
    let mut group = c.benchmark_group("serialize_1k");

    for (schema, format, label) in CODECS {
        let serializer = serializer_for(schema, format).expect("supported pair");
        group.bench_function(label, |b| {
            b.iter(|| black_box(serializer.serialize(black_box(&doc), &config)))
        });
    }
    group.finish();
}

fn bench_deserialize(c: &mut Criterion) {
    let doc = generate_document(1000);
    let config = SerializerConfig::default();
    let mut group = c.benchmark_group("deserialize_1k");

    for (schema, format, label) in CODECS {
        let text = serializer_for(schema, format)
            .and_then(|s| s.serialize(&doc, &config))
            .expect("serializable");
        let deserializer = deserializer_for(schema, format).expect("supported pair");
        group.bench_function(label, |b| {
            b.iter(|| black_box(deserializer.deserialize(black_box(&text))))
        });
    }
    group.finish();
}

fn bench_tag_value_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_value_scaling");
    let config = SerializerConfig::default();
    let codec = deserializer_for(Schema::Spdx23, SerializationFormat::TagValue)
        .expect("supported pair");
    let writer = serializer_for(Schema::Spdx23, SerializationFormat::TagValue)
        .expect("supported pair");

    for size in &[100, 1000, 5000] {
        let text = writer
            .serialize(&generate_document(*size), &config)
            .expect("serializable");
        group.bench_with_input(BenchmarkId::new("parse", size), &text, |b, text| {
            b.iter(|| black_box(codec.deserialize(black_box(text))))
        });
    }
    group.finish();
}

fn bench_detection(c: &mut Criterion) {
    let doc = generate_document(1000);
    let config = SerializerConfig::default();
    let texts: Vec<(&str, String)> = CODECS
        .iter()
        .map(|(schema, format, label)| {
            let text = serializer_for(*schema, *format)
                .and_then(|s| s.serialize(&doc, &config))
                .expect("serializable");
            (*label, text)
        })
        .collect();

    let mut group = c.benchmark_group("detect_1k");
    for (label, text) in &texts {
        group.bench_function(*label, |b| {
            b.iter(|| black_box(sbom_codec::detect_format(black_box(text))))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_serialize,
    bench_deserialize,
    bench_tag_value_scaling,
    bench_detection
);
criterion_main!(benches);
