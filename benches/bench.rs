//! Criterion benchmarks for Glaive.
//!
//! This module contains benchmarks for the hot paths of the document model:
//! - Document mutation through the field check contract
//! - Contextualized writes
//! - Partial-update accumulation with duplicate suppression
//! - Parallel document minting from one shared factory

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use glaive::document::Value;
use glaive::schema::{DocumentFactory, FieldDescriptorBuilder, ValueType};
use glaive::update::Update;
use rayon::prelude::*;
use std::hint::black_box;

/// Build the schema shared by every benchmark.
fn create_factory() -> DocumentFactory {
    let builder = FieldDescriptorBuilder::new();
    DocumentFactory::builder("Asset")
        .set_updatable(true)
        .add_field(builder.build_text_field("title").unwrap())
        .unwrap()
        .add_field(builder.build_multivalued_text_field("tags").unwrap())
        .unwrap()
        .add_field(
            builder
                .build_multivalued_numeric_field("category", ValueType::Long)
                .unwrap(),
        )
        .unwrap()
        .add_field(builder.build_numeric_field("price", ValueType::Double).unwrap())
        .unwrap()
        .build()
        .unwrap()
}

/// Generate tag values for benchmarking.
fn generate_tags(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("tag_{}", i % 50)).collect()
}

/// Benchmark validated document writes.
fn bench_document_mutation(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_mutation");
    let factory = create_factory();
    let tags = generate_tags(100);

    group.bench_function("set_scalar_values", |b| {
        b.iter(|| {
            let mut doc = factory.create_doc("1");
            doc.set_value("title", black_box("Dune")).unwrap();
            doc.set_value("price", black_box(9.99_f64)).unwrap();
            black_box(doc)
        })
    });

    group.throughput(Throughput::Elements(tags.len() as u64));
    group.bench_function("add_multi_values", |b| {
        b.iter(|| {
            let mut doc = factory.create_doc("1");
            for tag in &tags {
                doc.add_value("tags", black_box(tag.as_str())).unwrap();
            }
            black_box(doc)
        })
    });

    group.bench_function("set_collection", |b| {
        b.iter(|| {
            let mut doc = factory.create_doc("1");
            doc.set_values("category", black_box(0_i64..100)).unwrap();
            black_box(doc)
        })
    });

    group.bench_function("rejected_write", |b| {
        let mut doc = factory.create_doc("1");
        b.iter(|| black_box(doc.set_value("price", black_box("cheap")).is_err()))
    });

    group.finish();
}

/// Benchmark writes spread over several contexts.
fn bench_contextualized_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("contextualized_writes");
    let factory = create_factory();
    let contexts: Vec<String> = (0..16).map(|i| format!("ctx_{}", i)).collect();

    group.throughput(Throughput::Elements(contexts.len() as u64));
    group.bench_function("set_per_context", |b| {
        b.iter(|| {
            let mut doc = factory.create_doc("1");
            for context in &contexts {
                doc.set_contextualized_value("title", Some(context.as_str()), "value")
                    .unwrap();
            }
            black_box(doc.get_field_contexts("title").unwrap().len())
        })
    });

    group.finish();
}

/// Benchmark partial-update accumulation.
fn bench_update_accumulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_accumulation");
    let factory = create_factory();
    let title = factory.get_field("title").cloned().unwrap();
    let tags = factory.get_field("tags").cloned().unwrap();
    let values = generate_tags(100);

    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("distinct_operations", |b| {
        b.iter(|| {
            let mut update = Update::new("1");
            for value in &values {
                update.add(&tags, black_box(value.as_str())).unwrap();
            }
            black_box(update)
        })
    });

    // Generated tags repeat, so most calls hit the duplicate check.
    group.bench_function("duplicate_operations", |b| {
        b.iter(|| {
            let mut update = Update::new("1");
            for value in values.iter().chain(values.iter()) {
                update.set(&title, black_box(value.as_str())).unwrap();
            }
            black_box(update)
        })
    });

    group.bench_function("field_delete", |b| {
        b.iter(|| {
            let mut update = Update::new("1");
            update.set(&title, black_box(Value::Null)).unwrap();
            black_box(update)
        })
    });

    group.finish();
}

/// Benchmark document minting from one factory across threads.
fn bench_parallel_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_operations");
    let factory = create_factory();

    group.throughput(Throughput::Elements(1000));
    group.bench_function("parallel_document_creation", |b| {
        b.iter(|| {
            let docs: Vec<_> = (0..1000)
                .into_par_iter()
                .map(|i| {
                    let mut doc = factory.create_doc(i.to_string());
                    doc.set_value("title", "parallel").unwrap();
                    doc
                })
                .collect();
            black_box(docs)
        })
    });

    group.bench_function("sequential_document_creation", |b| {
        b.iter(|| {
            let docs: Vec<_> = (0..1000)
                .map(|i| {
                    let mut doc = factory.create_doc(i.to_string());
                    doc.set_value("title", "sequential").unwrap();
                    doc
                })
                .collect();
            black_box(docs)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_document_mutation,
    bench_contextualized_writes,
    bench_update_accumulation,
    bench_parallel_operations
);

criterion_main!(benches);
