use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use schema_forms::builder::{FormBuilder, FormChanges};
use schema_forms::domain::SchemaNode;
use schema_forms::model::{FormProperty, FormPropertyFactory, SchemaPreprocessor, SequentialIdGenerator, ValidatorRegistry};
use schema_forms::render::TemplateBuilder;
use schema_forms::widgets::WidgetRegistry;
use serde_json::{json, Map, Value};
use std::rc::Rc;

fn wide_schema(fields: usize) -> SchemaNode {
    let mut properties = Map::new();
    for i in 0..fields {
        let widget = match i % 4 {
            0 => "string",
            1 => "textarea",
            2 => "integer",
            _ => "boolean",
        };
        let kind = match widget {
            "integer" => "integer",
            "boolean" => "boolean",
            _ => "string",
        };
        properties.insert(
            format!("field_{}", i),
            json!({ "type": kind, "widget": widget, "title": format!("Field {}", i) }),
        );
    }
    SchemaNode::from_value(json!({ "modelName": "m", "properties": Value::Object(properties) }))
        .unwrap()
}

fn property_tree(fields: usize) -> FormProperty {
    let mut schema = wide_schema(fields);
    SchemaPreprocessor::new(&SequentialIdGenerator::default()).preprocess(&mut schema);
    FormPropertyFactory::new(&ValidatorRegistry::new())
        .create_property(&schema)
        .unwrap()
}

fn benchmark_build_template(c: &mut Criterion) {
    let root = property_tree(50);
    let registry = WidgetRegistry::new();

    c.bench_function("build_template_50_fields", |b| {
        b.iter(|| TemplateBuilder::new(&registry).build_template(black_box(&root)))
    });
}

fn benchmark_full_form_build(c: &mut Criterion) {
    let schema = wide_schema(50);

    let mut group = c.benchmark_group("form_builder");
    group.throughput(Throughput::Elements(50));

    group.bench_function("apply_schema", |b| {
        b.iter(|| {
            let mut form = FormBuilder::with_id_generator(Rc::new(SequentialIdGenerator::default()));
            form.apply(FormChanges::new().schema(black_box(schema.clone())))
                .unwrap();
            form
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_build_template, benchmark_full_form_build);
criterion_main!(benches);
