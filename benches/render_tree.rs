use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use trellis::compiler::{CompileResult, NodeAttrs, Relation, View, ViewBuilder};
use trellis::domain::{Column, Condition, Rule};
use trellis::renderer::Renderer;

struct PersonForm;

impl View for PersonForm {
    fn name(&self) -> &str {
        "person_form"
    }

    fn builder(&self) -> ViewBuilder {
        ViewBuilder::new()
            .with_relation("spouse", Relation::one())
            .with_relation("addresses", Relation::many())
    }

    fn define(&self, view: &mut ViewBuilder) -> CompileResult<()> {
        view.form("person", NodeAttrs::new().schema("person"), |f| {
            f.field("first_name", NodeAttrs::new().label("First name").required())?;
            f.field("last_name", NodeAttrs::new().label("Last name"))?;
            f.field(
                "email",
                NodeAttrs::new()
                    .kind("INPUT_EMAIL")
                    .rule(Rule::disable(Condition::eq("locked", true))),
            )?;
            f.relationship("spouse", NodeAttrs::new(), |r| {
                r.field("first_name", NodeAttrs::new())
            })?;
            f.relationship("addresses", NodeAttrs::new(), |r| {
                r.field("street", NodeAttrs::new())?;
                r.field("city", NodeAttrs::new())
            })?;
            f.submit("Save", NodeAttrs::new())
        })
    }
}

fn person_data(addresses: usize) -> Value {
    let addresses: Vec<Value> = (0..addresses)
        .map(|i| json!({"id": i, "street": format!("Street {}", i), "city": "Oslo"}))
        .collect();
    json!({
        "first_name": "Ann",
        "last_name": "Lee",
        "email": "ann@example.com",
        "locked": false,
        "spouse_attributes": {"first_name": "Bob"},
        "addresses_attributes": addresses
    })
}

fn benchmark_compile(c: &mut Criterion) {
    c.bench_function("compile_person_form", |b| {
        b.iter(|| black_box(&PersonForm).compile().unwrap())
    });
}

fn benchmark_render_form(c: &mut Criterion) {
    let renderer = Renderer::with_defaults();
    let schema = PersonForm.compile().unwrap();
    let mut group = c.benchmark_group("render_form_array_items");

    for count in [1, 10, 100].iter() {
        let data = person_data(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                renderer
                    .render_view(black_box(&schema), black_box(&data), None)
                    .map(|rendered| rendered.to_html())
            })
        });
    }
    group.finish();
}

fn benchmark_render_table(c: &mut Criterion) {
    let renderer = Renderer::with_defaults();
    let mut view = ViewBuilder::new();
    view.table(
        "people",
        vec![Column::new("name").label("Name"), Column::new("active").kind("DISPLAY_BOOLEAN")],
        NodeAttrs::new(),
    )
    .unwrap();
    let schema = view.to_schema().unwrap();

    let rows: Vec<Value> = (0..500)
        .map(|i| json!({"id": i, "name": format!("Person {}", i), "active": i % 2 == 0}))
        .collect();
    let data = json!({ "people": rows });

    c.bench_function("render_table_500_rows", |b| {
        b.iter(|| renderer.render_view(black_box(&schema), black_box(&data), None))
    });
}

criterion_group!(benches, benchmark_compile, benchmark_render_form, benchmark_render_table);
criterion_main!(benches);
