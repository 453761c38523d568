use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use trellis::domain::{Condition, Operator, Rule};
use trellis::resolver::resolve;

fn benchmark_single_rule(c: &mut Criterion) {
    let rules = vec![Rule::hide(Condition::neq("role", "admin"))];
    let data = json!({"role": "user"});

    c.bench_function("resolve_single_rule", |b| {
        b.iter(|| resolve(black_box(&rules), black_box(&data)))
    });
}

fn benchmark_rule_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_rule_count");
    let data = json!({
        "role": "user",
        "age": 42,
        "tags": ["a", "b", "c"],
        "notes": "",
        "status": "open"
    });

    for count in [1, 5, 20, 50].iter() {
        let rules: Vec<Rule> = (0..*count)
            .map(|i| match i % 4 {
                0 => Rule::hide(Condition::new("age", Operator::Lt, vec![json!(18)])),
                1 => Rule::disable(Condition::new(
                    "status",
                    Operator::In,
                    vec![json!("locked"), json!("archived")],
                )),
                2 => Rule::show(Condition::new("tags", Operator::Contains, vec![json!("b")])),
                _ => Rule::enable(Condition::new("notes", Operator::Empty, vec![])),
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| resolve(black_box(&rules), black_box(&data)))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_single_rule, benchmark_rule_count);
criterion_main!(benches);
