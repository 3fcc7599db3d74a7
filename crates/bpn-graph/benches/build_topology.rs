use bpn_graph::{AnnotatedInteractionsArray, InteractionsBuilder};
use criterion::{criterion_group, criterion_main, Criterion};

fn sample_builder(genes: usize) -> InteractionsBuilder {
    let mut builder = InteractionsBuilder::new();
    for gene in 0..genes {
        builder.annotate(format!("g{gene}"), format!("P{}", gene % 17));
        builder.annotate(format!("g{gene}"), format!("P{}", gene % 5));
        builder.set_expression(format!("g{gene}"), (gene % 7) as f64 / 7.0);
        for offset in 1..4 {
            builder.add_interaction(format!("g{gene}"), format!("g{}", (gene + offset * 13) % genes));
        }
    }
    builder
}

fn bench_build(c: &mut Criterion) {
    let builder = sample_builder(2_000);
    c.bench_function("build_graph", |b| b.iter(|| builder.build().unwrap()));
    let graph = builder.build().unwrap();
    c.bench_function("flatten_array", |b| {
        b.iter(|| AnnotatedInteractionsArray::from_graph(&graph))
    });
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
