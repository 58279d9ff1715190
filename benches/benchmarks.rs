use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn generate_bench(c: &mut Criterion) {
    let grammar = std::fs::read_to_string("demos/chloro.grammar").unwrap();
    c.bench_function("generate", |b| {
        b.iter(|| lalrgen::generate(black_box(&grammar)).unwrap())
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = generate_bench
}
criterion_main!(benches);
