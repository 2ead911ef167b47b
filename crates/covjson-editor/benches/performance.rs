use covjson_editor::{JsonEditor, Schema, SourceMap, prettify_json};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SCHEMA: &str = include_str!("../tests/fixtures/coverage.schema.json");

fn large_coverage(points: usize) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    let xs: Vec<String> = (0..points)
        .map(|_| format!("{:.4}", rng.gen_range(-180.0..180.0)))
        .collect();
    let values: Vec<String> = (0..points)
        .map(|_| format!("{:.2}", rng.gen_range(250.0..310.0)))
        .collect();

    format!(
        r#"{{"type":"Coverage","domain":{{"type":"Domain","domainType":"Trajectory","axes":{{"x":{{"values":[{}]}}}}}},"parameters":{{}},"ranges":{{"TEMP":{{"type":"NdArray","values":[{}]}}}}}}"#,
        xs.join(","),
        values.join(",")
    )
}

fn bench_validation_pass(c: &mut Criterion) {
    let text = prettify_json(&large_coverage(2_000)).into_owned();
    c.bench_function("validation_pass/2k_points", |b| {
        b.iter_batched(
            || {
                let mut editor = JsonEditor::new();
                editor.set_schema(Schema::from_json_str(SCHEMA).unwrap());
                editor
            },
            |mut editor| {
                let report = editor.replace_text(black_box(text.clone()));
                black_box(report.diagnostics.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_source_map_build(c: &mut Criterion) {
    let text = large_coverage(20_000);
    c.bench_function("source_map_build/20k_points", |b| {
        b.iter(|| {
            let map = SourceMap::build(black_box(&text));
            black_box(map.len());
        })
    });
}

fn bench_prettify_minified(c: &mut Criterion) {
    let text = large_coverage(1_000);
    c.bench_function("prettify/1k_points", |b| {
        b.iter(|| black_box(prettify_json(black_box(&text)).len()))
    });
}

criterion_group!(
    benches,
    bench_validation_pass,
    bench_source_map_build,
    bench_prettify_minified
);
criterion_main!(benches);
