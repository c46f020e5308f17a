// benches/extract.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use dex_board::extract::count_caught;

/// Player-shaped tree with no direct hit, so every heuristic falls through to the deep search.
fn wide_tree(branches: usize, species: usize) -> Value {
    let boxes: Vec<Value> = (0..branches)
        .map(|i| {
            let caught: Vec<Value> = (0..species).map(|s| json!(format!("species_{}", (s * 7 + i) % 1000))).collect();
            json!({ "box": i, "meta": { "tags": ["a", "b"], "Captured": caught } })
        })
        .collect();
    json!({ "name": "Bench", "stats": { "boxes": boxes } })
}

fn bench_extract(c: &mut Criterion) {
    let direct = json!({ "pokedex": { "caught": (0..1000).map(|i| json!(i % 800)).collect::<Vec<_>>() } });
    let deep = wide_tree(200, 200);

    c.bench_function("extract_caught_list", |b| {
        b.iter(|| black_box(count_caught(black_box(&direct))))
    });

    c.bench_function("extract_deep_search", |b| {
        b.iter(|| black_box(count_caught(black_box(&deep))))
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
