//! Benchmarks for allocation under press/release churn.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use voicepool::{Allocator, SourceId};

const EDGES: usize = 1024;

/// A reproducible edge stream over `keys` notes, roughly balanced between
/// presses and releases.
fn edge_stream(keys: u8) -> Vec<(SourceId, bool)> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..EDGES)
        .map(|_| {
            let id = if rng.gen_bool(0.25) {
                SourceId::Button(rng.gen_range(0..4))
            } else {
                SourceId::Note(48 + rng.gen_range(0..keys))
            };
            (id, rng.gen_bool(0.5))
        })
        .collect()
}

pub fn bench_allocator(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/allocator");

    for voices in [2, 4, 16] {
        // More keys than voices keeps the pool full and stealing constantly
        let edges = edge_stream(24);

        group.bench_with_input(BenchmarkId::new("churn", voices), &voices, |b, &voices| {
            b.iter(|| {
                let mut alloc = Allocator::new(voices, 4);
                for &(id, press) in &edges {
                    if press {
                        black_box(alloc.on_press(id));
                    } else {
                        black_box(alloc.on_release(id));
                    }
                }
                alloc.release_all();
            })
        });
    }

    group.finish();
}
