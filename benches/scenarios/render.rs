//! Benchmarks for block rendering with every voice sounding.

use std::{collections::VecDeque, hint::black_box};

use criterion::{BenchmarkId, Criterion};
use voicepool::{
    synth::{mapper::channels, message::NoteMessage},
    Engine, EngineConfig, MAX_VOICES,
};

use crate::BLOCK_SIZES;

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");

    let pots = [0.8f32; channels::COUNT];
    for &size in BLOCK_SIZES {
        for voices in [4, MAX_VOICES] {
            let config = EngineConfig::default().block_size(size).voices(voices);
            let mut notes = VecDeque::new();
            for note in 0..voices as u8 {
                notes.push_back(NoteMessage::NoteOn {
                    note: 48 + note,
                    velocity: 100,
                });
            }

            let Ok((mut control, mut renderer)) =
                voicepool::engine::build(&config, pots, [false; 4], notes)
            else {
                continue;
            };
            control.poll();

            let mut left = vec![0.0f32; size];
            let mut right = vec![0.0f32; size];

            // Renderer alone: what the audio callback pays
            let id = format!("{voices}_voices");
            group.bench_with_input(BenchmarkId::new(id, size), &size, |b, _| {
                b.iter(|| {
                    renderer.render_block(black_box(&mut left), black_box(&mut right));
                })
            });

            // Poll plus render, as in offline rendering
            let mut engine = match Engine::new(&config, pots, [true; 4], VecDeque::<NoteMessage>::new()) {
                Ok(engine) => engine,
                Err(_) => continue,
            };
            let id = format!("{voices}_voices_with_poll");
            group.bench_with_input(BenchmarkId::new(id, size), &size, |b, _| {
                b.iter(|| {
                    engine.process_block(black_box(&mut left), black_box(&mut right));
                })
            });
        }
    }

    group.finish();
}
