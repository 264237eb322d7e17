//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voicepool::dsp::{Oscillator, OscillatorBlock, OscillatorWaveform};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let waveforms = [
        ("sine", OscillatorWaveform::Sine),
        ("square", OscillatorWaveform::Square),
        ("saw", OscillatorWaveform::Saw),
        ("triangle", OscillatorWaveform::Triangle),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in waveforms {
            let mut osc = OscillatorBlock::new(48_000.0).with_waveform(waveform);
            osc.set_frequency(440.0);
            osc.set_amplitude(1.0);

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.process();
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
