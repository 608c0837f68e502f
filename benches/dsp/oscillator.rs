//! Benchmarks for raw waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_keys::dsp::{oscillator, Waveform};

use crate::{NOTE_LENGTHS, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let rate = SAMPLE_RATE as f64;

    for &seconds in NOTE_LENGTHS {
        for waveform in Waveform::ALL {
            group.bench_with_input(
                BenchmarkId::new(waveform.name(), format!("{seconds}s")),
                &seconds,
                |b, &seconds| {
                    b.iter(|| {
                        oscillator::generate(
                            black_box(waveform),
                            black_box(440.0),
                            black_box(seconds),
                            rate,
                        )
                    })
                },
            );
        }
    }

    group.finish();
}
