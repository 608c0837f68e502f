//! Benchmarks for ADSR shaping and full note synthesis.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_keys::{
    dsp::{self, oscillator, Waveform},
    EnvelopeConfig,
};

use crate::{NOTE_LENGTHS, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let rate = SAMPLE_RATE as f64;
    let adsr = EnvelopeConfig::default().render_adsr();

    for &seconds in NOTE_LENGTHS {
        // Envelope only, over a fresh copy of the raw tone
        let tone = oscillator::generate(Waveform::Sine, 440.0, seconds, rate).unwrap();
        group.bench_with_input(
            BenchmarkId::new("shape", format!("{seconds}s")),
            &tone,
            |b, tone| {
                b.iter(|| {
                    let mut buf = tone.clone();
                    adsr.shape(black_box(&mut buf), rate);
                    buf
                })
            },
        );

        // Waveform x envelope x volume, what a cache miss pays
        group.bench_with_input(
            BenchmarkId::new("synth_note", format!("{seconds}s")),
            &seconds,
            |b, &seconds| {
                b.iter(|| {
                    dsp::synth_note(
                        black_box(Waveform::Saw),
                        black_box(261.63),
                        black_box(seconds),
                        0.6,
                        &adsr,
                        rate,
                    )
                })
            },
        );
    }

    group.finish();
}
