//! Benchmarks for offline take mixdown.
//!
//! These simulate stopping a recording: every note re-synthesized with its
//! full release, summed, and normalized.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_keys::{
    dsp::Waveform,
    record::{NoteEnd, NoteEvent, Renderer},
    EngineConfig,
};

use crate::SAMPLE_RATE;

/// An arpeggio of `notes` eighth notes at 120 BPM, every fourth one held
/// over the next three so notes overlap.
fn arpeggio(notes: usize) -> Vec<NoteEvent> {
    let pitches = [261.63, 329.63, 392.0, 523.25];
    (0..notes)
        .map(|i| {
            let start = i as f64 * 0.25;
            let held = if i % 4 == 0 { 1.0 } else { 0.2 };
            NoteEvent {
                start,
                end: NoteEnd::Closed(start + held),
                frequency: pitches[i % pitches.len()],
                waveform: Waveform::ALL[i % Waveform::ALL.len()],
                volume: 0.6,
            }
        })
        .collect()
}

pub fn bench_mixdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mixdown");
    group.sample_size(20);

    let renderer = Renderer::new(&EngineConfig {
        sample_rate: SAMPLE_RATE,
        ..EngineConfig::default()
    });

    for notes in [8, 32, 128] {
        let take = arpeggio(notes);
        group.bench_with_input(BenchmarkId::new("arpeggio", notes), &take, |b, take| {
            b.iter(|| renderer.mixdown(black_box(take)))
        });
    }

    group.finish();
}
