//! Benchmarks for the playback mixer inside an audio callback.

use std::{collections::VecDeque, hint::black_box};

use criterion::{BenchmarkId, Criterion};
use saavy_keys::{
    dsp::Waveform,
    synth::{PlaybackMixer, VoiceCache, VoiceCommand, VoiceHandle},
    EnvelopeConfig,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// C major spread over two octaves
const CHORD: &[f64] = &[
    261.63, 329.63, 392.0, 523.25, 659.26, 783.99, 1046.5, 1318.51,
];

fn mixer_with(voices: usize) -> PlaybackMixer<VecDeque<VoiceCommand>> {
    let mut cache = VoiceCache::new(SAMPLE_RATE, EnvelopeConfig::default().live_adsr());
    let commands = CHORD
        .iter()
        .take(voices)
        .enumerate()
        .map(|(i, &freq)| VoiceCommand::Play {
            handle: VoiceHandle(i as u64 + 1),
            voice: cache.get_or_create(Waveform::Saw, freq, 2.5).unwrap(),
            volume: 0.6,
        })
        .collect();
    PlaybackMixer::new(commands, SAMPLE_RATE)
}

pub fn bench_playback(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/playback");

    for &size in BLOCK_SIZES {
        // interleaved stereo
        let mut out = vec![0.0f32; size * 2];

        for voices in [1, 4, 8] {
            let mut mixer = mixer_with(voices);
            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        mixer.render(black_box(&mut out), 2);
                    })
                },
            );
        }
    }

    group.finish();
}
