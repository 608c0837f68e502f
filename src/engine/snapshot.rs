use std::collections::{BTreeMap, BTreeSet};

use crate::{dsp::Waveform, synth::VoiceInfo};

/// Read-only view of the engine for the front-end. Taken once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub is_recording: bool,
    pub sustain: bool,
    pub octave: i32,
    pub waveform: Waveform,
    pub volume: f64,
    /// Notes captured so far in the current take
    pub recorded_notes: usize,
    pub active_voices: BTreeMap<char, VoiceInfo>,
    pub held_keys: BTreeSet<char>,
}

impl EngineSnapshot {
    pub fn is_active(&self, key: char) -> bool {
        self.active_voices.contains_key(&key.to_ascii_lowercase())
    }

    /// Sum of active voice volumes, clamped to 1.
    pub fn level(&self) -> f64 {
        self.active_voices
            .values()
            .map(|v| v.volume)
            .sum::<f64>()
            .min(1.0)
    }
}
