use crate::{dsp::Waveform, synth::message::VoiceHandle};

/// A key that is currently sounding.
///
/// Exists only between note-on and the moment its fade is issued (or panic).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveVoice {
    pub key: char,
    pub handle: VoiceHandle,
    /// Engine clock seconds at note-on
    pub started_at: f64,
    pub frequency: f64,
    pub waveform: Waveform,
    pub volume: f64,
}

/// Read-only view of an active voice for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceInfo {
    pub frequency: f64,
    pub waveform: Waveform,
    pub volume: f64,
    pub started_at: f64,
}

impl From<&ActiveVoice> for VoiceInfo {
    fn from(voice: &ActiveVoice) -> Self {
        Self {
            frequency: voice.frequency,
            waveform: voice.waveform,
            volume: voice.volume,
            started_at: voice.started_at,
        }
    }
}
