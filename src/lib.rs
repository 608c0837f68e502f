pub mod config; // Engine configuration and validation
pub mod dsp; // Waveforms, envelopes, PCM helpers
pub mod engine; // Engine context, clock, snapshot
pub mod error;
pub mod io; // Keymap and WAV output
pub mod record; // Takes and offline mixdown
pub mod synth; // Voice cache, live voices, playback

pub use config::{EngineConfig, EnvelopeConfig};
pub use dsp::{Adsr, Waveform};
pub use engine::{Clock, Engine, EngineSnapshot, ManualClock, SystemClock};
pub use error::{SynthError, SynthResult};
