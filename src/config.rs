//! Engine configuration, fixed at construction.

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::envelope::Adsr,
    error::{SynthError, SynthResult},
};

/// ADSR timings shared by live voices and offline rendering.
///
/// Two release constants, and the one heard live is the shorter:
///
/// - `release` (0.12 s) ends rendered takes, and is also the fade the
///   output service applies when a live key is let go.
/// - `live_release` (0.4 s) is only baked into the tail of the looping live
///   buffers. That tail is never reached while a key is held and is cut by
///   the key-up fade, so it is longer than `release` in the defaults.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    /// Seconds to ramp 0 → 1
    pub attack: f64,
    /// Seconds to ramp 1 → sustain
    pub decay: f64,
    /// Level held between decay and release (0.0 - 1.0)
    pub sustain: f64,
    /// Seconds to ramp sustain → 0 when rendering a take
    pub release: f64,
    /// Release baked into the looping live voice buffers
    pub live_release: f64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.005,
            decay: 0.08,
            sustain: 0.85,
            release: 0.12,
            live_release: 0.4,
        }
    }
}

impl EnvelopeConfig {
    /// Envelope used for offline rendering (full release).
    pub fn render_adsr(&self) -> Adsr {
        Adsr::new(self.attack, self.decay, self.sustain, self.release)
    }

    /// Envelope used for cached live voices.
    pub fn live_adsr(&self) -> Adsr {
        self.render_adsr().with_release(self.live_release)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// PCM sample width in bits (only 16 is supported)
    pub bit_depth: u16,
    /// Output channel count (only stereo is supported)
    pub channels: u16,
    /// Target audio callback size in frames
    pub buffer_size: u32,
    pub base_octave: i32,
    pub min_octave: i32,
    pub max_octave: i32,
    /// Volume new notes start at (0.0 - 1.0]
    pub default_volume: f64,
    pub envelope: EnvelopeConfig,
    /// Length in seconds of the looping buffer rendered per live voice
    pub live_voice_duration: f64,
    /// Shortest note the renderer will synthesize, in seconds
    pub minimum_event_length: f64,
    /// Directory rendered takes are written into
    pub output_dir: PathBuf,
    /// Two sustain taps closer than this (seconds) toggle the pedal
    pub sustain_tap_window: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            bit_depth: 16,
            channels: 2,
            buffer_size: 256,
            base_octave: 4,
            min_octave: 3,
            max_octave: 6,
            default_volume: 0.6,
            envelope: EnvelopeConfig::default(),
            live_voice_duration: 2.5,
            minimum_event_length: 0.001,
            output_dir: PathBuf::from("."),
            sustain_tap_window: 0.2,
        }
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> SynthResult<()> {
        if self.sample_rate == 0 {
            return Err(SynthError::invalid_config("sample_rate", "must be positive"));
        }
        if self.bit_depth != 16 {
            return Err(SynthError::invalid_config(
                "bit_depth",
                format!("only 16-bit PCM is supported, got {}", self.bit_depth),
            ));
        }
        if self.channels != 2 {
            return Err(SynthError::invalid_config(
                "channels",
                format!("only stereo output is supported, got {}", self.channels),
            ));
        }
        if self.buffer_size == 0 {
            return Err(SynthError::invalid_config("buffer_size", "must be positive"));
        }
        if self.min_octave > self.max_octave {
            return Err(SynthError::invalid_config(
                "min_octave",
                format!("{} is above max_octave {}", self.min_octave, self.max_octave),
            ));
        }
        if !(self.min_octave..=self.max_octave).contains(&self.base_octave) {
            return Err(SynthError::invalid_config(
                "base_octave",
                format!(
                    "{} is outside {}..={}",
                    self.base_octave, self.min_octave, self.max_octave
                ),
            ));
        }
        if !(self.default_volume > 0.0 && self.default_volume <= 1.0) {
            return Err(SynthError::invalid_config(
                "default_volume",
                format!("{} is outside (0, 1]", self.default_volume),
            ));
        }

        let env = &self.envelope;
        if !(0.0..=1.0).contains(&env.sustain) {
            return Err(SynthError::invalid_config(
                "envelope.sustain",
                format!("{} is outside [0, 1]", env.sustain),
            ));
        }
        for (field, value) in [
            ("envelope.attack", env.attack),
            ("envelope.decay", env.decay),
            ("envelope.release", env.release),
            ("envelope.live_release", env.live_release),
            ("minimum_event_length", self.minimum_event_length),
            ("sustain_tap_window", self.sustain_tap_window),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SynthError::invalid_config(
                    field,
                    format!("{value} must be a finite, non-negative number of seconds"),
                ));
            }
        }
        if !(self.live_voice_duration.is_finite() && self.live_voice_duration > 0.0) {
            return Err(SynthError::invalid_config(
                "live_voice_duration",
                "must be positive",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_key_up_fade_is_the_shorter_release() {
        let env = EnvelopeConfig::default();
        assert!(env.release < env.live_release);
        assert_eq!(env.live_adsr().release, env.live_release);
        assert_eq!(env.render_adsr().release, env.release);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let config = EngineConfig {
            sample_rate: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SynthError::InvalidConfig { field: "sample_rate", .. })
        ));
    }

    #[test]
    fn base_octave_must_sit_in_range() {
        let config = EngineConfig {
            base_octave: 9,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SynthError::InvalidConfig { field: "base_octave", .. })
        ));
    }

    #[test]
    fn negative_release_is_rejected() {
        let mut config = EngineConfig::default();
        config.envelope.release = -0.1;
        assert!(matches!(
            config.validate(),
            Err(SynthError::InvalidConfig { field: "envelope.release", .. })
        ));
    }

    #[test]
    fn live_adsr_only_swaps_release() {
        let env = EnvelopeConfig::default();
        let live = env.live_adsr();
        let render = env.render_adsr();
        assert_eq!(live.attack, render.attack);
        assert_eq!(live.sustain, render.sustain);
        assert_eq!(live.release, 0.4);
        assert_eq!(render.release, 0.12);
    }
}
