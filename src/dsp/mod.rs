//! Offline DSP primitives: whole-buffer waveform rendering, envelope
//! shaping and PCM conversion.
//!
//! Everything here is a pure function of its inputs. Callers decide whether
//! the result is cached (live voices) or mixed straight into a take.

/// Attack/decay/sustain/release envelope laid over a finite buffer.
pub mod envelope;
/// Oscillator waveforms.
pub mod oscillator;
/// Peak normalization and 16-bit quantization.
pub mod pcm;

pub use envelope::Adsr;
pub use oscillator::Waveform;

use crate::error::{SynthError, SynthResult};

/// Note volumes live in (0, 1].
pub fn validate_volume(volume: f64) -> SynthResult<()> {
    if volume > 0.0 && volume <= 1.0 {
        Ok(())
    } else {
        Err(SynthError::InvalidVolume { volume })
    }
}

/// Render one enveloped note: raw waveform × ADSR × volume.
pub fn synth_note(
    waveform: Waveform,
    freq: f64,
    duration: f64,
    volume: f64,
    adsr: &Adsr,
    sample_rate: f64,
) -> SynthResult<Vec<f32>> {
    let mut note = oscillator::generate(waveform, freq, duration, sample_rate)?;
    adsr.shape(&mut note, sample_rate);
    if volume != 1.0 {
        let gain = volume as f32;
        for s in note.iter_mut() {
            *s *= gain;
        }
    }
    Ok(note)
}
