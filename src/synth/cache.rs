//! Memoized live-voice buffers.
//!
//! A cached voice is a fixed-length loop rendered with the live envelope,
//! quantized to 16-bit and duplicated to stereo. Identical keys always hand
//! back the same `Arc`, so replaying a pitch never re-synthesizes it.
//!
//! The cache never evicts. Its key space is the product of timbres, pitches
//! reachable from the keymap and loop durations, which for a two-row
//! keyboard over a few octaves is a few hundred entries of ~440 KB each at
//! 44.1 kHz. Callers that generate arbitrary frequencies (pitch bends,
//! microtonal input) will grow it without bound.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    dsp::{self, pcm, Adsr, Waveform},
    error::SynthResult,
};

/// Lookup key: waveform, frequency rounded to 4 decimals, loop duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub waveform: Waveform,
    /// Bit pattern of the frequency in units of 1e-4 Hz, rounded
    freq_e4_bits: u64,
    /// Duration bit pattern (exact match)
    duration_bits: u64,
}

impl CacheKey {
    pub fn new(waveform: Waveform, freq: f64, duration: f64) -> Self {
        Self {
            waveform,
            freq_e4_bits: (freq * 10_000.0).round().to_bits(),
            duration_bits: duration.to_bits(),
        }
    }

    /// Frequency after rounding to 4 decimal places.
    pub fn frequency(&self) -> f64 {
        f64::from_bits(self.freq_e4_bits) / 10_000.0
    }

    pub fn duration(&self) -> f64 {
        f64::from_bits(self.duration_bits)
    }
}

/// Rendered, immutable live voice buffer.
pub struct CachedVoice {
    pub key: CacheKey,
    /// Frequency the buffer was synthesized at, as first requested
    pub frequency: f64,
    pub sample_rate: u32,
    /// Interleaved L/R frames
    pub samples: Arc<[i16]>,
}

impl CachedVoice {
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }
}

impl fmt::Debug for CachedVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedVoice")
            .field("key", &self.key)
            .field("frequency", &self.frequency)
            .field("sample_rate", &self.sample_rate)
            .field("frames", &self.frames())
            .finish()
    }
}

pub struct VoiceCache {
    sample_rate: u32,
    adsr: Adsr,
    entries: HashMap<CacheKey, Arc<CachedVoice>>,
}

impl VoiceCache {
    /// `adsr` should carry the live release profile.
    pub fn new(sample_rate: u32, adsr: Adsr) -> Self {
        Self {
            sample_rate,
            adsr,
            entries: HashMap::new(),
        }
    }

    /// Return the cached voice for the key, rendering it on first use.
    ///
    /// Rounding only decides which entry a frequency shares; a miss is
    /// synthesized at the frequency asked for.
    pub fn get_or_create(
        &mut self,
        waveform: Waveform,
        freq: f64,
        duration: f64,
    ) -> SynthResult<Arc<CachedVoice>> {
        dsp::oscillator::validate_frequency(freq)?;

        let key = CacheKey::new(waveform, freq, duration);
        if let Some(voice) = self.entries.get(&key) {
            return Ok(Arc::clone(voice));
        }

        let mono = dsp::synth_note(
            waveform,
            freq,
            duration,
            1.0,
            &self.adsr,
            self.sample_rate as f64,
        )?;
        let voice = Arc::new(CachedVoice {
            key,
            frequency: freq,
            sample_rate: self.sample_rate,
            samples: pcm::interleave_stereo(&mono).into(),
        });

        log::debug!(
            "voice cache miss: {} {:.4} Hz {}s ({} entries)",
            waveform.name(),
            freq,
            duration,
            self.entries.len() + 1
        );
        self.entries.insert(key, Arc::clone(&voice));
        Ok(voice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SynthError;

    fn cache() -> VoiceCache {
        VoiceCache::new(8_000, Adsr::new(0.005, 0.08, 0.85, 0.4))
    }

    #[test]
    fn identical_keys_share_one_buffer() {
        let mut cache = cache();
        let a = cache.get_or_create(Waveform::Sine, 440.0, 1.0).unwrap();
        let b = cache.get_or_create(Waveform::Sine, 440.000_01, 1.0).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_keys_render_separately() {
        let mut cache = cache();
        let a = cache.get_or_create(Waveform::Sine, 440.0, 1.0).unwrap();
        let b = cache.get_or_create(Waveform::Saw, 440.0, 1.0).unwrap();
        let c = cache.get_or_create(Waveform::Sine, 440.001, 1.0).unwrap();
        let d = cache.get_or_create(Waveform::Sine, 440.0, 0.5).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert!(!Arc::ptr_eq(&a, &d));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn voice_is_stereo_sixteen_bit_of_expected_length() {
        let mut cache = cache();
        let voice = cache.get_or_create(Waveform::Square, 220.0, 0.5).unwrap();
        assert_eq!(voice.frames(), 4_000);
        assert_eq!(voice.samples.len(), 8_000);
        for frame in voice.samples.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        // envelope still starts and ends at silence
        assert_eq!(voice.samples[0], 0);
        assert_eq!(voice.samples[voice.samples.len() - 1], 0);
    }

    #[test]
    fn invalid_frequency_is_not_cached() {
        let mut cache = cache();
        assert!(matches!(
            cache.get_or_create(Waveform::Sine, 0.0, 1.0),
            Err(SynthError::InvalidFrequency { .. })
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn tiny_frequency_renders_at_the_requested_pitch() {
        let mut cache = cache();
        let voice = cache.get_or_create(Waveform::Sine, 0.000_04, 0.1).unwrap();
        assert_eq!(voice.frequency, 0.000_04);
        assert_eq!(voice.key.frequency(), 0.0);
        assert_eq!(voice.frames(), 800);
    }

    #[test]
    fn huge_frequencies_keep_separate_entries() {
        let mut cache = cache();
        let a = cache.get_or_create(Waveform::Sine, 1e300, 0.1).unwrap();
        let b = cache.get_or_create(Waveform::Sine, 2e300, 0.1).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.frequency, 1e300);
        assert_eq!(b.frequency, 2e300);
        assert_eq!(cache.len(), 2);
    }
}
