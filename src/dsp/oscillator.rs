#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::TAU;

use crate::error::{SynthError, SynthResult};

/*
Waveform Generation
===================

Every voice starts as a raw periodic signal rendered into a buffer in one
pass. The buffer holds `round(duration * sample_rate)` samples and sample
`i` is evaluated at time `t = i / sample_rate`.

Shapes
------

  Sine     sin(2π f t)
           Pure tone, no harmonics.

  Square   sign(sin(2π f t))
           Odd harmonics only. Samples where the sine is exactly 0.0 come
           out as 0.0 (the zero crossing is neither high nor low), which
           happens at t = 0 and wherever f t lands on a half period.

  Saw      2 (f t - floor(0.5 + f t))
           All harmonics. Wraps from just below +1 to -1 at each half-period
           offset, so the range is [-1, 1).

None of these are band-limited. At the pitches a two-row keyboard reaches
the aliasing is audible only on the saw's upper partials.

Frequency Validation
--------------------

A non-finite or non-positive frequency would fill the buffer with NaN or a
flat line. Both are rejected before any sample is computed.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Saw,
}

impl Waveform {
    pub const ALL: [Waveform; 3] = [Waveform::Sine, Waveform::Square, Waveform::Saw];

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::Square => "Square",
            Waveform::Saw => "Saw",
        }
    }

    /// Value of the waveform at time `t` seconds for frequency `freq`.
    #[inline]
    pub fn sample_at(self, freq: f64, t: f64) -> f64 {
        match self {
            Waveform::Sine => (TAU * freq * t).sin(),
            Waveform::Square => {
                let s = (TAU * freq * t).sin();
                if s > 0.0 {
                    1.0
                } else if s < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Waveform::Saw => {
                let phase = freq * t;
                2.0 * (phase - (0.5 + phase).floor())
            }
        }
    }
}

/// Reject frequencies that cannot produce a meaningful signal.
pub fn validate_frequency(freq: f64) -> SynthResult<()> {
    if freq.is_finite() && freq > 0.0 {
        Ok(())
    } else {
        Err(SynthError::InvalidFrequency { freq })
    }
}

/// Number of samples covering `duration` seconds.
#[inline]
pub fn sample_count(duration: f64, sample_rate: f64) -> usize {
    (duration.max(0.0) * sample_rate).round() as usize
}

/// Render `duration` seconds of a raw waveform.
pub fn generate(
    waveform: Waveform,
    freq: f64,
    duration: f64,
    sample_rate: f64,
) -> SynthResult<Vec<f32>> {
    validate_frequency(freq)?;

    let len = sample_count(duration, sample_rate);
    let samples = (0..len)
        .map(|i| waveform.sample_at(freq, i as f64 / sample_rate) as f32)
        .collect();

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 48_000.0;

    #[test]
    fn length_rounds_duration_times_rate() {
        let out = generate(Waveform::Sine, 440.0, 0.5, SAMPLE_RATE).unwrap();
        assert_eq!(out.len(), 24_000);

        // 0.00001 s at 48k is 0.48 samples, rounds to 0
        let out = generate(Waveform::Saw, 440.0, 0.00001, SAMPLE_RATE).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn valid_sine() {
        let out = generate(Waveform::Sine, 440.0, 0.01, SAMPLE_RATE).unwrap();
        let i = 12;
        let expected = (TAU * 440.0 * i as f64 / SAMPLE_RATE).sin() as f32;
        assert!((out[i] - expected).abs() < 1e-6);
    }

    #[test]
    fn square_is_zero_at_origin_and_unit_elsewhere() {
        let out = generate(Waveform::Square, 100.0, 0.01, SAMPLE_RATE).unwrap();
        assert_eq!(out[0], 0.0);
        assert!(out[1..].iter().all(|&s| s == 1.0 || s == -1.0 || s == 0.0));
        assert_eq!(out[10], 1.0);
        // second half of the first period is low
        assert_eq!(out[300], -1.0);
    }

    #[test]
    fn saw_stays_in_half_open_range() {
        let out = generate(Waveform::Saw, 123.4, 0.1, SAMPLE_RATE).unwrap();
        assert!(out.iter().all(|&s| (-1.0..1.0).contains(&s)));
    }

    #[test]
    fn all_waveforms_are_periodic_and_bounded() {
        // 480 Hz at 48k gives an integer period of 100 samples
        let period = 100;
        for waveform in Waveform::ALL {
            let out = generate(waveform, 480.0, 0.05, SAMPLE_RATE).unwrap();
            assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));

            // square and saw may land either side of a discontinuity when a
            // sample sits exactly on it; allow those two points per period
            let mismatches = (0..out.len() - period)
                .filter(|&i| (out[i] - out[i + period]).abs() > 1e-3)
                .count();
            let periods = out.len() / period;
            assert!(
                mismatches <= 2 * periods,
                "{waveform:?} has {mismatches} non-periodic samples"
            );
            if waveform == Waveform::Sine {
                assert_eq!(mismatches, 0);
            }
        }
    }

    #[test]
    fn invalid_frequencies_are_rejected() {
        for freq in [0.0, -440.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                generate(Waveform::Sine, freq, 0.1, SAMPLE_RATE),
                Err(SynthError::InvalidFrequency { .. })
            ));
        }
    }
}
