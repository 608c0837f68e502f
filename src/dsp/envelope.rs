/*
ADSR Envelope Shaping
=====================

Unlike a gated envelope that runs sample by sample until note_off, every
buffer this engine shapes already has a known length: a looping live voice
is a fixed-duration loop, and an offline note is its held time plus the
release tail. So the whole curve is laid out up front and multiplied into
the signal in one pass.

The Shape
---------

  Level
    1.0 ┐  ╱╲
        │ ╱  ╲__________________
    S   │╱                      ╲
        │                        ╲
    0.0 └─────────────────────────╲──→ samples
        |A |D |     sustain      | R |
                                 ^
                       len - releaseN

Segment lengths in samples:

    attackN  = max(1, round(attack  * rate))
    decayN   = max(1, round(decay   * rate))
    releaseN = max(1, round(release * rate))

Each ramp is a linspace including both endpoints: a ramp of n samples from
a to b writes a + (b - a) * i / (n - 1) for i in 0..n, and just `a` when
n == 1. That puts sample 0 at exactly 0.0 and the last sample at exactly
0.0 whenever releaseN > 1.

Short Buffers
-------------

When attackN + decayN + releaseN >= len the flat sustain region is empty.
The segments are still written in order (attack, decay, release) clipped
to the buffer, so the release ramp overwrites the tail of the decay or
attack. A 2-sample buffer with 5 ms attack therefore comes out as the
release ramp alone. No sample index ever leaves the buffer.
*/

/// Attack/decay/sustain/release timings in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

/// Segment lengths of an envelope laid over a particular buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segments {
    pub attack: usize,
    pub decay: usize,
    pub release: usize,
}

impl Adsr {
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack: attack.max(0.0),
            decay: decay.max(0.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(0.0),
        }
    }

    /// Same shape with a different release time.
    pub fn with_release(mut self, release: f64) -> Self {
        self.release = release.max(0.0);
        self
    }

    pub fn segments(&self, sample_rate: f64) -> Segments {
        let samples = |secs: f64| ((secs * sample_rate).round() as usize).max(1);
        Segments {
            attack: samples(self.attack),
            decay: samples(self.decay),
            release: samples(self.release),
        }
    }

    /// Write the envelope curve for a buffer of `out.len()` samples.
    pub fn curve(&self, out: &mut [f32], sample_rate: f64) {
        let len = out.len();
        let seg = self.segments(sample_rate);
        let sustain = self.sustain as f32;

        out.fill(1.0);

        ramp(&mut out[..], 0.0, 1.0, seg.attack);

        let decay_start = seg.attack.min(len);
        ramp(&mut out[decay_start..], 1.0, sustain, seg.decay);

        let sustain_start = seg.attack + seg.decay;
        let sustain_end = len.saturating_sub(seg.release);
        if sustain_end > sustain_start {
            out[sustain_start..sustain_end].fill(sustain);
        }

        let tail = len - sustain_end;
        ramp(&mut out[sustain_end..], sustain, 0.0, tail);
    }

    /// Multiply `signal` by the envelope in place.
    pub fn shape(&self, signal: &mut [f32], sample_rate: f64) {
        let mut env = vec![0.0f32; signal.len()];
        self.curve(&mut env, sample_rate);
        for (s, e) in signal.iter_mut().zip(&env) {
            *s *= e;
        }
    }
}

/// Linear ramp from `from` to `to` over `n` points, clipped to `out`.
fn ramp(out: &mut [f32], from: f32, to: f32, n: usize) {
    let span = n.saturating_sub(1).max(1) as f32;
    for (i, sample) in out.iter_mut().take(n).enumerate() {
        *sample = from + (to - from) * (i as f32 / span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 1_000.0;

    fn curve(adsr: Adsr, len: usize) -> Vec<f32> {
        let mut out = vec![0.0; len];
        adsr.curve(&mut out, SAMPLE_RATE);
        out
    }

    #[test]
    fn segment_lengths_round_and_floor_at_one() {
        let seg = Adsr::new(0.0104, 0.0, 0.5, 0.0206).segments(SAMPLE_RATE);
        assert_eq!(seg, Segments { attack: 10, decay: 1, release: 21 });
    }

    #[test]
    fn curve_hits_each_stage() {
        let adsr = Adsr::new(0.01, 0.02, 0.6, 0.05);
        let env = curve(adsr, 200);

        assert_eq!(env[0], 0.0, "starts silent");
        assert!((env[9] - 1.0).abs() < 1e-6, "attack ends at full level");
        assert!((env[10] - 1.0).abs() < 1e-6, "decay starts at full level");
        assert!((env[29] - 0.6).abs() < 1e-6, "decay ends at sustain");
        for &level in &env[30..150] {
            assert!((level - 0.6).abs() < 1e-6, "sustain holds");
        }
        assert!((env[150] - 0.6).abs() < 1e-6, "release starts at sustain");
        assert_eq!(env[199], 0.0, "ends silent");
    }

    #[test]
    fn release_is_monotonic() {
        let env = curve(Adsr::new(0.01, 0.02, 0.8, 0.05), 200);
        for pair in env[150..].windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn short_buffer_degenerates_without_panicking() {
        let adsr = Adsr::new(0.01, 0.02, 0.6, 0.05);
        for len in [0, 1, 2, 7, 40, 79, 80, 81] {
            let env = curve(adsr, len);
            assert_eq!(env.len(), len);
            assert!(env.iter().all(|v| (0.0..=1.0).contains(v)));
        }

        // release overwrites everything when it is longer than the buffer
        let env = curve(adsr, 40);
        assert!((env[0] - 0.6).abs() < 1e-6);
        assert_eq!(env[39], 0.0);
    }

    #[test]
    fn shape_multiplies_signal() {
        let adsr = Adsr::new(0.01, 0.01, 0.5, 0.01);
        let mut signal = vec![1.0f32; 100];
        adsr.shape(&mut signal, SAMPLE_RATE);
        assert_eq!(signal, curve(adsr, 100));

        let mut signal = vec![-0.5f32; 100];
        adsr.shape(&mut signal, SAMPLE_RATE);
        assert!((signal[50] + 0.25).abs() < 1e-6);
    }
}
