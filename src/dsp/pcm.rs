//! Float ↔ 16-bit PCM helpers shared by the voice cache and the renderer.

/// Full-scale value for 16-bit quantization.
pub const I16_SCALE: f32 = 32_767.0;

/// Largest absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

/// Divide the buffer by its peak if, and only if, the peak exceeds 1.0.
///
/// Returns the gain that was applied (1.0 when untouched).
pub fn normalize_peak(samples: &mut [f32]) -> f32 {
    let peak = peak(samples);
    if peak > 1.0 {
        let gain = 1.0 / peak;
        for s in samples.iter_mut() {
            *s *= gain;
        }
        gain
    } else {
        1.0
    }
}

/// Scale to 16-bit and truncate toward zero, clamping anything outside [-1, 1].
#[inline]
pub fn quantize_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * I16_SCALE) as i16
}

/// Quantize a mono buffer and duplicate it into interleaved L/R frames.
pub fn interleave_stereo(mono: &[f32]) -> Vec<i16> {
    let mut out = Vec::with_capacity(mono.len() * 2);
    for &s in mono {
        let q = quantize_i16(s);
        out.push(q);
        out.push(q);
    }
    out
}
