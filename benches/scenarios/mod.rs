//! Real-world scenario benchmarks.
//!
//! These model what the keyboard actually does: chords of looping voices
//! mixed in the audio callback, and finished takes rendered to a buffer.

mod mixdown;
mod playback;

pub use mixdown::bench_mixdown;
pub use playback::bench_playback;
