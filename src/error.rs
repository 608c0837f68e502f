//! Error types for the synth engine.

use thiserror::Error;

/// Result type for engine operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors surfaced by synthesis, configuration and file rendering.
///
/// An empty take is not an error (`stop_recording` yields `Ok(None)`), and
/// mixdown buffer growth is handled by zero-padding, so neither appears here.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Frequency was zero, negative, NaN or infinite.
    #[error("invalid frequency: {freq} Hz")]
    InvalidFrequency {
        /// The rejected frequency.
        freq: f64,
    },

    /// Note volume outside (0, 1], or NaN.
    #[error("invalid volume: {volume}")]
    InvalidVolume {
        /// The rejected volume.
        volume: f64,
    },

    /// Static configuration rejected at construction time.
    #[error("invalid config '{field}': {message}")]
    InvalidConfig {
        /// Offending field name.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// The WAV container could not be written.
    #[error("encoding failed: {0}")]
    Encoding(#[from] hound::Error),

    /// I/O error outside the encoder (e.g. creating the output directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthError {
    /// Creates an invalid config error.
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}
