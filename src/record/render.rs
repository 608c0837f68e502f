use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::{
    config::EngineConfig,
    dsp::{self, pcm, Adsr},
    error::SynthResult,
    io::wav,
    record::event::{NoteEnd, NoteEvent},
};

/*
Offline Mixdown
===============

A finished take is re-synthesized from its note events rather than from
the live loops, so every note gets its true length plus the full release
tail instead of the looping buffer's short one.

    buffer length  = ceil((max(end) + tail) * rate) + 1
    note duration  = max(min_length, (end - start) + tail)
    note offset    = round(start * rate)

Notes are ADDED into the buffer, so overlaps sum. A note whose rendered
length runs past the end (rounding can push it a sample or two) grows the
buffer with zeros; nothing is ever truncated.

Normalization
-------------

Summing can exceed full scale:

    two full-volume sines in phase  → peak 2.0

After mixing, if peak > 1.0 the whole buffer is divided by the peak once.
A take that already fits in [-1, 1] is left untouched, so a single quiet
note keeps its recorded volume.

Encoding
--------

The float mix is quantized to 16-bit, duplicated to L/R and written as a
stereo WAV at the engine's sample rate, named after the wall-clock second
the take stopped:

    recording_20261017_142501.wav

Two takes stopped within the same second overwrite each other.
*/

/// Float mix of a whole take before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Mixdown {
    pub samples: Vec<f32>,
    /// Normalization gain applied (1.0 when the mix did not clip)
    pub gain: f32,
}

pub struct Renderer {
    sample_rate: u32,
    adsr: Adsr,
    minimum_event_length: f64,
    output_dir: PathBuf,
}

impl Renderer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            adsr: config.envelope.render_adsr(),
            minimum_event_length: config.minimum_event_length,
            output_dir: config.output_dir.clone(),
        }
    }

    /// Seconds of release appended after each note.
    pub fn release_tail(&self) -> f64 {
        self.adsr.release
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start and end of an event, with open or inverted ends collapsed to
    /// the minimum event length.
    fn span(&self, event: &NoteEvent) -> (f64, f64) {
        let start = event.start.max(0.0);
        let shortest = start + self.minimum_event_length;
        let end = match event.end {
            NoteEnd::Closed(end) => end.max(shortest),
            NoteEnd::Open => shortest,
        };
        (start, end)
    }

    /// Mix every event into one normalized mono buffer.
    pub fn mixdown(&self, events: &[NoteEvent]) -> SynthResult<Mixdown> {
        let rate = self.sample_rate as f64;
        let tail = self.release_tail();

        let total = events
            .iter()
            .map(|ev| self.span(ev).1 + tail)
            .fold(0.0f64, f64::max);
        let mut mix = vec![0.0f32; (total * rate).ceil() as usize + 1];

        for event in events {
            let (start, end) = self.span(event);
            let duration = ((end - start) + tail).max(self.minimum_event_length);
            let note = dsp::synth_note(
                event.waveform,
                event.frequency,
                duration,
                event.volume,
                &self.adsr,
                rate,
            )?;

            let offset = (start * rate).round() as usize;
            let needed = offset + note.len();
            if needed > mix.len() {
                mix.resize(needed, 0.0);
            }
            for (out, s) in mix[offset..needed].iter_mut().zip(&note) {
                *out += s;
            }
        }

        let gain = pcm::normalize_peak(&mut mix);
        Ok(Mixdown { samples: mix, gain })
    }

    pub fn file_name(stamp: &DateTime<Local>) -> String {
        format!("recording_{}.wav", stamp.format("%Y%m%d_%H%M%S"))
    }

    /// Mix, encode and write a take. `Ok(None)` when there is nothing to write.
    pub fn render_to_file(
        &self,
        events: &[NoteEvent],
        stamp: &DateTime<Local>,
    ) -> SynthResult<Option<PathBuf>> {
        if events.is_empty() {
            return Ok(None);
        }

        let mix = self.mixdown(events)?;
        let frames = pcm::interleave_stereo(&mix.samples);
        let path = self.output_dir.join(Self::file_name(stamp));
        wav::write_stereo(&path, &frames, self.sample_rate)?;

        log::info!(
            "wrote {} ({} notes, {:.2}s, gain {:.3})",
            path.display(),
            events.len(),
            mix.samples.len() as f64 / self.sample_rate as f64,
            mix.gain
        );
        Ok(Some(path))
    }
}
