//! Reference audio output service.
//!
//! Runs on the audio thread: drains `VoiceCommand`s, loops every playing
//! cached voice at its gain and executes fades. The engine never hears back
//! from it; a handle that finishes fading is simply dropped here.

use std::sync::Arc;

use crate::{
    dsp::pcm::I16_SCALE,
    synth::{
        cache::CachedVoice,
        message::{CommandReceiver, VoiceCommand, VoiceHandle},
    },
};

/// Typical upper bound on simultaneous handles, including fading ones.
const PLAYING_CAPACITY: usize = 64;

struct Fade {
    remaining: u32,
    total: u32,
}

struct Playing {
    handle: VoiceHandle,
    voice: Arc<CachedVoice>,
    /// Frame index into the looping buffer
    position: usize,
    gain: f32,
    fade: Option<Fade>,
}

impl Playing {
    /// Next stereo frame, advancing the loop and any fade.
    fn next_frame(&mut self) -> (f32, f32) {
        let frames = self.voice.frames();
        if frames == 0 {
            return (0.0, 0.0);
        }

        let idx = self.position * 2;
        let left = self.voice.samples[idx] as f32 / I16_SCALE;
        let right = self.voice.samples[idx + 1] as f32 / I16_SCALE;
        self.position = (self.position + 1) % frames;

        let level = match &mut self.fade {
            Some(fade) => {
                let level = fade.remaining as f32 / fade.total as f32;
                fade.remaining = fade.remaining.saturating_sub(1);
                level
            }
            None => 1.0,
        };

        let gain = self.gain * level;
        (left * gain, right * gain)
    }

    fn finished(&self) -> bool {
        matches!(&self.fade, Some(fade) if fade.remaining == 0)
    }
}

pub struct PlaybackMixer<R: CommandReceiver> {
    rx: R,
    sample_rate: u32,
    playing: Vec<Playing>,
}

impl<R: CommandReceiver> PlaybackMixer<R> {
    pub fn new(rx: R, sample_rate: u32) -> Self {
        Self {
            rx,
            sample_rate,
            playing: Vec::with_capacity(PLAYING_CAPACITY),
        }
    }

    fn apply(&mut self, command: VoiceCommand) {
        match command {
            VoiceCommand::Play {
                handle,
                voice,
                volume,
            } => self.playing.push(Playing {
                handle,
                voice,
                position: 0,
                gain: volume,
                fade: None,
            }),
            VoiceCommand::FadeOut { handle, millis } => {
                let total = ((millis as u64 * self.sample_rate as u64) / 1000).max(1) as u32;
                if let Some(p) = self.playing.iter_mut().find(|p| p.handle == handle) {
                    // a fade already under way keeps the shorter remainder
                    let remaining = p.fade.as_ref().map_or(total, |f| f.remaining.min(total));
                    p.fade = Some(Fade { remaining, total });
                }
            }
            VoiceCommand::StopAll => self.playing.clear(),
        }
    }

    /// Apply pending commands, then render interleaved frames into `out`.
    ///
    /// The first two output channels receive left/right; mono outputs get
    /// their average and any extra channels repeat the left signal.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        while let Some(command) = self.rx.pop() {
            self.apply(command);
        }

        let channels = channels.max(1);
        for frame in out.chunks_mut(channels) {
            let (mut left, mut right) = (0.0f32, 0.0f32);
            for voice in &mut self.playing {
                let (l, r) = voice.next_frame();
                left += l;
                right += r;
            }

            let left = left.clamp(-1.0, 1.0);
            let right = right.clamp(-1.0, 1.0);
            match frame {
                [mono] => *mono = 0.5 * (left + right),
                [l, r, rest @ ..] => {
                    *l = left;
                    *r = right;
                    rest.fill(left);
                }
                [] => {}
            }

            self.playing.retain(|p| !p.finished());
        }
    }

    pub fn playing_count(&self) -> usize {
        self.playing.len()
    }

    pub fn is_playing(&self, handle: VoiceHandle) -> bool {
        self.playing.iter().any(|p| p.handle == handle)
    }
}
