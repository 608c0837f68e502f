//! Live voice management: key → sounding voice, sustain pedal and panic.
//!
//! Voices are cached loops started on the output service with a `Play`
//! command. Releasing one issues a `FadeOut` and forgets the handle at
//! once; the service finishes the fade on its own. A key pressed again
//! before that fade completes simply gets a new handle.

use std::collections::{HashMap, HashSet};

use crate::{
    dsp::{self, Waveform},
    error::SynthResult,
    synth::{
        cache::VoiceCache,
        message::{CommandSink, VoiceCommand, VoiceHandle},
        voice::ActiveVoice,
    },
};

pub struct LiveVoices<S: CommandSink> {
    sink: S,
    active: HashMap<char, ActiveVoice>,
    held: HashSet<char>,
    sustain: bool,
    /// Length of each cached loop in seconds
    loop_duration: f64,
    /// Fade issued on release
    fade_millis: u32,
    next_handle: u64,
}

impl<S: CommandSink> LiveVoices<S> {
    pub fn new(sink: S, loop_duration: f64, release: f64) -> Self {
        Self {
            sink,
            active: HashMap::new(),
            held: HashSet::new(),
            sustain: false,
            loop_duration,
            fade_millis: (release * 1000.0).round() as u32,
            next_handle: 1,
        }
    }

    /// Start a looping voice for `key` and mark the key held.
    ///
    /// A voice already sounding on `key` is superseded: the new handle
    /// becomes the one later releases act on, and the old one is faded so
    /// it does not loop on unreferenced.
    pub fn note_on(
        &mut self,
        cache: &mut VoiceCache,
        key: char,
        freq: f64,
        waveform: Waveform,
        volume: f64,
        now: f64,
    ) -> SynthResult<VoiceHandle> {
        dsp::validate_volume(volume)?;
        let voice = cache.get_or_create(waveform, freq, self.loop_duration)?;

        let handle = VoiceHandle(self.next_handle);
        self.next_handle += 1;

        self.sink.send(VoiceCommand::Play {
            handle,
            voice,
            volume: volume as f32,
        });

        let previous = self.active.insert(
            key,
            ActiveVoice {
                key,
                handle,
                started_at: now,
                frequency: freq,
                waveform,
                volume,
            },
        );
        if let Some(previous) = previous {
            self.fade(previous.handle);
        }
        self.held.insert(key);

        Ok(handle)
    }

    /// Physical key release.
    ///
    /// Returns true when the key was held and sustain is off, i.e. when the
    /// note actually ended. With sustain engaged the voice keeps sounding
    /// until the pedal is released or `panic` is called.
    pub fn note_off(&mut self, key: char) -> bool {
        if !self.held.remove(&key) {
            return false;
        }
        if self.sustain {
            return false;
        }
        if let Some(voice) = self.active.remove(&key) {
            self.fade(voice.handle);
        }
        true
    }

    /// Engage or release the sustain pedal.
    ///
    /// Releasing it fades every voice whose key is no longer held and
    /// returns those keys.
    pub fn set_sustain(&mut self, on: bool) -> Vec<char> {
        self.sustain = on;
        if on {
            Vec::new()
        } else {
            self.release_unheld()
        }
    }

    /// Fade any voice whose key was let go while nothing is sustaining it.
    pub fn sweep(&mut self) -> Vec<char> {
        if self.sustain {
            Vec::new()
        } else {
            self.release_unheld()
        }
    }

    /// Stop every voice at once and forget all held keys. No fades.
    pub fn panic(&mut self) {
        self.sink.send(VoiceCommand::StopAll);
        self.active.clear();
        self.held.clear();
    }

    fn release_unheld(&mut self) -> Vec<char> {
        // snapshot first, the table is mutated below
        let keys: Vec<char> = self
            .active
            .keys()
            .filter(|k| !self.held.contains(*k))
            .copied()
            .collect();

        for key in &keys {
            if let Some(voice) = self.active.remove(key) {
                self.fade(voice.handle);
            }
        }
        keys
    }

    fn fade(&mut self, handle: VoiceHandle) {
        log::debug!("fading voice {handle:?} over {}ms", self.fade_millis);
        self.sink.send(VoiceCommand::FadeOut {
            handle,
            millis: self.fade_millis,
        });
    }

    pub fn is_held(&self, key: char) -> bool {
        self.held.contains(&key)
    }

    pub fn held(&self) -> impl Iterator<Item = char> + '_ {
        self.held.iter().copied()
    }

    pub fn sustain(&self) -> bool {
        self.sustain
    }

    pub fn active(&self) -> impl Iterator<Item = &ActiveVoice> {
        self.active.values()
    }

    pub fn voice(&self, key: char) -> Option<&ActiveVoice> {
        self.active.get(&key)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dsp::Adsr, error::SynthError};

    fn setup() -> (LiveVoices<Vec<VoiceCommand>>, VoiceCache) {
        let voices = LiveVoices::new(Vec::new(), 0.1, 0.12);
        let cache = VoiceCache::new(8_000, Adsr::new(0.005, 0.08, 0.85, 0.4));
        (voices, cache)
    }

    fn fades(commands: &[VoiceCommand]) -> Vec<VoiceHandle> {
        commands
            .iter()
            .filter_map(|c| match c {
                VoiceCommand::FadeOut { handle, millis } => {
                    assert_eq!(*millis, 120);
                    Some(*handle)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn press_and_release_fades_voice() {
        let (mut voices, mut cache) = setup();
        let handle = voices
            .note_on(&mut cache, 'z', 261.63, Waveform::Sine, 0.6, 0.0)
            .unwrap();
        assert_eq!(voices.active_count(), 1);
        assert!(voices.is_held('z'));

        assert!(voices.note_off('z'));
        assert_eq!(voices.active_count(), 0);
        assert_eq!(fades(voices.sink()), vec![handle]);

        match &voices.sink()[0] {
            VoiceCommand::Play { handle: h, volume, .. } => {
                assert_eq!(*h, handle);
                assert!((volume - 0.6).abs() < 1e-6);
            }
            other => panic!("expected Play, got {other:?}"),
        }
    }

    #[test]
    fn release_of_unheld_key_is_ignored() {
        let (mut voices, _) = setup();
        assert!(!voices.note_off('q'));
        assert!(voices.sink().is_empty());
    }

    #[test]
    fn sustain_keeps_voice_until_pedal_release() {
        let (mut voices, mut cache) = setup();
        voices.set_sustain(true);
        let handle = voices
            .note_on(&mut cache, 'x', 293.66, Waveform::Saw, 0.6, 0.0)
            .unwrap();

        assert!(!voices.note_off('x'));
        assert!(!voices.is_held('x'));
        assert_eq!(voices.active_count(), 1);
        assert!(fades(voices.sink()).is_empty());

        assert_eq!(voices.set_sustain(false), vec!['x']);
        assert_eq!(voices.active_count(), 0);
        assert_eq!(fades(voices.sink()), vec![handle]);
    }

    #[test]
    fn pedal_release_spares_held_keys() {
        let (mut voices, mut cache) = setup();
        voices.set_sustain(true);
        voices
            .note_on(&mut cache, 'x', 293.66, Waveform::Sine, 0.6, 0.0)
            .unwrap();
        voices
            .note_on(&mut cache, 'c', 329.63, Waveform::Sine, 0.6, 0.0)
            .unwrap();
        voices.note_off('x');

        assert_eq!(voices.set_sustain(false), vec!['x']);
        assert!(voices.voice('c').is_some());
    }

    #[test]
    fn repress_supersedes_previous_handle() {
        let (mut voices, mut cache) = setup();
        let first = voices
            .note_on(&mut cache, 'v', 349.23, Waveform::Sine, 0.6, 0.0)
            .unwrap();
        let second = voices
            .note_on(&mut cache, 'v', 349.23, Waveform::Sine, 0.6, 0.1)
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(voices.voice('v').map(|v| v.handle), Some(second));
        assert_eq!(fades(voices.sink()), vec![first]);

        voices.note_off('v');
        assert_eq!(fades(voices.sink()), vec![first, second]);
    }

    #[test]
    fn panic_clears_everything_without_fades() {
        let (mut voices, mut cache) = setup();
        voices.set_sustain(true);
        for (key, freq) in [('z', 261.63), ('x', 293.66), ('c', 329.63)] {
            voices
                .note_on(&mut cache, key, freq, Waveform::Square, 0.6, 0.0)
                .unwrap();
        }
        voices.note_off('z');

        voices.panic();
        assert_eq!(voices.active_count(), 0);
        assert_eq!(voices.held_count(), 0);
        assert!(fades(voices.sink()).is_empty());
        assert!(matches!(voices.sink().last(), Some(VoiceCommand::StopAll)));
    }

    #[test]
    fn sweep_fades_orphans_only_without_sustain() {
        let (mut voices, mut cache) = setup();
        voices
            .note_on(&mut cache, 'b', 392.0, Waveform::Sine, 0.6, 0.0)
            .unwrap();
        voices.held.remove(&'b');

        voices.set_sustain(true);
        assert!(voices.sweep().is_empty());
        voices.sustain = false;
        assert_eq!(voices.sweep(), vec!['b']);
    }

    #[test]
    fn invalid_frequency_starts_nothing() {
        let (mut voices, mut cache) = setup();
        let result = voices.note_on(&mut cache, 'n', -1.0, Waveform::Sine, 0.6, 0.0);
        assert!(matches!(result, Err(SynthError::InvalidFrequency { .. })));
        assert_eq!(voices.active_count(), 0);
        assert!(!voices.is_held('n'));
        assert!(voices.sink().is_empty());
    }
}
