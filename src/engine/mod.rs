//! The engine context: one owner for the voice cache, live voices, the
//! recorder and the clock.
//!
//! Every operation runs to completion on the caller's thread. Live play and
//! recording are driven together, so for a given key the live voice and its
//! recorded note always see note-on and note-off in the same order.

pub mod clock;
pub mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use snapshot::EngineSnapshot;

use std::path::PathBuf;

use crate::{
    config::EngineConfig,
    dsp::Waveform,
    error::SynthResult,
    io::keymap::Keymap,
    record::{Recorder, Renderer},
    synth::{CommandSink, LiveVoices, VoiceCache, VoiceHandle, VoiceInfo},
};

pub const VOLUME_STEP: f64 = 0.05;
pub const MIN_VOLUME: f64 = 0.05;
pub const MAX_VOLUME: f64 = 1.0;

pub struct Engine<S: CommandSink, C: Clock = SystemClock> {
    config: EngineConfig,
    cache: VoiceCache,
    live: LiveVoices<S>,
    recorder: Recorder,
    keymap: Keymap,
    waveform: Waveform,
    volume: f64,
    /// Clock seconds of the last unanswered sustain tap
    last_sustain_tap: Option<f64>,
    clock: C,
}

impl<S: CommandSink, C: Clock> Engine<S, C> {
    pub fn new(config: EngineConfig, sink: S, clock: C) -> SynthResult<Self> {
        config.validate()?;

        let env = config.envelope;
        let cache = VoiceCache::new(config.sample_rate, env.live_adsr());
        let live = LiveVoices::new(sink, config.live_voice_duration, env.release);
        let recorder = Recorder::new(Renderer::new(&config));
        let keymap = Keymap::new(config.base_octave);

        log::debug!(
            "engine up: {} Hz, octave {}, output {}",
            config.sample_rate,
            config.base_octave,
            config.output_dir.display()
        );

        Ok(Self {
            volume: config.default_volume,
            config,
            cache,
            live,
            recorder,
            keymap,
            waveform: Waveform::default(),
            last_sustain_tap: None,
            clock,
        })
    }

    /* Notes ------------------------------------------------------------ */

    /// Start a voice for `key` and, if recording, open a note for it.
    /// Fails without sounding or recording anything when the frequency is
    /// not positive and finite or the volume is outside (0, 1].
    pub fn note_on(
        &mut self,
        key: char,
        freq: f64,
        waveform: Waveform,
        volume: f64,
    ) -> SynthResult<VoiceHandle> {
        let now = self.clock.now();
        let handle = self
            .live
            .note_on(&mut self.cache, key, freq, waveform, volume, now)?;
        self.recorder.note_on(key, freq, waveform, volume, now);
        Ok(handle)
    }

    /// Physical release of `key`. Returns whether the note ended; under
    /// sustain it keeps sounding and its recorded note stays open.
    pub fn note_off(&mut self, key: char) -> bool {
        let ended = self.live.note_off(key);
        if ended {
            self.recorder.note_off(key, self.clock.now());
        }
        ended
    }

    /// Play the note mapped to `ch` with the current waveform and volume.
    /// `Ok(false)` for keys the keymap does not cover.
    pub fn press_key(&mut self, ch: char) -> SynthResult<bool> {
        let key = ch.to_ascii_lowercase();
        let Some(freq) = self.keymap.frequency(key) else {
            return Ok(false);
        };
        self.note_on(key, freq, self.waveform, self.volume)?;
        Ok(true)
    }

    pub fn release_key(&mut self, ch: char) -> bool {
        self.note_off(ch.to_ascii_lowercase())
    }

    /* Sustain ---------------------------------------------------------- */

    /// Engage or release the pedal. Releasing it ends every voice and
    /// recorded note whose key is no longer held.
    pub fn set_sustain(&mut self, on: bool) {
        self.live.set_sustain(on);
        if !on {
            let now = self.clock.now();
            let unheld: Vec<char> = self
                .recorder
                .open_keys()
                .into_iter()
                .filter(|k| !self.live.is_held(*k))
                .collect();
            self.recorder.sustain_flush(unheld, now);
        }
    }

    pub fn toggle_sustain(&mut self) -> bool {
        let on = !self.live.sustain();
        self.set_sustain(on);
        on
    }

    /// One tap of the sustain key. A tap landing strictly inside the tap
    /// window of the previous one toggles the pedal; returns whether it did.
    /// Every tap becomes the reference for the next, so a quick run of taps
    /// toggles on each tap after the first.
    pub fn tap_sustain(&mut self) -> bool {
        let now = self.clock.now();
        let toggle = self
            .last_sustain_tap
            .is_some_and(|prev| now - prev < self.config.sustain_tap_window);
        self.last_sustain_tap = Some(now);
        if toggle {
            self.toggle_sustain();
        }
        toggle
    }

    /// Silence everything immediately and close every open recorded note.
    pub fn panic(&mut self) {
        log::debug!("panic with {} active voices", self.live.active_count());
        self.live.panic();
        self.recorder.flush_all(self.clock.now());
    }

    /// Per-frame housekeeping: fade voices left without a held key.
    pub fn update(&mut self) {
        let swept = self.live.sweep();
        if !swept.is_empty() {
            self.recorder.sustain_flush(swept, self.clock.now());
        }
    }

    /* Recording -------------------------------------------------------- */

    pub fn start_recording(&mut self) {
        self.recorder.start(self.clock.now());
    }

    /// Finish the take and write it. `Ok(None)` when there was nothing to
    /// record or no take running.
    pub fn stop_recording(&mut self) -> SynthResult<Option<PathBuf>> {
        let now = self.clock.now();
        let stamp = self.clock.wall_time();
        self.recorder.stop(now, &stamp)
    }

    pub fn toggle_recording(&mut self) -> SynthResult<Option<PathBuf>> {
        if self.recorder.is_recording() {
            self.stop_recording()
        } else {
            self.start_recording();
            Ok(None)
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /* Performance controls -------------------------------------------- */

    pub fn octave_up(&mut self) -> i32 {
        self.set_octave(self.keymap.base_octave() + 1)
    }

    pub fn octave_down(&mut self) -> i32 {
        self.set_octave(self.keymap.base_octave() - 1)
    }

    /// Rebuild the keymap at `octave`, clamped to the configured range.
    /// Voices already sounding are unaffected.
    pub fn set_octave(&mut self, octave: i32) -> i32 {
        let octave = octave.clamp(self.config.min_octave, self.config.max_octave);
        if octave != self.keymap.base_octave() {
            self.keymap = Keymap::new(octave);
        }
        octave
    }

    pub fn octave(&self) -> i32 {
        self.keymap.base_octave()
    }

    pub fn volume_up(&mut self) -> f64 {
        self.set_volume(self.volume + VOLUME_STEP)
    }

    pub fn volume_down(&mut self) -> f64 {
        self.set_volume(self.volume - VOLUME_STEP)
    }

    pub fn set_volume(&mut self, volume: f64) -> f64 {
        // snapped to the step grid
        let stepped = (volume / VOLUME_STEP).round() * VOLUME_STEP;
        self.volume = stepped.clamp(MIN_VOLUME, MAX_VOLUME);
        self.volume
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /* Views ------------------------------------------------------------ */

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            is_recording: self.recorder.is_recording(),
            sustain: self.live.sustain(),
            octave: self.keymap.base_octave(),
            waveform: self.waveform,
            volume: self.volume,
            recorded_notes: if self.recorder.is_recording() {
                self.recorder.take().events.len()
            } else {
                0
            },
            active_voices: self
                .live
                .active()
                .map(|v| (v.key, VoiceInfo::from(v)))
                .collect(),
            held_keys: self.live.held().collect(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn live(&self) -> &LiveVoices<S> {
        &self.live
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn cache(&self) -> &VoiceCache {
        &self.cache
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        self.live.sink()
    }
}
