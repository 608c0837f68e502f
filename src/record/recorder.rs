//! Take recording: note-on/off timestamps captured alongside live play.

use std::{collections::HashMap, path::PathBuf};

use chrono::{DateTime, Local};

use crate::{
    dsp::Waveform,
    error::SynthResult,
    record::{event::NoteEvent, render::Renderer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// One recording session.
#[derive(Debug, Clone, PartialEq)]
pub struct Take {
    pub sample_rate: u32,
    /// Engine clock seconds at `start`
    pub start_reference: f64,
    /// In note-on order
    pub events: Vec<NoteEvent>,
    /// key → index into `events` of its open note
    open_by_key: HashMap<char, usize>,
}

impl Take {
    fn new(sample_rate: u32, start_reference: f64) -> Self {
        Self {
            sample_rate,
            start_reference,
            events: Vec::new(),
            open_by_key: HashMap::new(),
        }
    }

    fn relative(&self, now: f64) -> f64 {
        (now - self.start_reference).max(0.0)
    }

    /// Close the open note for `key`, if any.
    fn close(&mut self, key: char, now: f64) -> bool {
        let at = self.relative(now);
        match self.open_by_key.remove(&key) {
            Some(idx) => self.events[idx].close(at),
            None => false,
        }
    }

    /// Close every note still open, including ones no longer indexed by key.
    fn close_all(&mut self, now: f64) {
        let at = self.relative(now);
        for event in &mut self.events {
            event.close(at);
        }
        self.open_by_key.clear();
    }
}

pub struct Recorder {
    state: RecorderState,
    take: Take,
    renderer: Renderer,
}

impl Recorder {
    pub fn new(renderer: Renderer) -> Self {
        let take = Take::new(renderer.sample_rate(), 0.0);
        Self {
            state: RecorderState::Idle,
            take,
            renderer,
        }
    }

    /// Begin a new take, discarding whatever the previous one held.
    pub fn start(&mut self, now: f64) {
        if self.is_recording() && !self.take.events.is_empty() {
            log::warn!(
                "restarting take, discarding {} unsaved notes",
                self.take.events.len()
            );
        }
        self.take = Take::new(self.renderer.sample_rate(), now);
        self.state = RecorderState::Recording;
        log::info!("recording started");
    }

    /// Append an open note for `key`. A note already open on `key` stays in
    /// the take but is no longer tracked; only `stop` will close it.
    pub fn note_on(&mut self, key: char, freq: f64, waveform: Waveform, volume: f64, now: f64) {
        if !self.is_recording() {
            return;
        }
        let start = self.take.relative(now);
        self.take
            .events
            .push(NoteEvent::open(start, freq, waveform, volume));
        let idx = self.take.events.len() - 1;
        self.take.open_by_key.insert(key, idx);
    }

    pub fn note_off(&mut self, key: char, now: f64) {
        if self.is_recording() {
            self.take.close(key, now);
        }
    }

    /// Close the open notes of every key in `keys` at the same instant.
    pub fn sustain_flush<I>(&mut self, keys: I, now: f64)
    where
        I: IntoIterator<Item = char>,
    {
        if !self.is_recording() {
            return;
        }
        for key in keys {
            self.take.close(key, now);
        }
    }

    /// Close every open note at once, orphans included. Recording continues.
    pub fn flush_all(&mut self, now: f64) {
        if self.is_recording() {
            self.take.close_all(now);
        }
    }

    /// Close all open notes, go idle and hand back the finished take.
    pub fn finish(&mut self, now: f64) -> Option<Take> {
        if !self.is_recording() {
            return None;
        }
        self.state = RecorderState::Idle;
        let mut take = std::mem::replace(
            &mut self.take,
            Take::new(self.renderer.sample_rate(), now),
        );
        take.close_all(now);
        log::info!("recording stopped with {} notes", take.events.len());
        Some(take)
    }

    /// Stop the take and render it.
    ///
    /// The recorder is idle before rendering starts, so an encoding failure
    /// loses this take but never leaves the recorder stuck recording.
    pub fn stop(&mut self, now: f64, stamp: &DateTime<Local>) -> SynthResult<Option<PathBuf>> {
        let Some(take) = self.finish(now) else {
            return Ok(None);
        };
        let result = self.renderer.render_to_file(&take.events, stamp);
        if let Err(err) = &result {
            log::warn!("render of {} notes failed: {err}", take.events.len());
        }
        result
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn take(&self) -> &Take {
        &self.take
    }

    /// Keys whose notes are currently open.
    pub fn open_keys(&self) -> Vec<char> {
        self.take.open_by_key.keys().copied().collect()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}
