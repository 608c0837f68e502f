//! TUI module for saavy-keys
//!
//! Owns the engine on the UI thread: turns key events into engine calls and
//! draws the keyboard, status line, level meter and output spectrum.

mod keyboard;
mod spectrum;
mod status;

use std::{
    collections::HashMap,
    path::PathBuf,
    time::{Duration, Instant},
};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use saavy_keys::{synth::VoiceCommand, Engine, EngineSnapshot, Waveform};

use keyboard::render_keyboard;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_meter, render_status};

/// Samples kept for the spectrum (FFT size)
const VIS_BUFFER_SIZE: usize = 1024;

/// Ring capacity for samples tapped from the audio callback
pub const SCOPE_CAPACITY: usize = 8 * VIS_BUFFER_SIZE;

/// Without key-release events a note ends this long after its last
/// (auto-repeated) press.
const AUTO_RELEASE: Duration = Duration::from_millis(700);

pub fn waveform_color(waveform: Waveform) -> Color {
    match waveform {
        Waveform::Sine => Color::Cyan,
        Waveform::Square => Color::Yellow,
        Waveform::Saw => Color::Magenta,
    }
}

pub struct KeysUi {
    engine: Engine<Producer<VoiceCommand>>,
    /// Ring buffer receiver for output samples
    scope_rx: Consumer<f32>,
    scope: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    sample_rate: u32,
    /// Whether the terminal reports key releases
    key_releases: bool,
    /// key → deadline, used only when `key_releases` is false
    auto_release: HashMap<char, Instant>,
    status: String,
    should_quit: bool,
}

impl KeysUi {
    pub fn new(
        engine: Engine<Producer<VoiceCommand>>,
        scope_rx: Consumer<f32>,
        sample_rate: u32,
        key_releases: bool,
    ) -> Self {
        let status = if key_releases {
            "ready".to_string()
        } else {
            "terminal sends no key releases: notes end shortly after the key".to_string()
        };
        Self {
            engine,
            scope_rx,
            scope: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate as f32),
            sample_rate,
            key_releases,
            auto_release: HashMap::new(),
            status,
            should_quit: false,
        }
    }

    /// Run the UI event loop. On quit a running take is stopped and
    /// rendered; its path is returned.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<Option<PathBuf>> {
        while !self.should_quit {
            self.poll_scope();
            self.release_expired();
            self.engine.update();

            let snapshot = self.engine.snapshot();
            terminal.draw(|frame| self.render(frame, &snapshot))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }

        if self.engine.is_recording() {
            return self
                .engine
                .stop_recording()
                .wrap_err("failed to save the take on exit");
        }
        Ok(None)
    }

    fn poll_scope(&mut self) {
        let mut fresh = false;
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
            fresh = true;
        }
        if self.scope.len() > VIS_BUFFER_SIZE {
            let excess = self.scope.len() - VIS_BUFFER_SIZE;
            self.scope.drain(0..excess);
        }
        if fresh {
            self.spectrum.update(&self.scope);
        }
    }

    fn release_expired(&mut self) {
        let now = Instant::now();
        let expired: Vec<char> = self
            .auto_release
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| *key)
            .collect();
        for key in expired {
            self.auto_release.remove(&key);
            self.engine.release_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Repeat {
            return;
        }
        let pressed = key.kind == KeyEventKind::Press;

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if pressed {
                    self.should_quit = true;
                }
            }
            KeyCode::Char(ch) if self.engine.keymap().contains(ch) => {
                if pressed {
                    self.press(ch);
                } else {
                    self.engine.release_key(ch);
                }
            }
            _ if !pressed => {}
            KeyCode::Char(' ') => {
                if self.engine.tap_sustain() {
                    let state = if self.engine.snapshot().sustain { "on" } else { "off" };
                    self.status = format!("sustain {state}");
                }
            }
            KeyCode::Char('[') => {
                let octave = self.engine.octave_down();
                self.status = format!("octave {octave}");
            }
            KeyCode::Char(']') => {
                let octave = self.engine.octave_up();
                self.status = format!("octave {octave}");
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let volume = self.engine.volume_up();
                self.status = format!("volume {volume:.2}");
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                let volume = self.engine.volume_down();
                self.status = format!("volume {volume:.2}");
            }
            KeyCode::F(n @ 1..=3) => {
                let waveform = Waveform::ALL[(n - 1) as usize];
                self.engine.set_waveform(waveform);
                self.status = format!("waveform {}", waveform.name());
            }
            KeyCode::Enter => self.toggle_recording(),
            KeyCode::Esc => {
                self.engine.panic();
                self.auto_release.clear();
                self.status = "panic: all voices stopped".to_string();
            }
            _ => {}
        }
    }

    fn press(&mut self, ch: char) {
        let key = ch.to_ascii_lowercase();
        if !self.key_releases {
            // auto-repeat only pushes the deadline back
            let deadline = Instant::now() + AUTO_RELEASE;
            if self.auto_release.insert(key, deadline).is_some() {
                return;
            }
        }
        if let Err(err) = self.engine.press_key(key) {
            self.status = format!("note failed: {err}");
        }
    }

    fn toggle_recording(&mut self) {
        self.status = match self.engine.toggle_recording() {
            Ok(Some(path)) => format!("saved {}", path.display()),
            Ok(None) if self.engine.is_recording() => "recording".to_string(),
            Ok(None) => "take was empty, nothing saved".to_string(),
            Err(err) => format!("render failed: {err}"),
        };
    }

    fn render(&self, frame: &mut Frame, snapshot: &EngineSnapshot) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(8), // Keyboard
                Constraint::Length(3), // Level meter
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_status(frame, chunks[0], snapshot, &self.status, self.sample_rate);
        render_keyboard(frame, chunks[1], self.engine.keymap(), snapshot);
        render_meter(frame, chunks[2], snapshot, &self.scope);
        render_spectrum(frame, chunks[3], self.spectrum.data());

        let help = Paragraph::new(
            " [Space x2] Sustain  [ [ ] ] Octave  [F1-F3] Wave  [+/-] Volume  [Enter] Rec  [Esc] Panic  [Ctrl-C] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
