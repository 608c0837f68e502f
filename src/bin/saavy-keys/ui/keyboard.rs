//! Two-row piano keyboard widget
//!
//! Each row draws its black keys, white keys and the notes they play at the
//! current octave. Sounding keys light up in their waveform's colour.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use saavy_keys::{
    io::keymap::{Keymap, LOWER_BLACK, LOWER_WHITE, UPPER_BLACK, UPPER_WHITE},
    EngineSnapshot,
};

use super::waveform_color;

/// Columns per white key
const CELL: usize = 4;

fn key_style(key: char, snapshot: &EngineSnapshot, idle: Color) -> Style {
    match snapshot.active_voices.get(&key) {
        Some(voice) => Style::default()
            .fg(Color::Black)
            .bg(waveform_color(voice.waveform))
            .add_modifier(Modifier::BOLD),
        None => Style::default().fg(idle),
    }
}

fn row_lines(
    white: &[char],
    black: &[(char, usize)],
    keymap: &Keymap,
    snapshot: &EngineSnapshot,
) -> [Line<'static>; 3] {
    // black keys sit between white slot i and i + 1
    let mut blacks = vec![Span::raw(" ".repeat(CELL / 2))];
    for slot in 0..white.len() {
        match black.iter().find(|(_, s)| *s == slot) {
            Some(&(key, _)) => blacks.push(Span::styled(
                format!("{:^width$}", key, width = CELL),
                key_style(key, snapshot, Color::Gray),
            )),
            None => blacks.push(Span::raw(" ".repeat(CELL))),
        }
    }

    let whites = white
        .iter()
        .map(|&key| {
            Span::styled(
                format!("{:^width$}", key, width = CELL),
                key_style(key, snapshot, Color::White),
            )
        })
        .collect::<Vec<_>>();

    let notes = white
        .iter()
        .map(|&key| {
            let label = keymap
                .note(key)
                .map(|(name, octave)| format!("{}{}", name.label(), octave))
                .unwrap_or_default();
            Span::styled(
                format!("{:^width$}", label, width = CELL),
                Style::default().fg(Color::DarkGray),
            )
        })
        .collect::<Vec<_>>();

    [Line::from(blacks), Line::from(whites), Line::from(notes)]
}

/// Render the keyboard, upper row on top
pub fn render_keyboard(frame: &mut Frame, area: Rect, keymap: &Keymap, snapshot: &EngineSnapshot) {
    let block = Block::default()
        .title(format!(" Keyboard - octave {} ", snapshot.octave))
        .borders(Borders::ALL);

    let mut lines = Vec::with_capacity(6);
    lines.extend(row_lines(&UPPER_WHITE, &UPPER_BLACK, keymap, snapshot));
    lines.extend(row_lines(&LOWER_WHITE, &LOWER_BLACK, keymap, snapshot));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
