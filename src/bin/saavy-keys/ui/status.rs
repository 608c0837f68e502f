//! Status bar and level meter widgets

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use saavy_keys::EngineSnapshot;

use super::waveform_color;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Render the status bar: octave, waveform, volume, sustain, recording
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    snapshot: &EngineSnapshot,
    message: &str,
    sample_rate: u32,
) {
    let block = Block::default().title(" saavy-keys ").borders(Borders::ALL);

    let (sustain, sustain_color) = if snapshot.sustain {
        ("Sustain ON  ", Color::Green)
    } else {
        ("Sustain off  ", Color::DarkGray)
    };

    let mut spans = vec![
        Span::styled(
            format!(" Octave {}  ", snapshot.octave),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{}  ", snapshot.waveform.name()),
            Style::default().fg(waveform_color(snapshot.waveform)),
        ),
        Span::styled(
            format!("Vol {:.2}  ", snapshot.volume),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(sustain, Style::default().fg(sustain_color)),
    ];
    if snapshot.is_recording {
        spans.push(Span::styled(
            format!("● REC {} notes  ", snapshot.recorded_notes),
            Style::default().fg(Color::Red),
        ));
    }
    spans.push(Span::styled(
        format!("{:.1}kHz  ", sample_rate as f64 / 1000.0),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Yellow),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Render the level meter: output peak blended with the summed volume of
/// the sounding voices
pub fn render_meter(frame: &mut Frame, area: Rect, snapshot: &EngineSnapshot, buffer: &[f32]) {
    let stats = AudioStats::from_buffer(buffer);
    let level = (0.7 * stats.peak as f64 + 0.3 * snapshot.level()).clamp(0.0, 1.0);

    let color = if stats.peak >= 0.99 {
        Color::Red
    } else if stats.peak >= 0.7 {
        Color::Yellow
    } else {
        Color::Green
    };

    let gauge = Gauge::default()
        .block(Block::default().title(" Level ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .ratio(level)
        .label(format!(
            "{} voices  Peak: {:.2}  RMS: {:.2}",
            snapshot.active_voices.len(),
            stats.peak,
            stats.rms
        ));

    frame.render_widget(gauge, area);
}
