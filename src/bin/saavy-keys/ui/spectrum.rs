//! Output spectrum widget
//!
//! Hann-windowed FFT of the most recent output samples, read at
//! log-spaced frequencies and drawn on a log-frequency axis in dBFS.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of points drawn
const SPECTRUM_BINS: usize = 64;

const FLOOR_DB: f64 = -90.0;

/// dB lost per frame once a bin stops being fed
const FALLOFF_DB: f64 = 3.0;

const MIN_FREQ: f64 = 30.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// Sum of the window, full-scale reference for dBFS
    window_gain: f32,
    /// FFT bin read for each drawn point
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 Hz, dBFS) per drawn point
    points: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_len);

        let window: Vec<f32> = (0..fft_len)
            .map(|i| {
                if fft_len > 1 {
                    let denom = (fft_len - 1) as f32;
                    0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
                } else {
                    1.0
                }
            })
            .collect();
        let window_gain = window.iter().sum::<f32>().max(f32::EPSILON);

        let nyquist = (sample_rate as f64 / 2.0).min(20_000.0).max(MIN_FREQ * 2.0);
        let ratio = nyquist / MIN_FREQ;
        let last_bin = (fft_len / 2).max(1) - 1;

        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        let mut points = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let freq = MIN_FREQ * ratio.powf(t);
            let index = (freq * fft_len as f64 / sample_rate as f64).round() as usize;
            bin_indices.push(index.min(last_bin));
            points.push((freq.log10(), FLOOR_DB));
        }

        Self {
            window,
            window_gain,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            points,
        }
    }

    /// Analyze `buffer`, which must be exactly the FFT length.
    ///
    /// Rising bins jump to the new level; falling bins decay by
    /// `FALLOFF_DB` per call so short notes stay visible.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((out, sample), w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *out = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // single-sided amplitude relative to a full-scale sine
        let scale = 2.0 / self.window_gain;
        for (point, &idx) in self.points.iter_mut().zip(&self.bin_indices) {
            let amplitude = (self.scratch[idx].norm() * scale).max(1e-9) as f64;
            let db = (20.0 * amplitude.log10()).max(FLOOR_DB);
            point.1 = db.max(point.1 - FALLOFF_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// Render the spectrum chart
pub fn render_spectrum(frame: &mut Frame, area: Rect, points: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(points);

    let min_x = points.first().map_or(MIN_FREQ.log10(), |p| p.0);
    let max_x = points.last().map_or(4.3, |p| p.0).max(min_x + 1.0);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_x, max_x])
                .labels(vec![Span::raw("30"), Span::raw("1k"), Span::raw("20k")])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec![Span::raw("-90"), Span::raw("-45"), Span::raw("0")])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
