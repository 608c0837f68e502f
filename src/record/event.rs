#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::Waveform;

/// End of a recorded note.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEnd {
    /// Key still down (or sustained)
    Open,
    /// Seconds since the take started
    Closed(f64),
}

impl NoteEnd {
    pub fn is_open(self) -> bool {
        matches!(self, NoteEnd::Open)
    }
}

/// One note captured during a take. Times are take-relative seconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub start: f64,
    pub end: NoteEnd,
    pub frequency: f64,
    pub waveform: Waveform,
    pub volume: f64,
}

impl NoteEvent {
    pub fn open(start: f64, frequency: f64, waveform: Waveform, volume: f64) -> Self {
        Self {
            start,
            end: NoteEnd::Open,
            frequency,
            waveform,
            volume,
        }
    }

    /// Close the note at `at` if it is still open. Returns whether it was.
    pub fn close(&mut self, at: f64) -> bool {
        match self.end {
            NoteEnd::Open => {
                self.end = NoteEnd::Closed(at.max(self.start));
                true
            }
            NoteEnd::Closed(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_only_once() {
        let mut ev = NoteEvent::open(1.0, 440.0, Waveform::Sine, 0.6);
        assert!(ev.end.is_open());
        assert!(ev.close(1.5));
        assert!(!ev.close(2.0));
        assert_eq!(ev.end, NoteEnd::Closed(1.5));
    }

    #[test]
    fn close_never_precedes_start() {
        let mut ev = NoteEvent::open(1.0, 440.0, Waveform::Saw, 0.6);
        ev.close(0.5);
        assert_eq!(ev.end, NoteEnd::Closed(1.0));
    }
}
