// Purpose - external interfaces: computer-keyboard mapping, WAV files

pub mod keymap;
pub mod wav;

pub use keymap::{midi_to_freq, note_to_midi, Keymap, NoteName};
