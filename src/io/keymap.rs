/*
Computer Keyboard → Notes
=========================

Two rows of ten "white" keys, each with five "black" keys in the row
above it, laid out like a piano:

     2 3   5 6 7              s d   g h j
    q w e r t y u i o p      z x c v b n m , . /
    C D E F G A B C D E      C D E F G A B C D E

The lower row starts at the base octave, the upper row one octave higher.
The last three white keys of each row (C D E) spill into the next octave.
Letters map the same in either case.

Pitch
-----

    midi = 12 * (octave + 1) + semitone       C4 = 60
    freq = 440 * 2^((midi - 69) / 12)         A4 = 69 = 440 Hz
*/

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl NoteName {
    pub fn semitone(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::Cs => "C#",
            NoteName::D => "D",
            NoteName::Ds => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::Fs => "F#",
            NoteName::G => "G",
            NoteName::Gs => "G#",
            NoteName::A => "A",
            NoteName::As => "A#",
            NoteName::B => "B",
        }
    }
}

pub fn note_to_midi(name: NoteName, octave: i32) -> i32 {
    12 * (octave + 1) + name.semitone()
}

pub fn midi_to_freq(midi: i32) -> f64 {
    440.0 * 2.0_f64.powf((midi - 69) as f64 / 12.0)
}

pub const LOWER_WHITE: [char; 10] = ['z', 'x', 'c', 'v', 'b', 'n', 'm', ',', '.', '/'];
pub const UPPER_WHITE: [char; 10] = ['q', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o', 'p'];
/// Black keys with the white-key slot each sits after
pub const LOWER_BLACK: [(char, usize); 5] = [('s', 0), ('d', 1), ('g', 3), ('h', 4), ('j', 5)];
pub const UPPER_BLACK: [(char, usize); 5] = [('2', 0), ('3', 1), ('5', 3), ('6', 4), ('7', 5)];

const WHITE_NOTES: [NoteName; 10] = [
    NoteName::C,
    NoteName::D,
    NoteName::E,
    NoteName::F,
    NoteName::G,
    NoteName::A,
    NoteName::B,
    NoteName::C,
    NoteName::D,
    NoteName::E,
];
const BLACK_NOTES: [NoteName; 5] = [NoteName::Cs, NoteName::Ds, NoteName::Fs, NoteName::Gs, NoteName::As];

/// Key → (note, octave) for a given base octave.
#[derive(Debug, Clone)]
pub struct Keymap {
    base_octave: i32,
    keys: HashMap<char, (NoteName, i32)>,
}

impl Keymap {
    pub fn new(base_octave: i32) -> Self {
        let mut keys = HashMap::new();

        for (row, white, black) in [(0, &LOWER_WHITE, &LOWER_BLACK), (1, &UPPER_WHITE, &UPPER_BLACK)] {
            let octave = base_octave + row;
            for (i, (&key, &name)) in white.iter().zip(WHITE_NOTES.iter()).enumerate() {
                let spill = if i >= 7 { 1 } else { 0 };
                insert_both_cases(&mut keys, key, (name, octave + spill));
            }
            for (&(key, _), &name) in black.iter().zip(BLACK_NOTES.iter()) {
                insert_both_cases(&mut keys, key, (name, octave));
            }
        }

        Self { base_octave, keys }
    }

    pub fn base_octave(&self) -> i32 {
        self.base_octave
    }

    pub fn note(&self, key: char) -> Option<(NoteName, i32)> {
        self.keys.get(&key).copied()
    }

    pub fn frequency(&self, key: char) -> Option<f64> {
        self.note(key)
            .map(|(name, octave)| midi_to_freq(note_to_midi(name, octave)))
    }

    pub fn contains(&self, key: char) -> bool {
        self.keys.contains_key(&key)
    }
}

fn insert_both_cases(keys: &mut HashMap<char, (NoteName, i32)>, key: char, note: (NoteName, i32)) {
    keys.insert(key, note);
    keys.insert(key.to_ascii_uppercase(), note);
}
