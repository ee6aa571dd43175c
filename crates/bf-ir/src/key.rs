//! The 88-key keyboard: key indices, MIDI numbers and note names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of keys on the standard keyboard.
pub const KEY_COUNT: u8 = 88;

/// MIDI note number of key index 0 (A0).
pub const MIDI_OFFSET: u8 = 21;

const SEMITONE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Error type for music-theory lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TheoryError {
    /// Pitch falls outside the 88-key range (A0..=C8)
    KeyOutOfRange(i32),
    /// Note name could not be parsed
    UnknownKeyName(String),
    /// Scale degree outside 1..=7
    BadDegree(u8),
}

impl fmt::Display for TheoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TheoryError::KeyOutOfRange(midi) => {
                write!(f, "MIDI note {} is outside the 88-key range", midi)
            }
            TheoryError::UnknownKeyName(name) => write!(f, "unknown key name: {:?}", name),
            TheoryError::BadDegree(d) => write!(f, "scale degree {} outside 1..=7", d),
        }
    }
}

impl std::error::Error for TheoryError {}

/// A pitch on the 88-key keyboard.
///
/// Index 0 is A0 and index 87 is C8; the MIDI note number is always
/// `index + 21`, so A4 (index 48) is MIDI 69.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PianoKey(u8);

impl PianoKey {
    /// Create a key from its zero-based keyboard index.
    pub fn from_index(index: u8) -> Result<Self, TheoryError> {
        if index >= KEY_COUNT {
            return Err(TheoryError::KeyOutOfRange(index as i32 + MIDI_OFFSET as i32));
        }
        Ok(Self(index))
    }

    /// Create a key from a MIDI note number.
    pub fn from_midi(midi: i32) -> Result<Self, TheoryError> {
        let index = midi - MIDI_OFFSET as i32;
        if !(0..KEY_COUNT as i32).contains(&index) {
            return Err(TheoryError::KeyOutOfRange(midi));
        }
        Ok(Self(index as u8))
    }

    /// Zero-based keyboard index (0..88).
    pub fn index(self) -> u8 {
        self.0
    }

    /// MIDI note number (21..=108).
    pub fn midi(self) -> u8 {
        self.0 + MIDI_OFFSET
    }

    /// Semitone within the octave (0 = C .. 11 = B).
    pub fn semitone(self) -> u8 {
        self.midi() % 12
    }

    /// Scientific-pitch octave number (A4 is in octave 4).
    pub fn octave(self) -> i32 {
        self.midi() as i32 / 12 - 1
    }

    /// Shift by a signed number of semitones.
    pub fn transpose(self, semitones: i32) -> Result<Self, TheoryError> {
        Self::from_midi(self.midi() as i32 + semitones)
    }
}

impl fmt::Display for PianoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SEMITONE_NAMES[self.semitone() as usize], self.octave())
    }
}

impl FromStr for PianoKey {
    type Err = TheoryError;

    /// Parse names like "C5", "A#6" or "F#0".
    fn from_str(s: &str) -> Result<Self, TheoryError> {
        let err = || TheoryError::UnknownKeyName(s.to_string());
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(err)?;
        let base = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(err()),
        };
        let rest = chars.as_str();
        let (accidental, octave_str) = match rest.strip_prefix('#') {
            Some(tail) => (1, tail),
            None => match rest.strip_prefix('b') {
                Some(tail) => (-1, tail),
                None => (0, rest),
            },
        };
        let octave: i32 = octave_str.parse().map_err(|_| err())?;
        let midi = (octave + 1) * 12 + base + accidental;
        Self::from_midi(midi)
    }
}
