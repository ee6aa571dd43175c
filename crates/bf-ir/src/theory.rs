//! Diatonic scales and chord construction tables.

use crate::key::{PianoKey, TheoryError};

/// Scale flavor (natural minor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleType {
    Major,
    Minor,
}

impl ScaleType {
    /// Semitone offsets of the seven scale degrees above the tonic.
    pub fn steps(self) -> [i32; 7] {
        match self {
            ScaleType::Major => [0, 2, 4, 5, 7, 9, 11],
            ScaleType::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    /// Triad quality built on each scale degree.
    pub fn qualities(self) -> [ChordQuality; 7] {
        use ChordQuality::{Diminished as D, Major as M, Minor as Mi};
        match self {
            ScaleType::Major => [M, Mi, Mi, M, M, Mi, D],
            ScaleType::Minor => [Mi, D, M, Mi, Mi, M, M],
        }
    }
}

/// Triad quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
}

impl ChordQuality {
    /// Semitone intervals of the raw triad above the chord root.
    pub fn intervals(self) -> [i32; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
            ChordQuality::Diminished => [0, 3, 6],
        }
    }
}

/// Voicing modifications applied on top of a raw triad.
#[derive(Clone, Debug, Default)]
pub struct ChordOptions {
    /// Remove the middle note of the raw triad (index 1, before sorting)
    pub drop_second: bool,
    /// Duplicate the chord root one octave down
    pub add_low_octave: bool,
    /// Duplicate the chord root one octave up
    pub add_high_octave: bool,
    /// Extra semitone intervals above the chord root (9ths, 11ths, ...)
    pub decorations: Vec<i32>,
}

/// The tonic of `root` (e.g. "C") in the given scientific octave.
fn tonic(root: &str, octave: i32) -> Result<PianoKey, TheoryError> {
    format!("{}{}", root, octave).parse()
}

/// The seven diatonic pitches of a scale, ascending from the tonic.
pub fn scale_pitches(
    root: &str,
    scale: ScaleType,
    octave: i32,
) -> Result<[PianoKey; 7], TheoryError> {
    let tonic = tonic(root, octave)?;
    let steps = scale.steps();
    let mut pitches = [tonic; 7];
    for (pitch, step) in pitches.iter_mut().zip(steps) {
        *pitch = tonic.transpose(step)?;
    }
    Ok(pitches)
}

/// Build the chord on a scale degree (1..=7), sorted ascending.
///
/// The raw triad follows the degree→quality table for the scale; voicing
/// modifications (`ChordOptions`) are applied relative to the chord root
/// before the final sort.
pub fn chord_notes(
    degree: u8,
    root: &str,
    scale: ScaleType,
    octave: i32,
    options: &ChordOptions,
) -> Result<Vec<PianoKey>, TheoryError> {
    if !(1..=7).contains(&degree) {
        return Err(TheoryError::BadDegree(degree));
    }
    let tonic = tonic(root, octave)?;
    let chord_root = tonic.transpose(scale.steps()[degree as usize - 1])?;
    let quality = scale.qualities()[degree as usize - 1];

    let mut keys = Vec::with_capacity(5);
    for interval in quality.intervals() {
        keys.push(chord_root.transpose(interval)?);
    }
    if options.drop_second {
        keys.remove(1);
    }
    if options.add_low_octave {
        keys.push(chord_root.transpose(-12)?);
    }
    if options.add_high_octave {
        keys.push(chord_root.transpose(12)?);
    }
    for &interval in &options.decorations {
        keys.push(chord_root.transpose(interval)?);
    }
    keys.sort();
    Ok(keys)
}
