//! Pitch realization: melodies and block chords from rhythmic templates.

use bf_ir::{chord_notes, scale_pitches, ChordOptions, PianoKey, ScaleType, TimeSignature};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::rhythm::{GenError, PlaceHolder};

/// A pitched, timed note ready to feed a pattern core:
/// `(key, note value, onset in beats)`.
pub type TimedKey = (PianoKey, f64, f64);

/// Realize a melody over rhythmic place-holders.
///
/// Every onset draws its pitch independently and uniformly from the seven
/// diatonic pitches of the scale; there is no melodic continuity
/// constraint between consecutive notes.
pub fn melody_from_rhythm(
    place_holders: &[PlaceHolder],
    seed: u64,
    root: &str,
    scale: ScaleType,
    octave: i32,
) -> Result<Vec<TimedKey>, GenError> {
    let pitches = scale_pitches(root, scale, octave)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(place_holders
        .iter()
        .map(|holder| {
            let pitch = pitches[rng.gen_range(0..pitches.len())];
            (pitch, holder.value, holder.start)
        })
        .collect())
}

/// Realize a degree progression as block chords.
///
/// Each degree is held for `bars_per_chord` bars, all chord tones sharing
/// one onset and the given note value.
pub fn chords_from_progression(
    degrees: &[u8],
    bars_per_chord: u32,
    root: &str,
    scale: ScaleType,
    octave: i32,
    options: &ChordOptions,
    value: f64,
    signature: TimeSignature,
) -> Result<Vec<TimedKey>, GenError> {
    let beats_per_chord = (bars_per_chord * signature.beats_per_bar()) as f64;
    let mut notes = Vec::new();
    for (i, &degree) in degrees.iter().enumerate() {
        let onset = i as f64 * beats_per_chord;
        for key in chord_notes(degree, root, scale, octave, options)? {
            notes.push((key, value, onset));
        }
    }
    Ok(notes)
}
