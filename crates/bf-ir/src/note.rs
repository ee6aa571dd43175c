//! Note events and ADSR envelope parameters.

use crate::key::PianoKey;

slotmap::new_key_type! {
    /// Key referencing a preset in a `PresetBank`.
    pub struct PresetId;
}

/// Attack-decay-sustain-release envelope parameters.
///
/// Times are in milliseconds; `sustain` is an amplitude level in [0, 1].
/// The sustain segment length is derived from the note duration when the
/// envelope is realized, and deriving a negative length is an error there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adsr {
    pub attack_ms: f64,
    pub decay_ms: f64,
    pub sustain: f64,
    pub release_ms: f64,
}

impl Default for Adsr {
    fn default() -> Self {
        Self { attack_ms: 5.0, decay_ms: 30.0, sustain: 0.8, release_ms: 50.0 }
    }
}

/// A single note event inside a pattern.
///
/// `value` is the duration as a fraction of a whole note (1/4, 1/8, ...);
/// `pos_in_pattern` is the onset in beats from the pattern start. Notes are
/// immutable once created and owned by exactly one pattern core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub key: PianoKey,
    pub value: f64,
    pub pos_in_pattern: f64,
    pub generator: PresetId,
    pub adsr: Adsr,
}

impl Note {
    pub fn new(
        key: PianoKey,
        value: f64,
        pos_in_pattern: f64,
        generator: PresetId,
        adsr: Adsr,
    ) -> Self {
        Self { key, value, pos_in_pattern, generator, adsr }
    }
}
