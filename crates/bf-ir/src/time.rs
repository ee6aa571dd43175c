//! Beat-based timing: signatures, tempo contexts, sample-index conversion.
//!
//! Beats are the universal time coordinate. Every entity that ends up
//! summed into one buffer shares a `Tempo`, which maps beat positions to
//! absolute sample indices at a fixed rate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type for timing configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeError {
    /// Time signature string was not "N/D" with positive integers
    MalformedSignature(String),
    /// Duration string was not "HH:MM:SS", "MM:SS" or "SS"
    MalformedDuration(String),
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeError::MalformedSignature(s) => write!(f, "malformed time signature: {:?}", s),
            TimeError::MalformedDuration(s) => write!(f, "malformed duration: {:?}", s),
        }
    }
}

impl std::error::Error for TimeError {}

/// A time signature: beats per bar over the note value receiving one beat.
///
/// "4/4" means four beats per bar and a beat value of 1/4 (a quarter note
/// receives one beat).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    beats_per_bar: u32,
    beat_unit: u32,
}

impl TimeSignature {
    /// Common time, 4/4.
    pub const COMMON: Self = Self { beats_per_bar: 4, beat_unit: 4 };

    /// Create a signature from numerator and denominator.
    pub fn new(beats_per_bar: u32, beat_unit: u32) -> Result<Self, TimeError> {
        if beats_per_bar == 0 || beat_unit == 0 {
            return Err(TimeError::MalformedSignature(format!(
                "{}/{}",
                beats_per_bar, beat_unit
            )));
        }
        Ok(Self { beats_per_bar, beat_unit })
    }

    /// Parse an "N/D" signature string.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let err = || TimeError::MalformedSignature(s.to_string());
        let (num, den) = s.split_once('/').ok_or_else(err)?;
        let beats_per_bar: u32 = num.trim().parse().map_err(|_| err())?;
        let beat_unit: u32 = den.trim().parse().map_err(|_| err())?;
        Self::new(beats_per_bar, beat_unit).map_err(|_| err())
    }

    /// Number of beats in one bar.
    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    /// The note-value denominator (4 in "4/4").
    pub fn beat_unit(&self) -> u32 {
        self.beat_unit
    }

    /// The note-value fraction that receives one beat (1/4 in "4/4").
    pub fn beat_value(&self) -> f64 {
        1.0 / self.beat_unit as f64
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats_per_bar, self.beat_unit)
    }
}

/// The tempo context shared by everything mixed into one buffer.
///
/// Two contexts are *compatible* when their sample rate and signature
/// match; bpm may differ between independently rendered sub-units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tempo {
    pub bpm: u32,
    pub sample_rate: u32,
    pub signature: TimeSignature,
}

impl Tempo {
    pub fn new(bpm: u32, sample_rate: u32, signature: TimeSignature) -> Self {
        Self { bpm, sample_rate, signature }
    }

    /// Seconds spanned by one beat.
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm as f64
    }

    /// Map a beat offset to an absolute sample index (floor).
    pub fn beat_to_sample_index(&self, beats: f64) -> usize {
        (beats * 60.0 * self.sample_rate as f64 / self.bpm as f64).floor() as usize
    }

    /// Map a (global bar, local beat) position to an absolute sample index.
    pub fn position_to_sample_index(&self, bar: u32, beat: f64) -> usize {
        let beats = bar as f64 * self.signature.beats_per_bar() as f64 + beat;
        self.beat_to_sample_index(beats)
    }

    /// Samples spanned by one full bar.
    pub fn samples_per_bar(&self) -> usize {
        self.beat_to_sample_index(self.signature.beats_per_bar() as f64)
    }

    /// Beats spanned by a note value (fraction of a whole note).
    pub fn beats_of(&self, note_value: f64) -> f64 {
        note_value / self.signature.beat_value()
    }

    /// True if entities in the two contexts may be summed together.
    pub fn compatible_with(&self, other: &Tempo) -> bool {
        self.sample_rate == other.sample_rate && self.signature == other.signature
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self { bpm: 128, sample_rate: 44100, signature: TimeSignature::COMMON }
    }
}

/// Parse a duration string ("HH:MM:SS", "MM:SS" or "SS") into seconds.
///
/// Fields may be fractional ("00:7.5" is seven and a half seconds).
pub fn parse_duration(s: &str) -> Result<f64, TimeError> {
    let err = || TimeError::MalformedDuration(s.to_string());
    let fields: Vec<&str> = s.split(':').collect();
    if fields.is_empty() || fields.len() > 3 {
        return Err(err());
    }
    let mut seconds = 0.0;
    for (i, field) in fields.iter().rev().enumerate() {
        let value: f64 = field.trim().parse().map_err(|_| err())?;
        if value < 0.0 {
            return Err(err());
        }
        seconds += value * 60f64.powi(i as i32);
    }
    Ok(seconds)
}
