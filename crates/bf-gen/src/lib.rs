//! Seeded procedural generation for beatforge.
//!
//! Rhythm templates come out of a Poisson onset process quantized to a
//! note-value grid; melodies and chord progressions realize those
//! templates against the theory tables in `bf-ir`. All randomness flows
//! from an explicit per-call seed, never from ambient generator state.

mod melody;
mod rhythm;

pub use melody::{chords_from_progression, melody_from_rhythm, TimedKey};
pub use rhythm::{GenError, OnsetDistribution, PlaceHolder, Rhythm};
