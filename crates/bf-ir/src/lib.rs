//! Core data model for the beatforge composition toolkit.
//!
//! This crate defines the passive representation shared by the generators
//! and the rendering engine: timing contexts, piano keys and theory tables,
//! note events, pattern and sample cores, stereo buffers, and the
//! serializable descriptors used for persistence.

mod buffer;
mod descriptor;
mod key;
mod note;
mod pattern;
mod sample;
mod theory;
mod time;

pub use buffer::{db_to_amplitude, Frame, StereoBuffer};
pub use descriptor::{
    ChannelDesc, EffectDesc, GeneratorDesc, NoteDesc, PatternPlacementDesc, SamplePlacementDesc,
    TrackDesc,
};
pub use key::{PianoKey, TheoryError, KEY_COUNT, MIDI_OFFSET};
pub use note::{Adsr, Note, PresetId};
pub use pattern::PatternCore;
pub use sample::SampleCore;
pub use theory::{chord_notes, scale_pitches, ChordOptions, ChordQuality, ScaleType};
pub use time::{parse_duration, Tempo, TimeError, TimeSignature};
