//! Rendering engine for beatforge.
//!
//! Turns the passive data model from `bf-ir` into audio: pitched-sample
//! presets shape notes with ADSR envelopes, patterns mix their notes
//! additively, channels run ordered effect chains with mandatory state
//! reset, and the track mixer sums every placement under a master gain
//! stage.

mod channel;
pub mod effects;
mod preset;
mod render;
mod track;

pub use channel::Channel;
pub use effects::{build_effect, Effect};
pub use preset::{Preset, PresetBank, RenderError};
pub use render::render_pattern;
pub use track::{PatternCoreId, SampleCoreId, Track, TrackError};
