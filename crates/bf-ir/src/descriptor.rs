//! Serializable descriptors for tracks, placements and effect chains.
//!
//! Descriptors are a plain nested mapping of what a track contains, used
//! for reproducibility and debugging rather than as a wire format.

use serde::{Deserialize, Serialize};

/// Parameters for one effect, as a tagged variant.
///
/// Effect construction dispatches exhaustively over this enum; an
/// unsupported type cannot be represented, it fails at parse time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectDesc {
    Gain { db: f32 },
    Highpass { cutoff_hz: f32 },
    Lowpass { cutoff_hz: f32 },
    Reverb { room_size: f32, damping: f32, wet: f32, dry: f32, width: f32 },
    Compressor { threshold_db: f32, ratio: f32, attack_ms: f32, release_ms: f32 },
    Limiter { ceiling_db: f32 },
    Distortion { drive_db: f32 },
    Delay { seconds: f32, feedback: f32, mix: f32 },
}

impl EffectDesc {
    /// The variant name (ignoring parameters).
    pub fn name(&self) -> &'static str {
        match self {
            EffectDesc::Gain { .. } => "Gain",
            EffectDesc::Highpass { .. } => "Highpass",
            EffectDesc::Lowpass { .. } => "Lowpass",
            EffectDesc::Reverb { .. } => "Reverb",
            EffectDesc::Compressor { .. } => "Compressor",
            EffectDesc::Limiter { .. } => "Limiter",
            EffectDesc::Distortion { .. } => "Distortion",
            EffectDesc::Delay { .. } => "Delay",
        }
    }
}

/// An ordered effect chain template.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelDesc {
    pub name: String,
    pub effects: Vec<EffectDesc>,
}

impl ChannelDesc {
    pub fn new(name: &str, effects: Vec<EffectDesc>) -> Self {
        Self { name: name.to_string(), effects }
    }
}

/// A pitched-sample generator reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorDesc {
    pub name: String,
    pub load_bpm: u32,
}

/// One note inside a pattern placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteDesc {
    /// Key name, e.g. "C5"
    pub key: String,
    /// Duration as a fraction of a whole note
    pub value: f64,
    /// Onset in beats from the pattern start
    pub pos: f64,
}

/// A pattern placed at a global track position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternPlacementDesc {
    pub bar: u32,
    pub beat: f64,
    pub name: String,
    pub num_bars: u32,
    pub bpm: u32,
    pub notes: Vec<NoteDesc>,
    pub channel: Option<ChannelDesc>,
}

/// A sample clip placed at a global track position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplePlacementDesc {
    pub bar: u32,
    pub beat: f64,
    pub name: String,
    pub gain_db: f32,
    pub channel: Option<ChannelDesc>,
}

/// The full description of a track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackDesc {
    pub name: String,
    pub bpm: u32,
    pub sample_rate: u32,
    /// Signature in "N/D" form
    pub signature: String,
    pub duration_seconds: f64,
    pub generators: Vec<GeneratorDesc>,
    pub patterns: Vec<PatternPlacementDesc>,
    pub samples: Vec<SamplePlacementDesc>,
}
