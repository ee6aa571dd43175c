//! Sample cores: pre-recorded clips placed on the track grid.

use arrayvec::ArrayString;

use crate::buffer::{db_to_amplitude, StereoBuffer};
use crate::time::Tempo;

/// A single audio clip (drum hit, loop, fill).
///
/// The clip is immutable after construction; the tempo context is only
/// used for the optional construction-time truncation to a beat count.
#[derive(Clone, Debug)]
pub struct SampleCore {
    name: ArrayString<64>,
    buffer: StereoBuffer,
    sample_rate: u32,
    gain_db: f32,
}

impl SampleCore {
    pub fn new(name: &str, buffer: StereoBuffer, sample_rate: u32) -> Self {
        let mut clip_name = ArrayString::new();
        let _ = clip_name.try_push_str(name);
        Self { name: clip_name, buffer, sample_rate, gain_db: 0.0 }
    }

    /// Create a clip truncated to the first `truncate_beats` beats.
    ///
    /// Shorter sources are left untouched.
    pub fn truncated(
        name: &str,
        mut buffer: StereoBuffer,
        sample_rate: u32,
        tempo: &Tempo,
        truncate_beats: f64,
    ) -> Self {
        buffer.truncate(tempo.beat_to_sample_index(truncate_beats));
        Self::new(name, buffer, sample_rate)
    }

    /// Set the fixed gain stage applied on render.
    pub fn with_gain(mut self, gain_db: f32) -> Self {
        self.gain_db = gain_db;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Length in frames.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The clip verbatim, after the fixed gain stage.
    pub fn render(&self) -> StereoBuffer {
        let mut out = self.buffer.clone();
        if self.gain_db != 0.0 {
            out.apply_gain(db_to_amplitude(self.gain_db));
        }
        out
    }
}
