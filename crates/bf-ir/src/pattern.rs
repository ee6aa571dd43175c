//! Pattern cores: timed note collections sharing one tempo context.

use arrayvec::ArrayString;

use crate::key::PianoKey;
use crate::note::{Adsr, Note, PresetId};
use crate::time::Tempo;

/// The skeleton of a pattern: notes in beat coordinates plus the tempo
/// context they are rendered in.
///
/// Cores are populated append-only via `add_note`/`add_notes` and rendered
/// idempotently (rendering recomputes from the notes, mutating nothing).
#[derive(Clone, Debug)]
pub struct PatternCore {
    name: ArrayString<32>,
    num_bars: u32,
    tempo: Tempo,
    /// Shortest representable note value (grid step), as a fraction of a
    /// whole note.
    resolution: f64,
    notes: Vec<Note>,
    generators: Vec<PresetId>,
}

impl PatternCore {
    pub fn new(name: &str, num_bars: u32, tempo: Tempo, resolution: f64) -> Self {
        let mut core_name = ArrayString::new();
        let _ = core_name.try_push_str(name);
        Self {
            name: core_name,
            num_bars,
            tempo,
            resolution,
            notes: Vec::new(),
            generators: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_bars(&self) -> u32 {
        self.num_bars
    }

    pub fn tempo(&self) -> &Tempo {
        &self.tempo
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Generators referenced by this core's notes, in first-use order.
    pub fn generators(&self) -> &[PresetId] {
        &self.generators
    }

    /// Total length in beats.
    pub fn total_beats(&self) -> f64 {
        self.num_bars as f64 * self.tempo.signature.beats_per_bar() as f64
    }

    /// Total length in samples at this core's tempo context.
    pub fn total_samples(&self) -> usize {
        self.tempo.beat_to_sample_index(self.total_beats())
    }

    /// Append one note.
    pub fn add_note(
        &mut self,
        key: PianoKey,
        value: f64,
        pos_in_pattern: f64,
        generator: PresetId,
        adsr: Adsr,
    ) {
        self.notes.push(Note::new(key, value, pos_in_pattern, generator, adsr));
        self.register_generator(generator);
    }

    /// Append a batch of `(key, value, position)` items sharing one
    /// generator and envelope.
    pub fn add_notes(&mut self, items: &[(PianoKey, f64, f64)], generator: PresetId, adsr: Adsr) {
        for &(key, value, pos) in items {
            self.add_note(key, value, pos, generator, adsr);
        }
    }

    fn register_generator(&mut self, generator: PresetId) {
        if !self.generators.contains(&generator) {
            self.generators.push(generator);
        }
    }
}
