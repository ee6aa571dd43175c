//! Pitched-sample presets: one sliced waveform per piano key.
//!
//! A preset is built from a single recorded source that performs one note
//! per fixed-tempo slot, 88 slots in ascending key order. Slicing happens
//! once at construction; rendering multiplies a slot by an ADSR envelope.

use arrayvec::ArrayString;
use bf_ir::{db_to_amplitude, Adsr, GeneratorDesc, PianoKey, PresetId, StereoBuffer, TimeSignature, KEY_COUNT};
use slotmap::SlotMap;
use std::fmt;
use tracing::warn;

/// Error type for rendering.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderError {
    /// Preset source too short to slice into 88 slots
    ShortSource { needed: usize, got: usize },
    /// A derived ADSR segment length came out negative
    NegativeEnvelope { segment: &'static str, seconds: f64 },
    /// A note references a generator missing from the bank
    MissingPreset,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ShortSource { needed, got } => {
                write!(f, "preset source holds {} frames, 88 slots need {}", got, needed)
            }
            RenderError::NegativeEnvelope { segment, seconds } => {
                write!(f, "envelope {} segment is negative ({:.4} s)", segment, seconds)
            }
            RenderError::MissingPreset => write!(f, "note references a preset not in the bank"),
        }
    }
}

impl std::error::Error for RenderError {}

/// A pitched-sample generator.
#[derive(Clone, Debug)]
pub struct Preset {
    name: ArrayString<64>,
    /// One waveform per piano key, slot 0 = A0
    slots: Vec<StereoBuffer>,
    sample_rate: u32,
    load_bpm: u32,
    gain_db: f32,
}

impl Preset {
    /// Slice a recorded source into 88 equal-duration slots.
    ///
    /// Each slot spans one beat at `load_bpm`, i.e. `60*sr/load_bpm`
    /// frames, mapped positionally to ascending keys. This is a format
    /// contract on preset audio assets.
    pub fn from_source(
        name: &str,
        source: &StereoBuffer,
        sample_rate: u32,
        load_bpm: u32,
    ) -> Result<Self, RenderError> {
        let slot_frames = 60.0 * sample_rate as f64 / load_bpm as f64;
        let needed = (KEY_COUNT as f64 * slot_frames) as usize;
        if source.len() < needed {
            return Err(RenderError::ShortSource { needed, got: source.len() });
        }

        let mut slots = Vec::with_capacity(KEY_COUNT as usize);
        for slot in 0..KEY_COUNT as usize {
            let start = (slot as f64 * slot_frames) as usize;
            let end = ((slot + 1) as f64 * slot_frames) as usize;
            slots.push(StereoBuffer::from_frames(source.frames()[start..end].to_vec()));
        }

        let mut preset_name = ArrayString::new();
        let _ = preset_name.try_push_str(name);
        Ok(Self { name: preset_name, slots, sample_rate, load_bpm, gain_db: 0.0 })
    }

    /// Set the fixed per-generator gain applied on render.
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

    pub fn load_bpm(&self) -> u32 {
        self.load_bpm
    }

    pub fn describe(&self) -> GeneratorDesc {
        GeneratorDesc { name: self.name.to_string(), load_bpm: self.load_bpm }
    }

    /// Build the amplitude envelope for a note.
    ///
    /// The attack+decay+sustain span covers the note duration at `bpm`,
    /// clamped to the preset slot budget minus the release tail (a warning
    /// is emitted when clamping); the release segment follows. Returns the
    /// per-sample envelope and its total length.
    pub fn envelope(
        &self,
        adsr: &Adsr,
        note_value: f64,
        bpm: u32,
        signature: &TimeSignature,
    ) -> Result<(Vec<f32>, usize), RenderError> {
        let seconds_per_beat = 60.0 / bpm as f64;
        let requested = seconds_per_beat * note_value / signature.beat_value();
        let budget = 60.0 / self.load_bpm as f64 - adsr.release_ms / 1000.0;
        let key_seconds = if requested > budget {
            warn!(
                preset = self.name.as_str(),
                requested, budget, "note duration exceeds preset slot budget, clamping"
            );
            budget
        } else {
            requested
        };

        let attack = adsr.attack_ms / 1000.0;
        let decay = adsr.decay_ms / 1000.0;
        let sustain_span = key_seconds - attack - decay;
        let release = adsr.release_ms / 1000.0;
        for (segment, seconds) in [
            ("attack", attack),
            ("decay", decay),
            ("sustain", sustain_span),
            ("release", release),
        ] {
            if seconds < 0.0 {
                return Err(RenderError::NegativeEnvelope { segment, seconds });
            }
        }

        let sr = self.sample_rate as f64;
        let p1 = (attack * sr) as usize;
        let p2 = ((attack + decay) * sr) as usize;
        let p3 = (key_seconds * sr) as usize;
        let p4 = ((key_seconds + release) * sr) as usize;

        let sustain = adsr.sustain;
        let mut envelope = vec![0f32; p4];
        for i in 0..p1 {
            envelope[i] = (i as f64 / p1 as f64) as f32;
        }
        for i in p1..p2 {
            envelope[i] = (1.0 - (1.0 - sustain) * (i - p1) as f64 / (p2 - p1) as f64) as f32;
        }
        for i in p2..p3 {
            envelope[i] = sustain as f32;
        }
        for i in p3..p4 {
            envelope[i] = (sustain - sustain * (i - p3) as f64 / (p4 - p3) as f64) as f32;
        }
        Ok((envelope, p4))
    }

    /// Render one note: the key's slot waveform shaped by the envelope,
    /// with the per-generator gain applied.
    pub fn render_note(
        &self,
        key: PianoKey,
        adsr: &Adsr,
        note_value: f64,
        bpm: u32,
        signature: &TimeSignature,
    ) -> Result<StereoBuffer, RenderError> {
        let (envelope, length) = self.envelope(adsr, note_value, bpm, signature)?;
        let slot = &self.slots[key.index() as usize];
        let gain = db_to_amplitude(self.gain_db);

        let frames = slot
            .frames()
            .iter()
            .take(length)
            .zip(&envelope)
            .map(|(frame, &amp)| {
                let mut shaped = *frame;
                shaped.scale(amp * gain);
                shaped
            })
            .collect();
        Ok(StereoBuffer::from_frames(frames))
    }
}

/// The pool of presets a track's notes may reference.
#[derive(Default)]
pub struct PresetBank {
    presets: SlotMap<PresetId, Preset>,
}

impl PresetBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, preset: Preset) -> PresetId {
        self.presets.insert(preset)
    }

    pub fn get(&self, id: PresetId) -> Option<&Preset> {
        self.presets.get(id)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PresetId, &Preset)> {
        self.presets.iter()
    }
}
