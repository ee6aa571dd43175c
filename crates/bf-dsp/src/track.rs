//! The track mixer: pooled cores, placements and the master gain stage.

use arrayvec::ArrayString;
use bf_ir::{
    parse_duration, PatternCore, PatternPlacementDesc, PresetId, SampleCore, SamplePlacementDesc,
    StereoBuffer, Tempo, TimeError, TimeSignature, TrackDesc,
};
use slotmap::SlotMap;
use std::fmt;

use crate::channel::Channel;
use crate::effects::Gain;
use crate::preset::{PresetBank, RenderError};
use crate::render::render_pattern;

slotmap::new_key_type! {
    /// Key for pattern cores pooled in a track.
    pub struct PatternCoreId;
    /// Key for sample cores pooled in a track.
    pub struct SampleCoreId;
}

/// Error type for track assembly.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackError {
    /// Core sample rate differs from the track's
    SampleRateMismatch { track: u32, core: u32 },
    /// Core time signature differs from the track's
    SignatureMismatch { track: TimeSignature, core: TimeSignature },
    /// Placement references a core id not pooled in this track
    UnknownCore,
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::SampleRateMismatch { track, core } => {
                write!(f, "core sample rate {} incompatible with track rate {}", core, track)
            }
            TrackError::SignatureMismatch { track, core } => {
                write!(f, "core signature {} incompatible with track signature {}", core, track)
            }
            TrackError::UnknownCore => write!(f, "placement references an unknown core"),
        }
    }
}

impl std::error::Error for TrackError {}

/// A pattern core placed at a global track position.
struct PatternPlacement {
    core: PatternCoreId,
    bar: u32,
    beat: f64,
    channel: Option<Channel>,
}

/// A sample core placed at a global track position.
struct SamplePlacement {
    core: SampleCoreId,
    bar: u32,
    beat: f64,
    channel: Option<Channel>,
}

/// The top-level container: owns every placement and produces the final
/// stereo mix.
///
/// Cores are pooled once and may be placed many times (the same drum-hit
/// clip on every beat); each placement carries its own channel instance.
pub struct Track {
    name: ArrayString<32>,
    tempo: Tempo,
    duration_seconds: f64,
    pattern_cores: SlotMap<PatternCoreId, PatternCore>,
    sample_cores: SlotMap<SampleCoreId, SampleCore>,
    patterns: Vec<PatternPlacement>,
    samples: Vec<SamplePlacement>,
    /// Generators referenced by pooled pattern cores, in first-use order
    generators: Vec<PresetId>,
}

impl Track {
    pub fn new(name: &str, tempo: Tempo, duration_seconds: f64) -> Self {
        let mut track_name = ArrayString::new();
        let _ = track_name.try_push_str(name);
        Self {
            name: track_name,
            tempo,
            duration_seconds,
            pattern_cores: SlotMap::with_key(),
            sample_cores: SlotMap::with_key(),
            patterns: Vec::new(),
            samples: Vec::new(),
            generators: Vec::new(),
        }
    }

    /// Create a track with a "HH:MM:SS"-style length.
    pub fn with_length(name: &str, tempo: Tempo, length: &str) -> Result<Self, TimeError> {
        Ok(Self::new(name, tempo, parse_duration(length)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tempo(&self) -> &Tempo {
        &self.tempo
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Output length in frames.
    pub fn total_samples(&self) -> usize {
        (self.duration_seconds * self.tempo.sample_rate as f64).ceil() as usize
    }

    /// Generators referenced by this track's pattern cores.
    pub fn generators(&self) -> &[PresetId] {
        &self.generators
    }

    /// Pool a pattern core, gated on tempo-context compatibility.
    ///
    /// Fails without mutating the track when the core's sample rate or
    /// signature differs from the track's.
    pub fn add_pattern_core(&mut self, core: PatternCore) -> Result<PatternCoreId, TrackError> {
        let core_tempo = core.tempo();
        if core_tempo.sample_rate != self.tempo.sample_rate {
            return Err(TrackError::SampleRateMismatch {
                track: self.tempo.sample_rate,
                core: core_tempo.sample_rate,
            });
        }
        if core_tempo.signature != self.tempo.signature {
            return Err(TrackError::SignatureMismatch {
                track: self.tempo.signature,
                core: core_tempo.signature,
            });
        }
        for &generator in core.generators() {
            if !self.generators.contains(&generator) {
                self.generators.push(generator);
            }
        }
        Ok(self.pattern_cores.insert(core))
    }

    /// Pool a sample core, gated on sample-rate compatibility.
    pub fn add_sample_core(&mut self, core: SampleCore) -> Result<SampleCoreId, TrackError> {
        if core.sample_rate() != self.tempo.sample_rate {
            return Err(TrackError::SampleRateMismatch {
                track: self.tempo.sample_rate,
                core: core.sample_rate(),
            });
        }
        Ok(self.sample_cores.insert(core))
    }

    /// Place a pooled pattern at `(bar, beat)` with an optional channel.
    pub fn add_pattern(
        &mut self,
        core: PatternCoreId,
        bar: u32,
        beat: f64,
        channel: Option<Channel>,
    ) -> Result<(), TrackError> {
        if !self.pattern_cores.contains_key(core) {
            return Err(TrackError::UnknownCore);
        }
        self.patterns.push(PatternPlacement { core, bar, beat, channel });
        Ok(())
    }

    /// Place a pooled sample clip at `(bar, beat)` with an optional channel.
    pub fn add_sample(
        &mut self,
        core: SampleCoreId,
        bar: u32,
        beat: f64,
        channel: Option<Channel>,
    ) -> Result<(), TrackError> {
        if !self.sample_cores.contains_key(core) {
            return Err(TrackError::UnknownCore);
        }
        self.samples.push(SamplePlacement { core, bar, beat, channel });
        Ok(())
    }

    pub fn pattern_placements(&self) -> usize {
        self.patterns.len()
    }

    pub fn sample_placements(&self) -> usize {
        self.samples.len()
    }

    /// Mix every placement into one buffer and run the master gain stage.
    ///
    /// Each pattern renders through its core (additive note mixing), passes
    /// through its placement channel if present, and accumulates at its
    /// global offset; sample placements follow the same path. A fresh
    /// master channel holding a single gain effect is built per call, so
    /// buffer content is deterministic for identical placements.
    pub fn render(
        &mut self,
        master_gain_db: f32,
        bank: &PresetBank,
    ) -> Result<StereoBuffer, RenderError> {
        let tempo = self.tempo;
        let mut out = StereoBuffer::silence(self.total_samples());

        for placement in &mut self.patterns {
            let core = &self.pattern_cores[placement.core];
            let mut rendered = render_pattern(core, bank)?;
            if let Some(channel) = placement.channel.as_mut() {
                channel.apply(&mut rendered, tempo.sample_rate);
            }
            let start = tempo.position_to_sample_index(placement.bar, placement.beat);
            out.mix_at(start, &rendered);
        }

        for placement in &mut self.samples {
            let core = &self.sample_cores[placement.core];
            let mut rendered = core.render();
            if let Some(channel) = placement.channel.as_mut() {
                channel.apply(&mut rendered, tempo.sample_rate);
            }
            let start = tempo.position_to_sample_index(placement.bar, placement.beat);
            out.mix_at(start, &rendered);
        }

        let mut master = Channel::new("master").with_effect(Box::new(Gain::new(master_gain_db)));
        master.apply(&mut out, tempo.sample_rate);
        Ok(out)
    }

    /// The full serializable description of this track.
    pub fn describe(&self, bank: &PresetBank) -> TrackDesc {
        let patterns = self
            .patterns
            .iter()
            .map(|p| {
                let core = &self.pattern_cores[p.core];
                PatternPlacementDesc {
                    bar: p.bar,
                    beat: p.beat,
                    name: core.name().to_string(),
                    num_bars: core.num_bars(),
                    bpm: core.tempo().bpm,
                    notes: core
                        .notes()
                        .iter()
                        .map(|n| bf_ir::NoteDesc {
                            key: n.key.to_string(),
                            value: n.value,
                            pos: n.pos_in_pattern,
                        })
                        .collect(),
                    channel: p.channel.as_ref().map(Channel::describe),
                }
            })
            .collect();

        let samples = self
            .samples
            .iter()
            .map(|p| {
                let core = &self.sample_cores[p.core];
                SamplePlacementDesc {
                    bar: p.bar,
                    beat: p.beat,
                    name: core.name().to_string(),
                    gain_db: core.gain_db(),
                    channel: p.channel.as_ref().map(Channel::describe),
                }
            })
            .collect();

        TrackDesc {
            name: self.name.to_string(),
            bpm: self.tempo.bpm,
            sample_rate: self.tempo.sample_rate,
            signature: self.tempo.signature.to_string(),
            duration_seconds: self.duration_seconds,
            generators: self
                .generators
                .iter()
                .filter_map(|&id| bank.get(id))
                .map(|preset| preset.describe())
                .collect(),
            patterns,
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Highpass;
    use crate::preset::Preset;
    use bf_ir::{Adsr, Frame, PianoKey, KEY_COUNT};

    const SR: u32 = 8000;

    fn tempo() -> Tempo {
        Tempo::new(60, SR, TimeSignature::COMMON)
    }

    fn flat_bank() -> (PresetBank, PresetId) {
        let total = (KEY_COUNT as f64 * 60.0 * SR as f64 / 60.0).ceil() as usize;
        let source = StereoBuffer::from_frames(vec![Frame::mono(0.25); total]);
        let mut bank = PresetBank::new();
        let id = bank.insert(Preset::from_source("flat", &source, SR, 60).unwrap());
        (bank, id)
    }

    fn one_note_core(id: PresetId) -> PatternCore {
        let mut core = PatternCore::new("lead", 1, tempo(), 1.0 / 16.0);
        let c4: PianoKey = "C4".parse().unwrap();
        let adsr = Adsr { attack_ms: 0.0, decay_ms: 0.0, sustain: 1.0, release_ms: 0.0 };
        core.add_note(c4, 0.25, 0.0, id, adsr);
        core
    }

    #[test]
    fn incompatible_sample_rate_rejected_without_mutation() {
        let mut track = Track::new("mix", tempo(), 8.0);
        let other = Tempo::new(128, 22050, TimeSignature::COMMON);
        let core = PatternCore::new("alien", 1, other, 1.0 / 16.0);

        let err = track.add_pattern_core(core).unwrap_err();
        assert!(matches!(err, TrackError::SampleRateMismatch { track: 8000, core: 22050 }));
        assert_eq!(track.pattern_cores.len(), 0);
        assert!(track.generators().is_empty());
    }

    #[test]
    fn incompatible_signature_rejected() {
        let mut track = Track::new("mix", tempo(), 8.0);
        let waltz = Tempo::new(60, SR, TimeSignature::parse("3/4").unwrap());
        let core = PatternCore::new("waltz", 1, waltz, 1.0 / 16.0);
        assert!(matches!(
            track.add_pattern_core(core).unwrap_err(),
            TrackError::SignatureMismatch { .. }
        ));
    }

    #[test]
    fn bpm_difference_is_compatible() {
        let mut track = Track::new("mix", tempo(), 8.0);
        let faster = Tempo::new(120, SR, TimeSignature::COMMON);
        assert!(track.add_pattern_core(PatternCore::new("fast", 1, faster, 1.0 / 16.0)).is_ok());
    }

    #[test]
    fn unknown_core_placement_rejected() {
        let mut one = Track::new("one", tempo(), 8.0);
        let mut two = Track::new("two", tempo(), 8.0);
        let id = one.add_pattern_core(PatternCore::new("p", 1, tempo(), 1.0 / 16.0)).unwrap();
        assert_eq!(two.add_pattern(id, 0, 0.0, None), Err(TrackError::UnknownCore));
    }

    #[test]
    fn render_length_is_duration_ceil() {
        let mut track = Track::new("empty", tempo(), 2.5);
        let bank = PresetBank::new();
        let out = track.render(0.0, &bank).unwrap();
        assert_eq!(out.len(), 20000);
    }

    #[test]
    fn pattern_placement_lands_at_global_offset() {
        let (bank, preset) = flat_bank();
        let mut track = Track::new("mix", tempo(), 10.0);
        let core = track.add_pattern_core(one_note_core(preset)).unwrap();
        // bar 1, beat 1 → 5 beats → 5 s → sample 40000
        track.add_pattern(core, 1, 1.0, None).unwrap();

        let out = track.render(0.0, &bank).unwrap();
        assert_eq!(out.frames()[39999], Frame::silence());
        assert!((out.frames()[40000].left - 0.25).abs() < 1e-6);
    }

    #[test]
    fn reused_core_sums_at_each_placement() {
        let (bank, preset) = flat_bank();
        let mut track = Track::new("mix", tempo(), 10.0);
        let core = track.add_pattern_core(one_note_core(preset)).unwrap();
        track.add_pattern(core, 0, 0.0, None).unwrap();
        track.add_pattern(core, 0, 0.0, None).unwrap();

        let out = track.render(0.0, &bank).unwrap();
        assert!((out.frames()[100].left - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sample_placements_mix_with_patterns() {
        let (bank, preset) = flat_bank();
        let mut track = Track::new("mix", tempo(), 10.0);
        let pattern = track.add_pattern_core(one_note_core(preset)).unwrap();
        track.add_pattern(pattern, 0, 0.0, None).unwrap();

        let clip = StereoBuffer::from_frames(vec![Frame::mono(0.5); 100]);
        let kick = track.add_sample_core(SampleCore::new("kick", clip, SR)).unwrap();
        track.add_sample(kick, 0, 0.0, None).unwrap();

        let out = track.render(0.0, &bank).unwrap();
        assert!((out.frames()[50].left - 0.75).abs() < 1e-6);
    }

    #[test]
    fn master_gain_scales_final_mix() {
        let (bank, preset) = flat_bank();
        let mut track = Track::new("mix", tempo(), 10.0);
        let core = track.add_pattern_core(one_note_core(preset)).unwrap();
        track.add_pattern(core, 0, 0.0, None).unwrap();

        let unity = track.render(0.0, &bank).unwrap();
        let quieter = track.render(-6.0, &bank).unwrap();
        let ratio = quieter.frames()[100].left / unity.frames()[100].left;
        assert!((ratio - bf_ir::db_to_amplitude(-6.0)).abs() < 1e-4);
    }

    #[test]
    fn render_is_deterministic_with_stateful_channels() {
        let (bank, preset) = flat_bank();
        let mut track = Track::new("mix", tempo(), 10.0);
        let core = track.add_pattern_core(one_note_core(preset)).unwrap();
        let channel = Channel::new("hp").with_effect(Box::new(Highpass::new(200.0)));
        track.add_pattern(core, 0, 0.0, Some(channel)).unwrap();

        let first = track.render(0.0, &bank).unwrap();
        let second = track.render(0.0, &bank).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn describe_lists_everything() {
        let (bank, preset) = flat_bank();
        let mut track = Track::new("mix", tempo(), 10.0);
        let core = track.add_pattern_core(one_note_core(preset)).unwrap();
        let channel = Channel::new("hp").with_effect(Box::new(Highpass::new(500.0)));
        track.add_pattern(core, 0, 0.0, Some(channel)).unwrap();

        let clip = StereoBuffer::from_frames(vec![Frame::mono(0.5); 10]);
        let kick = track.add_sample_core(SampleCore::new("kick", clip, SR).with_gain(-3.0)).unwrap();
        track.add_sample(kick, 2, 1.0, None).unwrap();

        let desc = track.describe(&bank);
        assert_eq!(desc.signature, "4/4");
        assert_eq!(desc.generators.len(), 1);
        assert_eq!(desc.generators[0].name, "flat");
        assert_eq!(desc.patterns.len(), 1);
        assert_eq!(desc.patterns[0].notes.len(), 1);
        assert_eq!(desc.patterns[0].notes[0].key, "C4");
        assert!(desc.patterns[0].channel.is_some());
        assert_eq!(desc.samples.len(), 1);
        assert_eq!(desc.samples[0].bar, 2);
        assert_eq!(desc.samples[0].gain_db, -3.0);
    }
}
