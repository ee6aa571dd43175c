//! Pattern rendering: additive synthesis of note events into one buffer.

use bf_ir::{PatternCore, StereoBuffer};

use crate::preset::{PresetBank, RenderError};

/// Render a pattern core into a buffer of exactly
/// `num_bars * beats_per_bar * 60 * sr / bpm` frames.
///
/// Notes are rendered through their generators and summed at their beat
/// positions; overlapping notes add, and tails running past the pattern
/// end are silently truncated. Rendering is idempotent: it recomputes
/// from the note list and mutates nothing.
pub fn render_pattern(core: &PatternCore, bank: &PresetBank) -> Result<StereoBuffer, RenderError> {
    let tempo = core.tempo();
    let mut out = StereoBuffer::silence(core.total_samples());
    for note in core.notes() {
        let preset = bank.get(note.generator).ok_or(RenderError::MissingPreset)?;
        let rendered =
            preset.render_note(note.key, &note.adsr, note.value, tempo.bpm, &tempo.signature)?;
        let start = tempo.beat_to_sample_index(note.pos_in_pattern);
        out.mix_at(start, &rendered);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::Preset;
    use bf_ir::{Adsr, Frame, PianoKey, Tempo, TimeSignature, KEY_COUNT};

    fn flat_source(sample_rate: u32, load_bpm: u32, value: f32) -> StereoBuffer {
        let total = (KEY_COUNT as f64 * 60.0 * sample_rate as f64 / load_bpm as f64).ceil() as usize;
        StereoBuffer::from_frames(vec![Frame::mono(value); total])
    }

    fn flat_adsr() -> Adsr {
        Adsr { attack_ms: 0.0, decay_ms: 0.0, sustain: 1.0, release_ms: 0.0 }
    }

    #[test]
    fn empty_pattern_renders_exact_silence() {
        let tempo = Tempo::new(128, 44100, TimeSignature::COMMON);
        let core = PatternCore::new("empty", 4, tempo, 1.0 / 16.0);
        let bank = PresetBank::new();

        let out = render_pattern(&core, &bank).unwrap();
        // 4 * 4 * 60 * 44100 / 128
        assert_eq!(out.len(), 330750);
        assert!(out.frames().iter().all(|f| *f == Frame::silence()));
    }

    #[test]
    fn overlapping_notes_sum() {
        let tempo = Tempo::new(60, 8000, TimeSignature::COMMON);
        let mut bank = PresetBank::new();
        let id = bank.insert(Preset::from_source("flat", &flat_source(8000, 60, 0.25), 8000, 60).unwrap());

        let mut core = PatternCore::new("unison", 1, tempo, 1.0 / 16.0);
        let c4: PianoKey = "C4".parse().unwrap();
        let e4: PianoKey = "E4".parse().unwrap();
        core.add_note(c4, 0.25, 0.0, id, flat_adsr());
        core.add_note(e4, 0.25, 0.0, id, flat_adsr());

        let out = render_pattern(&core, &bank).unwrap();
        assert!((out.frames()[100].left - 0.5).abs() < 1e-6);
    }

    #[test]
    fn note_starts_at_its_beat_position() {
        let tempo = Tempo::new(60, 8000, TimeSignature::COMMON);
        let mut bank = PresetBank::new();
        let id = bank.insert(Preset::from_source("flat", &flat_source(8000, 60, 0.25), 8000, 60).unwrap());

        let mut core = PatternCore::new("offset", 1, tempo, 1.0 / 16.0);
        core.add_note("C4".parse().unwrap(), 0.25, 2.0, id, flat_adsr());

        let out = render_pattern(&core, &bank).unwrap();
        let start = tempo.beat_to_sample_index(2.0);
        assert_eq!(out.frames()[start - 1], Frame::silence());
        assert!((out.frames()[start].left - 0.25).abs() < 1e-6);
    }

    #[test]
    fn tail_past_pattern_end_truncated() {
        let tempo = Tempo::new(60, 8000, TimeSignature::COMMON);
        let mut bank = PresetBank::new();
        let id = bank.insert(Preset::from_source("flat", &flat_source(8000, 60, 0.25), 8000, 60).unwrap());

        // a quarter note halfway through the last beat spills past the bar
        let mut core = PatternCore::new("spill", 1, tempo, 1.0 / 16.0);
        core.add_note("C4".parse().unwrap(), 0.25, 3.5, id, flat_adsr());

        let out = render_pattern(&core, &bank).unwrap();
        assert_eq!(out.len(), core.total_samples());
        // note still audible right up to the boundary
        assert!((out.frames()[out.len() - 1].left - 0.25).abs() < 1e-6);
    }

    #[test]
    fn render_is_idempotent() {
        let tempo = Tempo::new(60, 8000, TimeSignature::COMMON);
        let mut bank = PresetBank::new();
        let id = bank.insert(Preset::from_source("flat", &flat_source(8000, 60, 0.25), 8000, 60).unwrap());

        let mut core = PatternCore::new("twice", 1, tempo, 1.0 / 16.0);
        core.add_note("A4".parse().unwrap(), 0.25, 1.0, id, flat_adsr());

        let first = render_pattern(&core, &bank).unwrap();
        let second = render_pattern(&core, &bank).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_generator_fails() {
        let tempo = Tempo::new(60, 8000, TimeSignature::COMMON);
        let mut other_bank = PresetBank::new();
        let id = other_bank.insert(Preset::from_source("flat", &flat_source(8000, 60, 0.25), 8000, 60).unwrap());

        let mut core = PatternCore::new("dangling", 1, tempo, 1.0 / 16.0);
        core.add_note("C4".parse().unwrap(), 0.25, 0.0, id, flat_adsr());

        let empty = PresetBank::new();
        assert_eq!(render_pattern(&core, &empty).unwrap_err(), RenderError::MissingPreset);
    }
}
