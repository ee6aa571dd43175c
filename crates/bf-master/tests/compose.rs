//! Integration test: generate → assemble → render → verify output.

use bf_dsp::Channel;
use bf_gen::{chords_from_progression, melody_from_rhythm, OnsetDistribution, Rhythm};
use bf_ir::{
    Adsr, ChannelDesc, EffectDesc, Frame, PianoKey, PatternCore, ScaleType, StereoBuffer,
    TimeSignature, KEY_COUNT,
};
use bf_master::{arrange, AssetConfig, Project};

const SR: u32 = 44100;
const LOAD_BPM: u32 = 64;

/// Synthesize a preset source: one sine note per slot at the key's pitch,
/// with a short linear fade-out to avoid slice clicks.
fn synth_preset_source() -> StereoBuffer {
    let slot_frames = 60.0 * SR as f64 / LOAD_BPM as f64;
    let total = (KEY_COUNT as f64 * slot_frames).ceil() as usize;
    let mut frames = Vec::with_capacity(total);
    for i in 0..total {
        let slot = ((i as f64 / slot_frames) as usize).min(KEY_COUNT as usize - 1);
        let key = PianoKey::from_index(slot as u8).unwrap();
        let freq = 440.0 * 2f64.powf((key.midi() as f64 - 69.0) / 12.0);
        let t = (i as f64 - slot as f64 * slot_frames) / SR as f64;
        let fade = 1.0 - (t / (slot_frames / SR as f64)).min(1.0) * 0.5;
        frames.push(Frame::mono(
            ((std::f64::consts::TAU * freq * t).sin() * 0.4 * fade) as f32,
        ));
    }
    StereoBuffer::from_frames(frames)
}

/// A clicky kick: decaying sine sweep.
fn synth_kick() -> StereoBuffer {
    let len = (0.25 * SR as f64) as usize;
    let frames = (0..len)
        .map(|i| {
            let t = i as f64 / SR as f64;
            let freq = 150.0 - 400.0 * t;
            let env = (-t * 18.0).exp();
            Frame::mono(((std::f64::consts::TAU * freq.max(40.0) * t).sin() * env) as f32)
        })
        .collect();
    StereoBuffer::from_frames(frames)
}

fn build_project(seed: u64) -> Project {
    let config = AssetConfig { load_bpm: LOAD_BPM, sample_rate: SR, ..Default::default() };
    let mut project = Project::new("it", 128, TimeSignature::COMMON, "00:15", config).unwrap();

    let lead = project.preset_from_source("lead", &synth_preset_source()).unwrap();

    // Rhythm → melody over 8 bars
    let mut rhythm = Rhythm::new("hook", 2, TimeSignature::COMMON, 1.0 / 16.0);
    rhythm
        .generate(
            seed,
            &[2.0 / 16.0, 3.0 / 16.0, 4.0 / 16.0],
            Some(&[0.4, 0.2, 0.4]),
            OnsetDistribution::Poisson { lambda: 0.8 },
        )
        .unwrap();
    let holders = rhythm.repeat(8);
    let melody = melody_from_rhythm(&holders, seed, "C", ScaleType::Major, 5).unwrap();

    let tempo = project.tempo();
    let mut melody_core = PatternCore::new("melody", 8, tempo, 1.0 / 16.0);
    melody_core.add_notes(&melody, lead, Adsr::default());

    // Block chords under the melody
    let chords = chords_from_progression(
        &[1, 6, 4, 5],
        2,
        "C",
        ScaleType::Major,
        4,
        &Default::default(),
        1.0,
        TimeSignature::COMMON,
    )
    .unwrap();
    let mut chord_core = PatternCore::new("chords", 8, tempo, 1.0 / 16.0);
    chord_core.add_notes(&chords, lead, Adsr { release_ms: 200.0, ..Default::default() });

    let melody_id = project.track.add_pattern_core(melody_core).unwrap();
    let chord_id = project.track.add_pattern_core(chord_core).unwrap();
    let lead_channel = ChannelDesc::new(
        "lead",
        vec![EffectDesc::Highpass { cutoff_hz: 150.0 }, EffectDesc::Gain { db: -8.0 }],
    );
    project
        .track
        .add_pattern(melody_id, 0, 0.0, Some(Channel::from_desc(&lead_channel)))
        .unwrap();
    project
        .track
        .add_pattern(chord_id, 0, 0.0, Some(Channel::from_desc(&ChannelDesc::new(
            "chords",
            vec![EffectDesc::Lowpass { cutoff_hz: 4000.0 }, EffectDesc::Gain { db: -14.0 }],
        ))))
        .unwrap();

    // Four-on-the-floor kick
    let kick = project.clip_from_buffer("kick", synth_kick(), None, -6.0).unwrap();
    arrange::place_every_beat(&mut project.track, kick, 8, 8, None).unwrap();

    project
}

#[test]
fn seeded_render_is_nonsilent() {
    let mut project = build_project(42);
    let out = project.render(-3.0).unwrap();
    assert_eq!(out.len(), 15 * SR as usize);
    assert!(out.peak() > 0.01, "render should carry signal, peak {}", out.peak());
}

#[test]
fn same_seed_renders_identical_buffers() {
    let mut first = build_project(42);
    let mut second = build_project(42);
    let a = first.render(-3.0).unwrap();
    let b = second.render(-3.0).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_seeds_render_differently() {
    let mut first = build_project(42);
    let mut second = build_project(43);
    let a = first.render(-3.0).unwrap();
    let b = second.render(-3.0).unwrap();
    assert_ne!(a, b);
}

#[test]
fn descriptor_lists_generators_and_placements() {
    let project = build_project(7);
    let desc = project.track.describe(&project.bank);

    assert_eq!(desc.bpm, 128);
    assert_eq!(desc.sample_rate, SR);
    assert_eq!(desc.generators.len(), 1);
    assert_eq!(desc.generators[0].name, "lead");
    assert_eq!(desc.patterns.len(), 2);
    // 7 sounding bars × 4 beats of kick
    assert_eq!(desc.samples.len(), 28);

    let json = serde_json::to_string(&desc).unwrap();
    assert!(json.contains(r#""type":"highpass""#));
}

#[test]
fn render_then_save_wav_round_trips() {
    let dir = std::env::temp_dir().join("bf-master-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("render.wav");

    let mut project = build_project(9);
    let out = project.render(-3.0).unwrap();
    project.save_wav(&path, &out).unwrap();

    let (loaded, rate) = bf_formats::load_wav_file(&path, None, false).unwrap();
    assert_eq!(rate, SR);
    assert_eq!(loaded.len(), out.len());

    std::fs::remove_file(&path).ok();
}
