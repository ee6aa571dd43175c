//! beatforge CLI — seeded demo composition rendered to WAV.
//!
//! Usage:
//!   cargo run -- --seed 42 --out song.wav
//!   cargo run -- --seed 42 --bpm 124 --out song.wav --json song.json --play

use bf_dsp::Channel;
use bf_gen::{chords_from_progression, melody_from_rhythm, OnsetDistribution, Rhythm};
use bf_ir::{
    Adsr, ChannelDesc, ChordOptions, EffectDesc, Frame, PatternCore, PianoKey, ScaleType,
    StereoBuffer, TimeSignature, KEY_COUNT,
};
use bf_master::{arrange, AssetConfig, MasterError, Project};
use std::env;

const SAMPLE_RATE: u32 = 44100;
const LOAD_BPM: u32 = 64;
const NUM_BARS: u32 = 16;

fn main() {
    tracing_subscriber::fmt().init();

    let args: Vec<String> = env::args().collect();
    let seed = flag_value(&args, "--seed").and_then(|v| v.parse().ok()).unwrap_or(42u64);
    let bpm = flag_value(&args, "--bpm").and_then(|v| v.parse().ok()).unwrap_or(128u32);
    let out_path = flag_value(&args, "--out").unwrap_or_else(|| "beatforge.wav".to_string());
    let json_path = flag_value(&args, "--json");
    let play = args.iter().any(|a| a == "--play");

    if let Err(e) = run(seed, bpm, &out_path, json_path.as_deref(), play) {
        eprintln!("beatforge failed: {}", e);
        std::process::exit(1);
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
}

fn run(
    seed: u64,
    bpm: u32,
    out_path: &str,
    json_path: Option<&str>,
    play: bool,
) -> Result<(), MasterError> {
    let config = AssetConfig { load_bpm: LOAD_BPM, sample_rate: SAMPLE_RATE, ..Default::default() };
    let mut project = Project::new("demo", bpm, TimeSignature::COMMON, "00:32", config)?;
    let tempo = project.tempo();

    // Sound sources are synthesized in memory, so the demo needs no asset
    // directories on disk.
    let lead = project.preset_from_source("saw_lead", &synth_preset_source(0.35))?;
    let pad = project.preset_from_source("soft_pad", &synth_preset_source(0.2))?;

    // Rhythm seed → melody
    let mut rhythm = Rhythm::new("hook", 2, TimeSignature::COMMON, 1.0 / 16.0);
    rhythm.generate(
        seed,
        &[2.0 / 16.0, 3.0 / 16.0, 4.0 / 16.0],
        Some(&[0.4, 0.2, 0.4]),
        OnsetDistribution::Poisson { lambda: 0.8 },
    )?;
    let holders = rhythm.repeat(NUM_BARS);
    let melody = melody_from_rhythm(&holders, seed, "C", ScaleType::Major, 5)?;

    let mut melody_core = PatternCore::new("melody", NUM_BARS, tempo, 1.0 / 16.0);
    melody_core.add_notes(&melody, lead, Adsr { release_ms: 80.0, ..Default::default() });

    // I–vi–IV–V block chords, two bars each, looped
    let progression: Vec<u8> =
        [1u8, 6, 4, 5].iter().copied().cycle().take(NUM_BARS as usize / 2).collect();
    let chords = chords_from_progression(
        &progression,
        2,
        "C",
        ScaleType::Major,
        4,
        &ChordOptions { add_low_octave: true, ..Default::default() },
        1.0,
        TimeSignature::COMMON,
    )?;
    let mut chord_core = PatternCore::new("chords", NUM_BARS, tempo, 1.0 / 16.0);
    chord_core.add_notes(
        &chords,
        pad,
        Adsr { attack_ms: 20.0, release_ms: 250.0, ..Default::default() },
    );

    let melody_id = project.track.add_pattern_core(melody_core)?;
    let chord_id = project.track.add_pattern_core(chord_core)?;
    project.track.add_pattern(
        melody_id,
        0,
        0.0,
        Some(Channel::from_desc(&ChannelDesc::new(
            "lead",
            vec![EffectDesc::Highpass { cutoff_hz: 180.0 }, EffectDesc::Gain { db: -9.0 }],
        ))),
    )?;
    project.track.add_pattern(
        chord_id,
        0,
        0.0,
        Some(Channel::from_desc(&ChannelDesc::new(
            "pad",
            vec![
                EffectDesc::Lowpass { cutoff_hz: 3500.0 },
                EffectDesc::Reverb { room_size: 0.6, damping: 0.4, wet: 0.25, dry: 0.8, width: 1.0 },
                EffectDesc::Gain { db: -15.0 },
            ],
        ))),
    )?;

    // Drums
    let kick = project.clip_from_buffer("kick", synth_kick(), None, -6.0)?;
    let hat = project.clip_from_buffer("hat", synth_hat(), Some(0.5), 0.0)?;
    arrange::place_every_beat(&mut project.track, kick, NUM_BARS, 8, None)?;
    arrange::place_every_beat(
        &mut project.track,
        hat,
        NUM_BARS,
        8,
        Some(&ChannelDesc::new(
            "hat",
            vec![EffectDesc::Highpass { cutoff_hz: 2000.0 }, EffectDesc::Gain { db: -22.0 }],
        )),
    )?;

    let rendered = project.render(-4.0)?;
    project.save_wav(out_path, &rendered)?;
    println!(
        "Wrote {} ({:.1}s, peak {:.3})",
        out_path,
        rendered.len() as f64 / SAMPLE_RATE as f64,
        rendered.peak()
    );

    if let Some(json) = json_path {
        project.save_json(json)?;
        println!("Wrote {}", json);
    }
    if play {
        println!("Playing...");
        project.preview(&rendered)?;
    }
    Ok(())
}

/// One slightly detuned sawtooth note per preset slot, faded toward the
/// slot end to avoid slice clicks.
fn synth_preset_source(level: f64) -> StereoBuffer {
    let slot_frames = 60.0 * SAMPLE_RATE as f64 / LOAD_BPM as f64;
    let total = (KEY_COUNT as f64 * slot_frames).ceil() as usize;
    let mut frames = Vec::with_capacity(total);
    for i in 0..total {
        let slot = ((i as f64 / slot_frames) as usize).min(KEY_COUNT as usize - 1);
        let key = PianoKey::from_index(slot as u8).expect("slot within keyboard");
        let freq = 440.0 * 2f64.powf((key.midi() as f64 - 69.0) / 12.0);
        let t = (i as f64 - slot as f64 * slot_frames) / SAMPLE_RATE as f64;
        let fade = 1.0 - 0.4 * (t * LOAD_BPM as f64 / 60.0).min(1.0);
        let saw = 2.0 * (freq * t).fract() - 1.0;
        let detuned = 2.0 * (freq * 1.003 * t).fract() - 1.0;
        frames.push(Frame {
            left: ((saw * 0.7 + detuned * 0.3) * level * fade) as f32,
            right: ((saw * 0.3 + detuned * 0.7) * level * fade) as f32,
        });
    }
    StereoBuffer::from_frames(frames)
}

/// Decaying sine sweep.
fn synth_kick() -> StereoBuffer {
    let len = (0.25 * SAMPLE_RATE as f64) as usize;
    let frames = (0..len)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE as f64;
            let freq = (150.0 - 400.0 * t).max(45.0);
            let env = (-t * 18.0).exp();
            Frame::mono(((std::f64::consts::TAU * freq * t).sin() * env * 0.9) as f32)
        })
        .collect();
    StereoBuffer::from_frames(frames)
}

/// Short burst of deterministic pseudo-noise.
fn synth_hat() -> StereoBuffer {
    let len = (0.05 * SAMPLE_RATE as f64) as usize;
    let mut state: u32 = 0x1234_5678;
    let frames = (0..len)
        .map(|_| {
            // xorshift noise
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let noise = (state as f64 / u32::MAX as f64) * 2.0 - 1.0;
            Frame::mono((noise * 0.5) as f32)
        })
        .collect();
    StereoBuffer::from_frames(frames)
}
