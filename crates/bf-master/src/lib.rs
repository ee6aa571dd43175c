//! Headless controller for beatforge.
//!
//! Ties the crates together behind one surface: explicit asset
//! configuration (no ambient directory globals), preset/clip loading,
//! track rendering, WAV export, JSON descriptors and preview playback.

pub mod arrange;

use bf_audio::AudioError;
use bf_dsp::{Preset, PresetBank, RenderError, SampleCoreId, Track, TrackError};
use bf_formats::FormatError;
use bf_gen::GenError;
use bf_ir::{PresetId, SampleCore, StereoBuffer, Tempo, TimeError, TimeSignature};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Error type for controller operations.
#[derive(Debug)]
pub enum MasterError {
    Format(FormatError),
    Gen(GenError),
    Render(RenderError),
    Track(TrackError),
    Time(TimeError),
    Audio(AudioError),
    Json(String),
}

impl fmt::Display for MasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MasterError::Format(e) => write!(f, "{}", e),
            MasterError::Gen(e) => write!(f, "{}", e),
            MasterError::Render(e) => write!(f, "{}", e),
            MasterError::Track(e) => write!(f, "{}", e),
            MasterError::Time(e) => write!(f, "{}", e),
            MasterError::Audio(e) => write!(f, "{}", e),
            MasterError::Json(msg) => write!(f, "descriptor serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for MasterError {}

impl From<FormatError> for MasterError {
    fn from(e: FormatError) -> Self {
        MasterError::Format(e)
    }
}

impl From<GenError> for MasterError {
    fn from(e: GenError) -> Self {
        MasterError::Gen(e)
    }
}

impl From<RenderError> for MasterError {
    fn from(e: RenderError) -> Self {
        MasterError::Render(e)
    }
}

impl From<TrackError> for MasterError {
    fn from(e: TrackError) -> Self {
        MasterError::Track(e)
    }
}

impl From<TimeError> for MasterError {
    fn from(e: TimeError) -> Self {
        MasterError::Time(e)
    }
}

impl From<AudioError> for MasterError {
    fn from(e: AudioError) -> Self {
        MasterError::Audio(e)
    }
}

/// Where assets live and how presets are sliced.
///
/// Passed explicitly wherever assets are loaded; there is no module-level
/// directory state to reassign.
#[derive(Clone, Debug)]
pub struct AssetConfig {
    /// Directory holding multi-note preset recordings
    pub preset_dir: PathBuf,
    /// Directory holding one-shot clips and loops
    pub sample_dir: PathBuf,
    /// Tempo the preset recordings were performed at (one note per beat)
    pub load_bpm: u32,
    /// Rate every asset is resampled to on load
    pub sample_rate: u32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            preset_dir: PathBuf::from("presets"),
            sample_dir: PathBuf::from("samples"),
            load_bpm: 64,
            sample_rate: 44100,
        }
    }
}

/// A composition in progress: one track plus the preset bank its notes
/// reference.
pub struct Project {
    config: AssetConfig,
    pub track: Track,
    pub bank: PresetBank,
}

impl Project {
    /// Create a project with a "HH:MM:SS"-style track length.
    pub fn new(
        name: &str,
        bpm: u32,
        signature: TimeSignature,
        length: &str,
        config: AssetConfig,
    ) -> Result<Self, MasterError> {
        let tempo = Tempo::new(bpm, config.sample_rate, signature);
        let track = Track::with_length(name, tempo, length)?;
        Ok(Self { config, track, bank: PresetBank::new() })
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    pub fn tempo(&self) -> Tempo {
        *self.track.tempo()
    }

    /// Load a preset recording from the configured preset directory.
    pub fn load_preset(&mut self, file: &str) -> Result<PresetId, MasterError> {
        let path = self.config.preset_dir.join(file);
        let (source, native_rate) =
            bf_formats::load_wav_file(&path, Some(self.config.sample_rate), false)?;
        info!(file, native_rate, "loaded preset source");
        let preset = Preset::from_source(
            file_stem(&path),
            &source,
            self.config.sample_rate,
            self.config.load_bpm,
        )?;
        Ok(self.bank.insert(preset))
    }

    /// Build a preset from an in-memory source (synthesized or pre-decoded).
    pub fn preset_from_source(
        &mut self,
        name: &str,
        source: &StereoBuffer,
    ) -> Result<PresetId, MasterError> {
        let preset =
            Preset::from_source(name, source, self.config.sample_rate, self.config.load_bpm)?;
        Ok(self.bank.insert(preset))
    }

    /// Load a clip from the configured sample directory, optionally
    /// truncated to a beat count.
    pub fn load_clip(
        &mut self,
        file: &str,
        truncate_beats: Option<f64>,
        gain_db: f32,
    ) -> Result<SampleCoreId, MasterError> {
        let path = self.config.sample_dir.join(file);
        let (buffer, native_rate) =
            bf_formats::load_wav_file(&path, Some(self.config.sample_rate), false)?;
        info!(file, native_rate, frames = buffer.len(), "loaded clip");
        self.clip_from_buffer(file_stem(&path), buffer, truncate_beats, gain_db)
    }

    /// Pool an in-memory clip on the track.
    pub fn clip_from_buffer(
        &mut self,
        name: &str,
        buffer: StereoBuffer,
        truncate_beats: Option<f64>,
        gain_db: f32,
    ) -> Result<SampleCoreId, MasterError> {
        let tempo = self.tempo();
        let core = match truncate_beats {
            Some(beats) => {
                SampleCore::truncated(name, buffer, self.config.sample_rate, &tempo, beats)
            }
            None => SampleCore::new(name, buffer, self.config.sample_rate),
        };
        Ok(self.track.add_sample_core(core.with_gain(gain_db))?)
    }

    /// Render the track through its master gain stage.
    pub fn render(&mut self, master_gain_db: f32) -> Result<StereoBuffer, MasterError> {
        let out = self.track.render(master_gain_db, &self.bank)?;
        info!(
            frames = out.len(),
            seconds = out.len() as f64 / self.config.sample_rate as f64,
            peak = out.peak() as f64,
            "rendered track"
        );
        Ok(out)
    }

    /// Write a rendered buffer to a WAV file.
    pub fn save_wav(&self, path: impl AsRef<Path>, buffer: &StereoBuffer) -> Result<(), MasterError> {
        bf_formats::save_wav_file(path, buffer, self.config.sample_rate)?;
        Ok(())
    }

    /// Write the track's JSON descriptor.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), MasterError> {
        let desc = self.track.describe(&self.bank);
        let json = serde_json::to_string_pretty(&desc).map_err(|e| MasterError::Json(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| MasterError::Format(FormatError::Io(e.to_string())))
    }

    /// Play a rendered buffer on the default output device, resampling to
    /// the device rate when needed.
    pub fn preview(&self, buffer: &StereoBuffer) -> Result<(), MasterError> {
        let rate = self.config.sample_rate;
        match bf_audio::play_buffer(buffer, rate) {
            Err(AudioError::RateMismatch { device, .. }) => {
                let adapted = bf_formats::resample(buffer, rate, device);
                Ok(bf_audio::play_buffer(&adapted, device)?)
            }
            other => Ok(other?),
        }
    }
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed")
}
