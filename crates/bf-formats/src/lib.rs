//! Audio file I/O for beatforge.
//!
//! WAV is the only on-disk format: decoding accepts 8/16-bit PCM and emits
//! the frame-major f32 layout the rest of the toolkit computes in, with
//! optional resampling to a target rate at the boundary.

mod resample;
mod wav;

pub use resample::resample;
pub use wav::{decode_wav, encode_wav, write_wav, FormatError};

use bf_ir::{Frame, StereoBuffer};
use std::fs;
use std::path::Path;

/// Load a WAV file, optionally resampled to `target_sample_rate` and
/// collapsed to dual mono.
///
/// Returns the buffer at its final rate plus the file's native rate.
pub fn load_wav_file(
    path: impl AsRef<Path>,
    target_sample_rate: Option<u32>,
    mono: bool,
) -> Result<(StereoBuffer, u32), FormatError> {
    let data = fs::read(path)?;
    let (mut buffer, native_rate) = decode_wav(&data)?;

    if mono {
        for frame in buffer.frames_mut() {
            *frame = Frame::mono((frame.left + frame.right) * 0.5);
        }
    }
    if let Some(target) = target_sample_rate {
        if target != native_rate {
            buffer = resample(&buffer, native_rate, target);
        }
    }
    Ok((buffer, native_rate))
}

/// Write a buffer to a WAV file on disk (16-bit stereo PCM).
pub fn save_wav_file(
    path: impl AsRef<Path>,
    buffer: &StereoBuffer,
    sample_rate: u32,
) -> Result<(), FormatError> {
    let file = fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_wav(&mut writer, buffer, sample_rate)?;
    Ok(())
}
