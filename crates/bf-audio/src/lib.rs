//! Preview playback for beatforge.
//!
//! Plays fully rendered buffers through the default output device. This is
//! batch output of a finished mix, not a streaming engine; the render
//! pipeline stays offline.

mod cpal_backend;
mod traits;

pub use cpal_backend::CpalOutput;
pub use traits::{AudioError, AudioOutput};

use bf_ir::{Frame, StereoBuffer};

/// Play a rendered buffer to the default device and drain it completely.
///
/// Fails with `RateMismatch` when the device does not run at the buffer's
/// rate; resample first rather than playing at the wrong pitch.
pub fn play_buffer(buffer: &StereoBuffer, sample_rate: u32) -> Result<(), AudioError> {
    let (mut output, consumer) = CpalOutput::new()?;
    let device_rate = output.sample_rate();
    if device_rate != sample_rate {
        return Err(AudioError::RateMismatch { device: device_rate, requested: sample_rate });
    }

    output.build_stream(consumer)?;
    output.start()?;

    for frame in buffer.frames() {
        output.write_spin(*frame);
    }
    // Tail of silence so the ring buffer flushes before the stream drops
    for _ in 0..device_rate / 5 {
        output.write_spin(Frame::silence());
    }
    output.stop()
}
