//! Linear-interpolation sample-rate conversion.

use bf_ir::{Frame, StereoBuffer};

/// Resample a buffer from `from` Hz to `to` Hz.
///
/// Positions between source frames blend the two nearest neighbors;
/// positions past the final frame blend toward silence.
pub fn resample(source: &StereoBuffer, from: u32, to: u32) -> StereoBuffer {
    if from == to || source.is_empty() {
        return source.clone();
    }

    let ratio = from as f64 / to as f64;
    let out_len = (source.len() as f64 * to as f64 / from as f64).round() as usize;
    let frames = source.frames();

    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let index = pos as usize;
        let frac = (pos - index as f64) as f32;

        let a = frames.get(index).copied().unwrap_or(Frame::silence());
        let b = frames.get(index + 1).copied().unwrap_or(Frame::silence());
        out.push(Frame {
            left: a.left + (b.left - a.left) * frac,
            right: a.right + (b.right - a.right) * frac,
        });
    }
    StereoBuffer::from_frames(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_identity() {
        let source = StereoBuffer::from_frames(vec![Frame::mono(0.5); 10]);
        assert_eq!(resample(&source, 44100, 44100), source);
    }

    #[test]
    fn length_scales_with_rate_ratio() {
        let source = StereoBuffer::silence(44100);
        assert_eq!(resample(&source, 44100, 22050).len(), 22050);
        assert_eq!(resample(&source, 22050, 44100).len(), 88200);
    }

    #[test]
    fn constant_signal_stays_constant() {
        let source = StereoBuffer::from_frames(vec![Frame::mono(0.25); 1000]);
        let up = resample(&source, 22050, 44100);
        // all interior samples interpolate between equal neighbors
        for frame in &up.frames()[..up.len() - 2] {
            assert!((frame.left - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn midpoints_average_neighbors_on_upsample() {
        let source = StereoBuffer::from_frames(vec![Frame::mono(0.0), Frame::mono(1.0)]);
        let up = resample(&source, 1, 2);
        assert_eq!(up.len(), 4);
        assert!((up.frames()[1].left - 0.5).abs() < 1e-6);
    }
}
