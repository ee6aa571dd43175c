//! Stereo audio frames and frame-major sample buffers.
//!
//! All core math works on frame-major data: `frames[i]` holds the left and
//! right sample for frame `i`. Decoders returning channel-major data must
//! transpose at the boundary.

/// A stereo audio frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub right: f32,
}

impl Frame {
    /// A silent frame.
    pub const fn silence() -> Self {
        Self { left: 0.0, right: 0.0 }
    }

    /// A frame carrying the same value on both channels.
    pub const fn mono(value: f32) -> Self {
        Self { left: value, right: value }
    }

    /// Sum another frame into this one.
    pub fn mix(&mut self, other: Frame) {
        self.left += other.left;
        self.right += other.right;
    }

    /// Scale both channels.
    pub fn scale(&mut self, gain: f32) {
        self.left *= gain;
        self.right *= gain;
    }
}

/// A frame-major stereo buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StereoBuffer {
    frames: Vec<Frame>,
}

impl StereoBuffer {
    /// Create a silent buffer of `len` frames.
    pub fn silence(len: usize) -> Self {
        Self { frames: vec![Frame::silence(); len] }
    }

    /// Wrap an existing frame vector.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Read-only frame data.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Mutable frame data.
    pub fn frames_mut(&mut self) -> &mut [Frame] {
        &mut self.frames
    }

    /// Append a frame.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Sum `source` into this buffer starting at `offset`.
    ///
    /// Anything extending past the end of this buffer is silently dropped:
    /// tails cut by the track boundary are normal operation, not an error.
    pub fn mix_at(&mut self, offset: usize, source: &StereoBuffer) {
        if offset >= self.frames.len() {
            return;
        }
        let room = self.frames.len() - offset;
        for (dst, src) in self.frames[offset..]
            .iter_mut()
            .zip(source.frames.iter().take(room))
        {
            dst.mix(*src);
        }
    }

    /// Sum `source * gain` into this buffer starting at `offset`.
    pub fn mix_at_scaled(&mut self, offset: usize, source: &StereoBuffer, gain: f32) {
        if offset >= self.frames.len() {
            return;
        }
        let room = self.frames.len() - offset;
        for (dst, src) in self.frames[offset..]
            .iter_mut()
            .zip(source.frames.iter().take(room))
        {
            let mut scaled = *src;
            scaled.scale(gain);
            dst.mix(scaled);
        }
    }

    /// Scale all frames by a linear gain.
    pub fn apply_gain(&mut self, gain: f32) {
        for frame in &mut self.frames {
            frame.scale(gain);
        }
    }

    /// Largest absolute sample value across both channels.
    pub fn peak(&self) -> f32 {
        self.frames
            .iter()
            .flat_map(|f| [f.left.abs(), f.right.abs()])
            .fold(0.0, f32::max)
    }

    /// Drop everything after the first `len` frames.
    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }
}

/// Convert decibels to a linear amplitude factor.
pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}
