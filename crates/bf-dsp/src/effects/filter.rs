//! Biquad high-/low-pass filters (Butterworth Q).

use biquad::{Biquad, Coefficients, DirectForm1, ToHertz, Type, Q_BUTTERWORTH_F32};
use bf_ir::{EffectDesc, StereoBuffer};

use super::Effect;

/// Which pass band a filter keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PassKind {
    High,
    Low,
}

/// A stereo second-order IIR filter with per-channel history.
struct PassFilter {
    kind: PassKind,
    cutoff_hz: f32,
    /// Sample rate the current coefficients were computed for (0 = none)
    coeff_rate: u32,
    left: DirectForm1<f32>,
    right: DirectForm1<f32>,
}

impl PassFilter {
    fn new(kind: PassKind, cutoff_hz: f32) -> Self {
        // Placeholder coefficients; recomputed on first process call.
        let coeffs = coefficients(kind, cutoff_hz, 44100);
        Self {
            kind,
            cutoff_hz,
            coeff_rate: 0,
            left: DirectForm1::<f32>::new(coeffs),
            right: DirectForm1::<f32>::new(coeffs),
        }
    }

    fn ensure_rate(&mut self, sample_rate: u32) {
        if self.coeff_rate != sample_rate {
            let coeffs = coefficients(self.kind, self.cutoff_hz, sample_rate);
            self.left.update_coefficients(coeffs);
            self.right.update_coefficients(coeffs);
            self.coeff_rate = sample_rate;
        }
    }

    fn run(&mut self, buffer: &mut StereoBuffer, sample_rate: u32) {
        self.ensure_rate(sample_rate);
        for frame in buffer.frames_mut() {
            frame.left = self.left.run(frame.left);
            frame.right = self.right.run(frame.right);
        }
    }

    fn clear(&mut self) {
        self.left.reset_state();
        self.right.reset_state();
    }
}

/// Compute biquad coefficients, clamping the cutoff below Nyquist.
fn coefficients(kind: PassKind, cutoff_hz: f32, sample_rate: u32) -> Coefficients<f32> {
    let filter_type = match kind {
        PassKind::High => Type::HighPass,
        PassKind::Low => Type::LowPass,
    };
    let nyquist = sample_rate as f32 / 2.0;
    let cutoff = cutoff_hz.clamp(1.0, nyquist * 0.999);
    match Coefficients::<f32>::from_params(
        filter_type,
        (sample_rate as f32).hz(),
        cutoff.hz(),
        Q_BUTTERWORTH_F32,
    ) {
        Ok(coeffs) => coeffs,
        // Unreachable with a clamped cutoff; fall back to a unity filter.
        Err(_) => Coefficients { a1: 0.0, a2: 0.0, b0: 1.0, b1: 0.0, b2: 0.0 },
    }
}

/// High-pass filter: attenuates content below the cutoff.
pub struct Highpass {
    inner: PassFilter,
}

impl Highpass {
    pub fn new(cutoff_hz: f32) -> Self {
        Self { inner: PassFilter::new(PassKind::High, cutoff_hz) }
    }
}

impl Effect for Highpass {
    fn process(&mut self, buffer: &mut StereoBuffer, sample_rate: u32) {
        self.inner.run(buffer, sample_rate);
    }

    fn reset(&mut self) {
        self.inner.clear();
    }

    fn describe(&self) -> EffectDesc {
        EffectDesc::Highpass { cutoff_hz: self.inner.cutoff_hz }
    }
}

/// Low-pass filter: attenuates content above the cutoff.
pub struct Lowpass {
    inner: PassFilter,
}

impl Lowpass {
    pub fn new(cutoff_hz: f32) -> Self {
        Self { inner: PassFilter::new(PassKind::Low, cutoff_hz) }
    }
}

impl Effect for Lowpass {
    fn process(&mut self, buffer: &mut StereoBuffer, sample_rate: u32) {
        self.inner.run(buffer, sample_rate);
    }

    fn reset(&mut self) {
        self.inner.clear();
    }

    fn describe(&self) -> EffectDesc {
        EffectDesc::Lowpass { cutoff_hz: self.inner.cutoff_hz }
    }
}
