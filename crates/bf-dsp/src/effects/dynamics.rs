//! Feed-forward compressor with an attack/release envelope follower.

use bf_ir::{EffectDesc, StereoBuffer};

use super::Effect;

/// Downward compressor: gain above the threshold is reduced by `ratio`.
pub struct Compressor {
    threshold_db: f32,
    ratio: f32,
    attack_ms: f32,
    release_ms: f32,
    /// Follower level in linear amplitude
    envelope: f32,
}

impl Compressor {
    pub fn new(threshold_db: f32, ratio: f32, attack_ms: f32, release_ms: f32) -> Self {
        Self {
            threshold_db,
            ratio: ratio.max(1.0),
            attack_ms: attack_ms.max(0.0),
            release_ms: release_ms.max(0.0),
            envelope: 0.0,
        }
    }

    /// One-pole smoothing coefficient for a time constant in ms.
    fn coefficient(ms: f32, sample_rate: u32) -> f32 {
        if ms <= 0.0 {
            return 0.0;
        }
        (-1.0 / (ms * 1e-3 * sample_rate as f32)).exp()
    }
}

impl Effect for Compressor {
    fn process(&mut self, buffer: &mut StereoBuffer, sample_rate: u32) {
        let attack = Self::coefficient(self.attack_ms, sample_rate);
        let release = Self::coefficient(self.release_ms, sample_rate);
        let slope = 1.0 / self.ratio - 1.0;

        for frame in buffer.frames_mut() {
            let level = frame.left.abs().max(frame.right.abs());
            let coefficient = if level > self.envelope { attack } else { release };
            self.envelope = coefficient * self.envelope + (1.0 - coefficient) * level;

            let envelope_db = 20.0 * self.envelope.max(1e-6).log10();
            let over_db = envelope_db - self.threshold_db;
            if over_db > 0.0 {
                let gain = 10f32.powf(over_db * slope / 20.0);
                frame.left *= gain;
                frame.right *= gain;
            }
        }
    }

    fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn describe(&self) -> EffectDesc {
        EffectDesc::Compressor {
            threshold_db: self.threshold_db,
            ratio: self.ratio,
            attack_ms: self.attack_ms,
            release_ms: self.release_ms,
        }
    }
}
