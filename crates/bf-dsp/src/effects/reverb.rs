//! Schroeder reverberator: parallel damped combs into serial allpasses.

use bf_ir::{EffectDesc, StereoBuffer};

use super::Effect;

/// Comb delay lengths in samples at the 44.1 kHz reference rate.
const COMB_TUNINGS: [usize; 4] = [1116, 1188, 1277, 1356];
/// Allpass delay lengths at the reference rate.
const ALLPASS_TUNINGS: [usize; 2] = [556, 225];
/// Right-channel lines run slightly longer for stereo width.
const STEREO_SPREAD: usize = 23;
const REFERENCE_RATE: f64 = 44100.0;

/// A feedback comb filter with a one-pole damped loop.
struct Comb {
    line: Vec<f32>,
    pos: usize,
    feedback: f32,
    damping: f32,
    filter_state: f32,
}

impl Comb {
    fn new(len: usize, feedback: f32, damping: f32) -> Self {
        Self {
            line: vec![0.0; len.max(1)],
            pos: 0,
            feedback,
            damping,
            filter_state: 0.0,
        }
    }

    fn run(&mut self, input: f32) -> f32 {
        let output = self.line[self.pos];
        self.filter_state = output * (1.0 - self.damping) + self.filter_state * self.damping;
        self.line[self.pos] = input + self.filter_state * self.feedback;
        self.pos = (self.pos + 1) % self.line.len();
        output
    }

    fn clear(&mut self) {
        self.line.fill(0.0);
        self.pos = 0;
        self.filter_state = 0.0;
    }
}

/// An allpass diffuser stage.
struct Allpass {
    line: Vec<f32>,
    pos: usize,
}

impl Allpass {
    const GAIN: f32 = 0.5;

    fn new(len: usize) -> Self {
        Self { line: vec![0.0; len.max(1)], pos: 0 }
    }

    fn run(&mut self, input: f32) -> f32 {
        let delayed = self.line[self.pos];
        let output = delayed - input;
        self.line[self.pos] = input + delayed * Self::GAIN;
        self.pos = (self.pos + 1) % self.line.len();
        output
    }

    fn clear(&mut self) {
        self.line.fill(0.0);
        self.pos = 0;
    }
}

/// One channel's comb bank and diffuser chain.
struct ReverbChannel {
    combs: Vec<Comb>,
    allpasses: Vec<Allpass>,
}

impl ReverbChannel {
    fn new(feedback: f32, damping: f32, sample_rate: u32, spread: usize) -> Self {
        let scale = sample_rate as f64 / REFERENCE_RATE;
        let scaled = |len: usize| ((len + spread) as f64 * scale) as usize;
        Self {
            combs: COMB_TUNINGS
                .iter()
                .map(|&len| Comb::new(scaled(len), feedback, damping))
                .collect(),
            allpasses: ALLPASS_TUNINGS
                .iter()
                .map(|&len| Allpass::new(scaled(len)))
                .collect(),
        }
    }

    fn run(&mut self, input: f32) -> f32 {
        let mut sum = 0.0;
        for comb in &mut self.combs {
            sum += comb.run(input);
        }
        for allpass in &mut self.allpasses {
            sum = allpass.run(sum);
        }
        sum
    }

    fn clear(&mut self) {
        for comb in &mut self.combs {
            comb.clear();
        }
        for allpass in &mut self.allpasses {
            allpass.clear();
        }
    }
}

/// Stereo Schroeder reverb.
pub struct Reverb {
    room_size: f32,
    damping: f32,
    wet: f32,
    dry: f32,
    width: f32,
    /// Lazily built for the first processed sample rate
    channels: Option<(ReverbChannel, ReverbChannel)>,
    built_rate: u32,
}

impl Reverb {
    pub fn new(room_size: f32, damping: f32, wet: f32, dry: f32, width: f32) -> Self {
        Self {
            room_size: room_size.clamp(0.0, 1.0),
            damping: damping.clamp(0.0, 1.0),
            wet,
            dry,
            width: width.clamp(0.0, 1.0),
            channels: None,
            built_rate: 0,
        }
    }

    fn ensure_channels(&mut self, sample_rate: u32) {
        if self.channels.is_none() || self.built_rate != sample_rate {
            let feedback = 0.7 + self.room_size * 0.28;
            let damping = self.damping * 0.4;
            self.channels = Some((
                ReverbChannel::new(feedback, damping, sample_rate, 0),
                ReverbChannel::new(feedback, damping, sample_rate, STEREO_SPREAD),
            ));
            self.built_rate = sample_rate;
        }
    }
}

impl Effect for Reverb {
    fn process(&mut self, buffer: &mut StereoBuffer, sample_rate: u32) {
        self.ensure_channels(sample_rate);
        let (wet, dry) = (self.wet, self.dry);
        let wet_same = wet * (self.width / 2.0 + 0.5);
        let wet_cross = wet * ((1.0 - self.width) / 2.0);
        let Some((left_bank, right_bank)) = self.channels.as_mut() else {
            return;
        };

        for frame in buffer.frames_mut() {
            let input = (frame.left + frame.right) * 0.5;
            let rev_l = left_bank.run(input);
            let rev_r = right_bank.run(input);
            frame.left = frame.left * dry + rev_l * wet_same + rev_r * wet_cross;
            frame.right = frame.right * dry + rev_r * wet_same + rev_l * wet_cross;
        }
    }

    fn reset(&mut self) {
        if let Some((left_bank, right_bank)) = self.channels.as_mut() {
            left_bank.clear();
            right_bank.clear();
        }
    }

    fn describe(&self) -> EffectDesc {
        EffectDesc::Reverb {
            room_size: self.room_size,
            damping: self.damping,
            wet: self.wet,
            dry: self.dry,
            width: self.width,
        }
    }
}
