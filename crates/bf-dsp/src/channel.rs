//! Channels: ordered effect chains with mandatory post-apply reset.

use arrayvec::ArrayString;
use bf_ir::{ChannelDesc, StereoBuffer};

use crate::effects::{build_effect, Effect};

/// An ordered, stateful sequence of effects applied to rendered audio.
///
/// Effects run in insertion order, and each one is reset immediately after
/// it processes. The reset is an invariant, not an optimization: it makes
/// `apply` a pure function of the input buffer, so the same channel object
/// can be reused across renders with different audio. Channel instances
/// are per call site; share a `ChannelDesc` template instead of a channel.
pub struct Channel {
    name: ArrayString<32>,
    effects: Vec<Box<dyn Effect>>,
}

impl Channel {
    pub fn new(name: &str) -> Self {
        let mut channel_name = ArrayString::new();
        let _ = channel_name.try_push_str(name);
        Self { name: channel_name, effects: Vec::new() }
    }

    /// Build a channel from a descriptor template.
    pub fn from_desc(desc: &ChannelDesc) -> Self {
        let mut channel = Self::new(&desc.name);
        for effect_desc in &desc.effects {
            channel.effects.push(build_effect(effect_desc));
        }
        channel
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an effect to the chain.
    pub fn add_effect(&mut self, effect: Box<dyn Effect>) {
        self.effects.push(effect);
    }

    /// Builder-style `add_effect`.
    pub fn with_effect(mut self, effect: Box<dyn Effect>) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Run the buffer through the chain.
    ///
    /// Each effect processes and is then reset unconditionally, in that
    /// order, so no effect history survives into the next apply.
    pub fn apply(&mut self, buffer: &mut StereoBuffer, sample_rate: u32) {
        for effect in &mut self.effects {
            effect.process(buffer, sample_rate);
            effect.reset();
        }
    }

    pub fn describe(&self) -> ChannelDesc {
        ChannelDesc {
            name: self.name.to_string(),
            effects: self.effects.iter().map(|e| e.describe()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Gain, Lowpass};
    use bf_ir::{EffectDesc, Frame};

    fn noise_burst(n: usize) -> StereoBuffer {
        // deterministic pseudo-noise, enough to exercise filter state
        StereoBuffer::from_frames(
            (0..n)
                .map(|i| Frame::mono(((i * 2654435761) % 1000) as f32 / 500.0 - 1.0))
                .collect(),
        )
    }

    #[test]
    fn effects_run_in_order() {
        let mut channel = Channel::new("chain")
            .with_effect(Box::new(Gain::new(-6.0)))
            .with_effect(Box::new(Gain::new(-6.0)));
        let mut buffer = StereoBuffer::from_frames(vec![Frame::mono(1.0)]);
        channel.apply(&mut buffer, 44100);
        let expected = bf_ir::db_to_amplitude(-12.0);
        assert!((buffer.frames()[0].left - expected).abs() < 1e-5);
    }

    #[test]
    fn stateful_effect_reset_between_applies() {
        // A lowpass carries history; after the channel applies it once, a
        // second apply over identical input must be bit-identical.
        let mut channel = Channel::new("filtered").with_effect(Box::new(Lowpass::new(800.0)));

        let mut warmup = noise_burst(512);
        channel.apply(&mut warmup, 44100);

        let mut first = noise_burst(512);
        channel.apply(&mut first, 44100);
        let mut second = noise_burst(512);
        channel.apply(&mut second, 44100);
        assert_eq!(first, second);
        // the warmup pass itself matches too: state never leaked in
        assert_eq!(warmup, first);
    }

    #[test]
    fn desc_round_trip() {
        let desc = ChannelDesc::new(
            "drop_hat",
            vec![
                EffectDesc::Highpass { cutoff_hz: 1000.0 },
                EffectDesc::Gain { db: -24.0 },
            ],
        );
        let channel = Channel::from_desc(&desc);
        assert_eq!(channel.describe(), desc);
        assert_eq!(channel.len(), 2);
    }

    #[test]
    fn empty_channel_is_identity() {
        let mut channel = Channel::new("empty");
        let original = noise_burst(64);
        let mut buffer = original.clone();
        channel.apply(&mut buffer, 44100);
        assert_eq!(buffer, original);
    }
}
