//! Beat-grid placement helpers for percussion and loops.
//!
//! Every placement builds its own channel instance from the shared
//! descriptor template, so effect chains are never shared between call
//! sites.

use bf_dsp::{Channel, SampleCoreId, Track, TrackError};
use bf_ir::ChannelDesc;

/// Place a clip on every beat of `num_bars` bars.
///
/// When `blank_every` is nonzero, every `blank_every`-th bar is left
/// empty (the breakdown-bar convention).
pub fn place_every_beat(
    track: &mut Track,
    clip: SampleCoreId,
    num_bars: u32,
    blank_every: u32,
    channel: Option<&ChannelDesc>,
) -> Result<(), TrackError> {
    let beats_per_bar = track.tempo().signature.beats_per_bar();
    for bar in 0..num_bars {
        if is_blank_bar(bar, blank_every) {
            continue;
        }
        for beat in 0..beats_per_bar {
            track.add_sample(clip, bar, beat as f64, channel.map(Channel::from_desc))?;
        }
    }
    Ok(())
}

/// Place a clip at the start of each of `num_bars` bars.
pub fn place_every_bar(
    track: &mut Track,
    clip: SampleCoreId,
    num_bars: u32,
    blank_every: u32,
    channel: Option<&ChannelDesc>,
) -> Result<(), TrackError> {
    for bar in 0..num_bars {
        if is_blank_bar(bar, blank_every) {
            continue;
        }
        track.add_sample(clip, bar, 0.0, channel.map(Channel::from_desc))?;
    }
    Ok(())
}

fn is_blank_bar(bar: u32, blank_every: u32) -> bool {
    blank_every != 0 && (bar + 1) % blank_every == 0
}
