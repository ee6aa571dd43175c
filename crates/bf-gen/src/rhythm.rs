//! Poisson-process rhythm generation on a quantized beat grid.
//!
//! A rhythm is a reusable timing template: a list of place-holders
//! `(value, start, end)` in beats, decoupled from pitch content. Generation
//! is seeded and deterministic; longer spans are produced by tiling the
//! generated repeat unit.

use std::fmt;

use arrayvec::ArrayString;
use bf_ir::TimeSignature;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Error type for generation.
#[derive(Clone, Debug, PartialEq)]
pub enum GenError {
    /// Candidate note values empty, non-positive, or weights mismatched
    BadNoteValues(String),
    /// Requested onset distribution is not implemented
    UnsupportedDistribution(&'static str),
    /// Theory lookup failed (unknown root, out-of-range pitch)
    Theory(bf_ir::TheoryError),
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::BadNoteValues(msg) => write!(f, "bad note values: {}", msg),
            GenError::UnsupportedDistribution(name) => {
                write!(f, "onset distribution {:?} is not implemented", name)
            }
            GenError::Theory(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GenError {}

impl From<bf_ir::TheoryError> for GenError {
    fn from(e: bf_ir::TheoryError) -> Self {
        GenError::Theory(e)
    }
}

/// A generated rhythmic slot: note value (fraction of a whole note) plus
/// onset and end in beats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaceHolder {
    pub value: f64,
    pub start: f64,
    pub end: f64,
}

/// Distribution of the gap (in grid steps) between one note's end and the
/// next note's onset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OnsetDistribution {
    /// Poisson-distributed gap with the given rate
    Poisson { lambda: f64 },
    /// Uniformly distributed gap (declared, not implemented)
    Uniform { min_steps: u32, max_steps: u32 },
}

/// A seeded rhythm template over a fixed repeat unit.
#[derive(Clone, Debug)]
pub struct Rhythm {
    name: ArrayString<32>,
    repeat_bars: u32,
    signature: TimeSignature,
    /// Grid step as a fraction of a whole note (1/16 = sixteenth grid)
    resolution: f64,
    place_holders: Vec<PlaceHolder>,
}

impl Rhythm {
    pub fn new(name: &str, repeat_bars: u32, signature: TimeSignature, resolution: f64) -> Self {
        let mut rhythm_name = ArrayString::new();
        let _ = rhythm_name.try_push_str(name);
        Self {
            name: rhythm_name,
            repeat_bars,
            signature,
            resolution,
            place_holders: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repeat_bars(&self) -> u32 {
        self.repeat_bars
    }

    pub fn signature(&self) -> TimeSignature {
        self.signature
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// The generated place-holders for one repeat unit.
    pub fn place_holders(&self) -> &[PlaceHolder] {
        &self.place_holders
    }

    /// Beats in one repeat unit.
    pub fn unit_beats(&self) -> f64 {
        self.repeat_bars as f64 * self.signature.beats_per_bar() as f64
    }

    /// Generate place-holders for one repeat unit.
    ///
    /// Walks forward from beat 0: each iteration draws a gap of
    /// `poisson(lambda)` grid steps after the previous note's end, then a
    /// note value from `note_values` (weighted when `weights` is given).
    /// A candidate whose end would cross the repeat-unit boundary is
    /// discarded and generation stops; the partial final note is dropped,
    /// never truncated. Calling again regenerates from scratch.
    pub fn generate(
        &mut self,
        seed: u64,
        note_values: &[f64],
        weights: Option<&[f64]>,
        distribution: OnsetDistribution,
    ) -> Result<(), GenError> {
        let lambda = match distribution {
            OnsetDistribution::Poisson { lambda } => lambda,
            OnsetDistribution::Uniform { .. } => {
                return Err(GenError::UnsupportedDistribution("uniform"))
            }
        };
        if note_values.is_empty() {
            return Err(GenError::BadNoteValues("empty candidate list".into()));
        }
        if note_values.iter().any(|&v| v <= 0.0) {
            return Err(GenError::BadNoteValues("note values must be positive".into()));
        }
        let chooser = match weights {
            Some(w) => {
                if w.len() != note_values.len() {
                    return Err(GenError::BadNoteValues(format!(
                        "{} weights for {} note values",
                        w.len(),
                        note_values.len()
                    )));
                }
                Some(WeightedIndex::new(w).map_err(|e| GenError::BadNoteValues(e.to_string()))?)
            }
            None => None,
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let beat_value = self.signature.beat_value();
        let total_beats = self.unit_beats();

        self.place_holders.clear();
        let mut end = 0.0;
        while end < total_beats {
            let gap = poisson(&mut rng, lambda) as f64 * self.resolution / beat_value;
            let start = end + gap;
            let index = match &chooser {
                Some(weighted) => weighted.sample(&mut rng),
                None => rng.gen_range(0..note_values.len()),
            };
            let value = note_values[index];
            let candidate_end = start + value / beat_value;
            if candidate_end > total_beats {
                break;
            }
            end = candidate_end;
            self.place_holders.push(PlaceHolder { value, start, end });
        }
        Ok(())
    }

    /// Tile the generated unit across `total_bars`.
    ///
    /// Integer division: a trailing span shorter than the repeat unit is
    /// silently dropped, so output always covers whole repeat units. Each
    /// copy's onsets shift by `copy * repeat_bars * beats_per_bar` beats.
    pub fn repeat(&self, total_bars: u32) -> Vec<PlaceHolder> {
        let copies = total_bars / self.repeat_bars;
        let unit_beats = self.unit_beats();
        let mut tiled = Vec::with_capacity(copies as usize * self.place_holders.len());
        for copy in 0..copies {
            let shift = copy as f64 * unit_beats;
            tiled.extend(self.place_holders.iter().map(|p| PlaceHolder {
                value: p.value,
                start: p.start + shift,
                end: p.end + shift,
            }));
        }
        tiled
    }
}

/// Draw a Poisson variate via Knuth's product-of-uniforms method.
fn poisson(rng: &mut StdRng, lambda: f64) -> u32 {
    let threshold = (-lambda).exp();
    let mut count = 0;
    let mut product: f64 = rng.gen();
    while product > threshold {
        count += 1;
        product *= rng.gen::<f64>();
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALUES: [f64; 3] = [2.0 / 16.0, 3.0 / 16.0, 4.0 / 16.0];

    fn sixteenth_rhythm(bars: u32) -> Rhythm {
        Rhythm::new("test", bars, TimeSignature::COMMON, 1.0 / 16.0)
    }

    #[test]
    fn same_seed_same_rhythm() {
        let mut a = sixteenth_rhythm(4);
        let mut b = sixteenth_rhythm(4);
        a.generate(42, &VALUES, None, OnsetDistribution::Poisson { lambda: 0.5 }).unwrap();
        b.generate(42, &VALUES, None, OnsetDistribution::Poisson { lambda: 0.5 }).unwrap();
        assert_eq!(a.place_holders(), b.place_holders());
        assert!(!a.place_holders().is_empty());
    }

    #[test]
    fn regenerating_replaces_previous_holders() {
        let mut rhythm = sixteenth_rhythm(4);
        rhythm.generate(1, &VALUES, None, OnsetDistribution::Poisson { lambda: 0.5 }).unwrap();
        let first = rhythm.place_holders().to_vec();
        rhythm.generate(1, &VALUES, None, OnsetDistribution::Poisson { lambda: 0.5 }).unwrap();
        assert_eq!(rhythm.place_holders(), &first[..]);
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = sixteenth_rhythm(4);
        let mut b = sixteenth_rhythm(4);
        a.generate(42, &VALUES, None, OnsetDistribution::Poisson { lambda: 0.5 }).unwrap();
        b.generate(43, &VALUES, None, OnsetDistribution::Poisson { lambda: 0.5 }).unwrap();
        assert_ne!(a.place_holders(), b.place_holders());
    }

    #[test]
    fn holders_stay_inside_unit_and_ordered() {
        let mut rhythm = sixteenth_rhythm(4);
        rhythm.generate(7, &VALUES, None, OnsetDistribution::Poisson { lambda: 1.0 }).unwrap();
        let total = rhythm.unit_beats();
        let mut prev_end = 0.0;
        for holder in rhythm.place_holders() {
            assert!(holder.start >= prev_end);
            assert!(holder.end <= total);
            assert!(holder.end > holder.start);
            prev_end = holder.end;
        }
    }

    #[test]
    fn weighted_choice_respects_zero_weights() {
        let mut rhythm = sixteenth_rhythm(8);
        rhythm
            .generate(
                3,
                &VALUES,
                Some(&[0.0, 0.0, 1.0]),
                OnsetDistribution::Poisson { lambda: 0.5 },
            )
            .unwrap();
        assert!(rhythm
            .place_holders()
            .iter()
            .all(|p| (p.value - VALUES[2]).abs() < 1e-12));
    }

    #[test]
    fn uniform_distribution_not_implemented() {
        let mut rhythm = sixteenth_rhythm(4);
        let result = rhythm.generate(
            0,
            &VALUES,
            None,
            OnsetDistribution::Uniform { min_steps: 0, max_steps: 4 },
        );
        assert_eq!(result, Err(GenError::UnsupportedDistribution("uniform")));
    }

    #[test]
    fn bad_note_values_rejected() {
        let mut rhythm = sixteenth_rhythm(4);
        let poisson = OnsetDistribution::Poisson { lambda: 0.5 };
        assert!(rhythm.generate(0, &[], None, poisson).is_err());
        assert!(rhythm.generate(0, &[0.25, -0.125], None, poisson).is_err());
        assert!(rhythm.generate(0, &VALUES, Some(&[1.0]), poisson).is_err());
    }

    #[test]
    fn repeat_tiles_whole_units_and_drops_remainder() {
        let mut rhythm = sixteenth_rhythm(2);
        rhythm.generate(11, &VALUES, None, OnsetDistribution::Poisson { lambda: 0.5 }).unwrap();
        let per_unit = rhythm.place_holders().len();
        assert!(per_unit > 0);

        // 7 bars of a 2-bar unit: 3 copies, the 7th bar is dropped
        let tiled = rhythm.repeat(7);
        assert_eq!(tiled.len(), per_unit * 3);

        let unit_beats = rhythm.unit_beats();
        for (i, holder) in tiled.iter().enumerate() {
            let copy = (i / per_unit) as f64;
            let base = &rhythm.place_holders()[i % per_unit];
            assert!((holder.start - (base.start + copy * unit_beats)).abs() < 1e-9);
            assert!((holder.end - (base.end + copy * unit_beats)).abs() < 1e-9);
        }
    }

    #[test]
    fn poisson_mean_tracks_lambda() {
        let mut rng = StdRng::seed_from_u64(9);
        let n = 20_000;
        let sum: u64 = (0..n).map(|_| poisson(&mut rng, 2.0) as u64).sum();
        let mean = sum as f64 / n as f64;
        assert!((mean - 2.0).abs() < 0.1, "mean {} far from lambda", mean);
    }
}
