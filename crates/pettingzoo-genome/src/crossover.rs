//! Recombination of two parent chromosomes into two children.
//!
//! All strategies work segment by segment on whole genes, never on raw bytes,
//! so a weight is never split between parents and the header (and therefore
//! the topology) is copied unchanged from the parents.
//!
//! | Strategy | Masks | Weights |
//! |---|---|---|
//! | [`BreedStrategy::Uniform`] | per-gene coin flip | per-gene coin flip |
//! | [`BreedStrategy::OnePoint`] | one cut per segment | one cut per segment |
//! | [`BreedStrategy::Blend`] | per-gene coin flip | `w·a + (1−w)·b`, one `w` per segment |
//!
//! In every case the second child is the mirror of the first: wherever child A
//! took a gene from parent A, child B took it from parent B.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Chromosome,
    chromosome::decode_f32,
    layout::{GeneKind, WEIGHT_SIZE},
};

/// How two parents are recombined.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum BreedStrategy {
    /// Every gene independently from either parent.
    #[default]
    #[display("uniform")]
    Uniform,
    /// One cut point per segment; genes after the cut are exchanged.
    #[display("one-point")]
    OnePoint,
    /// Weights are blended arithmetically; masks are crossed uniformly.
    #[display("blend")]
    Blend,
}

impl BreedStrategy {
    pub const ALL: [BreedStrategy; 3] = [
        BreedStrategy::Uniform,
        BreedStrategy::OnePoint,
        BreedStrategy::Blend,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown breed strategy `{input}` (expected uniform, one-point, blend or 0-2)")]
pub struct ParseBreedStrategyError {
    pub input: String,
}

/// Accepts the strategy names and their numeric indices (`0`, `1`, `2`).
impl FromStr for BreedStrategy {
    type Err = ParseBreedStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" | "0" => Ok(Self::Uniform),
            "one-point" | "one_point" | "onepoint" | "1" => Ok(Self::OnePoint),
            "blend" | "2" => Ok(Self::Blend),
            _ => Err(ParseBreedStrategyError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Produces two children from `a` and `b`.
///
/// Neither parent is modified. The result depends only on the parents, the
/// strategy and the RNG state.
///
/// # Panics
///
/// Panics if the parents have different topologies.
pub fn breed<R>(
    a: &Chromosome,
    b: &Chromosome,
    strategy: BreedStrategy,
    rng: &mut R,
) -> (Chromosome, Chromosome)
where
    R: Rng + ?Sized,
{
    assert_eq!(
        a.topology(),
        b.topology(),
        "cannot breed chromosomes of different topology"
    );
    let mut child_a = a.clone();
    let mut child_b = b.clone();

    for span in a.layout().spans() {
        let width = span.kind().width();
        let xs = child_a.segment_bytes_mut(span);
        let ys = child_b.segment_bytes_mut(span);
        match (strategy, span.kind()) {
            (BreedStrategy::Uniform, _) | (BreedStrategy::Blend, GeneKind::Mask) => {
                uniform(xs, ys, width, rng);
            }
            (BreedStrategy::OnePoint, _) => {
                let cut = rng.random_range(0..=span.len()) * width;
                xs[cut..].swap_with_slice(&mut ys[cut..]);
            }
            (BreedStrategy::Blend, GeneKind::Weight) => blend(xs, ys, rng),
        }
    }

    (child_a, child_b)
}

fn uniform<R>(xs: &mut [u8], ys: &mut [u8], width: usize, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for (x, y) in xs.chunks_exact_mut(width).zip(ys.chunks_exact_mut(width)) {
        if rng.random_bool(0.5) {
            x.swap_with_slice(y);
        }
    }
}

fn blend<R>(xs: &mut [u8], ys: &mut [u8], rng: &mut R)
where
    R: Rng + ?Sized,
{
    let w: f32 = rng.random();
    for (x, y) in xs
        .chunks_exact_mut(WEIGHT_SIZE)
        .zip(ys.chunks_exact_mut(WEIGHT_SIZE))
    {
        let (p, q) = (decode_f32(x), decode_f32(y));
        x.copy_from_slice(&(w * p + (1.0 - w) * q).to_le_bytes());
        y.copy_from_slice(&(w * q + (1.0 - w) * p).to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{Segment, Topology};

    fn parents() -> (Chromosome, Chromosome) {
        let topology = Topology::new(4, 4, 2, 8);
        let mut rng = Pcg32::seed_from_u64(11);
        (
            Chromosome::generate(topology, &mut rng).unwrap(),
            Chromosome::generate(topology, &mut rng).unwrap(),
        )
    }

    fn weights(chrom: &Chromosome) -> Vec<f32> {
        chrom.input_weights().iter().collect()
    }

    #[test]
    fn children_keep_topology_and_parents_are_untouched() {
        let (a, b) = parents();
        let (a0, b0) = (a.clone(), b.clone());
        for strategy in BreedStrategy::ALL {
            let (x, y) = breed(&a, &b, strategy, &mut Pcg32::seed_from_u64(1));
            assert_eq!(x.topology(), a.topology(), "{strategy}");
            assert_eq!(y.size(), b.size(), "{strategy}");
            assert_eq!(a, a0);
            assert_eq!(b, b0);
        }
    }

    #[test]
    fn same_seed_gives_same_children() {
        let (a, b) = parents();
        for strategy in BreedStrategy::ALL {
            let first = breed(&a, &b, strategy, &mut Pcg32::seed_from_u64(42));
            let second = breed(&a, &b, strategy, &mut Pcg32::seed_from_u64(42));
            assert_eq!(first, second, "{strategy}");
        }
    }

    #[test]
    fn uniform_children_are_complementary() {
        let (a, b) = parents();
        let (x, y) = breed(&a, &b, BreedStrategy::Uniform, &mut Pcg32::seed_from_u64(3));
        let (wa, wb, wx, wy) = (weights(&a), weights(&b), weights(&x), weights(&y));
        let mut from_b = 0;
        for i in 0..wa.len() {
            if wx[i].to_bits() == wa[i].to_bits() && wy[i].to_bits() == wb[i].to_bits() {
                continue;
            }
            assert_eq!(wx[i].to_bits(), wb[i].to_bits());
            assert_eq!(wy[i].to_bits(), wa[i].to_bits());
            from_b += 1;
        }
        assert!(from_b > 0 && from_b < wa.len());
    }

    #[test]
    fn one_point_swaps_a_suffix() {
        let (a, b) = parents();
        let (x, _) = breed(&a, &b, BreedStrategy::OnePoint, &mut Pcg32::seed_from_u64(8));
        let (wa, wb, wx) = (weights(&a), weights(&b), weights(&x));
        let cut = wx
            .iter()
            .zip(&wa)
            .position(|(x, a)| x.to_bits() != a.to_bits())
            .unwrap_or(wa.len());
        for i in cut..wa.len() {
            assert_eq!(wx[i].to_bits(), wb[i].to_bits(), "gene {i} after cut {cut}");
        }
    }

    #[test]
    fn blend_weights_lie_between_parents() {
        let (a, b) = parents();
        let (x, y) = breed(&a, &b, BreedStrategy::Blend, &mut Pcg32::seed_from_u64(5));
        let span = a.locate(Segment::OutputWeights).unwrap();
        assert_eq!(span.len(), x.output_weights().iter().count());
        for (((p, q), cx), cy) in a
            .output_weights()
            .iter()
            .zip(b.output_weights().iter())
            .zip(x.output_weights().iter())
            .zip(y.output_weights().iter())
        {
            let (lo, hi) = (p.min(q) - 1e-6, p.max(q) + 1e-6);
            assert!((lo..=hi).contains(&cx));
            assert!((lo..=hi).contains(&cy));
            assert!((cx + cy - (p + q)).abs() < 1e-5);
        }
    }

    #[test]
    fn strategy_parses_names_and_indices() {
        assert_eq!("uniform".parse(), Ok(BreedStrategy::Uniform));
        assert_eq!("1".parse(), Ok(BreedStrategy::OnePoint));
        assert_eq!("Blend".parse(), Ok(BreedStrategy::Blend));
        assert!("crossover".parse::<BreedStrategy>().is_err());
        for strategy in BreedStrategy::ALL {
            assert_eq!(strategy.to_string().parse(), Ok(strategy));
        }
        assert_eq!(
            serde_json::to_string(&BreedStrategy::OnePoint).unwrap(),
            "\"one-point\""
        );
    }

    #[test]
    #[should_panic(expected = "different topology")]
    fn mismatched_topologies_panic() {
        let mut rng = Pcg32::seed_from_u64(0);
        let a = Chromosome::generate(Topology::new(2, 2, 1, 2), &mut rng).unwrap();
        let b = Chromosome::generate(Topology::new(2, 2, 1, 3), &mut rng).unwrap();
        let _ = breed(&a, &b, BreedStrategy::Uniform, &mut rng);
    }
}
