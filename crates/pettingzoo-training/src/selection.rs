//! Survivor selection and ring breeding.
//!
//! Survivors are picked by stochastic acceptance: draw a uniform index and
//! accept it with probability `fitness / best`, repeating until enough
//! survivors are found. Duplicates are allowed, so a dominant individual may
//! appear several times.
//!
//! Survivors then breed in a ring. Survivor `k` breeds with survivor
//! `(k + 1) mod n` and their children occupy slots `2k` and `2k + 1`, so every
//! survivor is a parent exactly twice.

use std::num::NonZeroUsize;

use pettingzoo_genome::BreedStrategy;
use rand::Rng;

use crate::{Agent, parallel};

/// The generation's best fitness cannot be used as an acceptance denominator.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("best fitness {best} is not a positive number; selecting survivors uniformly")]
pub struct DegenerateFitnessError {
    pub best: f32,
}

/// Indices of the selected survivors.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub survivors: Vec<usize>,
    /// Set when selection fell back to uniform acceptance.
    pub fallback: Option<DegenerateFitnessError>,
}

/// Selects `count` survivor indices from `fitness` by stochastic acceptance.
///
/// If the best fitness is not positive and finite, every draw is accepted
/// and the reason is reported in [`Selection::fallback`].
///
/// # Panics
///
/// Panics if `fitness` is empty while `count > 0`.
pub fn select_survivors<R>(fitness: &[f32], count: usize, rng: &mut R) -> Selection
where
    R: Rng + ?Sized,
{
    assert!(
        count == 0 || !fitness.is_empty(),
        "cannot select from an empty generation"
    );
    let best = fitness.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let fallback = (!(best.is_finite() && best > 0.0)).then_some(DegenerateFitnessError { best });

    let mut survivors = Vec::with_capacity(count);
    while survivors.len() < count {
        let index = rng.random_range(0..fitness.len());
        let accept = fallback.is_some() || rng.random::<f32>() < fitness[index] / best;
        if accept {
            survivors.push(index);
        }
    }
    Selection {
        survivors,
        fallback,
    }
}

/// Parent pairs of ring breeding over `n` survivors.
pub fn breeding_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).map(move |k| (k, (k + 1) % n))
}

/// Breeds `2 · survivors.len()` children from the ring of survivors.
///
/// `seeds[k]` seeds the breeding of pair `k`; drawing them up front keeps the
/// result independent of how pairs are scheduled on workers.
///
/// # Panics
///
/// Panics if `seeds` and `survivors` differ in length.
pub fn breed_generation(
    survivors: &[&Agent],
    seeds: &[u64],
    strategy: BreedStrategy,
    workers: NonZeroUsize,
) -> Vec<Agent> {
    assert_eq!(survivors.len(), seeds.len());
    let pairs: Vec<_> = breeding_pairs(survivors.len()).collect();
    parallel::map(pairs.len(), workers, |k| {
        let (a, b) = pairs[k];
        Agent::breed(survivors[a], survivors[b], seeds[k], strategy)
    })
    .into_iter()
    .flat_map(|(x, y)| [x, y])
    .collect()
}
