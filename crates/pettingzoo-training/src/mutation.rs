use std::num::NonZeroUsize;

use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{Agent, parallel};

/// Mutates every agent in parallel at `rate`.
///
/// One seed per agent is drawn from `rng` before any work is distributed, so
/// the result does not depend on the worker count. Returns the total number of
/// genes changed.
pub fn mutate_generation<R>(
    agents: &mut [Agent],
    rate: f32,
    rng: &mut R,
    workers: NonZeroUsize,
) -> usize
where
    R: Rng + ?Sized,
{
    let seeds: Vec<u64> = (0..agents.len()).map(|_| rng.random()).collect();
    let mut changed = vec![0; agents.len()];
    let mut work: Vec<_> = agents.iter_mut().zip(&mut changed).collect();
    parallel::for_each_mut(&mut work, workers, |i, (agent, changed)| {
        **changed = agent.mutate(rate, &mut Pcg32::seed_from_u64(seeds[i]));
    });
    changed.iter().sum()
}

#[cfg(test)]
mod tests {
    use pettingzoo_genome::Topology;

    use super::*;

    fn population() -> Vec<Agent> {
        let mut rng = Pcg32::seed_from_u64(1);
        (0..7)
            .map(|_| Agent::random(Topology::new(3, 3, 2, 4), &mut rng).unwrap())
            .collect()
    }

    #[test]
    fn zero_rate_leaves_generation_untouched() {
        let mut agents = population();
        let before = agents.clone();
        let changed = mutate_generation(
            &mut agents,
            0.0,
            &mut Pcg32::seed_from_u64(2),
            NonZeroUsize::new(3).unwrap(),
        );
        assert_eq!(changed, 0);
        assert_eq!(agents, before);
    }

    #[test]
    fn result_is_independent_of_worker_count() {
        let mut a = population();
        let mut b = population();
        mutate_generation(&mut a, 0.2, &mut Pcg32::seed_from_u64(3), NonZeroUsize::MIN);
        mutate_generation(
            &mut b,
            0.2,
            &mut Pcg32::seed_from_u64(3),
            NonZeroUsize::new(4).unwrap(),
        );
        assert_eq!(a, b);
        assert_ne!(a, population());
    }
}
