use std::{io, path::Path};

use pettingzoo_engine::{ButtonState, DeathType, LevelSeed};
use pettingzoo_genome::{
    AllocationError, Artifact, BreedStrategy, Chromosome, Network, Topology, crossover, genes,
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

/// One individual: a chromosome and the result of its latest evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    chromosome: Chromosome,
    fitness: f32,
    death_type: DeathType,
}

impl Agent {
    /// Creates an agent with a randomly initialised chromosome.
    pub fn random<R>(topology: Topology, rng: &mut R) -> Result<Self, AllocationError>
    where
        R: Rng + ?Sized,
    {
        Ok(Self::from_chromosome(Chromosome::generate(topology, rng)?))
    }

    #[must_use]
    pub fn from_chromosome(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            fitness: 0.0,
            death_type: DeathType::Alive,
        }
    }

    #[must_use]
    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    #[must_use]
    pub fn death_type(&self) -> DeathType {
        self.death_type
    }

    /// Stores the result of an evaluation.
    pub fn record_outcome(&mut self, fitness: f32, death_type: DeathType) {
        self.fitness = fitness;
        self.death_type = death_type;
    }

    /// Decides which buttons to press for `observation`.
    pub fn evaluate(&self, network: &mut Network, observation: &[f32]) -> ButtonState {
        network.evaluate(&self.chromosome, observation)
    }

    /// Breeds two children from `a` and `b`.
    ///
    /// The children depend only on the parents, `seed` and `strategy`, so
    /// breeding is reproducible no matter which thread runs it.
    #[must_use]
    pub fn breed(a: &Agent, b: &Agent, seed: u64, strategy: BreedStrategy) -> (Agent, Agent) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let (x, y) = crossover::breed(&a.chromosome, &b.chromosome, strategy, &mut rng);
        (Self::from_chromosome(x), Self::from_chromosome(y))
    }

    /// Mutates every gene independently with probability `rate`.
    ///
    /// Returns the number of genes changed.
    pub fn mutate<R>(&mut self, rate: f32, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        genes::mutate(&mut self.chromosome, rate, rng)
    }

    /// Writes the chromosome followed by `seed` to `path`.
    pub fn write_to_file(&self, path: &Path, seed: LevelSeed) -> io::Result<()> {
        Artifact::save_parts(&self.chromosome, seed, path)
    }
}
