use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};

use pettingzoo_engine::{Game, Level, LevelSeed};
use pettingzoo_genome::AllocationError;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use tracing::{debug, info, warn};

use crate::{
    Agent, GenerationSummary, ParamsError, RunDirectory, RunOptions, RunParams, harness,
    mutation, parallel, selection,
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("invalid run parameters")]
    Params(ParamsError),
    #[display("failed to allocate the population")]
    Allocation(AllocationError),
}

/// The best agent found so far and the level it was scored on.
#[derive(Debug, Clone, PartialEq)]
pub struct Champion {
    pub agent: Agent,
    pub seed: LevelSeed,
    pub generation: usize,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub summaries: Vec<GenerationSummary>,
    pub champion: Champion,
    pub output_dir: Option<PathBuf>,
}

/// Drives the generation loop: evaluate, report, select, breed, mutate.
///
/// All randomness after construction comes from one run RNG seeded with
/// [`RunParams::seed`]; parallel stages receive seeds drawn from it up front,
/// so a run is reproducible for a given seed and parameter set regardless of
/// the worker count.
#[derive(Debug)]
pub struct Trainer {
    params: RunParams,
    options: RunOptions,
    workers: NonZeroUsize,
    rng: Pcg32,
    level_seed: LevelSeed,
    level: Arc<Level>,
    population: Vec<Agent>,
    run_dir: Option<RunDirectory>,
    champion: Option<Champion>,
    generation: usize,
}

impl Trainer {
    /// Validates the parameters, creates the run directory and the initial population.
    ///
    /// A run directory that cannot be created is logged and the run continues
    /// without persistence.
    pub fn new(params: RunParams, options: RunOptions) -> Result<Self, TrainingError> {
        params.validate()?;

        let mut rng = Pcg32::seed_from_u64(u64::from(params.seed));
        let topology = params.topology();
        let population = (0..params.gen_size)
            .map(|_| Agent::random(topology, &mut rng))
            .collect::<Result<Vec<_>, _>>()?;

        let run_dir = options
            .output_dir
            .as_ref()
            .and_then(|path| match RunDirectory::create(path, &params) {
                Ok(dir) => Some(dir),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to create run directory; results will not be saved"
                    );
                    None
                }
            });

        let level_seed = LevelSeed::new(params.seed);
        let workers = parallel::worker_count(options.workers);
        info!(
            gen_size = params.gen_size,
            generations = params.generations,
            chromosome_bytes = topology.chromosome_size(),
            workers = workers.get(),
            %level_seed,
            "starting training run"
        );

        Ok(Self {
            level: Arc::new(Level::generate(level_seed)),
            params,
            options,
            workers,
            rng,
            level_seed,
            population,
            run_dir,
            champion: None,
            generation: 0,
        })
    }

    #[must_use]
    pub fn params(&self) -> &RunParams {
        &self.params
    }

    #[must_use]
    pub fn population(&self) -> &[Agent] {
        &self.population
    }

    #[must_use]
    pub fn level_seed(&self) -> LevelSeed {
        self.level_seed
    }

    #[must_use]
    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    /// Runs every remaining generation.
    pub fn run(mut self) -> TrainingReport {
        let mut summaries = Vec::with_capacity(self.params.generations);
        while self.generation < self.params.generations {
            summaries.push(self.step());
        }
        let champion = match self.champion {
            Some(champion) => champion,
            None => unreachable!("validated runs evaluate at least one generation"),
        };
        TrainingReport {
            summaries,
            champion,
            output_dir: self.run_dir.map(|dir| dir.path().to_owned()),
        }
    }

    /// Evaluates the current generation, records it and, unless it was the
    /// last one, replaces the population with the next generation.
    pub fn step(&mut self) -> GenerationSummary {
        let generation = self.generation;
        let seed = self.level_seed;
        let level = Arc::clone(&self.level);
        harness::evaluate_generation(
            &mut self.population,
            self.params.topology(),
            self.workers,
            || Game::with_level(seed, Arc::clone(&level)),
        );

        let summary = GenerationSummary::new(&self.population);
        info!(
            generation,
            completed = summary.completed,
            timed_out = summary.timed_out,
            died = summary.died,
            mean = summary.mean,
            max = summary.max,
            min = summary.min,
            "generation evaluated"
        );
        if !self.options.quiet {
            eprintln!("Generation #{generation} (level {seed}):");
            eprintln!("{summary}");
        }

        self.record(generation, &summary);

        self.generation += 1;
        if self.generation < self.params.generations {
            self.evolve();
            self.cycle_level();
        }
        summary
    }

    fn record(&mut self, generation: usize, summary: &GenerationSummary) {
        let best = &self.population[summary.best_index];
        let improved = self
            .champion
            .as_ref()
            .is_none_or(|c| best.fitness() > c.agent.fitness());
        if improved {
            self.champion = Some(Champion {
                agent: best.clone(),
                seed: self.level_seed,
                generation,
            });
        }

        let Some(dir) = &self.run_dir else {
            return;
        };
        if let Err(e) = dir.append_generation(summary) {
            warn!(generation, error = %e, "failed to append run log");
        }
        if self.options.write_winner {
            match dir.write_winner(generation, best, self.level_seed) {
                Ok(path) => debug!(path = %path.display(), "wrote generation champion"),
                Err(e) => warn!(generation, error = %e, "failed to write generation champion"),
            }
        }
        if improved {
            if let Err(e) = dir.write_best(best, self.level_seed) {
                warn!(generation, error = %e, "failed to write overall best");
            }
        }
    }

    fn evolve(&mut self) {
        let fitness: Vec<f32> = self.population.iter().map(Agent::fitness).collect();

        let mut ranked: Vec<usize> = (0..fitness.len()).collect();
        ranked.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
        let elites: Vec<Agent> = ranked[..self.params.elite_count]
            .iter()
            .map(|&i| self.population[i].clone())
            .collect();

        let selection =
            selection::select_survivors(&fitness, self.params.survivor_count(), &mut self.rng);
        if let Some(e) = &selection.fallback {
            warn!(generation = self.generation, "{e}");
        }
        let survivors: Vec<&Agent> = selection
            .survivors
            .iter()
            .map(|&i| &self.population[i])
            .collect();
        let seeds: Vec<u64> = (0..survivors.len()).map(|_| self.rng.random()).collect();
        let mut children = selection::breed_generation(
            &survivors,
            &seeds,
            self.params.breed_type,
            self.workers,
        );
        let mutated = mutation::mutate_generation(
            &mut children,
            self.params.mutate_rate,
            &mut self.rng,
            self.workers,
        );
        debug!(generation = self.generation, mutated, "bred next generation");

        let mut next = elites;
        next.append(&mut children);
        debug_assert_eq!(next.len(), self.params.gen_size);
        self.population = next;
    }

    fn cycle_level(&mut self) {
        let Some(cycle) = self.params.level_cycle else {
            return;
        };
        if self.generation % cycle.get() != 0 {
            return;
        }
        self.level_seed = self.rng.random();
        self.level = Arc::new(Level::generate(self.level_seed));
        info!(generation = self.generation, level_seed = %self.level_seed, "switched to a new level");
    }
}
