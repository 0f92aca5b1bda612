use std::{num::NonZeroUsize, path::PathBuf};

use pettingzoo_genome::{BreedStrategy, Topology, TopologyError};
use serde::{Deserialize, Serialize};

/// Hyperparameters and network shape of one training run.
///
/// Every field has a default, so a JSON configuration only needs to list the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunParams {
    /// Observation window height in tiles.
    pub in_h: u8,
    /// Observation window width in tiles.
    pub in_w: u8,
    /// Hidden layer count.
    pub hlc: u8,
    /// Neurons per hidden layer.
    pub npl: u16,
    /// Individuals per generation.
    pub gen_size: usize,
    /// Number of generations to train.
    pub generations: usize,
    /// Per-gene mutation probability.
    pub mutate_rate: f32,
    pub breed_type: BreedStrategy,
    /// Seeds the run RNG and the first level.
    pub seed: u32,
    /// Individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Switch to a freshly generated level every this many generations.
    pub level_cycle: Option<NonZeroUsize>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            in_h: 12,
            in_w: 12,
            hlc: 2,
            npl: 128,
            gen_size: 100,
            generations: 1,
            mutate_rate: 0.001,
            breed_type: BreedStrategy::default(),
            seed: 0,
            elite_count: 0,
            level_cycle: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ParamsError {
    #[display("invalid network topology")]
    Topology(TopologyError),
    #[display("generations must be at least 1")]
    #[from(ignore)]
    NoGenerations,
    #[display(
        "gen_size {gen_size} with {elite_count} elite(s) leaves fewer than 2 individuals to breed"
    )]
    #[from(ignore)]
    TooFewToBreed { gen_size: usize, elite_count: usize },
    #[display(
        "gen_size {gen_size} minus {elite_count} elite(s) must be even (children are bred in pairs)"
    )]
    #[from(ignore)]
    OddBreedingSlots { gen_size: usize, elite_count: usize },
    #[display("mutate_rate {rate} is outside [0, 1]")]
    #[from(ignore)]
    MutationRate { rate: f32 },
}

impl RunParams {
    #[must_use]
    pub fn topology(&self) -> Topology {
        Topology::new(self.in_h, self.in_w, self.hlc, self.npl)
    }

    /// Number of individuals produced by selection and breeding each generation.
    #[must_use]
    pub fn breeding_slots(&self) -> usize {
        self.gen_size.saturating_sub(self.elite_count)
    }

    /// Number of survivors selected each generation.
    #[must_use]
    pub fn survivor_count(&self) -> usize {
        self.breeding_slots() / 2
    }

    /// Rejects configurations that cannot run, before any generation starts.
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.topology().validate()?;
        if self.generations == 0 {
            return Err(ParamsError::NoGenerations);
        }
        let slots = self.breeding_slots();
        if self.elite_count >= self.gen_size || slots < 2 {
            return Err(ParamsError::TooFewToBreed {
                gen_size: self.gen_size,
                elite_count: self.elite_count,
            });
        }
        if slots % 2 != 0 {
            return Err(ParamsError::OddBreedingSlots {
                gen_size: self.gen_size,
                elite_count: self.elite_count,
            });
        }
        if !(0.0..=1.0).contains(&self.mutate_rate) {
            return Err(ParamsError::MutationRate {
                rate: self.mutate_rate,
            });
        }
        Ok(())
    }

    /// The run header: `in_h, in_w, hlc, npl, gen_size, generations, mutate_rate, seed`.
    #[must_use]
    pub fn header_line(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}, {}, {:.6}, {}",
            self.in_h,
            self.in_w,
            self.hlc,
            self.npl,
            self.gen_size,
            self.generations,
            self.mutate_rate,
            self.seed
        )
    }
}

/// How a run reports and persists its progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Run directory; nothing is written when `None`.
    pub output_dir: Option<PathBuf>,
    /// Persist each generation's champion as `gen_NNNN_F.FF.bin`.
    pub write_winner: bool,
    /// Suppress the per-generation summary on stderr.
    pub quiet: bool,
    /// Worker threads; defaults to the available parallelism.
    pub workers: Option<NonZeroUsize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            write_winner: true,
            quiet: false,
            workers: None,
        }
    }
}
