//! Genetic-algorithm training of platformer agents.
//!
//! This crate evolves populations of [`Agent`]s, each a packed chromosome from
//! `pettingzoo-genome`, by scoring them on the headless game from
//! `pettingzoo-engine`.
//!
//! # Generation Loop
//!
//! ```text
//! evaluate (parallel)  ─►  summarise + persist  ─►  select  ─►  breed (parallel)  ─►  mutate (parallel)
//!      ▲                                                                                   │
//!      └───────────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! 1. **Evaluation** ([`harness`]) - every agent plays its own copy of the level;
//!    runs that stop improving are timed out
//! 2. **Statistics** ([`report`]) - outcome counts and fitness statistics are
//!    appended to the run log and the champion is persisted
//! 3. **Selection** ([`selection`]) - stochastic acceptance picks `gen_size / 2`
//!    survivors, optionally after copying the top individuals as elites
//! 4. **Breeding** ([`selection`]) - survivors breed in a ring, two children per pair
//! 5. **Mutation** ([`mutation`]) - every child is mutated at the configured rate
//!
//! [`Trainer`] ties these together; [`RunParams`] and [`RunOptions`] configure it.
//!
//! # Reproducibility
//!
//! One PCG32 stream seeded from [`RunParams::seed`] drives every random
//! decision. Work distributed to worker threads never shares that stream:
//! breeding pairs and individuals being mutated each get their own seed,
//! drawn on the driving thread beforehand. Runs with the same parameters are
//! therefore identical for any worker count.
//!
//! # Example
//!
//! ```
//! use pettingzoo_training::{RunOptions, RunParams, Trainer};
//!
//! let params = RunParams {
//!     in_h: 4,
//!     in_w: 4,
//!     npl: 8,
//!     gen_size: 4,
//!     generations: 2,
//!     ..RunParams::default()
//! };
//! let options = RunOptions { quiet: true, ..RunOptions::default() };
//! let report = Trainer::new(params, options)?.run();
//! assert_eq!(report.summaries.len(), 2);
//! # Ok::<(), pettingzoo_training::TrainingError>(())
//! ```

pub use self::{
    agent::Agent,
    harness::{AGENT_FITNESS_TIMEOUT, AgentRunner, Evaluation},
    params::{ParamsError, RunOptions, RunParams},
    report::{GenerationSummary, RunDirectory},
    selection::{DegenerateFitnessError, Selection},
    trainer::{Champion, Trainer, TrainingError, TrainingReport},
};

mod agent;
pub mod harness;
pub mod mutation;
pub mod parallel;
mod params;
pub mod report;
pub mod selection;
mod trainer;
