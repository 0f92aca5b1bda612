use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use pettingzoo_genome::BreedStrategy;
use pettingzoo_training::{RunOptions, RunParams, Trainer};
use rand::Rng as _;
use tracing::debug;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Load run parameters from a JSON file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Observation window height in tiles
    #[arg(long)]
    in_h: Option<u8>,
    /// Observation window width in tiles
    #[arg(long)]
    in_w: Option<u8>,
    /// Hidden layer count
    #[arg(long)]
    hlc: Option<u8>,
    /// Neurons per hidden layer
    #[arg(long)]
    npl: Option<u16>,
    /// Individuals per generation
    #[arg(long)]
    gen_size: Option<usize>,
    /// Number of generations
    #[arg(long)]
    generations: Option<usize>,
    /// Per-gene mutation probability
    #[arg(long)]
    mutate_rate: Option<f32>,
    /// Breeding strategy: uniform, one-point or blend
    #[arg(long)]
    breed_type: Option<BreedStrategy>,
    /// Run seed (random when neither this nor --config sets it)
    #[arg(long)]
    seed: Option<u32>,
    /// Individuals copied unchanged into the next generation
    #[arg(long)]
    elite_count: Option<usize>,
    /// Switch to a new level every N generations
    #[arg(long)]
    level_cycle: Option<NonZeroUsize>,
    /// Run directory (default: runs/<UTC timestamp>)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Do not save each generation's champion
    #[arg(long)]
    no_winner: bool,
    /// Suppress per-generation summaries
    #[arg(long, short)]
    quiet: bool,
    /// Worker threads (default: available parallelism)
    #[arg(long)]
    workers: Option<NonZeroUsize>,
}

impl TrainArg {
    fn params(&self) -> anyhow::Result<RunParams> {
        let mut params = match &self.config {
            Some(path) => util::read_json_file("run parameters", path)?,
            None => RunParams::default(),
        };
        let TrainArg {
            in_h,
            in_w,
            hlc,
            npl,
            gen_size,
            generations,
            mutate_rate,
            breed_type,
            elite_count,
            ..
        } = *self;
        params.in_h = in_h.unwrap_or(params.in_h);
        params.in_w = in_w.unwrap_or(params.in_w);
        params.hlc = hlc.unwrap_or(params.hlc);
        params.npl = npl.unwrap_or(params.npl);
        params.gen_size = gen_size.unwrap_or(params.gen_size);
        params.generations = generations.unwrap_or(params.generations);
        params.mutate_rate = mutate_rate.unwrap_or(params.mutate_rate);
        params.breed_type = breed_type.unwrap_or(params.breed_type);
        params.elite_count = elite_count.unwrap_or(params.elite_count);
        if let Some(cycle) = self.level_cycle {
            params.level_cycle = Some(cycle);
        }
        match self.seed {
            Some(seed) => params.seed = seed,
            None if self.config.is_none() => params.seed = rand::rng().random(),
            None => {}
        }
        Ok(params)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let params = arg.params()?;
    params.validate().context("Invalid run parameters")?;
    debug!(?params, "resolved run parameters");

    let output = arg.output.clone().unwrap_or_else(|| {
        PathBuf::from("runs").join(Utc::now().format("%Y%m%d-%H%M%S").to_string())
    });
    let options = RunOptions {
        output_dir: Some(output),
        write_winner: !arg.no_winner,
        quiet: arg.quiet,
        workers: arg.workers,
    };

    eprintln!("Training with seed {}", params.seed);
    eprintln!("  Topology: {}", params.topology());
    eprintln!(
        "  Population: {} x {} generation(s), {} breeding, mutate rate {}",
        params.gen_size, params.generations, params.breed_type, params.mutate_rate
    );

    let report = Trainer::new(params, options)
        .context("Failed to start training")?
        .run();

    let champion = &report.champion;
    eprintln!();
    eprintln!("Training completed");
    match &report.output_dir {
        Some(path) => eprintln!("  Output: {}", path.display()),
        None => eprintln!("  Output: (not saved)"),
    }
    eprintln!(
        "  Best fitness: {:.3} ({}, generation #{})",
        champion.agent.fitness(),
        champion.agent.death_type(),
        champion.generation
    );
    eprintln!("  Level seed: {}", champion.seed);

    Ok(())
}
