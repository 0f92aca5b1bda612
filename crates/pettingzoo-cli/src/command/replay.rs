use std::path::PathBuf;

use pettingzoo_engine::{Game, LevelSeed, Simulation as _};
use pettingzoo_training::{Agent, AgentRunner};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Chromosome artifact (`gen_*.bin` or `best.bin`)
    artifact: PathBuf,
    /// Play a different level instead of the recorded one
    #[arg(long)]
    seed: Option<LevelSeed>,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let artifact = util::read_artifact_file(&arg.artifact)?;
    let seed = arg.seed.unwrap_or(artifact.seed);
    let topology = artifact.chromosome.topology();
    let agent = Agent::from_chromosome(artifact.chromosome);

    let mut game = Game::new(seed);
    let evaluation = AgentRunner::new(topology).run(&agent, &mut game);

    println!("Level seed: {seed}");
    println!("Outcome:    {}", evaluation.death_type);
    println!("Fitness:    {:.3}", evaluation.fitness);
    println!("Steps:      {}", evaluation.steps);
    println!("Final tile: {}", game.tile_position());

    Ok(())
}
