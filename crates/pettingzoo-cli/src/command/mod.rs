use clap::{Parser, Subcommand};

use self::{inspect::InspectArg, replay::ReplayArg, train::TrainArg};

mod inspect;
mod replay;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a population with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Re-run a saved chromosome on its recorded level
    Replay(#[clap(flatten)] ReplayArg),
    /// Print the header and matrices of a saved chromosome
    Inspect(#[clap(flatten)] InspectArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
    }
    Ok(())
}
