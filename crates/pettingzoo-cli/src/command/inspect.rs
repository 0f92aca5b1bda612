use std::path::PathBuf;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// Chromosome artifact (`gen_*.bin` or `best.bin`)
    artifact: PathBuf,
    /// Also print every mask and weight matrix
    #[arg(long)]
    dump: bool,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let artifact = util::read_artifact_file(&arg.artifact)?;
    let chromosome = &artifact.chromosome;

    println!("File:       {}", arg.artifact.display());
    println!("Topology:   {}", chromosome.topology());
    println!("Header:     {}", chromosome.describe());
    println!("Level seed: {}", artifact.seed);
    println!("Segments:");
    for span in chromosome.layout().spans() {
        println!(
            "  {:>8}..{:<8} {:>4} x {:<5} {}",
            span.offset,
            span.byte_range().end,
            span.rows,
            span.cols,
            span.segment
        );
    }

    if arg.dump {
        println!();
        print!("{}", chromosome.dump());
    }

    Ok(())
}
