//! Per-generation statistics and the on-disk run directory.
//!
//! A run directory contains:
//!
//! | File | Contents |
//! |---|---|
//! | `params.txt` | One header line: `in_h, in_w, hlc, npl, gen_size, generations, mutate_rate, seed` |
//! | `params.json` | The complete [`RunParams`] |
//! | `run_data.txt` | One line per generation: `completed, timed_out, died, mean, max, min` |
//! | `gen_NNNN_F.FF.bin` | The champion of generation `NNNN` with fitness `F.FF` |
//! | `best.bin` | The best champion of the run so far |

use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use pettingzoo_engine::{DeathType, LevelSeed};

use crate::{Agent, RunParams};

pub const HEADER_FILE: &str = "params.txt";
pub const PARAMS_FILE: &str = "params.json";
pub const RUN_LOG_FILE: &str = "run_data.txt";
pub const BEST_FILE: &str = "best.bin";

/// Outcome counts and fitness statistics of one evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSummary {
    pub completed: usize,
    pub timed_out: usize,
    pub died: usize,
    pub mean: f32,
    pub max: f32,
    pub min: f32,
    /// Index of the individual with the highest fitness.
    pub best_index: usize,
    pub population: usize,
}

impl GenerationSummary {
    /// Summarises an evaluated population.
    ///
    /// # Panics
    ///
    /// Panics if `agents` is empty.
    #[must_use]
    pub fn new(agents: &[Agent]) -> Self {
        assert!(!agents.is_empty(), "cannot summarise an empty generation");

        let mut summary = Self {
            completed: 0,
            timed_out: 0,
            died: 0,
            mean: 0.0,
            max: f32::NEG_INFINITY,
            min: f32::INFINITY,
            best_index: 0,
            population: agents.len(),
        };
        let mut sum = 0.0;
        for (i, agent) in agents.iter().enumerate() {
            match agent.death_type() {
                DeathType::Complete => summary.completed += 1,
                DeathType::TimedOut => summary.timed_out += 1,
                DeathType::Dead => summary.died += 1,
                DeathType::Alive => {}
            }
            let fitness = agent.fitness();
            sum += fitness;
            if fitness > summary.max {
                summary.max = fitness;
                summary.best_index = i;
            }
            summary.min = summary.min.min(fitness);
        }
        #[expect(clippy::cast_precision_loss)]
        let n = agents.len() as f32;
        summary.mean = sum / n;
        summary
    }

    /// The run log line for this generation.
    #[must_use]
    pub fn log_line(&self) -> String {
        format!(
            "{}, {}, {}, {:.6}, {:.6}, {:.6}",
            self.completed, self.timed_out, self.died, self.mean, self.max, self.min
        )
    }

    #[expect(clippy::cast_precision_loss)]
    fn percent(&self, count: usize) -> f32 {
        count as f32 / self.population as f32 * 100.0
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Died:        {:6.2}%", self.percent(self.died))?;
        writeln!(f, "  Timed out:   {:6.2}%", self.percent(self.timed_out))?;
        writeln!(f, "  Completed:   {:6.2}%", self.percent(self.completed))?;
        writeln!(f, "  Avg fitness: {:.2}", self.mean)?;
        writeln!(f, "  Max fitness: {:.2}", self.max)?;
        write!(f, "  Min fitness: {:.2}", self.min)
    }
}

/// File name of a generation champion artifact.
#[must_use]
pub fn winner_file_name(generation: usize, fitness: f32) -> String {
    format!("gen_{generation:04}_{fitness:.2}.bin")
}

/// An initialised run directory.
#[derive(Debug, Clone)]
pub struct RunDirectory {
    path: PathBuf,
}

impl RunDirectory {
    /// Creates the directory, writes the run header and parameters and starts
    /// an empty run log.
    pub fn create(path: impl Into<PathBuf>, params: &RunParams) -> io::Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path)?;

        fs::write(path.join(HEADER_FILE), params.header_line() + "\n")?;

        let mut json = BufWriter::new(File::create(path.join(PARAMS_FILE))?);
        serde_json::to_writer_pretty(&mut json, params)?;
        writeln!(json)?;
        json.flush()?;

        File::create(path.join(RUN_LOG_FILE))?;
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one generation to the run log.
    pub fn append_generation(&self, summary: &GenerationSummary) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(self.path.join(RUN_LOG_FILE))?;
        writeln!(file, "{}", summary.log_line())
    }

    /// Writes a generation champion and returns its path.
    pub fn write_winner(
        &self,
        generation: usize,
        agent: &Agent,
        seed: LevelSeed,
    ) -> io::Result<PathBuf> {
        let path = self
            .path
            .join(winner_file_name(generation, agent.fitness()));
        agent.write_to_file(&path, seed)?;
        Ok(path)
    }

    /// Overwrites the run's overall best artifact and returns its path.
    pub fn write_best(&self, agent: &Agent, seed: LevelSeed) -> io::Result<PathBuf> {
        let path = self.path.join(BEST_FILE);
        agent.write_to_file(&path, seed)?;
        Ok(path)
    }
}
