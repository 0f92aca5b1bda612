//! Persisted chromosomes.
//!
//! An artifact file is the raw chromosome bytes followed by the level seed
//! the chromosome was scored on, as a little-endian `u32`:
//!
//! ```text
//! [chromosome bytes ... | seed: u32 LE]
//! ```
//!
//! The chromosome is self-describing, so the split point is recovered from
//! its header.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use pettingzoo_engine::LevelSeed;

use crate::{Chromosome, ChromosomeError, layout::Topology};

const SEED_LEN: usize = size_of::<u32>();

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ArtifactError {
    #[display("artifact I/O failed")]
    Io(io::Error),
    #[display("artifact does not contain a valid chromosome")]
    Chromosome(ChromosomeError),
    #[display("artifact has {len} trailing bytes after the chromosome (expected 4-byte seed)")]
    #[from(ignore)]
    InvalidTrailer { len: usize },
}

/// A chromosome together with the level seed it was evaluated on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub chromosome: Chromosome,
    pub seed: LevelSeed,
}

impl Artifact {
    #[must_use]
    pub fn new(chromosome: Chromosome, seed: LevelSeed) -> Self {
        Self { chromosome, seed }
    }

    pub fn write_to<W>(&self, writer: W) -> io::Result<()>
    where
        W: Write,
    {
        Self::write_parts(&self.chromosome, self.seed, writer)
    }

    /// Writes the artifact format for a borrowed chromosome.
    pub fn write_parts<W>(chromosome: &Chromosome, seed: LevelSeed, mut writer: W) -> io::Result<()>
    where
        W: Write,
    {
        writer.write_all(chromosome.as_bytes())?;
        writer.write_all(&seed.to_le_bytes())?;
        writer.flush()
    }

    pub fn read_from<R>(mut reader: R) -> Result<Self, ArtifactError>
    where
        R: Read,
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    /// Splits a complete artifact buffer into chromosome and seed.
    pub fn from_bytes(mut bytes: Vec<u8>) -> Result<Self, ArtifactError> {
        let topology = Topology::decode_header(&bytes)?;
        topology.validate().map_err(ChromosomeError::from)?;
        let size = topology.chromosome_size();
        let trailer = bytes.len().saturating_sub(size);
        if bytes.len() < size {
            return Err(ChromosomeError::SizeMismatch {
                expected: size,
                actual: bytes.len(),
            }
            .into());
        }
        if trailer != SEED_LEN {
            return Err(ArtifactError::InvalidTrailer { len: trailer });
        }

        let mut seed = [0; SEED_LEN];
        seed.copy_from_slice(&bytes[size..]);
        bytes.truncate(size);
        Ok(Self {
            chromosome: Chromosome::from_bytes(bytes)?,
            seed: LevelSeed::from_le_bytes(seed),
        })
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        Self::save_parts(&self.chromosome, self.seed, path)
    }

    pub fn save_parts(chromosome: &Chromosome, seed: LevelSeed, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        Self::write_parts(chromosome, seed, BufWriter::new(file))
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path)?;
        Self::read_from(file)
    }
}
