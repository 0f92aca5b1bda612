//! Binary chromosome format for feed-forward controller networks.
//!
//! A [`Chromosome`] is a single packed byte buffer that fully describes one
//! network: its topology, per-neuron activation masks and every connection
//! weight. The buffer is self-describing; all offsets are derived from the
//! five header bytes stored at its start, so a chromosome can be persisted,
//! reloaded and evaluated without any side channel.
//!
//! # Layout
//!
//! ```text
//! offset  segment                 shape                    element
//! ------  ----------------------  -----------------------  ------------
//! 0       header                  5 bytes                  in_w: u8, in_h: u8, npl: u16 LE, hlc: u8
//! 5       input activation mask   in_h × in_w              u8 flag
//! ...     input → hidden weights  npl × (in_h·in_w)        f32 LE
//! ...     hidden activation mask  hlc × npl                u8 flag
//! ...     hidden → hidden weights (hlc−1) × npl × npl      f32 LE
//! ...     hidden → output weights BUTTON_COUNT × npl       f32 LE
//! ```
//!
//! Segments are contiguous, row-major and unpadded. Weights are therefore not
//! aligned, and are only ever accessed through the typed views in
//! [`chromosome`], which decode them byte-wise.
//!
//! # Modules
//!
//! - [`layout`] - [`Topology`], segment spans and the closed-form size
//! - [`chromosome`] - The buffer itself, typed views and random generation
//! - [`genes`] - Weight generation policy and mutation
//! - [`crossover`] - Breeding strategies producing two children from two parents
//! - [`network`] - Forward pass turning an observation window into button presses
//! - [`artifact`] - Persisted chromosome plus the level seed it was scored on

pub use self::{
    artifact::Artifact,
    chromosome::{Chromosome, ChromosomeInfo},
    crossover::BreedStrategy,
    layout::{GeneKind, Layout, Segment, SegmentSpan, Topology},
    network::Network,
};

pub mod artifact;
pub mod chromosome;
pub mod crossover;
pub mod genes;
pub mod layout;
pub mod network;

/// Memory for a new chromosome could not be reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("failed to allocate {size} bytes for chromosome")]
pub struct AllocationError {
    pub size: usize,
}

/// A hidden-to-hidden weight segment was requested for a layer the chromosome does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("hidden weight layer {layer} out of range (chromosome has {available})")]
pub struct IndexError {
    pub layer: usize,
    pub available: usize,
}

/// Header fields that cannot describe a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TopologyError {
    #[display("observation window must be at least 1x1")]
    EmptyInput,
    #[display("network needs at least one hidden layer")]
    NoHiddenLayers,
    #[display("hidden layers need at least one neuron")]
    NoNeurons,
}

/// A byte buffer that is not a well-formed chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ChromosomeError {
    #[display("chromosome header truncated ({len} of 5 bytes)")]
    #[from(ignore)]
    TruncatedHeader { len: usize },
    #[display("chromosome header describes an invalid topology")]
    InvalidTopology(TopologyError),
    #[display("chromosome is {actual} bytes but its header describes {expected} bytes")]
    #[from(ignore)]
    SizeMismatch { expected: usize, actual: usize },
}
