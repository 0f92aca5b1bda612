//! The packed chromosome buffer and typed, non-owning views into it.

use std::fmt;

use rand::Rng;

use crate::{
    AllocationError, ChromosomeError, IndexError,
    genes,
    layout::{GeneKind, Layout, Segment, SegmentSpan, Topology, WEIGHT_SIZE},
};

/// One network genome.
///
/// The topology is decoded from the buffer's own header when the chromosome
/// is constructed and cached alongside the bytes; every view is located from
/// it.
#[derive(Clone, PartialEq, Eq)]
pub struct Chromosome {
    topology: Topology,
    bytes: Vec<u8>,
}

impl fmt::Debug for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chromosome")
            .field("topology", &self.topology)
            .field("size", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// Header fields and total size of a chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display(
    "in_h={}, in_w={}, hlc={}, npl={}, size={size} bytes",
    topology.in_h,
    topology.in_w,
    topology.hlc,
    topology.npl
)]
pub struct ChromosomeInfo {
    pub topology: Topology,
    pub size: usize,
}

impl Chromosome {
    /// Allocates a chromosome for `topology` and fills it randomly.
    ///
    /// Masks are set with probability ½ and weights follow
    /// [`genes::random_weight`]. Segments are filled in layout order, so the
    /// same RNG state always yields the same chromosome.
    ///
    /// `topology` is expected to have passed [`Topology::validate`].
    pub fn generate<R>(topology: Topology, rng: &mut R) -> Result<Self, AllocationError>
    where
        R: Rng + ?Sized,
    {
        let size = topology.chromosome_size();
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| AllocationError { size })?;

        bytes.extend_from_slice(&topology.encode_header());
        for span in topology.layout().spans() {
            match span.kind() {
                GeneKind::Mask => {
                    bytes.extend((0..span.len()).map(|_| u8::from(genes::random_mask(rng))));
                }
                GeneKind::Weight => {
                    for _ in 0..span.len() {
                        bytes.extend_from_slice(&genes::random_weight(rng).to_le_bytes());
                    }
                }
            }
        }
        debug_assert_eq!(bytes.len(), size);

        Ok(Self { topology, bytes })
    }

    /// Validates `bytes` and takes ownership of them as a chromosome.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ChromosomeError> {
        let topology = Topology::decode_header(&bytes)?;
        topology.validate()?;
        let expected = topology.chromosome_size();
        if bytes.len() != expected {
            return Err(ChromosomeError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { topology, bytes })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        self.topology.layout()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn describe(&self) -> ChromosomeInfo {
        ChromosomeInfo {
            topology: self.topology,
            size: self.size(),
        }
    }

    /// Span of `segment` within this chromosome.
    pub fn locate(&self, segment: Segment) -> Result<SegmentSpan, IndexError> {
        self.layout().locate(segment)
    }

    pub(crate) fn segment_bytes(&self, span: SegmentSpan) -> &[u8] {
        &self.bytes[span.byte_range()]
    }

    pub(crate) fn segment_bytes_mut(&mut self, span: SegmentSpan) -> &mut [u8] {
        &mut self.bytes[span.byte_range()]
    }

    fn mask(&self, segment: Segment) -> MaskView<'_> {
        let span = self.infallible_span(segment);
        MaskView {
            span,
            bytes: self.segment_bytes(span),
        }
    }

    fn mask_mut(&mut self, segment: Segment) -> MaskViewMut<'_> {
        let span = self.infallible_span(segment);
        MaskViewMut {
            span,
            bytes: self.segment_bytes_mut(span),
        }
    }

    fn weights(&self, segment: Segment) -> Result<WeightView<'_>, IndexError> {
        let span = self.locate(segment)?;
        Ok(WeightView {
            span,
            bytes: self.segment_bytes(span),
        })
    }

    fn weights_mut(&mut self, segment: Segment) -> Result<WeightViewMut<'_>, IndexError> {
        let span = self.locate(segment)?;
        Ok(WeightViewMut {
            span,
            bytes: self.segment_bytes_mut(span),
        })
    }

    fn infallible_span(&self, segment: Segment) -> SegmentSpan {
        match self.locate(segment) {
            Ok(span) => span,
            Err(e) => unreachable!("{segment} always exists: {e}"),
        }
    }

    /// `in_h × in_w` input activation flags.
    #[must_use]
    pub fn input_mask(&self) -> MaskView<'_> {
        self.mask(Segment::InputMask)
    }

    pub fn input_mask_mut(&mut self) -> MaskViewMut<'_> {
        self.mask_mut(Segment::InputMask)
    }

    /// `hlc × npl` hidden neuron activation flags.
    #[must_use]
    pub fn hidden_mask(&self) -> MaskView<'_> {
        self.mask(Segment::HiddenMask)
    }

    pub fn hidden_mask_mut(&mut self) -> MaskViewMut<'_> {
        self.mask_mut(Segment::HiddenMask)
    }

    /// `npl × (in_h·in_w)` weights into the first hidden layer.
    #[must_use]
    pub fn input_weights(&self) -> WeightView<'_> {
        let span = self.infallible_span(Segment::InputWeights);
        WeightView {
            span,
            bytes: self.segment_bytes(span),
        }
    }

    /// `npl × npl` weights from hidden layer `layer` into `layer + 1`.
    pub fn hidden_weights(&self, layer: usize) -> Result<WeightView<'_>, IndexError> {
        self.weights(Segment::HiddenWeights(layer))
    }

    pub fn hidden_weights_mut(&mut self, layer: usize) -> Result<WeightViewMut<'_>, IndexError> {
        self.weights_mut(Segment::HiddenWeights(layer))
    }

    /// `BUTTON_COUNT × npl` weights into the output neurons.
    #[must_use]
    pub fn output_weights(&self) -> WeightView<'_> {
        let span = self.infallible_span(Segment::OutputWeights);
        WeightView {
            span,
            bytes: self.segment_bytes(span),
        }
    }

    pub fn output_weights_mut(&mut self) -> WeightViewMut<'_> {
        let span = self.infallible_span(Segment::OutputWeights);
        WeightViewMut {
            span,
            bytes: self.segment_bytes_mut(span),
        }
    }

    /// Renders every matrix of the chromosome as text.
    #[must_use]
    pub fn dump(&self) -> Dump<'_> {
        Dump(self)
    }
}

pub(crate) fn decode_f32(bytes: &[u8]) -> f32 {
    let mut buf = [0; WEIGHT_SIZE];
    buf.copy_from_slice(bytes);
    f32::from_le_bytes(buf)
}

/// Read-only view of a mask segment.
#[derive(Debug, Clone, Copy)]
pub struct MaskView<'a> {
    span: SegmentSpan,
    bytes: &'a [u8],
}

impl<'a> MaskView<'a> {
    #[must_use]
    pub fn span(&self) -> SegmentSpan {
        self.span
    }

    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        self.bytes[index] != 0
    }

    #[must_use]
    pub fn at(&self, row: usize, col: usize) -> bool {
        assert!(col < self.span.cols);
        self.get(row * self.span.cols + col)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
        let bytes: &'a [u8] = self.bytes;
        bytes.iter().map(|&b| b != 0)
    }

    /// Flags of one row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = bool> + 'a {
        let cols = self.span.cols;
        let bytes: &'a [u8] = self.bytes;
        bytes[row * cols..(row + 1) * cols]
            .iter()
            .map(|&b| b != 0)
    }
}

/// Mutable view of a mask segment.
#[derive(Debug)]
pub struct MaskViewMut<'a> {
    span: SegmentSpan,
    bytes: &'a mut [u8],
}

impl MaskViewMut<'_> {
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        self.bytes[index] != 0
    }

    pub fn set(&mut self, index: usize, value: bool) {
        self.bytes[index] = u8::from(value);
    }

    pub fn flip(&mut self, index: usize) {
        self.bytes[index] = u8::from(self.bytes[index] == 0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.span.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

/// Read-only view of a weight matrix.
#[derive(Debug, Clone, Copy)]
pub struct WeightView<'a> {
    span: SegmentSpan,
    bytes: &'a [u8],
}

impl<'a> WeightView<'a> {
    #[must_use]
    pub fn span(&self) -> SegmentSpan {
        self.span
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.span.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.span.cols
    }

    #[must_use]
    pub fn get(&self, index: usize) -> f32 {
        let start = index * WEIGHT_SIZE;
        decode_f32(&self.bytes[start..start + WEIGHT_SIZE])
    }

    #[must_use]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        assert!(col < self.span.cols);
        self.get(row * self.span.cols + col)
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + 'a {
        let bytes: &'a [u8] = self.bytes;
        bytes.chunks_exact(WEIGHT_SIZE).map(decode_f32)
    }

    /// Weights of one row, i.e. the incoming weights of one neuron.
    pub fn row(&self, row: usize) -> impl Iterator<Item = f32> + 'a {
        let stride = self.span.cols * WEIGHT_SIZE;
        let bytes: &'a [u8] = self.bytes;
        bytes[row * stride..(row + 1) * stride]
            .chunks_exact(WEIGHT_SIZE)
            .map(decode_f32)
    }
}

/// Mutable view of a weight matrix.
#[derive(Debug)]
pub struct WeightViewMut<'a> {
    span: SegmentSpan,
    bytes: &'a mut [u8],
}

impl WeightViewMut<'_> {
    #[must_use]
    pub fn get(&self, index: usize) -> f32 {
        let start = index * WEIGHT_SIZE;
        decode_f32(&self.bytes[start..start + WEIGHT_SIZE])
    }

    pub fn set(&mut self, index: usize, value: f32) {
        let start = index * WEIGHT_SIZE;
        self.bytes[start..start + WEIGHT_SIZE].copy_from_slice(&value.to_le_bytes());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.span.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

/// Text rendering of a chromosome returned by [`Chromosome::dump`].
pub struct Dump<'a>(&'a Chromosome);

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chrom = self.0;
        writeln!(f, "{}", chrom.describe())?;
        for span in chrom.layout().spans() {
            writeln!(f)?;
            writeln!(f, "{} ({}x{}):", span.segment, span.rows, span.cols)?;
            let bytes = chrom.segment_bytes(span);
            match span.kind() {
                GeneKind::Mask => {
                    for row in bytes.chunks(span.cols.max(1)) {
                        let line: String = row
                            .iter()
                            .map(|&b| if b != 0 { '1' } else { '0' })
                            .collect();
                        writeln!(f, "  {line}")?;
                    }
                }
                GeneKind::Weight => {
                    for row in bytes.chunks(span.cols.max(1) * WEIGHT_SIZE) {
                        write!(f, " ")?;
                        for w in row.chunks_exact(WEIGHT_SIZE).map(decode_f32) {
                            write!(f, " {w:+.3}")?;
                        }
                        writeln!(f)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::TopologyError;

    fn small() -> Topology {
        Topology::new(3, 4, 2, 5)
    }

    fn generate(seed: u64) -> Chromosome {
        let mut rng = Pcg32::seed_from_u64(seed);
        Chromosome::generate(small(), &mut rng).unwrap()
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_topology_fails_to_allocate() {
        let topology = Topology::new(255, 255, 255, u16::MAX);
        let mut rng = Pcg32::seed_from_u64(0);
        assert!(matches!(
            Chromosome::generate(topology, &mut rng),
            Err(AllocationError { size }) if size == topology.chromosome_size()
        ));
    }

    #[test]
    fn generated_chromosome_has_header_and_closed_form_size() {
        let chrom = generate(1);
        assert_eq!(chrom.size(), small().chromosome_size());
        assert_eq!(&chrom.as_bytes()[..5], &[4, 3, 5, 0, 2]);
        assert_eq!(chrom.topology(), small());
        assert_eq!(
            chrom.describe(),
            ChromosomeInfo {
                topology: small(),
                size: small().chromosome_size()
            }
        );
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        assert_eq!(generate(9), generate(9));
        assert_ne!(generate(9), generate(10));
    }

    #[test]
    fn generated_weights_follow_policy() {
        let mut rng = Pcg32::seed_from_u64(3);
        let chrom = Chromosome::generate(Topology::new(12, 12, 2, 32), &mut rng).unwrap();
        let weights: Vec<f32> = chrom.input_weights().iter().collect();
        assert!(weights.iter().all(|w| *w > -1.0 && *w < 1.0));

        #[expect(clippy::cast_precision_loss)]
        let zero_share =
            weights.iter().filter(|w| **w == 0.0).count() as f32 / weights.len() as f32;
        assert!((0.07..0.13).contains(&zero_share), "zero share {zero_share}");
        let negatives = weights.iter().filter(|w| **w < 0.0).count();
        let positives = weights.iter().filter(|w| **w > 0.0).count();
        assert!(negatives.abs_diff(positives) < weights.len() / 10);

        let masks: Vec<bool> = chrom.hidden_mask().iter().collect();
        assert!(masks.iter().any(|m| *m) && masks.iter().any(|m| !*m));
    }

    #[test]
    fn from_bytes_validates() {
        let chrom = generate(2);
        let bytes = chrom.clone().into_bytes();
        assert_eq!(Chromosome::from_bytes(bytes.clone()), Ok(chrom));

        let mut short = bytes.clone();
        short.pop();
        assert_eq!(
            Chromosome::from_bytes(short),
            Err(ChromosomeError::SizeMismatch {
                expected: bytes.len(),
                actual: bytes.len() - 1
            })
        );

        let mut zero_layers = bytes;
        zero_layers[4] = 0;
        assert_eq!(
            Chromosome::from_bytes(zero_layers),
            Err(ChromosomeError::InvalidTopology(TopologyError::NoHiddenLayers))
        );

        assert_eq!(
            Chromosome::from_bytes(vec![1, 1]),
            Err(ChromosomeError::TruncatedHeader { len: 2 })
        );
    }

    #[test]
    fn views_read_what_was_written() {
        let mut chrom = generate(4);
        chrom.output_weights_mut().set(7, 0.25);
        assert_eq!(chrom.output_weights().get(7), 0.25);
        assert_eq!(chrom.output_weights().at(1, 2), 0.25);

        chrom.hidden_weights_mut(0).unwrap().set(0, -0.5);
        assert_eq!(chrom.hidden_weights(0).unwrap().at(0, 0), -0.5);

        let before = chrom.input_mask().get(5);
        chrom.input_mask_mut().flip(5);
        assert_eq!(chrom.input_mask().get(5), !before);
        assert_eq!(chrom.input_mask().at(1, 1), !before);

        chrom.hidden_mask_mut().set(6, true);
        assert!(chrom.hidden_mask().row(1).nth(1).unwrap());
    }

    #[test]
    fn hidden_weight_view_out_of_range_fails() {
        let chrom = generate(5);
        assert_eq!(
            chrom.hidden_weights(1).map(|v| v.rows()),
            Err(IndexError {
                layer: 1,
                available: 1
            })
        );
    }

    #[test]
    fn dump_lists_every_segment() {
        let text = generate(6).dump().to_string();
        assert!(text.starts_with("in_h=3, in_w=4, hlc=2, npl=5"));
        for name in [
            "input activation mask (3x4)",
            "input to hidden weights (5x12)",
            "hidden activation mask (2x5)",
            "hidden layer 0 to 1 weights (5x5)",
            "hidden to output weights (3x5)",
        ] {
            assert!(text.contains(name), "missing {name}");
        }
    }
}
