//! Offset arithmetic for the packed chromosome format.
//!
//! Nothing in this module touches chromosome bytes. Given a [`Topology`]
//! (decoded from a header or supplied by a run configuration), [`Layout`]
//! computes where each segment starts, how many rows and columns it has, and
//! how wide its elements are. Every accessor in the crate goes through a
//! [`SegmentSpan`] produced here, so there is exactly one place where the
//! format's offsets are defined.

use std::ops::Range;

use pettingzoo_engine::BUTTON_COUNT;

use crate::{ChromosomeError, IndexError, TopologyError};

/// Length of the packed header in bytes.
pub const HEADER_LEN: usize = 5;

/// Width of one weight element in bytes.
pub const WEIGHT_SIZE: usize = size_of::<f32>();

/// Network shape shared by every chromosome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{in_h}x{in_w} input, {hlc} hidden layer(s) of {npl} neurons")]
pub struct Topology {
    /// Observation window height.
    pub in_h: u8,
    /// Observation window width.
    pub in_w: u8,
    /// Hidden layer count.
    pub hlc: u8,
    /// Neurons per hidden layer.
    pub npl: u16,
}

impl Topology {
    #[must_use]
    pub const fn new(in_h: u8, in_w: u8, hlc: u8, npl: u16) -> Self {
        Self {
            in_h,
            in_w,
            hlc,
            npl,
        }
    }

    /// Checks that the topology describes a usable network.
    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.in_h == 0 || self.in_w == 0 {
            return Err(TopologyError::EmptyInput);
        }
        if self.hlc == 0 {
            return Err(TopologyError::NoHiddenLayers);
        }
        if self.npl == 0 {
            return Err(TopologyError::NoNeurons);
        }
        Ok(())
    }

    /// Number of observation cells (`in_h · in_w`).
    #[must_use]
    pub const fn input_len(&self) -> usize {
        self.in_h as usize * self.in_w as usize
    }

    /// Neurons per hidden layer as `usize`.
    #[must_use]
    pub const fn neurons(&self) -> usize {
        self.npl as usize
    }

    /// Hidden layer count as `usize`.
    #[must_use]
    pub const fn hidden_layers(&self) -> usize {
        self.hlc as usize
    }

    /// Number of hidden → hidden weight matrices (`hlc − 1`).
    #[must_use]
    pub const fn hidden_weight_layers(&self) -> usize {
        self.hidden_layers().saturating_sub(1)
    }

    /// Total chromosome size in bytes:
    ///
    /// ```text
    /// 5 + in_h·in_w + in_h·in_w·npl·4 + npl·hlc + (hlc−1)·npl·npl·4 + BUTTON_COUNT·npl·4
    /// ```
    #[must_use]
    pub const fn chromosome_size(&self) -> usize {
        let input = self.input_len();
        let npl = self.neurons();
        HEADER_LEN
            + input
            + input * npl * WEIGHT_SIZE
            + npl * self.hidden_layers()
            + self.hidden_weight_layers() * npl * npl * WEIGHT_SIZE
            + BUTTON_COUNT * npl * WEIGHT_SIZE
    }

    /// Segment locator for this topology.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        Layout { topology: *self }
    }

    /// Packs the topology into the 5-byte header.
    #[must_use]
    pub const fn encode_header(&self) -> [u8; HEADER_LEN] {
        let [npl_lo, npl_hi] = self.npl.to_le_bytes();
        [self.in_w, self.in_h, npl_lo, npl_hi, self.hlc]
    }

    /// Reads a topology from the first five bytes of `bytes`.
    ///
    /// Only the header's presence is checked; call [`Self::validate`] to check its values.
    pub fn decode_header(bytes: &[u8]) -> Result<Self, ChromosomeError> {
        let &[in_w, in_h, npl_lo, npl_hi, hlc, ..] = bytes else {
            return Err(ChromosomeError::TruncatedHeader { len: bytes.len() });
        };
        Ok(Self {
            in_h,
            in_w,
            hlc,
            npl: u16::from_le_bytes([npl_lo, npl_hi]),
        })
    }
}

/// Element type stored in a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum GeneKind {
    /// One-byte activation flag.
    Mask,
    /// Four-byte little-endian `f32`.
    Weight,
}

impl GeneKind {
    /// Element width in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            GeneKind::Mask => 1,
            GeneKind::Weight => WEIGHT_SIZE,
        }
    }
}

/// A segment of the chromosome after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Segment {
    #[display("input activation mask")]
    InputMask,
    #[display("input to hidden weights")]
    InputWeights,
    #[display("hidden activation mask")]
    HiddenMask,
    /// Weights from hidden layer `n` to hidden layer `n + 1` (zero-indexed).
    #[display("hidden layer {_0} to {} weights", _0 + 1)]
    HiddenWeights(usize),
    #[display("hidden to output weights")]
    OutputWeights,
}

impl Segment {
    #[must_use]
    pub const fn kind(self) -> GeneKind {
        match self {
            Segment::InputMask | Segment::HiddenMask => GeneKind::Mask,
            Segment::InputWeights | Segment::HiddenWeights(_) | Segment::OutputWeights => {
                GeneKind::Weight
            }
        }
    }
}

/// Location and shape of one segment inside a chromosome buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentSpan {
    pub segment: Segment,
    /// Byte offset from the start of the buffer.
    pub offset: usize,
    pub rows: usize,
    pub cols: usize,
}

impl SegmentSpan {
    #[must_use]
    pub const fn kind(&self) -> GeneKind {
        self.segment.kind()
    }

    /// Number of elements (`rows · cols`).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.len() * self.kind().width()
    }

    /// Byte range of the segment within the buffer.
    #[must_use]
    pub const fn byte_range(&self) -> Range<usize> {
        self.offset..self.offset + self.byte_len()
    }
}

/// Segment locator for one topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    topology: Topology,
}

impl Layout {
    #[must_use]
    pub const fn topology(&self) -> Topology {
        self.topology
    }

    /// Total size in bytes; equal to [`Topology::chromosome_size`].
    #[must_use]
    pub const fn size(&self) -> usize {
        self.topology.chromosome_size()
    }

    /// Returns the span of `segment`.
    ///
    /// Fails for [`Segment::HiddenWeights`] with a layer outside `0..hlc−1`.
    pub fn locate(&self, segment: Segment) -> Result<SegmentSpan, IndexError> {
        let t = &self.topology;
        let input = t.input_len();
        let npl = t.neurons();

        let input_mask = HEADER_LEN;
        let input_weights = input_mask + input;
        let hidden_mask = input_weights + npl * input * WEIGHT_SIZE;
        let hidden_weights = hidden_mask + t.hidden_layers() * npl;
        let output_weights = hidden_weights + t.hidden_weight_layers() * npl * npl * WEIGHT_SIZE;

        let (offset, rows, cols) = match segment {
            Segment::InputMask => (input_mask, usize::from(t.in_h), usize::from(t.in_w)),
            Segment::InputWeights => (input_weights, npl, input),
            Segment::HiddenMask => (hidden_mask, t.hidden_layers(), npl),
            Segment::HiddenWeights(layer) => {
                if layer >= t.hidden_weight_layers() {
                    return Err(IndexError {
                        layer,
                        available: t.hidden_weight_layers(),
                    });
                }
                (hidden_weights + layer * npl * npl * WEIGHT_SIZE, npl, npl)
            }
            Segment::OutputWeights => (output_weights, BUTTON_COUNT, npl),
        };
        Ok(SegmentSpan {
            segment,
            offset,
            rows,
            cols,
        })
    }

    /// Spans of the hidden → hidden weight matrices, in layer order.
    pub fn hidden_weight_spans(&self) -> impl Iterator<Item = SegmentSpan> + use<> {
        let layout = *self;
        (0..self.topology.hidden_weight_layers())
            .filter_map(move |layer| layout.locate(Segment::HiddenWeights(layer)).ok())
    }

    /// Every segment span in layout order.
    pub fn spans(&self) -> impl Iterator<Item = SegmentSpan> + use<> {
        let layout = *self;
        let head = [Segment::InputMask, Segment::InputWeights, Segment::HiddenMask]
            .into_iter()
            .filter_map(move |s| layout.locate(s).ok());
        let tail = layout.locate(Segment::OutputWeights).ok();
        head.chain(self.hidden_weight_spans()).chain(tail)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn size_matches_closed_form_for_default_topology() {
        let t = Topology::new(12, 12, 2, 128);
        let expected = 5 + 144 + 144 * 128 * 4 + 128 * 2 + 128 * 128 * 4 + 3 * 128 * 4;
        assert_eq!(t.chromosome_size(), expected);
        assert_eq!(t.layout().size(), expected);
    }

    #[test]
    fn header_round_trips() {
        let t = Topology::new(7, 9, 3, 0x0102);
        let header = t.encode_header();
        assert_eq!(header, [9, 7, 0x02, 0x01, 3]);
        assert_eq!(Topology::decode_header(&header), Ok(t));
    }

    #[test]
    fn short_header_is_rejected() {
        assert_eq!(
            Topology::decode_header(&[1, 2, 3]),
            Err(ChromosomeError::TruncatedHeader { len: 3 })
        );
    }

    #[test]
    fn validate_rejects_degenerate_topologies() {
        assert_eq!(
            Topology::new(0, 4, 1, 4).validate(),
            Err(TopologyError::EmptyInput)
        );
        assert_eq!(
            Topology::new(4, 4, 0, 4).validate(),
            Err(TopologyError::NoHiddenLayers)
        );
        assert_eq!(
            Topology::new(4, 4, 1, 0).validate(),
            Err(TopologyError::NoNeurons)
        );
        assert_eq!(Topology::new(4, 4, 1, 4).validate(), Ok(()));
    }

    #[test]
    fn hidden_weight_layer_out_of_range_fails() {
        let layout = Topology::new(3, 3, 2, 4).layout();
        assert!(layout.locate(Segment::HiddenWeights(0)).is_ok());
        assert_eq!(
            layout.locate(Segment::HiddenWeights(1)),
            Err(IndexError {
                layer: 1,
                available: 1
            })
        );

        let single = Topology::new(3, 3, 1, 4).layout();
        assert!(single.locate(Segment::HiddenWeights(0)).is_err());
        assert_eq!(single.hidden_weight_spans().count(), 0);
    }

    #[test]
    fn spans_are_in_layout_order() {
        let layout = Topology::new(2, 3, 3, 4).layout();
        let segments: Vec<_> = layout.spans().map(|s| s.segment).collect();
        assert_eq!(
            segments,
            vec![
                Segment::InputMask,
                Segment::InputWeights,
                Segment::HiddenMask,
                Segment::HiddenWeights(0),
                Segment::HiddenWeights(1),
                Segment::OutputWeights,
            ]
        );
    }

    fn topology() -> impl Strategy<Value = Topology> {
        (1u8..=16, 1u8..=16, 1u8..=5, 1u16..=48)
            .prop_map(|(in_h, in_w, hlc, npl)| Topology::new(in_h, in_w, hlc, npl))
    }

    proptest! {
        #[test]
        fn spans_tile_the_buffer_after_the_header(t in topology()) {
            let layout = t.layout();
            let mut cursor = HEADER_LEN;
            for span in layout.spans() {
                prop_assert_eq!(span.offset, cursor, "gap or overlap before {}", span.segment);
                cursor = span.byte_range().end;
            }
            prop_assert_eq!(cursor, t.chromosome_size());
        }

        #[test]
        fn span_sizes_sum_to_closed_form(t in topology()) {
            let total: usize = t.layout().spans().map(|s| s.byte_len()).sum();
            prop_assert_eq!(HEADER_LEN + total, t.chromosome_size());
        }
    }
}
