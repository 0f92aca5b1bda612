//! Per-gene random policies and the mutation operator.

use rand::Rng;

use crate::{
    Chromosome,
    layout::{GeneKind, WEIGHT_SIZE},
};

const ZERO_WEIGHT_PROBABILITY: f64 = 0.1;

/// Draws one connection weight.
///
/// With probability 0.1 the weight is exactly zero; otherwise it is uniform in
/// `[0, 1)` and negated with probability ½, so every weight lies in `(-1, 1)`.
pub fn random_weight<R>(rng: &mut R) -> f32
where
    R: Rng + ?Sized,
{
    let w: f32 = rng.random();
    if rng.random_bool(ZERO_WEIGHT_PROBABILITY) {
        return 0.0;
    }
    if rng.random_bool(0.5) { -w } else { w }
}

/// Draws one activation flag (set with probability ½).
pub fn random_mask<R>(rng: &mut R) -> bool
where
    R: Rng + ?Sized,
{
    rng.random_bool(0.5)
}

/// Perturbs every gene of `chromosome` independently with probability `rate`.
///
/// A selected mask flag is flipped; a selected weight is re-drawn with
/// [`random_weight`]. The header is never touched, so topology is preserved.
/// Returns the number of genes changed.
///
/// # Panics
///
/// Panics if `rate` is not in `[0, 1]`.
pub fn mutate<R>(chromosome: &mut Chromosome, rate: f32, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    assert!(
        (0.0..=1.0).contains(&rate),
        "mutation rate {rate} outside [0, 1]"
    );
    let p = f64::from(rate);
    let mut changed = 0;
    for span in chromosome.layout().spans() {
        let bytes = chromosome.segment_bytes_mut(span);
        match span.kind() {
            GeneKind::Mask => {
                for b in bytes.iter_mut() {
                    if rng.random_bool(p) {
                        *b = u8::from(*b == 0);
                        changed += 1;
                    }
                }
            }
            GeneKind::Weight => {
                for w in bytes.chunks_exact_mut(WEIGHT_SIZE) {
                    if rng.random_bool(p) {
                        w.copy_from_slice(&random_weight(rng).to_le_bytes());
                        changed += 1;
                    }
                }
            }
        }
    }
    changed
}
