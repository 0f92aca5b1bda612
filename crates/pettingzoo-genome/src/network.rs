//! Forward pass from an observation window to button presses.
//!
//! Activation masks gate signals rather than removing neurons:
//!
//! - a masked input cell reads as `0` regardless of the observation
//! - a masked hidden neuron outputs `0` regardless of its inputs
//!
//! Hidden neurons use `tanh`; an output neuron presses its button when its
//! weighted sum is strictly positive.

use pettingzoo_engine::{BUTTON_COUNT, Button, ButtonState};

use crate::{Chromosome, Topology};

/// Reusable scratch space for evaluating chromosomes of one topology.
///
/// Keeping one `Network` per worker avoids allocating activations on every
/// simulation step.
#[derive(Debug, Clone)]
pub struct Network {
    topology: Topology,
    input: Vec<f32>,
    hidden: Vec<f32>,
    next: Vec<f32>,
}

impl Network {
    #[must_use]
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            input: vec![0.0; topology.input_len()],
            hidden: vec![0.0; topology.neurons()],
            next: vec![0.0; topology.neurons()],
        }
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Runs `chromosome` on `observation` and returns the buttons to press.
    ///
    /// The chromosome is only read, so evaluation is deterministic for fixed
    /// weights.
    ///
    /// # Panics
    ///
    /// Panics if the chromosome's topology differs from the network's, or if
    /// `observation` is not `in_h · in_w` cells long.
    pub fn evaluate(&mut self, chromosome: &Chromosome, observation: &[f32]) -> ButtonState {
        assert_eq!(chromosome.topology(), self.topology);
        assert_eq!(observation.len(), self.input.len());

        let input_mask = chromosome.input_mask();
        for (i, (dst, &obs)) in self.input.iter_mut().zip(observation).enumerate() {
            *dst = if input_mask.get(i) { obs } else { 0.0 };
        }

        let hidden_mask = chromosome.hidden_mask();
        let input_weights = chromosome.input_weights();
        for (n, h) in self.hidden.iter_mut().enumerate() {
            *h = if hidden_mask.at(0, n) {
                dot(input_weights.row(n), &self.input).tanh()
            } else {
                0.0
            };
        }

        for layer in 0..self.topology.hidden_weight_layers() {
            let Ok(weights) = chromosome.hidden_weights(layer) else {
                break;
            };
            for (n, h) in self.next.iter_mut().enumerate() {
                *h = if hidden_mask.at(layer + 1, n) {
                    dot(weights.row(n), &self.hidden).tanh()
                } else {
                    0.0
                };
            }
            std::mem::swap(&mut self.hidden, &mut self.next);
        }

        let output_weights = chromosome.output_weights();
        let mut pressed = [false; BUTTON_COUNT];
        for button in Button::ALL {
            pressed[button.index()] = dot(output_weights.row(button.index()), &self.hidden) > 0.0;
        }
        ButtonState::new(pressed)
    }
}

fn dot(weights: impl Iterator<Item = f32>, values: &[f32]) -> f32 {
    weights.zip(values).map(|(w, v)| w * v).sum()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn topology() -> Topology {
        Topology::new(2, 2, 2, 3)
    }

    /// All masks on, all weights zero.
    fn blank() -> Chromosome {
        let mut chrom = Chromosome::generate(topology(), &mut Pcg32::seed_from_u64(0)).unwrap();
        let layout = chrom.layout();
        for span in layout.spans() {
            let fill = u8::from(span.kind().is_mask());
            chrom.segment_bytes_mut(span).fill(fill);
        }
        chrom
    }

    fn set_all_weights(chrom: &mut Chromosome, value: f32) {
        let layout = chrom.layout();
        for span in layout.spans().filter(|s| s.kind().is_weight()) {
            for w in chrom.segment_bytes_mut(span).chunks_exact_mut(4) {
                w.copy_from_slice(&value.to_le_bytes());
            }
        }
    }

    #[test]
    fn zero_weights_press_nothing() {
        let mut net = Network::new(topology());
        let buttons = net.evaluate(&blank(), &[1.0; 4]);
        assert_eq!(buttons, ButtonState::default());
    }

    #[test]
    fn positive_signal_presses_all_buttons() {
        let mut chrom = blank();
        set_all_weights(&mut chrom, 0.5);
        let mut net = Network::new(topology());
        assert_eq!(net.evaluate(&chrom, &[1.0; 4]), ButtonState::new([true; 3]));
        // negative input flips the sign through both odd tanh layers
        assert_eq!(net.evaluate(&chrom, &[-1.0; 4]), ButtonState::default());
    }

    #[test]
    fn masked_inputs_read_as_zero() {
        let mut chrom = blank();
        set_all_weights(&mut chrom, 0.5);
        let mut mask = chrom.input_mask_mut();
        for i in 0..mask.len() {
            mask.set(i, false);
        }
        let mut net = Network::new(topology());
        assert_eq!(net.evaluate(&chrom, &[1.0; 4]), ButtonState::default());
    }

    #[test]
    fn masked_hidden_layer_silences_outputs() {
        let mut chrom = blank();
        set_all_weights(&mut chrom, 0.5);
        let mut mask = chrom.hidden_mask_mut();
        for n in 3..6 {
            mask.set(n, false);
        }
        let mut net = Network::new(topology());
        assert_eq!(net.evaluate(&chrom, &[1.0; 4]), ButtonState::default());
    }

    #[test]
    fn output_rows_map_to_buttons() {
        let mut chrom = blank();
        set_all_weights(&mut chrom, 0.5);
        let mut out = chrom.output_weights_mut();
        for n in 0..3 {
            out.set(Button::Left.index() * 3 + n, -0.5);
        }
        let mut net = Network::new(topology());
        let buttons = net.evaluate(&chrom, &[1.0; 4]);
        assert!(!buttons.is_pressed(Button::Left));
        assert!(buttons.is_pressed(Button::Right));
        assert!(buttons.is_pressed(Button::Jump));
    }

    #[test]
    fn evaluation_is_deterministic_and_read_only() {
        let chrom = Chromosome::generate(
            Topology::new(5, 5, 3, 16),
            &mut Pcg32::seed_from_u64(17),
        )
        .unwrap();
        let before = chrom.clone();
        let observation: Vec<f32> = (0..25).map(|i| [-1.0, 0.0, 1.0][i % 3]).collect();
        let mut net = Network::new(chrom.topology());
        let first = net.evaluate(&chrom, &observation);
        for _ in 0..5 {
            assert_eq!(net.evaluate(&chrom, &observation), first);
        }
        assert_eq!(chrom, before);
    }
}
