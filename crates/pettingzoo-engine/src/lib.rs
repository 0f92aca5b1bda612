//! Headless tile platformer used to score evolved agents.
//!
//! The engine is deliberately small: a procedurally generated [`Level`], a
//! single [`Player`] body with simple platformer physics, and a [`Game`] that
//! advances both by one fixed update per call. Trainers only talk to the game
//! through the [`Simulation`] trait, which is the whole contract the training
//! harness relies on:
//!
//! - [`Simulation::step`] advances one update with a [`ButtonState`]
//! - [`Simulation::fitness`] reports accumulated progress
//! - [`Simulation::tile_position`] reports which tile the player occupies
//! - [`Simulation::observe`] samples the tile window around the player
//!
//! Levels are fully determined by a [`LevelSeed`], so a run can be replayed
//! exactly from a saved seed.
//!
//! # Example
//!
//! ```
//! use pettingzoo_engine::{Button, ButtonState, Game, LevelSeed, Simulation as _};
//!
//! let mut game = Game::new(LevelSeed::new(42));
//! let mut buttons = ButtonState::default();
//! buttons.set(Button::Right, true);
//!
//! for _ in 0..60 {
//!     if game.step(buttons).is_terminal() {
//!         break;
//!     }
//! }
//! assert!(game.fitness() > 0.0);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Number of simulation updates per simulated second.
pub const UPDATES_PS: u32 = 60;

/// Number of buttons an agent can press.
pub const BUTTON_COUNT: usize = 3;

/// A controller button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Button {
    #[display("left")]
    Left = 0,
    #[display("right")]
    Right = 1,
    #[display("jump")]
    Jump = 2,
}

impl Button {
    /// All buttons in output-neuron order.
    pub const ALL: [Button; BUTTON_COUNT] = [Button::Left, Button::Right, Button::Jump];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Pressed/released state of every button for one update.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonState([bool; BUTTON_COUNT]);

impl ButtonState {
    #[must_use]
    pub const fn new(pressed: [bool; BUTTON_COUNT]) -> Self {
        Self(pressed)
    }

    #[must_use]
    pub const fn is_pressed(&self, button: Button) -> bool {
        self.0[button.index()]
    }

    pub const fn set(&mut self, button: Button, pressed: bool) {
        self.0[button.index()] = pressed;
    }
}

impl std::fmt::Display for ButtonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (button, symbol) in Button::ALL.iter().zip(['L', 'R', 'J']) {
            let c = if self.is_pressed(*button) { symbol } else { '-' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_state_display_marks_pressed_buttons() {
        let mut state = ButtonState::default();
        assert_eq!(state.to_string(), "---");
        state.set(Button::Right, true);
        state.set(Button::Jump, true);
        assert_eq!(state.to_string(), "-RJ");
        assert!(!state.is_pressed(Button::Left));
    }

    #[test]
    fn button_indices_follow_output_order() {
        let indices: Vec<_> = Button::ALL.iter().map(|b| b.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
