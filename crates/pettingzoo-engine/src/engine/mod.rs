//! Game logic: player physics, per-update stepping and the simulation contract.
//!
//! - [`Player`] - The controllable body and its physics
//! - [`Game`] - A level plus a player, advanced one update at a time
//! - [`Simulation`] - The interface training harnesses drive
//! - [`StepOutcome`] / [`DeathType`] - Result of an update and terminal classification
//!
//! # Game Flow
//!
//! 1. Create a [`Game`] from a [`LevelSeed`](crate::LevelSeed)
//! 2. Sample the tile window around the player with [`Simulation::observe`]
//! 3. Decide a [`ButtonState`](crate::ButtonState) and call [`Simulation::step`]
//! 4. Repeat until the outcome is terminal (dead, timed out or complete)

pub use self::{game::*, player::*, simulation::*};

mod game;
mod player;
mod simulation;
