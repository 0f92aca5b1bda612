use crate::{ButtonState, TilePosition};

/// Result of advancing a simulation by one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum StepOutcome {
    Continue,
    Dead,
    TimedOut,
    Complete,
}

impl StepOutcome {
    /// Returns `true` unless the run continues.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, StepOutcome::Continue)
    }

    /// Classification of a run that ended (or not) with this outcome.
    #[must_use]
    pub const fn death_type(self) -> DeathType {
        match self {
            StepOutcome::Continue => DeathType::Alive,
            StepOutcome::Dead => DeathType::Dead,
            StepOutcome::TimedOut => DeathType::TimedOut,
            StepOutcome::Complete => DeathType::Complete,
        }
    }
}

/// Terminal classification of a simulation run.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant,
)]
pub enum DeathType {
    #[default]
    #[display("alive")]
    Alive,
    #[display("dead")]
    Dead,
    #[display("timed out")]
    TimedOut,
    #[display("complete")]
    Complete,
}

/// A steppable game an agent can be scored against.
///
/// Implementations are single-owner: one instance is driven by exactly one
/// agent for one evaluation, so no method needs to be thread safe beyond
/// `Send` for moving the instance into a worker.
pub trait Simulation {
    /// Advances one update with the given buttons held.
    ///
    /// Once a terminal outcome has been returned, further calls keep returning it.
    fn step(&mut self, buttons: ButtonState) -> StepOutcome;

    /// Fitness accumulated so far.
    fn fitness(&self) -> f32;

    /// Tile currently occupied by the player.
    fn tile_position(&self) -> TilePosition;

    /// Writes the `in_h × in_w` observation window around the player into `out`.
    fn observe(&self, in_h: usize, in_w: usize, out: &mut [f32]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_continue_is_non_terminal() {
        assert!(!StepOutcome::Continue.is_terminal());
        assert!(StepOutcome::Dead.is_terminal());
        assert!(StepOutcome::TimedOut.is_terminal());
        assert!(StepOutcome::Complete.is_terminal());
    }

    #[test]
    fn outcomes_map_to_death_types() {
        assert_eq!(StepOutcome::Continue.death_type(), DeathType::Alive);
        assert_eq!(StepOutcome::Dead.death_type(), DeathType::Dead);
        assert_eq!(StepOutcome::TimedOut.death_type(), DeathType::TimedOut);
        assert_eq!(StepOutcome::Complete.death_type(), DeathType::Complete);
        assert_eq!(DeathType::TimedOut.to_string(), "timed out");
    }
}
