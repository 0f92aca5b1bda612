use std::sync::Arc;

use crate::{
    ButtonState, FINISH_COLUMN, Level, LevelSeed, Player, Simulation, StepOutcome, Tile,
    TilePosition, UPDATES_PS,
};

/// Seconds a player has to finish a level before the game times it out.
pub const LEVEL_TIME_LIMIT_SECS: u32 = 120;

const LEVEL_TIME_LIMIT: u64 = LEVEL_TIME_LIMIT_SECS as u64 * UPDATES_PS as u64;

/// A single player on a single level.
///
/// The level is shared behind an [`Arc`], so cloning a freshly created game is
/// the cheap way to hand one independent instance to each agent of a
/// generation.
///
/// # Fitness
///
/// Fitness is the furthest distance (in tiles) the player got to the right of
/// the spawn. Completing the level adds the unused time in seconds as a bonus,
/// so faster completions score higher. Fitness never decreases during a run.
#[derive(Debug, Clone)]
pub struct Game {
    seed: LevelSeed,
    level: Arc<Level>,
    player: Player,
    updates: u64,
    fitness: f32,
    outcome: StepOutcome,
}

impl Game {
    /// Generates the level for `seed` and spawns the player.
    #[must_use]
    pub fn new(seed: LevelSeed) -> Self {
        Self::with_level(seed, Arc::new(Level::generate(seed)))
    }

    /// Like [`Self::new`], but reuses an already generated level.
    #[must_use]
    pub fn with_level(seed: LevelSeed, level: Arc<Level>) -> Self {
        Self {
            seed,
            level,
            player: Player::spawn(),
            updates: 0,
            fitness: 0.0,
            outcome: StepOutcome::Continue,
        }
    }

    #[must_use]
    pub fn seed(&self) -> LevelSeed {
        self.seed
    }

    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Number of updates simulated so far.
    #[must_use]
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Outcome of the most recent update.
    #[must_use]
    pub fn outcome(&self) -> StepOutcome {
        self.outcome
    }

    #[expect(clippy::cast_precision_loss)]
    fn completion_bonus(&self) -> f32 {
        LEVEL_TIME_LIMIT.saturating_sub(self.updates) as f32 / UPDATES_PS as f32
    }
}

impl Simulation for Game {
    fn step(&mut self, buttons: ButtonState) -> StepOutcome {
        if self.outcome.is_terminal() {
            return self.outcome;
        }

        self.player.update(&self.level, buttons);
        self.updates += 1;
        self.fitness = self.fitness.max(self.player.progress());

        #[expect(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        let finish = FINISH_COLUMN as i32;
        let dead = self.player.fell_out() || self.player.touches(&self.level, Tile::is_hazard);
        self.outcome = if dead {
            StepOutcome::Dead
        } else if self.player.tile_position().x >= finish {
            self.fitness += self.completion_bonus();
            StepOutcome::Complete
        } else if self.updates >= LEVEL_TIME_LIMIT {
            StepOutcome::TimedOut
        } else {
            StepOutcome::Continue
        };
        self.outcome
    }

    fn fitness(&self) -> f32 {
        self.fitness
    }

    fn tile_position(&self) -> TilePosition {
        self.player.tile_position()
    }

    fn observe(&self, in_h: usize, in_w: usize, out: &mut [f32]) {
        self.level
            .observe(self.player.tile_position(), in_h, in_w, out);
    }
}

#[cfg(test)]
mod tests {
    use crate::{Button, GROUND_HEIGHT, LEVEL_HEIGHT};

    use super::*;

    fn right() -> ButtonState {
        let mut state = ButtonState::default();
        state.set(Button::Right, true);
        state
    }

    fn run_until_terminal(game: &mut Game, buttons: ButtonState) -> StepOutcome {
        loop {
            let outcome = game.step(buttons);
            if outcome.is_terminal() {
                return outcome;
            }
        }
    }

    #[test]
    fn running_right_on_flat_ground_completes() {
        let mut game = Game::with_level(LevelSeed::new(0), Arc::new(Level::flat()));
        let outcome = run_until_terminal(&mut game, right());
        assert_eq!(outcome, StepOutcome::Complete);
        assert!(game.fitness() > game.player().progress());
        assert!(game.updates() < LEVEL_TIME_LIMIT);
    }

    #[test]
    fn standing_still_times_out_with_zero_fitness() {
        let mut game = Game::with_level(LevelSeed::new(0), Arc::new(Level::flat()));
        let outcome = run_until_terminal(&mut game, ButtonState::default());
        assert_eq!(outcome, StepOutcome::TimedOut);
        assert_eq!(game.updates(), LEVEL_TIME_LIMIT);
        assert_eq!(game.fitness(), 0.0);
    }

    #[test]
    fn touching_spikes_kills() {
        let mut level = Level::flat();
        level.set_tile(8, GROUND_HEIGHT - 1, Tile::Spikes);
        let mut game = Game::with_level(LevelSeed::new(0), Arc::new(level));
        assert_eq!(run_until_terminal(&mut game, right()), StepOutcome::Dead);
        assert!(game.player().tile_position().x <= 8);
    }

    #[test]
    fn falling_into_a_pit_kills() {
        let mut level = Level::flat();
        for x in 5..9 {
            for y in 0..LEVEL_HEIGHT {
                level.set_tile(x, y, Tile::Empty);
            }
        }
        let mut game = Game::with_level(LevelSeed::new(0), Arc::new(level));
        assert_eq!(run_until_terminal(&mut game, right()), StepOutcome::Dead);
    }

    #[test]
    fn terminal_outcome_is_sticky() {
        let mut level = Level::flat();
        level.set_tile(4, GROUND_HEIGHT - 1, Tile::Spikes);
        let mut game = Game::with_level(LevelSeed::new(0), Arc::new(level));
        run_until_terminal(&mut game, right());
        let updates = game.updates();
        assert_eq!(game.step(right()), StepOutcome::Dead);
        assert_eq!(game.updates(), updates);
    }

    #[test]
    fn same_seed_replays_identically() {
        let script = |i: usize| {
            let mut state = right();
            state.set(Button::Jump, i % 40 < 10);
            state
        };
        let mut a = Game::new(LevelSeed::new(99));
        let mut b = Game::new(LevelSeed::new(99));
        for i in 0..2000 {
            assert_eq!(a.step(script(i)), b.step(script(i)));
            assert_eq!(a.tile_position(), b.tile_position());
        }
        assert_eq!(a.fitness(), b.fitness());
    }
}
