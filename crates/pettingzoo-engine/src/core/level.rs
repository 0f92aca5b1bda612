use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Tile, TilePosition};

/// Level width in tiles.
pub const LEVEL_WIDTH: usize = 256;
/// Level height in tiles.
pub const LEVEL_HEIGHT: usize = 32;
/// Edge length of one tile in pixels.
pub const TILE_SIZE: f32 = 32.0;
/// Row of the ground surface at the start of every level.
pub const GROUND_HEIGHT: usize = LEVEL_HEIGHT - LEVEL_HEIGHT / 4;
/// Reaching this column completes the level.
pub const FINISH_COLUMN: usize = LEVEL_WIDTH - 4;
/// Tile the player spawns on.
#[expect(clippy::cast_possible_wrap)]
pub const SPAWN_TILE: TilePosition = TilePosition::new(2, GROUND_HEIGHT as i32 - 1);

const SAFE_START_COLUMNS: usize = 10;
const SAFE_FINISH_COLUMNS: usize = 8;
const MIN_SURFACE: usize = GROUND_HEIGHT - 6;
const MAX_SURFACE: usize = LEVEL_HEIGHT - 2;
const PLATFORM_CLEARANCE: usize = 4;

/// Seed that fully determines a generated [`Level`].
///
/// Stored alongside persisted chromosomes so the exact level an agent was
/// scored on can be regenerated for replay.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::FromStr,
)]
pub struct LevelSeed(u32);

impl LevelSeed {
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Encodes the seed as it appears in persisted artifacts.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }
}

/// Allows drawing fresh level seeds with `rng.random()`.
impl Distribution<LevelSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> LevelSeed {
        LevelSeed(rng.random())
    }
}

#[derive(Debug, Clone, Copy)]
enum Feature {
    Flat,
    Gap,
    Spikes,
    Step,
    Platform,
}

impl Feature {
    fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        match rng.random_range(0..10) {
            0..=3 => Self::Flat,
            4..=5 => Self::Gap,
            6 => Self::Spikes,
            7 => Self::Step,
            _ => Self::Platform,
        }
    }
}

/// A `LEVEL_WIDTH × LEVEL_HEIGHT` tile grid, stored row-major.
///
/// # Generation
///
/// [`Level::generate`] walks the level left to right, emitting short runs of
/// terrain features:
///
/// - flat ground
/// - gaps of one to three columns
/// - a spike on otherwise flat ground
/// - a step up or down of one or two rows
/// - flat ground under a floating brick platform
///
/// The first columns around the spawn and the columns before
/// [`FINISH_COLUMN`] are always flat ground, so every level is started and
/// finished on solid footing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    tiles: Vec<Tile>,
}

impl Level {
    /// Creates a level with no tiles at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tiles: vec![Tile::Empty; LEVEL_WIDTH * LEVEL_HEIGHT],
        }
    }

    /// Creates a level with flat ground at [`GROUND_HEIGHT`] across its full width.
    #[must_use]
    pub fn flat() -> Self {
        let mut level = Self::empty();
        for x in 0..LEVEL_WIDTH {
            level.fill_ground(x, GROUND_HEIGHT);
        }
        level
    }

    /// Generates the level determined by `seed`.
    #[must_use]
    pub fn generate(seed: LevelSeed) -> Self {
        let mut rng = Pcg32::seed_from_u64(u64::from(seed.get()));
        let mut level = Self::empty();
        let mut surface = GROUND_HEIGHT;

        let mut x = 0;
        while x < LEVEL_WIDTH {
            let remaining = LEVEL_WIDTH - x;
            let safe = x < SAFE_START_COLUMNS || x + SAFE_FINISH_COLUMNS >= FINISH_COLUMN;
            let feature = if safe {
                Feature::Flat
            } else {
                Feature::random(&mut rng)
            };

            let len = match feature {
                Feature::Flat => {
                    let len = rng.random_range(3..=6).min(remaining);
                    level.fill_ground_run(x, len, surface);
                    len
                }
                Feature::Gap => rng.random_range(1..=3).min(remaining),
                Feature::Spikes => {
                    let len = remaining.min(3);
                    level.fill_ground_run(x, len, surface);
                    level.set_tile(x + len / 2, surface - 1, Tile::Spikes);
                    len
                }
                Feature::Step => {
                    surface = if rng.random_bool(0.5) {
                        surface.saturating_sub(rng.random_range(1..=2)).max(MIN_SURFACE)
                    } else {
                        (surface + rng.random_range(1..=2)).min(MAX_SURFACE)
                    };
                    let len = remaining.min(3);
                    level.fill_ground_run(x, len, surface);
                    len
                }
                Feature::Platform => {
                    let len = rng.random_range(4..=6).min(remaining);
                    level.fill_ground_run(x, len, surface);
                    for c in x..x + len {
                        level.set_tile(c, surface - PLATFORM_CLEARANCE, Tile::Bricks);
                    }
                    len
                }
            };
            x += len;
        }

        level
    }

    /// Returns the tile at `pos`; positions outside the level read as [`Tile::Empty`].
    #[must_use]
    pub fn tile(&self, pos: TilePosition) -> Tile {
        let (Ok(x), Ok(y)) = (usize::try_from(pos.x), usize::try_from(pos.y)) else {
            return Tile::Empty;
        };
        if x >= LEVEL_WIDTH || y >= LEVEL_HEIGHT {
            return Tile::Empty;
        }
        self.tiles[y * LEVEL_WIDTH + x]
    }

    /// Overwrites one tile.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the level.
    pub fn set_tile(&mut self, x: usize, y: usize, tile: Tile) {
        assert!(x < LEVEL_WIDTH && y < LEVEL_HEIGHT, "tile ({x}, {y}) out of level");
        self.tiles[y * LEVEL_WIDTH + x] = tile;
    }

    /// Fills column `x` with grass at `surface` and dirt below it.
    pub fn fill_ground(&mut self, x: usize, surface: usize) {
        self.set_tile(x, surface, Tile::Grass);
        for y in surface + 1..LEVEL_HEIGHT {
            self.set_tile(x, y, Tile::Dirt);
        }
    }

    fn fill_ground_run(&mut self, x: usize, len: usize, surface: usize) {
        for c in x..x + len {
            self.fill_ground(c, surface);
        }
    }

    /// Returns the first solid row of column `x`, scanning from the top.
    #[must_use]
    pub fn surface_row(&self, x: usize) -> Option<usize> {
        (0..LEVEL_HEIGHT).find(|&y| self.tiles[y * LEVEL_WIDTH + x].is_solid())
    }

    /// Samples the `in_h × in_w` tile window centred on `center` into `out`.
    ///
    /// Cells are written row-major using [`Tile::input_value`].
    ///
    /// # Panics
    ///
    /// Panics if `out.len() != in_h * in_w`.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn observe(&self, center: TilePosition, in_h: usize, in_w: usize, out: &mut [f32]) {
        assert_eq!(out.len(), in_h * in_w);
        if in_w == 0 {
            return;
        }
        let top = center.y - (in_h / 2) as i32;
        let left = center.x - (in_w / 2) as i32;
        for (r, row) in out.chunks_exact_mut(in_w).enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                let pos = TilePosition::new(left + c as i32, top + r as i32);
                *cell = self.tile(pos).input_value();
            }
        }
    }
}
