//! Static level data: tiles, tile coordinates and generated levels.
//!
//! - [`Tile`] - What occupies one cell of the level grid
//! - [`TilePosition`] - Signed tile coordinates (may lie outside the level)
//! - [`Level`] - The full tile grid, generated from a [`LevelSeed`](crate::LevelSeed)

pub use self::{level::*, tile::*};

mod level;
mod tile;
