/// Contents of a single level cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Tile {
    #[default]
    Empty,
    Grass,
    Dirt,
    Bricks,
    Spikes,
}

impl Tile {
    /// Returns `true` if the player collides with this tile.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Tile::Grass | Tile::Dirt | Tile::Bricks)
    }

    /// Returns `true` if touching this tile kills the player.
    #[must_use]
    pub const fn is_hazard(self) -> bool {
        matches!(self, Tile::Spikes)
    }

    /// Value of this tile as seen by a network input cell.
    ///
    /// Hazards read as `-1.0`, solid tiles as `1.0` and everything else as `0.0`.
    #[must_use]
    pub const fn input_value(self) -> f32 {
        if self.is_hazard() {
            -1.0
        } else if self.is_solid() {
            1.0
        } else {
            0.0
        }
    }
}

/// Signed tile coordinates; `y` grows downwards.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[display("({x}, {y})")]
pub struct TilePosition {
    pub x: i32,
    pub y: i32,
}

impl TilePosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
