use std::ops::RangeInclusive;

use crate::{Button, ButtonState, LEVEL_HEIGHT, Level, SPAWN_TILE, TILE_SIZE, Tile, TilePosition};

/// Player hitbox width in pixels.
pub const PLAYER_WIDTH: f32 = 24.0;
/// Player hitbox height in pixels.
pub const PLAYER_HEIGHT: f32 = 30.0;

const V_X: f32 = 6.0;
const V_JUMP: f32 = 8.0;
const INERTIA: f32 = 1.5;
const GRAVITY: f32 = 0.3;
// Must stay below TILE_SIZE so a falling body cannot tunnel through a tile.
const MAX_FALL: f32 = 12.0;
const EPSILON: f32 = 0.001;

/// Position (top-left corner, pixels) and velocity of the player hitbox.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub on_ground: bool,
}

/// The controllable player.
///
/// Tracks the furthest horizontal position ever reached, which is what the
/// game reports as fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    body: Body,
    spawn_x: f32,
    max_x: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::spawn()
    }
}

#[expect(clippy::cast_possible_truncation)]
fn tile_index(px: f32) -> i32 {
    (px / TILE_SIZE).floor() as i32
}

#[expect(clippy::cast_precision_loss)]
fn tile_edge(index: i32) -> f32 {
    index as f32 * TILE_SIZE
}

fn any_solid(level: &Level, cols: RangeInclusive<i32>, rows: RangeInclusive<i32>) -> bool {
    cols.into_iter().any(|x| {
        rows.clone()
            .any(|y| level.tile(TilePosition::new(x, y)).is_solid())
    })
}

impl Player {
    /// Places a player standing on the spawn tile.
    #[must_use]
    pub fn spawn() -> Self {
        let x = tile_edge(SPAWN_TILE.x) + (TILE_SIZE - PLAYER_WIDTH) / 2.0;
        let y = tile_edge(SPAWN_TILE.y + 1) - PLAYER_HEIGHT;
        Self {
            body: Body {
                x,
                y,
                vx: 0.0,
                vy: 0.0,
                on_ground: true,
            },
            spawn_x: x,
            max_x: x,
        }
    }

    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Tile containing the centre of the hitbox.
    #[must_use]
    pub fn tile_position(&self) -> TilePosition {
        TilePosition::new(
            tile_index(self.body.x + PLAYER_WIDTH / 2.0),
            tile_index(self.body.y + PLAYER_HEIGHT / 2.0),
        )
    }

    /// Furthest distance travelled to the right of the spawn, in tiles.
    #[must_use]
    pub fn progress(&self) -> f32 {
        (self.max_x - self.spawn_x) / TILE_SIZE
    }

    /// Returns `true` once the player has dropped below the bottom of the level.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn fell_out(&self) -> bool {
        self.body.y > LEVEL_HEIGHT as f32 * TILE_SIZE
    }

    /// Returns `true` if any tile overlapped by the hitbox satisfies `pred`.
    pub fn touches<F>(&self, level: &Level, mut pred: F) -> bool
    where
        F: FnMut(Tile) -> bool,
    {
        let cols = tile_index(self.body.x)..=tile_index(self.body.x + PLAYER_WIDTH - EPSILON);
        let rows = tile_index(self.body.y)..=tile_index(self.body.y + PLAYER_HEIGHT - EPSILON);
        cols.into_iter().any(|x| {
            rows.clone()
                .any(|y| pred(level.tile(TilePosition::new(x, y))))
        })
    }

    /// Applies one update of input, gravity and collision.
    pub fn update(&mut self, level: &Level, buttons: ButtonState) {
        let body = &mut self.body;
        match (
            buttons.is_pressed(Button::Left),
            buttons.is_pressed(Button::Right),
        ) {
            (true, false) => body.vx = -V_X,
            (false, true) => body.vx = V_X,
            _ => {
                body.vx /= INERTIA;
                if body.vx.abs() < 0.1 {
                    body.vx = 0.0;
                }
            }
        }
        if buttons.is_pressed(Button::Jump) && body.on_ground {
            body.vy = -V_JUMP;
        }
        body.vy = (body.vy + GRAVITY).min(MAX_FALL);

        self.move_horizontal(level);
        self.move_vertical(level);
        self.max_x = self.max_x.max(self.body.x);
    }

    fn move_horizontal(&mut self, level: &Level) {
        let body = &mut self.body;
        if body.vx.abs() < EPSILON {
            return;
        }
        let new_x = (body.x + body.vx).max(0.0);
        let rows = tile_index(body.y)..=tile_index(body.y + PLAYER_HEIGHT - EPSILON);
        if body.vx > 0.0 {
            let col = tile_index(new_x + PLAYER_WIDTH - EPSILON);
            if any_solid(level, col..=col, rows) {
                body.x = tile_edge(col) - PLAYER_WIDTH;
                body.vx = 0.0;
            } else {
                body.x = new_x;
            }
        } else {
            let col = tile_index(new_x);
            if any_solid(level, col..=col, rows) {
                body.x = tile_edge(col + 1);
                body.vx = 0.0;
            } else {
                body.x = new_x;
            }
        }
    }

    fn move_vertical(&mut self, level: &Level) {
        let body = &mut self.body;
        let new_y = body.y + body.vy;
        let cols = tile_index(body.x)..=tile_index(body.x + PLAYER_WIDTH - EPSILON);
        body.on_ground = false;
        if body.vy > 0.0 {
            let row = tile_index(new_y + PLAYER_HEIGHT - EPSILON);
            if any_solid(level, cols, row..=row) {
                body.y = tile_edge(row) - PLAYER_HEIGHT;
                body.vy = 0.0;
                body.on_ground = true;
            } else {
                body.y = new_y;
            }
        } else if body.vy < 0.0 {
            let row = tile_index(new_y);
            if any_solid(level, cols, row..=row) {
                body.y = tile_edge(row + 1);
                body.vy = 0.0;
            } else {
                body.y = new_y;
            }
        }
    }
}
