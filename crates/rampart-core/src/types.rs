//! Fundamental geometric and simulation types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fractional position in map space (tile units).
/// x increases to the east, y to the south.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Integer grid cell coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned structure footprint on the grid, in whole tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub origin: GridPos,
    pub width: i32,
    pub height: i32,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Distance to another position in tiles.
    pub fn range_to(&self, other: &Position) -> f32 {
        self.as_vec2().distance(other.as_vec2())
    }

    /// Conversion for vector math.
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn from_vec2(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }

    /// Step toward `goal` by at most `max_step` tiles.
    pub fn step_toward(&self, goal: &Position, max_step: f32) -> Position {
        let delta = goal.as_vec2() - self.as_vec2();
        let dist = delta.length();
        if dist <= max_step || dist <= f32::EPSILON {
            *goal
        } else {
            Position::from_vec2(self.as_vec2() + delta * (max_step / dist))
        }
    }
}

impl Footprint {
    pub fn new(origin: GridPos, width: i32, height: i32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Center of the footprint in fractional tile space.
    pub fn center(&self) -> Position {
        Position::new(
            self.origin.x as f32 + self.width as f32 / 2.0,
            self.origin.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Whether a fractional position falls inside the footprint,
    /// optionally expanded by `margin` tiles on every side.
    pub fn contains(&self, pos: &Position, margin: f32) -> bool {
        let min_x = self.origin.x as f32 - margin;
        let min_y = self.origin.y as f32 - margin;
        let max_x = (self.origin.x + self.width) as f32 + margin;
        let max_y = (self.origin.y + self.height) as f32 + margin;
        pos.x >= min_x && pos.x < max_x && pos.y >= min_y && pos.y < max_y
    }

    /// Closest point on the footprint boundary (or interior) to `pos`.
    pub fn closest_point(&self, pos: &Position) -> Position {
        let min_x = self.origin.x as f32;
        let min_y = self.origin.y as f32;
        let max_x = (self.origin.x + self.width) as f32;
        let max_y = (self.origin.y + self.height) as f32;
        Position::new(pos.x.clamp(min_x, max_x), pos.y.clamp(min_y, max_y))
    }

    /// Distance from `pos` to the footprint edge (zero if inside).
    pub fn distance_to(&self, pos: &Position) -> f32 {
        self.closest_point(pos).range_to(pos)
    }
}

impl SimTime {
    /// Seconds per tick at the fixed tick rate.
    pub fn dt(&self) -> f32 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}
