//! Player avatar driven by movement intent

use campus_core::{Aabb, Direction, Position, Vec2};
use campus_world::CollisionProvider;

use crate::motion::step_axis_separated;

use super::PlayerConfig;

/// Player avatar: position, facing and skateboard mode
#[derive(Debug, Clone)]
pub struct PlayerController {
    /// Movement configuration
    pub config: PlayerConfig,
    position: Position,
    facing: Direction,
    has_skateboard: bool,
    special_mode: bool,
}

impl PlayerController {
    pub fn new(config: PlayerConfig, position: Position, facing: Direction) -> Self {
        Self {
            config,
            position,
            facing,
            has_skateboard: false,
            special_mode: false,
        }
    }

    /// Top-left of the sprite in map pixels
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn special_mode(&self) -> bool {
        self.special_mode
    }

    pub fn has_skateboard(&self) -> bool {
        self.has_skateboard
    }

    /// Unlock skateboard mode. Returns false if it was already unlocked.
    pub fn give_skateboard(&mut self) -> bool {
        !std::mem::replace(&mut self.has_skateboard, true)
    }

    /// Flip skateboard mode. Does nothing until the board has been picked up.
    pub fn toggle_special_mode(&mut self) -> bool {
        if !self.has_skateboard {
            return false;
        }
        self.special_mode = !self.special_mode;
        true
    }

    /// Full sprite box, used for portal triggers and interaction range
    pub fn bounds(&self) -> Aabb {
        self.config.body().bounds(self.position)
    }

    /// Place the player exactly, e.g. at a portal's destination
    pub fn teleport(&mut self, position: Position, facing: Direction) {
        self.position = position;
        self.facing = facing;
    }

    /// Advance one tick. Facing follows the dominant axis of the intent; motion is
    /// axis-separated against `collision` and the result is kept inside `map_bounds`.
    pub fn update(&mut self, intent: Vec2, collision: &dyn CollisionProvider, map_bounds: Aabb) {
        let Some(facing) = Direction::from_vector(intent) else {
            return;
        };
        self.facing = facing;

        let delta = intent * self.config.max_speed(self.special_mode);
        let moved = step_axis_separated(collision, self.config.body(), self.position, delta);

        let max = (map_bounds.max() - self.config.size).max(map_bounds.min());
        self.position = moved.clamp(map_bounds.min(), max);
    }
}
