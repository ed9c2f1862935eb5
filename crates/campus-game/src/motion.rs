//! Axis-separated motion against a collision provider

use campus_core::{Aabb, Position, Vec2};
use campus_world::{blocked_or_fail_closed, CollisionProvider};

/// Collision footprint of a moving body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Full sprite size in pixels
    pub size: Vec2,
    /// Margin trimmed from every side of the sprite for collision
    pub inset: f32,
}

impl Body {
    pub fn new(size: Vec2, inset: f32) -> Self {
        Self { size, inset }
    }

    /// Full box at `position`
    pub fn bounds(&self, position: Position) -> Aabb {
        Aabb::at(position, self.size)
    }

    /// Collision box at `position`
    pub fn hitbox(&self, position: Position) -> Aabb {
        self.bounds(position).inset(self.inset)
    }
}

/// Move by `delta`, resolving X then Y. Each axis is rejected as a whole when
/// its step would overlap solid terrain, so a blocked corner never freezes
/// motion along the open axis.
pub fn step_axis_separated(
    provider: &dyn CollisionProvider,
    body: Body,
    position: Position,
    delta: Vec2,
) -> Position {
    let mut next = position;

    if delta.x != 0.0 {
        let candidate = Vec2::new(next.x + delta.x, next.y);
        if !blocked_or_fail_closed(provider, body.hitbox(candidate)) {
            next = candidate;
        }
    }

    if delta.y != 0.0 {
        let candidate = Vec2::new(next.x, next.y + delta.y);
        if !blocked_or_fail_closed(provider, body.hitbox(candidate)) {
            next = candidate;
        }
    }

    next
}
