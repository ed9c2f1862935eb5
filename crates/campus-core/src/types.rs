//! Core types used throughout the campus runtime

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A point in map-pixel space (top-left origin, y grows downward)
pub type Position = Vec2;

/// Cardinal facing of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Facing along the dominant axis of `v`. Ties resolve to the vertical axis.
    /// Returns `None` for a zero vector.
    pub fn from_vector(v: Vec2) -> Option<Self> {
        if v == Vec2::ZERO {
            return None;
        }
        if v.x.abs() > v.y.abs() {
            Some(if v.x > 0.0 { Direction::Right } else { Direction::Left })
        } else {
            Some(if v.y > 0.0 { Direction::Down } else { Direction::Up })
        }
    }

    /// Unit vector pointing in this direction
    pub fn unit(&self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Whether a movement intent points this way along its dominant axis
    pub fn matches_intent(&self, intent: Vec2) -> bool {
        Self::from_vector(intent) == Some(*self)
    }
}

/// Axis-aligned box in map-pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Box of `size` with its top-left corner at `position`
    pub fn at(position: Position, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Strict overlap test; boxes that only share an edge do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    /// Shrink by `margin` on every side
    pub fn inset(&self, margin: f32) -> Self {
        Self::new(
            self.x + margin,
            self.y + margin,
            (self.w - margin * 2.0).max(0.0),
            (self.h - margin * 2.0).max(0.0),
        )
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }
}

/// Gameplay actions an NPC can be asked to perform through dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Jog to the ball and play football for a while
    Exercise,
}

impl ActionKind {
    pub const ALL: [ActionKind; 1] = [ActionKind::Exercise];

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Exercise => "Exercise",
        }
    }

    /// Bracketed directive token the model appends to request this action
    pub fn token(&self) -> String {
        format!("[ACTION:{}]", self.name())
    }

    /// Instruction line describing when the model may emit this action
    pub fn prompt_grammar(&self) -> String {
        match self {
            ActionKind::Exercise => format!(
                "- If the player asks you to play football, kick a ball or exercise, you may agree and end your reply with {}",
                self.token()
            ),
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
