//! Movement configuration and constants

use campus_core::Vec2;
use serde::{Deserialize, Serialize};

use crate::motion::Body;

/// Player movement configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walking speed in pixels per tick
    pub speed: f32,
    /// Speed multiplier while skateboarding
    pub special_multiplier: f32,
    /// Sprite width and height in pixels
    pub size: Vec2,
    /// Collision margin trimmed from each side of the sprite
    pub hitbox_inset: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            special_multiplier: 1.2,
            size: Vec2::new(12.0, 14.0),
            hitbox_inset: 2.0,
        }
    }
}

impl PlayerConfig {
    /// Get the current speed based on special mode
    pub fn max_speed(&self, special_mode: bool) -> f32 {
        if special_mode {
            self.speed * self.special_multiplier
        } else {
            self.speed
        }
    }

    pub fn body(&self) -> Body {
        Body::new(self.size, self.hitbox_inset)
    }
}
