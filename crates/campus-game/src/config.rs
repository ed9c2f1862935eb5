//! Gameplay tuning for the world controller

use serde::{Deserialize, Serialize};

use crate::dialogue::DialogueConfig;
use crate::npc::NpcConfig;
use crate::player::PlayerConfig;

/// Everything the world controller can be tuned with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Ticks a map's portals stay shut after the player arrives through one
    pub portal_cooldown: u32,
    /// Ticks every map's portals stay shut after start-up
    pub startup_cooldown: u32,
    /// Length of a dispatched exercise action in ticks
    pub exercise_duration: u32,
    /// How long transient notices stay on screen
    pub notice_ticks: u32,
    pub player: PlayerConfig,
    pub npc: NpcConfig,
    pub dialogue: DialogueConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            portal_cooldown: 60,
            startup_cooldown: 120,
            exercise_duration: 300,
            notice_ticks: 120,
            player: PlayerConfig::default(),
            npc: NpcConfig::default(),
            dialogue: DialogueConfig::default(),
        }
    }
}
