//! Per-tick snapshot handed to whatever draws the game

use campus_core::{Direction, Position, Vec2};
use campus_world::{ItemPickup, MapId, NpcArchetype};

use crate::dialogue::ConversationView;
use crate::npc::NpcState;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub position: Position,
    pub facing: Direction,
    pub special_mode: bool,
    pub has_skateboard: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpcView {
    pub name: String,
    pub archetype: NpcArchetype,
    pub position: Position,
    pub facing: Direction,
    pub state: NpcState,
}

/// The modal UI on top of the world, if any
#[derive(Debug, Clone, PartialEq)]
pub enum ModalView {
    None,
    Menu,
    AiConversation(ConversationView),
    Scripted { speaker: String, line: String },
    /// A shelf, sign or similar
    Reading { title: String, lines: Vec<String> },
}

/// Read-only picture of the world after one tick
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub tick: u64,
    pub map: MapId,
    pub player: PlayerView,
    pub npcs: Vec<NpcView>,
    /// Items on this map not yet picked up
    pub items: Vec<ItemPickup>,
    /// Ball centre when the current map has a pitch
    pub ball: Option<Vec2>,
    /// Left and right goal tallies
    pub score: Option<(u32, u32)>,
    pub modal: ModalView,
    /// NPC the player could talk to right now
    pub nearby_npc: Option<String>,
    /// Title of what Interact would read
    pub nearby_readable: Option<String>,
    pub notice: Option<String>,
    pub ai_online: bool,
}
