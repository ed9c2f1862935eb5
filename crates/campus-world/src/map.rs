//! Map definitions: identity, grid, portals, NPC spawns, and pitch layout

use campus_core::{Aabb, ActionKind, Direction, Position, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::tile::TileGrid;

/// Default tile edge in pixels
pub const TILE_SIZE: f32 = 16.0;

/// The fixed set of maps the player can occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapId {
    Campus,
    Tunnel,
    Library,
    InteriorRoom,
}

impl MapId {
    pub const ALL: [MapId; 4] = [
        MapId::Campus,
        MapId::Tunnel,
        MapId::Library,
        MapId::InteriorRoom,
    ];

    /// Dense index into per-map tables
    pub fn index(&self) -> usize {
        match self {
            MapId::Campus => 0,
            MapId::Tunnel => 1,
            MapId::Library => 2,
            MapId::InteriorRoom => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MapId::Campus => "East Campus",
            MapId::Tunnel => "Underpass",
            MapId::Library => "Library",
            MapId::InteriorRoom => "Dome Hall",
        }
    }
}

/// A trigger region that moves the player to another map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub trigger: Aabb,
    pub required_facing: Direction,
    pub target_map: MapId,
    pub target_spawn: Position,
    pub target_facing: Direction,
}

/// NPC body/behaviour archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcArchetype {
    Student,
    StudentFemale,
    Professor,
    Staff,
    CatOrange,
    CatBlack,
    CatCalico,
}

impl NpcArchetype {
    pub const ALL: [NpcArchetype; 7] = [
        NpcArchetype::Student,
        NpcArchetype::StudentFemale,
        NpcArchetype::Professor,
        NpcArchetype::Staff,
        NpcArchetype::CatOrange,
        NpcArchetype::CatBlack,
        NpcArchetype::CatCalico,
    ];
}

/// Static NPC record loaded with its map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcSpawn {
    pub id: String,
    pub name: String,
    pub archetype: NpcArchetype,
    /// Top-left of the NPC body in map pixels
    pub position: Position,
    #[serde(default)]
    pub facing: Direction,
    #[serde(default)]
    pub dialogue_lines: Vec<String>,
    /// Role-play persona for model-driven conversation
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<ActionKind>,
}

/// Football pitch placement on a map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchLayout {
    /// Playable rectangle the ball bounces inside
    pub field: Aabb,
    /// Anchor (mouth centre) of the left goal
    pub left_goal: Vec2,
    /// Anchor (mouth centre) of the right goal
    pub right_goal: Vec2,
}

/// A fixture the player reads with Interact: a bookshelf, a sign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readable {
    /// Region the player's centre must be in to read it
    pub reach: Aabb,
    pub title: String,
    #[serde(default)]
    pub lines: Vec<String>,
}

/// Collectable items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Unlocks skateboard mode
    Skateboard,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Skateboard => "Skateboard",
        }
    }

    /// Shown when the item is picked up
    pub fn pickup_message(&self) -> &'static str {
        match self {
            ItemKind::Skateboard => "Got the skateboard! Press B or pad X to ride it.",
        }
    }
}

/// A one-off item lying on a map, collected by walking over it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemPickup {
    pub kind: ItemKind,
    pub area: Aabb,
}

/// A loaded, parsed map
#[derive(Debug, Clone)]
pub struct MapDefinition {
    pub id: MapId,
    pub grid: TileGrid,
    pub portals: Vec<Portal>,
    pub npcs: Vec<NpcSpawn>,
    pub pitch: Option<PitchLayout>,
    pub readables: Vec<Readable>,
    pub items: Vec<ItemPickup>,
}

/// Serialized form of a map: legend rows instead of a parsed grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSource {
    pub id: MapId,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    pub rows: Vec<String>,
    #[serde(default)]
    pub portals: Vec<Portal>,
    #[serde(default)]
    pub npcs: Vec<NpcSpawn>,
    #[serde(default)]
    pub pitch: Option<PitchLayout>,
    #[serde(default)]
    pub readables: Vec<Readable>,
    #[serde(default)]
    pub items: Vec<ItemPickup>,
}

fn default_tile_size() -> f32 {
    TILE_SIZE
}

impl MapDefinition {
    pub fn from_source(source: MapSource) -> Result<Self, WorldError> {
        let grid = TileGrid::from_rows(&source.rows, source.tile_size)?;
        Ok(Self {
            id: source.id,
            grid,
            portals: source.portals,
            npcs: source.npcs,
            pitch: source.pitch,
            readables: source.readables,
            items: source.items,
        })
    }

    /// Parse a single map from JSON
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        let source: MapSource = serde_json::from_str(json)?;
        Self::from_source(source)
    }

    pub fn pixel_size(&self) -> Vec2 {
        self.grid.pixel_size()
    }

    pub fn bounds(&self) -> Aabb {
        self.grid.bounds()
    }
}
