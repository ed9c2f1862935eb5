//! Validated collection of every map in the game

use campus_core::{Aabb, Direction, Position, Vec2};
use tracing::{debug, info};

use crate::error::WorldError;
use crate::map::{MapDefinition, MapId, MapSource};

/// Sprite size of the avatar that arrives at the player start and portal spawns
pub const SPAWN_BODY_SIZE: Vec2 = Vec2::new(12.0, 14.0);
/// Margin trimmed from each side of the sprite for collision
pub const SPAWN_BODY_INSET: f32 = 2.0;

/// Where the player appears
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub map: MapId,
    pub position: Position,
    pub facing: Direction,
}

/// All maps, validated as a whole.
///
/// Construction fails if any map is missing or duplicated, or if any spawn
/// (player start, portal destination, NPC) lands outside its map or on a
/// solid tile. Portal targets are typed `MapId`s, so with every map present
/// no portal can lead nowhere. A `WorldAtlas` that exists is therefore safe
/// to navigate without further checks.
#[derive(Debug, Clone)]
pub struct WorldAtlas {
    /// Indexed by `MapId::index`
    maps: Vec<MapDefinition>,
    start: SpawnPoint,
}

impl WorldAtlas {
    pub fn new(maps: Vec<MapDefinition>, start: SpawnPoint) -> Result<Self, WorldError> {
        let mut slots: Vec<Option<MapDefinition>> = MapId::ALL.iter().map(|_| None).collect();
        for map in maps {
            let slot = &mut slots[map.id.index()];
            if slot.is_some() {
                return Err(WorldError::DuplicateMap(map.id));
            }
            *slot = Some(map);
        }

        let mut ordered = Vec::with_capacity(slots.len());
        for (slot, id) in slots.into_iter().zip(MapId::ALL) {
            ordered.push(slot.ok_or(WorldError::MissingMap(id))?);
        }

        let atlas = Self {
            maps: ordered,
            start,
        };
        atlas.validate()?;
        info!("World atlas loaded with {} maps", atlas.maps.len());
        Ok(atlas)
    }

    /// Build from serialized map sources
    pub fn from_sources(sources: Vec<MapSource>, start: SpawnPoint) -> Result<Self, WorldError> {
        let maps = sources
            .into_iter()
            .map(MapDefinition::from_source)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(maps, start)
    }

    fn validate(&self) -> Result<(), WorldError> {
        self.check_player_spawn(self.start.map, "Player start", self.start.position)?;

        for map in &self.maps {
            for (index, portal) in map.portals.iter().enumerate() {
                self.check_player_spawn(
                    portal.target_map,
                    &format!("Portal {} spawn from {:?}", index, map.id),
                    portal.target_spawn,
                )?;
            }

            for item in &map.items {
                self.check_spawn(map.id, item.kind.name(), item.area.center())?;
            }

            for npc in &map.npcs {
                self.check_spawn(map.id, &format!("NPC '{}'", npc.id), npc.position)?;
            }
            debug!(
                "Validated {:?}: {} portals, {} NPCs",
                map.id,
                map.portals.len(),
                map.npcs.len()
            );
        }
        Ok(())
    }

    /// The arriving avatar's collision box must be clear, not just its corner
    fn check_player_spawn(&self, id: MapId, what: &str, position: Position) -> Result<(), WorldError> {
        self.check_spawn(id, what, position)?;
        let hitbox = Aabb::at(position, SPAWN_BODY_SIZE).inset(SPAWN_BODY_INSET);
        if self.map(id).grid.is_area_blocked(&hitbox) {
            return Err(WorldError::SpawnBlocked {
                map: id,
                what: what.to_string(),
                x: position.x,
                y: position.y,
            });
        }
        Ok(())
    }

    fn check_spawn(&self, id: MapId, what: &str, position: Position) -> Result<(), WorldError> {
        let map = self.map(id);
        if !map.bounds().contains_point(position) {
            return Err(WorldError::SpawnOutOfBounds {
                map: id,
                what: what.to_string(),
                x: position.x,
                y: position.y,
            });
        }
        match map.grid.tile_at(position) {
            Some(tile) if !tile.is_solid() => Ok(()),
            _ => Err(WorldError::SpawnBlocked {
                map: id,
                what: what.to_string(),
                x: position.x,
                y: position.y,
            }),
        }
    }

    pub fn map(&self, id: MapId) -> &MapDefinition {
        &self.maps[id.index()]
    }

    pub fn maps(&self) -> impl Iterator<Item = &MapDefinition> {
        self.maps.iter()
    }

    pub fn start(&self) -> SpawnPoint {
        self.start
    }
}
