//! Campus World - maps, portals, and collision
//!
//! Every map is a tile grid with a derived collision grid, a set of portals
//! leading to other maps, and the NPCs that live there. The [`WorldAtlas`]
//! validates the whole set at load time so navigation never meets an
//! undefined map at runtime.

pub mod atlas;
pub mod builtin;
pub mod collision;
pub mod error;
pub mod map;
pub mod tile;

pub use atlas::{SpawnPoint, WorldAtlas, SPAWN_BODY_INSET, SPAWN_BODY_SIZE};
pub use builtin::builtin_atlas;
pub use collision::{blocked_or_fail_closed, CollisionProvider};
pub use error::{CollisionError, WorldError};
pub use map::{
    ItemKind, ItemPickup, MapDefinition, MapId, MapSource, NpcArchetype, NpcSpawn, PitchLayout, Portal,
    Readable, TILE_SIZE,
};
pub use tile::{TileGrid, TileKind};
