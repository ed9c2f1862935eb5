use thiserror::Error;

use crate::map::MapId;

/// Configuration errors found while loading or validating map data.
/// All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("Map {0:?} is defined more than once")]
    DuplicateMap(MapId),

    #[error("Map {0:?} is not defined")]
    MissingMap(MapId),

    #[error("{what} on {map:?} at ({x}, {y}) is outside the map")]
    SpawnOutOfBounds { map: MapId, what: String, x: f32, y: f32 },

    #[error("{what} on {map:?} at ({x}, {y}) is inside solid terrain")]
    SpawnBlocked { map: MapId, what: String, x: f32, y: f32 },

    #[error("Invalid tile grid: {0}")]
    InvalidGrid(String),

    #[error("Unknown tile code {code:?} at row {row}, column {col}")]
    UnknownTile { code: char, row: usize, col: usize },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for WorldError {
    fn from(err: serde_json::Error) -> Self {
        WorldError::Parse(err.to_string())
    }
}

/// A collision provider could not answer a query
#[derive(Debug, Error)]
pub enum CollisionError {
    #[error("Collision surface for {0:?} is unavailable")]
    Unavailable(MapId),

    #[error("Collision query failed: {0}")]
    Query(String),
}
