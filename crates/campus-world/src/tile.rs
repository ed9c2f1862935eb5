//! Tile-type codes and the tile grid with its derived collision grid

use campus_core::{Aabb, Vec2};

use crate::error::WorldError;

/// Every tile type that appears in a map grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    // Campus ground
    Grass,
    Path,
    Door,
    Tree,
    Water,
    Track,
    Field,
    Plaza,
    // Campus buildings
    Library,
    LibraryWindow,
    Dome,
    Arch,
    Canteen,
    Admin,
    Hall,
    Gym,
    JapanCenter,
    MainBuilding,
    MainWing,
    MainCourt,
    // Boundary
    Fence,
    GatePillar,
    GateTop,
    GatePass,
    // Underpass
    TunnelWall,
    TunnelLight,
    TunnelEntry,
    TunnelExit,
    Construction,
    // Interiors
    Wall,
    Floor,
    Carpet,
    Bookshelf,
    Chair,
    Table,
    Counter,
}

/// Single-character legend used by map grids
const LEGEND: &[(char, TileKind)] = &[
    ('.', TileKind::Grass),
    ('=', TileKind::Path),
    ('D', TileKind::Door),
    ('T', TileKind::Tree),
    ('~', TileKind::Water),
    ('r', TileKind::Track),
    ('f', TileKind::Field),
    ('+', TileKind::Plaza),
    ('L', TileKind::Library),
    ('l', TileKind::LibraryWindow),
    ('M', TileKind::Dome),
    ('A', TileKind::Arch),
    ('C', TileKind::Canteen),
    ('a', TileKind::Admin),
    ('H', TileKind::Hall),
    ('Y', TileKind::Gym),
    ('J', TileKind::JapanCenter),
    ('N', TileKind::MainBuilding),
    ('w', TileKind::MainWing),
    ('c', TileKind::MainCourt),
    ('#', TileKind::Fence),
    ('I', TileKind::GatePillar),
    ('n', TileKind::GateTop),
    (':', TileKind::GatePass),
    ('%', TileKind::TunnelWall),
    ('*', TileKind::TunnelLight),
    ('e', TileKind::TunnelEntry),
    ('x', TileKind::TunnelExit),
    ('z', TileKind::Construction),
    ('X', TileKind::Wall),
    ('_', TileKind::Floor),
    ('m', TileKind::Carpet),
    ('S', TileKind::Bookshelf),
    ('h', TileKind::Chair),
    ('t', TileKind::Table),
    ('K', TileKind::Counter),
];

impl TileKind {
    pub fn from_code(code: char) -> Option<Self> {
        LEGEND.iter().find(|(c, _)| *c == code).map(|(_, kind)| *kind)
    }

    pub fn code(&self) -> char {
        LEGEND
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(c, _)| *c)
            .unwrap_or('?')
    }

    /// Whether entities are blocked by this tile
    pub fn is_solid(&self) -> bool {
        matches!(
            self,
            TileKind::Tree
                | TileKind::Water
                | TileKind::Library
                | TileKind::LibraryWindow
                | TileKind::Dome
                | TileKind::Canteen
                | TileKind::Admin
                | TileKind::Hall
                | TileKind::Gym
                | TileKind::JapanCenter
                | TileKind::MainBuilding
                | TileKind::MainWing
                | TileKind::Fence
                | TileKind::GatePillar
                | TileKind::TunnelWall
                | TileKind::Construction
                | TileKind::Wall
                | TileKind::Bookshelf
                | TileKind::Table
                | TileKind::Counter
        )
    }
}

/// A rectangular grid of tiles plus the boolean collision grid derived from it
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: f32,
    tiles: Vec<TileKind>,
    solid: Vec<bool>,
}

impl TileGrid {
    /// Parse a grid from legend rows. Every row must have the same width.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], tile_size: f32) -> Result<Self, WorldError> {
        if tile_size <= 0.0 {
            return Err(WorldError::InvalidGrid(format!(
                "tile size must be positive, got {}",
                tile_size
            )));
        }
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidGrid("grid is empty".into()));
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let len = line.chars().count();
            if len != width {
                return Err(WorldError::InvalidGrid(format!(
                    "row {} has {} columns, expected {}",
                    row, len, width
                )));
            }
            for (col, code) in line.chars().enumerate() {
                let kind = TileKind::from_code(code)
                    .ok_or(WorldError::UnknownTile { code, row, col })?;
                tiles.push(kind);
            }
        }

        let solid = tiles.iter().map(TileKind::is_solid).collect();
        Ok(Self {
            width,
            height,
            tile_size,
            tiles,
            solid,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Map extent in pixels
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * self.tile_size,
            self.height as f32 * self.tile_size,
        )
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::at(Vec2::ZERO, self.pixel_size())
    }

    pub fn tile(&self, col: usize, row: usize) -> Option<TileKind> {
        if col < self.width && row < self.height {
            Some(self.tiles[row * self.width + col])
        } else {
            None
        }
    }

    /// Collision lookup by tile coordinate; anything outside the grid is solid
    pub fn is_solid_tile(&self, col: i64, row: i64) -> bool {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return true;
        }
        self.solid[row as usize * self.width + col as usize]
    }

    /// Whether `area` overlaps a solid tile or leaves the map
    pub fn is_area_blocked(&self, area: &Aabb) -> bool {
        let max = self.pixel_size();
        if area.x < 0.0 || area.y < 0.0 || area.x + area.w > max.x || area.y + area.h > max.y {
            return true;
        }

        let ts = self.tile_size;
        let col0 = (area.x / ts).floor() as i64;
        let row0 = (area.y / ts).floor() as i64;
        let col1 = (((area.x + area.w) / ts).ceil() as i64 - 1).max(col0);
        let row1 = (((area.y + area.h) / ts).ceil() as i64 - 1).max(row0);

        (row0..=row1).any(|row| (col0..=col1).any(|col| self.is_solid_tile(col, row)))
    }

    /// Tile kind under a pixel position
    pub fn tile_at(&self, p: Vec2) -> Option<TileKind> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        self.tile(
            (p.x / self.tile_size) as usize,
            (p.y / self.tile_size) as usize,
        )
    }
}
