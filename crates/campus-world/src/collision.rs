//! Collision queries against a map's solid terrain

use campus_core::Aabb;
use tracing::warn;

use crate::error::CollisionError;
use crate::tile::TileGrid;

/// Answers whether a box overlaps solid terrain on one map.
///
/// Queries are read-only and are issued every tick, once per moving entity
/// per axis.
pub trait CollisionProvider {
    fn is_blocked(&self, area: Aabb) -> Result<bool, CollisionError>;
}

impl CollisionProvider for TileGrid {
    fn is_blocked(&self, area: Aabb) -> Result<bool, CollisionError> {
        Ok(self.is_area_blocked(&area))
    }
}

/// Query a provider, treating any fault as blocked
pub fn blocked_or_fail_closed(provider: &dyn CollisionProvider, area: Aabb) -> bool {
    match provider.is_blocked(area) {
        Ok(blocked) => blocked,
        Err(e) => {
            warn!("Collision query failed, treating as blocked: {}", e);
            true
        }
    }
}
