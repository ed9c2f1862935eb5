//! NPC system: archetype profiles, behaviour actors and the per-map directory

pub mod actor;
pub mod directory;

use campus_core::Vec2;
use campus_world::NpcArchetype;

pub use actor::{ActionScene, ExerciseTuning, NpcActor, NpcConfig, NpcState};
pub use directory::{DispatchRejection, NpcDirectory};

/// Unique identifier for an NPC instance on the loaded map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NpcId(pub u32);

/// Broad body plan, used by renderers to pick a sprite family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Human,
    Cat,
}

/// Static per-archetype data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeProfile {
    pub label: &'static str,
    pub species: Species,
    /// Primary palette colour
    pub color: [f32; 4],
    /// Sprite size in pixels
    pub size: Vec2,
    /// Walking speed in pixels per tick
    pub move_speed: f32,
}

const HUMAN_SIZE: Vec2 = Vec2::new(14.0, 16.0);
const NPC_SPEED: f32 = 1.5;

const fn human(label: &'static str, color: [f32; 4]) -> ArchetypeProfile {
    ArchetypeProfile {
        label,
        species: Species::Human,
        color,
        size: HUMAN_SIZE,
        move_speed: NPC_SPEED,
    }
}

const fn cat(label: &'static str, color: [f32; 4]) -> ArchetypeProfile {
    ArchetypeProfile {
        label,
        species: Species::Cat,
        color,
        size: HUMAN_SIZE,
        move_speed: NPC_SPEED,
    }
}

/// Indexed in `NpcArchetype::ALL` order
const PROFILES: [ArchetypeProfile; 7] = [
    human("Student", [0.16, 0.68, 1.0, 1.0]),        // blue shirt
    human("Student", [1.0, 0.47, 0.77, 1.0]),        // pink top
    human("Professor", [0.51, 0.46, 0.61, 1.0]),     // grey suit
    human("Staff", [1.0, 1.0, 1.0, 1.0]),            // white apron
    cat("Cat", [1.0, 0.64, 0.0, 1.0]),               // orange
    cat("Cat", [0.15, 0.15, 0.2, 1.0]),              // black
    cat("Cat", [0.93, 0.86, 0.75, 1.0]),             // calico
];

/// Profile lookup for an archetype
pub fn profile(archetype: NpcArchetype) -> &'static ArchetypeProfile {
    let index = NpcArchetype::ALL
        .iter()
        .position(|a| *a == archetype)
        .unwrap_or(0);
    &PROFILES[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_archetype_has_a_profile() {
        for archetype in NpcArchetype::ALL {
            let p = profile(archetype);
            assert!(p.size.x > 0.0 && p.size.y > 0.0);
            assert!(p.move_speed > 0.0);
        }
    }

    #[test]
    fn test_species_split() {
        assert_eq!(profile(NpcArchetype::Professor).species, Species::Human);
        assert_eq!(profile(NpcArchetype::CatCalico).species, Species::Cat);
        assert_eq!(profile(NpcArchetype::Staff).label, "Staff");
    }
}
