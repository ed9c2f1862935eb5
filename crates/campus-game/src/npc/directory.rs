//! NPC directory: owns every NPC on the loaded map

use std::collections::HashMap;

use campus_core::{Aabb, Position, Vec2};
use campus_world::{CollisionProvider, MapDefinition};
use rand::Rng;
use tracing::{debug, info};

use crate::dialogue::PendingAction;

use super::{ActionScene, NpcActor, NpcConfig, NpcId};

/// Why a pending action was not handed to an NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchRejection {
    /// No NPC with that name on this map
    UnknownNpc,
    /// The NPC was not created with this capability
    Incapable,
    /// The NPC is already doing something
    Busy,
}

/// Manages all NPC actors of the active map
#[derive(Debug)]
pub struct NpcDirectory {
    npcs: HashMap<NpcId, NpcActor>,
    next_id: u32,
}

impl Default for NpcDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl NpcDirectory {
    pub fn new() -> Self {
        Self {
            npcs: HashMap::new(),
            next_id: 1,
        }
    }

    fn next_npc_id(&mut self) -> NpcId {
        let id = NpcId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Replace the current NPCs with the ones defined for `map`
    pub fn load(&mut self, map: &MapDefinition, config: NpcConfig) {
        self.npcs.clear();
        for spawn in &map.npcs {
            let id = self.next_npc_id();
            self.npcs.insert(id, NpcActor::new(id, spawn.clone(), config));
        }
        info!("Loaded {} NPCs for {}", self.npcs.len(), map.id.name());
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    pub fn get(&self, id: NpcId) -> Option<&NpcActor> {
        self.npcs.get(&id)
    }

    pub fn get_mut(&mut self, id: NpcId) -> Option<&mut NpcActor> {
        self.npcs.get_mut(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&NpcActor> {
        self.npcs.values().find(|npc| npc.name() == name)
    }

    /// Iterate in id order
    pub fn iter(&self) -> impl Iterator<Item = &NpcActor> {
        let mut npcs: Vec<&NpcActor> = self.npcs.values().collect();
        npcs.sort_by_key(|npc| npc.id());
        npcs.into_iter()
    }

    /// Nearest NPC whose centre is within talking range of `player`.
    /// Ties go to the lower id.
    pub fn nearest_in_range(&self, player: &Aabb) -> Option<NpcId> {
        let center = player.center();
        self.iter()
            .filter(|npc| npc.in_interaction_range(player))
            .map(|npc| (npc.id(), npc.bounds().center().distance_squared(center)))
            .fold(None, |best: Option<(NpcId, f32)>, (id, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((id, d)),
            })
            .map(|(id, _)| id)
    }

    /// Advance every NPC one tick, in id order
    pub fn update_all<R: Rng + ?Sized>(
        &mut self,
        collision: &dyn CollisionProvider,
        scene: &ActionScene,
        rng: &mut R,
    ) {
        let mut ids: Vec<NpcId> = self.npcs.keys().copied().collect();
        ids.sort();
        for id in ids {
            if let Some(npc) = self.npcs.get_mut(&id) {
                npc.update(collision, scene, rng);
            }
        }
    }

    /// Hand a pending action to the NPC it names
    pub fn dispatch(
        &mut self,
        action: &PendingAction,
        target: Position,
        duration: u32,
        aim: Option<Vec2>,
    ) -> Result<NpcId, DispatchRejection> {
        let npc = self
            .npcs
            .values_mut()
            .find(|npc| npc.name() == action.target_npc)
            .ok_or(DispatchRejection::UnknownNpc)?;

        if !npc.can_perform(action.kind) {
            return Err(DispatchRejection::Incapable);
        }
        if !npc.start_action(action.kind, target, duration) {
            return Err(DispatchRejection::Busy);
        }
        if let Some(goal) = aim {
            npc.aim_at(goal);
        }
        debug!("Dispatched {} to {}", action.kind, action.target_npc);
        Ok(npc.id())
    }
}
