//! Per-NPC behaviour state machine
//!
//! `Idle -> MovingToTarget -> PerformingAction -> Returning -> Idle`, one step
//! per tick. Only an idle NPC accepts a new action, which is what makes busy
//! NPCs un-interruptible.

use campus_core::{Aabb, ActionKind, Direction, Position, TickTimer, Vec2};
use campus_world::{CollisionProvider, NpcArchetype, NpcSpawn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::motion::{step_axis_separated, Body};

use super::{profile, ArchetypeProfile, NpcId};

/// Behaviour state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NpcState {
    Idle,
    MovingToTarget,
    PerformingAction,
    Returning,
}

/// Ball-chasing heuristic constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseTuning {
    /// How far behind the ball (away from the goal) to line up
    pub approach_offset: f32,
    /// Within this distance of the line-up point, run at the ball
    pub approach_radius: f32,
    /// Keep the line-up point this far inside the field
    pub field_margin: f32,
}

impl Default for ExerciseTuning {
    fn default() -> Self {
        Self {
            approach_offset: 20.0,
            approach_radius: 18.0,
            field_margin: 20.0,
        }
    }
}

/// Tuning shared by every NPC on a map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    /// Distance at which a moving NPC has reached its target
    pub arrive_radius: f32,
    /// Distance at which a returning NPC snaps home
    pub home_radius: f32,
    /// Ticks between idle look-arounds
    pub idle_look_ticks: u32,
    pub hitbox_inset: f32,
    pub exercise: ExerciseTuning,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            arrive_radius: 10.0,
            home_radius: 5.0,
            idle_look_ticks: 180,
            hitbox_inset: 2.0,
            exercise: ExerciseTuning::default(),
        }
    }
}

/// Dynamic objects an action may react to this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActionScene {
    /// Ball centre, if a ball exists on this map
    pub ball: Option<Vec2>,
    /// Playable field rectangle
    pub field: Option<Aabb>,
}

/// One live NPC
#[derive(Debug, Clone)]
pub struct NpcActor {
    id: NpcId,
    spawn: NpcSpawn,
    profile: &'static ArchetypeProfile,
    config: NpcConfig,
    position: Position,
    facing: Direction,
    state: NpcState,
    home: Position,
    target: Option<Position>,
    action: Option<ActionKind>,
    /// Point the NPC kicks toward while performing
    aim: Option<Vec2>,
    elapsed: u32,
    duration: u32,
    idle_timer: TickTimer,
}

impl NpcActor {
    pub fn new(id: NpcId, spawn: NpcSpawn, config: NpcConfig) -> Self {
        Self {
            id,
            profile: profile(spawn.archetype),
            config,
            position: spawn.position,
            facing: spawn.facing,
            state: NpcState::Idle,
            home: spawn.position,
            target: None,
            action: None,
            aim: None,
            elapsed: 0,
            duration: 0,
            idle_timer: TickTimer::new(config.idle_look_ticks),
            spawn,
        }
    }

    pub fn id(&self) -> NpcId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.spawn.name
    }

    pub fn archetype(&self) -> NpcArchetype {
        self.spawn.archetype
    }

    pub fn profile(&self) -> &'static ArchetypeProfile {
        self.profile
    }

    /// Static record this actor was created from
    pub fn spawn(&self) -> &NpcSpawn {
        &self.spawn
    }

    pub fn persona(&self) -> Option<&str> {
        self.spawn.persona.as_deref()
    }

    pub fn capabilities(&self) -> &[ActionKind] {
        &self.spawn.capabilities
    }

    pub fn can_perform(&self, kind: ActionKind) -> bool {
        self.spawn.capabilities.contains(&kind)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn state(&self) -> NpcState {
        self.state
    }

    pub fn home(&self) -> Position {
        self.home
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    pub fn action(&self) -> Option<ActionKind> {
        self.action
    }

    pub fn aim(&self) -> Option<Vec2> {
        self.aim
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_busy(&self) -> bool {
        self.state != NpcState::Idle
    }

    fn body(&self) -> Body {
        Body::new(self.profile.size, self.config.hitbox_inset)
    }

    /// Full sprite box
    pub fn bounds(&self) -> Aabb {
        self.body().bounds(self.position)
    }

    /// Whether a player box is close enough to talk (centres within 24 px on both axes)
    pub fn in_interaction_range(&self, player: &Aabb) -> bool {
        let d = (self.bounds().center() - player.center()).abs();
        d.x < 24.0 && d.y < 24.0
    }

    /// Begin an action. Returns false, changing nothing, unless the NPC is idle.
    pub fn start_action(&mut self, kind: ActionKind, target: Position, duration: u32) -> bool {
        if self.state != NpcState::Idle {
            return false;
        }

        self.action = Some(kind);
        self.target = Some(target);
        self.duration = duration;
        self.elapsed = 0;
        self.aim = None;
        self.state = NpcState::MovingToTarget;
        info!("{} starts {} for {} ticks", self.spawn.name, kind, duration);
        true
    }

    /// Point kicks at `goal` for the rest of the current action
    pub fn aim_at(&mut self, goal: Vec2) {
        if self.is_busy() {
            self.aim = Some(goal);
        }
    }

    /// Cut the current action short. The NPC still walks through the
    /// remaining states in order and ends up home.
    pub fn cancel_action(&mut self) {
        if self.is_busy() {
            self.duration = self.elapsed;
        }
    }

    /// Advance the state machine one tick
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        collision: &dyn CollisionProvider,
        scene: &ActionScene,
        rng: &mut R,
    ) {
        match self.state {
            NpcState::Idle => {
                if self.idle_timer.tick() {
                    if let Some(dir) = Direction::ALL.choose(rng) {
                        self.facing = *dir;
                    }
                }
            }
            NpcState::MovingToTarget => {
                // The clock runs while walking so an unreachable target still ends
                self.elapsed += 1;
                let target = self.target.unwrap_or(self.home);
                self.move_towards(target, collision);

                if self.position.distance(target) < self.config.arrive_radius {
                    debug!("{} reached target", self.spawn.name);
                    self.state = NpcState::PerformingAction;
                    self.elapsed = 0;
                } else if self.elapsed >= self.duration {
                    debug!("{} gave up walking to target", self.spawn.name);
                    self.state = NpcState::PerformingAction;
                }
            }
            NpcState::PerformingAction => {
                self.elapsed += 1;
                if self.action == Some(ActionKind::Exercise) {
                    if let Some(ball) = scene.ball {
                        self.chase_ball(ball, scene.field, collision);
                    }
                }

                if self.elapsed >= self.duration {
                    debug!("{} finished action, returning", self.spawn.name);
                    self.state = NpcState::Returning;
                    self.aim = None;
                }
            }
            NpcState::Returning => {
                self.move_towards(self.home, collision);
                if self.position.distance(self.home) < self.config.home_radius {
                    self.position = self.home;
                    self.target = None;
                    self.action = None;
                    self.state = NpcState::Idle;
                    info!("{} is back home", self.spawn.name);
                }
            }
        }
    }

    /// Line up behind the ball relative to the aimed goal, then run through it
    fn chase_ball(&mut self, ball: Vec2, field: Option<Aabb>, collision: &dyn CollisionProvider) {
        let tuning = self.config.exercise;
        let Some(goal) = self.aim else {
            self.move_towards(ball, collision);
            return;
        };

        let away = ball - goal;
        if away.length() <= 0.0 {
            self.move_towards(ball, collision);
            return;
        }

        let mut approach = ball + away.normalize() * tuning.approach_offset;
        if let Some(field) = field {
            let lo = field.min() + Vec2::splat(tuning.field_margin);
            let hi = field.max() - Vec2::splat(tuning.field_margin);
            approach = approach.max(lo).min(hi);
        }

        if self.position.distance(approach) > tuning.approach_radius {
            self.move_towards(approach, collision);
        } else {
            self.move_towards(ball, collision);
        }
    }

    fn move_towards(&mut self, target: Position, collision: &dyn CollisionProvider) {
        let delta = target - self.position;
        let distance = delta.length();
        if distance <= 0.0 {
            return;
        }

        let step = delta / distance * self.profile.move_speed;
        self.position = step_axis_separated(collision, self.body(), self.position, step);
        if let Some(facing) = Direction::from_vector(delta) {
            self.facing = facing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_world::CollisionError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Open;

    impl CollisionProvider for Open {
        fn is_blocked(&self, _area: Aabb) -> Result<bool, CollisionError> {
            Ok(false)
        }
    }

    struct Stuck;

    impl CollisionProvider for Stuck {
        fn is_blocked(&self, _area: Aabb) -> Result<bool, CollisionError> {
            Ok(true)
        }
    }

    fn professor() -> NpcActor {
        let spawn = NpcSpawn {
            id: "prof".into(),
            name: "Prof".into(),
            archetype: NpcArchetype::Professor,
            position: Vec2::new(100.0, 100.0),
            facing: Direction::Down,
            dialogue_lines: vec!["Hello.".into()],
            persona: Some("A kind professor.".into()),
            capabilities: vec![ActionKind::Exercise],
        };
        NpcActor::new(NpcId(1), spawn, NpcConfig::default())
    }

    fn run_until_idle(npc: &mut NpcActor, collision: &dyn CollisionProvider, limit: u32) -> Vec<NpcState> {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = vec![npc.state()];
        for _ in 0..limit {
            npc.update(collision, &ActionScene::default(), &mut rng);
            if seen.last() != Some(&npc.state()) {
                seen.push(npc.state());
            }
            if npc.state() == NpcState::Idle {
                break;
            }
        }
        seen
    }

    #[test]
    fn test_start_action_only_when_idle() {
        let mut npc = professor();
        assert!(!npc.is_busy());
        assert!(npc.start_action(ActionKind::Exercise, Vec2::new(200.0, 100.0), 300));
        assert_eq!(npc.state(), NpcState::MovingToTarget);
        assert!(npc.is_busy());

        assert!(!npc.start_action(ActionKind::Exercise, Vec2::new(0.0, 0.0), 10));
        assert_eq!(npc.state(), NpcState::MovingToTarget);
        assert_eq!(npc.target(), Some(Vec2::new(200.0, 100.0)));
    }

    #[test]
    fn test_full_cycle_visits_every_state_in_order() {
        let mut npc = professor();
        npc.start_action(ActionKind::Exercise, Vec2::new(130.0, 100.0), 30);
        let states = run_until_idle(&mut npc, &Open, 1000);
        assert_eq!(
            states,
            vec![
                NpcState::MovingToTarget,
                NpcState::PerformingAction,
                NpcState::Returning,
                NpcState::Idle,
            ]
        );
        assert_eq!(npc.position(), npc.home());
        assert_eq!(npc.action(), None);
        assert_eq!(npc.target(), None);
    }

    #[test]
    fn test_stuck_npc_still_returns_to_idle() {
        let mut npc = professor();
        npc.start_action(ActionKind::Exercise, Vec2::new(400.0, 400.0), 50);
        let states = run_until_idle(&mut npc, &Stuck, 60);
        assert_eq!(npc.state(), NpcState::Idle);
        assert_eq!(
            states,
            vec![
                NpcState::MovingToTarget,
                NpcState::PerformingAction,
                NpcState::Returning,
                NpcState::Idle,
            ]
        );
        assert_eq!(npc.position(), npc.home());
    }

    #[test]
    fn test_performing_counts_from_arrival() {
        let mut npc = professor();
        let mut rng = StdRng::seed_from_u64(1);
        // Already within the arrival radius
        npc.start_action(ActionKind::Exercise, Vec2::new(105.0, 100.0), 5);
        npc.update(&Open, &ActionScene::default(), &mut rng);
        assert_eq!(npc.state(), NpcState::PerformingAction);
        assert_eq!(npc.elapsed(), 0);

        for _ in 0..4 {
            npc.update(&Open, &ActionScene::default(), &mut rng);
            assert_eq!(npc.state(), NpcState::PerformingAction);
        }
        npc.update(&Open, &ActionScene::default(), &mut rng);
        assert_eq!(npc.state(), NpcState::Returning);
    }

    #[test]
    fn test_home_never_moves() {
        let mut npc = professor();
        let home = npc.home();
        let mut rng = StdRng::seed_from_u64(3);
        npc.start_action(ActionKind::Exercise, Vec2::new(300.0, 300.0), 40);
        for _ in 0..40 {
            npc.update(&Open, &ActionScene::default(), &mut rng);
            assert_eq!(npc.home(), home);
        }
        assert_ne!(npc.position(), home);
    }

    #[test]
    fn test_exercise_lines_up_behind_ball() {
        let mut npc = professor();
        let mut rng = StdRng::seed_from_u64(5);
        let ball = Vec2::new(100.0, 100.0);
        npc.start_action(ActionKind::Exercise, ball, 300);
        npc.aim_at(Vec2::new(0.0, 100.0));
        // Arrive on the ball first
        npc.update(&Open, &ActionScene::default(), &mut rng);
        assert_eq!(npc.state(), NpcState::PerformingAction);

        // Goal is to the left, so the NPC heads to the right side of the ball
        let scene = ActionScene {
            ball: Some(ball),
            field: None,
        };
        npc.update(&Open, &scene, &mut rng);
        assert!(npc.position().x > 100.0);
        assert_eq!(npc.facing(), Direction::Right);
    }

    #[test]
    fn test_approach_point_clamped_to_field() {
        let mut npc = professor();
        let mut rng = StdRng::seed_from_u64(5);
        npc.start_action(ActionKind::Exercise, Vec2::new(100.0, 100.0), 300);
        npc.update(&Open, &ActionScene::default(), &mut rng);

        // Ball at the top edge with the goal below: the line-up point would be
        // above the field, the clamp pulls it back inside.
        npc.aim_at(Vec2::new(100.0, 200.0));
        let scene = ActionScene {
            ball: Some(Vec2::new(100.0, 60.0)),
            field: Some(Aabb::new(0.0, 50.0, 200.0, 150.0)),
        };
        let before = npc.position();
        npc.update(&Open, &scene, &mut rng);
        // Clamped point is (100, 70): straight up from (100, 100)
        assert_eq!(npc.position().x, before.x);
        assert!(npc.position().y < before.y);
    }

    #[test]
    fn test_cancel_walks_through_remaining_states() {
        let mut npc = professor();
        npc.start_action(ActionKind::Exercise, Vec2::new(300.0, 100.0), 600);
        let mut rng = StdRng::seed_from_u64(9);
        npc.update(&Open, &ActionScene::default(), &mut rng);
        npc.cancel_action();
        let states = run_until_idle(&mut npc, &Open, 1000);
        assert_eq!(
            states,
            vec![
                NpcState::MovingToTarget,
                NpcState::PerformingAction,
                NpcState::Returning,
                NpcState::Idle,
            ]
        );
    }

    #[test]
    fn test_idle_looks_around() {
        let mut npc = professor();
        let mut rng = StdRng::seed_from_u64(11);
        let mut facings = std::collections::HashSet::new();
        for _ in 0..(180 * 20) {
            npc.update(&Open, &ActionScene::default(), &mut rng);
            facings.insert(npc.facing());
        }
        assert!(facings.len() > 1);
        assert_eq!(npc.position(), npc.home());
        assert_eq!(npc.state(), NpcState::Idle);
    }

    #[test]
    fn test_interaction_range() {
        let npc = professor();
        // NPC centre is (107, 108)
        assert!(npc.in_interaction_range(&Aabb::new(110.0, 110.0, 12.0, 14.0)));
        assert!(!npc.in_interaction_range(&Aabb::new(130.0, 100.0, 12.0, 14.0)));
    }
}
