//! World controller: the per-tick arbiter of maps, player, NPCs and dialogue
//!
//! Each tick either feeds input to the open modal (menu, conversation or
//! something being read) with the world frozen, or steps the world: player
//! motion and pickups, NPCs and ball, portals, then interaction.

use campus_core::{ActionKind, Cooldown, Direction, Position, Vec2};
use campus_integration::ChatService;
use campus_world::{CollisionProvider, ItemKind, MapId, Readable, WorldAtlas};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::dialogue::{DialogueOrchestrator, PendingAction, ScriptedDialogue};
use crate::input::{InputAction, InputSnapshot};
use crate::npc::{ActionScene, NpcDirectory, NpcId};
use crate::pitch::Pitch;
use crate::player::PlayerController;
use crate::render::{ModalView, NpcView, PlayerView, RenderModel};

/// Which UI currently owns input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modal {
    None,
    Menu,
    AiConversation,
    ScriptedConversation,
    Reading,
}

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    ticks_left: u32,
}

/// Owns the authoritative game state
pub struct WorldController {
    atlas: WorldAtlas,
    config: GameConfig,
    current: MapId,
    player: PlayerController,
    /// Indexed by `MapId::index`
    cooldowns: Vec<Cooldown>,
    /// Indexed by `MapId::index`
    collision: Vec<Box<dyn CollisionProvider>>,
    npcs: NpcDirectory,
    pitch: Option<(MapId, Pitch)>,
    dialogue: DialogueOrchestrator,
    scripted: ScriptedDialogue,
    chat: Box<dyn ChatService>,
    rng: StdRng,
    menu_open: bool,
    /// NPC the model conversation (or its fallback) is with
    talking_to: Option<NpcId>,
    nearby: Option<NpcId>,
    /// Index into the current map's readables
    nearby_readable: Option<usize>,
    reading: Option<usize>,
    /// Per map, per item: already picked up
    collected: Vec<Vec<bool>>,
    notice: Option<Notice>,
    tick: u64,
}

impl WorldController {
    pub fn new(atlas: WorldAtlas, config: GameConfig, chat: Box<dyn ChatService>) -> Self {
        Self::with_rng(atlas, config, chat, StdRng::from_entropy())
    }

    /// Construct with a caller-supplied random source
    pub fn with_rng(
        atlas: WorldAtlas,
        config: GameConfig,
        chat: Box<dyn ChatService>,
        rng: StdRng,
    ) -> Self {
        let start = atlas.start();
        let collision: Vec<Box<dyn CollisionProvider>> = MapId::ALL
            .iter()
            .map(|id| Box::new(atlas.map(*id).grid.clone()) as Box<dyn CollisionProvider>)
            .collect();
        let pitch = atlas
            .maps()
            .find_map(|map| map.pitch.as_ref().map(|layout| (map.id, Pitch::new(layout))));

        let collected = MapId::ALL
            .iter()
            .map(|id| vec![false; atlas.map(*id).items.len()])
            .collect();

        let mut npcs = NpcDirectory::new();
        npcs.load(atlas.map(start.map), config.npc);

        info!("World starts on {}", start.map.name());
        Self {
            player: PlayerController::new(config.player, start.position, start.facing),
            current: start.map,
            cooldowns: vec![Cooldown::new(config.startup_cooldown); MapId::ALL.len()],
            collision,
            npcs,
            pitch,
            dialogue: DialogueOrchestrator::new(config.dialogue),
            scripted: ScriptedDialogue::new(),
            chat,
            rng,
            menu_open: false,
            talking_to: None,
            nearby: None,
            nearby_readable: None,
            reading: None,
            collected,
            notice: None,
            tick: 0,
            atlas,
            config,
        }
    }

    /// Swap the collision source of one map
    pub fn set_collision_provider(&mut self, map: MapId, provider: Box<dyn CollisionProvider>) {
        self.collision[map.index()] = provider;
    }

    pub fn atlas(&self) -> &WorldAtlas {
        &self.atlas
    }

    pub fn current_map(&self) -> MapId {
        self.current
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    /// Put the player somewhere on the current map
    pub fn place_player(&mut self, position: Position, facing: Direction) {
        self.player.teleport(position, facing);
    }

    /// Switch maps, arriving at `position`. The target's portals go on cooldown.
    pub fn enter_map(&mut self, map: MapId, position: Position, facing: Direction) {
        info!("{} -> {}", self.current.name(), map.name());
        self.current = map;
        self.player.teleport(position, facing);
        self.cooldowns[map.index()].reset(self.config.portal_cooldown);
        self.npcs.load(self.atlas.map(map), self.config.npc);
        self.nearby = None;
        self.nearby_readable = None;
    }

    pub fn npcs(&self) -> &NpcDirectory {
        &self.npcs
    }

    pub fn cooldown(&self, map: MapId) -> Cooldown {
        self.cooldowns[map.index()]
    }

    pub fn dialogue(&self) -> &DialogueOrchestrator {
        &self.dialogue
    }

    pub fn pitch(&self) -> Option<&Pitch> {
        self.pitch
            .as_ref()
            .filter(|(map, _)| *map == self.current)
            .map(|(_, pitch)| pitch)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn modal(&self) -> Modal {
        if self.menu_open {
            Modal::Menu
        } else if self.dialogue.is_active() {
            Modal::AiConversation
        } else if self.scripted.is_active() {
            Modal::ScriptedConversation
        } else if self.reading.is_some() {
            Modal::Reading
        } else {
            Modal::None
        }
    }

    /// Advance one frame
    pub fn tick(&mut self, input: &InputSnapshot) -> RenderModel {
        self.tick += 1;
        if let Some(notice) = self.notice.as_mut() {
            notice.ticks_left = notice.ticks_left.saturating_sub(1);
            if notice.ticks_left == 0 {
                self.notice = None;
            }
        }

        // Always polled so results of abandoned conversations are drained
        self.dialogue.update(self.chat.as_mut());

        if let Some(notice) = self.dialogue.take_failure() {
            self.fall_back_to_script(&notice);
        }

        if !self.dialogue.is_active() {
            if let Some(action) = self.dialogue.take_pending_action() {
                self.dispatch_action(action);
            }
            self.talking_to = None;
        }

        match self.modal() {
            Modal::Menu => self.handle_menu(input),
            Modal::AiConversation => self.handle_conversation(input),
            Modal::ScriptedConversation => self.handle_script(input),
            Modal::Reading => self.handle_reading(input),
            Modal::None => self.step_world(input),
        }

        self.render()
    }

    fn handle_menu(&mut self, input: &InputSnapshot) {
        if input.is_just_pressed(InputAction::Menu) || input.is_just_pressed(InputAction::Cancel) {
            self.menu_open = false;
        }
    }

    fn handle_conversation(&mut self, input: &InputSnapshot) {
        if input.is_just_pressed(InputAction::ExitConversation) {
            self.dialogue.end_dialogue();
            return;
        }

        if !input.text.is_empty() {
            self.dialogue.push_text(&input.text);
        }
        if input.is_just_pressed(InputAction::Erase) {
            self.dialogue.delete_char();
        }
        if input.is_just_pressed(InputAction::Submit) && !self.dialogue.submit_draft(self.chat.as_mut()) {
            self.dialogue.skip_reveal();
        }
    }

    fn handle_script(&mut self, input: &InputSnapshot) {
        if input.is_just_pressed(InputAction::Cancel) {
            self.scripted.end();
        } else if input.is_just_pressed(InputAction::Confirm) || input.is_just_pressed(InputAction::Interact) {
            self.scripted.advance();
        }
    }

    fn handle_reading(&mut self, input: &InputSnapshot) {
        if [InputAction::Confirm, InputAction::Cancel, InputAction::Interact]
            .into_iter()
            .any(|action| input.is_just_pressed(action))
        {
            self.reading = None;
        }
    }

    fn step_world(&mut self, input: &InputSnapshot) {
        for cooldown in &mut self.cooldowns {
            cooldown.tick();
        }

        if input.is_just_pressed(InputAction::ToggleSpecialMode) {
            if self.player.toggle_special_mode() {
                info!("Skateboard {}", if self.player.special_mode() { "on" } else { "off" });
            } else {
                debug!("No skateboard yet");
            }
        }

        let index = self.current.index();
        let bounds = self.atlas.map(self.current).bounds();
        self.player.update(input.movement, self.collision[index].as_ref(), bounds);
        self.collect_items();

        let scene = match self.pitch() {
            Some(pitch) => ActionScene {
                ball: Some(pitch.ball.position),
                field: Some(pitch.field()),
            },
            None => ActionScene::default(),
        };
        self.npcs.update_all(self.collision[index].as_ref(), &scene, &mut self.rng);
        self.update_pitch();

        if self.try_portal(input.movement) {
            return;
        }

        self.nearby = self.npcs.nearest_in_range(&self.player.bounds());
        self.nearby_readable = self.readable_in_reach();
        if input.is_just_pressed(InputAction::Interact) {
            if let Some(id) = self.nearby {
                self.interact(id);
                return;
            }
            if let Some(index) = self.nearby_readable {
                debug!("Reading {}", self.readables()[index].title);
                self.reading = Some(index);
                return;
            }
        }
        if input.is_just_pressed(InputAction::Menu) {
            self.menu_open = true;
        }
    }

    fn readables(&self) -> &[Readable] {
        &self.atlas.map(self.current).readables
    }

    /// Closest readable whose reach holds the player's centre
    fn readable_in_reach(&self) -> Option<usize> {
        let centre = self.player.bounds().center();
        self.readables()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.reach.contains_point(centre))
            .min_by(|(_, a), (_, b)| {
                let da = a.reach.center().distance_squared(centre);
                let db = b.reach.center().distance_squared(centre);
                da.total_cmp(&db)
            })
            .map(|(index, _)| index)
    }

    fn collect_items(&mut self) {
        let body = self.player.bounds();
        let items = &self.atlas.map(self.current).items;
        let collected = &mut self.collected[self.current.index()];
        for (item, taken) in items.iter().zip(collected.iter_mut()) {
            if *taken || !item.area.intersects(&body) {
                continue;
            }
            *taken = true;
            match item.kind {
                ItemKind::Skateboard => {
                    self.player.give_skateboard();
                }
            }
            info!("Picked up {} on {}", item.kind.name(), self.current.name());
            self.notice = Some(Notice {
                text: item.kind.pickup_message().to_string(),
                ticks_left: self.config.notice_ticks,
            });
        }
    }

    fn update_pitch(&mut self) {
        let Some((map, pitch)) = self.pitch.as_mut() else {
            return;
        };
        if *map != self.current {
            return;
        }

        let mut kickers = Vec::with_capacity(self.npcs.len() + 1);
        kickers.push((self.player.bounds(), None));
        kickers.extend(self.npcs.iter().map(|npc| (npc.bounds(), npc.aim())));

        if let Some(side) = pitch.tick(&kickers) {
            self.notice = Some(Notice {
                text: format!("GOAL! The {} goal scores!", side.name()),
                ticks_left: self.config.notice_ticks,
            });
        }
    }

    /// Take a portal if one qualifies. Returns whether the map changed.
    fn try_portal(&mut self, intent: Vec2) -> bool {
        if intent == Vec2::ZERO || !self.cooldowns[self.current.index()].is_ready() {
            return false;
        }

        let body = self.player.bounds();
        let facing = self.player.facing();
        let Some(portal) = self
            .atlas
            .map(self.current)
            .portals
            .iter()
            .find(|p| {
                p.trigger.intersects(&body)
                    && p.required_facing == facing
                    && p.required_facing.matches_intent(intent)
            })
            .cloned()
        else {
            return false;
        };

        self.enter_map(portal.target_map, portal.target_spawn, portal.target_facing);
        true
    }

    fn interact(&mut self, id: NpcId) {
        let Some(npc) = self.npcs.get(id) else {
            return;
        };
        if npc.is_busy() {
            debug!("{} is busy", npc.name());
            return;
        }

        let name = npc.name().to_string();
        if self.chat.is_available() {
            if let Some(persona) = npc.persona() {
                let persona = persona.to_string();
                let capabilities = npc.capabilities().to_vec();
                if self.dialogue.start_dialogue(&name, &persona, &capabilities, &mut self.rng) {
                    self.talking_to = Some(id);
                }
                return;
            }
        }

        self.scripted.start(&name, &npc.spawn().dialogue_lines);
    }

    fn fall_back_to_script(&mut self, notice: &str) {
        self.dialogue.discard_pending_action();
        let npc = self.talking_to.take().and_then(|id| self.npcs.get(id));
        match npc {
            Some(npc) => self
                .scripted
                .start_with_notice(npc.name(), notice, &npc.spawn().dialogue_lines),
            None => self.scripted.start("", &[notice.to_string()]),
        }
        self.notice = Some(Notice {
            text: notice.to_string(),
            ticks_left: self.config.notice_ticks,
        });
    }

    fn dispatch_action(&mut self, action: PendingAction) {
        match action.kind {
            ActionKind::Exercise => {
                let Some((map, pitch)) = self.pitch.as_ref() else {
                    debug!("No pitch for {}", action.target_npc);
                    return;
                };
                if *map != self.current {
                    debug!("No pitch on {} for {}", self.current.name(), action.target_npc);
                    return;
                }

                let target = pitch.ball.position;
                let aim = pitch.random_goal(&mut self.rng);
                match self.npcs.dispatch(&action, target, self.config.exercise_duration, Some(aim)) {
                    Ok(_) => info!("{} heads to the pitch", action.target_npc),
                    Err(reason) => debug!("Dropped {} for {}: {:?}", action.kind, action.target_npc, reason),
                }
            }
        }
    }

    fn render(&self) -> RenderModel {
        let modal = match self.modal() {
            Modal::None => ModalView::None,
            Modal::Menu => ModalView::Menu,
            Modal::AiConversation => match self.dialogue.view() {
                Some(view) => ModalView::AiConversation(view),
                None => ModalView::None,
            },
            Modal::ScriptedConversation => ModalView::Scripted {
                speaker: self.scripted.speaker().unwrap_or_default().to_string(),
                line: self.scripted.current_line().unwrap_or_default().to_string(),
            },
            Modal::Reading => match self.reading.and_then(|i| self.readables().get(i)) {
                Some(readable) => ModalView::Reading {
                    title: readable.title.clone(),
                    lines: readable.lines.clone(),
                },
                None => ModalView::None,
            },
        };

        let pitch = self.pitch();
        RenderModel {
            tick: self.tick,
            map: self.current,
            player: PlayerView {
                position: self.player.position(),
                facing: self.player.facing(),
                special_mode: self.player.special_mode(),
                has_skateboard: self.player.has_skateboard(),
            },
            npcs: self
                .npcs
                .iter()
                .map(|npc| NpcView {
                    name: npc.name().to_string(),
                    archetype: npc.archetype(),
                    position: npc.position(),
                    facing: npc.facing(),
                    state: npc.state(),
                })
                .collect(),
            items: self
                .atlas
                .map(self.current)
                .items
                .iter()
                .zip(&self.collected[self.current.index()])
                .filter(|(_, taken)| !**taken)
                .map(|(item, _)| *item)
                .collect(),
            ball: pitch.map(|p| p.ball.position),
            score: pitch.map(Pitch::score),
            modal,
            nearby_npc: self
                .nearby
                .and_then(|id| self.npcs.get(id))
                .map(|npc| npc.name().to_string()),
            nearby_readable: self
                .nearby_readable
                .and_then(|i| self.readables().get(i))
                .map(|r| r.title.clone()),
            notice: self.notice.as_ref().map(|n| n.text.clone()),
            ai_online: self.chat.is_available(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use campus_core::Aabb;
    use campus_integration::{ChatFailure, ChatMessage, ChatOutcome, IntegrationError};
    use campus_world::{
        builtin_atlas, CollisionError, MapDefinition, Portal, SpawnPoint, TileGrid,
    };

    use crate::dialogue::canned::FALLBACK_NOTICE;
    use crate::npc::NpcState;

    #[derive(Default)]
    struct ChatState {
        available: bool,
        in_flight: bool,
        ready: VecDeque<ChatOutcome>,
        sent: usize,
    }

    /// Chat service whose answers the test releases by hand
    #[derive(Clone, Default)]
    struct FakeChat(Rc<RefCell<ChatState>>);

    impl FakeChat {
        fn online() -> Self {
            let fake = Self::default();
            fake.0.borrow_mut().available = true;
            fake
        }

        fn resolve(&self, outcome: ChatOutcome) {
            self.0.borrow_mut().ready.push_back(outcome);
        }
    }

    impl ChatService for FakeChat {
        fn is_available(&self) -> bool {
            self.0.borrow().available
        }

        fn is_in_flight(&self) -> bool {
            self.0.borrow().in_flight
        }

        fn chat_async(&mut self, _messages: Vec<ChatMessage>) -> Result<(), IntegrationError> {
            let mut state = self.0.borrow_mut();
            if state.in_flight {
                return Err(IntegrationError::Busy);
            }
            state.in_flight = true;
            state.sent += 1;
            if !state.available {
                state.ready.push_back(Err(ChatFailure::Unavailable));
            }
            Ok(())
        }

        fn poll_result(&mut self) -> Option<ChatOutcome> {
            let mut state = self.0.borrow_mut();
            if !state.in_flight {
                return None;
            }
            let outcome = state.ready.pop_front()?;
            state.in_flight = false;
            Some(outcome)
        }
    }

    struct Broken;

    impl CollisionProvider for Broken {
        fn is_blocked(&self, _area: Aabb) -> Result<bool, CollisionError> {
            Err(CollisionError::Query("disk on fire".into()))
        }
    }

    fn config(startup_cooldown: u32) -> GameConfig {
        GameConfig {
            startup_cooldown,
            ..GameConfig::default()
        }
    }

    fn world_with(chat: FakeChat, startup_cooldown: u32) -> WorldController {
        WorldController::with_rng(
            builtin_atlas().unwrap(),
            config(startup_cooldown),
            Box::new(chat),
            StdRng::seed_from_u64(17),
        )
    }

    fn down() -> InputSnapshot {
        InputSnapshot::idle().with_movement(Vec2::new(0.0, 1.0))
    }

    fn press(action: InputAction) -> InputSnapshot {
        InputSnapshot::idle().pressing(action)
    }

    /// Stand next to an NPC
    fn approach(world: &mut WorldController, name: &str) {
        let npc = world.npcs().by_name(name).unwrap();
        let spot = npc.position() + Vec2::new(2.0, 2.0);
        world.place_player(spot, Direction::Up);
        world.tick(&InputSnapshot::idle());
    }

    /// Two tiny open maps whose portals cover the whole map and point at each other
    fn ping_pong_atlas() -> WorldAtlas {
        let rows = vec!["........"; 8];
        let map = |id: MapId, target: MapId| MapDefinition {
            id,
            grid: TileGrid::from_rows(&rows[..], 16.0).unwrap(),
            portals: vec![Portal {
                trigger: Aabb::new(0.0, 0.0, 128.0, 128.0),
                required_facing: Direction::Down,
                target_map: target,
                target_spawn: Vec2::new(50.0, 50.0),
                target_facing: Direction::Down,
            }],
            npcs: Vec::new(),
            pitch: None,
            readables: Vec::new(),
            items: Vec::new(),
        };
        WorldAtlas::new(
            vec![
                map(MapId::Campus, MapId::Tunnel),
                map(MapId::Tunnel, MapId::Campus),
                map(MapId::Library, MapId::Campus),
                map(MapId::InteriorRoom, MapId::Campus),
            ],
            SpawnPoint {
                map: MapId::Campus,
                position: Vec2::new(50.0, 50.0),
                facing: Direction::Down,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_starts_on_campus_with_startup_cooldown() {
        let world = world_with(FakeChat::default(), 120);
        assert_eq!(world.current_map(), MapId::Campus);
        assert_eq!(world.player().position(), Vec2::new(256.0, 544.0));
        for id in MapId::ALL {
            assert_eq!(world.cooldown(id).remaining(), 120);
        }
        assert!(world.pitch().is_some());
    }

    #[test]
    fn test_gate_portal_transition() {
        let mut world = world_with(FakeChat::default(), 120);
        for _ in 0..120 {
            world.tick(&InputSnapshot::idle());
        }
        assert!(world.cooldown(MapId::Campus).is_ready());

        world.place_player(Vec2::new(250.0, 612.0), Direction::Down);

        let model = world.tick(&down());
        assert_eq!(model.map, MapId::Tunnel);
        assert_eq!(world.player().position(), Vec2::new(154.0, 48.0));
        assert_eq!(world.player().facing(), Direction::Down);
        assert_eq!(world.cooldown(MapId::Tunnel).remaining(), 60);
        assert!(model.ball.is_none());

        let model = world.tick(&down());
        assert_eq!(model.map, MapId::Tunnel);
    }

    #[test]
    fn test_portal_needs_matching_intent() {
        let mut world = world_with(FakeChat::default(), 0);
        world.place_player(Vec2::new(250.0, 620.0), Direction::Down);

        world.tick(&InputSnapshot::idle());
        assert_eq!(world.current_map(), MapId::Campus);

        world.tick(&InputSnapshot::idle().with_movement(Vec2::new(1.0, 0.0)));
        assert_eq!(world.current_map(), MapId::Campus);
    }

    #[test]
    fn test_sideways_stick_on_gate_keeps_player_on_campus() {
        let mut world = world_with(FakeChat::default(), 0);
        world.place_player(Vec2::new(250.0, 612.0), Direction::Down);

        world.tick(&InputSnapshot::idle().with_movement(Vec2::new(0.95, 0.3)));
        assert_eq!(world.player().facing(), Direction::Right);
        assert_eq!(world.current_map(), MapId::Campus);

        world.tick(&InputSnapshot::idle().with_movement(Vec2::new(0.3, 0.95)));
        assert_eq!(world.current_map(), MapId::Tunnel);
    }

    #[test]
    fn test_startup_cooldown_blocks_portals() {
        let mut world = world_with(FakeChat::default(), 120);
        world.place_player(Vec2::new(250.0, 620.0), Direction::Down);
        for _ in 0..100 {
            world.tick(&down());
        }
        assert_eq!(world.current_map(), MapId::Campus);
    }

    #[test]
    fn test_transitions_are_idempotent_within_cooldown() {
        let mut world = WorldController::with_rng(
            ping_pong_atlas(),
            config(0),
            Box::new(FakeChat::default()),
            StdRng::seed_from_u64(1),
        );

        let mut transitions = 0;
        let mut map = world.current_map();
        for _ in 0..60 {
            world.tick(&down());
            if world.current_map() != map {
                transitions += 1;
                map = world.current_map();
            }
        }
        assert_eq!(transitions, 1);
        assert_eq!(world.current_map(), MapId::Tunnel);

        world.tick(&down());
        assert_eq!(world.current_map(), MapId::Campus);
    }

    #[test]
    fn test_faulty_collision_freezes_player() {
        let mut world = world_with(FakeChat::default(), 120);
        world.set_collision_provider(MapId::Campus, Box::new(Broken));
        let start = world.player().position();
        world.tick(&InputSnapshot::idle().with_movement(Vec2::new(1.0, -1.0)));
        assert_eq!(world.player().position(), start);
    }

    #[test]
    fn test_scripted_conversation_when_offline() {
        let mut world = world_with(FakeChat::default(), 120);
        approach(&mut world, "Tanaka");
        assert_eq!(world.render().nearby_npc.as_deref(), Some("Tanaka"));

        let model = world.tick(&press(InputAction::Interact));
        let ModalView::Scripted { speaker, line } = model.modal else {
            panic!("expected a scripted conversation");
        };
        assert_eq!(speaker, "Tanaka");
        assert_eq!(line, world.npcs().by_name("Tanaka").unwrap().spawn().dialogue_lines[0]);

        // World is frozen while talking
        let before = world.player().position();
        world.tick(&InputSnapshot::idle().with_movement(Vec2::new(1.0, 0.0)));
        assert_eq!(world.player().position(), before);

        world.tick(&press(InputAction::Cancel));
        assert_eq!(world.modal(), Modal::None);
    }

    #[test]
    fn test_ai_conversation_dispatches_exercise_after_close() {
        let chat = FakeChat::online();
        let mut world = world_with(chat.clone(), 120);
        approach(&mut world, "Professor Wang");

        world.tick(&press(InputAction::Interact));
        assert_eq!(world.modal(), Modal::AiConversation);

        world.tick(&InputSnapshot::idle().typing("let's play"));
        world.tick(&press(InputAction::Submit));
        assert_eq!(chat.0.borrow().sent, 1);
        assert!(world.dialogue().view().unwrap().thinking);

        chat.resolve(Ok("Sure! [ACTION:Exercise]".into()));
        world.tick(&InputSnapshot::idle());
        assert_eq!(world.dialogue().history().len(), 2);

        // Nothing moves until the conversation closes
        let prof = world.npcs().by_name("Professor Wang").unwrap();
        assert_eq!(prof.state(), NpcState::Idle);

        world.tick(&press(InputAction::ExitConversation));
        assert_eq!(world.modal(), Modal::None);
        world.tick(&InputSnapshot::idle());

        let prof = world.npcs().by_name("Professor Wang").unwrap();
        assert!(prof.is_busy());
        assert_eq!(prof.action(), Some(ActionKind::Exercise));
        assert!(prof.aim().is_some());

        // A busy NPC cannot be engaged again
        approach(&mut world, "Professor Wang");
        world.tick(&press(InputAction::Interact));
        assert_eq!(world.modal(), Modal::None);
    }

    #[test]
    fn test_npc_without_capability_ignores_directive() {
        let chat = FakeChat::online();
        let mut world = world_with(chat.clone(), 120);
        approach(&mut world, "Xiao Ming");
        world.tick(&press(InputAction::Interact));
        world.tick(&InputSnapshot::idle().typing("play?"));
        world.tick(&press(InputAction::Submit));
        chat.resolve(Ok("Sure! [ACTION:Exercise]".into()));
        world.tick(&InputSnapshot::idle());
        world.tick(&press(InputAction::ExitConversation));
        world.tick(&InputSnapshot::idle());

        assert!(!world.npcs().by_name("Xiao Ming").unwrap().is_busy());
    }

    #[test]
    fn test_failure_falls_back_to_scripted_lines() {
        let chat = FakeChat::online();
        let mut world = world_with(chat.clone(), 120);
        approach(&mut world, "Teacher Li");
        world.tick(&press(InputAction::Interact));
        world.tick(&InputSnapshot::idle().typing("hello"));
        world.tick(&press(InputAction::Submit));

        chat.resolve(Err(ChatFailure::Error("connection refused".into())));
        let model = world.tick(&InputSnapshot::idle());

        let ModalView::Scripted { speaker, line } = model.modal else {
            panic!("expected the scripted fallback");
        };
        assert_eq!(speaker, "Teacher Li");
        assert_eq!(line, FALLBACK_NOTICE);
        assert_eq!(model.notice.as_deref(), Some(FALLBACK_NOTICE));

        world.tick(&press(InputAction::Confirm));
        let lines = &world.npcs().by_name("Teacher Li").unwrap().spawn().dialogue_lines;
        assert_eq!(
            world.render().modal,
            ModalView::Scripted {
                speaker: "Teacher Li".into(),
                line: lines[0].clone(),
            }
        );
    }

    #[test]
    fn test_menu_opens_and_closes() {
        let mut world = world_with(FakeChat::default(), 120);
        world.place_player(Vec2::new(100.0, 600.0), Direction::Down);
        world.tick(&press(InputAction::Menu));
        assert_eq!(world.modal(), Modal::Menu);
        let before = world.player().position();
        world.tick(&down());
        assert_eq!(world.player().position(), before);
        world.tick(&press(InputAction::Cancel));
        assert_eq!(world.modal(), Modal::None);
    }

    #[test]
    fn test_skateboard_pickup_unlocks_special_mode() {
        let mut world = world_with(FakeChat::default(), 120);
        let model = world.tick(&press(InputAction::ToggleSpecialMode));
        assert!(!model.player.special_mode);
        assert!(!model.player.has_skateboard);
        assert_eq!(model.items.len(), 1);

        world.place_player(Vec2::new(388.0, 324.0), Direction::Down);
        let model = world.tick(&InputSnapshot::idle());
        assert!(model.player.has_skateboard);
        assert!(model.items.is_empty());
        assert_eq!(model.notice.as_deref(), Some(ItemKind::Skateboard.pickup_message()));

        let model = world.tick(&press(InputAction::ToggleSpecialMode));
        assert!(model.player.special_mode);
        let model = world.tick(&press(InputAction::ToggleSpecialMode));
        assert!(!model.player.special_mode);

        // Gone for good, even after leaving and coming back
        world.enter_map(MapId::Tunnel, Vec2::new(154.0, 48.0), Direction::Down);
        world.enter_map(MapId::Campus, Vec2::new(388.0, 324.0), Direction::Down);
        assert!(world.tick(&InputSnapshot::idle()).items.is_empty());
    }

    #[test]
    fn test_library_shelf_opens_and_closes() {
        let mut world = world_with(FakeChat::default(), 120);
        world.enter_map(MapId::Library, Vec2::new(18.0, 50.0), Direction::Up);

        let model = world.tick(&InputSnapshot::idle());
        assert_eq!(model.nearby_readable.as_deref(), Some("Arabic shelf"));

        let model = world.tick(&press(InputAction::Interact));
        let ModalView::Reading { title, lines } = model.modal else {
            panic!("expected the shelf to open");
        };
        assert_eq!(title, "Arabic shelf");
        assert_eq!(lines[0], "One Thousand and One Nights");
        assert_eq!(world.modal(), Modal::Reading);

        let before = world.player().position();
        world.tick(&down());
        assert_eq!(world.player().position(), before);

        world.tick(&press(InputAction::Confirm));
        assert_eq!(world.modal(), Modal::None);

        world.tick(&press(InputAction::Interact));
        world.tick(&press(InputAction::Cancel));
        assert_eq!(world.modal(), Modal::None);
    }

    #[test]
    fn test_nothing_to_read_in_open_floor() {
        let mut world = world_with(FakeChat::default(), 120);
        world.enter_map(MapId::Library, Vec2::new(112.0, 64.0), Direction::Up);
        let model = world.tick(&press(InputAction::Interact));
        assert_eq!(model.nearby_readable, None);
        assert_eq!(model.modal, ModalView::None);
    }

    #[test]
    fn test_tunnel_sign_is_readable() {
        let mut world = world_with(FakeChat::default(), 120);
        world.enter_map(MapId::Tunnel, Vec2::new(154.0, 400.0), Direction::Down);

        let model = world.tick(&press(InputAction::Interact));
        let ModalView::Reading { title, lines } = model.modal else {
            panic!("expected the sign to open");
        };
        assert_eq!(title, "Sign");
        assert!(lines[0].contains("under construction"));

        world.tick(&press(InputAction::Interact));
        assert_eq!(world.modal(), Modal::None);
    }
}
