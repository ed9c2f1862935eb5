//! Campus Game - Game logic and systems
//!
//! Provides the player controller, NPC behaviour, the football pitch,
//! dialogue orchestration, input handling, and the world controller that
//! ties them together one tick at a time.

pub mod config;
pub mod dialogue;
pub mod input;
pub mod motion;
pub mod npc;
pub mod pitch;
pub mod player;
pub mod render;
pub mod world;

pub use config::GameConfig;
pub use dialogue::{
    parse_reply, ConversationView, DialogueConfig, DialogueOrchestrator, DialoguePhase, Directive,
    ParsedReply, PendingAction, ScriptedDialogue,
};
pub use input::{GamepadButton, InputAction, InputBinding, InputBindings, InputSampler, InputSnapshot};
pub use motion::{step_axis_separated, Body};
pub use npc::{
    ActionScene, ArchetypeProfile, DispatchRejection, ExerciseTuning, NpcActor, NpcConfig,
    NpcDirectory, NpcId, NpcState, Species,
};
pub use pitch::{Ball, Goal, GoalSide, Pitch};
pub use player::{PlayerConfig, PlayerController};
pub use render::{ModalView, NpcView, PlayerView, RenderModel};
pub use world::{Modal, WorldController};
