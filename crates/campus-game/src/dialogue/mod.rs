//! Dialogue: scripted lines and model-driven conversation

pub mod canned;
pub mod directive;
pub mod orchestrator;
pub mod scripted;

pub use directive::{parse_reply, Directive, ParsedReply};
pub use orchestrator::{
    ConversationView, DialogueConfig, DialogueOrchestrator, DialoguePhase, PendingAction,
};
pub use scripted::ScriptedDialogue;
