//! Campus Integration - chat completion client
//!
//! Wraps a single outstanding HTTP chat-completion call in a background
//! runtime and exposes it to the frame loop as fire-then-poll.

pub mod chat;
pub mod client;
pub mod error;
pub mod types;

pub use client::{ChatService, DialogueClient, PendingRequest};
pub use error::IntegrationError;
pub use types::*;
