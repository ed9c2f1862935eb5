//! Campus Core - Core types and utilities for the campus runtime
//!
//! This crate provides the foundational types used throughout the game:
//! - Mathematical primitives (re-exported from glam)
//! - Axis-aligned boxes and facing directions in map-pixel space
//! - Tick-counted cooldowns and timers for the fixed-step loop
//! - The closed set of NPC action kinds

pub mod time;
pub mod types;

pub use glam::Vec2;
pub use time::{Cooldown, TickTimer, TICKS_PER_SECOND};
pub use types::{Aabb, ActionKind, Direction, Position};
