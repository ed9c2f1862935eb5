//! Player controller module
//!
//! Top-down avatar movement with axis-separated collision.

mod controller;
mod movement;

pub use controller::PlayerController;
pub use movement::PlayerConfig;
