//! Input system with action-based mapping
//!
//! Unifies keyboard and virtual-gamepad sources into one per-frame
//! [`InputSnapshot`]: a continuous movement intent plus edge-triggered
//! semantic actions and any text typed this frame.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Move up (W / Up arrow)
    MoveUp,
    /// Move down (S / Down arrow)
    MoveDown,
    /// Move left (A / Left arrow)
    MoveLeft,
    /// Move right (D / Right arrow)
    MoveRight,
    /// Confirm / advance (Enter, Space, Z, pad A)
    Confirm,
    /// Cancel / back (Escape, X, pad B)
    Cancel,
    /// Talk to whoever is nearby (Space, Enter, Z, pad A)
    Interact,
    /// Open the menu (M, pad Start)
    Menu,
    /// Toggle skateboard mode (B, pad X)
    ToggleSpecialMode,
    /// Send the typed message (Enter)
    Submit,
    /// Delete the last typed character (Backspace)
    Erase,
    /// Leave a typed conversation (Tab, Escape)
    ExitConversation,
}

/// Buttons on the virtual gamepad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamepadButton {
    A,
    B,
    X,
    Start,
}

/// A physical source that can trigger actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputBinding {
    /// Keyboard key
    Key(KeyCode),
    /// Virtual gamepad button
    Pad(GamepadButton),
}

impl From<KeyCode> for InputBinding {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

impl From<GamepadButton> for InputBinding {
    fn from(button: GamepadButton) -> Self {
        Self::Pad(button)
    }
}

/// Maps physical inputs to game actions. One input may drive several actions.
#[derive(Debug, Clone)]
pub struct InputBindings {
    bindings: HashMap<InputBinding, Vec<InputAction>>,
    /// Reverse lookup: action to all bindings
    reverse: HashMap<InputAction, Vec<InputBinding>>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
            reverse: HashMap::new(),
        };

        // Default WASD bindings
        bindings.bind(KeyCode::KeyW, InputAction::MoveUp);
        bindings.bind(KeyCode::KeyS, InputAction::MoveDown);
        bindings.bind(KeyCode::KeyA, InputAction::MoveLeft);
        bindings.bind(KeyCode::KeyD, InputAction::MoveRight);

        // Arrow keys as alternative
        bindings.bind(KeyCode::ArrowUp, InputAction::MoveUp);
        bindings.bind(KeyCode::ArrowDown, InputAction::MoveDown);
        bindings.bind(KeyCode::ArrowLeft, InputAction::MoveLeft);
        bindings.bind(KeyCode::ArrowRight, InputAction::MoveRight);

        for key in [KeyCode::Enter, KeyCode::Space, KeyCode::KeyZ] {
            bindings.bind(key, InputAction::Confirm);
            bindings.bind(key, InputAction::Interact);
        }
        bindings.bind(KeyCode::Escape, InputAction::Cancel);
        bindings.bind(KeyCode::KeyX, InputAction::Cancel);
        bindings.bind(KeyCode::KeyM, InputAction::Menu);
        bindings.bind(KeyCode::KeyB, InputAction::ToggleSpecialMode);

        // Text entry
        bindings.bind(KeyCode::Enter, InputAction::Submit);
        bindings.bind(KeyCode::NumpadEnter, InputAction::Submit);
        bindings.bind(KeyCode::Backspace, InputAction::Erase);
        bindings.bind(KeyCode::Tab, InputAction::ExitConversation);
        bindings.bind(KeyCode::Escape, InputAction::ExitConversation);

        // Virtual gamepad
        bindings.bind(GamepadButton::A, InputAction::Confirm);
        bindings.bind(GamepadButton::A, InputAction::Interact);
        bindings.bind(GamepadButton::B, InputAction::Cancel);
        bindings.bind(GamepadButton::B, InputAction::ExitConversation);
        bindings.bind(GamepadButton::X, InputAction::ToggleSpecialMode);
        bindings.bind(GamepadButton::Start, InputAction::Menu);

        bindings
    }
}

impl InputBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key or button to an additional action
    pub fn bind(&mut self, binding: impl Into<InputBinding>, action: InputAction) {
        let binding = binding.into();
        let actions = self.bindings.entry(binding).or_default();
        if !actions.contains(&action) {
            actions.push(action);
            self.reverse.entry(action).or_default().push(binding);
        }
    }

    /// Remove every action from a key or button
    pub fn unbind(&mut self, binding: impl Into<InputBinding>) {
        let binding = binding.into();
        if let Some(actions) = self.bindings.remove(&binding) {
            for action in actions {
                if let Some(bindings) = self.reverse.get_mut(&action) {
                    bindings.retain(|b| *b != binding);
                }
            }
        }
    }

    /// Actions driven by a binding
    pub fn actions(&self, binding: &InputBinding) -> &[InputAction] {
        self.bindings.get(binding).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every binding that drives an action
    pub fn bindings_for(&self, action: InputAction) -> &[InputBinding] {
        self.reverse.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Everything the game loop needs from input for one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Continuous movement intent, length at most 1
    pub movement: Vec2,
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that went down this frame
    pub just_pressed: HashSet<InputAction>,
    /// Printable text typed this frame
    pub text: String,
}

impl InputSnapshot {
    /// No input at all
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Builder: set the movement intent
    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement = movement;
        self
    }

    /// Builder: press an action this frame
    pub fn pressing(mut self, action: InputAction) -> Self {
        self.held.insert(action);
        self.just_pressed.insert(action);
        self
    }

    /// Builder: type text this frame
    pub fn typing(mut self, text: &str) -> Self {
        self.text.push_str(text);
        self
    }
}

/// Processes raw keyboard/gamepad events into per-frame snapshots
#[derive(Debug)]
pub struct InputSampler {
    pub bindings: InputBindings,
    /// Analog stick components below this magnitude read as zero
    pub deadzone: f32,
    held_bindings: HashSet<InputBinding>,
    held: HashSet<InputAction>,
    just_pressed: HashSet<InputAction>,
    stick: Vec2,
    text: String,
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSampler {
    pub fn new() -> Self {
        Self {
            bindings: InputBindings::default(),
            deadzone: 0.2,
            held_bindings: HashSet::new(),
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            stick: Vec2::ZERO,
            text: String::new(),
        }
    }

    /// Handle a keyboard event
    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, element_state: ElementState) {
        if let PhysicalKey::Code(key_code) = physical_key {
            self.handle_binding(InputBinding::Key(key_code), element_state);
        }
    }

    /// Handle a virtual gamepad button event
    pub fn handle_gamepad_button(&mut self, button: GamepadButton, element_state: ElementState) {
        self.handle_binding(InputBinding::Pad(button), element_state);
    }

    /// Set the virtual analog stick position; components are clamped to [-1, 1]
    pub fn handle_stick(&mut self, axes: Vec2) {
        self.stick = axes.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    }

    /// Collect typed text; control characters are dropped
    pub fn handle_text(&mut self, text: &str) {
        self.text.extend(text.chars().filter(|c| !c.is_control()));
    }

    fn handle_binding(&mut self, binding: InputBinding, element_state: ElementState) {
        match element_state {
            ElementState::Pressed => {
                // OS key repeat re-sends Pressed; only the first counts
                if !self.held_bindings.insert(binding) {
                    return;
                }
                for &action in self.bindings.actions(&binding) {
                    if self.held.insert(action) {
                        self.just_pressed.insert(action);
                    }
                }
            }
            ElementState::Released => {
                if !self.held_bindings.remove(&binding) {
                    return;
                }
                for &action in self.bindings.actions(&binding) {
                    let still_held = self
                        .bindings
                        .bindings_for(action)
                        .iter()
                        .any(|b| self.held_bindings.contains(b));
                    if !still_held {
                        self.held.remove(&action);
                    }
                }
            }
        }
    }

    /// Current movement intent. The stick wins when it is outside the deadzone.
    pub fn movement(&self) -> Vec2 {
        let mut stick = self.stick;
        if stick.x.abs() < self.deadzone {
            stick.x = 0.0;
        }
        if stick.y.abs() < self.deadzone {
            stick.y = 0.0;
        }
        if stick != Vec2::ZERO {
            return stick;
        }

        let axis = |neg: InputAction, pos: InputAction| -> f32 {
            (self.held.contains(&pos) as i32 - self.held.contains(&neg) as i32) as f32
        };
        let mut keys = Vec2::new(
            axis(InputAction::MoveLeft, InputAction::MoveRight),
            axis(InputAction::MoveUp, InputAction::MoveDown),
        );
        if keys.x != 0.0 && keys.y != 0.0 {
            keys *= std::f32::consts::FRAC_1_SQRT_2;
        }
        keys
    }

    /// Snapshot of this frame without clearing it
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            movement: self.movement(),
            held: self.held.clone(),
            just_pressed: self.just_pressed.clone(),
            text: self.text.clone(),
        }
    }

    /// Snapshot this frame and clear the frame-specific state
    pub fn sample(&mut self) -> InputSnapshot {
        let snapshot = self.snapshot();
        self.end_frame();
        snapshot
    }

    /// Clear frame-specific input data
    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.text.clear();
    }

    /// Forget everything, e.g. when the window loses focus
    pub fn clear_all(&mut self) {
        self.held_bindings.clear();
        self.held.clear();
        self.just_pressed.clear();
        self.stick = Vec2::ZERO;
        self.text.clear();
    }
}
