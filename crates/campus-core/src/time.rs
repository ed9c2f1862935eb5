//! Tick-based time for the fixed-step update loop
//!
//! Every simulation quantity in the runtime is counted in ticks, never in
//! wall-clock seconds. One tick is one frame at [`TICKS_PER_SECOND`].

use serde::{Deserialize, Serialize};

/// Fixed simulation rate
pub const TICKS_PER_SECOND: u32 = 60;

/// A countdown that blocks something until it reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cooldown {
    remaining: u32,
}

impl Cooldown {
    /// A cooldown that needs `ticks` ticks before it is ready
    pub fn new(ticks: u32) -> Self {
        Self { remaining: ticks }
    }

    /// A cooldown that is already ready
    pub fn ready() -> Self {
        Self { remaining: 0 }
    }

    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Advance one tick, saturating at zero
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// Restart the countdown
    pub fn reset(&mut self, ticks: u32) {
        self.remaining = ticks;
    }
}

/// A repeating timer that fires once every `period` ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickTimer {
    period: u32,
    elapsed: u32,
}

impl TickTimer {
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            elapsed: 0,
        }
    }

    /// Advance one tick. Returns true on the tick the period completes.
    pub fn tick(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.period {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn period(&self) -> u32 {
        self.period
    }
}

/// Convert seconds to whole ticks at the fixed rate
pub fn secs_to_ticks(secs: f32) -> u32 {
    (secs.max(0.0) * TICKS_PER_SECOND as f32).round() as u32
}
