//! Jump request state.
//!
//! A jump request is an edge-triggered flag. The motor consumes it on a tick
//! that starts grounded and is off cooldown. A request that cannot be honoured
//! is either dropped or kept alive for a short window, depending on the
//! configured [`JumpPolicy`].

use serde::{Deserialize, Serialize};

use super::config::JumpPolicy;

/// Jump request and cooldown tracking for one body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JumpState {
    /// A jump has been requested and not yet consumed or expired.
    requested: bool,

    /// How long the pending request has been waiting (seconds).
    waited: f32,

    /// Time remaining before another jump is allowed (seconds).
    cooldown: f32,
}

impl JumpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a jump on the next tick that can honour it.
    ///
    /// Requesting again while a request is pending restarts its window.
    pub fn request(&mut self) {
        self.requested = true;
        self.waited = 0.0;
    }

    /// Whether a request is pending.
    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Whether a pending request may fire this tick (ground permitting).
    pub fn is_ready(&self) -> bool {
        self.requested && self.cooldown <= 0.0
    }

    /// Whether jumping is blocked by the cooldown.
    pub fn on_cooldown(&self) -> bool {
        self.cooldown > 0.0
    }

    /// Tick the cooldown timer. Called once at the start of every tick.
    pub fn advance(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// The pending request produced a jump: clear it and start the cooldown.
    pub fn consume(&mut self, cooldown: f32) {
        self.requested = false;
        self.waited = 0.0;
        self.cooldown = cooldown;
    }

    /// The pending request was not honoured this tick.
    ///
    /// Returns `true` if the request was dropped.
    pub fn expire(&mut self, policy: JumpPolicy, dt: f32) -> bool {
        if !self.requested {
            return false;
        }

        let dropped = match policy {
            JumpPolicy::Discard => true,
            JumpPolicy::Buffer { window } => {
                self.waited += dt;
                self.waited > window
            }
        };

        if dropped {
            self.clear();
        }
        dropped
    }

    /// Forget any pending request. The cooldown keeps running.
    pub fn clear(&mut self) {
        self.requested = false;
        self.waited = 0.0;
    }
}

// ============================================================================
// Tests
// ============================================================================
