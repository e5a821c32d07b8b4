//! Body, motion state and per-tick results.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{BoxShape, ShapeHandle};
use crate::error::MotorError;

use super::jump::JumpState;

/// The moving collision volume.
///
/// The box never rotates about non-vertical axes. `position` is the
/// bottom-center of the box.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    shape: BoxShape,

    /// Position in world space (feet/bottom of the box).
    pub position: Vec3,

    /// The body's own shape in the query provider, if it is registered there.
    /// Contacts against it are skipped.
    handle: Option<ShapeHandle>,
}

impl Body {
    /// Create a body, rejecting degenerate shapes.
    pub fn new(shape: BoxShape, position: Vec3) -> Result<Self, MotorError> {
        if !shape.is_valid() {
            return Err(MotorError::DegenerateShape(shape.half_extents.to_array()));
        }
        Ok(Self {
            shape,
            position,
            handle: None,
        })
    }

    /// Mark the provider shape that represents this body.
    pub fn with_handle(mut self, handle: ShapeHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    #[inline]
    pub fn shape(&self) -> &BoxShape {
        &self.shape
    }

    #[inline]
    pub fn handle(&self) -> Option<ShapeHandle> {
        self.handle
    }

    /// Whether `handle` is this body's own shape.
    #[inline]
    pub fn is_self(&self, handle: ShapeHandle) -> bool {
        self.handle == Some(handle)
    }

    /// World-space center of the box.
    pub fn center(&self) -> Vec3 {
        self.shape.center_at(self.position)
    }
}

/// Movement state that persists across ticks.
///
/// Created once per body with zero velocity and not grounded. Only
/// [`CharacterMotor`](super::CharacterMotor) mutates it during a tick; the
/// caller refreshes the move wish and jump request in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// Velocity in world space (meters/second).
    pub velocity: Vec3,

    /// Whether the previous tick ended on ground.
    pub was_grounded: bool,

    /// Ground surface normal. Only meaningful while `was_grounded` is true.
    pub ground_normal: Vec3,

    /// Displacement of the last tick divided by its duration.
    pub effective_velocity: Vec3,

    /// Jump request and cooldown.
    pub jump: JumpState,

    move_wish: Vec3,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            was_grounded: false,
            ground_normal: Vec3::Y,
            effective_velocity: Vec3::ZERO,
            jump: JumpState::default(),
            move_wish: Vec3::ZERO,
        }
    }
}

impl MotionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the desired movement direction in world space.
    ///
    /// Longer vectors are clamped to unit length; non-finite input is
    /// treated as no input.
    pub fn set_move_wish(&mut self, direction: Vec3) {
        self.move_wish = if direction.is_finite() {
            direction.clamp_length_max(1.0)
        } else {
            Vec3::ZERO
        };
    }

    #[inline]
    pub fn move_wish(&self) -> Vec3 {
        self.move_wish
    }

    /// Request a jump. See [`JumpPolicy`](super::JumpPolicy) for what happens
    /// when it cannot be honoured on the next tick.
    pub fn request_jump(&mut self) {
        self.jump.request();
    }

    /// Whether the last tick ended on ground.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.was_grounded
    }

    /// Ground normal, if grounded.
    pub fn ground(&self) -> Option<Vec3> {
        self.was_grounded.then_some(self.ground_normal)
    }

    /// Current horizontal speed.
    pub fn horizontal_speed(&self) -> f32 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z).length()
    }
}

/// Observable grounded/airborne transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorEvent {
    /// Airborne to grounded.
    Grounded,
    /// Grounded to airborne by jumping.
    Jumped,
    /// Grounded to airborne without jumping.
    FallBegin,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// The transition this tick, if any. At most one per tick.
    pub event: Option<MotorEvent>,

    /// A jump impulse was applied.
    pub jumped: bool,

    /// Whether the body ended the tick on ground.
    pub grounded: bool,

    /// Contact-resolution passes used.
    pub iterations: usize,

    /// Contact resolution finished before the iteration budget ran out.
    pub converged: bool,

    /// A stair step was committed.
    pub stepped: bool,

    /// Ground adhesion snapped the body down.
    pub adhered: bool,
}
