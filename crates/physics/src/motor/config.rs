//! Motor configuration.
//!
//! All solver tunables are grouped here for easy tuning. Values use metric
//! units (meters, seconds, degrees) unless otherwise noted.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::ContentFlags;
use crate::error::ConfigError;

/// Upper bound for [`SolverConfig::max_iterations`].
pub const MAX_SOLVER_ITERATIONS: usize = 64;

/// Slack for the floor/wall threshold so a normal exactly at the limit
/// classifies as floor despite rounding.
const GROUND_COS_EPSILON: f32 = 1e-6;

/// How the jump impulse is specified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpImpulse {
    /// Vertical take-off speed (meters/second).
    Speed(f32),
    /// Apex height above the take-off point (meters) under the scaled gravity.
    Height(f32),
}

/// What happens to a jump request that cannot be honoured this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpPolicy {
    /// Drop the request.
    Discard,
    /// Keep the request alive for `window` seconds and jump on the first
    /// tick it can be honoured.
    Buffer { window: f32 },
}

/// Per-body solver tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    // ========================================================================
    // Movement
    // ========================================================================
    /// Speed cap along the move wish (meters/second).
    pub max_speed: f32,

    /// Acceleration towards the move wish while grounded (meters/second²).
    pub ground_acceleration: f32,

    /// Horizontal friction coefficient while grounded (1/second).
    pub ground_friction: f32,

    /// Acceleration towards the move wish while airborne (meters/second²).
    pub air_acceleration: f32,

    /// Horizontal friction coefficient while airborne (1/second).
    pub air_friction: f32,

    /// Project velocity onto the previous ground plane while grounded so
    /// motion follows slopes.
    pub project_on_ground: bool,

    // ========================================================================
    // Jumping and gravity
    // ========================================================================
    pub jump: JumpImpulse,

    pub jump_policy: JumpPolicy,

    /// Minimum time between two jumps (seconds).
    pub jump_cooldown: f32,

    pub use_gravity: bool,

    /// Gravity acceleration before scaling (meters/second²).
    pub gravity: Vec3,

    pub gravity_scale: f32,

    // ========================================================================
    // Ground
    // ========================================================================
    /// Maximum angle between a contact normal and up that still counts as
    /// floor (degrees).
    pub max_ground_angle: f32,

    /// Which contents may be stood on.
    pub ground_mask: ContentFlags,

    pub ground_adhesion: bool,

    /// How far below the feet ground adhesion looks for ground (meters).
    pub adhesion_distance: f32,

    // ========================================================================
    // Stairs
    // ========================================================================
    pub stepping: bool,

    /// Maximum obstacle height the body climbs without jumping (meters).
    pub step_height: f32,

    // ========================================================================
    // Collision
    // ========================================================================
    /// Minimum penetration depth that gets resolved (meters).
    pub skin_width: f32,

    /// Padding added to every side of the body for contact queries (meters).
    pub contact_offset: f32,

    /// Upper bound on contact-resolution passes per tick.
    pub max_iterations: usize,

    /// Clamp wall responses so they never raise the body or its velocity.
    pub prevent_climbing: bool,

    /// Sweep the body when one tick's motion is larger than the body itself.
    pub sweep_guard: bool,

    /// Contents that block the body.
    pub collision_mask: ContentFlags,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            // Movement
            max_speed: 8.0,
            ground_acceleration: 200.0,
            ground_friction: 12.0,
            air_acceleration: 50.0,
            air_friction: 3.0,
            project_on_ground: true,

            // Jumping and gravity
            jump: JumpImpulse::Height(2.0),
            jump_policy: JumpPolicy::Discard,
            jump_cooldown: 0.0,
            use_gravity: true,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            gravity_scale: 2.0,

            // Ground
            max_ground_angle: 60.0,
            ground_mask: ContentFlags::WALKABLE,
            ground_adhesion: true,
            adhesion_distance: 0.1,

            // Stairs
            stepping: true,
            step_height: 0.4,

            // Collision
            skin_width: 0.01,
            contact_offset: 0.005,
            max_iterations: 16,
            prevent_climbing: true,
            sweep_guard: true,
            collision_mask: ContentFlags::MASK_BODY_SOLID,
        }
    }
}

impl SolverConfig {
    /// Slow, floaty tuning: low acceleration and friction, 60° slopes.
    pub fn classic() -> Self {
        Self {
            ground_acceleration: 12.0,
            ground_friction: 5.0,
            air_acceleration: 12.0,
            air_friction: 5.0,
            jump: JumpImpulse::Speed(8.0),
            gravity_scale: 1.0,
            max_ground_angle: 60.0,
            ..Default::default()
        }
    }

    /// Snappy tuning: high acceleration, strong friction, 75° slopes.
    pub fn responsive() -> Self {
        Self {
            ground_acceleration: 200.0,
            ground_friction: 12.0,
            air_acceleration: 50.0,
            air_friction: 3.0,
            jump: JumpImpulse::Height(2.0),
            gravity_scale: 2.0,
            max_ground_angle: 75.0,
            ..Default::default()
        }
    }

    /// Parse a config from TOML. Missing fields keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check every field once, at setup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::invalid(field, format!("must be finite and >= 0, got {value}")))
            }
        }

        non_negative("max_speed", self.max_speed)?;
        non_negative("ground_acceleration", self.ground_acceleration)?;
        non_negative("ground_friction", self.ground_friction)?;
        non_negative("air_acceleration", self.air_acceleration)?;
        non_negative("air_friction", self.air_friction)?;
        non_negative("jump_cooldown", self.jump_cooldown)?;
        non_negative("gravity_scale", self.gravity_scale)?;
        non_negative("adhesion_distance", self.adhesion_distance)?;
        non_negative("step_height", self.step_height)?;
        non_negative("skin_width", self.skin_width)?;
        non_negative("contact_offset", self.contact_offset)?;

        match self.jump {
            JumpImpulse::Speed(v) => non_negative("jump", v)?,
            JumpImpulse::Height(h) => non_negative("jump", h)?,
        }
        if let JumpPolicy::Buffer { window } = self.jump_policy {
            non_negative("jump_policy", window)?;
        }

        if !self.gravity.is_finite() {
            return Err(ConfigError::invalid("gravity", "must be finite"));
        }
        if !(self.max_ground_angle.is_finite() && (0.0..90.0).contains(&self.max_ground_angle)) {
            return Err(ConfigError::invalid(
                "max_ground_angle",
                format!("must be in [0, 90) degrees, got {}", self.max_ground_angle),
            ));
        }
        if self.max_iterations == 0 || self.max_iterations > MAX_SOLVER_ITERATIONS {
            return Err(ConfigError::invalid(
                "max_iterations",
                format!("must be in 1..={MAX_SOLVER_ITERATIONS}, got {}", self.max_iterations),
            ));
        }

        if self.skin_width == 0.0 {
            log::warn!("skin_width is 0: resting contacts will jitter");
        }
        if self.stepping && self.step_height == 0.0 {
            log::warn!("stepping enabled with a zero step_height");
        }

        Ok(())
    }

    /// Gravity after scaling, or zero when gravity is disabled.
    pub fn effective_gravity(&self) -> Vec3 {
        if self.use_gravity {
            self.gravity * self.gravity_scale
        } else {
            Vec3::ZERO
        }
    }

    /// Take-off speed for a jump.
    pub fn jump_speed(&self) -> f32 {
        match self.jump {
            JumpImpulse::Speed(speed) => speed,
            JumpImpulse::Height(height) => {
                let g = (self.gravity * self.gravity_scale).length();
                (2.0 * g * height).sqrt()
            }
        }
    }

    /// Cosine of the maximum ground angle.
    #[inline]
    pub fn min_ground_cos(&self) -> f32 {
        self.max_ground_angle.to_radians().cos()
    }

    /// Whether a surface with this unit normal is shallow enough to stand on.
    ///
    /// A normal exactly at [`max_ground_angle`](Self::max_ground_angle) is walkable.
    #[inline]
    pub fn is_walkable(&self, normal: Vec3) -> bool {
        normal.y >= self.min_ground_cos() - GROUND_COS_EPSILON
    }

    /// Acceleration and friction for the current support state.
    pub fn movement_params(&self, grounded: bool) -> (f32, f32) {
        if grounded {
            (self.ground_acceleration, self.ground_friction)
        } else {
            (self.air_acceleration, self.air_friction)
        }
    }
}
