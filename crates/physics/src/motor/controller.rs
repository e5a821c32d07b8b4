//! Character motor.
//!
//! This is the main entry point for character movement. It advances a body
//! and its motion state by one fixed tick through a shape query provider.

use glam::Vec3;

use crate::collision::ShapeQuery;
use crate::error::MotorError;

use super::adhesion::probe_ground;
use super::config::SolverConfig;
use super::integrator::IntegrateInput;
use super::pipeline::{MotorStages, MoveFrame, StageContext};
use super::resolver::{guard_tunneling, resolve_contacts};
use super::state::{Body, MotionState, MotorEvent, TickReport};

/// Longest tick the motor will simulate in one step (seconds).
pub const MAX_TICK_SECONDS: f32 = 0.066;

/// How far above a spawn point the spawn probe starts.
const SPAWN_PROBE_LIFT: f32 = 1.0;

/// How far below a spawn point the spawn probe reaches.
const SPAWN_PROBE_DEPTH: f32 = 2.0;

/// Kinematic character motor.
///
/// Holds only immutable tunables and stage functions, so a single motor can
/// drive many bodies, from several threads if the query provider allows it.
///
/// # Example
///
/// ```ignore
/// let motor = CharacterMotor::new(SolverConfig::default())?;
/// let mut body = Body::new(BoxShape::CHARACTER, spawn_point)?;
/// let mut state = MotionState::new();
/// motor.spawn_at(&mut body, &mut state, spawn_point, &world);
///
/// // Each fixed tick:
/// state.set_move_wish(input_direction);
/// let report = motor.update(&mut body, &mut state, &world, 1.0 / 60.0);
/// ```
#[derive(Debug, Clone)]
pub struct CharacterMotor {
    config: SolverConfig,
    stages: MotorStages,
}

impl CharacterMotor {
    /// Create a motor, validating the configuration once.
    pub fn new(config: SolverConfig) -> Result<Self, MotorError> {
        config.validate()?;
        Ok(Self {
            config,
            stages: MotorStages::default(),
        })
    }

    /// Create a motor with the default configuration.
    pub fn with_default_config() -> Self {
        Self {
            config: SolverConfig::default(),
            stages: MotorStages::default(),
        }
    }

    /// Replace the stage functions.
    pub fn with_stages(mut self, stages: MotorStages) -> Self {
        self.stages = stages;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn stages(&self) -> &MotorStages {
        &self.stages
    }

    /// Place a body at a spawn point.
    ///
    /// Probes down from slightly above the spawn point and seats the body on
    /// walkable ground if there is any, marking it grounded. Otherwise the
    /// body stays at the spawn point, airborne.
    pub fn spawn_at(
        &self,
        body: &mut Body,
        state: &mut MotionState,
        spawn: Vec3,
        query: &dyn ShapeQuery,
    ) {
        *state = MotionState::new();

        let probe_start = spawn + Vec3::new(0.0, SPAWN_PROBE_LIFT, 0.0);
        let ground = {
            let ctx = StageContext {
                config: &self.config,
                body: &*body,
                query,
            };
            probe_ground(&ctx, probe_start, SPAWN_PROBE_LIFT + SPAWN_PROBE_DEPTH, None)
        };

        match ground {
            Some(hit) => {
                body.position = probe_start - Vec3::new(0.0, hit.distance, 0.0);
                state.was_grounded = true;
                state.ground_normal = hit.normal;
                log::debug!("spawned on {:?} at {:?}", hit.handle, body.position);
            }
            None => {
                body.position = spawn;
                log::debug!("spawned airborne at {:?}", body.position);
            }
        }
    }

    /// Move a body without simulating the path: zero velocity, not grounded.
    pub fn teleport(&self, body: &mut Body, state: &mut MotionState, position: Vec3) {
        body.position = position;
        state.velocity = Vec3::ZERO;
        state.effective_velocity = Vec3::ZERO;
        state.was_grounded = false;
        state.ground_normal = Vec3::Y;
        state.jump.clear();
    }

    /// Advance one body by one tick.
    ///
    /// Non-positive or non-finite `dt` makes the tick a no-op. Longer ticks
    /// are clamped to [`MAX_TICK_SECONDS`].
    pub fn update(
        &self,
        body: &mut Body,
        state: &mut MotionState,
        query: &dyn ShapeQuery,
        dt: f32,
    ) -> TickReport {
        if !(dt.is_finite() && dt > 0.0) {
            return TickReport {
                grounded: state.was_grounded,
                converged: true,
                ..Default::default()
            };
        }
        let dt = dt.min(MAX_TICK_SECONDS);
        let config = &self.config;

        // Pre-move
        state.jump.advance(dt);
        let input = IntegrateInput {
            velocity: state.velocity,
            move_wish: state.move_wish(),
            jump_requested: state.jump.is_ready(),
            was_grounded: state.was_grounded,
            ground_normal: state.ground_normal,
            dt,
        };

        // Integrate
        let integration = (self.stages.integrate)(config, &input);
        let mut frame = MoveFrame::new(
            body.position,
            integration.velocity,
            state.was_grounded,
            integration.jumped,
        );
        frame.position += frame.velocity * dt;

        // Resolve and finish
        let outcome = {
            let ctx = StageContext {
                config,
                body: &*body,
                query,
            };
            guard_tunneling(&ctx, &mut frame);
            let outcome = resolve_contacts(&ctx, &mut frame, self.stages.resolve_contact);
            (self.stages.finish)(&ctx, &mut frame);
            outcome
        };

        // A jump always leaves the ground, whatever the contacts said
        if frame.jumped {
            frame.grounded = false;
        }

        // Commit
        body.position = frame.position;
        state.velocity = frame.velocity;
        state.effective_velocity = (frame.position - frame.start) / dt;

        if frame.jumped {
            state.jump.consume(config.jump_cooldown);
        } else if state.jump.expire(config.jump_policy, dt) {
            log::trace!("jump request dropped");
        }

        // Post-move
        let event = transition(state.was_grounded, frame.grounded, frame.jumped);
        if let Some(event) = event {
            log::debug!("{:?} at {:?} velocity={:?}", event, body.position, state.velocity);
        }

        state.was_grounded = frame.grounded;
        state.ground_normal = if frame.grounded {
            frame.ground_normal
        } else {
            Vec3::Y
        };

        TickReport {
            event,
            jumped: frame.jumped,
            grounded: frame.grounded,
            iterations: outcome.iterations,
            converged: outcome.converged,
            stepped: frame.stepped,
            adhered: frame.adhered,
        }
    }
}

/// The single grounded/airborne transition for a tick, if any.
fn transition(was_grounded: bool, grounded: bool, jumped: bool) -> Option<MotorEvent> {
    match (was_grounded, grounded) {
        (false, true) => Some(MotorEvent::Grounded),
        (true, false) if jumped => Some(MotorEvent::Jumped),
        (true, false) => Some(MotorEvent::FallBegin),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
