//! Kinematic character motor.
//!
//! This module implements the collide-and-slide solver:
//!
//! - Velocity integration with ground and air friction/acceleration
//! - Iterative depenetration with floor/wall classification by slope angle
//! - Stair stepping over low obstacles
//! - Ground adhesion across small gaps and descending steps
//! - Grounded/airborne state machine with jump buffering
//!
//! # Design
//!
//! Movement is driven by the [`CharacterMotor`], which takes a [`Body`] and
//! its [`MotionState`] by mutable reference and advances them by one fixed
//! tick through a [`ShapeQuery`](crate::ShapeQuery) provider. The motor keeps
//! no per-body state of its own, so one motor can drive any number of bodies.
//!
//! Each tick runs a fixed sequence:
//!
//! ```text
//! pre-move ─► integrate ─► sweep guard ─► resolve contacts ─► finish ─► commit ─► post-move
//! ```
//!
//! `integrate`, the per-contact response and `finish` are plain function
//! values in [`MotorStages`] and may be swapped for custom behaviour.
//!
//! The same inputs always produce the same outputs.

mod adhesion;
mod config;
mod contact;
mod controller;
mod integrator;
mod jump;
mod pipeline;
mod resolver;
mod state;
mod step;

pub use adhesion::{adhere, probe_ground, GroundHit};
pub use config::{JumpImpulse, JumpPolicy, SolverConfig, MAX_SOLVER_ITERATIONS};
pub use contact::{clip_velocity, Contact, ContactKind, ContactVolume};
pub use controller::{CharacterMotor, MAX_TICK_SECONDS};
pub use integrator::{accelerate, apply_friction, integrate, IntegrateInput, Integration};
pub use jump::JumpState;
pub use pipeline::{
    ContactResponse, FinishFn, IntegrateFn, MotorStages, MoveFrame, ResolveContactFn, StageContext,
};
pub use resolver::{resolve_contacts, respond_to_contact, ResolveOutcome};
pub use state::{Body, MotionState, MotorEvent, TickReport};
pub use step::try_step;
