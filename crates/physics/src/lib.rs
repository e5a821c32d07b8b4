//! Kinebox Physics
//!
//! A kinematic character motor built around the collide-and-slide algorithm.
//! Each fixed simulation tick moves a non-rotating box through a scene and
//! produces a new position, velocity and ground-contact state without running
//! rigid-body dynamics for the character.
//!
//! # Architecture
//!
//! The crate is split into two systems:
//!
//! - **Collision**: The [`ShapeQuery`] contract (overlap, penetration, sweep)
//!   and [`CollisionWorld`], a parry3d-backed implementation of it
//! - **Motor**: Velocity integration, iterative depenetration, stair stepping,
//!   ground adhesion and the grounded/airborne state machine
//!
//! ```text
//!  move wish, jump ─► integrate ─► resolve contacts ─► step ─► adhere ─► commit
//!                                        ▲                               │
//!                                        └──────── ShapeQuery ◄──────────┘
//! ```
//!
//! The solver is synchronous and performs no I/O. A [`MotionState`] is owned
//! by the caller and passed by reference into [`CharacterMotor::update`].

pub mod collision;
pub mod error;
pub mod motor;

// Re-export commonly used types
pub use collision::{
    BoxShape, CollisionWorld, ContentFlags, Penetration, ShapeHandle, ShapeQuery, SweepHit,
};
pub use error::{ConfigError, MotorError};
pub use motor::{
    Body, CharacterMotor, JumpImpulse, JumpPolicy, MotionState, MotorEvent, MotorStages,
    SolverConfig, TickReport,
};
