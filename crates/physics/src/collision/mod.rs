//! Collision queries consumed by the motor.
//!
//! The motor never talks to a physics backend directly. It consumes the
//! [`ShapeQuery`] contract, which any backend can implement, and ships with
//! [`CollisionWorld`] as a parry3d-backed reference implementation.
//!
//! # Key Types
//!
//! - [`ShapeQuery`]: overlap, penetration and sweep queries for a box
//! - [`BoxShape`]: the axis-aligned query volume (body or transient probe)
//! - [`Penetration`] / [`SweepHit`]: query results
//! - [`ContentFlags`]: what a shape is, used to filter queries
//!
//! # Positions
//!
//! All query positions are the bottom-center of the box (the "feet"). The
//! provider lifts them by the half height when building world poses.

mod flags;
mod query;
mod world;

pub use flags::ContentFlags;
pub use query::{BoxShape, Penetration, ShapeHandle, ShapeQuery, SweepHit};
pub use world::CollisionWorld;
