//! Contacts and their classification.

use glam::Vec3;

use crate::collision::{BoxShape, ContentFlags, ShapeHandle};

use super::config::SolverConfig;

/// Half height of the thin box used for downward ground probes.
const PROBE_HALF_HEIGHT: f32 = 0.05;

/// A penetrating contact found during one resolution pass.
///
/// Transient: contacts are never kept between passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub handle: ShapeHandle,

    /// Unit separation normal, pointing away from the other shape.
    pub normal: Vec3,

    /// Penetration depth (meters).
    pub depth: f32,

    /// Contents of the other shape.
    pub contents: ContentFlags,
}

/// How a contact is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Ground the body can stand on.
    Floor,
    /// Anything else: walls, steep slopes, ceilings, other bodies.
    Wall,
}

impl Contact {
    /// Classify by the angle between the separation normal and up.
    ///
    /// Only shapes matching the config's ground mask can be floor.
    pub fn classify(&self, config: &SolverConfig) -> ContactKind {
        if self.contents.intersects(config.ground_mask)
            && self.normal.y > 0.0
            && config.is_walkable(self.normal)
        {
            ContactKind::Floor
        } else {
            ContactKind::Wall
        }
    }

    /// Whether the overlap is deep enough to act on.
    #[inline]
    pub fn exceeds_skin(&self, config: &SolverConfig) -> bool {
        self.depth > config.skin_width
    }
}

/// Remove the component of `velocity` along `normal`.
///
/// `normal` must be unit length.
#[inline]
pub fn clip_velocity(velocity: Vec3, normal: Vec3) -> Vec3 {
    velocity - normal * velocity.dot(normal)
}

/// The transient query volumes derived from a body's shape.
///
/// The contact box is the body grown by the contact offset on every side and
/// centered on the body. The shared body shape is never modified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactVolume {
    /// Body shape padded by the contact offset.
    pub shape: BoxShape,

    /// Thin box with the padded footprint, for downward probes.
    pub probe: BoxShape,

    offset: f32,
}

impl ContactVolume {
    pub fn new(shape: &BoxShape, contact_offset: f32) -> Self {
        let padded = shape.padded(contact_offset);
        let probe_half = PROBE_HALF_HEIGHT.min(padded.half_extents.y);
        Self {
            shape: padded,
            probe: padded.with_half_height(probe_half),
            offset: contact_offset,
        }
    }

    /// Query position of the padded box for a body at `position`.
    ///
    /// Both the padded box and the probe have their bottom face here.
    #[inline]
    pub fn origin(&self, position: Vec3) -> Vec3 {
        position - Vec3::new(0.0, self.offset, 0.0)
    }
}
