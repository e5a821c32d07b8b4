//! Query shapes, results and the provider contract.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::flags::ContentFlags;

/// Identifies one shape owned by a query provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeHandle(pub u32);

/// An axis-aligned box used for queries.
///
/// The box never rotates. Padded or thinned variants are built as new values
/// rather than by mutating a shared shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    /// Half-size in each axis (x, y, z).
    pub half_extents: Vec3,
}

impl BoxShape {
    /// A standing character box: 0.8m x 1.8m x 0.8m.
    pub const CHARACTER: Self = Self {
        half_extents: Vec3::new(0.4, 0.9, 0.4),
    };

    pub const fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    /// Total height of the box.
    #[inline]
    pub fn height(&self) -> f32 {
        self.half_extents.y * 2.0
    }

    /// Same box grown by `amount` on every side.
    pub fn padded(&self, amount: f32) -> Self {
        Self::new(self.half_extents + Vec3::splat(amount))
    }

    /// Same footprint with a different half height.
    pub fn with_half_height(&self, half_height: f32) -> Self {
        Self::new(Vec3::new(self.half_extents.x, half_height, self.half_extents.z))
    }

    /// World-space center of the box when its bottom-center sits at `position`.
    #[inline]
    pub fn center_at(&self, position: Vec3) -> Vec3 {
        position + Vec3::new(0.0, self.half_extents.y, 0.0)
    }

    /// Whether every half extent is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.half_extents.is_finite() && self.half_extents.min_element() > 0.0
    }
}

impl Default for BoxShape {
    fn default() -> Self {
        Self::CHARACTER
    }
}

/// Result of a penetration query between the query box and one shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Unit separation direction, pointing out of the other shape towards the
    /// query box. Moving the box by `normal * depth` separates the two.
    pub normal: Vec3,

    /// Penetration depth (meters, >= 0).
    pub depth: f32,
}

/// One hit from a sweep query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// The shape that was hit.
    pub handle: ShapeHandle,

    /// World-space contact point on the hit shape.
    pub point: Vec3,

    /// World-space surface normal of the hit shape at the contact.
    pub normal: Vec3,

    /// Distance travelled along the sweep direction before contact.
    ///
    /// Zero means the box already overlapped the shape at the start.
    pub distance: f32,
}

/// The shape query contract the motor consumes.
///
/// Implementations must tolerate concurrent read-only calls when bodies are
/// ticked in parallel; none of these methods may mutate shared state.
pub trait ShapeQuery {
    /// All shapes overlapping `shape` placed at `position` whose contents
    /// intersect `mask`. The caller filters its own shape.
    fn overlap(&self, shape: &BoxShape, position: Vec3, mask: ContentFlags) -> Vec<ShapeHandle>;

    /// Separation of `shape` at `position` from the shape `other`.
    ///
    /// Returns `None` when the two are not overlapping.
    fn penetration(&self, shape: &BoxShape, position: Vec3, other: ShapeHandle)
        -> Option<Penetration>;

    /// Sweep `shape` from `position` along unit `direction` for at most
    /// `max_distance`. Hits are ordered by increasing distance.
    fn sweep(
        &self,
        shape: &BoxShape,
        position: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ContentFlags,
    ) -> Vec<SweepHit>;

    /// Content flags of a shape. Unknown handles report [`ContentFlags::EMPTY`].
    fn contents(&self, handle: ShapeHandle) -> ContentFlags;
}
