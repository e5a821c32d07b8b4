//! Content flags for collision filtering.
//!
//! These flags determine what a query can hit and which surfaces the motor
//! is allowed to stand on.

use serde::{Deserialize, Serialize};

/// Content flags describe what type of volume a shape is.
///
/// Queries carry a mask; a shape is reported only when its contents
/// intersect that mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContentFlags(pub u32);

impl ContentFlags {
    /// Nothing.
    pub const EMPTY: Self = Self(0);

    /// Blocks the body.
    pub const SOLID: Self = Self(1 << 0);

    /// May be stood on when the surface angle allows it.
    pub const WALKABLE: Self = Self(1 << 1);

    /// Overlap-only volume. Never blocks the body.
    pub const TRIGGER: Self = Self(1 << 2);

    /// Another character body. Blocks, but is not ground.
    pub const BODY: Self = Self(1 << 3);

    /// Regular level geometry.
    pub const STATIC: Self = Self(Self::SOLID.0 | Self::WALKABLE.0);

    /// Standard mask for body movement queries.
    pub const MASK_BODY_SOLID: Self = Self(Self::SOLID.0 | Self::BODY.0);

    /// Check if these flags contain a specific flag.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the given flags are set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for ContentFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
