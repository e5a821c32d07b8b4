//! Collision world containing static and movable geometry.
//!
//! The collision world stores collidable shapes and answers the motor's
//! [`ShapeQuery`] calls with parry3d.

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::na::{Quaternion, Translation3, UnitQuaternion};
use parry3d::query::{self, ShapeCastOptions};
use parry3d::shape::SharedShape;

use super::flags::ContentFlags;
use super::query::{BoxShape, Penetration, ShapeHandle, ShapeQuery, SweepHit};

/// A piece of collision geometry in the world.
#[derive(Debug, Clone)]
pub struct CollisionBrush {
    /// Handle for this brush.
    pub handle: ShapeHandle,
    /// The collision shape.
    pub shape: SharedShape,
    /// Position and orientation in world space.
    pub transform: Isometry<Real>,
    /// Content flags (solid, walkable, trigger, ...).
    pub contents: ContentFlags,
}

/// The collision world containing all geometry.
///
/// Supports:
/// - Axis-aligned and oriented boxes (floors, walls, steps, ramps)
/// - Convex hull brushes
///
/// # Thread Safety
///
/// Queries take `&self` and never mutate, so a world can be shared across
/// threads while independent bodies are ticked in parallel.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    brushes: Vec<CollisionBrush>,
    next_id: u32,
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            brushes: Vec::new(),
            next_id: 0,
        }
    }

    /// Add an axis-aligned box to the world.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    /// * `contents` - Content flags for collision filtering
    pub fn add_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        contents: ContentFlags,
    ) -> ShapeHandle {
        self.add_oriented_box(center, half_extents, Quat::IDENTITY, contents)
    }

    /// Add a rotated box to the world (ramps, tilted platforms).
    pub fn add_oriented_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        rotation: Quat,
        contents: ContentFlags,
    ) -> ShapeHandle {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.push(shape, isometry(center, rotation), contents)
    }

    /// Add a convex hull to the world.
    ///
    /// Returns `None` if the hull couldn't be computed.
    pub fn add_convex_hull(
        &mut self,
        points: &[Vec3],
        contents: ContentFlags,
    ) -> Option<ShapeHandle> {
        let parry_points: Vec<Point<Real>> =
            points.iter().map(|p| Point::new(p.x, p.y, p.z)).collect();
        let shape = SharedShape::convex_hull(&parry_points)?;
        Some(self.push(shape, Isometry::identity(), contents))
    }

    /// Register a character body as a movable box.
    ///
    /// `position` is the bottom-center of the box, as everywhere in the motor.
    pub fn add_body(&mut self, shape: &BoxShape, position: Vec3) -> ShapeHandle {
        self.add_box(shape.center_at(position), shape.half_extents, ContentFlags::BODY)
    }

    /// Move a registered body box so its bottom-center sits at `position`.
    ///
    /// Returns `false` if the handle is unknown.
    pub fn sync_body(&mut self, handle: ShapeHandle, shape: &BoxShape, position: Vec3) -> bool {
        let Some(brush) = self.brushes.iter_mut().find(|b| b.handle == handle) else {
            return false;
        };
        let center = shape.center_at(position);
        brush.transform.translation = Translation3::new(center.x, center.y, center.z);
        true
    }

    /// Remove a shape. Returns `false` if the handle is unknown.
    pub fn remove(&mut self, handle: ShapeHandle) -> bool {
        let before = self.brushes.len();
        self.brushes.retain(|b| b.handle != handle);
        self.brushes.len() != before
    }

    /// Remove all collision geometry.
    pub fn clear(&mut self) {
        self.brushes.clear();
    }

    /// Get the number of collision brushes.
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn push(
        &mut self,
        shape: SharedShape,
        transform: Isometry<Real>,
        contents: ContentFlags,
    ) -> ShapeHandle {
        let handle = ShapeHandle(self.next_id);
        self.next_id += 1;

        self.brushes.push(CollisionBrush {
            handle,
            shape,
            transform,
            contents,
        });

        handle
    }

    fn brush(&self, handle: ShapeHandle) -> Option<&CollisionBrush> {
        self.brushes.iter().find(|b| b.handle == handle)
    }

    /// Create the parry shape and world transform for a query box.
    fn query_shape(&self, shape: &BoxShape, position: Vec3) -> (SharedShape, Isometry<Real>) {
        let h = shape.half_extents;
        let center = shape.center_at(position);
        (
            SharedShape::cuboid(h.x, h.y, h.z),
            Isometry::translation(center.x, center.y, center.z),
        )
    }
}

impl ShapeQuery for CollisionWorld {
    fn overlap(&self, shape: &BoxShape, position: Vec3, mask: ContentFlags) -> Vec<ShapeHandle> {
        let (test_shape, test_transform) = self.query_shape(shape, position);

        self.brushes
            .iter()
            .filter(|brush| mask.intersects(brush.contents))
            .filter(|brush| {
                matches!(
                    query::intersection_test(
                        &test_transform,
                        test_shape.as_ref(),
                        &brush.transform,
                        brush.shape.as_ref(),
                    ),
                    Ok(true)
                )
            })
            .map(|brush| brush.handle)
            .collect()
    }

    fn penetration(
        &self,
        shape: &BoxShape,
        position: Vec3,
        other: ShapeHandle,
    ) -> Option<Penetration> {
        let brush = self.brush(other)?;

        if let Some(cuboid) = brush.shape.as_cuboid() {
            let rotation = brush.transform.rotation.coords;
            return box_penetration(
                shape.center_at(position),
                shape.half_extents,
                from_vector(&brush.transform.translation.vector),
                Quat::from_xyzw(rotation.x, rotation.y, rotation.z, rotation.w),
                from_vector(&cuboid.half_extents),
            );
        }

        let (test_shape, test_transform) = self.query_shape(shape, position);

        // Evaluated in the brush's frame to keep the query near the origin
        let relative = brush.transform.inv_mul(&test_transform);
        let contact = query::contact(
            &relative,
            test_shape.as_ref(),
            &Isometry::identity(),
            brush.shape.as_ref(),
            0.0,
        )
        .ok()??;

        // Negative dist means penetration; normal1 points from the query box
        // towards the other shape, so separation is its opposite.
        let depth = (-contact.dist).max(0.0);
        let normal = -from_vector(&(brush.transform.rotation * contact.normal1.into_inner()));
        let normal = normal.try_normalize()?;

        Some(Penetration { normal, depth })
    }

    fn sweep(
        &self,
        shape: &BoxShape,
        position: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ContentFlags,
    ) -> Vec<SweepHit> {
        let Some(direction) = direction.try_normalize() else {
            return Vec::new();
        };
        if max_distance <= 0.0 {
            return Vec::new();
        }

        let (test_shape, test_transform) = self.query_shape(shape, position);
        let velocity = to_vector(direction);

        let mut hits: Vec<SweepHit> = self
            .brushes
            .iter()
            .filter(|brush| mask.intersects(brush.contents))
            .filter_map(|brush| {
                let hit = query::cast_shapes(
                    &test_transform,
                    &velocity,
                    test_shape.as_ref(),
                    &brush.transform,
                    &Vector::zeros(),
                    brush.shape.as_ref(),
                    cast_options(max_distance),
                )
                .ok()??;

                // Cast results are in the local space of each shape.
                let normal = from_vector(&(brush.transform.rotation * hit.normal2.into_inner()));
                let point = brush.transform * hit.witness2;

                Some(SweepHit {
                    handle: brush.handle,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: normal.try_normalize().unwrap_or(-direction),
                    distance: hit.time_of_impact.max(0.0),
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn contents(&self, handle: ShapeHandle) -> ContentFlags {
        self.brush(handle).map_or(ContentFlags::EMPTY, |b| b.contents)
    }
}

fn isometry(center: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(
        rotation.w, rotation.x, rotation.y, rotation.z,
    ));
    Isometry::from_parts(Translation3::new(center.x, center.y, center.z), rotation)
}

/// Edge-edge axes must beat the best face axis by this much to be chosen.
const EDGE_AXIS_BIAS: f32 = 1e-4;

/// Minimum translation of an axis-aligned box out of an oriented box.
///
/// Separating axis test over both boxes' face normals and their pairwise
/// edge crosses. Face axes win ties so resting contacts report the face
/// normal. `None` when the boxes are apart.
fn box_penetration(
    center: Vec3,
    half_extents: Vec3,
    other_center: Vec3,
    other_rotation: Quat,
    other_half_extents: Vec3,
) -> Option<Penetration> {
    let axes = [Vec3::X, Vec3::Y, Vec3::Z];
    let other_axes = axes.map(|axis| other_rotation * axis);
    let offset = other_center - center;

    let radius = |axis: Vec3, frame: &[Vec3; 3], half: Vec3| {
        frame[0].dot(axis).abs() * half.x
            + frame[1].dot(axis).abs() * half.y
            + frame[2].dot(axis).abs() * half.z
    };
    let overlap = |axis: Vec3| {
        radius(axis, &axes, half_extents) + radius(axis, &other_axes, other_half_extents)
            - offset.dot(axis).abs()
    };

    let mut best: Option<(f32, Vec3)> = None;

    for axis in axes.into_iter().chain(other_axes) {
        let depth = overlap(axis);
        if depth < 0.0 {
            return None;
        }
        if best.map_or(true, |(best_depth, _)| depth < best_depth) {
            best = Some((depth, axis));
        }
    }

    for a in axes {
        for b in other_axes {
            let cross = a.cross(b);
            if cross.length_squared() < 1e-6 {
                continue;
            }
            let axis = cross.normalize();
            let depth = overlap(axis);
            if depth < 0.0 {
                return None;
            }
            if best.map_or(true, |(best_depth, _)| depth < best_depth - EDGE_AXIS_BIAS) {
                best = Some((depth, axis));
            }
        }
    }

    let (depth, axis) = best?;
    // Separation points from the other box towards the query box
    let normal = if offset.dot(axis) > 0.0 { -axis } else { axis };

    Some(Penetration { normal, depth })
}

fn cast_options(max_distance: f32) -> ShapeCastOptions {
    ShapeCastOptions {
        max_time_of_impact: max_distance,
        target_distance: 0.0,
        stop_at_penetration: true,
        compute_impact_geometry_on_penetration: true,
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

// ============================================================================
// Tests
// ============================================================================
