//! Ground adhesion.
//!
//! Keeps a grounded body attached to the ground across small gaps, ramp
//! crests and descending steps by probing a short distance below the feet
//! when the contact pass found no floor.

use glam::Vec3;

use crate::collision::ShapeHandle;

use super::contact::clip_velocity;
use super::pipeline::{MoveFrame, StageContext};

/// Ground found by a downward probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub handle: ShapeHandle,

    /// Surface normal of the ground.
    pub normal: Vec3,

    /// How far the body must drop to rest on it.
    pub distance: f32,
}

/// Sweep the body footprint down from `position` by up to `distance` and
/// return the first walkable ground.
///
/// Hits at zero distance are skipped: the probe already overlaps them, which
/// is either the body itself or geometry it is stuck in. With `only` set,
/// every other shape is ignored.
pub fn probe_ground(
    ctx: &StageContext<'_>,
    position: Vec3,
    distance: f32,
    only: Option<ShapeHandle>,
) -> Option<GroundHit> {
    let config = ctx.config;
    let volume = ctx.volume();

    let hits = ctx.query.sweep(
        &volume.probe,
        volume.origin(position),
        Vec3::NEG_Y,
        distance,
        config.collision_mask,
    );

    hits.into_iter()
        .filter(|hit| !ctx.body.is_self(hit.handle))
        .filter(|hit| only.map_or(true, |handle| handle == hit.handle))
        .filter(|hit| hit.distance > 0.0)
        .find(|hit| {
            ctx.query.contents(hit.handle).intersects(config.ground_mask)
                && hit.normal.y > 0.0
                && config.is_walkable(hit.normal)
        })
        .map(|hit| GroundHit {
            handle: hit.handle,
            normal: hit.normal,
            distance: hit.distance,
        })
}

/// Default finish stage: snap a body that just walked off its ground back
/// down onto ground within the adhesion distance.
///
/// Runs only when adhesion is enabled, the tick started grounded, no jump
/// happened and no floor was found this tick.
pub fn adhere(ctx: &StageContext<'_>, frame: &mut MoveFrame) {
    let config = ctx.config;
    if !config.ground_adhesion || frame.jumped || !frame.was_grounded || frame.grounded {
        return;
    }

    let Some(hit) = probe_ground(ctx, frame.position, config.adhesion_distance, None) else {
        return;
    };

    log::trace!("adhering to {:?}, drop {:.4}", hit.handle, hit.distance);

    frame.position.y -= hit.distance;
    frame.velocity.y = clip_velocity(frame.velocity, hit.normal).y;
    frame.land(hit.normal);
    frame.adhered = true;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{BoxShape, CollisionWorld, ContentFlags};
    use crate::motor::config::SolverConfig;
    use crate::motor::state::Body;

    fn body() -> Body {
        Body::new(BoxShape::CHARACTER, Vec3::ZERO).expect("valid body")
    }

    fn floor_world(top: f32) -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_box(
            Vec3::new(0.0, top - 0.5, 0.0),
            Vec3::new(20.0, 0.5, 20.0),
            ContentFlags::STATIC,
        );
        world
    }

    fn grounded_frame(position: Vec3) -> MoveFrame {
        let mut frame = MoveFrame::new(position, Vec3::new(3.0, -0.3, 0.0), true, false);
        frame.position = position;
        frame
    }

    #[test]
    fn test_adhesion_snaps_across_small_gap() {
        let world = floor_world(0.0);
        let config = SolverConfig::default();
        let body = body();
        let ctx = StageContext {
            config: &config,
            body: &body,
            query: &world,
        };

        // 5cm above resting height, inside the 10cm adhesion range
        let rest = config.contact_offset;
        let mut frame = grounded_frame(Vec3::new(0.0, rest + 0.05, 0.0));
        adhere(&ctx, &mut frame);

        assert!(frame.adhered);
        assert!(frame.grounded);
        assert!((frame.position.y - rest).abs() < 1e-3, "y={}", frame.position.y);
        assert!(frame.velocity.y.abs() < 1e-5);
        assert_eq!(frame.velocity.x, 3.0);
    }

    #[test]
    fn test_adhesion_gives_up_beyond_range() {
        let world = floor_world(0.0);
        let config = SolverConfig::default();
        let body = body();
        let ctx = StageContext {
            config: &config,
            body: &body,
            query: &world,
        };

        let start = Vec3::new(0.0, 0.5, 0.0);
        let mut frame = grounded_frame(start);
        adhere(&ctx, &mut frame);

        assert!(!frame.adhered);
        assert!(!frame.grounded);
        assert_eq!(frame.position, start);
    }

    #[test]
    fn test_adhesion_preconditions() {
        let world = floor_world(0.0);
        let config = SolverConfig::default();
        let body = body();
        let ctx = StageContext {
            config: &config,
            body: &body,
            query: &world,
        };
        let near = Vec3::new(0.0, 0.05, 0.0);

        // Airborne at tick start
        let mut frame = MoveFrame::new(near, Vec3::ZERO, false, false);
        adhere(&ctx, &mut frame);
        assert!(!frame.adhered);

        // Jumped this tick
        let mut frame = MoveFrame::new(near, Vec3::ZERO, true, true);
        adhere(&ctx, &mut frame);
        assert!(!frame.adhered);

        // Already grounded by a floor contact
        let mut frame = grounded_frame(near);
        frame.land(Vec3::Y);
        adhere(&ctx, &mut frame);
        assert!(!frame.adhered);
        assert_eq!(frame.position, near);

        // Disabled
        let disabled = SolverConfig {
            ground_adhesion: false,
            ..Default::default()
        };
        let ctx = StageContext {
            config: &disabled,
            ..ctx
        };
        let mut frame = grounded_frame(near);
        adhere(&ctx, &mut frame);
        assert!(!frame.adhered);
    }

    #[test]
    fn test_probe_skips_steep_and_non_ground() {
        let mut world = CollisionWorld::new();
        // A crate another body could be standing on: solid but not walkable
        world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(2.0, 0.5, 2.0), ContentFlags::SOLID);

        let config = SolverConfig::default();
        let body = body();
        let ctx = StageContext {
            config: &config,
            body: &body,
            query: &world,
        };

        assert!(probe_ground(&ctx, Vec3::new(0.0, 0.05, 0.0), 0.1, None).is_none());
    }

    #[test]
    fn test_probe_ignores_overlapping_shapes() {
        let mut world = floor_world(0.0);
        // Pillar the probe starts inside of
        world.add_box(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.2, 1.0, 0.2), ContentFlags::STATIC);

        let config = SolverConfig::default();
        let body = body();
        let ctx = StageContext {
            config: &config,
            body: &body,
            query: &world,
        };

        let hit = probe_ground(&ctx, Vec3::new(0.0, 0.5, 0.0), 1.0, None).expect("floor below");
        assert_eq!(hit.handle, ShapeHandle(0));
        assert!((hit.distance - 0.495).abs() < 1e-3, "distance={}", hit.distance);
    }

    #[test]
    fn test_probe_restricted_to_one_shape() {
        let mut world = floor_world(0.0);
        let ledge = world.add_box(
            Vec3::new(5.0, 0.25, 0.0),
            Vec3::new(1.0, 0.25, 1.0),
            ContentFlags::STATIC,
        );

        let config = SolverConfig::default();
        let body = body();
        let ctx = StageContext {
            config: &config,
            body: &body,
            query: &world,
        };

        // Above the floor, far from the ledge
        assert!(probe_ground(&ctx, Vec3::new(0.0, 0.3, 0.0), 1.0, Some(ledge)).is_none());
        let hit = probe_ground(&ctx, Vec3::new(5.0, 0.8, 0.0), 1.0, Some(ledge)).expect("ledge");
        assert_eq!(hit.handle, ledge);
    }
}
