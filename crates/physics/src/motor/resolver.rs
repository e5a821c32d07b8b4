//! Iterative contact resolution (collide and slide).
//!
//! Each pass overlap-tests the body at its candidate position and walks the
//! contacts in provider order. The first contact that needs a correction is
//! resolved and the pass restarts, because the correction may invalidate
//! every contact found after it. A pass with nothing to correct ends the loop.
//!
//! The number of passes is bounded by [`SolverConfig::max_iterations`]. If the
//! budget runs out the last candidate is accepted as-is; sliver gaps and
//! co-planar contacts can otherwise oscillate forever.

use glam::Vec3;

use super::config::SolverConfig;
use super::contact::{clip_velocity, Contact, ContactKind};
use super::pipeline::{ContactResponse, MoveFrame, ResolveContactFn, StageContext};
use super::step::try_step;

/// Result of the resolution loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOutcome {
    /// Passes used, including the final clean pass when converged.
    pub iterations: usize,

    /// The loop ended on a pass with nothing to correct.
    pub converged: bool,
}

/// Outcome of one overlap scan.
enum Pass {
    Clean,
    Corrected,
}

/// Resolve contacts at `frame.position` until clean or out of passes.
pub fn resolve_contacts(
    ctx: &StageContext<'_>,
    frame: &mut MoveFrame,
    respond: ResolveContactFn,
) -> ResolveOutcome {
    let max_iterations = ctx.config.max_iterations;

    for iteration in 1..=max_iterations {
        match scan(ctx, frame, respond) {
            Pass::Clean => {
                return ResolveOutcome {
                    iterations: iteration,
                    converged: true,
                }
            }
            Pass::Corrected => continue,
        }
    }

    log::debug!(
        "contact budget of {} passes exhausted at {:?}",
        max_iterations,
        frame.position
    );

    ResolveOutcome {
        iterations: max_iterations,
        converged: false,
    }
}

fn scan(ctx: &StageContext<'_>, frame: &mut MoveFrame, respond: ResolveContactFn) -> Pass {
    let volume = ctx.volume();
    let candidates = ctx
        .query
        .overlap(&volume.shape, volume.origin(frame.position), ctx.config.collision_mask);

    for handle in candidates {
        if ctx.body.is_self(handle) {
            continue;
        }

        // Earlier sub-skin floor corrections may have moved the candidate
        let Some(penetration) = ctx
            .query
            .penetration(&volume.shape, volume.origin(frame.position), handle)
        else {
            continue;
        };

        let contact = Contact {
            handle,
            normal: penetration.normal,
            depth: penetration.depth,
            contents: ctx.query.contents(handle),
        };

        if respond(ctx, frame, &contact) == ContactResponse::Resolved {
            return Pass::Corrected;
        }
    }

    Pass::Clean
}

/// Default per-contact response.
///
/// Floor contacts always ground the body and correct it vertically, but only
/// count as acted upon when deeper than the skin. Wall contacts within the
/// skin are ignored; deeper ones first try a stair step, then depenetrate
/// along the normal and slide.
pub fn respond_to_contact(
    ctx: &StageContext<'_>,
    frame: &mut MoveFrame,
    contact: &Contact,
) -> ContactResponse {
    let config = ctx.config;

    match contact.classify(config) {
        ContactKind::Floor => {
            log::trace!(
                "floor contact {:?} normal={:?} depth={:.4}",
                contact.handle,
                contact.normal,
                contact.depth
            );

            frame.land(contact.normal);
            frame.position.y += contact.normal.y * contact.depth;
            frame.velocity.y = clip_velocity(frame.velocity, contact.normal).y;

            if contact.exceeds_skin(config) {
                ContactResponse::Resolved
            } else {
                ContactResponse::Ignored
            }
        }
        ContactKind::Wall => {
            if !contact.exceeds_skin(config) {
                return ContactResponse::Ignored;
            }

            if config.stepping && frame.was_grounded && !frame.jumped {
                if let Some(step) = try_step(ctx, frame, contact) {
                    log::debug!(
                        "stepped over {:?}: {:.3} -> {:.3}",
                        contact.handle,
                        frame.position.y,
                        step.position.y
                    );
                    frame.position = step.position;
                    frame.velocity.y = clip_velocity(frame.velocity, step.normal).y;
                    frame.land(step.normal);
                    frame.stepped = true;
                    return ContactResponse::Resolved;
                }
            }

            log::trace!(
                "wall contact {:?} normal={:?} depth={:.4}",
                contact.handle,
                contact.normal,
                contact.depth
            );
            slide(config, frame, contact);
            ContactResponse::Resolved
        }
    }
}

/// Push fully out along the normal and remove the velocity into it.
///
/// Climb prevention only clamps steep or downward-facing contacts. A shallow
/// top outside the ground mask still pushes the body fully out; it just
/// does not ground it.
fn slide(config: &SolverConfig, frame: &mut MoveFrame, contact: &Contact) {
    let old_y = frame.position.y;
    let old_vy = frame.velocity.y;

    frame.position += contact.normal * contact.depth;
    frame.velocity = clip_velocity(frame.velocity, contact.normal);

    let shallow_top = contact.normal.y > 0.0 && config.is_walkable(contact.normal);
    if config.prevent_climbing && !shallow_top {
        frame.position.y = frame.position.y.min(old_y);
        frame.velocity.y = frame.velocity.y.min(old_vy);
    }
}

/// Clamp a long move to just past the first thing it would hit.
///
/// Only engages when the move is longer than the body's smallest half
/// extent, where a single overlap test could miss thin geometry entirely.
/// The clamped candidate ends two skins deep so the resolver still sees and
/// classifies the contact. Returns `true` if the candidate was clamped.
pub(crate) fn guard_tunneling(ctx: &StageContext<'_>, frame: &mut MoveFrame) -> bool {
    let config = ctx.config;
    if !config.sweep_guard {
        return false;
    }

    let travel = frame.position - frame.start;
    let distance = travel.length();
    if distance <= ctx.body.shape().half_extents.min_element() {
        return false;
    }
    let direction = travel / distance;

    let volume = ctx.volume();
    let hits = ctx.query.sweep(
        &volume.shape,
        volume.origin(frame.start),
        direction,
        distance,
        config.collision_mask,
    );

    // Zero-distance hits are shapes we already overlap and grazing hits are
    // surfaces we slide along; the resolver owns both
    let Some(hit) = hits.iter().find(|hit| {
        !ctx.body.is_self(hit.handle) && hit.distance > 0.0 && hit.normal.dot(direction) < -1e-3
    }) else {
        return false;
    };

    let clamped = (hit.distance + 2.0 * config.skin_width).min(distance);
    if clamped >= distance {
        return false;
    }

    log::trace!("sweep guard clamped move from {distance:.3} to {clamped:.3} at {:?}", hit.handle);
    frame.position = frame.start + direction * clamped;
    true
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{BoxShape, CollisionWorld, ContentFlags, ShapeHandle};
    use crate::motor::state::Body;

    fn floor_world() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        // Floor with its top at y=0
        world.add_box(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
            ContentFlags::STATIC,
        );
        world
    }

    fn body_at(position: Vec3) -> Body {
        Body::new(BoxShape::CHARACTER, position).expect("valid body")
    }

    fn resolve(
        config: &SolverConfig,
        body: &Body,
        world: &CollisionWorld,
        frame: &mut MoveFrame,
    ) -> ResolveOutcome {
        let ctx = StageContext {
            config,
            body,
            query: world,
        };
        resolve_contacts(&ctx, frame, respond_to_contact)
    }

    fn frame_at(position: Vec3, velocity: Vec3, was_grounded: bool) -> MoveFrame {
        let mut frame = MoveFrame::new(position, velocity, was_grounded, false);
        frame.position = position;
        frame
    }

    #[test]
    fn test_open_space_converges_immediately() {
        let world = floor_world();
        let config = SolverConfig::default();
        let body = body_at(Vec3::new(0.0, 5.0, 0.0));
        let mut frame = frame_at(body.position, Vec3::new(1.0, -1.0, 0.0), false);

        let outcome = resolve(&config, &body, &world, &mut frame);
        assert_eq!(outcome, ResolveOutcome { iterations: 1, converged: true });
        assert!(!frame.grounded);
        assert_eq!(frame.velocity, Vec3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_shallow_floor_contact_grounds_without_restart() {
        let world = floor_world();
        let config = SolverConfig::default();
        let body = body_at(Vec3::ZERO);

        // Padded box 3mm into the floor, within the skin
        let mut frame = frame_at(
            Vec3::new(0.0, config.contact_offset - 0.003, 0.0),
            Vec3::new(2.0, -0.5, 0.0),
            true,
        );

        let outcome = resolve(&config, &body, &world, &mut frame);
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert!(frame.grounded);
        assert!((frame.ground_normal - Vec3::Y).length() < 1e-3);
        assert!((frame.position.y - config.contact_offset).abs() < 1e-4, "y={}", frame.position.y);
        assert!(frame.velocity.y.abs() < 1e-4);
        assert_eq!(frame.velocity.x, 2.0);
    }

    #[test]
    fn test_deep_floor_contact_is_resolved() {
        let world = floor_world();
        let config = SolverConfig::default();
        let body = body_at(Vec3::ZERO);
        let mut frame = frame_at(Vec3::new(0.0, -0.2, 0.0), Vec3::new(0.0, -5.0, 0.0), false);

        let outcome = resolve(&config, &body, &world, &mut frame);
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 2);
        assert!(frame.grounded);
        assert!((frame.position.y - config.contact_offset).abs() < 1e-3, "y={}", frame.position.y);
    }

    #[test]
    fn test_wall_contact_slides_and_does_not_climb() {
        let mut world = floor_world();
        // Wall face at x=1
        world.add_box(Vec3::new(1.5, 2.0, 0.0), Vec3::new(0.5, 2.0, 5.0), ContentFlags::STATIC);

        let config = SolverConfig {
            stepping: false,
            ..Default::default()
        };
        let body = body_at(Vec3::ZERO);
        let start_y = config.contact_offset;
        // Padded front face at x=1.105, 10cm into the wall
        let mut frame = frame_at(Vec3::new(0.7, start_y, 0.0), Vec3::new(5.0, 0.0, 3.0), true);

        let outcome = resolve(&config, &body, &world, &mut frame);
        assert!(outcome.converged);
        assert!((frame.position.x - 0.595).abs() < 1e-3, "x={}", frame.position.x);
        assert!(frame.position.y <= start_y + 1e-5);
        assert!(frame.velocity.x.abs() < 1e-4);
        assert_eq!(frame.velocity.z, 3.0);
    }

    #[test]
    fn test_shallow_wall_contact_is_ignored() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(1.5, 2.0, 0.0), Vec3::new(0.5, 2.0, 5.0), ContentFlags::STATIC);

        let config = SolverConfig::default();
        let body = body_at(Vec3::ZERO);
        // 5mm into the wall, below the 1cm skin
        let mut frame = frame_at(Vec3::new(0.6, 0.5, 0.0), Vec3::new(1.0, 0.0, 0.0), false);

        let outcome = resolve(&config, &body, &world, &mut frame);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(frame.position, Vec3::new(0.6, 0.5, 0.0));
        assert_eq!(frame.velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_corner_converges_before_budget() {
        let mut world = floor_world();
        // Two walls standing on the floor, meeting at the x=1 / z=1 corner
        world.add_box(Vec3::new(1.5, 1.5, 0.0), Vec3::new(0.5, 1.5, 1.0), ContentFlags::STATIC);
        world.add_box(Vec3::new(-0.5, 1.5, 1.5), Vec3::new(1.5, 1.5, 0.5), ContentFlags::STATIC);

        let config = SolverConfig {
            stepping: false,
            ..Default::default()
        };
        let body = body_at(Vec3::ZERO);
        // 5cm into both walls and the floor
        let mut frame = frame_at(Vec3::new(0.645, -0.045, 0.645), Vec3::new(1.0, -1.0, 1.0), false);

        let outcome = resolve(&config, &body, &world, &mut frame);
        assert!(outcome.converged, "corner must converge");
        assert!(outcome.iterations <= 4, "iterations={}", outcome.iterations);
        assert!(outcome.iterations < config.max_iterations);

        assert!((frame.position.x - 0.595).abs() < 1e-3, "x={}", frame.position.x);
        assert!((frame.position.z - 0.595).abs() < 1e-3, "z={}", frame.position.z);
        assert!((frame.position.y - config.contact_offset).abs() < 1e-3, "y={}", frame.position.y);
        assert!(frame.grounded);
        assert!(frame.velocity.x.abs() < 1e-4 && frame.velocity.z.abs() < 1e-4);
    }

    #[test]
    fn test_exhausted_budget_accepts_last_candidate() {
        let mut world = floor_world();
        world.add_box(Vec3::new(1.5, 1.5, 0.0), Vec3::new(0.5, 1.5, 5.0), ContentFlags::STATIC);

        let config = SolverConfig {
            max_iterations: 1,
            stepping: false,
            ..Default::default()
        };
        let body = body_at(Vec3::ZERO);
        let mut frame = frame_at(Vec3::new(0.7, -0.1, 0.0), Vec3::ZERO, false);

        let outcome = resolve(&config, &body, &world, &mut frame);
        assert_eq!(outcome, ResolveOutcome { iterations: 1, converged: false });
        // One correction happened, the rest is left as-is
        assert_ne!(frame.position, Vec3::new(0.7, -0.1, 0.0));
    }

    #[test]
    fn test_self_shape_is_skipped() {
        let mut world = CollisionWorld::new();
        let shape = BoxShape::CHARACTER;
        let handle = world.add_body(&shape, Vec3::new(0.0, 3.0, 0.0));

        let config = SolverConfig::default();
        let body = body_at(Vec3::new(0.0, 3.0, 0.0)).with_handle(handle);
        let mut frame = frame_at(body.position, Vec3::ZERO, false);

        let outcome = resolve(&config, &body, &world, &mut frame);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(frame.position, body.position);

        // Without the self filter the body collides with its own box
        let stranger = body_at(body.position);
        let mut frame = frame_at(stranger.position, Vec3::ZERO, false);
        let outcome = resolve(&config, &stranger, &world, &mut frame);
        assert!(outcome.iterations > 1);
    }

    #[test]
    fn test_triggers_never_block() {
        let mut world = CollisionWorld::new();
        world.add_box(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(2.0), ContentFlags::TRIGGER);

        let config = SolverConfig::default();
        let body = body_at(Vec3::ZERO);
        let mut frame = frame_at(Vec3::new(0.3, 0.2, 0.0), Vec3::X, false);

        let outcome = resolve(&config, &body, &world, &mut frame);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(frame.position, Vec3::new(0.3, 0.2, 0.0));
    }

    #[test]
    fn test_steep_slope_is_wall() {
        let world = CollisionWorld::new();
        let (sin, cos) = 80f32.to_radians().sin_cos();

        let config = SolverConfig {
            max_ground_angle: 60.0,
            stepping: false,
            ..Default::default()
        };
        let body = body_at(Vec3::ZERO);
        let ctx = StageContext {
            config: &config,
            body: &body,
            query: &world,
        };
        let contact = Contact {
            handle: ShapeHandle(0),
            // 80 degrees from up, facing -X
            normal: Vec3::new(-sin, cos, 0.0),
            depth: 0.05,
            contents: ContentFlags::STATIC,
        };
        assert_eq!(contact.classify(&config), ContactKind::Wall);

        let mut frame = frame_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 0.0, 0.0), true);
        let response = respond_to_contact(&ctx, &mut frame, &contact);
        assert_eq!(response, ContactResponse::Resolved);
        assert!(!frame.grounded);
        // Climb prevention keeps the body from being lifted up the slope
        assert!(frame.position.y <= 1.0);
        assert!(frame.velocity.y <= 0.0);
    }

    #[test]
    fn test_non_ground_top_pushes_out_without_grounding() {
        let mut world = CollisionWorld::new();
        // Solid crate, top at y=1, not in the ground mask
        world.add_box(Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 0.5, 1.0), ContentFlags::SOLID);

        let config = SolverConfig::default();
        assert!(config.prevent_climbing);
        let body = body_at(Vec3::ZERO);

        // Padded box 5cm into the crate top, falling
        let rest = 1.0 + config.contact_offset;
        let start = Vec3::new(0.0, rest - 0.05, 0.0);
        let mut frame = frame_at(start, Vec3::new(1.0, -3.0, 0.0), false);

        let outcome = resolve(&config, &body, &world, &mut frame);
        assert!(outcome.converged, "{outcome:?}");
        assert!((frame.position.y - rest).abs() < 1e-3, "y={}", frame.position.y);
        assert!(frame.velocity.y.abs() < 1e-5, "vy={}", frame.velocity.y);
        assert_eq!(frame.velocity.x, 1.0);
        assert!(!frame.grounded);
    }

    #[test]
    fn test_sweep_guard_stops_tunneling() {
        let mut world = CollisionWorld::new();
        // 10cm thick slab, top at y=0
        world.add_box(Vec3::new(0.0, -0.05, 0.0), Vec3::new(5.0, 0.05, 5.0), ContentFlags::STATIC);

        let config = SolverConfig::default();
        let body = Body::new(BoxShape::new(Vec3::splat(0.1)), Vec3::ZERO).expect("valid body");
        let ctx = StageContext {
            config: &config,
            body: &body,
            query: &world,
        };

        let start = Vec3::new(0.0, 0.3, 0.0);
        let mut frame = MoveFrame::new(start, Vec3::new(0.0, -40.0, 0.0), false, false);
        frame.position = start + Vec3::new(0.0, -0.7, 0.0);

        assert!(guard_tunneling(&ctx, &mut frame));
        // Clamped to just inside the slab
        assert!(frame.position.y < config.contact_offset);
        assert!(frame.position.y > -0.05);

        let outcome = resolve_contacts(&ctx, &mut frame, respond_to_contact);
        assert!(outcome.converged);
        assert!(frame.grounded);
        assert!((frame.position.y - config.contact_offset).abs() < 1e-3, "y={}", frame.position.y);
    }

    #[test]
    fn test_sweep_guard_ignores_short_moves() {
        let world = floor_world();
        let config = SolverConfig::default();
        let body = body_at(Vec3::ZERO);
        let ctx = StageContext {
            config: &config,
            body: &body,
            query: &world,
        };

        let mut frame = MoveFrame::new(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, false, false);
        frame.position = Vec3::new(0.1, 0.95, 0.0);
        assert!(!guard_tunneling(&ctx, &mut frame));
        assert_eq!(frame.position, Vec3::new(0.1, 0.95, 0.0));
    }
}
