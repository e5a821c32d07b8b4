//! Stair stepping.
//!
//! When a grounded body runs into a wall contact, the obstacle may be a step
//! low enough to climb. The body is lifted by the step height, checked for
//! headroom there, and dropped back down onto the obstacle.

use glam::Vec3;

use super::adhesion::probe_ground;
use super::contact::Contact;
use super::pipeline::{MoveFrame, StageContext};

/// A committed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// Where the body lands on top of the step.
    pub position: Vec3,

    /// Ground normal at the landing point.
    pub normal: Vec3,
}

/// Try to climb the obstacle behind `contact`.
///
/// Returns `None` when there is no headroom at the raised position, when the
/// obstacle has no walkable top within reach, or when landing on it would not
/// raise the body.
pub fn try_step(
    ctx: &StageContext<'_>,
    frame: &MoveFrame,
    contact: &Contact,
) -> Option<StepResult> {
    let config = ctx.config;
    if config.step_height <= 0.0 {
        return None;
    }

    let raised = frame.position + Vec3::new(0.0, config.step_height, 0.0);

    if !has_headroom(ctx, raised) {
        log::trace!("step over {:?} rejected: no headroom", contact.handle);
        return None;
    }

    let reach = config.step_height + config.adhesion_distance;
    let Some(ground) = probe_ground(ctx, raised, reach, Some(contact.handle)) else {
        log::trace!("step over {:?} rejected: no walkable top", contact.handle);
        return None;
    };

    let position = raised - Vec3::new(0.0, ground.distance, 0.0);
    if position.y <= frame.position.y {
        return None;
    }

    Some(StepResult {
        position,
        normal: ground.normal,
    })
}

/// Nothing overlaps the body deeper than the skin at `position`.
fn has_headroom(ctx: &StageContext<'_>, position: Vec3) -> bool {
    let volume = ctx.volume();
    let origin = volume.origin(position);

    ctx.query
        .overlap(&volume.shape, origin, ctx.config.collision_mask)
        .into_iter()
        .filter(|&handle| !ctx.body.is_self(handle))
        .all(|handle| {
            ctx.query
                .penetration(&volume.shape, origin, handle)
                .map_or(true, |pen| pen.depth <= ctx.config.skin_width)
        })
}

// ============================================================================
// Tests
// ============================================================================
