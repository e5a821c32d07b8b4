//! Velocity integration.
//!
//! Turns the move wish, jump decision and tick duration into the velocity the
//! body tries to move with this tick. Pure: gravity and the jump impulse are
//! applied exactly once, by the caller invoking [`integrate`] once per tick.

use glam::Vec3;

use super::config::SolverConfig;
use super::contact::clip_velocity;

/// Everything the integrator reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrateInput {
    pub velocity: Vec3,

    /// Desired direction, at most unit length.
    pub move_wish: Vec3,

    /// A jump request is pending and off cooldown.
    pub jump_requested: bool,

    pub was_grounded: bool,

    /// Ground normal from the previous tick. Only read when `was_grounded`.
    pub ground_normal: Vec3,

    pub dt: f32,
}

/// Integrator output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integration {
    pub velocity: Vec3,

    /// The jump impulse was applied this tick.
    pub jumped: bool,
}

/// Integrate one tick of player forces.
///
/// Order: friction, acceleration, jump, ground projection, gravity.
pub fn integrate(config: &SolverConfig, input: &IntegrateInput) -> Integration {
    let dt = input.dt;
    let jumped = input.jump_requested && input.was_grounded;
    let grounded = input.was_grounded && !jumped;

    let (acceleration, friction) = config.movement_params(grounded);

    let mut velocity = apply_friction(input.velocity, friction, dt);
    velocity = accelerate(
        velocity,
        input.move_wish.clamp_length_max(1.0),
        acceleration,
        config.max_speed,
        dt,
    );

    if jumped {
        velocity.y = config.jump_speed();
    }

    // Follow the slope we stood on last tick instead of the horizontal plane
    if grounded && config.project_on_ground {
        if let Some(normal) = input.ground_normal.try_normalize() {
            velocity = clip_velocity(velocity, normal);
        }
    }

    velocity += config.effective_gravity() * dt;

    Integration { velocity, jumped }
}

/// Scale the horizontal speed down by `friction * dt` of itself.
///
/// The vertical component is untouched. Never reverses direction.
pub fn apply_friction(velocity: Vec3, friction: f32, dt: f32) -> Vec3 {
    let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
    let speed = horizontal.length();
    if speed == 0.0 {
        return velocity;
    }

    let drop = speed * friction * dt;
    let scale = (speed - drop).max(0.0) / speed;
    let horizontal = horizontal * scale;

    Vec3::new(horizontal.x, velocity.y, horizontal.z)
}

/// Accelerate along `wish`, clamping the speed projected onto it to `max_speed`.
///
/// When the projected speed already exceeds `max_speed`, only the aligned
/// component is slowed down.
pub fn accelerate(velocity: Vec3, wish: Vec3, acceleration: f32, max_speed: f32, dt: f32) -> Vec3 {
    if wish.length_squared() == 0.0 {
        return velocity;
    }

    let projected = velocity.dot(wish);
    let mut amount = acceleration * dt;
    if projected + amount > max_speed {
        amount = max_speed - projected;
    }

    velocity + wish * amount
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::JumpImpulse;

    const DT: f32 = 1.0 / 60.0;

    fn input(velocity: Vec3) -> IntegrateInput {
        IntegrateInput {
            velocity,
            move_wish: Vec3::ZERO,
            jump_requested: false,
            was_grounded: true,
            ground_normal: Vec3::Y,
            dt: DT,
        }
    }

    fn no_gravity() -> SolverConfig {
        SolverConfig {
            use_gravity: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_friction_only_touches_horizontal() {
        let v = apply_friction(Vec3::new(10.0, -3.0, 0.0), 6.0, 0.1);
        // 10 - 10 * 6 * 0.1 = 4
        assert!((v.x - 4.0).abs() < 1e-5);
        assert_eq!(v.y, -3.0);
        assert_eq!(v.z, 0.0);
    }

    #[test]
    fn test_friction_zero_speed_is_noop() {
        let v = apply_friction(Vec3::new(0.0, 2.0, 0.0), 12.0, DT);
        assert_eq!(v, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_friction_monotonic_and_never_reverses() {
        for friction in [0.5_f32, 3.0, 12.0, 100.0] {
            for speed in [0.01_f32, 0.5, 4.0, 8.0, 40.0] {
                let before = Vec3::new(speed * 0.6, 0.0, -speed * 0.8);
                let after = apply_friction(before, friction, DT);
                let after_speed = Vec3::new(after.x, 0.0, after.z).length();

                assert!(after_speed <= speed + 1e-6, "friction {friction} sped up {speed}");
                // Same direction or stopped, never reversed
                assert!(after.x * before.x >= 0.0);
                assert!(after.z * before.z >= 0.0);
            }
        }
    }

    #[test]
    fn test_integrate_zero_input_slows_down() {
        let config = no_gravity();
        for grounded in [true, false] {
            let mut i = input(Vec3::new(5.0, 0.0, 0.0));
            i.was_grounded = grounded;
            let out = integrate(&config, &i);
            assert!(out.velocity.x < 5.0 && out.velocity.x >= 0.0);
        }
    }

    #[test]
    fn test_accelerate_clamps_to_max_speed() {
        let v = accelerate(Vec3::new(7.9, 0.0, 0.0), Vec3::X, 200.0, 8.0, DT);
        assert!((v.x - 8.0).abs() < 1e-5);

        // From rest, limited by acceleration
        let v = accelerate(Vec3::ZERO, Vec3::X, 12.0, 8.0, 0.1);
        assert!((v.x - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_accelerate_over_max_slows_aligned_component_only() {
        let v = accelerate(Vec3::new(10.0, 0.0, 3.0), Vec3::X, 50.0, 8.0, DT);
        assert!((v.x - 8.0).abs() < 1e-5);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_accelerate_without_wish_is_noop() {
        let v = accelerate(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, 200.0, 8.0, DT);
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_oversized_wish_is_clamped() {
        let config = no_gravity();
        let mut i = input(Vec3::ZERO);
        i.move_wish = Vec3::new(10.0, 0.0, 0.0);
        let out = integrate(&config, &i);
        // One tick of ground acceleration along a unit wish
        assert!((out.velocity.x - config.ground_acceleration * DT).abs() < 1e-4);
    }

    #[test]
    fn test_jump_sets_vertical_speed_when_grounded() {
        let config = SolverConfig {
            jump: JumpImpulse::Speed(6.0),
            ..no_gravity()
        };
        let mut i = input(Vec3::new(0.0, -1.0, 0.0));
        i.jump_requested = true;

        let out = integrate(&config, &i);
        assert!(out.jumped);
        assert_eq!(out.velocity.y, 6.0);
    }

    #[test]
    fn test_no_jump_while_airborne() {
        let config = SolverConfig::default();
        let mut i = input(Vec3::ZERO);
        i.jump_requested = true;
        i.was_grounded = false;

        let out = integrate(&config, &i);
        assert!(!out.jumped);
        assert!(out.velocity.y < 0.0, "only gravity applies");
    }

    #[test]
    fn test_jump_tick_uses_air_parameters() {
        let config = SolverConfig {
            ground_friction: 12.0,
            air_friction: 0.0,
            ..no_gravity()
        };
        let mut i = input(Vec3::new(4.0, 0.0, 0.0));
        i.jump_requested = true;

        let out = integrate(&config, &i);
        assert!(out.jumped);
        assert_eq!(out.velocity.x, 4.0);
    }

    #[test]
    fn test_gravity_applied_once() {
        let config = SolverConfig::default();
        let mut i = input(Vec3::ZERO);
        i.was_grounded = false;

        let out = integrate(&config, &i);
        let expected = config.effective_gravity().y * DT;
        assert!((out.velocity.y - expected).abs() < 1e-6);
    }

    #[test]
    fn test_ground_projection_follows_slope() {
        let config = no_gravity();
        let slope = Vec3::new(-1.0, 1.0, 0.0).normalize();
        let mut i = input(Vec3::new(4.0, 0.0, 0.0));
        i.ground_normal = slope;

        let out = integrate(&config, &i);
        // Moving into the uphill slope gains a vertical component along it
        assert!(out.velocity.y > 0.0);
        assert!(out.velocity.dot(slope).abs() < 1e-5);
    }

    #[test]
    fn test_projection_skipped_when_airborne() {
        let config = no_gravity();
        let mut i = input(Vec3::new(4.0, 0.0, 0.0));
        i.was_grounded = false;
        i.ground_normal = Vec3::new(-1.0, 1.0, 0.0).normalize();

        let out = integrate(&config, &i);
        assert_eq!(out.velocity.y, 0.0);
    }
}
