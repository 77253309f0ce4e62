//! Motion nodes: integration, forces, velocity limits and collisions.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::NodeUpdate;
use crate::context::{map2, map2x2, map3, UpdateContext};
use crate::memory::PinBinding;
use crate::physics::PhysicsWorld;

/// Fraction of the way to a hit point a bouncing particle is moved.
///
/// Stopping short of the surface keeps the next raycast from starting
/// behind it.
pub const DEFAULT_BOUNCE_HIT_FRACTION: f32 = 0.99;

/// `position + velocity * dt`
#[derive(Clone, Debug)]
pub struct MoveInstance {
    position: PinBinding,
    velocity: PinBinding,
    out: PinBinding,
}

impl MoveInstance {
    pub fn new(position: PinBinding, velocity: PinBinding, out: PinBinding) -> Self {
        Self {
            position,
            velocity,
            out,
        }
    }
}

impl NodeUpdate for MoveInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let dt = ctx.time_step();
        map2(ctx, &self.position, &self.velocity, &self.out, |p: &Vec3, v: &Vec3| {
            *p + *v * dt
        });
    }
}

/// `velocity + force * dt`
#[derive(Clone, Debug)]
pub struct ApplyForceInstance {
    velocity: PinBinding,
    force: PinBinding,
    out: PinBinding,
}

impl ApplyForceInstance {
    pub fn new(velocity: PinBinding, force: PinBinding, out: PinBinding) -> Self {
        Self {
            velocity,
            force,
            out,
        }
    }
}

impl NodeUpdate for ApplyForceInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let dt = ctx.time_step();
        map2(ctx, &self.velocity, &self.force, &self.out, |v: &Vec3, f: &Vec3| {
            *v + *f * dt
        });
    }
}

/// Damp `velocity` toward a speed of `limit`.
///
/// Only applies when the speed exceeds the limit. Zero damping or a zero
/// time step return the velocity unchanged.
pub fn limit_velocity(velocity: Vec3, limit: f32, dampen: f32, dt: f32) -> Vec3 {
    let speed = velocity.length();
    if speed <= limit || dampen <= 0.0 || dt <= 0.0 {
        return velocity;
    }
    let t = 1.0 - (1.0 - dampen.min(1.0)).powf(20.0 * dt);
    let target = velocity * (limit.max(0.0) / speed);
    velocity.lerp(target, t)
}

#[derive(Clone, Debug)]
pub struct LimitVelocityInstance {
    velocity: PinBinding,
    limit: PinBinding,
    dampen: PinBinding,
    out: PinBinding,
}

impl LimitVelocityInstance {
    pub fn new(velocity: PinBinding, limit: PinBinding, dampen: PinBinding, out: PinBinding) -> Self {
        Self {
            velocity,
            limit,
            dampen,
            out,
        }
    }
}

impl NodeUpdate for LimitVelocityInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let dt = ctx.time_step();
        map3(
            ctx,
            &self.velocity,
            &self.limit,
            &self.dampen,
            &self.out,
            |v: &Vec3, limit: &f32, dampen: &f32| limit_velocity(*v, *limit, *dampen, dt),
        );
    }
}

/// Bounce node settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounce {
    /// Restitution: 1 reflects fully, 0 removes the normal component.
    pub bounce_factor: f32,
    pub hit_fraction: f32,
}

impl Default for Bounce {
    fn default() -> Self {
        Self {
            bounce_factor: 1.0,
            hit_fraction: DEFAULT_BOUNCE_HIT_FRACTION,
        }
    }
}

impl Bounce {
    pub fn new(bounce_factor: f32) -> Self {
        Self {
            bounce_factor,
            ..Default::default()
        }
    }

    /// One integration step against `world`.
    pub fn step(
        &self,
        world: Option<&dyn PhysicsWorld>,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
    ) -> (Vec3, Vec3) {
        let Some(world) = world else {
            return (position + velocity * dt, velocity);
        };

        let velocity = velocity + world.gravity() * dt;
        let motion = velocity * dt;
        let distance = motion.length();
        if distance <= f32::EPSILON {
            return (position + motion, velocity);
        }

        match world.raycast(position, motion / distance, distance) {
            Some(hit) => {
                let position = position + (hit.position - position) * self.hit_fraction;
                let n = hit.normal;
                let velocity = velocity - (1.0 + self.bounce_factor) * velocity.dot(n) * n;
                (position, velocity)
            }
            None => (position + motion, velocity),
        }
    }
}

/// Integrates and collides particles with the layer's physics world.
#[derive(Clone, Debug)]
pub struct BounceInstance {
    settings: Bounce,
    /// position in, velocity in, position out, velocity out
    pins: [PinBinding; 4],
}

impl BounceInstance {
    pub fn new(settings: Bounce, pins: [PinBinding; 4]) -> Self {
        Self { settings, pins }
    }
}

impl NodeUpdate for BounceInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let dt = ctx.time_step();
        let world = ctx.physics();
        let settings = &self.settings;
        let [position, velocity, position_out, velocity_out] = &self.pins;
        map2x2(
            ctx,
            position,
            velocity,
            position_out,
            velocity_out,
            |p: &Vec3, v: &Vec3| settings.step(world, *p, *v, dt),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PlaneWorld;

    #[test]
    fn test_limit_velocity_below_limit() {
        let v = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(limit_velocity(v, 2.0, 0.5, 0.1), v);
    }

    #[test]
    fn test_limit_velocity_passthrough() {
        let v = Vec3::new(10.0, 0.0, 0.0);
        assert_eq!(limit_velocity(v, 1.0, 0.0, 0.1), v);
        assert_eq!(limit_velocity(v, 1.0, 0.5, 0.0), v);
    }

    #[test]
    fn test_limit_velocity_damps() {
        let v = Vec3::new(10.0, 0.0, 0.0);
        let limited = limit_velocity(v, 1.0, 0.5, 0.1);
        // t = 1 - 0.5^2 = 0.75
        assert!((limited.x - (10.0 + (1.0 - 10.0) * 0.75)).abs() < 1e-4);

        let full = limit_velocity(v, 1.0, 1.0, 0.1);
        assert!((full.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_bounce_reflects() {
        let world = PlaneWorld::new(Vec3::ZERO).with_plane(Vec3::NEG_X, Vec3::new(1.0, 0.0, 0.0));
        let (p, v) = Bounce::new(1.0).step(Some(&world), Vec3::ZERO, Vec3::X, 1.0);
        assert!((p.x - 0.99).abs() < 1e-5);
        assert!((v.x + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_bounce_without_hit() {
        let world = PlaneWorld::new(Vec3::new(0.0, -10.0, 0.0));
        let (p, v) = Bounce::default().step(Some(&world), Vec3::ZERO, Vec3::ZERO, 0.5);
        assert_eq!(v, Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(p, Vec3::new(0.0, -2.5, 0.0));
    }

    #[test]
    fn test_bounce_without_world_integrates() {
        let (p, v) = Bounce::default().step(None, Vec3::ONE, Vec3::X, 2.0);
        assert_eq!(p, Vec3::new(3.0, 1.0, 1.0));
        assert_eq!(v, Vec3::X);
    }
}
