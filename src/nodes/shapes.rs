//! Shape emitter nodes.
//!
//! Each shape samples a canonical local shape, then moves the sample through
//! its [`ShapeTransform`]. Positions get the full matrix; directions only
//! the rotation and scale part.
//!
//! | Shape | Local frame |
//! |-------|-------------|
//! | Sphere | centered at origin |
//! | Cone | base on the XZ plane, opening along +Y |
//! | Circle | XZ plane, directions point outward |
//! | Box | centered at origin, `size` is the full extent |

use glam::{Mat4, Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::NodeUpdate;
use crate::container::{with_writer, ContainerWrite};
use crate::context::UpdateContext;
use crate::memory::PinBinding;
use crate::spawn::{random_direction, random_in_annulus, random_in_box, random_in_shell, random_on_box};

/// Local translation, rotation and scale of a shape.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for ShapeTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl ShapeTransform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Map a local position and direction into the node's frame.
    pub fn apply(&self, position: Vec3, direction: Vec3) -> (Vec3, Vec3) {
        let m = self.matrix();
        (
            m.transform_point3(position),
            m.transform_vector3(direction).normalize_or_zero(),
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmitFrom {
    #[default]
    Volume,
    Surface,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConeEmitFrom {
    #[default]
    Base,
    Volume,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereShape {
    pub radius: f32,
    /// Fraction of the radius sampled when emitting from the volume.
    pub radius_thickness: f32,
    pub emit_from: EmitFrom,
    pub transform: ShapeTransform,
}

impl Default for SphereShape {
    fn default() -> Self {
        Self {
            radius: 1.0,
            radius_thickness: 1.0,
            emit_from: EmitFrom::Volume,
            transform: ShapeTransform::default(),
        }
    }
}

impl SphereShape {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    fn sample_local<R: Rng>(&self, rng: &mut R) -> (Vec3, Vec3) {
        let thickness = match self.emit_from {
            EmitFrom::Volume => self.radius_thickness,
            EmitFrom::Surface => 0.0,
        };
        let position = random_in_shell(rng, self.radius, thickness);
        let direction = match position.try_normalize() {
            Some(d) => d,
            None => random_direction(rng),
        };
        (position, direction)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConeShape {
    pub radius: f32,
    pub radius_thickness: f32,
    /// Opening half-angle in degrees.
    pub angle: f32,
    pub length: f32,
    pub emit_from: ConeEmitFrom,
    pub transform: ShapeTransform,
}

impl Default for ConeShape {
    fn default() -> Self {
        Self {
            radius: 1.0,
            radius_thickness: 1.0,
            angle: 30.0,
            length: 1.0,
            emit_from: ConeEmitFrom::Base,
            transform: ShapeTransform::default(),
        }
    }
}

impl ConeShape {
    pub fn new(radius: f32, angle: f32) -> Self {
        Self {
            radius,
            angle,
            ..Default::default()
        }
    }

    fn sample_local<R: Rng>(&self, rng: &mut R) -> (Vec3, Vec3) {
        let base = random_in_annulus(rng, self.radius, self.radius_thickness);
        let spread = if self.radius > 0.0 { base / self.radius } else { base };
        let tan = self.angle.clamp(0.0, 89.9).to_radians().tan();
        let direction = Vec3::new(spread.x * tan, 1.0, spread.y * tan).normalize();
        let mut position = Vec3::new(base.x, 0.0, base.y);
        if self.emit_from == ConeEmitFrom::Volume {
            position += direction * rng.gen_range(0.0..=self.length.max(0.0));
        }
        (position, direction)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleShape {
    pub radius: f32,
    pub radius_thickness: f32,
    pub transform: ShapeTransform,
}

impl Default for CircleShape {
    fn default() -> Self {
        Self {
            radius: 1.0,
            radius_thickness: 1.0,
            transform: ShapeTransform::default(),
        }
    }
}

impl CircleShape {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    fn sample_local<R: Rng>(&self, rng: &mut R) -> (Vec3, Vec3) {
        let p = random_in_annulus(rng, self.radius, self.radius_thickness);
        let position = Vec3::new(p.x, 0.0, p.y);
        let direction = match position.try_normalize() {
            Some(d) => d,
            None => {
                let d = random_direction(rng);
                Vec3::new(d.x, 0.0, d.z).normalize_or_zero()
            }
        };
        (position, direction)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxShape {
    pub size: Vec3,
    pub emit_from: EmitFrom,
    pub transform: ShapeTransform,
}

impl Default for BoxShape {
    fn default() -> Self {
        Self {
            size: Vec3::ONE,
            emit_from: EmitFrom::Volume,
            transform: ShapeTransform::default(),
        }
    }
}

impl BoxShape {
    pub fn new(size: Vec3) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    fn sample_local<R: Rng>(&self, rng: &mut R) -> (Vec3, Vec3) {
        let half = self.size.abs() * 0.5;
        match self.emit_from {
            EmitFrom::Volume => (random_in_box(rng, half), Vec3::Y),
            EmitFrom::Surface => random_on_box(rng, half),
        }
    }
}

/// Any emitter shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere(SphereShape),
    Cone(ConeShape),
    Circle(CircleShape),
    Box(BoxShape),
}

impl Shape {
    /// Random `(position, direction)` in the shape's transformed frame.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> (Vec3, Vec3) {
        let ((position, direction), transform) = match self {
            Shape::Sphere(s) => (s.sample_local(rng), &s.transform),
            Shape::Cone(s) => (s.sample_local(rng), &s.transform),
            Shape::Circle(s) => (s.sample_local(rng), &s.transform),
            Shape::Box(s) => (s.sample_local(rng), &s.transform),
        };
        transform.apply(position, direction)
    }
}

/// Writes one shape sample per particle to its position and velocity pins.
#[derive(Clone, Debug)]
pub struct ShapeInstance {
    shape: Shape,
    position: PinBinding,
    velocity: PinBinding,
}

impl ShapeInstance {
    pub fn new(shape: Shape, position: PinBinding, velocity: PinBinding) -> Self {
        Self {
            shape,
            position,
            velocity,
        }
    }
}

impl NodeUpdate for ShapeInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let n = ctx.loop_len(&self.position).max(ctx.loop_len(&self.velocity));
        let samples: Vec<(Vec3, Vec3)> = (0..n).map(|_| self.shape.sample(ctx.rng())).collect();

        let mut positions = ctx.take_output::<Vec3>(&self.position);
        let mut velocities = ctx.take_output::<Vec3>(&self.velocity);
        {
            let indices = ctx.indices();
            let wp = positions.writer(indices);
            let wv = velocities.writer(indices);
            with_writer!(wp, |wp| with_writer!(wv, |wv| {
                for (i, (p, d)) in samples.iter().enumerate() {
                    wp.set(i, *p);
                    wv.set(i, *d);
                }
            }));
        }
        ctx.restore_output(velocities);
        ctx.restore_output(positions);
    }
}
