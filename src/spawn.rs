//! Random sampling helpers for shape emitters.
//!
//! All helpers take the layer's RNG so a seeded layer reproduces the same
//! particles run after run.
//!
//! ```ignore
//! let mut rng = SmallRng::seed_from_u64(1);
//! let p = random_in_shell(&mut rng, 0.5, 1.0);
//! let d = random_direction(&mut rng);
//! ```

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;

// ========== Sphere ==========

/// Random unit vector (uniformly distributed on the unit sphere).
pub fn random_direction<R: Rng>(rng: &mut R) -> Vec3 {
    // Uniform z and azimuth give a uniform sphere.
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Random point in a spherical shell.
///
/// `thickness` is the shell depth as a fraction of `radius`: 0 samples the
/// surface, 1 the whole volume.
pub fn random_in_shell<R: Rng>(rng: &mut R, radius: f32, thickness: f32) -> Vec3 {
    let inner = (1.0 - thickness.clamp(0.0, 1.0)).powi(3);
    // Cube root for uniform volume distribution
    let r = radius * rng.gen_range(inner..=1.0f32).cbrt();
    random_direction(rng) * r
}

// ========== Disk / ring ==========

/// Random point in an annulus in the XZ plane, as (x, z).
///
/// `thickness` works like [`random_in_shell`].
pub fn random_in_annulus<R: Rng>(rng: &mut R, radius: f32, thickness: f32) -> Vec2 {
    let inner = (1.0 - thickness.clamp(0.0, 1.0)).powi(2);
    let theta = rng.gen_range(0.0..TAU);
    // sqrt for uniform disk
    let r = radius * rng.gen_range(inner..=1.0f32).sqrt();
    Vec2::new(r * theta.cos(), r * theta.sin())
}

// ========== Box ==========

/// Random point inside a box of given half extents, centered at origin.
pub fn random_in_box<R: Rng>(rng: &mut R, half: Vec3) -> Vec3 {
    Vec3::new(
        rng.gen_range(-1.0..=1.0f32) * half.x,
        rng.gen_range(-1.0..=1.0f32) * half.y,
        rng.gen_range(-1.0..=1.0f32) * half.z,
    )
}

/// Random point on the surface of a box, with the outward face normal.
///
/// Faces are picked proportionally to their area.
pub fn random_on_box<R: Rng>(rng: &mut R, half: Vec3) -> (Vec3, Vec3) {
    let areas = [half.y * half.z, half.x * half.z, half.x * half.y];
    let total: f32 = areas.iter().sum();
    let mut p = random_in_box(rng, half);
    if total <= 0.0 {
        return (p, Vec3::Y);
    }
    let mut pick = rng.gen_range(0.0..total);
    let mut axis = 2;
    for (i, area) in areas.iter().enumerate() {
        if pick < *area {
            axis = i;
            break;
        }
        pick -= area;
    }
    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let mut normal = Vec3::ZERO;
    p[axis] = half[axis] * sign;
    normal[axis] = sign;
    (p, normal)
}
