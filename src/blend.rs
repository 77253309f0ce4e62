//! Numeric blending across value types.
//!
//! The blend algorithm depends on the value type:
//!
//! | Type | Blend |
//! |------|-------|
//! | `f32`, `f64`, vectors, [`Color`] | linear interpolation |
//! | [`Quat`] | spherical interpolation (`slerp`) |
//! | matrices | component-wise linear interpolation |
//! | `i32`, `i64` | linear interpolation, rounded to nearest |
//! | `bool`, `String` | step: `a` below `t = 0.5`, `b` from there on |
//!
//! Curves and the Lerp node share this table so that a quaternion is never
//! blended linearly by one and spherically by the other.

use glam::{Affine3A, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

use crate::value::{dispatch_value_type, Color, PinValue, Value};

/// Interpolation between two values of the same type.
pub trait Blend: Sized {
    /// Blend from `self` (at `t = 0`) to `other` (at `t = 1`).
    fn blend(&self, other: &Self, t: f32) -> Self;
}

impl Blend for f32 {
    #[inline]
    fn blend(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Blend for f64 {
    #[inline]
    fn blend(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t as f64
    }
}

impl Blend for i32 {
    #[inline]
    fn blend(&self, other: &Self, t: f32) -> Self {
        (*self as f64).blend(&(*other as f64), t).round() as i32
    }
}

impl Blend for i64 {
    #[inline]
    fn blend(&self, other: &Self, t: f32) -> Self {
        (*self as f64).blend(&(*other as f64), t).round() as i64
    }
}

impl Blend for bool {
    #[inline]
    fn blend(&self, other: &Self, t: f32) -> Self {
        if t < 0.5 {
            *self
        } else {
            *other
        }
    }
}

impl Blend for String {
    fn blend(&self, other: &Self, t: f32) -> Self {
        if t < 0.5 {
            self.clone()
        } else {
            other.clone()
        }
    }
}

macro_rules! impl_lerp_blend {
    ($($ty:ty),*) => {
        $(
            impl Blend for $ty {
                #[inline]
                fn blend(&self, other: &Self, t: f32) -> Self {
                    self.lerp(*other, t)
                }
            }
        )*
    };
}

impl_lerp_blend!(Vec2, Vec3, Vec4);

impl Blend for Color {
    #[inline]
    fn blend(&self, other: &Self, t: f32) -> Self {
        Color::from_vec4(self.to_vec4().lerp(other.to_vec4(), t))
    }
}

impl Blend for Quat {
    #[inline]
    fn blend(&self, other: &Self, t: f32) -> Self {
        self.slerp(*other, t)
    }
}

impl Blend for Mat3 {
    fn blend(&self, other: &Self, t: f32) -> Self {
        *self * (1.0 - t) + *other * t
    }
}

impl Blend for Mat4 {
    fn blend(&self, other: &Self, t: f32) -> Self {
        *self * (1.0 - t) + *other * t
    }
}

impl Blend for Affine3A {
    fn blend(&self, other: &Self, t: f32) -> Self {
        Affine3A {
            matrix3: self.matrix3 * (1.0 - t) + other.matrix3 * t,
            translation: self.translation.lerp(other.translation, t),
        }
    }
}

/// Blend two loosely typed values.
///
/// Returns `None` when the values have different types.
pub fn blend_values(a: &Value, b: &Value, t: f32) -> Option<Value> {
    if a.value_type() != b.value_type() {
        return None;
    }
    dispatch_value_type!(a.value_type(), T => {
        let (x, y) = (T::from_value(a)?, T::from_value(b)?);
        Some(x.blend(&y, t).into_value())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_float_lerp() {
        assert!((2.0f32.blend(&4.0, 0.25) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_quaternion_uses_slerp() {
        let a = Quat::IDENTITY;
        let b = Quat::from_rotation_y(FRAC_PI_2);
        let mid = a.blend(&b, 0.5);
        // Slerp keeps unit length; a plain lerp would not.
        assert!((mid.length() - 1.0).abs() < 1e-5);
        let expected = Quat::from_rotation_y(FRAC_PI_2 * 0.5);
        assert!(mid.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_color_lerp() {
        let c = Color::BLACK.blend(&Color::WHITE, 0.5);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert!((c.a - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_types() {
        assert!(!false.blend(&true, 0.49));
        assert!(false.blend(&true, 0.5));
        assert_eq!("a".to_string().blend(&"b".to_string(), 0.7), "b");
    }

    #[test]
    fn test_blend_values_type_mismatch() {
        assert!(blend_values(&Value::Float(1.0), &Value::Int(1), 0.5).is_none());
        assert_eq!(
            blend_values(&Value::Int(0), &Value::Int(10), 0.26),
            Some(Value::Int(3))
        );
    }
}
