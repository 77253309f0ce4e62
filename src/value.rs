//! Value types flowing through particle graph pins.
//!
//! Every pin carries one [`ValueType`] out of a closed set. Graph descriptions
//! hold loose values as [`Value`]; node code works on the concrete Rust type
//! through the [`PinValue`] trait.
//!
//! | ValueType | Rust type |
//! |-----------|-----------|
//! | `Int` | `i32` |
//! | `Bool` | `bool` |
//! | `Int64` | `i64` |
//! | `Float` | `f32` |
//! | `Double` | `f64` |
//! | `Vector2` / `Vector3` / `Vector4` | [`Vec2`] / [`Vec3`] / [`Vec4`] |
//! | `Quaternion` | [`Quat`] |
//! | `Color` | [`Color`] |
//! | `String` | `String` |
//! | `Matrix3` / `Matrix3x4` / `Matrix4` | [`Mat3`] / [`Affine3A`] / [`Mat4`] |

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use bytemuck::{Pod, Zeroable};
use glam::{Affine3A, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::blend::Blend;
use crate::memory::Column;

/// Expand `$body` once per value type with `$T` aliased to the Rust type.
///
/// The match is exhaustive, so adding a variant to [`ValueType`] fails to
/// compile until every runtime-dispatched node handles it.
macro_rules! dispatch_value_type {
    ($value_type:expr, $T:ident => $body:expr) => {
        match $value_type {
            $crate::value::ValueType::Int => {
                type $T = i32;
                $body
            }
            $crate::value::ValueType::Bool => {
                type $T = bool;
                $body
            }
            $crate::value::ValueType::Int64 => {
                type $T = i64;
                $body
            }
            $crate::value::ValueType::Float => {
                type $T = f32;
                $body
            }
            $crate::value::ValueType::Double => {
                type $T = f64;
                $body
            }
            $crate::value::ValueType::Vector2 => {
                type $T = ::glam::Vec2;
                $body
            }
            $crate::value::ValueType::Vector3 => {
                type $T = ::glam::Vec3;
                $body
            }
            $crate::value::ValueType::Vector4 => {
                type $T = ::glam::Vec4;
                $body
            }
            $crate::value::ValueType::Quaternion => {
                type $T = ::glam::Quat;
                $body
            }
            $crate::value::ValueType::Color => {
                type $T = $crate::value::Color;
                $body
            }
            $crate::value::ValueType::String => {
                type $T = ::std::string::String;
                $body
            }
            $crate::value::ValueType::Matrix3 => {
                type $T = ::glam::Mat3;
                $body
            }
            $crate::value::ValueType::Matrix3x4 => {
                type $T = ::glam::Affine3A;
                $body
            }
            $crate::value::ValueType::Matrix4 => {
                type $T = ::glam::Mat4;
                $body
            }
        }
    };
}
pub(crate) use dispatch_value_type;

/// Closed enumeration of pin value types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Int,
    Bool,
    Int64,
    Float,
    Double,
    Vector2,
    Vector3,
    Vector4,
    Quaternion,
    Color,
    String,
    Matrix3,
    Matrix3x4,
    Matrix4,
}

impl ValueType {
    /// Every value type, in declaration order.
    pub const ALL: [ValueType; 14] = [
        ValueType::Int,
        ValueType::Bool,
        ValueType::Int64,
        ValueType::Float,
        ValueType::Double,
        ValueType::Vector2,
        ValueType::Vector3,
        ValueType::Vector4,
        ValueType::Quaternion,
        ValueType::Color,
        ValueType::String,
        ValueType::Matrix3,
        ValueType::Matrix3x4,
        ValueType::Matrix4,
    ];

    /// Human readable type name.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Int => "Int",
            ValueType::Bool => "Bool",
            ValueType::Int64 => "Int64",
            ValueType::Float => "Float",
            ValueType::Double => "Double",
            ValueType::Vector2 => "Vector2",
            ValueType::Vector3 => "Vector3",
            ValueType::Vector4 => "Vector4",
            ValueType::Quaternion => "Quaternion",
            ValueType::Color => "Color",
            ValueType::String => "String",
            ValueType::Matrix3 => "Matrix3",
            ValueType::Matrix3x4 => "Matrix3x4",
            ValueType::Matrix4 => "Matrix4",
        }
    }

    /// In-memory size of one element of this type.
    pub fn element_size(&self) -> usize {
        dispatch_value_type!(*self, T => std::mem::size_of::<T>())
    }

    /// Default value of this type (zero, identity or empty).
    pub fn default_value(&self) -> Value {
        dispatch_value_type!(*self, T => T::default().into_value())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Linear RGBA color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    #[inline]
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }

    #[inline]
    pub fn from_vec4(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl Add for Color {
    type Output = Color;
    fn add(self, rhs: Color) -> Color {
        Color::from_vec4(self.to_vec4() + rhs.to_vec4())
    }
}

impl Sub for Color {
    type Output = Color;
    fn sub(self, rhs: Color) -> Color {
        Color::from_vec4(self.to_vec4() - rhs.to_vec4())
    }
}

impl Mul for Color {
    type Output = Color;
    fn mul(self, rhs: Color) -> Color {
        Color::from_vec4(self.to_vec4() * rhs.to_vec4())
    }
}

impl Mul<f32> for Color {
    type Output = Color;
    fn mul(self, rhs: f32) -> Color {
        Color::from_vec4(self.to_vec4() * rhs)
    }
}

impl Div<f32> for Color {
    type Output = Color;
    fn div(self, rhs: f32) -> Color {
        Color::from_vec4(self.to_vec4() / rhs)
    }
}

impl Neg for Color {
    type Output = Color;
    fn neg(self) -> Color {
        Color::from_vec4(-self.to_vec4())
    }
}

/// A loosely typed value: constants, uniforms, curve keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Int64(i64),
    Float(f32),
    Double(f64),
    Vector2(Vec2),
    Vector3(Vec3),
    Vector4(Vec4),
    Quaternion(Quat),
    Color(Color),
    String(String),
    Matrix3(Mat3),
    Matrix3x4(Affine3A),
    Matrix4(Mat4),
}

impl Value {
    /// The [`ValueType`] tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Bool(_) => ValueType::Bool,
            Value::Int64(_) => ValueType::Int64,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::Vector2(_) => ValueType::Vector2,
            Value::Vector3(_) => ValueType::Vector3,
            Value::Vector4(_) => ValueType::Vector4,
            Value::Quaternion(_) => ValueType::Quaternion,
            Value::Color(_) => ValueType::Color,
            Value::String(_) => ValueType::String,
            Value::Matrix3(_) => ValueType::Matrix3,
            Value::Matrix3x4(_) => ValueType::Matrix3x4,
            Value::Matrix4(_) => ValueType::Matrix4,
        }
    }

    /// Extract the concrete value if the tag matches `T`.
    pub fn get<T: PinValue>(&self) -> Option<T> {
        T::from_value(self)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Concrete Rust type stored in a pin buffer.
///
/// Implemented for exactly one Rust type per [`ValueType`]. Node kernels are
/// generic over this trait; buffer columns are accessed through it without
/// any per-element tag checks.
pub trait PinValue: Blend + Clone + Default + Send + Sync + 'static {
    const VALUE_TYPE: ValueType;

    /// Typed view of a column; empty if the column holds another type.
    fn slice(column: &Column) -> &[Self];

    /// Mutable typed view of a column; empty if the column holds another type.
    fn slice_mut(column: &mut Column) -> &mut [Self];

    /// Move the values out of a column, leaving it empty.
    fn take(column: &mut Column) -> Vec<Self>;

    /// Wrap values into a column.
    fn wrap(values: Vec<Self>) -> Column;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_pin_value {
    ($ty:ty, $variant:ident) => {
        impl PinValue for $ty {
            const VALUE_TYPE: ValueType = ValueType::$variant;

            #[inline]
            fn slice(column: &Column) -> &[Self] {
                match column {
                    Column::$variant(values) => values,
                    _ => &[],
                }
            }

            #[inline]
            fn slice_mut(column: &mut Column) -> &mut [Self] {
                match column {
                    Column::$variant(values) => values,
                    _ => &mut [],
                }
            }

            #[inline]
            fn take(column: &mut Column) -> Vec<Self> {
                match column {
                    Column::$variant(values) => std::mem::take(values),
                    _ => Vec::new(),
                }
            }

            #[inline]
            fn wrap(values: Vec<Self>) -> Column {
                Column::$variant(values)
            }

            #[inline]
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            #[inline]
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_pin_value!(i32, Int);
impl_pin_value!(bool, Bool);
impl_pin_value!(i64, Int64);
impl_pin_value!(f32, Float);
impl_pin_value!(f64, Double);
impl_pin_value!(Vec2, Vector2);
impl_pin_value!(Vec3, Vector3);
impl_pin_value!(Vec4, Vector4);
impl_pin_value!(Quat, Quaternion);
impl_pin_value!(Color, Color);
impl_pin_value!(String, String);
impl_pin_value!(Mat3, Matrix3);
impl_pin_value!(Affine3A, Matrix3x4);
impl_pin_value!(Mat4, Matrix4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_roundtrip_through_default() {
        for vt in ValueType::ALL {
            assert_eq!(vt.default_value().value_type(), vt);
        }
    }

    #[test]
    fn test_value_get() {
        let v = Value::from(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(v.get::<Vec3>(), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(v.get::<f32>(), None);
    }

    #[test]
    fn test_element_size() {
        assert_eq!(ValueType::Float.element_size(), 4);
        assert_eq!(ValueType::Vector3.element_size(), 12);
        assert_eq!(ValueType::Color.element_size(), 16);
    }

    #[test]
    fn test_color_ops() {
        let c = Color::rgb(0.5, 0.25, 1.0) * 2.0;
        assert_eq!(c, Color::new(1.0, 0.5, 2.0, 2.0));
        assert_eq!(Color::WHITE - Color::WHITE, Color::TRANSPARENT);
    }
}
