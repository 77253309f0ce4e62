//! Builtin operator permutations.
//!
//! Each operator is a zero-sized type implementing [`UnaryOp`], [`BinaryOp`]
//! or [`TernaryOp`] once per supported signature. The generic kernels
//! [`unary`], [`binary`] and [`ternary`] turn one impl into a [`Kernel`]
//! looping over the particle window.
//!
//! Builtin registration order (first match wins):
//!
//! | Operator | Signatures |
//! |----------|------------|
//! | Add, Subtract | Int, Int64, Float, Double, Vector2-4, Color (same type) |
//! | Multiply | same type numerics, vector * Float, Float * vector, Quaternion * Quaternion, Quaternion * Vector3, Color * Float, matrix products |
//! | Divide | Float, Double, Vector2-4 (same type), vector / Float, Color / Float |
//! | Negate | Int, Int64, Float, Double, Vector2-4, Color |
//! | Lerp | Float, Double, Vector2-4, Quaternion, Color with a Float factor |
//! | Length, Normalized | Vector2-4 |
//! | MakeVec2, MakeVec3, BreakVec3 | Float components |
//!
//! Integer arithmetic wraps on overflow. Normalizing a zero vector yields zero.

use glam::{Affine3A, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

use crate::blend::Blend;
use crate::context::{map1, map2, map3, UpdateContext};
use crate::container::{with_reader, with_writer, ContainerRead, ContainerWrite};
use crate::dispatch::{Kernel, Operator, OperatorRegistry, Permutation};
use crate::memory::PinBinding;
use crate::value::{Color, PinValue};

pub trait UnaryOp<A> {
    type Output: PinValue;
    fn apply(a: &A) -> Self::Output;
}

pub trait BinaryOp<A, B> {
    type Output: PinValue;
    fn apply(a: &A, b: &B) -> Self::Output;
}

pub trait TernaryOp<A, B, C> {
    type Output: PinValue;
    fn apply(a: &A, b: &B, c: &C) -> Self::Output;
}

pub struct AddOp;
pub struct SubtractOp;
pub struct MultiplyOp;
pub struct DivideOp;
pub struct NegateOp;
pub struct LerpOp;
pub struct LengthOp;
pub struct NormalizedOp;
pub struct MakeVec2Op;
pub struct MakeVec3Op;

// =============================================================================
// Kernels
// =============================================================================

pub fn unary<Op, A>(ctx: &mut UpdateContext<'_>, pins: &[PinBinding])
where
    Op: UnaryOp<A>,
    A: PinValue,
{
    map1(ctx, &pins[0], &pins[1], Op::apply);
}

pub fn binary<Op, A, B>(ctx: &mut UpdateContext<'_>, pins: &[PinBinding])
where
    Op: BinaryOp<A, B>,
    A: PinValue,
    B: PinValue,
{
    map2(ctx, &pins[0], &pins[1], &pins[2], Op::apply);
}

pub fn ternary<Op, A, B, C>(ctx: &mut UpdateContext<'_>, pins: &[PinBinding])
where
    Op: TernaryOp<A, B, C>,
    A: PinValue,
    B: PinValue,
    C: PinValue,
{
    map3(ctx, &pins[0], &pins[1], &pins[2], &pins[3], Op::apply);
}

/// Split a Vector3 into three Float outputs.
pub fn break_vec3(ctx: &mut UpdateContext<'_>, pins: &[PinBinding]) {
    let n = ctx.loop_len(&pins[1]);
    let mut xs = ctx.take_output::<f32>(&pins[1]);
    let mut ys = ctx.take_output::<f32>(&pins[2]);
    let mut zs = ctx.take_output::<f32>(&pins[3]);
    {
        let indices = ctx.indices();
        let v = ctx.input::<Vec3>(&pins[0]);
        let (wx, wy, wz) = (xs.writer(indices), ys.writer(indices), zs.writer(indices));
        with_reader!(v, |v| with_writer!(wx, |wx| with_writer!(wy, |wy| with_writer!(wz, |wz| {
            for i in 0..n {
                let value = *v.get(i);
                wx.set(i, value.x);
                wy.set(i, value.y);
                wz.set(i, value.z);
            }
        }))));
    }
    ctx.restore_output(zs);
    ctx.restore_output(ys);
    ctx.restore_output(xs);
}

fn unary_perm<Op: UnaryOp<A>, A: PinValue>() -> Permutation {
    let kernel: Kernel = unary::<Op, A>;
    Permutation::new(&[A::VALUE_TYPE, Op::Output::VALUE_TYPE], kernel)
}

fn binary_perm<Op: BinaryOp<A, B>, A: PinValue, B: PinValue>() -> Permutation {
    let kernel: Kernel = binary::<Op, A, B>;
    Permutation::new(
        &[A::VALUE_TYPE, B::VALUE_TYPE, Op::Output::VALUE_TYPE],
        kernel,
    )
}

fn ternary_perm<Op: TernaryOp<A, B, C>, A: PinValue, B: PinValue, C: PinValue>() -> Permutation {
    let kernel: Kernel = ternary::<Op, A, B, C>;
    Permutation::new(
        &[
            A::VALUE_TYPE,
            B::VALUE_TYPE,
            C::VALUE_TYPE,
            Op::Output::VALUE_TYPE,
        ],
        kernel,
    )
}

// =============================================================================
// Operator impls
// =============================================================================

macro_rules! impl_binary {
    ($op:ty: $($a:ty, $b:ty => $out:ty, |$x:ident, $y:ident| $body:expr;)*) => {
        $(
            impl BinaryOp<$a, $b> for $op {
                type Output = $out;
                #[inline]
                fn apply($x: &$a, $y: &$b) -> $out {
                    $body
                }
            }
        )*
    };
}

macro_rules! impl_unary {
    ($op:ty: $($a:ty => $out:ty, |$x:ident| $body:expr;)*) => {
        $(
            impl UnaryOp<$a> for $op {
                type Output = $out;
                #[inline]
                fn apply($x: &$a) -> $out {
                    $body
                }
            }
        )*
    };
}

impl_binary!(AddOp:
    i32, i32 => i32, |x, y| x.wrapping_add(*y);
    i64, i64 => i64, |x, y| x.wrapping_add(*y);
    f32, f32 => f32, |x, y| x + y;
    f64, f64 => f64, |x, y| x + y;
    Vec2, Vec2 => Vec2, |x, y| *x + *y;
    Vec3, Vec3 => Vec3, |x, y| *x + *y;
    Vec4, Vec4 => Vec4, |x, y| *x + *y;
    Color, Color => Color, |x, y| *x + *y;
);

impl_binary!(SubtractOp:
    i32, i32 => i32, |x, y| x.wrapping_sub(*y);
    i64, i64 => i64, |x, y| x.wrapping_sub(*y);
    f32, f32 => f32, |x, y| x - y;
    f64, f64 => f64, |x, y| x - y;
    Vec2, Vec2 => Vec2, |x, y| *x - *y;
    Vec3, Vec3 => Vec3, |x, y| *x - *y;
    Vec4, Vec4 => Vec4, |x, y| *x - *y;
    Color, Color => Color, |x, y| *x - *y;
);

impl_binary!(MultiplyOp:
    i32, i32 => i32, |x, y| x.wrapping_mul(*y);
    i64, i64 => i64, |x, y| x.wrapping_mul(*y);
    f32, f32 => f32, |x, y| x * y;
    f64, f64 => f64, |x, y| x * y;
    Vec2, Vec2 => Vec2, |x, y| *x * *y;
    Vec3, Vec3 => Vec3, |x, y| *x * *y;
    Vec4, Vec4 => Vec4, |x, y| *x * *y;
    Color, Color => Color, |x, y| *x * *y;
    Vec2, f32 => Vec2, |x, y| *x * *y;
    Vec3, f32 => Vec3, |x, y| *x * *y;
    Vec4, f32 => Vec4, |x, y| *x * *y;
    f32, Vec2 => Vec2, |x, y| *x * *y;
    f32, Vec3 => Vec3, |x, y| *x * *y;
    f32, Vec4 => Vec4, |x, y| *x * *y;
    Quat, Quat => Quat, |x, y| *x * *y;
    Quat, Vec3 => Vec3, |x, y| *x * *y;
    Color, f32 => Color, |x, y| *x * *y;
    Mat3, Mat3 => Mat3, |x, y| *x * *y;
    Mat3, Vec3 => Vec3, |x, y| *x * *y;
    Affine3A, Affine3A => Affine3A, |x, y| *x * *y;
    Affine3A, Vec3 => Vec3, |x, y| x.transform_point3(*y);
    Mat4, Mat4 => Mat4, |x, y| *x * *y;
    Mat4, Vec4 => Vec4, |x, y| *x * *y;
);

impl_binary!(DivideOp:
    f32, f32 => f32, |x, y| x / y;
    f64, f64 => f64, |x, y| x / y;
    Vec2, Vec2 => Vec2, |x, y| *x / *y;
    Vec3, Vec3 => Vec3, |x, y| *x / *y;
    Vec4, Vec4 => Vec4, |x, y| *x / *y;
    Vec2, f32 => Vec2, |x, y| *x / *y;
    Vec3, f32 => Vec3, |x, y| *x / *y;
    Vec4, f32 => Vec4, |x, y| *x / *y;
    Color, f32 => Color, |x, y| *x / *y;
);

impl_binary!(MakeVec2Op:
    f32, f32 => Vec2, |x, y| Vec2::new(*x, *y);
);

impl_unary!(NegateOp:
    i32 => i32, |x| x.wrapping_neg();
    i64 => i64, |x| x.wrapping_neg();
    f32 => f32, |x| -x;
    f64 => f64, |x| -x;
    Vec2 => Vec2, |x| -*x;
    Vec3 => Vec3, |x| -*x;
    Vec4 => Vec4, |x| -*x;
    Color => Color, |x| -*x;
);

impl_unary!(LengthOp:
    Vec2 => f32, |x| x.length();
    Vec3 => f32, |x| x.length();
    Vec4 => f32, |x| x.length();
);

impl_unary!(NormalizedOp:
    Vec2 => Vec2, |x| x.normalize_or_zero();
    Vec3 => Vec3, |x| x.normalize_or_zero();
    Vec4 => Vec4, |x| x.normalize_or_zero();
);

impl<T: PinValue> TernaryOp<T, T, f32> for LerpOp {
    type Output = T;
    #[inline]
    fn apply(a: &T, b: &T, t: &f32) -> T {
        a.blend(b, *t)
    }
}

impl TernaryOp<f32, f32, f32> for MakeVec3Op {
    type Output = Vec3;
    #[inline]
    fn apply(x: &f32, y: &f32, z: &f32) -> Vec3 {
        Vec3::new(*x, *y, *z)
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Append every builtin permutation to `registry`, in builtin order.
pub fn register_builtins(registry: &mut OperatorRegistry) {
    macro_rules! same_type {
        ($operator:expr, $op:ty: $($t:ty),*) => {
            $( registry.register($operator, binary_perm::<$op, $t, $t>()); )*
        };
    }

    same_type!(Operator::Add, AddOp: i32, i64, f32, f64, Vec2, Vec3, Vec4, Color);
    same_type!(Operator::Subtract, SubtractOp: i32, i64, f32, f64, Vec2, Vec3, Vec4, Color);

    same_type!(Operator::Multiply, MultiplyOp: i32, i64, f32, f64, Vec2, Vec3, Vec4, Color);
    let multiply = [
        binary_perm::<MultiplyOp, Vec2, f32>(),
        binary_perm::<MultiplyOp, Vec3, f32>(),
        binary_perm::<MultiplyOp, Vec4, f32>(),
        binary_perm::<MultiplyOp, f32, Vec2>(),
        binary_perm::<MultiplyOp, f32, Vec3>(),
        binary_perm::<MultiplyOp, f32, Vec4>(),
        binary_perm::<MultiplyOp, Quat, Quat>(),
        binary_perm::<MultiplyOp, Quat, Vec3>(),
        binary_perm::<MultiplyOp, Color, f32>(),
        binary_perm::<MultiplyOp, Mat3, Mat3>(),
        binary_perm::<MultiplyOp, Mat3, Vec3>(),
        binary_perm::<MultiplyOp, Affine3A, Affine3A>(),
        binary_perm::<MultiplyOp, Affine3A, Vec3>(),
        binary_perm::<MultiplyOp, Mat4, Mat4>(),
        binary_perm::<MultiplyOp, Mat4, Vec4>(),
    ];
    for p in multiply {
        registry.register(Operator::Multiply, p);
    }

    same_type!(Operator::Divide, DivideOp: f32, f64, Vec2, Vec3, Vec4);
    let divide = [
        binary_perm::<DivideOp, Vec2, f32>(),
        binary_perm::<DivideOp, Vec3, f32>(),
        binary_perm::<DivideOp, Vec4, f32>(),
        binary_perm::<DivideOp, Color, f32>(),
    ];
    for p in divide {
        registry.register(Operator::Divide, p);
    }

    let negate = [
        unary_perm::<NegateOp, i32>(),
        unary_perm::<NegateOp, i64>(),
        unary_perm::<NegateOp, f32>(),
        unary_perm::<NegateOp, f64>(),
        unary_perm::<NegateOp, Vec2>(),
        unary_perm::<NegateOp, Vec3>(),
        unary_perm::<NegateOp, Vec4>(),
        unary_perm::<NegateOp, Color>(),
    ];
    for p in negate {
        registry.register(Operator::Negate, p);
    }

    let lerp = [
        ternary_perm::<LerpOp, f32, f32, f32>(),
        ternary_perm::<LerpOp, f64, f64, f32>(),
        ternary_perm::<LerpOp, Vec2, Vec2, f32>(),
        ternary_perm::<LerpOp, Vec3, Vec3, f32>(),
        ternary_perm::<LerpOp, Vec4, Vec4, f32>(),
        ternary_perm::<LerpOp, Quat, Quat, f32>(),
        ternary_perm::<LerpOp, Color, Color, f32>(),
    ];
    for p in lerp {
        registry.register(Operator::Lerp, p);
    }

    registry.register(Operator::Length, unary_perm::<LengthOp, Vec2>());
    registry.register(Operator::Length, unary_perm::<LengthOp, Vec3>());
    registry.register(Operator::Length, unary_perm::<LengthOp, Vec4>());
    registry.register(Operator::Normalized, unary_perm::<NormalizedOp, Vec2>());
    registry.register(Operator::Normalized, unary_perm::<NormalizedOp, Vec3>());
    registry.register(Operator::Normalized, unary_perm::<NormalizedOp, Vec4>());

    registry.register(Operator::MakeVec2, binary_perm::<MakeVec2Op, f32, f32>());
    registry.register(Operator::MakeVec3, ternary_perm::<MakeVec3Op, f32, f32, f32>());
    registry.register(
        Operator::BreakVec3,
        Permutation::new(
            &[
                Vec3::VALUE_TYPE,
                f32::VALUE_TYPE,
                f32::VALUE_TYPE,
                f32::VALUE_TYPE,
            ],
            break_vec3,
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerKind;
    use crate::context::test_support::{pin, Harness};
    use crate::value::ValueType::{self, *};

    fn resolve(op: Operator, inputs: &[ValueType], outputs: usize) -> Option<Vec<ValueType>> {
        let mut types: Vec<Option<ValueType>> = inputs.iter().copied().map(Some).collect();
        types.extend(std::iter::repeat(None).take(outputs));
        OperatorRegistry::builtin()
            .resolve(op, &types)
            .map(|p| p.signature()[inputs.len()..].to_vec())
    }

    #[test]
    fn test_builtin_output_types() {
        assert_eq!(resolve(Operator::Add, &[Float, Float], 1), Some(vec![Float]));
        assert_eq!(resolve(Operator::Multiply, &[Vector3, Float], 1), Some(vec![Vector3]));
        assert_eq!(resolve(Operator::Multiply, &[Quaternion, Vector3], 1), Some(vec![Vector3]));
        assert_eq!(resolve(Operator::Length, &[Vector2], 1), Some(vec![Float]));
        assert_eq!(resolve(Operator::BreakVec3, &[Vector3], 3), Some(vec![Float, Float, Float]));
        assert_eq!(resolve(Operator::Lerp, &[Quaternion, Quaternion, Float], 1), Some(vec![Quaternion]));
    }

    #[test]
    fn test_unsupported_combinations() {
        assert_eq!(resolve(Operator::Add, &[Vector3, Bool], 1), None);
        assert_eq!(resolve(Operator::Divide, &[Int, Int], 1), None);
        assert_eq!(resolve(Operator::Add, &[String, String], 1), None);
    }

    #[test]
    fn test_add_kernel_runs_over_window() {
        let mut h = Harness::new(&[(Vector3, 2), (Float, 1), (Vector3, 2)], 2);
        h.set(0, vec![Vec3::X, Vec3::Y]);
        h.set(1, vec![2.0f32]);
        let kernel = resolve_kernel(Operator::Multiply, &[Vector3, Float]);
        let pins = [
            pin(0, ContainerKind::Span, Vector3),
            pin(1, ContainerKind::Scalar, Float),
            pin(2, ContainerKind::Span, Vector3),
        ];
        kernel(&mut h.context(), &pins);
        assert_eq!(h.values::<Vec3>(2), vec![Vec3::X * 2.0, Vec3::Y * 2.0]);
    }

    #[test]
    fn test_break_vec3() {
        let mut h = Harness::new(
            &[(Vector3, 1), (Float, 1), (Float, 1), (Float, 1)],
            3,
        );
        h.set(0, vec![Vec3::new(1.0, 2.0, 3.0)]);
        let kernel = resolve_kernel(Operator::BreakVec3, &[Vector3]);
        let pins = [
            pin(0, ContainerKind::Scalar, Vector3),
            pin(1, ContainerKind::Scalar, Float),
            pin(2, ContainerKind::Scalar, Float),
            pin(3, ContainerKind::Scalar, Float),
        ];
        kernel(&mut h.context(), &pins);
        assert_eq!(h.values::<f32>(1), vec![1.0]);
        assert_eq!(h.values::<f32>(2), vec![2.0]);
        assert_eq!(h.values::<f32>(3), vec![3.0]);
    }

    #[test]
    fn test_integer_add_wraps() {
        assert_eq!(<AddOp as BinaryOp<i32, i32>>::apply(&i32::MAX, &1), i32::MIN);
    }

    #[test]
    fn test_normalized_zero_vector() {
        assert_eq!(<NormalizedOp as UnaryOp<Vec3>>::apply(&Vec3::ZERO), Vec3::ZERO);
    }

    fn resolve_kernel(op: Operator, inputs: &[ValueType]) -> Kernel {
        let outputs = op.pins().iter().filter(|p| p.is_output()).count();
        let mut types: Vec<Option<ValueType>> = inputs.iter().copied().map(Some).collect();
        types.extend(std::iter::repeat(None).take(outputs));
        OperatorRegistry::builtin()
            .resolve(op, &types)
            .expect("builtin permutation")
            .kernel()
    }
}
