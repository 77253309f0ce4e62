//! Value nodes: operators, constants, attributes, uniforms, random, curves, time.
//!
//! Except for operators, these nodes pick their loop by a runtime match on
//! the pin's [`ValueType`] (see [`dispatch_value_type!`](crate::value)),
//! because their type comes from the authored attribute, uniform or value
//! rather than from a fixed signature list.

use glam::{Vec2, Vec4};
use rand::Rng;

use super::NodeUpdate;
use crate::context::{generate, map1, UpdateContext};
use crate::curve::Curve;
use crate::dispatch::Kernel;
use crate::memory::PinBinding;
use crate::value::{dispatch_value_type, Color, PinValue, Value, ValueType};

/// Value types the Random node can produce.
pub const RANDOM_VALUE_TYPES: [ValueType; 6] = [
    ValueType::Float,
    ValueType::Double,
    ValueType::Vector2,
    ValueType::Vector3,
    ValueType::Vector4,
    ValueType::Color,
];

/// A permutation-resolved operator.
#[derive(Clone, Debug)]
pub struct OperatorInstance {
    kernel: Kernel,
    pins: Vec<PinBinding>,
}

impl OperatorInstance {
    pub fn new(kernel: Kernel, pins: Vec<PinBinding>) -> Self {
        Self { kernel, pins }
    }
}

impl NodeUpdate for OperatorInstance {
    #[inline]
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        (self.kernel)(ctx, &self.pins);
    }
}

/// Writes a fixed value every update.
#[derive(Clone, Debug)]
pub struct ConstantInstance {
    value: Value,
    out: PinBinding,
}

impl ConstantInstance {
    pub fn new(value: Value, out: PinBinding) -> Self {
        Self { value, out }
    }
}

impl NodeUpdate for ConstantInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        ctx.fill(&self.out, &self.value);
    }
}

/// Copies its input into an attribute.
#[derive(Clone, Debug)]
pub struct SetAttributeInstance {
    input: PinBinding,
    attribute: PinBinding,
}

impl SetAttributeInstance {
    pub fn new(input: PinBinding, attribute: PinBinding) -> Self {
        Self { input, attribute }
    }
}

impl NodeUpdate for SetAttributeInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        // Reading the attribute it writes: nothing to copy.
        if self.input.column == self.attribute.column {
            return;
        }
        dispatch_value_type!(self.attribute.value_type, T => {
            map1(ctx, &self.input, &self.attribute, |v: &T| v.clone())
        })
    }
}

/// Publishes a uniform to its output pin.
#[derive(Clone, Debug)]
pub struct GetUniformInstance {
    slot: usize,
    out: PinBinding,
}

impl GetUniformInstance {
    pub fn new(slot: usize, out: PinBinding) -> Self {
        Self { slot, out }
    }
}

impl NodeUpdate for GetUniformInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if let Some(value) = ctx.uniforms().get(self.slot).cloned() {
            ctx.fill(&self.out, &value);
        }
    }
}

/// Stores the first element of its input into a uniform.
#[derive(Clone, Debug)]
pub struct SetUniformInstance {
    slot: usize,
    input: PinBinding,
}

impl SetUniformInstance {
    pub fn new(slot: usize, input: PinBinding) -> Self {
        Self { slot, input }
    }
}

impl NodeUpdate for SetUniformInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if let Some(value) = ctx.read_value(&self.input, 0) {
            ctx.uniforms_mut().set(self.slot, value);
        }
    }
}

/// Uniform random value per particle, component-wise in `[min, max)`.
#[derive(Clone, Debug)]
pub struct RandomInstance {
    min: Value,
    max: Value,
    out: PinBinding,
}

impl RandomInstance {
    pub fn new(min: Value, max: Value, out: PinBinding) -> Self {
        Self { min, max, out }
    }
}

fn unit4<R: Rng>(rng: &mut R) -> Vec4 {
    Vec4::new(rng.gen(), rng.gen(), rng.gen(), rng.gen())
}

impl NodeUpdate for RandomInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let out = self.out;
        match (&self.min, &self.max) {
            (Value::Float(a), Value::Float(b)) => {
                generate(ctx, &out, |ctx, _| a + (b - a) * ctx.rng().gen::<f32>())
            }
            (Value::Double(a), Value::Double(b)) => {
                generate(ctx, &out, |ctx, _| a + (b - a) * ctx.rng().gen::<f64>())
            }
            (Value::Vector2(a), Value::Vector2(b)) => generate(ctx, &out, |ctx, _| {
                let t = Vec2::new(ctx.rng().gen(), ctx.rng().gen());
                *a + (*b - *a) * t
            }),
            (Value::Vector3(a), Value::Vector3(b)) => generate(ctx, &out, |ctx, _| {
                let t = unit4(ctx.rng()).truncate();
                *a + (*b - *a) * t
            }),
            (Value::Vector4(a), Value::Vector4(b)) => {
                generate(ctx, &out, |ctx, _| *a + (*b - *a) * unit4(ctx.rng()))
            }
            (Value::Color(a), Value::Color(b)) => generate(ctx, &out, |ctx, _| {
                let (a, b) = (a.to_vec4(), b.to_vec4());
                Color::from_vec4(a + (b - a) * unit4(ctx.rng()))
            }),
            // Rejected when the layer is committed.
            _ => {}
        }
    }
}

/// Samples a curve at its `t` input.
#[derive(Clone, Debug)]
pub struct CurveInstance {
    curve: Curve,
    t: PinBinding,
    out: PinBinding,
}

impl CurveInstance {
    pub fn new(curve: Curve, t: PinBinding, out: PinBinding) -> Self {
        Self { curve, t, out }
    }
}

impl NodeUpdate for CurveInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let curve = &self.curve;
        dispatch_value_type!(curve.value_type(), T => {
            map1(ctx, &self.t, &self.out, |t: &f32| {
                T::from_value(&curve.sample(*t)).unwrap_or_default()
            })
        })
    }
}

/// Publishes the layer time or the scaled time step.
#[derive(Clone, Debug)]
pub struct TimeInstance {
    step: bool,
    out: PinBinding,
}

impl TimeInstance {
    pub fn time(out: PinBinding) -> Self {
        Self { step: false, out }
    }

    pub fn time_step(out: PinBinding) -> Self {
        Self { step: true, out }
    }
}

impl NodeUpdate for TimeInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let value = if self.step { ctx.time_step() } else { ctx.time() };
        ctx.fill(&self.out, &Value::Float(value));
    }
}
