//! Node library: authored node kinds and their runtime instances.
//!
//! [`NodeKind`] is the serializable description of what a node does (with
//! its settings). After commit, every node becomes a [`NodeInstance`] owned by
//! the layer instance; its `update` runs once per graph pass over the whole
//! particle window.
//!
//! | Group | Kinds | Dispatch |
//! |-------|-------|----------|
//! | Operators | Add, Multiply, Lerp, ... | permutation list |
//! | Values | Constant, Get/SetAttribute, Get/SetUniform, Random, Curve | runtime type tag |
//! | Time | Time, TimeStep | fixed |
//! | Emission | Emit, EmitBurst | fixed |
//! | Lifetime | Expire, Destroy | fixed |
//! | Motion | Move, ApplyForce, LimitVelocity, Bounce | fixed |
//! | Shapes | Sphere, Cone, Circle, Box | fixed |
//! | Render | RenderTransforms | fixed |

pub mod emission;
pub mod lifetime;
pub mod motion;
pub mod operators;
pub mod render;
pub mod shapes;
pub mod values;

use serde::{Deserialize, Serialize};

use crate::compile::CompiledNode;
use crate::container::ContainerKind;
use crate::context::UpdateContext;
use crate::curve::Curve;
use crate::dispatch::Operator;
use crate::graph::{Pin, PinFlags};
use crate::uniforms::UniformStore;
use crate::value::{Value, ValueType};

pub use emission::{EmitBurst, EmitBurstInstance, EmitInstance};
pub use lifetime::{DestroyInstance, Expire, ExpireBoundary, ExpireInstance};
pub use motion::{
    ApplyForceInstance, Bounce, BounceInstance, LimitVelocityInstance, MoveInstance,
    DEFAULT_BOUNCE_HIT_FRACTION,
};
pub use render::RenderTransformsInstance;
pub use shapes::{
    BoxShape, CircleShape, ConeEmitFrom, ConeShape, EmitFrom, Shape, ShapeInstance,
    ShapeTransform, SphereShape,
};
pub use values::{
    ConstantInstance, CurveInstance, GetUniformInstance, OperatorInstance, RandomInstance,
    SetAttributeInstance, SetUniformInstance, TimeInstance,
};

/// What an authored node does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Operator(Operator),
    /// Scalar output of any value type.
    Constant(Value),
    /// Output pin name is the attribute name.
    GetAttribute,
    /// Output pin name is the attribute name.
    SetAttribute,
    /// Output pin name is the uniform name.
    GetUniform,
    /// Input pin name is the uniform name.
    SetUniform,
    /// Uniform random value per particle in `[min, max)`.
    Random { min: Value, max: Value },
    Curve(Curve),
    Time,
    TimeStep,
    Emit,
    EmitBurst(EmitBurst),
    Expire(Expire),
    Destroy,
    Move,
    ApplyForce,
    LimitVelocity,
    Bounce(Bounce),
    Sphere(SphereShape),
    Cone(ConeShape),
    Circle(CircleShape),
    Box(BoxShape),
    RenderTransforms,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Operator(op) => op.name(),
            NodeKind::Constant(_) => "Constant",
            NodeKind::GetAttribute => "GetAttribute",
            NodeKind::SetAttribute => "SetAttribute",
            NodeKind::GetUniform => "GetUniform",
            NodeKind::SetUniform => "SetUniform",
            NodeKind::Random { .. } => "Random",
            NodeKind::Curve(_) => "Curve",
            NodeKind::Time => "Time",
            NodeKind::TimeStep => "TimeStep",
            NodeKind::Emit => "Emit",
            NodeKind::EmitBurst(_) => "EmitBurst",
            NodeKind::Expire(_) => "Expire",
            NodeKind::Destroy => "Destroy",
            NodeKind::Move => "Move",
            NodeKind::ApplyForce => "ApplyForce",
            NodeKind::LimitVelocity => "LimitVelocity",
            NodeKind::Bounce(_) => "Bounce",
            NodeKind::Sphere(_) => "Sphere",
            NodeKind::Cone(_) => "Cone",
            NodeKind::Circle(_) => "Circle",
            NodeKind::Box(_) => "Box",
            NodeKind::RenderTransforms => "RenderTransforms",
        }
    }

    /// Whether the outputs of this kind are attribute columns.
    pub fn writes_attribute(&self) -> bool {
        matches!(self, NodeKind::GetAttribute | NodeKind::SetAttribute)
    }

    /// Pins a freshly created node of this kind has.
    pub fn default_pins(&self) -> Vec<Pin> {
        use ValueType::*;

        let input = |name: &str, t: ValueType| Pin::input(name, Some(t));
        let output = |name: &str, t: ValueType| Pin::output(name, Some(t));
        let named = PinFlags::MUTABLE_NAME | PinFlags::MUTABLE_TYPE;

        match self {
            NodeKind::Operator(op) => op.pins(),
            NodeKind::Constant(value) => {
                vec![output("value", value.value_type()).with_container(ContainerKind::Scalar)]
            }
            NodeKind::GetAttribute => vec![Pin::output("attribute", None)
                .with_flags(named)
                .with_container(ContainerKind::Sparse)],
            NodeKind::SetAttribute => vec![
                Pin::input("value", None),
                Pin::output("attribute", None)
                    .with_flags(named)
                    .with_container(ContainerKind::Sparse),
            ],
            NodeKind::GetUniform => vec![Pin::output("uniform", None)
                .with_flags(named)
                .with_container(ContainerKind::Scalar)],
            NodeKind::SetUniform => vec![Pin::input("uniform", None).with_flags(named)],
            NodeKind::Random { min, .. } => {
                vec![Pin::output("out", Some(min.value_type())).with_container(ContainerKind::Span)]
            }
            NodeKind::Curve(curve) => vec![
                input("t", Float),
                output("out", curve.value_type()),
            ],
            NodeKind::Time => vec![output("time", Float).with_container(ContainerKind::Scalar)],
            NodeKind::TimeStep => vec![output("dt", Float).with_container(ContainerKind::Scalar)],
            NodeKind::Emit => vec![input("count", Float)],
            NodeKind::EmitBurst(_) => Vec::new(),
            NodeKind::Expire(_) => vec![input("time", Float), input("lifetime", Float)],
            NodeKind::Destroy => vec![input("condition", Bool)],
            NodeKind::Move => vec![
                input("position", Vector3),
                input("velocity", Vector3),
                output("position", Vector3),
            ],
            NodeKind::ApplyForce => vec![
                input("velocity", Vector3),
                input("force", Vector3),
                output("velocity", Vector3),
            ],
            NodeKind::LimitVelocity => vec![
                input("velocity", Vector3),
                input("limit", Float),
                input("dampen", Float),
                output("velocity", Vector3),
            ],
            NodeKind::Bounce(_) => vec![
                input("position", Vector3),
                input("velocity", Vector3),
                output("position", Vector3),
                output("velocity", Vector3),
            ],
            NodeKind::Sphere(_) | NodeKind::Cone(_) | NodeKind::Circle(_) | NodeKind::Box(_) => {
                vec![
                    output("position", Vector3).with_container(ContainerKind::Span),
                    output("velocity", Vector3).with_container(ContainerKind::Span),
                ]
            }
            NodeKind::RenderTransforms => vec![
                input("position", Vector3),
                input("rotation", Quaternion),
                input("scale", Vector3),
            ],
        }
    }
}

/// Runtime behavior of one node.
pub trait NodeUpdate {
    /// Process the current particle window.
    fn update(&mut self, ctx: &mut UpdateContext<'_>);

    /// Restore internal state to its construction-time defaults.
    fn reset(&mut self) {}
}

/// One runtime node, stored by value in the layer's node arena.
#[derive(Clone, Debug)]
pub enum NodeInstance {
    /// Nodes whose outputs are other nodes' storage (GetAttribute).
    Passive,
    Operator(OperatorInstance),
    Constant(ConstantInstance),
    SetAttribute(SetAttributeInstance),
    GetUniform(GetUniformInstance),
    SetUniform(SetUniformInstance),
    Random(RandomInstance),
    Curve(CurveInstance),
    Time(TimeInstance),
    Emit(EmitInstance),
    EmitBurst(EmitBurstInstance),
    Expire(ExpireInstance),
    Destroy(DestroyInstance),
    Move(MoveInstance),
    ApplyForce(ApplyForceInstance),
    LimitVelocity(LimitVelocityInstance),
    Bounce(BounceInstance),
    Shape(ShapeInstance),
    RenderTransforms(RenderTransformsInstance),
}

impl NodeInstance {
    /// Build the runtime instance of a compiled node.
    ///
    /// Uniform slots are allocated in `uniforms` on first use.
    pub fn instantiate(node: &CompiledNode, uniforms: &mut UniformStore) -> NodeInstance {
        let pins = &node.pins;
        let mut instance = match &node.kind {
            NodeKind::Operator(_) => match node.kernel {
                Some(kernel) => NodeInstance::Operator(OperatorInstance::new(kernel, pins.clone())),
                None => NodeInstance::Passive,
            },
            NodeKind::Constant(value) => {
                NodeInstance::Constant(ConstantInstance::new(value.clone(), pins[0]))
            }
            NodeKind::GetAttribute => NodeInstance::Passive,
            NodeKind::SetAttribute => {
                NodeInstance::SetAttribute(SetAttributeInstance::new(pins[0], pins[1]))
            }
            NodeKind::GetUniform => {
                let slot = uniforms.index_of(&node.pin_names[0], pins[0].value_type);
                NodeInstance::GetUniform(GetUniformInstance::new(slot, pins[0]))
            }
            NodeKind::SetUniform => {
                let slot = uniforms.index_of(&node.pin_names[0], pins[0].value_type);
                NodeInstance::SetUniform(SetUniformInstance::new(slot, pins[0]))
            }
            NodeKind::Random { min, max } => {
                NodeInstance::Random(RandomInstance::new(min.clone(), max.clone(), pins[0]))
            }
            NodeKind::Curve(curve) => {
                NodeInstance::Curve(CurveInstance::new(curve.clone(), pins[0], pins[1]))
            }
            NodeKind::Time => NodeInstance::Time(TimeInstance::time(pins[0])),
            NodeKind::TimeStep => NodeInstance::Time(TimeInstance::time_step(pins[0])),
            NodeKind::Emit => NodeInstance::Emit(EmitInstance::new(pins[0])),
            NodeKind::EmitBurst(burst) => NodeInstance::EmitBurst(EmitBurstInstance::new(burst.clone())),
            NodeKind::Expire(expire) => {
                NodeInstance::Expire(ExpireInstance::new(expire.boundary, pins[0], pins[1]))
            }
            NodeKind::Destroy => NodeInstance::Destroy(DestroyInstance::new(pins[0])),
            NodeKind::Move => NodeInstance::Move(MoveInstance::new(pins[0], pins[1], pins[2])),
            NodeKind::ApplyForce => {
                NodeInstance::ApplyForce(ApplyForceInstance::new(pins[0], pins[1], pins[2]))
            }
            NodeKind::LimitVelocity => NodeInstance::LimitVelocity(LimitVelocityInstance::new(
                pins[0], pins[1], pins[2], pins[3],
            )),
            NodeKind::Bounce(bounce) => NodeInstance::Bounce(BounceInstance::new(
                bounce.clone(),
                [pins[0], pins[1], pins[2], pins[3]],
            )),
            NodeKind::Sphere(shape) => {
                NodeInstance::Shape(ShapeInstance::new(Shape::Sphere(shape.clone()), pins[0], pins[1]))
            }
            NodeKind::Cone(shape) => {
                NodeInstance::Shape(ShapeInstance::new(Shape::Cone(shape.clone()), pins[0], pins[1]))
            }
            NodeKind::Circle(shape) => {
                NodeInstance::Shape(ShapeInstance::new(Shape::Circle(shape.clone()), pins[0], pins[1]))
            }
            NodeKind::Box(shape) => {
                NodeInstance::Shape(ShapeInstance::new(Shape::Box(shape.clone()), pins[0], pins[1]))
            }
            NodeKind::RenderTransforms => NodeInstance::RenderTransforms(
                RenderTransformsInstance::new(pins[0], pins[1], pins[2]),
            ),
        };
        instance.reset();
        instance
    }

    fn as_node(&mut self) -> Option<&mut dyn NodeUpdate> {
        let node: &mut dyn NodeUpdate = match self {
            NodeInstance::Passive => return None,
            NodeInstance::Operator(n) => n,
            NodeInstance::Constant(n) => n,
            NodeInstance::SetAttribute(n) => n,
            NodeInstance::GetUniform(n) => n,
            NodeInstance::SetUniform(n) => n,
            NodeInstance::Random(n) => n,
            NodeInstance::Curve(n) => n,
            NodeInstance::Time(n) => n,
            NodeInstance::Emit(n) => n,
            NodeInstance::EmitBurst(n) => n,
            NodeInstance::Expire(n) => n,
            NodeInstance::Destroy(n) => n,
            NodeInstance::Move(n) => n,
            NodeInstance::ApplyForce(n) => n,
            NodeInstance::LimitVelocity(n) => n,
            NodeInstance::Bounce(n) => n,
            NodeInstance::Shape(n) => n,
            NodeInstance::RenderTransforms(n) => n,
        };
        Some(node)
    }

    #[inline]
    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if let Some(node) = self.as_node() {
            node.update(ctx);
        }
    }

    pub fn reset(&mut self) {
        if let Some(node) = self.as_node() {
            node.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pins_directions() {
        let kinds = [
            NodeKind::Move,
            NodeKind::Bounce(Bounce::default()),
            NodeKind::SetAttribute,
            NodeKind::Sphere(SphereShape::default()),
        ];
        for kind in kinds {
            let pins = kind.default_pins();
            let first_output = pins.iter().position(|p| p.is_output()).unwrap_or(pins.len());
            // Inputs always come before outputs.
            assert!(pins[first_output..].iter().all(|p| p.is_output()), "{}", kind.name());
        }
    }

    #[test]
    fn test_attribute_pins_are_named() {
        let pins = NodeKind::GetAttribute.default_pins();
        assert!(pins[0].flags.contains(PinFlags::MUTABLE_NAME | PinFlags::MUTABLE_TYPE));
        assert_eq!(pins[0].container, ContainerKind::Sparse);
    }

    #[test]
    fn test_node_names() {
        assert_eq!(NodeKind::Operator(Operator::Lerp).name(), "Lerp");
        assert_eq!(NodeKind::Expire(Expire::default()).name(), "Expire");
    }
}
