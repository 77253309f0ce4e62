//! # Particle Graph
//!
//! Node-graph driven particle simulation on the CPU.
//!
//! A particle layer is authored as three graphs of typed nodes: an *emit*
//! graph deciding how many particles to spawn, an *init* graph run once over
//! every new particle, and an *update* graph run over all live particles each
//! tick. Committing the layer resolves every pin to a concrete type and
//! buffer column; a [`LayerInstance`] then runs it with type-specialized inner
//! loops and no per-element dispatch.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_graph::prelude::*;
//!
//! let mut layer = ParticleGraphLayer::new(256);
//!
//! // Emit: 4 particles per update.
//! let rate = layer.emit.add(GraphNode::constant(4.0f32));
//! layer.emit.add_with_inputs(GraphNode::new(NodeKind::Emit), &[(rate, "value")]);
//!
//! // Init: start on a sphere, moving outward.
//! let sphere = layer.init.add(GraphNode::new(NodeKind::Sphere(SphereShape::new(0.5))));
//! layer.init.add_with_inputs(GraphNode::set_attribute("position", ValueType::Vector3), &[(sphere, "position")]);
//! layer.init.add_with_inputs(GraphNode::set_attribute("velocity", ValueType::Vector3), &[(sphere, "velocity")]);
//!
//! // Update: integrate.
//! let p = layer.update.add(GraphNode::get_attribute("position", ValueType::Vector3));
//! let v = layer.update.add(GraphNode::get_attribute("velocity", ValueType::Vector3));
//! let moved = layer.update.add_with_inputs(GraphNode::new(NodeKind::Move), &[(p, "position"), (v, "velocity")]);
//! layer.update.add_with_inputs(GraphNode::set_attribute("position", ValueType::Vector3), &[(moved, "position")]);
//!
//! let mut instance = LayerInstance::new();
//! instance.apply(layer.commit()?);
//! instance.update(1.0 / 60.0, true);
//! ```
//!
//! ## Core Concepts
//!
//! ### Pins and containers
//!
//! Every output pin owns a buffer column. Its [`ContainerKind`] decides how a
//! node indexes it:
//!
//! | Container | Storage | Element `i` |
//! |-----------|---------|-------------|
//! | Scalar | 1 value | always element 0 |
//! | Span | capacity values | element `i` |
//! | Sparse | attribute column | element `indices[i]` |
//!
//! ### Operators
//!
//! Generic operators (Add, Multiply, Lerp, ...) keep an ordered list of
//! permutations in an [`OperatorRegistry`]. Commit picks the first one whose
//! signature matches the connected pin types.
//!
//! ### Lifecycle
//!
//! Emission goes through a fractional accumulator, so a rate of 2.5 per
//! update spawns 2, 3, 2, 3, ... particles. Deletion is deferred: nodes mark
//! particles, and the layer swap-removes them after the update graph.
//!
//! ## Feature Overview
//!
//! | Category | Nodes |
//! |----------|-------|
//! | Math | Add, Subtract, Multiply, Divide, Negate, Lerp, Length, Normalized, MakeVec2, MakeVec3, BreakVec3 |
//! | Values | Constant, GetAttribute, SetAttribute, GetUniform, SetUniform, Random, Curve, Time, TimeStep |
//! | Emission | Emit, EmitBurst, Sphere, Cone, Circle, Box |
//! | Lifetime | Expire, Destroy |
//! | Motion | Move, ApplyForce, LimitVelocity, Bounce |
//! | Output | RenderTransforms |

pub mod blend;
pub mod compile;
pub mod container;
pub mod context;
pub mod curve;
pub mod destruction;
pub mod dispatch;
pub mod effect;
pub mod emitter;
pub mod error;
pub mod graph;
pub mod layer;
pub mod memory;
pub mod nodes;
pub mod physics;
pub mod presets;
pub mod spawn;
pub mod uniforms;
pub mod value;

pub use bytemuck;
pub use compile::{
    AttributeDecl, AttributeInfo, CompiledGraph, CompiledLayer, CompiledNode, GraphKind,
    ParticleGraphLayer, DEFAULT_CAPACITY,
};
pub use container::ContainerKind;
pub use context::UpdateContext;
pub use curve::{Curve, CurveInterpolation, CurveKey};
pub use dispatch::{Kernel, Operator, OperatorRegistry, Permutation};
pub use effect::ParticleGraphEffect;
pub use emitter::ParticleGraphEmitter;
pub use error::{CurveError, EffectError, GraphError, NodeLocation};
pub use glam::{Affine3A, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
pub use graph::{GraphNode, ParticleGraph, Pin, PinFlags, PinSource};
pub use layer::{InstanceLayout, LayerInstance};
pub use memory::PinBinding;
pub use nodes::NodeKind;
pub use physics::{PhysicsWorld, PlaneWorld, RaycastHit};
pub use presets::Presets;
pub use uniforms::UniformStore;
pub use value::{Color, PinValue, Value, ValueType};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use particle_graph::prelude::*;
/// ```
///
/// This imports:
/// - [`ParticleGraphLayer`], [`ParticleGraph`], [`GraphNode`], [`NodeKind`] - authoring
/// - [`LayerInstance`], [`ParticleGraphEffect`], [`ParticleGraphEmitter`] - running
/// - node settings ([`Bounce`](crate::nodes::Bounce), [`SphereShape`](crate::nodes::SphereShape), ...)
/// - [`Value`], [`ValueType`], [`Color`] and the glam types
pub mod prelude {
    pub use crate::compile::{GraphKind, ParticleGraphLayer};
    pub use crate::container::ContainerKind;
    pub use crate::curve::{Curve, CurveInterpolation};
    pub use crate::dispatch::Operator;
    pub use crate::effect::ParticleGraphEffect;
    pub use crate::emitter::ParticleGraphEmitter;
    pub use crate::error::{EffectError, GraphError};
    pub use crate::graph::{GraphNode, ParticleGraph};
    pub use crate::layer::LayerInstance;
    pub use crate::nodes::{
        Bounce, BoxShape, CircleShape, ConeEmitFrom, ConeShape, EmitBurst, EmitFrom, Expire,
        ExpireBoundary, NodeKind, ShapeTransform, SphereShape,
    };
    pub use crate::physics::{PhysicsWorld, PlaneWorld};
    pub use crate::presets::Presets;
    pub use crate::value::{Color, Value, ValueType};
    pub use crate::{Mat4, Quat, Vec2, Vec3, Vec4};
}
