//! Layer description and commit.
//!
//! A [`ParticleGraphLayer`] holds three authored graphs. Committing it
//! resolves every pin to a concrete type, container and buffer column, picks
//! a permutation for every operator and checks connection order. The result
//! is an immutable [`CompiledLayer`] that any number of
//! [`LayerInstance`](crate::LayerInstance)s can share.
//!
//! # Buffer layout
//!
//! ```text
//! column 0..      attributes (capacity elements, read through live indices)
//!                 temporary outputs (1 element for Scalar, capacity for Span)
//! ```
//!
//! Attribute and temporary columns are interleaved in declaration order;
//! [`AttributeInfo::column`] records where each attribute landed.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::container::ContainerKind;
use crate::dispatch::{format_signature, Kernel, OperatorRegistry};
use crate::error::{GraphError, NodeLocation};
use crate::graph::{GraphNode, ParticleGraph, Pin};
use crate::memory::{ColumnLayout, PinBinding};
use crate::nodes::values::RANDOM_VALUE_TYPES;
use crate::nodes::NodeKind;
use crate::value::ValueType;

/// Default number of particle slots per layer.
pub const DEFAULT_CAPACITY: usize = 16;

/// The three graphs of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphKind {
    /// Runs once per update over a single slot to request new particles.
    Emit,
    /// Runs over newly spawned particles.
    Init,
    /// Runs over every live particle.
    Update,
}

impl GraphKind {
    pub const ALL: [GraphKind; 3] = [GraphKind::Emit, GraphKind::Init, GraphKind::Update];
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GraphKind::Emit => "emit",
            GraphKind::Init => "init",
            GraphKind::Update => "update",
        })
    }
}

/// Explicit attribute declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDecl {
    pub name: String,
    pub value_type: ValueType,
}

/// Authored description of one particle layer.
///
/// # Example
///
/// ```ignore
/// let mut layer = ParticleGraphLayer::new(100);
/// let rate = layer.emit.add(GraphNode::constant(20.0f32));
/// layer.emit.add_with_inputs(GraphNode::new(NodeKind::Emit), &[(rate, "value")]);
/// let compiled = layer.commit()?;
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleGraphLayer {
    pub capacity: usize,
    pub time_scale: f32,
    pub emit: ParticleGraph,
    pub init: ParticleGraph,
    pub update: ParticleGraph,
    pub attributes: Vec<AttributeDecl>,
}

impl Default for ParticleGraphLayer {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            time_scale: 1.0,
            emit: ParticleGraph::new(),
            init: ParticleGraph::new(),
            update: ParticleGraph::new(),
            attributes: Vec::new(),
        }
    }
}

impl ParticleGraphLayer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Declare an attribute no SetAttribute node writes with an explicit type.
    pub fn with_attribute(mut self, name: &str, value_type: ValueType) -> Self {
        self.attributes.push(AttributeDecl {
            name: name.to_string(),
            value_type,
        });
        self
    }

    pub fn graph(&self, kind: GraphKind) -> &ParticleGraph {
        match kind {
            GraphKind::Emit => &self.emit,
            GraphKind::Init => &self.init,
            GraphKind::Update => &self.update,
        }
    }

    pub fn graph_mut(&mut self, kind: GraphKind) -> &mut ParticleGraph {
        match kind {
            GraphKind::Emit => &mut self.emit,
            GraphKind::Init => &mut self.init,
            GraphKind::Update => &mut self.update,
        }
    }

    /// Commit against the builtin operator registry.
    pub fn commit(&self) -> Result<Arc<CompiledLayer>, GraphError> {
        self.commit_with(OperatorRegistry::builtin())
    }

    /// Resolve types, containers and buffer columns of all three graphs.
    pub fn commit_with(&self, registry: &OperatorRegistry) -> Result<Arc<CompiledLayer>, GraphError> {
        if self.capacity == 0 {
            return Err(GraphError::InvalidCapacity);
        }

        let mut compiler = Compiler {
            registry,
            capacity: self.capacity,
            columns: Vec::new(),
            attributes: Vec::new(),
        };

        for decl in &self.attributes {
            compiler.declare_attribute(&decl.name, decl.value_type)?;
        }
        // Attributes written with an explicit type are visible to every
        // graph, whatever order the graphs run in.
        for kind in GraphKind::ALL {
            for node in self.graph(kind).nodes() {
                if node.kind == NodeKind::SetAttribute {
                    if let Some(pin) = node.pins.get(1) {
                        if let Some(value_type) = pin.value_type {
                            compiler.declare_attribute(&pin.name, value_type)?;
                        }
                    }
                }
            }
        }

        let emit = compiler.compile_graph(GraphKind::Emit, &self.emit)?;
        let init = compiler.compile_graph(GraphKind::Init, &self.init)?;
        let update = compiler.compile_graph(GraphKind::Update, &self.update)?;

        let layer = CompiledLayer {
            capacity: self.capacity,
            time_scale: self.time_scale,
            columns: compiler.columns,
            attributes: compiler.attributes,
            emit,
            init,
            update,
        };
        log::debug!(
            "committed layer: capacity {}, {} columns, {} attributes, {} nodes",
            layer.capacity,
            layer.columns.len(),
            layer.attributes.len(),
            layer.num_nodes()
        );
        Ok(Arc::new(layer))
    }
}

/// A named per-particle column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    pub value_type: ValueType,
    /// Buffer column holding the attribute.
    pub column: usize,
}

/// A node with every pin bound to a buffer column.
#[derive(Clone, Debug)]
pub struct CompiledNode {
    pub(crate) kind: NodeKind,
    /// One binding per pin, in declaration order.
    pub(crate) pins: Vec<PinBinding>,
    pub(crate) pin_names: Vec<String>,
    /// Selected permutation of an operator node.
    pub(crate) kernel: Option<Kernel>,
}

impl CompiledNode {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn pins(&self) -> &[PinBinding] {
        &self.pins
    }

    /// Binding of the pin called `name`.
    pub fn pin(&self, name: &str) -> Option<&PinBinding> {
        self.pin_names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.pins[i])
    }
}

#[derive(Clone, Debug, Default)]
pub struct CompiledGraph {
    nodes: Vec<CompiledNode>,
}

impl CompiledGraph {
    pub fn nodes(&self) -> &[CompiledNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Immutable result of [`ParticleGraphLayer::commit`].
#[derive(Clone, Debug)]
pub struct CompiledLayer {
    capacity: usize,
    time_scale: f32,
    columns: Vec<ColumnLayout>,
    attributes: Vec<AttributeInfo>,
    emit: CompiledGraph,
    init: CompiledGraph,
    update: CompiledGraph,
}

impl CompiledLayer {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn columns(&self) -> &[ColumnLayout] {
        &self.columns
    }

    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    pub fn graph(&self, kind: GraphKind) -> &CompiledGraph {
        match kind {
            GraphKind::Emit => &self.emit,
            GraphKind::Init => &self.init,
            GraphKind::Update => &self.update,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.emit.len() + self.init.len() + self.update.len()
    }
}

struct Compiler<'r> {
    registry: &'r OperatorRegistry,
    capacity: usize,
    columns: Vec<ColumnLayout>,
    attributes: Vec<AttributeInfo>,
}

impl Compiler<'_> {
    fn declare_attribute(&mut self, name: &str, value_type: ValueType) -> Result<usize, GraphError> {
        if let Some(existing) = self.attributes.iter().find(|a| a.name == name) {
            if existing.value_type != value_type {
                return Err(GraphError::AttributeTypeConflict {
                    name: name.to_string(),
                    first: existing.value_type,
                    second: value_type,
                });
            }
            return Ok(existing.column);
        }
        let column = self.push_column(value_type, self.capacity);
        self.attributes.push(AttributeInfo {
            name: name.to_string(),
            value_type,
            column,
        });
        Ok(column)
    }

    fn push_column(&mut self, value_type: ValueType, len: usize) -> usize {
        self.columns.push(ColumnLayout { value_type, len });
        self.columns.len() - 1
    }

    fn compile_graph(&mut self, kind: GraphKind, graph: &ParticleGraph) -> Result<CompiledGraph, GraphError> {
        let mut nodes: Vec<CompiledNode> = Vec::with_capacity(graph.len());
        for (index, node) in graph.nodes().iter().enumerate() {
            let location = NodeLocation {
                graph: kind,
                node: index,
                name: node.name().to_string(),
            };
            let compiled = self.compile_node(location, node, graph, &nodes)?;
            nodes.push(compiled);
        }
        Ok(CompiledGraph { nodes })
    }

    fn compile_node(
        &mut self,
        location: NodeLocation,
        node: &GraphNode,
        graph: &ParticleGraph,
        compiled: &[CompiledNode],
    ) -> Result<CompiledNode, GraphError> {
        let defaults = node.kind.default_pins();
        if defaults.len() != node.pins.len() {
            return Err(GraphError::PinCountMismatch {
                location,
                expected: defaults.len(),
                found: node.pins.len(),
            });
        }

        // Inputs: bind to the source output.
        let mut bindings: Vec<Option<PinBinding>> = vec![None; node.pins.len()];
        for (i, (pin, default)) in node.pins.iter().zip(&defaults).enumerate() {
            if !default.is_input() {
                continue;
            }
            let source = pin.source.ok_or_else(|| GraphError::UnconnectedInput {
                location: location.clone(),
                pin: pin.name.clone(),
            })?;
            if source.node >= location.node {
                return Err(GraphError::ForwardReference {
                    location,
                    pin: pin.name.clone(),
                    referenced: source.node,
                });
            }
            let source_pin = graph
                .node(source.node)
                .and_then(|n| n.pins.get(source.pin))
                .ok_or_else(|| GraphError::MissingSourcePin {
                    location: location.clone(),
                    pin: pin.name.clone(),
                    source_node: source.node,
                    source_pin: source.pin,
                })?;
            if !source_pin.is_output() {
                return Err(GraphError::SourceNotOutput {
                    location,
                    pin: pin.name.clone(),
                    source_node: source.node,
                });
            }
            let binding = compiled[source.node].pins[source.pin];
            if let Some(expected) = pin.value_type.or(default.value_type) {
                if expected != binding.value_type {
                    return Err(GraphError::TypeMismatch {
                        location,
                        pin: pin.name.clone(),
                        expected,
                        found: binding.value_type,
                    });
                }
            }
            bindings[i] = Some(binding);
        }

        let inputs: Vec<PinBinding> = bindings.iter().flatten().copied().collect();
        let output_pins: Vec<usize> = (0..defaults.len()).filter(|&i| defaults[i].is_output()).collect();

        let (output_types, kernel) = self.resolve_outputs(&location, node, &defaults, &inputs, &output_pins)?;

        for (&i, &value_type) in output_pins.iter().zip(&output_types) {
            let pin = &node.pins[i];
            if let Some(requested) = pin.value_type {
                if requested != value_type {
                    return Err(GraphError::TypeMismatch {
                        location,
                        pin: pin.name.clone(),
                        expected: requested,
                        found: value_type,
                    });
                }
            }

            bindings[i] = Some(if node.kind.writes_attribute() {
                let column = match self.attributes.iter().find(|a| a.name == pin.name) {
                    Some(info) => info.column,
                    None => self.declare_attribute(&pin.name, value_type)?,
                };
                PinBinding {
                    column,
                    container: ContainerKind::Sparse,
                    value_type,
                }
            } else {
                let container = match pin.container {
                    ContainerKind::Sparse => {
                        return Err(GraphError::SparseOutput {
                            location,
                            pin: pin.name.clone(),
                        })
                    }
                    ContainerKind::Auto => {
                        if inputs.iter().all(|b| b.container == ContainerKind::Scalar) {
                            ContainerKind::Scalar
                        } else {
                            ContainerKind::Span
                        }
                    }
                    explicit => explicit,
                };
                let column = self.push_column(value_type, container.buffer_len(self.capacity));
                PinBinding {
                    column,
                    container,
                    value_type,
                }
            });
        }

        let pins = bindings
            .into_iter()
            .zip(&node.pins)
            .map(|(binding, pin)| {
                binding.ok_or_else(|| GraphError::UnresolvedOutputType {
                    location: location.clone(),
                    pin: pin.name.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledNode {
            kind: node.kind.clone(),
            pins,
            pin_names: node.pins.iter().map(|p| p.name.clone()).collect(),
            kernel,
        })
    }

    /// Output pin types of a node, plus the selected kernel of an operator.
    fn resolve_outputs(
        &mut self,
        location: &NodeLocation,
        node: &GraphNode,
        defaults: &[Pin],
        inputs: &[PinBinding],
        output_pins: &[usize],
    ) -> Result<(Vec<ValueType>, Option<Kernel>), GraphError> {
        let unresolved = |pin: usize| GraphError::UnresolvedOutputType {
            location: location.clone(),
            pin: node.pins[pin].name.clone(),
        };

        match &node.kind {
            NodeKind::Operator(op) => {
                let input_types: Vec<Option<ValueType>> = inputs.iter().map(|b| Some(b.value_type)).collect();
                let output_types: Vec<Option<ValueType>> =
                    output_pins.iter().map(|&i| node.pins[i].value_type).collect();
                let query: Vec<Option<ValueType>> =
                    input_types.iter().chain(&output_types).copied().collect();
                let permutation = self.registry.resolve(*op, &query).ok_or_else(|| {
                    GraphError::NoMatchingPermutation {
                        location: location.clone(),
                        types: format_signature(&input_types, &output_types),
                    }
                })?;
                let outputs = permutation.signature()[inputs.len()..].to_vec();
                Ok((outputs, Some(permutation.kernel())))
            }
            NodeKind::Constant(value) => Ok((vec![value.value_type()], None)),
            NodeKind::GetAttribute => {
                let name = &node.pins[0].name;
                let info = self
                    .attributes
                    .iter()
                    .find(|a| &a.name == name)
                    .ok_or_else(|| GraphError::UnknownAttribute {
                        location: location.clone(),
                        name: name.clone(),
                    })?;
                Ok((vec![info.value_type], None))
            }
            NodeKind::SetAttribute => {
                let value_type = inputs.first().map(|b| b.value_type).ok_or_else(|| unresolved(1))?;
                if let Some(requested) = node.pins[1].value_type {
                    if requested != value_type {
                        return Err(GraphError::TypeMismatch {
                            location: location.clone(),
                            pin: node.pins[0].name.clone(),
                            expected: requested,
                            found: value_type,
                        });
                    }
                }
                self.declare_attribute(&node.pins[1].name, value_type)?;
                Ok((vec![value_type], None))
            }
            NodeKind::Random { min, max } => {
                let value_type = min.value_type();
                if max.value_type() != value_type {
                    return Err(GraphError::TypeMismatch {
                        location: location.clone(),
                        pin: node.pins[0].name.clone(),
                        expected: value_type,
                        found: max.value_type(),
                    });
                }
                if !RANDOM_VALUE_TYPES.contains(&value_type) {
                    return Err(GraphError::UnsupportedValueType {
                        location: location.clone(),
                        pin: node.pins[0].name.clone(),
                        value_type,
                    });
                }
                Ok((vec![value_type], None))
            }
            NodeKind::Curve(curve) => Ok((vec![curve.value_type()], None)),
            _ => {
                let types = output_pins
                    .iter()
                    .map(|&i| {
                        node.pins[i]
                            .value_type
                            .or(defaults[i].value_type)
                            .ok_or_else(|| unresolved(i))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((types, None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Operator;
    use crate::graph::GraphNode;
    use crate::value::Value;
    use glam::Vec3;

    fn move_layer() -> ParticleGraphLayer {
        let mut layer = ParticleGraphLayer::new(8);
        let zero = layer.init.add(GraphNode::constant(Vec3::ZERO));
        layer.init.add_with_inputs(
            GraphNode::set_attribute("position", ValueType::Vector3),
            &[(zero, "value")],
        );
        let up = layer.init.add(GraphNode::constant(Vec3::Y));
        layer.init.add_with_inputs(
            GraphNode::set_attribute("velocity", ValueType::Vector3),
            &[(up, "value")],
        );

        let pos = layer.update.add(GraphNode::get_attribute("position", ValueType::Vector3));
        let vel = layer.update.add(GraphNode::get_attribute("velocity", ValueType::Vector3));
        let moved = layer.update.add_with_inputs(
            GraphNode::new(NodeKind::Move),
            &[(pos, "position"), (vel, "velocity")],
        );
        layer.update.add_with_inputs(
            GraphNode::set_attribute("position", ValueType::Vector3),
            &[(moved, "position")],
        );
        layer
    }

    #[test]
    fn test_commit_binds_attributes() {
        let compiled = move_layer().commit().expect("commit");
        assert_eq!(compiled.attributes().len(), 2);

        let update = compiled.graph(GraphKind::Update);
        let position = compiled.attributes()[compiled.attribute_index("position").unwrap()].column;
        let get = &update.nodes()[0];
        assert_eq!(get.pins()[0].column, position);
        assert_eq!(get.pins()[0].container, ContainerKind::Sparse);

        // Move reads sparse inputs, so it writes a span.
        let moved = &update.nodes()[2];
        assert_eq!(moved.pins()[2].container, ContainerKind::Span);
        assert_eq!(compiled.columns()[moved.pins()[2].column].len, 8);
    }

    #[test]
    fn test_scalar_inputs_give_scalar_output() {
        let mut layer = ParticleGraphLayer::new(4);
        let a = layer.update.add(GraphNode::constant(1.0f32));
        let b = layer.update.add(GraphNode::constant(2.0f32));
        let sum = layer
            .update
            .add_with_inputs(GraphNode::operator(Operator::Add), &[(a, "value"), (b, "value")]);
        let compiled = layer.commit().expect("commit");
        let node = &compiled.graph(GraphKind::Update).nodes()[sum];
        assert_eq!(node.pins()[2].container, ContainerKind::Scalar);
        assert_eq!(compiled.columns()[node.pins()[2].column].len, 1);
        assert!(node.kernel.is_some());
    }

    #[test]
    fn test_zero_capacity() {
        assert_eq!(
            ParticleGraphLayer::new(0).commit().unwrap_err(),
            GraphError::InvalidCapacity
        );
    }

    #[test]
    fn test_unconnected_input() {
        let mut layer = ParticleGraphLayer::new(4);
        layer.update.add(GraphNode::operator(Operator::Negate));
        match layer.commit() {
            Err(GraphError::UnconnectedInput { location, pin }) => {
                assert_eq!(location.graph, GraphKind::Update);
                assert_eq!(pin, "x");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_forward_reference() {
        let mut layer = ParticleGraphLayer::new(4);
        let mut negate = GraphNode::operator(Operator::Negate);
        negate.set_input(0, 1, 0);
        layer.update.add(negate);
        layer.update.add(GraphNode::constant(1.0f32));
        assert!(matches!(
            layer.commit(),
            Err(GraphError::ForwardReference { referenced: 1, .. })
        ));
    }

    #[test]
    fn test_source_must_be_output() {
        let mut layer = ParticleGraphLayer::new(4);
        let c = layer.update.add(GraphNode::constant(1.0f32));
        let first = layer
            .update
            .add_with_inputs(GraphNode::operator(Operator::Negate), &[(c, "value")]);
        let mut second = GraphNode::operator(Operator::Negate);
        second.set_input(0, first, 0);
        layer.update.add(second);
        assert!(matches!(
            layer.commit(),
            Err(GraphError::SourceNotOutput { .. })
        ));
    }

    #[test]
    fn test_no_matching_permutation_names_types() {
        let mut layer = ParticleGraphLayer::new(4);
        let v = layer.update.add(GraphNode::constant(Vec3::ONE));
        let b = layer.update.add(GraphNode::constant(true));
        layer
            .update
            .add_with_inputs(GraphNode::operator(Operator::Add), &[(v, "value"), (b, "value")]);
        let err = layer.commit().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("update graph node #2 (Add)"), "{}", msg);
        assert!(msg.contains("(Vector3, Bool) -> ?"), "{}", msg);
    }

    #[test]
    fn test_fixed_input_type_mismatch() {
        let mut layer = ParticleGraphLayer::new(4);
        let f = layer.update.add(GraphNode::constant(1.0f32));
        layer
            .update
            .add_with_inputs(GraphNode::new(NodeKind::Destroy), &[(f, "value")]);
        assert!(matches!(
            layer.commit(),
            Err(GraphError::TypeMismatch {
                expected: ValueType::Bool,
                found: ValueType::Float,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_attribute() {
        let mut layer = ParticleGraphLayer::new(4);
        layer
            .update
            .add(GraphNode::get_attribute("missing", ValueType::Float));
        assert!(matches!(
            layer.commit(),
            Err(GraphError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_attribute_type_conflict() {
        let layer = ParticleGraphLayer::new(4)
            .with_attribute("age", ValueType::Float)
            .with_attribute("age", ValueType::Int);
        assert!(matches!(
            layer.commit(),
            Err(GraphError::AttributeTypeConflict { .. })
        ));
    }

    #[test]
    fn test_attribute_inferred_from_input() {
        let mut layer = ParticleGraphLayer::new(4);
        let c = layer.init.add(GraphNode::constant(3i32));
        let mut set = GraphNode::new(NodeKind::SetAttribute);
        set.set_pin_name(1, "generation");
        layer.init.add(set);
        layer.init.connect(1, "value", c, "value");
        let compiled = layer.commit().expect("commit");
        let index = compiled.attribute_index("generation").expect("declared");
        assert_eq!(compiled.attributes()[index].value_type, ValueType::Int);
    }

    #[test]
    fn test_random_rejects_unsupported_type() {
        let mut layer = ParticleGraphLayer::new(4);
        layer.init.add(GraphNode::new(NodeKind::Random {
            min: Value::Bool(false),
            max: Value::Bool(true),
        }));
        assert!(matches!(
            layer.commit(),
            Err(GraphError::UnsupportedValueType {
                value_type: ValueType::Bool,
                ..
            })
        ));
    }

    #[test]
    fn test_get_uniform_needs_type() {
        let mut layer = ParticleGraphLayer::new(4);
        let mut node = GraphNode::new(NodeKind::GetUniform);
        node.set_pin_name(0, "wind");
        layer.update.add(node);
        assert!(matches!(
            layer.commit(),
            Err(GraphError::UnresolvedOutputType { .. })
        ));
    }

    #[test]
    fn test_sparse_output_rejected() {
        let mut layer = ParticleGraphLayer::new(4);
        let mut node = GraphNode::new(NodeKind::Time);
        node.set_pin_container(0, ContainerKind::Sparse);
        layer.update.add(node);
        assert!(matches!(layer.commit(), Err(GraphError::SparseOutput { .. })));
    }

    #[test]
    fn test_graph_kind_display() {
        assert_eq!(GraphKind::Init.to_string(), "init");
    }
}
