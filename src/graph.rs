//! Authored graph description: nodes, pins and connections.
//!
//! A [`ParticleGraph`] is an ordered list of [`GraphNode`]s. Each node has a
//! [`NodeKind`] and a list of [`Pin`]s; input pins point at an output pin of
//! an earlier node. Nothing here is executable; a
//! [`ParticleGraphLayer`](crate::ParticleGraphLayer) compiles three graphs into
//! a [`CompiledLayer`](crate::CompiledLayer).
//!
//! # Example
//!
//! ```ignore
//! let mut graph = ParticleGraph::new();
//! let pos = graph.add(GraphNode::get_attribute("position", ValueType::Vector3));
//! let vel = graph.add(GraphNode::get_attribute("velocity", ValueType::Vector3));
//! let moved = graph.add_with_inputs(GraphNode::new(NodeKind::Move), &[(pos, "position"), (vel, "velocity")]);
//! graph.add_with_inputs(GraphNode::set_attribute("position", ValueType::Vector3), &[(moved, "position")]);
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::container::ContainerKind;
use crate::dispatch::Operator;
use crate::nodes::NodeKind;
use crate::value::{Value, ValueType};

bitflags! {
    /// Pin direction and editability.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PinFlags: u32 {
        const INPUT = 1 << 0;
        const OUTPUT = 1 << 1;
        /// The pin name carries data (attribute or uniform name).
        const MUTABLE_NAME = 1 << 2;
        /// The pin type is chosen by the author.
        const MUTABLE_TYPE = 1 << 3;
    }
}

/// Output pin an input is connected to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinSource {
    pub node: usize,
    pub pin: usize,
}

/// A typed input or output slot of a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    pub flags: PinFlags,
    /// Requested type. `None` lets commit resolve it.
    #[serde(default)]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub container: ContainerKind,
    /// Connection of an input pin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PinSource>,
}

impl Pin {
    pub fn input(name: &str, value_type: Option<ValueType>) -> Self {
        Self {
            name: name.to_string(),
            flags: PinFlags::INPUT,
            value_type,
            container: ContainerKind::Auto,
            source: None,
        }
    }

    pub fn output(name: &str, value_type: Option<ValueType>) -> Self {
        Self {
            name: name.to_string(),
            flags: PinFlags::OUTPUT,
            value_type,
            container: ContainerKind::Auto,
            source: None,
        }
    }

    pub fn with_container(mut self, container: ContainerKind) -> Self {
        self.container = container;
        self
    }

    pub fn with_flags(mut self, flags: PinFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn is_input(&self) -> bool {
        self.flags.contains(PinFlags::INPUT)
    }

    #[inline]
    pub fn is_output(&self) -> bool {
        self.flags.contains(PinFlags::OUTPUT)
    }
}

/// One node of an authored graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub kind: NodeKind,
    pub pins: Vec<Pin>,
}

impl GraphNode {
    /// Node with its kind's default pins.
    pub fn new(kind: NodeKind) -> Self {
        let pins = kind.default_pins();
        Self { kind, pins }
    }

    pub fn operator(operator: Operator) -> Self {
        Self::new(NodeKind::Operator(operator))
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Self::new(NodeKind::Constant(value.into()))
    }

    /// Reads an attribute of every particle in the window.
    pub fn get_attribute(name: &str, value_type: ValueType) -> Self {
        let mut node = Self::new(NodeKind::GetAttribute);
        node.pins[0].name = name.to_string();
        node.pins[0].value_type = Some(value_type);
        node
    }

    /// Writes an attribute of every particle in the window.
    pub fn set_attribute(name: &str, value_type: ValueType) -> Self {
        let mut node = Self::new(NodeKind::SetAttribute);
        node.pins[1].name = name.to_string();
        node.pins[1].value_type = Some(value_type);
        node
    }

    pub fn get_uniform(name: &str, value_type: ValueType) -> Self {
        let mut node = Self::new(NodeKind::GetUniform);
        node.pins[0].name = name.to_string();
        node.pins[0].value_type = Some(value_type);
        node
    }

    pub fn set_uniform(name: &str) -> Self {
        let mut node = Self::new(NodeKind::SetUniform);
        node.pins[0].name = name.to_string();
        node
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Index of the input pin called `name`.
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.pins.iter().position(|p| p.is_input() && p.name == name)
    }

    /// Index of the output pin called `name`.
    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.pins.iter().position(|p| p.is_output() && p.name == name)
    }

    /// Rename a pin. Only pins flagged [`PinFlags::MUTABLE_NAME`] can be renamed.
    pub fn set_pin_name(&mut self, pin: usize, name: &str) -> bool {
        match self.pins.get_mut(pin) {
            Some(p) if p.flags.contains(PinFlags::MUTABLE_NAME) => {
                p.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    /// Retype a pin. Only pins flagged [`PinFlags::MUTABLE_TYPE`] can be retyped.
    pub fn set_pin_type(&mut self, pin: usize, value_type: ValueType) -> bool {
        match self.pins.get_mut(pin) {
            Some(p) if p.flags.contains(PinFlags::MUTABLE_TYPE) => {
                p.value_type = Some(value_type);
                true
            }
            _ => false,
        }
    }

    /// Request a container kind for a pin.
    pub fn set_pin_container(&mut self, pin: usize, container: ContainerKind) -> bool {
        match self.pins.get_mut(pin) {
            Some(p) => {
                p.container = container;
                true
            }
            None => false,
        }
    }

    /// Connect input pin `pin` to output `source_pin` of node `source_node`.
    pub fn set_input(&mut self, pin: usize, source_node: usize, source_pin: usize) -> bool {
        match self.pins.get_mut(pin) {
            Some(p) if p.is_input() => {
                p.source = Some(PinSource {
                    node: source_node,
                    pin: source_pin,
                });
                true
            }
            _ => false,
        }
    }
}

/// Ordered list of nodes. Execution follows this order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleGraph {
    nodes: Vec<GraphNode>,
}

impl ParticleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its index.
    pub fn add(&mut self, node: GraphNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Append a node and connect its inputs, in input pin order, to the
    /// named outputs of earlier nodes. Returns the new node's index.
    ///
    /// Connections naming a missing output are left unconnected and are
    /// reported when the layer is committed.
    pub fn add_with_inputs(&mut self, mut node: GraphNode, sources: &[(usize, &str)]) -> usize {
        let inputs: Vec<usize> = (0..node.pins.len())
            .filter(|&i| node.pins[i].is_input())
            .collect();
        for (&pin, &(source_node, source_pin_name)) in inputs.iter().zip(sources) {
            if let Some(source_pin) = self
                .nodes
                .get(source_node)
                .and_then(|n| n.output_index(source_pin_name))
            {
                node.set_input(pin, source_node, source_pin);
            }
        }
        self.add(node)
    }

    /// Connect input `pin_name` of `node` to output `source_pin_name` of `source_node`.
    pub fn connect(
        &mut self,
        node: usize,
        pin_name: &str,
        source_node: usize,
        source_pin_name: &str,
    ) -> bool {
        let Some(source_pin) = self
            .nodes
            .get(source_node)
            .and_then(|n| n.output_index(source_pin_name))
        else {
            return false;
        };
        match self.nodes.get_mut(node) {
            Some(n) => match n.input_index(pin_name) {
                Some(pin) => n.set_input(pin, source_node, source_pin),
                None => false,
            },
            None => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut GraphNode> {
        self.nodes.get_mut(index)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_with_inputs_connects_in_order() {
        let mut graph = ParticleGraph::new();
        let a = graph.add(GraphNode::constant(1.0f32));
        let b = graph.add(GraphNode::constant(2.0f32));
        let sum = graph.add_with_inputs(GraphNode::operator(Operator::Add), &[(a, "value"), (b, "value")]);
        let node = graph.node(sum).expect("node");
        assert_eq!(node.pins[0].source, Some(PinSource { node: a, pin: 0 }));
        assert_eq!(node.pins[1].source, Some(PinSource { node: b, pin: 0 }));
        assert_eq!(node.pins[2].source, None);
    }

    #[test]
    fn test_connect_by_name() {
        let mut graph = ParticleGraph::new();
        let a = graph.add(GraphNode::constant(1.0f32));
        let n = graph.add(GraphNode::operator(Operator::Negate));
        assert!(graph.connect(n, "x", a, "value"));
        assert!(!graph.connect(n, "missing", a, "value"));
        assert!(!graph.connect(n, "x", a, "missing"));
        assert!(!graph.connect(n, "out", a, "value"));
    }

    #[test]
    fn test_mutable_flags_gate_edits() {
        let mut node = GraphNode::get_attribute("age", ValueType::Float);
        assert!(node.set_pin_name(0, "lifetime"));
        assert!(node.set_pin_type(0, ValueType::Double));
        assert_eq!(node.pins[0].name, "lifetime");

        let mut add = GraphNode::operator(Operator::Add);
        assert!(!add.set_pin_name(0, "a"));
        assert!(!add.set_pin_type(2, ValueType::Float));
    }

    #[test]
    fn test_pin_serde() {
        let pin = Pin::output("age", Some(ValueType::Float)).with_flags(PinFlags::MUTABLE_NAME);
        let json = serde_json::to_string(&pin).expect("serialize");
        let back: Pin = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, pin);
        assert!(back.flags.contains(PinFlags::OUTPUT | PinFlags::MUTABLE_NAME));
    }
}
