//! Error types for building and loading particle effects.
//!
//! Everything that can go wrong with an authored graph is detected when a
//! layer is committed, before any particle is updated. Runtime operations
//! (emission, deletion, update) never fail; they degrade softly instead.

use std::fmt;

use thiserror::Error;

use crate::compile::GraphKind;
use crate::value::ValueType;

/// Identifies a node inside a layer: which graph, which index, which kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeLocation {
    pub graph: GraphKind,
    pub node: usize,
    pub name: String,
}

impl fmt::Display for NodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} graph node #{} ({})", self.graph, self.node, self.name)
    }
}

/// Errors raised while committing a [`ParticleGraphLayer`](crate::ParticleGraphLayer).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("layer capacity must be at least 1")]
    InvalidCapacity,

    #[error("{location}: expected {expected} pins, found {found}")]
    PinCountMismatch {
        location: NodeLocation,
        expected: usize,
        found: usize,
    },

    #[error("{location}: input pin '{pin}' is not connected")]
    UnconnectedInput { location: NodeLocation, pin: String },

    #[error("{location}: input pin '{pin}' references node #{referenced}, which does not come earlier in the graph")]
    ForwardReference {
        location: NodeLocation,
        pin: String,
        referenced: usize,
    },

    #[error("{location}: input pin '{pin}' references missing pin {source_pin} of node #{source_node}")]
    MissingSourcePin {
        location: NodeLocation,
        pin: String,
        source_node: usize,
        source_pin: usize,
    },

    #[error("{location}: input pin '{pin}' is connected to an input pin of node #{source_node}")]
    SourceNotOutput {
        location: NodeLocation,
        pin: String,
        source_node: usize,
    },

    #[error("{location}: pin '{pin}' expects {expected}, got {found}")]
    TypeMismatch {
        location: NodeLocation,
        pin: String,
        expected: ValueType,
        found: ValueType,
    },

    #[error("{location}: type of output pin '{pin}' cannot be resolved")]
    UnresolvedOutputType { location: NodeLocation, pin: String },

    #[error("{location}: no permutation matches pin types {types}")]
    NoMatchingPermutation { location: NodeLocation, types: String },

    #[error("{location}: pin '{pin}' does not support value type {value_type}")]
    UnsupportedValueType {
        location: NodeLocation,
        pin: String,
        value_type: ValueType,
    },

    #[error("{location}: output pin '{pin}' cannot be sparse")]
    SparseOutput { location: NodeLocation, pin: String },

    #[error("{location}: unknown attribute '{name}'")]
    UnknownAttribute { location: NodeLocation, name: String },

    #[error("attribute '{name}' declared as both {first} and {second}")]
    AttributeTypeConflict {
        name: String,
        first: ValueType,
        second: ValueType,
    },
}

/// Errors raised while validating a loaded [`Curve`](crate::Curve).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    #[error("curve key at time {time} has type {found}, expected {expected}")]
    KeyTypeMismatch {
        time: f32,
        expected: ValueType,
        found: ValueType,
    },

    #[error("curve key time must be finite")]
    NonFiniteTime,
}

/// Errors raised while loading or activating a [`ParticleGraphEffect`](crate::ParticleGraphEffect).
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("layer {layer}: {error}")]
    Layer {
        layer: usize,
        #[source]
        error: GraphError,
    },

    #[error("invalid effect description: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_node_and_pin() {
        let err = GraphError::NoMatchingPermutation {
            location: NodeLocation {
                graph: GraphKind::Update,
                node: 3,
                name: "Add".to_string(),
            },
            types: "(Vector3, Bool) -> ?".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("update graph node #3 (Add)"));
        assert!(msg.contains("(Vector3, Bool)"));
    }

    #[test]
    fn test_curve_error_message() {
        let err = CurveError::KeyTypeMismatch {
            time: 0.5,
            expected: ValueType::Float,
            found: ValueType::Int,
        };
        assert_eq!(err.to_string(), "curve key at time 0.5 has type Int, expected Float");
    }

    #[test]
    fn test_effect_error_source() {
        use std::error::Error as _;
        let err = EffectError::Layer {
            layer: 1,
            error: GraphError::InvalidCapacity,
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("layer 1:"));
    }
}
