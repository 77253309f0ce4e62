//! Permutation lists for generic operator nodes.
//!
//! An operator such as `Add` supports many type signatures. Each supported
//! signature is a [`Permutation`]: the exact tuple of pin value types (inputs
//! first, then outputs) plus a [`Kernel`] monomorphized for those types.
//!
//! At commit time the connected pin types are matched against the list in
//! registration order and the **first** match wins. Registration order is
//! therefore part of an operator's behavior:
//!
//! ```ignore
//! let mut registry = OperatorRegistry::new();
//! registry.register(Operator::Add, Permutation::new(&[Float, Float, Float], add_f32));
//! registry.register(Operator::Add, Permutation::new(&[Float, Float, Float], add_f32_saturating));
//! // Always resolves to `add_f32`.
//! ```
//!
//! After resolution the kernel is called directly once per node update; it
//! runs a type-specialized loop over the whole particle window.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::context::UpdateContext;
use crate::graph::Pin;
use crate::memory::PinBinding;
use crate::value::ValueType;

/// Type-specialized update for one node. `pins` lists the node's resolved
/// pins in declaration order.
pub type Kernel = fn(&mut UpdateContext<'_>, &[PinBinding]);

/// One concrete implementation of an operator.
#[derive(Clone)]
pub struct Permutation {
    signature: Vec<ValueType>,
    kernel: Kernel,
}

impl Permutation {
    pub fn new(signature: &[ValueType], kernel: Kernel) -> Self {
        Self {
            signature: signature.to_vec(),
            kernel,
        }
    }

    /// Pin types this permutation requires, inputs first.
    pub fn signature(&self) -> &[ValueType] {
        &self.signature
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Exact match against known pin types. `None` entries match anything.
    pub fn matches(&self, types: &[Option<ValueType>]) -> bool {
        self.signature.len() == types.len()
            && self
                .signature
                .iter()
                .zip(types)
                .all(|(expected, actual)| actual.map_or(true, |t| t == *expected))
    }
}

impl fmt::Debug for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permutation")
            .field("signature", &self.signature)
            .finish()
    }
}

/// Operators with generic pin types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,
    Lerp,
    Length,
    Normalized,
    MakeVec2,
    MakeVec3,
    BreakVec3,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::Negate,
        Operator::Lerp,
        Operator::Length,
        Operator::Normalized,
        Operator::MakeVec2,
        Operator::MakeVec3,
        Operator::BreakVec3,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Add => "Add",
            Operator::Subtract => "Subtract",
            Operator::Multiply => "Multiply",
            Operator::Divide => "Divide",
            Operator::Negate => "Negate",
            Operator::Lerp => "Lerp",
            Operator::Length => "Length",
            Operator::Normalized => "Normalized",
            Operator::MakeVec2 => "MakeVec2",
            Operator::MakeVec3 => "MakeVec3",
            Operator::BreakVec3 => "BreakVec3",
        }
    }

    /// Default pins. Types are left open and resolved by permutation.
    pub fn pins(&self) -> Vec<Pin> {
        let inputs: &[&str] = match self {
            Operator::Add | Operator::Subtract | Operator::Multiply | Operator::Divide => {
                &["x", "y"]
            }
            Operator::Negate | Operator::Length | Operator::Normalized => &["x"],
            Operator::Lerp => &["x", "y", "t"],
            Operator::MakeVec2 => &["x", "y"],
            Operator::MakeVec3 => &["x", "y", "z"],
            Operator::BreakVec3 => &["vec"],
        };
        let outputs: &[&str] = match self {
            Operator::BreakVec3 => &["x", "y", "z"],
            _ => &["out"],
        };
        inputs
            .iter()
            .map(|name| Pin::input(name, None))
            .chain(outputs.iter().map(|name| Pin::output(name, None)))
            .collect()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered permutation lists for every operator.
#[derive(Clone, Debug, Default)]
pub struct OperatorRegistry {
    permutations: HashMap<Operator, Vec<Permutation>>,
}

impl OperatorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every builtin permutation, in builtin order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::nodes::operators::register_builtins(&mut registry);
        registry
    }

    /// Shared builtin registry used by [`ParticleGraphLayer::commit`](crate::ParticleGraphLayer::commit).
    pub fn builtin() -> &'static OperatorRegistry {
        static BUILTIN: OnceLock<OperatorRegistry> = OnceLock::new();
        BUILTIN.get_or_init(OperatorRegistry::with_builtins)
    }

    /// Append a permutation after every already registered one.
    pub fn register(&mut self, operator: Operator, permutation: Permutation) {
        self.permutations
            .entry(operator)
            .or_default()
            .push(permutation);
    }

    pub fn permutations(&self, operator: Operator) -> &[Permutation] {
        self.permutations
            .get(&operator)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First permutation matching `types`, in registration order.
    pub fn resolve(&self, operator: Operator, types: &[Option<ValueType>]) -> Option<&Permutation> {
        self.permutations(operator).iter().find(|p| p.matches(types))
    }
}

/// Render a pin type tuple for diagnostics, e.g. `(Vector3, Bool) -> ?`.
pub fn format_signature(inputs: &[Option<ValueType>], outputs: &[Option<ValueType>]) -> String {
    fn list(types: &[Option<ValueType>]) -> String {
        types
            .iter()
            .map(|t| t.map_or("?", |t| t.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }
    let outs = list(outputs);
    if outputs.len() == 1 {
        format!("({}) -> {}", list(inputs), outs)
    } else {
        format!("({}) -> ({})", list(inputs), outs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::{pin, Harness};
    use crate::container::ContainerKind;
    use crate::value::Value;
    use ValueType::*;

    fn write_one(ctx: &mut UpdateContext<'_>, pins: &[PinBinding]) {
        ctx.write_scalar(&pins[2], &Value::Float(1.0));
    }

    fn write_two(ctx: &mut UpdateContext<'_>, pins: &[PinBinding]) {
        ctx.write_scalar(&pins[2], &Value::Float(2.0));
    }

    #[test]
    fn test_first_match_wins() {
        let mut registry = OperatorRegistry::new();
        registry.register(Operator::Add, Permutation::new(&[Float, Float, Float], write_one));
        registry.register(Operator::Add, Permutation::new(&[Float, Float, Float], write_two));

        for _ in 0..10 {
            let p = registry
                .resolve(Operator::Add, &[Some(Float), Some(Float), None])
                .expect("should resolve");
            let mut h = Harness::new(&[(Float, 1)], 1);
            let out = pin(0, ContainerKind::Scalar, Float);
            let pins = [out, out, out];
            (p.kernel())(&mut h.context(), &pins);
            assert_eq!(h.values::<f32>(0), vec![1.0]);
        }
    }

    #[test]
    fn test_exact_match_only() {
        let mut registry = OperatorRegistry::new();
        registry.register(Operator::Add, Permutation::new(&[Float, Float, Float], write_one));
        assert!(registry
            .resolve(Operator::Add, &[Some(Float), Some(Double), None])
            .is_none());
        assert!(registry.resolve(Operator::Add, &[Some(Float), None]).is_none());
        assert!(registry
            .resolve(Operator::Add, &[Some(Float), Some(Float), Some(Int)])
            .is_none());
    }

    #[test]
    fn test_later_registration_reachable_by_output_type() {
        let mut registry = OperatorRegistry::new();
        registry.register(Operator::Length, Permutation::new(&[Vector3, Float], write_one));
        registry.register(Operator::Length, Permutation::new(&[Vector3, Double], write_two));
        let p = registry
            .resolve(Operator::Length, &[Some(Vector3), Some(Double)])
            .expect("should resolve");
        assert_eq!(p.signature(), &[Vector3, Double]);
    }

    #[test]
    fn test_operator_pins() {
        let pins = Operator::BreakVec3.pins();
        assert_eq!(pins.len(), 4);
        assert!(pins[0].is_input());
        assert!(pins[1..].iter().all(|p| p.is_output()));
        assert_eq!(Operator::Lerp.pins().len(), 4);
    }

    #[test]
    fn test_format_signature() {
        assert_eq!(
            format_signature(&[Some(Vector3), Some(Bool)], &[None]),
            "(Vector3, Bool) -> ?"
        );
        assert_eq!(
            format_signature(&[Some(Vector3)], &[None, None, None]),
            "(Vector3) -> (?, ?, ?)"
        );
    }
}
