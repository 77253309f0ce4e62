//! Per-layer uniform variables.
//!
//! A uniform is a named, typed value shared by every particle of a layer.
//! Slots are keyed by `(name, type)` and allocated on first use, so the same
//! name can exist once per value type without the two colliding.
//!
//! # Example
//!
//! ```ignore
//! let mut uniforms = UniformStore::new();
//! let strength = uniforms.index_of("strength", ValueType::Float);
//! uniforms.set(strength, Value::Float(2.0));
//! assert_eq!(uniforms.get(strength), Some(&Value::Float(2.0)));
//! ```

use std::collections::HashMap;

use crate::value::{Value, ValueType};

/// Collection of uniform values owned by one layer instance.
#[derive(Clone, Debug, Default)]
pub struct UniformStore {
    /// Ordered list of (name, value) pairs. Slot index is the position.
    values: Vec<(String, Value)>,
    /// Quick lookup by name and type.
    indices: HashMap<(String, ValueType), usize>,
}

impl UniformStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot index of a uniform, allocating a default-valued slot on first use.
    pub fn index_of(&mut self, name: &str, value_type: ValueType) -> usize {
        if let Some(&idx) = self.indices.get(&(name.to_string(), value_type)) {
            return idx;
        }
        let idx = self.values.len();
        self.values.push((name.to_string(), value_type.default_value()));
        self.indices.insert((name.to_string(), value_type), idx);
        idx
    }

    /// Slot index of an existing uniform.
    pub fn find(&self, name: &str, value_type: ValueType) -> Option<usize> {
        self.indices.get(&(name.to_string(), value_type)).copied()
    }

    /// Get a uniform value by slot.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, v)| v)
    }

    /// Overwrite a slot. Returns `false` if the slot does not exist or the
    /// value has a different type than the slot.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        match self.values.get_mut(index) {
            Some((_, slot)) if slot.value_type() == value.value_type() => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    /// Add or update a uniform by name. The slot type is the value's type.
    pub fn set_by_name(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        let idx = self.index_of(name, value.value_type());
        self.values[idx].1 = value;
    }

    /// Get a uniform by name and type.
    pub fn get_by_name(&self, name: &str, value_type: ValueType) -> Option<&Value> {
        self.find(name, value_type).and_then(|idx| self.get(idx))
    }

    /// Check if any uniforms are defined.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the number of uniform slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate over all uniforms in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_allocate_on_first_use() {
        let mut store = UniformStore::new();
        let a = store.index_of("rate", ValueType::Float);
        let b = store.index_of("rate", ValueType::Float);
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(a), Some(&Value::Float(0.0)));
    }

    #[test]
    fn test_uniforms_coexist() {
        let mut store = UniformStore::new();
        let rate = store.index_of("rate", ValueType::Float);
        let wind = store.index_of("wind", ValueType::Vector3);
        let rate_int = store.index_of("rate", ValueType::Int);
        assert_ne!(rate, wind);
        assert_ne!(rate, rate_int);

        assert!(store.set(rate, Value::Float(3.5)));
        assert!(store.set(wind, Value::Vector3(Vec3::X)));
        assert_eq!(store.get(rate), Some(&Value::Float(3.5)));
        assert_eq!(store.get(wind), Some(&Value::Vector3(Vec3::X)));
        assert_eq!(store.get(rate_int), Some(&Value::Int(0)));
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let mut store = UniformStore::new();
        let rate = store.index_of("rate", ValueType::Float);
        assert!(!store.set(rate, Value::Int(1)));
        assert!(!store.set(99, Value::Float(1.0)));
    }

    #[test]
    fn test_set_by_name() {
        let mut store = UniformStore::new();
        store.set_by_name("gravity", Vec3::new(0.0, -9.8, 0.0));
        assert_eq!(
            store.get_by_name("gravity", ValueType::Vector3),
            Some(&Value::Vector3(Vec3::new(0.0, -9.8, 0.0)))
        );
        assert!(store.get_by_name("gravity", ValueType::Vector4).is_none());
    }
}
