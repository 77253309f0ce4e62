//! Typed buffer columns backing pins and attributes.
//!
//! A layer instance owns one [`LayerMemory`]: a list of columns addressed by
//! index. Columns `0..attributes` hold the per-particle attributes (one value
//! per particle slot). The remaining columns are temporary pin buffers, one
//! element long for `Scalar` pins and `capacity` long for `Span` pins.

use crate::container::ContainerKind;
use crate::value::{dispatch_value_type, PinValue, Value, ValueType};

/// One dense, typed array.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Int(Vec<i32>),
    Bool(Vec<bool>),
    Int64(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Vector2(Vec<glam::Vec2>),
    Vector3(Vec<glam::Vec3>),
    Vector4(Vec<glam::Vec4>),
    Quaternion(Vec<glam::Quat>),
    Color(Vec<crate::value::Color>),
    String(Vec<String>),
    Matrix3(Vec<glam::Mat3>),
    Matrix3x4(Vec<glam::Affine3A>),
    Matrix4(Vec<glam::Mat4>),
}

impl Column {
    /// Column of `len` default values.
    pub fn new(value_type: ValueType, len: usize) -> Self {
        dispatch_value_type!(value_type, T => T::wrap(vec![T::default(); len]))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Column::Int(_) => ValueType::Int,
            Column::Bool(_) => ValueType::Bool,
            Column::Int64(_) => ValueType::Int64,
            Column::Float(_) => ValueType::Float,
            Column::Double(_) => ValueType::Double,
            Column::Vector2(_) => ValueType::Vector2,
            Column::Vector3(_) => ValueType::Vector3,
            Column::Vector4(_) => ValueType::Vector4,
            Column::Quaternion(_) => ValueType::Quaternion,
            Column::Color(_) => ValueType::Color,
            Column::String(_) => ValueType::String,
            Column::Matrix3(_) => ValueType::Matrix3,
            Column::Matrix3x4(_) => ValueType::Matrix3x4,
            Column::Matrix4(_) => ValueType::Matrix4,
        }
    }

    pub fn len(&self) -> usize {
        dispatch_value_type!(self.value_type(), T => T::slice(self).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read one element as a loose value.
    pub fn get(&self, index: usize) -> Option<Value> {
        dispatch_value_type!(self.value_type(), T => {
            T::slice(self).get(index).cloned().map(PinValue::into_value)
        })
    }

    /// Write one element. Returns `false` on a type mismatch or bad index.
    pub fn set(&mut self, index: usize, value: &Value) -> bool {
        dispatch_value_type!(self.value_type(), T => {
            match (T::from_value(value), T::slice_mut(self).get_mut(index)) {
                (Some(v), Some(slot)) => {
                    *slot = v;
                    true
                }
                _ => false,
            }
        })
    }

    /// Size of the column contents in bytes.
    pub fn byte_size(&self) -> usize {
        self.len() * self.value_type().element_size()
    }
}

/// Planned shape of a single column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    pub value_type: ValueType,
    pub len: usize,
}

/// Where a resolved pin reads or writes its values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinBinding {
    /// Column index inside [`LayerMemory`].
    pub column: usize,
    /// Concrete container kind (never `Auto` after commit).
    pub container: ContainerKind,
    pub value_type: ValueType,
}

/// All pin and attribute storage of one layer instance.
#[derive(Clone, Debug, Default)]
pub struct LayerMemory {
    columns: Vec<Column>,
}

impl LayerMemory {
    pub fn new(layout: &[ColumnLayout]) -> Self {
        Self {
            columns: layout
                .iter()
                .map(|c| Column::new(c.value_type, c.len))
                .collect(),
        }
    }

    #[inline]
    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    #[inline]
    pub fn column_mut(&mut self, index: usize) -> &mut Column {
        &mut self.columns[index]
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Total bytes held by every column.
    pub fn byte_size(&self) -> usize {
        self.columns.iter().map(Column::byte_size).sum()
    }
}
