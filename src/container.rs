//! Container views over pin and attribute columns.
//!
//! Node code indexes every pin the same way (`view.get(i)`, `view.set(i, v)`)
//! no matter how the values are stored:
//!
//! | Kind | Read `i` | Write `i` |
//! |------|----------|-----------|
//! | `Scalar` | element `0` | element `0` (broadcast) |
//! | `Span` | element `i` | element `i` |
//! | `Sparse` | element `indices[i]` | element `indices[i]` |
//!
//! The kind is matched once per node update by [`with_reader!`] and
//! [`with_writer!`]; the loop inside each arm is monomorphized for one view
//! type, so the per-element path carries no branch on the kind.
//!
//! # Example
//!
//! ```ignore
//! let reader = Reader::new(ContainerKind::Scalar, &values, indices);
//! with_reader!(reader, |r| {
//!     for i in 0..n {
//!         sum += *r.get(i);
//!     }
//! });
//! ```

use serde::{Deserialize, Serialize};

/// Storage kind of a pin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    /// One value shared by every particle.
    Scalar,
    /// One value per position in the current particle window.
    Span,
    /// One value per particle slot, accessed through the live index table.
    Sparse,
    /// Resolved at commit time from the node's inputs.
    #[default]
    Auto,
}

impl ContainerKind {
    /// Element count a temporary buffer of this kind needs.
    pub fn buffer_len(&self, capacity: usize) -> usize {
        match self {
            ContainerKind::Scalar => 1,
            _ => capacity,
        }
    }
}

/// Indexed read access.
pub trait ContainerRead<T> {
    fn get(&self, index: usize) -> &T;
}

/// Indexed write access.
pub trait ContainerWrite<T> {
    fn set(&mut self, index: usize, value: T);
}

// =============================================================================
// Read views
// =============================================================================

#[derive(Clone, Copy)]
pub struct ScalarView<'a, T> {
    values: &'a [T],
}

#[derive(Clone, Copy)]
pub struct SpanView<'a, T> {
    values: &'a [T],
}

#[derive(Clone, Copy)]
pub struct SparseView<'a, T> {
    values: &'a [T],
    indices: &'a [u32],
}

impl<T> ContainerRead<T> for ScalarView<'_, T> {
    #[inline]
    fn get(&self, _index: usize) -> &T {
        &self.values[0]
    }
}

impl<T> ContainerRead<T> for SpanView<'_, T> {
    #[inline]
    fn get(&self, index: usize) -> &T {
        &self.values[index]
    }
}

impl<T> ContainerRead<T> for SparseView<'_, T> {
    #[inline]
    fn get(&self, index: usize) -> &T {
        &self.values[self.indices[index] as usize]
    }
}

// =============================================================================
// Write views
// =============================================================================

pub struct ScalarViewMut<'a, T> {
    values: &'a mut [T],
}

pub struct SpanViewMut<'a, T> {
    values: &'a mut [T],
}

pub struct SparseViewMut<'a, T> {
    values: &'a mut [T],
    indices: &'a [u32],
}

impl<T> ContainerWrite<T> for ScalarViewMut<'_, T> {
    /// Always stores into element 0, whatever the logical index.
    #[inline]
    fn set(&mut self, _index: usize, value: T) {
        self.values[0] = value;
    }
}

impl<T> ContainerRead<T> for ScalarViewMut<'_, T> {
    #[inline]
    fn get(&self, _index: usize) -> &T {
        &self.values[0]
    }
}

impl<T> ContainerWrite<T> for SpanViewMut<'_, T> {
    #[inline]
    fn set(&mut self, index: usize, value: T) {
        self.values[index] = value;
    }
}

impl<T> ContainerRead<T> for SpanViewMut<'_, T> {
    #[inline]
    fn get(&self, index: usize) -> &T {
        &self.values[index]
    }
}

impl<T> ContainerWrite<T> for SparseViewMut<'_, T> {
    #[inline]
    fn set(&mut self, index: usize, value: T) {
        self.values[self.indices[index] as usize] = value;
    }
}

impl<T> ContainerRead<T> for SparseViewMut<'_, T> {
    #[inline]
    fn get(&self, index: usize) -> &T {
        &self.values[self.indices[index] as usize]
    }
}

// =============================================================================
// Kind-erased wrappers
// =============================================================================

/// A read view of any kind.
pub enum Reader<'a, T> {
    Scalar(ScalarView<'a, T>),
    Span(SpanView<'a, T>),
    Sparse(SparseView<'a, T>),
}

impl<'a, T> Reader<'a, T> {
    /// `Auto` reads as `Span`; pins are resolved before any update runs.
    pub fn new(kind: ContainerKind, values: &'a [T], indices: &'a [u32]) -> Self {
        match kind {
            ContainerKind::Scalar => Reader::Scalar(ScalarView { values }),
            ContainerKind::Span | ContainerKind::Auto => Reader::Span(SpanView { values }),
            ContainerKind::Sparse => Reader::Sparse(SparseView { values, indices }),
        }
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            Reader::Scalar(_) => ContainerKind::Scalar,
            Reader::Span(_) => ContainerKind::Span,
            Reader::Sparse(_) => ContainerKind::Sparse,
        }
    }
}

/// A write view of any kind.
pub enum Writer<'a, T> {
    Scalar(ScalarViewMut<'a, T>),
    Span(SpanViewMut<'a, T>),
    Sparse(SparseViewMut<'a, T>),
}

impl<'a, T> Writer<'a, T> {
    pub fn new(kind: ContainerKind, values: &'a mut [T], indices: &'a [u32]) -> Self {
        match kind {
            ContainerKind::Scalar => Writer::Scalar(ScalarViewMut { values }),
            ContainerKind::Span | ContainerKind::Auto => Writer::Span(SpanViewMut { values }),
            ContainerKind::Sparse => Writer::Sparse(SparseViewMut { values, indices }),
        }
    }
}

/// Match a [`Reader`] once and run `$body` with `$v` bound to the concrete view.
macro_rules! with_reader {
    ($reader:expr, |$v:ident| $body:expr) => {
        match $reader {
            $crate::container::Reader::Scalar($v) => $body,
            $crate::container::Reader::Span($v) => $body,
            $crate::container::Reader::Sparse($v) => $body,
        }
    };
}
pub(crate) use with_reader;

/// Match a [`Writer`] once and run `$body` with `$v` bound mutably.
macro_rules! with_writer {
    ($writer:expr, |$v:ident| $body:expr) => {
        match $writer {
            $crate::container::Writer::Scalar(mut $v) => $body,
            $crate::container::Writer::Span(mut $v) => $body,
            $crate::container::Writer::Sparse(mut $v) => $body,
        }
    };
}
pub(crate) use with_writer;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_broadcast_read() {
        let values = [7.0f32];
        let reader = Reader::new(ContainerKind::Scalar, &values, &[]);
        with_reader!(reader, |r| {
            assert_eq!(*r.get(0), 7.0);
            assert_eq!(*r.get(123), 7.0);
        });
    }

    #[test]
    fn test_scalar_broadcast_write() {
        let mut values = [0i32; 4];
        let mut w = ScalarViewMut { values: &mut values };
        w.set(3, 5);
        assert_eq!(*w.get(0), 5);
        assert_eq!(*w.get(2), 5);
        w.set(1, 9);
        assert_eq!(*w.get(3), 9);
        assert_eq!(values, [9, 0, 0, 0]);
    }

    #[test]
    fn test_sparse_goes_through_indices() {
        let values = [10, 20, 30, 40];
        let indices = [3u32, 0, 2];
        let reader = Reader::new(ContainerKind::Sparse, &values, &indices);
        let mut collected = Vec::new();
        with_reader!(reader, |r| {
            for i in 0..indices.len() {
                collected.push(*r.get(i));
            }
        });
        assert_eq!(collected, vec![40, 10, 30]);
    }

    #[test]
    fn test_sparse_write() {
        let mut values = [0u8; 4];
        let indices = [2u32, 1];
        let writer = Writer::new(ContainerKind::Sparse, &mut values, &indices);
        with_writer!(writer, |w| {
            w.set(0, 1);
            w.set(1, 2);
        });
        assert_eq!(values, [0, 2, 1, 0]);
    }

    #[test]
    fn test_auto_reads_as_span() {
        let values = [1, 2];
        let reader = Reader::new(ContainerKind::Auto, &values, &[]);
        assert_eq!(reader.kind(), ContainerKind::Span);
    }

    #[test]
    fn test_buffer_len() {
        assert_eq!(ContainerKind::Scalar.buffer_len(16), 1);
        assert_eq!(ContainerKind::Span.buffer_len(16), 16);
    }
}
