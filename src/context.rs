//! Per-update bundle handed to every node instance.
//!
//! [`UpdateContext`] is the only channel through which a node reads or
//! writes values. It carries the current particle window, the time step,
//! the layer's memory and uniforms, and the side channels a node may use
//! (deletion marks, emission requests, physics, random numbers, render
//! transforms).
//!
//! Outputs are moved out of memory with [`UpdateContext::take_output`] and
//! moved back with [`UpdateContext::restore_output`], so a node can hold
//! readers over its inputs and a writer over its output at the same time.

use glam::Mat4;
use rand::rngs::SmallRng;

use crate::container::{
    with_reader, with_writer, ContainerKind, ContainerRead, ContainerWrite, Reader, Writer,
};
use crate::destruction::DestructionQueue;
use crate::memory::{LayerMemory, PinBinding};
use crate::physics::PhysicsWorld;
use crate::uniforms::UniformStore;
use crate::value::{PinValue, Value};

/// State shared by all nodes during one graph pass.
pub struct UpdateContext<'a> {
    pub(crate) memory: &'a mut LayerMemory,
    /// Live index window of this pass.
    pub(crate) indices: &'a [u32],
    /// Position of `indices[0]` inside the layer's live index table.
    pub(crate) window_offset: usize,
    pub(crate) time_step: f32,
    pub(crate) time: f32,
    pub(crate) uniforms: &'a mut UniformStore,
    pub(crate) deletions: &'a mut DestructionQueue,
    pub(crate) active_particles: usize,
    pub(crate) emit_requests: &'a mut f32,
    pub(crate) physics: Option<&'a dyn PhysicsWorld>,
    pub(crate) rng: &'a mut SmallRng,
    pub(crate) transforms: &'a mut Vec<Mat4>,
}

/// A pin output moved out of layer memory for writing.
pub struct Output<T> {
    column: usize,
    container: ContainerKind,
    values: Vec<T>,
}

impl<T> Output<T> {
    pub fn writer<'w>(&'w mut self, indices: &'w [u32]) -> Writer<'w, T> {
        Writer::new(self.container, &mut self.values, indices)
    }

    #[inline]
    pub fn container(&self) -> ContainerKind {
        self.container
    }
}

impl<'a> UpdateContext<'a> {
    /// Number of particles in this pass.
    #[inline]
    pub fn num_particles(&self) -> usize {
        self.indices.len()
    }

    /// Scaled time step of this tick.
    #[inline]
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Layer time at the start of this tick.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Live index window of this pass.
    #[inline]
    pub fn indices(&self) -> &'a [u32] {
        self.indices
    }

    /// Read view of an input pin.
    pub fn input<T: PinValue>(&self, pin: &PinBinding) -> Reader<'_, T> {
        Reader::new(pin.container, T::slice(self.memory.column(pin.column)), self.indices)
    }

    /// Move an output pin's values out of memory.
    pub fn take_output<T: PinValue>(&mut self, pin: &PinBinding) -> Output<T> {
        Output {
            column: pin.column,
            container: pin.container,
            values: T::take(self.memory.column_mut(pin.column)),
        }
    }

    /// Put output values back into memory.
    pub fn restore_output<T: PinValue>(&mut self, output: Output<T>) {
        *self.memory.column_mut(output.column) = T::wrap(output.values);
    }

    /// Iteration count for a loop writing `out`.
    ///
    /// A scalar output is computed once, or not at all in an empty window.
    #[inline]
    pub fn loop_len(&self, out: &PinBinding) -> usize {
        match out.container {
            ContainerKind::Scalar => self.num_particles().min(1),
            _ => self.num_particles(),
        }
    }

    /// Element `index` of a pin as a loose value.
    pub fn read_value(&self, pin: &PinBinding, index: usize) -> Option<Value> {
        let column = self.memory.column(pin.column);
        let slot = match pin.container {
            ContainerKind::Scalar => 0,
            ContainerKind::Sparse => *self.indices.get(index)? as usize,
            ContainerKind::Span | ContainerKind::Auto => index,
        };
        column.get(slot)
    }

    /// Store a single value into element 0 of a pin.
    pub fn write_scalar(&mut self, pin: &PinBinding, value: &Value) -> bool {
        self.memory.column_mut(pin.column).set(0, value)
    }

    /// Write `value` to every element of a pin the current window covers.
    ///
    /// Scalar pins are written even when the window is empty.
    pub fn fill(&mut self, pin: &PinBinding, value: &Value) -> bool {
        let indices = self.indices;
        let column = self.memory.column_mut(pin.column);
        match pin.container {
            ContainerKind::Scalar => column.set(0, value),
            ContainerKind::Sparse => indices
                .iter()
                .all(|&slot| column.set(slot as usize, value)),
            ContainerKind::Span | ContainerKind::Auto => {
                (0..indices.len()).all(|i| column.set(i, value))
            }
        }
    }

    /// Mark the particle at window position `index` for deletion.
    ///
    /// Out-of-range positions and a full queue are silently ignored.
    pub fn mark_for_deletion(&mut self, index: usize) -> bool {
        self.deletions
            .push(self.window_offset + index, self.active_particles)
    }

    /// Request `count` new particles after the current pass.
    pub fn emit(&mut self, count: f32) {
        if count.is_finite() && count > 0.0 {
            *self.emit_requests += count;
        }
    }

    pub fn physics(&self) -> Option<&'a dyn PhysicsWorld> {
        self.physics
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut *self.rng
    }

    pub fn uniforms(&self) -> &UniformStore {
        &*self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut UniformStore {
        &mut *self.uniforms
    }

    /// Transform array sized for `num_particles` entries, moved out for writing.
    pub fn prepare_transforms(&mut self, num_particles: usize) -> Vec<Mat4> {
        let mut transforms = std::mem::take(&mut *self.transforms);
        transforms.resize(num_particles, Mat4::IDENTITY);
        transforms
    }

    pub fn restore_transforms(&mut self, transforms: Vec<Mat4>) {
        *self.transforms = transforms;
    }
}

// =============================================================================
// Element-wise loops
// =============================================================================

/// `out[i] = f(a[i])`
pub fn map1<A, O, F>(ctx: &mut UpdateContext<'_>, a: &PinBinding, out: &PinBinding, f: F)
where
    A: PinValue,
    O: PinValue,
    F: Fn(&A) -> O,
{
    let n = ctx.loop_len(out);
    let mut output = ctx.take_output::<O>(out);
    {
        let indices = ctx.indices();
        let a = ctx.input::<A>(a);
        let w = output.writer(indices);
        with_reader!(a, |a| with_writer!(w, |w| {
            for i in 0..n {
                w.set(i, f(a.get(i)));
            }
        }));
    }
    ctx.restore_output(output);
}

/// `out[i] = f(a[i], b[i])`
pub fn map2<A, B, O, F>(
    ctx: &mut UpdateContext<'_>,
    a: &PinBinding,
    b: &PinBinding,
    out: &PinBinding,
    f: F,
) where
    A: PinValue,
    B: PinValue,
    O: PinValue,
    F: Fn(&A, &B) -> O,
{
    let n = ctx.loop_len(out);
    let mut output = ctx.take_output::<O>(out);
    {
        let indices = ctx.indices();
        let a = ctx.input::<A>(a);
        let b = ctx.input::<B>(b);
        let w = output.writer(indices);
        with_reader!(a, |a| with_reader!(b, |b| with_writer!(w, |w| {
            for i in 0..n {
                w.set(i, f(a.get(i), b.get(i)));
            }
        })));
    }
    ctx.restore_output(output);
}

/// `out[i] = f(a[i], b[i], c[i])`
pub fn map3<A, B, C, O, F>(
    ctx: &mut UpdateContext<'_>,
    a: &PinBinding,
    b: &PinBinding,
    c: &PinBinding,
    out: &PinBinding,
    f: F,
) where
    A: PinValue,
    B: PinValue,
    C: PinValue,
    O: PinValue,
    F: Fn(&A, &B, &C) -> O,
{
    let n = ctx.loop_len(out);
    let mut output = ctx.take_output::<O>(out);
    {
        let indices = ctx.indices();
        let a = ctx.input::<A>(a);
        let b = ctx.input::<B>(b);
        let c = ctx.input::<C>(c);
        let w = output.writer(indices);
        with_reader!(a, |a| with_reader!(b, |b| with_reader!(c, |c| with_writer!(w, |w| {
            for i in 0..n {
                w.set(i, f(a.get(i), b.get(i), c.get(i)));
            }
        }))));
    }
    ctx.restore_output(output);
}

/// `(out0[i], out1[i]) = f(a[i], b[i])`
pub fn map2x2<A, B, O0, O1, F>(
    ctx: &mut UpdateContext<'_>,
    a: &PinBinding,
    b: &PinBinding,
    out0: &PinBinding,
    out1: &PinBinding,
    f: F,
) where
    A: PinValue,
    B: PinValue,
    O0: PinValue,
    O1: PinValue,
    F: Fn(&A, &B) -> (O0, O1),
{
    let n = ctx.loop_len(out0).max(ctx.loop_len(out1));
    let mut first = ctx.take_output::<O0>(out0);
    let mut second = ctx.take_output::<O1>(out1);
    {
        let indices = ctx.indices();
        let a = ctx.input::<A>(a);
        let b = ctx.input::<B>(b);
        let w0 = first.writer(indices);
        let w1 = second.writer(indices);
        with_reader!(a, |a| with_reader!(b, |b| with_writer!(w0, |w0| with_writer!(w1, |w1| {
            for i in 0..n {
                let (x, y) = f(a.get(i), b.get(i));
                w0.set(i, x);
                w1.set(i, y);
            }
        }))));
    }
    ctx.restore_output(second);
    ctx.restore_output(first);
}

/// Collect `f(a[i])` for every particle of the window.
pub fn collect1<A, O, F>(ctx: &UpdateContext<'_>, a: &PinBinding, f: F) -> Vec<O>
where
    A: PinValue,
    F: Fn(&A) -> O,
{
    let n = ctx.num_particles();
    let a = ctx.input::<A>(a);
    with_reader!(a, |a| (0..n).map(|i| f(a.get(i))).collect())
}

/// Collect `f(a[i], b[i])` for every particle of the window.
pub fn collect2<A, B, O, F>(ctx: &UpdateContext<'_>, a: &PinBinding, b: &PinBinding, f: F) -> Vec<O>
where
    A: PinValue,
    B: PinValue,
    F: Fn(&A, &B) -> O,
{
    let n = ctx.num_particles();
    let a = ctx.input::<A>(a);
    let b = ctx.input::<B>(b);
    with_reader!(a, |a| with_reader!(b, |b| (0..n).map(|i| f(a.get(i), b.get(i))).collect()))
}

/// Fill an output pin from a per-particle generator.
pub fn generate<O, F>(ctx: &mut UpdateContext<'_>, out: &PinBinding, mut f: F)
where
    O: PinValue,
    F: FnMut(&mut UpdateContext<'_>, usize) -> O,
{
    let n = ctx.loop_len(out);
    let mut output = ctx.take_output::<O>(out);
    let values: Vec<O> = (0..n).map(|i| f(ctx, i)).collect();
    {
        let indices = ctx.indices();
        let w = output.writer(indices);
        with_writer!(w, |w| {
            for (i, value) in values.into_iter().enumerate() {
                w.set(i, value);
            }
        });
    }
    ctx.restore_output(output);
}

#[cfg(test)]
pub(crate) mod test_support {
    use rand::SeedableRng;

    use super::*;
    use crate::memory::ColumnLayout;
    use crate::value::ValueType;

    /// Owns everything an [`UpdateContext`] borrows.
    pub struct Harness {
        pub memory: LayerMemory,
        pub indices: Vec<u32>,
        pub uniforms: UniformStore,
        pub deletions: DestructionQueue,
        pub emit_requests: f32,
        pub rng: SmallRng,
        pub transforms: Vec<Mat4>,
        pub time_step: f32,
        pub time: f32,
    }

    impl Harness {
        pub fn new(columns: &[(ValueType, usize)], particles: usize) -> Self {
            let layout: Vec<ColumnLayout> = columns
                .iter()
                .map(|&(value_type, len)| ColumnLayout { value_type, len })
                .collect();
            Self {
                memory: LayerMemory::new(&layout),
                indices: (0..particles as u32).collect(),
                uniforms: UniformStore::new(),
                deletions: DestructionQueue::new(particles.max(1)),
                emit_requests: 0.0,
                rng: SmallRng::seed_from_u64(7),
                transforms: Vec::new(),
                time_step: 0.1,
                time: 0.0,
            }
        }

        pub fn context(&mut self) -> UpdateContext<'_> {
            UpdateContext {
                memory: &mut self.memory,
                indices: &self.indices,
                window_offset: 0,
                time_step: self.time_step,
                time: self.time,
                uniforms: &mut self.uniforms,
                deletions: &mut self.deletions,
                active_particles: self.indices.len(),
                emit_requests: &mut self.emit_requests,
                physics: None,
                rng: &mut self.rng,
                transforms: &mut self.transforms,
            }
        }

        pub fn set<T: PinValue>(&mut self, column: usize, values: Vec<T>) {
            *self.memory.column_mut(column) = T::wrap(values);
        }

        pub fn values<T: PinValue>(&self, column: usize) -> Vec<T> {
            T::slice(self.memory.column(column)).to_vec()
        }
    }

    pub fn pin(column: usize, container: ContainerKind, value_type: ValueType) -> PinBinding {
        PinBinding {
            column,
            container,
            value_type,
        }
    }
}
