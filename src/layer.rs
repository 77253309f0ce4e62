//! Runtime state of one executing particle layer.
//!
//! A [`LayerInstance`] owns everything a compiled layer needs to run: the
//! node instances of its three graphs, the buffer columns, the live index
//! table and the lifecycle counters.
//!
//! # Index tables
//!
//! ```text
//! indices          [ live 0 .. active | free active .. capacity ]
//! natural_indices  [ 0, 1, 2, ... capacity - 1 ]
//! zero_indices     [ 0, 0, 0, ... ]
//! ```
//!
//! `indices` is always a permutation of `0..capacity`; its first `active`
//! entries are the attribute slots of live particles. Spawning extends the
//! live prefix, deletion swap-removes from it.
//!
//! # Update order
//!
//! 1. Scale the time step by the layer's time scale.
//! 2. If emitting, run the emit graph over one slot, then spawn the requested
//!    particles and run the init graph over them.
//! 3. Run the update graph over every live particle.
//! 4. Drain the destruction queue.
//! 5. Advance the layer time.

use std::ops::Range;
use std::sync::Arc;

use glam::Mat4;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::compile::{CompiledLayer, GraphKind};
use crate::context::UpdateContext;
use crate::destruction::DestructionQueue;
use crate::memory::LayerMemory;
use crate::nodes::NodeInstance;
use crate::physics::PhysicsWorld;
use crate::uniforms::UniformStore;
use crate::value::{PinValue, Value};

/// Positions of each graph's node instances in the layer's node arena.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstanceLayout {
    pub emit: Range<usize>,
    pub init: Range<usize>,
    pub update: Range<usize>,
}

impl InstanceLayout {
    pub fn range(&self, kind: GraphKind) -> Range<usize> {
        match kind {
            GraphKind::Emit => self.emit.clone(),
            GraphKind::Init => self.init.clone(),
            GraphKind::Update => self.update.clone(),
        }
    }
}

/// Which index table a pass reads its window from.
#[derive(Clone, Copy)]
enum Window {
    /// One slot, mapped to attribute slot 0.
    Zero,
    /// `indices[range]`
    Live,
}

/// One executing copy of a compiled layer.
pub struct LayerInstance {
    layer: Option<Arc<CompiledLayer>>,
    nodes: Vec<NodeInstance>,
    layout: InstanceLayout,
    memory: LayerMemory,
    indices: Vec<u32>,
    natural_indices: Vec<u32>,
    zero_indices: Vec<u32>,
    active: usize,
    emit_counter: f32,
    deletions: DestructionQueue,
    uniforms: UniformStore,
    time: f32,
    time_scale: f32,
    /// Scaled time step of the last update.
    time_step: f32,
    rng: SmallRng,
    seed: Option<u64>,
    physics: Option<Arc<dyn PhysicsWorld>>,
    transforms: Vec<Mat4>,
}

impl Default for LayerInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerInstance {
    /// Empty instance with an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy(), None)
    }

    /// Empty instance whose random streams repeat on every reset.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed), Some(seed))
    }

    fn with_rng(rng: SmallRng, seed: Option<u64>) -> Self {
        Self {
            layer: None,
            nodes: Vec::new(),
            layout: InstanceLayout::default(),
            memory: LayerMemory::default(),
            indices: Vec::new(),
            natural_indices: Vec::new(),
            zero_indices: Vec::new(),
            active: 0,
            emit_counter: 0.0,
            deletions: DestructionQueue::default(),
            uniforms: UniformStore::new(),
            time: 0.0,
            time_scale: 1.0,
            time_step: 0.0,
            rng,
            seed,
            physics: None,
            transforms: Vec::new(),
        }
    }

    /// Rebuild buffers and node instances for `layer`.
    ///
    /// Leaves the instance with no live particles and an empty emission
    /// accumulator. Uniform values survive.
    pub fn apply(&mut self, layer: Arc<CompiledLayer>) {
        let capacity = layer.capacity();

        self.memory = LayerMemory::new(layer.columns());
        self.nodes.clear();
        let mut ranges = Vec::with_capacity(3);
        for kind in GraphKind::ALL {
            let start = self.nodes.len();
            for node in layer.graph(kind).nodes() {
                self.nodes
                    .push(NodeInstance::instantiate(node, &mut self.uniforms));
            }
            ranges.push(start..self.nodes.len());
        }
        let mut ranges = ranges.into_iter();
        self.layout = InstanceLayout {
            emit: ranges.next().unwrap_or_default(),
            init: ranges.next().unwrap_or_default(),
            update: ranges.next().unwrap_or_default(),
        };

        self.natural_indices = (0..capacity as u32).collect();
        self.indices = self.natural_indices.clone();
        self.zero_indices = vec![0; capacity];
        self.active = 0;
        self.emit_counter = 0.0;
        self.deletions = DestructionQueue::new(capacity);
        self.time = 0.0;
        self.time_scale = layer.time_scale();
        self.transforms.clear();

        log::debug!(
            "applied layer: capacity {}, {} bytes in {} columns, nodes emit {:?} init {:?} update {:?}",
            capacity,
            self.memory.byte_size(),
            self.memory.num_columns(),
            self.layout.emit,
            self.layout.init,
            self.layout.update
        );
        self.layer = Some(layer);
    }

    /// The applied layer, if any.
    pub fn layer(&self) -> Option<&Arc<CompiledLayer>> {
        self.layer.as_ref()
    }

    /// Add `count` to the emission accumulator and spawn every whole
    /// particle it holds, up to the free capacity.
    ///
    /// The whole part is consumed even when capacity clamps the spawn.
    /// Non-finite counts are ignored. Returns `false` when no particle was
    /// spawned.
    pub fn emit_new_particles(&mut self, count: f32) -> bool {
        if self.layer.is_none() {
            return false;
        }
        if !count.is_finite() {
            log::warn!("ignoring non-finite emission count {}", count);
        } else if count > 0.0 {
            self.emit_counter += count;
        }
        let whole = self.emit_counter.floor();
        if whole < 1.0 {
            return false;
        }
        self.emit_counter -= whole;

        let requested = whole as usize;
        let free = self.capacity() - self.active;
        let spawn = requested.min(free);
        if spawn < requested {
            log::trace!(
                "emission clamped: {} requested, {} free slots",
                requested,
                free
            );
        }
        if spawn == 0 {
            return false;
        }

        let start = self.active;
        self.active += spawn;
        self.run_graph(GraphKind::Init, Window::Live, start..self.active, self.time_step);
        true
    }

    /// Advance the simulation by `time_step` seconds.
    pub fn update(&mut self, time_step: f32, emitting: bool) {
        if self.layer.is_none() {
            return;
        }
        let time_step = time_step * self.time_scale;
        self.time_step = time_step;

        if emitting {
            let requested = self.run_graph(GraphKind::Emit, Window::Zero, 0..1, time_step);
            if requested > 0.0 {
                self.emit_new_particles(requested);
            }
        }

        self.run_graph(GraphKind::Update, Window::Live, 0..self.active, time_step);
        let indices = &mut self.indices;
        let transforms = &mut self.transforms;
        // Transforms follow live order only when this pass wrote them.
        let tracked = transforms.len() == self.active;
        let removed = self.deletions.drain_with(&mut self.active, |position, last| {
            indices.swap(position, last);
            if tracked {
                transforms.swap(position, last);
            }
        });
        if tracked {
            transforms.truncate(self.active);
        }
        if removed > 0 {
            log::trace!("removed {} particles, {} active", removed, self.active);
        }

        self.time += time_step;
    }

    /// Run one graph over a window. Returns the particles its nodes requested.
    fn run_graph(&mut self, kind: GraphKind, window: Window, range: Range<usize>, time_step: f32) -> f32 {
        let LayerInstance {
            nodes,
            layout,
            memory,
            indices,
            zero_indices,
            active,
            deletions,
            uniforms,
            time,
            rng,
            physics,
            transforms,
            ..
        } = self;

        let (table, active_particles) = match window {
            Window::Zero => (&zero_indices[range.clone()], 0),
            Window::Live => (&indices[range.clone()], *active),
        };
        let mut emit_requests = 0.0;
        let mut ctx = UpdateContext {
            memory,
            indices: table,
            window_offset: range.start,
            time_step,
            time: *time,
            uniforms,
            deletions,
            active_particles,
            emit_requests: &mut emit_requests,
            physics: physics.as_deref(),
            rng,
            transforms,
        };
        for node in &mut nodes[layout.range(kind)] {
            node.update(&mut ctx);
        }
        emit_requests
    }

    /// Queue the live particle at position `index` for removal at the end
    /// of the current update.
    pub fn mark_for_deletion(&mut self, index: usize) -> bool {
        self.deletions.push(index, self.active)
    }

    /// Drop every particle and restore the natural index order.
    pub fn remove_all_particles(&mut self) {
        self.indices.copy_from_slice(&self.natural_indices);
        self.active = 0;
        self.deletions.clear();
        self.transforms.clear();
    }

    /// Restart: no particles, zero time, fresh node state.
    pub fn reset(&mut self) {
        self.remove_all_particles();
        self.time = 0.0;
        self.emit_counter = 0.0;
        if let Some(layer) = &self.layer {
            self.memory = LayerMemory::new(layer.columns());
        }
        if let Some(seed) = self.seed {
            self.rng = SmallRng::seed_from_u64(seed);
        }
        for node in &mut self.nodes {
            node.reset();
        }
    }

    // ========== Attributes ==========

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.layer.as_ref()?.attribute_index(name)
    }

    /// Values of attribute `index` for every live particle, in live order.
    ///
    /// Empty if `index` is unknown or `T` is not the attribute's type.
    pub fn attribute_values<T: PinValue>(&self, index: usize) -> Vec<T> {
        let slots = self.attribute_slot_values::<T>(index);
        if slots.is_empty() {
            return Vec::new();
        }
        self.indices[..self.active]
            .iter()
            .filter_map(|&slot| slots.get(slot as usize).cloned())
            .collect()
    }

    /// Raw attribute column, one entry per slot.
    pub fn attribute_slot_values<T: PinValue>(&self, index: usize) -> &[T] {
        match self
            .layer
            .as_ref()
            .and_then(|layer| layer.attributes().get(index))
        {
            Some(info) => T::slice(self.memory.column(info.column)),
            None => &[],
        }
    }

    // ========== Uniforms ==========

    pub fn uniforms(&self) -> &UniformStore {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut UniformStore {
        &mut self.uniforms
    }

    /// Set a uniform by name, allocating its slot on first use.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<Value>) {
        self.uniforms.set_by_name(name, value);
    }

    // ========== Collaborators ==========

    pub fn set_physics(&mut self, physics: Option<Arc<dyn PhysicsWorld>>) {
        self.physics = physics;
    }

    /// Per-particle transforms written by the last RenderTransforms pass,
    /// in live order. Particles removed at the end of that update are
    /// dropped from the array, so entry `i` belongs to `indices()[i]`.
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    /// [`transforms`](Self::transforms) as raw bytes for upload.
    pub fn transform_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.transforms)
    }

    // ========== State ==========

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn capacity(&self) -> usize {
        self.natural_indices.len()
    }

    pub fn num_active_particles(&self) -> usize {
        self.active
    }

    /// Attribute slots of the live particles.
    pub fn indices(&self) -> &[u32] {
        &self.indices[..self.active]
    }

    /// Fractional particles carried to the next emission.
    pub fn emit_counter_remainder(&self) -> f32 {
        self.emit_counter
    }

    pub fn instance_layout(&self) -> &InstanceLayout {
        &self.layout
    }

    pub fn nodes(&self) -> &[NodeInstance] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::ParticleGraphLayer;
    use crate::graph::GraphNode;
    use crate::nodes::NodeKind;
    use crate::value::ValueType;

    fn emitting_layer(capacity: usize, rate: f32) -> ParticleGraphLayer {
        let mut layer = ParticleGraphLayer::new(capacity);
        let count = layer.emit.add(GraphNode::constant(rate));
        layer
            .emit
            .add_with_inputs(GraphNode::new(NodeKind::Emit), &[(count, "value")]);
        layer
    }

    #[test]
    fn test_apply_resets_counters() {
        let layer = emitting_layer(10, 2.5).commit().expect("commit");
        let mut instance = LayerInstance::with_seed(1);
        instance.apply(layer.clone());
        instance.update(0.1, true);
        assert_eq!(instance.num_active_particles(), 2);

        instance.apply(layer);
        assert_eq!(instance.num_active_particles(), 0);
        assert_eq!(instance.emit_counter_remainder(), 0.0);
        assert_eq!(instance.indices().len(), 0);
    }

    #[test]
    fn test_emission_clamped_to_capacity() {
        let layer = emitting_layer(4, 3.0).commit().expect("commit");
        let mut instance = LayerInstance::with_seed(1);
        instance.apply(layer);
        instance.update(0.1, true);
        instance.update(0.1, true);
        assert_eq!(instance.num_active_particles(), 4);
        assert!(!instance.emit_new_particles(1.0));
        // The clamped whole particles are not carried over.
        assert_eq!(instance.emit_counter_remainder(), 0.0);
    }

    #[test]
    fn test_not_emitting_skips_emit_graph() {
        let layer = emitting_layer(4, 3.0).commit().expect("commit");
        let mut instance = LayerInstance::with_seed(1);
        instance.apply(layer);
        instance.update(0.1, false);
        assert_eq!(instance.num_active_particles(), 0);
    }

    #[test]
    fn test_instance_layout_ranges() {
        let mut layer = emitting_layer(4, 1.0);
        let zero = layer.init.add(GraphNode::constant(0.0f32));
        layer.init.add_with_inputs(
            GraphNode::set_attribute("age", ValueType::Float),
            &[(zero, "value")],
        );
        layer.update.add(GraphNode::get_attribute("age", ValueType::Float));

        let mut instance = LayerInstance::new();
        instance.apply(layer.commit().expect("commit"));
        let layout = instance.instance_layout();
        assert_eq!(layout.emit, 0..2);
        assert_eq!(layout.init, 2..4);
        assert_eq!(layout.update, 4..5);
        assert_eq!(instance.nodes().len(), 5);
    }

    #[test]
    fn test_time_scale() {
        let layer = ParticleGraphLayer::new(2).with_time_scale(0.5).commit().expect("commit");
        let mut instance = LayerInstance::new();
        instance.apply(layer);
        instance.update(1.0, true);
        instance.update(1.0, true);
        assert!((instance.time() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_update_without_layer_is_noop() {
        let mut instance = LayerInstance::new();
        instance.update(1.0, true);
        assert_eq!(instance.time(), 0.0);
        assert!(!instance.emit_new_particles(5.0));
    }

    #[test]
    fn test_remove_all_restores_natural_order() {
        let layer = emitting_layer(4, 4.0).commit().expect("commit");
        let mut instance = LayerInstance::with_seed(3);
        instance.apply(layer);
        instance.update(0.1, true);
        instance.mark_for_deletion(0);
        instance.update(0.1, false);
        assert_eq!(instance.num_active_particles(), 3);

        instance.remove_all_particles();
        assert_eq!(instance.num_active_particles(), 0);
        instance.emit_new_particles(4.0);
        assert_eq!(instance.indices(), &[0, 1, 2, 3]);
    }
}
