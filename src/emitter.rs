//! Effect emitters.
//!
//! A [`ParticleGraphEmitter`] plays a [`ParticleGraphEffect`]: it commits
//! every layer and runs one [`LayerInstance`] per layer.
//!
//! # Activation
//!
//! | Outcome of `set_effect` | Emitter state |
//! |-------------------------|---------------|
//! | every layer commits | one fresh instance per layer |
//! | any layer fails | no layers, error logged and returned |
//!
//! A failed effect never leaves a partially running emitter behind, and
//! other emitters are untouched.
//!
//! # Example
//!
//! ```ignore
//! let mut effect = ParticleGraphEffect::new();
//! effect.add_layer(Presets::fountain(Vec3::ZERO, 1000.0));
//!
//! let mut emitter = ParticleGraphEmitter::new();
//! emitter.set_effect(&effect)?;
//! emitter.set_physics(Some(Arc::new(PlaneWorld::new(Vec3::NEG_Y * 9.8).with_floor(0.0))));
//! loop {
//!     emitter.update(1.0 / 60.0);
//! }
//! ```

use std::sync::Arc;

use crate::compile::CompiledLayer;
use crate::effect::ParticleGraphEffect;
use crate::error::EffectError;
use crate::layer::LayerInstance;
use crate::physics::PhysicsWorld;

/// Runs every layer of an effect.
pub struct ParticleGraphEmitter {
    layers: Vec<LayerInstance>,
    compiled: Vec<Arc<CompiledLayer>>,
    emitting: bool,
    seed: Option<u64>,
    physics: Option<Arc<dyn PhysicsWorld>>,
}

impl Default for ParticleGraphEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleGraphEmitter {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            compiled: Vec::new(),
            emitting: true,
            seed: None,
            physics: None,
        }
    }

    /// Emitter whose layers use seeded random streams.
    ///
    /// Layer `i` is seeded with `seed + i`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new()
        }
    }

    /// Commit and start `effect`, replacing the current one.
    pub fn set_effect(&mut self, effect: &ParticleGraphEffect) -> Result<(), EffectError> {
        self.layers.clear();
        self.compiled.clear();

        let compiled = match effect.commit() {
            Ok(compiled) => compiled,
            Err(err) => {
                log::error!("particle effect failed to activate: {}", err);
                return Err(err);
            }
        };

        for (i, layer) in compiled.iter().enumerate() {
            let mut instance = match self.seed {
                Some(seed) => LayerInstance::with_seed(seed.wrapping_add(i as u64)),
                None => LayerInstance::new(),
            };
            instance.set_physics(self.physics.clone());
            instance.apply(layer.clone());
            self.layers.push(instance);
        }
        self.compiled = compiled;
        log::debug!("particle effect activated with {} layers", self.layers.len());
        Ok(())
    }

    /// Advance every layer by `time_step` seconds.
    pub fn update(&mut self, time_step: f32) {
        for layer in &mut self.layers {
            layer.update(time_step, self.emitting);
        }
    }

    /// Start or stop spawning. Live particles keep updating either way.
    pub fn set_emitting(&mut self, emitting: bool) {
        self.emitting = emitting;
    }

    pub fn is_emitting(&self) -> bool {
        self.emitting
    }

    /// Re-apply every layer and restart emission.
    pub fn reset(&mut self) {
        for (layer, compiled) in self.layers.iter_mut().zip(&self.compiled) {
            layer.apply(compiled.clone());
            layer.reset();
        }
        self.emitting = true;
    }

    pub fn remove_all_particles(&mut self) {
        for layer in &mut self.layers {
            layer.remove_all_particles();
        }
    }

    /// Live particles across all layers.
    pub fn num_active_particles(&self) -> usize {
        self.layers.iter().map(LayerInstance::num_active_particles).sum()
    }

    /// Install the physics world used by Bounce nodes of every layer.
    pub fn set_physics(&mut self, physics: Option<Arc<dyn PhysicsWorld>>) {
        for layer in &mut self.layers {
            layer.set_physics(physics.clone());
        }
        self.physics = physics;
    }

    pub fn layers(&self) -> &[LayerInstance] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [LayerInstance] {
        &mut self.layers
    }
}
