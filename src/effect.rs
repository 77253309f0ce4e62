//! Multi-layer particle effects.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::compile::{CompiledLayer, ParticleGraphLayer};
use crate::error::EffectError;

/// An ordered set of particle layers that play together.
///
/// # Example
///
/// ```ignore
/// let mut effect = ParticleGraphEffect::new();
/// effect.add_layer(Presets::fountain(Vec3::ZERO, 500.0));
/// effect.add_layer(Presets::fire(Vec3::ZERO, 200.0));
/// let json = effect.to_json()?;
/// let loaded = ParticleGraphEffect::from_json(&json)?;
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleGraphEffect {
    #[serde(default)]
    layers: Vec<ParticleGraphLayer>,
}

impl ParticleGraphEffect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow with default layers or truncate to `count` layers.
    pub fn set_num_layers(&mut self, count: usize) {
        self.layers.resize_with(count, ParticleGraphLayer::default);
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> Option<&ParticleGraphLayer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut ParticleGraphLayer> {
        self.layers.get_mut(index)
    }

    /// Append a layer and return its index.
    pub fn add_layer(&mut self, layer: ParticleGraphLayer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn layers(&self) -> &[ParticleGraphLayer] {
        &self.layers
    }

    /// Commit every layer, stopping at the first failure.
    pub fn commit(&self) -> Result<Vec<Arc<CompiledLayer>>, EffectError> {
        self.layers
            .iter()
            .enumerate()
            .map(|(layer, description)| {
                description
                    .commit()
                    .map_err(|error| EffectError::Layer { layer, error })
            })
            .collect()
    }

    pub fn from_json(json: &str) -> Result<Self, EffectError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, EffectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    #[test]
    fn test_set_num_layers() {
        let mut effect = ParticleGraphEffect::new();
        effect.set_num_layers(3);
        assert_eq!(effect.num_layers(), 3);
        assert_eq!(effect.layer(2).map(|l| l.capacity), Some(16));
        effect.set_num_layers(1);
        assert_eq!(effect.num_layers(), 1);
        assert!(effect.layer(1).is_none());
    }

    #[test]
    fn test_commit_reports_failing_layer() {
        let mut effect = ParticleGraphEffect::new();
        effect.add_layer(ParticleGraphLayer::new(8));
        effect.add_layer(ParticleGraphLayer::new(0));
        match effect.commit() {
            Err(EffectError::Layer { layer, error }) => {
                assert_eq!(layer, 1);
                assert_eq!(error, GraphError::InvalidCapacity);
            }
            other => panic!("unexpected {:?}", other.map(|l| l.len())),
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ParticleGraphEffect::from_json("{ not json"),
            Err(EffectError::Json(_))
        ));
    }

    #[test]
    fn test_empty_object_loads() {
        let effect = ParticleGraphEffect::from_json("{}").expect("load");
        assert_eq!(effect.num_layers(), 0);
    }
}
