//! Integration tests for effects and emitters.

use std::sync::Arc;

use particle_graph::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sample_effect() -> ParticleGraphEffect {
    let mut effect = ParticleGraphEffect::new();
    effect.add_layer(Presets::fountain(Vec3::ZERO, 200.0));
    effect.add_layer(Presets::fire(Vec3::new(2.0, 0.0, 0.0), 100.0));
    effect
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_json_roundtrip_preserves_layers() {
    let effect = sample_effect();
    let json = effect.to_json().expect("serialize");
    let loaded = ParticleGraphEffect::from_json(&json).expect("deserialize");
    assert_eq!(loaded, effect);
    assert_eq!(loaded.num_layers(), 2);
    assert!(loaded.commit().is_ok());
}

#[test]
fn test_loaded_effect_runs() {
    let json = sample_effect().to_json().expect("serialize");
    let effect = ParticleGraphEffect::from_json(&json).expect("deserialize");

    let mut emitter = ParticleGraphEmitter::with_seed(11);
    emitter.set_effect(&effect).expect("activate");
    for _ in 0..30 {
        emitter.update(1.0 / 60.0);
    }
    assert!(emitter.layers().iter().all(|l| l.num_active_particles() > 0));
}

// ============================================================================
// Activation
// ============================================================================

#[test]
fn test_unmatched_operator_fails_activation() {
    init_logger();
    let mut effect = sample_effect();
    let mut broken = ParticleGraphLayer::new(8);
    let a = broken.update.add(GraphNode::constant(Vec3::ONE));
    let b = broken.update.add(GraphNode::constant(true));
    broken
        .update
        .add_with_inputs(GraphNode::operator(Operator::Add), &[(a, "value"), (b, "value")]);
    if let Some(layer) = effect.layer_mut(1) {
        *layer = broken;
    }

    let mut emitter = ParticleGraphEmitter::new();
    match emitter.set_effect(&effect) {
        Err(EffectError::Layer { layer, error }) => {
            assert_eq!(layer, 1);
            assert!(matches!(error, GraphError::NoMatchingPermutation { .. }), "{:?}", error);
        }
        other => panic!("expected layer error, got {:?}", other),
    }
    assert!(emitter.layers().is_empty());

    // Another emitter is unaffected.
    let mut healthy = ParticleGraphEmitter::with_seed(1);
    healthy.set_effect(&sample_effect()).expect("activate");
    healthy.update(0.1);
    assert!(healthy.num_active_particles() > 0);
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn test_stop_emitting_lets_particles_die() {
    let mut emitter = ParticleGraphEmitter::with_seed(4);
    emitter.set_effect(&sample_effect()).expect("activate");
    for _ in 0..30 {
        emitter.update(1.0 / 30.0);
    }
    assert!(emitter.num_active_particles() > 0);

    emitter.set_emitting(false);
    // Longer than every preset lifetime.
    for _ in 0..150 {
        emitter.update(1.0 / 30.0);
    }
    assert_eq!(emitter.num_active_particles(), 0);

    emitter.reset();
    assert!(emitter.is_emitting());
    emitter.update(1.0 / 30.0);
    assert!(emitter.num_active_particles() > 0);
}

#[test]
fn test_physics_reaches_every_layer() {
    let mut effect = ParticleGraphEffect::new();
    effect.add_layer(Presets::explosion(Vec3::new(0.0, 0.2, 0.0), 32));
    effect.add_layer(Presets::explosion(Vec3::new(5.0, 0.2, 0.0), 32));

    let mut emitter = ParticleGraphEmitter::with_seed(8);
    emitter.set_effect(&effect).expect("activate");
    let floor: Arc<dyn PhysicsWorld> =
        Arc::new(PlaneWorld::new(Vec3::new(0.0, -9.8, 0.0)).with_floor(0.0));
    emitter.set_physics(Some(floor));

    for _ in 0..60 {
        emitter.update(1.0 / 60.0);
    }
    for layer in emitter.layers() {
        let position = layer.attribute_index("position").expect("position");
        for p in layer.attribute_values::<Vec3>(position) {
            assert!(p.y >= -1e-3, "particle fell through the floor: {:?}", p);
        }
    }
}

#[test]
fn test_remove_all_particles() {
    let mut emitter = ParticleGraphEmitter::with_seed(2);
    emitter.set_effect(&sample_effect()).expect("activate");
    emitter.update(0.1);
    assert!(emitter.num_active_particles() > 0);
    emitter.remove_all_particles();
    assert_eq!(emitter.num_active_particles(), 0);
    assert!(emitter.layers().iter().all(|l| l.indices().is_empty()));

    // Slots are handed out in natural order again.
    emitter.update(0.1);
    for layer in emitter.layers() {
        let live = layer.indices();
        let natural: Vec<u32> = (0..live.len() as u32).collect();
        assert_eq!(live, natural.as_slice());
    }
}
