//! Ready-made particle layers.
//!
//! Every preset builds a complete [`ParticleGraphLayer`] (emit, init and
//! update graphs) that commits against the builtin operators. They double
//! as worked examples of graph authoring.
//!
//! | Preset | Emission | Motion | Attributes |
//! |--------|----------|--------|------------|
//! | [`Presets::fountain`] | cone, per second | gravity | position, velocity, age, lifetime |
//! | [`Presets::fire`] | circle, per second | damped rise | + color over life |
//! | [`Presets::explosion`] | sphere, one burst | bounce | position, velocity, age, lifetime |
//!
//! Each preset also writes per-particle render transforms.
//!
//! # Example
//!
//! ```ignore
//! let mut effect = ParticleGraphEffect::new();
//! effect.add_layer(Presets::fire(Vec3::ZERO, 200.0));
//! effect.add_layer(Presets::explosion(Vec3::Y, 300));
//! ```

use glam::{Quat, Vec3};

use crate::compile::ParticleGraphLayer;
use crate::curve::Curve;
use crate::dispatch::Operator;
use crate::graph::{GraphNode, ParticleGraph};
use crate::nodes::{
    Bounce, CircleShape, ConeShape, EmitBurst, EmitFrom, Expire, NodeKind, ShapeTransform,
    SphereShape,
};
use crate::value::{Color, Value, ValueType};

/// Preset layer constructors.
pub struct Presets;

impl Presets {
    /// Particles shot up from a narrow cone, falling under gravity.
    ///
    /// * `position` - Nozzle position
    /// * `rate` - Particles per second
    pub fn fountain(position: Vec3, rate: f32) -> ParticleGraphLayer {
        let (min_life, max_life) = (2.5, 3.5);
        let mut layer = ParticleGraphLayer::new(capacity_for(rate, max_life));
        emit_per_second(&mut layer.emit, rate);

        let g = &mut layer.init;
        let cone = g.add(GraphNode::new(NodeKind::Cone(ConeShape {
            radius: 0.05,
            angle: 12.0,
            transform: at(position),
            ..Default::default()
        })));
        let speed = g.add(GraphNode::constant(2.5f32));
        let velocity = g.add_with_inputs(
            GraphNode::operator(Operator::Multiply),
            &[(cone, "velocity"), (speed, "value")],
        );
        set_attribute(g, "position", ValueType::Vector3, cone, "position");
        set_attribute(g, "velocity", ValueType::Vector3, velocity, "out");
        let lifetime = g.add(GraphNode::new(NodeKind::Random {
            min: Value::Float(min_life),
            max: Value::Float(max_life),
        }));
        init_age(g, lifetime, "out");

        let g = &mut layer.update;
        let v = g.add(GraphNode::get_attribute("velocity", ValueType::Vector3));
        let gravity = g.add(GraphNode::constant(Vec3::new(0.0, -9.8, 0.0)));
        let v = g.add_with_inputs(
            GraphNode::new(NodeKind::ApplyForce),
            &[(v, "velocity"), (gravity, "value")],
        );
        let p = g.add(GraphNode::get_attribute("position", ValueType::Vector3));
        let p = g.add_with_inputs(
            GraphNode::new(NodeKind::Move),
            &[(p, "position"), (v, "velocity")],
        );
        set_attribute(g, "velocity", ValueType::Vector3, v, "velocity");
        set_attribute(g, "position", ValueType::Vector3, p, "position");
        render(g, p, "position", 0.05);
        expire_and_age(g);

        layer
    }

    /// Embers rising from a disk, slowing down and cooling from yellow to red.
    ///
    /// * `position` - Center of the fire base
    /// * `rate` - Particles per second
    pub fn fire(position: Vec3, rate: f32) -> ParticleGraphLayer {
        let lifetime = 1.5;
        let mut layer = ParticleGraphLayer::new(capacity_for(rate, lifetime));
        emit_per_second(&mut layer.emit, rate);

        let g = &mut layer.init;
        let circle = g.add(GraphNode::new(NodeKind::Circle(CircleShape {
            radius: 0.3,
            transform: at(position),
            ..Default::default()
        })));
        let rise = g.add(GraphNode::new(NodeKind::Random {
            min: Value::Vector3(Vec3::new(-0.2, 0.8, -0.2)),
            max: Value::Vector3(Vec3::new(0.2, 1.6, 0.2)),
        }));
        set_attribute(g, "position", ValueType::Vector3, circle, "position");
        set_attribute(g, "velocity", ValueType::Vector3, rise, "out");
        let life = g.add(GraphNode::constant(lifetime));
        init_age(g, life, "value");

        let g = &mut layer.update;
        let v = g.add(GraphNode::get_attribute("velocity", ValueType::Vector3));
        let limit = g.add(GraphNode::constant(0.6f32));
        let dampen = g.add(GraphNode::constant(0.2f32));
        let v = g.add_with_inputs(
            GraphNode::new(NodeKind::LimitVelocity),
            &[(v, "velocity"), (limit, "value"), (dampen, "value")],
        );
        let p = g.add(GraphNode::get_attribute("position", ValueType::Vector3));
        let p = g.add_with_inputs(
            GraphNode::new(NodeKind::Move),
            &[(p, "position"), (v, "velocity")],
        );
        set_attribute(g, "velocity", ValueType::Vector3, v, "velocity");
        set_attribute(g, "position", ValueType::Vector3, p, "position");

        let age = g.add(GraphNode::get_attribute("age", ValueType::Float));
        let life = g.add(GraphNode::get_attribute("lifetime", ValueType::Float));
        let t = g.add_with_inputs(
            GraphNode::operator(Operator::Divide),
            &[(age, "age"), (life, "lifetime")],
        );
        let gradient = Curve::new(ValueType::Color)
            .with_key(0.0, Color::rgb(1.0, 0.9, 0.3))
            .with_key(1.0, Color::new(0.8, 0.2, 0.0, 0.0));
        let color = g.add_with_inputs(GraphNode::new(NodeKind::Curve(gradient)), &[(t, "out")]);
        set_attribute(g, "color", ValueType::Color, color, "out");

        render(g, p, "position", 0.08);
        expire_and_age(g);

        layer
    }

    /// One burst of `count` particles flying out of a sphere and bouncing
    /// off the physics world.
    pub fn explosion(position: Vec3, count: u32) -> ParticleGraphLayer {
        let mut layer = ParticleGraphLayer::new((count as usize).max(1));
        layer
            .emit
            .add(GraphNode::new(NodeKind::EmitBurst(EmitBurst::new(count as f32))));

        let g = &mut layer.init;
        let sphere = g.add(GraphNode::new(NodeKind::Sphere(SphereShape {
            radius: 0.05,
            emit_from: EmitFrom::Surface,
            transform: at(position),
            ..Default::default()
        })));
        let speed = g.add(GraphNode::new(NodeKind::Random {
            min: Value::Float(2.0),
            max: Value::Float(4.0),
        }));
        let velocity = g.add_with_inputs(
            GraphNode::operator(Operator::Multiply),
            &[(sphere, "velocity"), (speed, "out")],
        );
        set_attribute(g, "position", ValueType::Vector3, sphere, "position");
        set_attribute(g, "velocity", ValueType::Vector3, velocity, "out");
        let life = g.add(GraphNode::constant(1.2f32));
        init_age(g, life, "value");

        let g = &mut layer.update;
        let p = g.add(GraphNode::get_attribute("position", ValueType::Vector3));
        let v = g.add(GraphNode::get_attribute("velocity", ValueType::Vector3));
        let bounce = g.add_with_inputs(
            GraphNode::new(NodeKind::Bounce(Bounce::new(0.5))),
            &[(p, "position"), (v, "velocity")],
        );
        let limit = g.add(GraphNode::constant(0.0f32));
        let dampen = g.add(GraphNode::constant(0.1f32));
        let v = g.add_with_inputs(
            GraphNode::new(NodeKind::LimitVelocity),
            &[(bounce, "velocity"), (limit, "value"), (dampen, "value")],
        );
        set_attribute(g, "position", ValueType::Vector3, bounce, "position");
        set_attribute(g, "velocity", ValueType::Vector3, v, "velocity");
        render(g, bounce, "position", 0.04);
        expire_and_age(g);

        layer
    }
}

/// Enough slots for `rate` particles per second living `lifetime` seconds.
fn capacity_for(rate: f32, lifetime: f32) -> usize {
    (rate.max(0.0) * lifetime).ceil() as usize + 1
}

fn at(position: Vec3) -> ShapeTransform {
    ShapeTransform {
        translation: position,
        ..Default::default()
    }
}

fn set_attribute(g: &mut ParticleGraph, name: &str, value_type: ValueType, source: usize, pin: &str) -> usize {
    g.add_with_inputs(GraphNode::set_attribute(name, value_type), &[(source, pin)])
}

/// Emit `rate * dt` particles per update.
fn emit_per_second(g: &mut ParticleGraph, rate: f32) {
    let rate = g.add(GraphNode::constant(rate));
    let dt = g.add(GraphNode::new(NodeKind::TimeStep));
    let count = g.add_with_inputs(
        GraphNode::operator(Operator::Multiply),
        &[(rate, "value"), (dt, "dt")],
    );
    g.add_with_inputs(GraphNode::new(NodeKind::Emit), &[(count, "out")]);
}

/// Zero age, lifetime from `source`.
fn init_age(g: &mut ParticleGraph, source: usize, pin: &str) {
    set_attribute(g, "lifetime", ValueType::Float, source, pin);
    let zero = g.add(GraphNode::constant(0.0f32));
    set_attribute(g, "age", ValueType::Float, zero, "value");
}

/// Expire against the current age, then advance it.
fn expire_and_age(g: &mut ParticleGraph) {
    let age = g.add(GraphNode::get_attribute("age", ValueType::Float));
    let lifetime = g.add(GraphNode::get_attribute("lifetime", ValueType::Float));
    g.add_with_inputs(
        GraphNode::new(NodeKind::Expire(Expire::default())),
        &[(age, "age"), (lifetime, "lifetime")],
    );
    let dt = g.add(GraphNode::new(NodeKind::TimeStep));
    let older = g.add_with_inputs(
        GraphNode::operator(Operator::Add),
        &[(age, "age"), (dt, "dt")],
    );
    set_attribute(g, "age", ValueType::Float, older, "out");
}

fn render(g: &mut ParticleGraph, source: usize, pin: &str, size: f32) {
    let rotation = g.add(GraphNode::constant(Quat::IDENTITY));
    let scale = g.add(GraphNode::constant(Vec3::splat(size)));
    g.add_with_inputs(
        GraphNode::new(NodeKind::RenderTransforms),
        &[(source, pin), (rotation, "value"), (scale, "value")],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerInstance;

    fn run(layer: &ParticleGraphLayer, ticks: usize, dt: f32) -> LayerInstance {
        let mut instance = LayerInstance::with_seed(11);
        instance.apply(layer.commit().expect("preset commits"));
        for _ in 0..ticks {
            instance.update(dt, true);
        }
        instance
    }

    #[test]
    fn test_fountain_runs() {
        let layer = Presets::fountain(Vec3::ZERO, 120.0);
        let instance = run(&layer, 60, 1.0 / 60.0);
        let active = instance.num_active_particles();
        assert!((119..=120).contains(&active), "{}", active);
        assert_eq!(instance.transforms().len(), active);

        let velocity = instance.attribute_index("velocity").expect("velocity");
        // Gravity has pulled every velocity below its launch speed.
        for v in instance.attribute_values::<Vec3>(velocity) {
            assert!(v.y < 2.5);
        }
    }

    #[test]
    fn test_fire_colors_over_life() {
        let layer = Presets::fire(Vec3::ZERO, 60.0);
        let instance = run(&layer, 30, 1.0 / 60.0);
        let color = instance.attribute_index("color").expect("color");
        let colors = instance.attribute_values::<Color>(color);
        assert_eq!(colors.len(), instance.num_active_particles());
        assert!(colors.iter().all(|c| c.r >= 0.8 - 1e-4 && c.r <= 1.0 + 1e-4));
    }

    #[test]
    fn test_explosion_bursts_then_expires() {
        let layer = Presets::explosion(Vec3::ZERO, 50);
        let mut instance = run(&layer, 1, 0.1);
        assert_eq!(instance.num_active_particles(), 50);
        for _ in 0..20 {
            instance.update(0.1, true);
        }
        assert_eq!(instance.num_active_particles(), 0);
    }
}
