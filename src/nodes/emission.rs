//! Emission nodes.
//!
//! Both nodes only request particles. The layer spawns them once the emit
//! graph pass is over, through its fractional emission accumulator.

use serde::{Deserialize, Serialize};

use super::NodeUpdate;
use crate::context::UpdateContext;
use crate::memory::PinBinding;
use crate::value::Value;

/// Requests `count` particles per update.
#[derive(Clone, Debug)]
pub struct EmitInstance {
    count: PinBinding,
}

impl EmitInstance {
    pub fn new(count: PinBinding) -> Self {
        Self { count }
    }
}

impl NodeUpdate for EmitInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if let Some(Value::Float(count)) = ctx.read_value(&self.count, 0) {
            ctx.emit(count);
        }
    }
}

/// Burst schedule: `count` particles after `delay` seconds, repeated every
/// `interval` seconds for `cycles` bursts (0 = forever).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitBurst {
    pub count: f32,
    pub delay: f32,
    pub cycles: u32,
    pub interval: f32,
}

impl Default for EmitBurst {
    fn default() -> Self {
        Self {
            count: 10.0,
            delay: 0.0,
            cycles: 1,
            interval: 1.0,
        }
    }
}

impl EmitBurst {
    pub fn new(count: f32) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_cycles(mut self, cycles: u32, interval: f32) -> Self {
        self.cycles = cycles;
        self.interval = interval;
        self
    }
}

/// Fires an [`EmitBurst`] schedule. At most one burst fires per update.
#[derive(Clone, Debug)]
pub struct EmitBurstInstance {
    burst: EmitBurst,
    elapsed: f32,
    fired: u32,
}

impl EmitBurstInstance {
    pub fn new(burst: EmitBurst) -> Self {
        Self {
            burst,
            elapsed: 0.0,
            fired: 0,
        }
    }

    /// Bursts fired since the last reset.
    pub fn fired(&self) -> u32 {
        self.fired
    }

    fn next_due(&self) -> f32 {
        self.burst.delay + self.fired as f32 * self.burst.interval.max(0.0)
    }
}

impl NodeUpdate for EmitBurstInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if self.burst.cycles != 0 && self.fired >= self.burst.cycles {
            return;
        }
        self.elapsed += ctx.time_step();
        if self.elapsed >= self.next_due() {
            ctx.emit(self.burst.count);
            self.fired += 1;
        }
    }

    fn reset(&mut self) {
        self.elapsed = 0.0;
        self.fired = 0;
    }
}
