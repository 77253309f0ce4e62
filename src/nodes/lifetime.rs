//! Lifetime nodes: mark particles for deletion.

use serde::{Deserialize, Serialize};

use super::NodeUpdate;
use crate::context::{collect1, collect2, UpdateContext};
use crate::memory::PinBinding;

/// When a particle counts as expired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpireBoundary {
    /// `time >= lifetime`
    #[default]
    Inclusive,
    /// `time > lifetime`
    Exclusive,
}

impl ExpireBoundary {
    #[inline]
    pub fn is_expired(self, time: f32, lifetime: f32) -> bool {
        match self {
            ExpireBoundary::Inclusive => time >= lifetime,
            ExpireBoundary::Exclusive => time > lifetime,
        }
    }
}

/// Expire node settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expire {
    pub boundary: ExpireBoundary,
}

/// Deletes particles whose age reached their lifetime.
#[derive(Clone, Debug)]
pub struct ExpireInstance {
    boundary: ExpireBoundary,
    time: PinBinding,
    lifetime: PinBinding,
}

impl ExpireInstance {
    pub fn new(boundary: ExpireBoundary, time: PinBinding, lifetime: PinBinding) -> Self {
        Self {
            boundary,
            time,
            lifetime,
        }
    }
}

impl NodeUpdate for ExpireInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let boundary = self.boundary;
        let expired = collect2(ctx, &self.time, &self.lifetime, |t: &f32, l: &f32| {
            boundary.is_expired(*t, *l)
        });
        mark_all(ctx, &expired);
    }
}

/// Deletes particles whose condition is true.
#[derive(Clone, Debug)]
pub struct DestroyInstance {
    condition: PinBinding,
}

impl DestroyInstance {
    pub fn new(condition: PinBinding) -> Self {
        Self { condition }
    }
}

impl NodeUpdate for DestroyInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let doomed = collect1(ctx, &self.condition, |c: &bool| *c);
        mark_all(ctx, &doomed);
    }
}

fn mark_all(ctx: &mut UpdateContext<'_>, flags: &[bool]) {
    for (i, &flag) in flags.iter().enumerate() {
        if flag {
            ctx.mark_for_deletion(i);
        }
    }
}
