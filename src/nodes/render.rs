//! Render output node.

use glam::{Mat4, Quat, Vec3};

use super::NodeUpdate;
use crate::container::{with_reader, ContainerRead};
use crate::context::UpdateContext;
use crate::memory::PinBinding;

/// Fills the layer's per-particle transform array, one matrix per live
/// particle in live order.
#[derive(Clone, Debug)]
pub struct RenderTransformsInstance {
    position: PinBinding,
    rotation: PinBinding,
    scale: PinBinding,
}

impl RenderTransformsInstance {
    pub fn new(position: PinBinding, rotation: PinBinding, scale: PinBinding) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }
}

impl NodeUpdate for RenderTransformsInstance {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let n = ctx.num_particles();
        let mut transforms = ctx.prepare_transforms(n);
        {
            let p = ctx.input::<Vec3>(&self.position);
            let r = ctx.input::<Quat>(&self.rotation);
            let s = ctx.input::<Vec3>(&self.scale);
            with_reader!(p, |p| with_reader!(r, |r| with_reader!(s, |s| {
                for (i, m) in transforms.iter_mut().enumerate() {
                    *m = Mat4::from_scale_rotation_translation(*s.get(i), *r.get(i), *p.get(i));
                }
            })));
        }
        ctx.restore_transforms(transforms);
    }
}
