//! Read-only physics queries used by force and collision nodes.
//!
//! The simulation never owns a physics world. Layers hold a shared
//! [`PhysicsWorld`] and nodes such as Bounce query it during update.
//! Implementations must be safe to query from any thread.

use glam::Vec3;

/// Result of a successful raycast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// World-space hit position.
    pub position: Vec3,
    /// Surface normal at the hit, unit length.
    pub normal: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
}

/// World queried by particle nodes.
pub trait PhysicsWorld: Send + Sync {
    /// Gravity acceleration.
    fn gravity(&self) -> Vec3;

    /// Cast a ray from `origin` along the unit vector `direction`, up to
    /// `max_distance`. Returns the closest hit.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit>;
}

/// A world made of infinite one-sided planes.
///
/// Useful for floors, walls and tests.
#[derive(Clone, Debug, Default)]
pub struct PlaneWorld {
    gravity: Vec3,
    /// (unit normal, point on plane)
    planes: Vec<(Vec3, Vec3)>,
}

impl PlaneWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            planes: Vec::new(),
        }
    }

    /// Add a plane facing `normal` through `point`.
    pub fn with_plane(mut self, normal: Vec3, point: Vec3) -> Self {
        self.planes.push((normal.normalize_or_zero(), point));
        self
    }

    /// Horizontal floor at height `y`, facing up.
    pub fn with_floor(self, y: f32) -> Self {
        self.with_plane(Vec3::Y, Vec3::new(0.0, y, 0.0))
    }
}

impl PhysicsWorld for PlaneWorld {
    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        let mut closest: Option<RaycastHit> = None;
        for &(normal, point) in &self.planes {
            let denom = direction.dot(normal);
            // Only hit the front face.
            if denom >= 0.0 {
                continue;
            }
            let distance = (point - origin).dot(normal) / denom;
            if distance < 0.0 || distance > max_distance {
                continue;
            }
            if closest.map_or(true, |c| distance < c.distance) {
                closest = Some(RaycastHit {
                    position: origin + direction * distance,
                    normal,
                    distance,
                });
            }
        }
        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_hit() {
        let world = PlaneWorld::new(Vec3::ZERO).with_floor(0.0);
        let hit = world
            .raycast(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 5.0)
            .expect("should hit floor");
        assert!((hit.distance - 2.0).abs() < 0.001);
        assert!(hit.position.abs_diff_eq(Vec3::ZERO, 0.001));
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_miss_beyond_max_distance() {
        let world = PlaneWorld::new(Vec3::ZERO).with_floor(0.0);
        assert!(world.raycast(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 1.0).is_none());
    }

    #[test]
    fn test_back_face_ignored() {
        let world = PlaneWorld::new(Vec3::ZERO).with_floor(0.0);
        assert!(world.raycast(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, 5.0).is_none());
    }

    #[test]
    fn test_closest_plane_wins() {
        let world = PlaneWorld::new(Vec3::ZERO)
            .with_plane(Vec3::NEG_X, Vec3::new(3.0, 0.0, 0.0))
            .with_plane(Vec3::NEG_X, Vec3::new(1.0, 0.0, 0.0));
        let hit = world.raycast(Vec3::ZERO, Vec3::X, 10.0).expect("hit");
        assert!((hit.distance - 1.0).abs() < 0.001);
    }
}
