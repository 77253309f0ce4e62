//! Deferred particle destruction.
//!
//! Nodes never remove particles directly. They mark live-window positions
//! during an update pass; the layer drains the queue once the pass is done.
//! Draining sorts positions in descending order and swap-removes each one
//! with the last live index, so no removal invalidates a position still
//! waiting in the queue.

/// Bounded queue of live-window positions marked for removal.
#[derive(Clone, Debug, Default)]
pub struct DestructionQueue {
    positions: Vec<usize>,
    capacity: usize,
}

impl DestructionQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Queue `position` for removal.
    ///
    /// Ignored (returns `false`) when `position >= active_particles` or the
    /// queue already holds `capacity` entries.
    pub fn push(&mut self, position: usize, active_particles: usize) -> bool {
        if position >= active_particles {
            log::trace!(
                "deletion of position {} ignored, {} particles active",
                position,
                active_particles
            );
            return false;
        }
        if self.positions.len() >= self.capacity {
            log::trace!("deletion queue full, position {} deferred", position);
            return false;
        }
        self.positions.push(position);
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Remove every queued position from the live window.
    ///
    /// Returns the number of particles removed. Duplicate marks of the same
    /// position remove one particle.
    pub fn drain_into(&mut self, indices: &mut [u32], active_particles: &mut usize) -> usize {
        self.drain_with(active_particles, |position, last| indices.swap(position, last))
    }

    /// Like [`drain_into`](Self::drain_into), but hands every swap-remove
    /// to `swap` as `(position, last)` so several per-position tables can
    /// be kept in step.
    pub fn drain_with<F>(&mut self, active_particles: &mut usize, mut swap: F) -> usize
    where
        F: FnMut(usize, usize),
    {
        if self.positions.is_empty() {
            return 0;
        }
        self.positions.sort_unstable_by(|a, b| b.cmp(a));
        self.positions.dedup();

        let mut removed = 0;
        for &position in &self.positions {
            if position >= *active_particles {
                continue;
            }
            *active_particles -= 1;
            swap(position, *active_particles);
            removed += 1;
        }
        self.positions.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_bounds() {
        let mut queue = DestructionQueue::new(2);
        assert!(!queue.push(5, 5));
        assert!(queue.push(0, 5));
        assert!(queue.push(1, 5));
        assert!(!queue.push(2, 5));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_swap_remove_keeps_survivors() {
        let mut indices: Vec<u32> = (0..6).collect();
        let mut active = 6;
        let mut queue = DestructionQueue::new(6);
        for p in [1, 4, 2] {
            queue.push(p, active);
        }
        assert_eq!(queue.drain_into(&mut indices, &mut active), 3);
        assert_eq!(active, 3);

        let mut live: Vec<u32> = indices[..active].to_vec();
        live.sort();
        assert_eq!(live, vec![0, 3, 5]);

        // The whole table is still a permutation.
        let mut all = indices.clone();
        all.sort();
        assert_eq!(all, (0..6).collect::<Vec<u32>>());
    }

    #[test]
    fn test_duplicates_remove_once() {
        let mut indices: Vec<u32> = (0..4).collect();
        let mut active = 4;
        let mut queue = DestructionQueue::new(4);
        queue.push(2, active);
        queue.push(2, active);
        assert_eq!(queue.drain_into(&mut indices, &mut active), 1);
        assert_eq!(active, 3);
        assert!(!indices[..active].contains(&2));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_last_and_first() {
        let mut indices: Vec<u32> = (0..3).collect();
        let mut active = 3;
        let mut queue = DestructionQueue::new(3);
        queue.push(0, active);
        queue.push(2, active);
        queue.drain_into(&mut indices, &mut active);
        assert_eq!(active, 1);
        assert_eq!(indices[0], 1);
    }

    #[test]
    fn test_drain_with_keeps_tables_in_step() {
        let mut indices: Vec<u32> = (0..5).collect();
        let mut labels: Vec<char> = "abcde".chars().collect();
        let mut active = 5;
        let mut queue = DestructionQueue::new(5);
        queue.push(1, active);
        queue.push(3, active);
        queue.drain_with(&mut active, |position, last| {
            indices.swap(position, last);
            labels.swap(position, last);
        });
        assert_eq!(active, 3);
        for i in 0..active {
            assert_eq!(labels[i], (b'a' + indices[i] as u8) as char);
        }
    }
}
