//! Broad-phase: wraps the [`dynamic_tree::DynamicTree`] with a move
//! buffer and a pair cache, turning raw tree mutations into deduplicated
//! candidate-overlap pairs for the world to turn into contacts.

pub mod dynamic_tree;

use std::collections::HashSet;

use dynamic_tree::{DynamicTree, ProxyId};

use crate::collision::aabb::{Aabb, RayCastInput};
use crate::math::Vec2;

/// A normalized (low, high) candidate-overlap pair; `low < high` always,
/// so `(a, b)` and `(b, a)` collapse to the same key for dedup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyPair {
    /// The smaller proxy id.
    pub low: ProxyId,
    /// The larger proxy id.
    pub high: ProxyId,
}

impl ProxyPair {
    fn new(a: ProxyId, b: ProxyId) -> Self {
        if a < b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

/// Move-buffer + pair-cache broad-phase over a [`DynamicTree`].
pub struct BroadPhase<T: Clone> {
    tree: DynamicTree<T>,
    move_buffer: Vec<ProxyId>,
}

impl<T: Clone> Default for BroadPhase<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> BroadPhase<T> {
    /// An empty broad-phase.
    pub fn new() -> Self {
        Self {
            tree: DynamicTree::new(),
            move_buffer: Vec::new(),
        }
    }

    /// Create a proxy and buffer it for pairing on the next
    /// [`BroadPhase::update_pairs`].
    pub fn create_proxy(&mut self, aabb: Aabb, user_data: T) -> ProxyId {
        let id = self.tree.create_proxy(aabb, user_data);
        self.buffer_move(id);
        id
    }

    /// Destroy a proxy, removing it from the move buffer if pending.
    pub fn destroy_proxy(&mut self, id: ProxyId) {
        self.unbuffer_move(id);
        self.tree.destroy_proxy(id);
    }

    /// Move a proxy; buffers it for re-pairing only if the tree actually
    /// had to reinsert it (displacement exceeded the current fat box).
    pub fn move_proxy(&mut self, id: ProxyId, aabb: Aabb, displacement: Vec2) {
        if self.tree.move_proxy(id, aabb, displacement) {
            self.buffer_move(id);
        }
    }

    /// The user payload for a proxy.
    pub fn user_data(&self, id: ProxyId) -> &T {
        self.tree.user_data(id)
    }

    /// The current fattened AABB of a proxy.
    pub fn fat_aabb(&self, id: ProxyId) -> Aabb {
        self.tree.fat_aabb(id)
    }

    fn buffer_move(&mut self, id: ProxyId) {
        if !self.move_buffer.contains(&id) {
            self.move_buffer.push(id);
        }
    }

    fn unbuffer_move(&mut self, id: ProxyId) {
        self.move_buffer.retain(|&m| m != id);
    }

    /// Query a fixed AABB (not the move buffer) against the tree,
    /// invoking `visit` for each overlapping proxy.
    pub fn query(&self, aabb: &Aabb, visit: impl FnMut(ProxyId) -> bool) {
        self.tree.query(aabb, visit);
    }

    /// Ray query against the tree.
    pub fn ray_cast(&self, input: &RayCastInput, visit: impl FnMut(ProxyId, &RayCastInput) -> f64) {
        self.tree.ray_cast(input, visit);
    }

    /// For each moved proxy, query the tree for overlaps against its
    /// current fat box and collect a deduplicated pair list; drains the
    /// move buffer. Self-pairs are suppressed.
    ///
    /// A pair is returned once per call in which at least one of its
    /// proxies appeared in the move buffer — stable, never-moved pairs
    /// are not re-emitted, per the broad-phase contract.
    pub fn update_pairs(&mut self) -> Vec<ProxyPair> {
        let mut pairs: HashSet<ProxyPair> = HashSet::new();

        for &moved in &self.move_buffer {
            let fat = self.tree.fat_aabb(moved);
            let mut found = Vec::new();
            self.tree.query(&fat, |other| {
                found.push(other);
                true
            });
            for other in found {
                if other == moved {
                    continue;
                }
                pairs.insert(ProxyPair::new(moved, other));
            }
        }

        self.move_buffer.clear();

        let mut sorted: Vec<ProxyPair> = pairs.into_iter().collect();
        sorted.sort();
        sorted
    }

    /// Whether two proxies' fat boxes currently overlap (used after
    /// contact destruction to decide whether a pair should persist).
    pub fn test_overlap(&self, a: ProxyId, b: ProxyId) -> bool {
        self.tree.fat_aabb(a).overlaps(&self.tree.fat_aabb(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_aabb(cx: f64, cy: f64, half: f64) -> Aabb {
        Aabb::new(Vec2::new(cx - half, cy - half), Vec2::new(cx + half, cy + half))
    }

    #[test]
    fn two_overlapping_creations_pair_once() {
        let mut bp: BroadPhase<u32> = BroadPhase::new();
        bp.create_proxy(box_aabb(0.0, 0.0, 1.0), 1);
        bp.create_proxy(box_aabb(0.5, 0.0, 1.0), 2);

        let pairs = bp.update_pairs();
        assert_eq!(pairs.len(), 1);

        // Nothing moved since; no pairs should be re-emitted.
        let pairs_again = bp.update_pairs();
        assert!(pairs_again.is_empty());
    }

    #[test]
    fn disjoint_proxies_produce_no_pairs() {
        let mut bp: BroadPhase<u32> = BroadPhase::new();
        bp.create_proxy(box_aabb(0.0, 0.0, 1.0), 1);
        bp.create_proxy(box_aabb(100.0, 0.0, 1.0), 2);

        assert!(bp.update_pairs().is_empty());
    }
}
