use crate::leaf::LeafNode;
use crate::node::{InternalNode, TreeNode};
use crate::shape::{LowerShape, UpperShape};
use crate::value::Value;
use crate::SmallKeyHashMap;

use glam::IVec3;
use smallvec::SmallVec;

/// A lower internal node: 16x16x16 leaf slots, spanning 128 voxels per axis.
pub type LowerNode<V> = InternalNode<LeafNode<V>, LowerShape>;
/// An upper internal node: 32x32x32 lower-node slots, spanning 4096 voxels per axis.
pub type UpperNode<V> = InternalNode<LowerNode<V>, UpperShape>;

/// The sparse voxel tree: a hash map from upper-node origins to upper nodes,
/// plus the background value for all unpopulated space.
///
/// Any coordinate maps to exactly one root / lower / leaf chain by masking per
/// level, and writes materialize that chain on demand. The background is fixed
/// at construction.
#[derive(Debug)]
pub struct Tree<V: Value> {
    background: V,
    roots: SmallKeyHashMap<IVec3, UpperNode<V>>,
}

impl<V: Value> Tree<V> {
    /// An empty tree where every coordinate reads `background`.
    pub fn new(background: V) -> Self {
        Self {
            background,
            roots: Default::default(),
        }
    }

    /// The value of all unpopulated space.
    #[inline]
    pub fn background(&self) -> V {
        self.background
    }

    /// The value at `p`: the stored voxel, the nearest enclosing tile's value,
    /// or the background. Never fails.
    pub fn get(&self, p: IVec3) -> V {
        match self.roots.get(&UpperNode::<V>::origin_for(p)) {
            Some(upper) => upper.get(p, self.background),
            None => self.background,
        }
    }

    /// Writes the voxel at `p`, materializing upper, lower, and leaf nodes as
    /// needed.
    pub fn set(&mut self, p: IVec3, value: V) {
        let background = self.background;
        let origin = UpperNode::<V>::origin_for(p);
        self.roots
            .entry(origin)
            .or_insert_with(|| UpperNode::empty(origin, background))
            .set(p, value, background);
    }

    /// Adds `delta` to the voxel at `p` with fixed-width wraparound, returning
    /// the new value. Equivalent to `set(p, get(p).wrapping_add(delta))`.
    pub fn add(&mut self, p: IVec3, delta: V) -> V {
        let new_value = self.get(p).wrapping_add(delta);
        self.set(p, new_value);
        new_value
    }

    /// Whether the voxel at `p` is active (written, or covered by an active tile).
    pub fn is_active(&self, p: IVec3) -> bool {
        self.roots
            .get(&UpperNode::<V>::origin_for(p))
            .is_some_and(|upper| upper.is_active(p))
    }

    /// Active voxels in the whole tree, counting tiles by their span.
    pub fn active_voxel_count(&self) -> u64 {
        self.roots.values().map(|r| r.active_voxel_count()).sum()
    }

    /// The number of populated leaf nodes.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.visit_leaves(|_| count += 1);
        count
    }

    /// The number of populated lower internal nodes.
    pub fn lower_count(&self) -> usize {
        let mut count = 0;
        self.visit_lower_nodes(|_| count += 1);
        count
    }

    /// Visits every populated leaf in deterministic order: upper nodes by
    /// ascending origin, then descending in ascending slot order at each level.
    pub fn visit_leaves(&self, mut f: impl FnMut(&LeafNode<V>)) {
        for upper in self.roots_in_order() {
            for lower in upper.child_nodes() {
                for leaf in lower.child_nodes() {
                    f(leaf);
                }
            }
        }
    }

    /// Visits every populated lower internal node in the same deterministic
    /// order as [`visit_leaves`](Self::visit_leaves).
    pub fn visit_lower_nodes(&self, mut f: impl FnMut(&LowerNode<V>)) {
        for upper in self.roots_in_order() {
            for lower in upper.child_nodes() {
                f(lower);
            }
        }
    }

    /// Root nodes in ascending origin order. The root map is unordered, so the
    /// keys are sorted on every walk to keep traversal reproducible.
    fn roots_in_order(&self) -> impl Iterator<Item = &UpperNode<V>> + '_ {
        let mut keys: SmallVec<[IVec3; 8]> = self.roots.keys().copied().collect();
        keys.sort_unstable_by_key(|k| (k.x, k.y, k.z));
        keys.into_iter().map(move |k| &self.roots[&k])
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
