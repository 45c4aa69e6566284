use crate::snapshot::{LeafSnapshot, OriginSnapshot};
use crate::tree::Tree;
use crate::value::Value;

use glam::IVec3;

/// A sparse voxel grid: the owning front of a [`Tree`] plus its traversal
/// sessions.
///
/// A grid is constructed empty with a fixed background value; point writes
/// grow the tree on demand and nothing shrinks it. Dropping the grid releases
/// every node, since ownership is strictly hierarchical.
///
/// Grids are single-threaded: callers that share one across threads must wrap
/// it in their own mutual exclusion, including for read-only access concurrent
/// with writes.
#[derive(Debug)]
pub struct Grid<V: Value> {
    tree: Tree<V>,
}

impl<V: Value> Grid<V> {
    /// An empty grid where every coordinate reads `background`.
    pub fn new(background: V) -> Self {
        Self {
            tree: Tree::new(background),
        }
    }

    /// The value of all unpopulated space, fixed at construction.
    #[inline]
    pub fn background(&self) -> V {
        self.tree.background()
    }

    /// The value at `p`.
    #[inline]
    pub fn get(&self, p: IVec3) -> V {
        self.tree.get(p)
    }

    /// Writes the voxel at `p`.
    #[inline]
    pub fn set(&mut self, p: IVec3, value: V) {
        self.tree.set(p, value)
    }

    /// Adds `delta` to the voxel at `p` with wraparound, returning the new value.
    #[inline]
    pub fn add(&mut self, p: IVec3, delta: V) -> V {
        self.tree.add(p, delta)
    }

    /// Whether the voxel at `p` is active.
    #[inline]
    pub fn is_active(&self, p: IVec3) -> bool {
        self.tree.is_active(p)
    }

    /// Active voxels in the whole grid.
    #[inline]
    pub fn active_voxel_count(&self) -> u64 {
        self.tree.active_voxel_count()
    }

    /// The number of populated leaf nodes.
    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.tree.leaf_count()
    }

    /// The number of populated lower internal nodes.
    #[inline]
    pub fn lower_count(&self) -> usize {
        self.tree.lower_count()
    }

    /// The underlying tree.
    #[inline]
    pub fn tree(&self) -> &Tree<V> {
        &self.tree
    }

    /// Captures an iteration session over all populated leaf blocks.
    pub fn leaf_blocks(&self) -> LeafSnapshot<V> {
        LeafSnapshot::capture(&self.tree)
    }

    /// Captures an iteration session over the origins of all populated lower
    /// internal nodes.
    pub fn lower_origins(&self) -> OriginSnapshot {
        OriginSnapshot::capture(&self.tree)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn two_distant_writes_scenario() {
        let mut grid = Grid::<u16>::new(0);
        grid.set(IVec3::new(0, 0, 0), 5);
        grid.set(IVec3::new(1000, 1000, 1000), 9);

        assert_eq!(grid.get(IVec3::new(0, 0, 0)), 5);
        assert_eq!(grid.get(IVec3::new(1000, 1000, 1000)), 9);
        assert_eq!(grid.get(IVec3::new(5, 5, 5)), 0);
        assert_eq!(grid.leaf_blocks().len(), 2);
        assert_eq!(grid.lower_origins().len(), 2);
    }

    #[test]
    fn add_returns_the_new_value() {
        let mut grid = Grid::<u8>::new(0);
        assert_eq!(grid.add(IVec3::ONE, 4), 4);
        assert_eq!(grid.add(IVec3::ONE, 254), 2);
        assert_eq!(grid.get(IVec3::ONE), 2);
    }

    #[test]
    fn counts_match_snapshot_lengths() {
        let mut grid = Grid::<u8>::new(0);
        for &p in &[
            IVec3::new(0, 0, 0),
            IVec3::new(200, 0, 0),
            IVec3::new(0, 5000, 0),
        ] {
            grid.set(p, 1);
        }
        assert_eq!(grid.leaf_count(), grid.leaf_blocks().len());
        assert_eq!(grid.lower_count(), grid.lower_origins().len());
        assert_eq!(grid.leaf_count(), 3);
        assert_eq!(grid.active_voxel_count(), 3);
    }
}
