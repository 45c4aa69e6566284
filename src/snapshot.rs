use crate::error::GridError;
use crate::leaf::LEAF_SIZE;
use crate::mask::NodeMask;
use crate::node::TreeNode;
use crate::shape::{LeafShape, NodeShape};
use crate::tree::Tree;
use crate::value::Value;

use glam::IVec3;

/// One leaf block captured by a [`LeafSnapshot`]: origin, dense value buffer,
/// and active mask, all copied out of the live tree.
#[derive(Clone, Debug)]
pub struct LeafEntry<V: Value> {
    origin: IVec3,
    values: Box<[V; LEAF_SIZE]>,
    mask: NodeMask,
}

impl<V: Value> LeafEntry<V> {
    /// The minimum corner of the captured leaf's extent.
    #[inline]
    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    /// The dense value buffer, in slot order.
    #[inline]
    pub fn values(&self) -> &[V; LEAF_SIZE] {
        &self.values
    }

    /// The active mask captured with the buffer.
    #[inline]
    pub fn mask(&self) -> &NodeMask {
        &self.mask
    }

    /// Iterates `(world coordinate, value)` for the captured active voxels.
    pub fn iter_on(&self) -> impl Iterator<Item = (IVec3, V)> + '_ {
        self.mask
            .iter_on()
            .map(move |i| (self.origin + LeafShape::slot_offset(i), self.values[i]))
    }
}

/// An iteration session over all populated leaf blocks.
///
/// Built by one full tree walk in deterministic order. The payloads are copied
/// at capture time, so mutating the grid afterwards can never invalidate an
/// outstanding snapshot; to observe new state, capture again.
#[derive(Clone, Debug)]
pub struct LeafSnapshot<V: Value> {
    entries: Vec<LeafEntry<V>>,
}

impl<V: Value> LeafSnapshot<V> {
    pub(crate) fn capture(tree: &Tree<V>) -> Self {
        let mut entries = Vec::new();
        tree.visit_leaves(|leaf| {
            entries.push(LeafEntry {
                origin: leaf.origin(),
                values: Box::new(*leaf.values()),
                mask: leaf.mask().clone(),
            })
        });
        Self { entries }
    }

    /// The number of captured leaf blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&LeafEntry<V>> {
        self.entries.get(index)
    }

    /// Like [`get`](Self::get), but with a descriptive error.
    pub fn try_get(&self, index: usize) -> Result<&LeafEntry<V>, GridError> {
        self.get(index).ok_or(GridError::IndexOutOfRange {
            index,
            count: self.len(),
        })
    }

    /// The origin of the entry at `index`.
    #[inline]
    pub fn origin(&self, index: usize) -> Option<IVec3> {
        self.get(index).map(|e| e.origin)
    }

    /// Iterates the captured entries in capture order.
    pub fn iter(&self) -> impl Iterator<Item = &LeafEntry<V>> {
        self.entries.iter()
    }
}

/// An iteration session over the origins of populated lower internal nodes.
///
/// Records origins only, no value payloads, again captured by one full walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OriginSnapshot {
    origins: Vec<IVec3>,
}

impl OriginSnapshot {
    pub(crate) fn capture<V: Value>(tree: &Tree<V>) -> Self {
        let mut origins = Vec::new();
        tree.visit_lower_nodes(|lower| origins.push(lower.origin()));
        Self { origins }
    }

    /// The number of captured origins.
    #[inline]
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// The origin at `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<IVec3> {
        self.origins.get(index).copied()
    }

    /// Like [`get`](Self::get), but with a descriptive error.
    pub fn try_get(&self, index: usize) -> Result<IVec3, GridError> {
        self.get(index).ok_or(GridError::IndexOutOfRange {
            index,
            count: self.len(),
        })
    }

    /// Iterates the captured origins in capture order.
    pub fn iter(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.origins.iter().copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::Grid;
    use crate::leaf::LEAF_DIM;

    #[test]
    fn single_voxel_leaf_buffer() {
        let mut grid = Grid::<u16>::new(0);
        grid.set(IVec3::ZERO, 5);

        let snap = grid.leaf_blocks();
        assert_eq!(snap.len(), 1);
        let entry = snap.get(0).unwrap();
        assert_eq!(entry.origin(), IVec3::ZERO);

        let offset = LeafShape::slot_index(IVec3::ZERO);
        let non_background: Vec<_> = entry
            .values()
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .collect();
        assert_eq!(non_background, vec![(offset, &5)]);
        assert_eq!(entry.mask().count_on(), 1);
        assert_eq!(entry.iter_on().collect::<Vec<_>>(), vec![(IVec3::ZERO, 5)]);
    }

    #[test]
    fn out_of_range_index_fails_loudly() {
        let mut grid = Grid::<u8>::new(0);
        grid.set(IVec3::ZERO, 1);

        let leaves = grid.leaf_blocks();
        assert!(leaves.get(1).is_none());
        assert_eq!(
            leaves.try_get(1).unwrap_err(),
            GridError::IndexOutOfRange { index: 1, count: 1 }
        );

        let lowers = grid.lower_origins();
        assert_eq!(lowers.get(0), Some(IVec3::ZERO));
        assert_eq!(
            lowers.try_get(7).unwrap_err(),
            GridError::IndexOutOfRange { index: 7, count: 1 }
        );
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let mut grid = Grid::<u8>::new(0);
        grid.set(IVec3::new(1, 1, 1), 3);

        let snap = grid.leaf_blocks();
        assert_eq!(snap.len(), 1);

        // Structural growth and an in-place overwrite after capture.
        grid.set(IVec3::new(5000, 0, 0), 9);
        grid.set(IVec3::new(1, 1, 1), 200);

        assert_eq!(snap.len(), 1);
        let entry = snap.get(0).unwrap();
        assert_eq!(
            entry.values()[LeafShape::slot_index(IVec3::new(1, 1, 1))],
            3
        );

        // A fresh capture observes the new state.
        let snap = grid.leaf_blocks();
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn lower_origins_ignore_leaf_multiplicity() {
        let mut grid = Grid::<u16>::new(0);
        // Many voxels, two lower nodes.
        for i in 0..LEAF_DIM {
            grid.set(IVec3::new(i, 0, 0), 1);
            grid.set(IVec3::new(i + 1000, 1000, 1000), 1);
        }

        let lowers = grid.lower_origins();
        assert_eq!(lowers.len(), 2);
        let origins: Vec<_> = lowers.iter().collect();
        assert!(origins.contains(&IVec3::ZERO));
        assert!(origins.contains(&IVec3::new(896, 896, 896)));
    }

    #[test]
    fn capture_order_is_reproducible() {
        let mut grid = Grid::<u8>::new(0);
        for &p in &[
            IVec3::new(-4096, 0, 0),
            IVec3::new(0, 0, 0),
            IVec3::new(8192, -8192, 64),
            IVec3::new(32, 32, 32),
        ] {
            grid.set(p, 1);
        }

        let a = grid.leaf_blocks();
        let b = grid.leaf_blocks();
        assert_eq!(
            a.iter().map(|e| e.origin()).collect::<Vec<_>>(),
            b.iter().map(|e| e.origin()).collect::<Vec<_>>()
        );
        assert_eq!(grid.lower_origins(), grid.lower_origins());
    }
}
