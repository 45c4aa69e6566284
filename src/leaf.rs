use crate::mask::NodeMask;
use crate::node::TreeNode;
use crate::shape::{LeafShape, NodeShape};
use crate::value::Value;

use glam::IVec3;

/// Voxels stored by one leaf node.
pub const LEAF_SIZE: usize = LeafShape::SLOTS;
/// Span of a leaf node along each axis, in voxels.
pub const LEAF_DIM: i32 = LeafShape::DIM;

/// A dense 8x8x8 block of voxels at unit resolution.
///
/// Every leaf stores a full value array regardless of how many voxels are
/// active; inactive voxels read back the fill value the leaf was created with.
/// The active mask records which voxels have actually been written.
#[derive(Clone, Debug)]
pub struct LeafNode<V> {
    origin: IVec3,
    values: [V; LEAF_SIZE],
    mask: NodeMask,
}

impl<V: Value> LeafNode<V> {
    #[inline]
    fn offset_of(p: IVec3) -> usize {
        LeafShape::slot_index(p & (LEAF_DIM - 1))
    }

    /// The minimum corner of this leaf's extent.
    #[inline]
    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    /// The dense value buffer, in slot order.
    #[inline]
    pub fn values(&self) -> &[V; LEAF_SIZE] {
        &self.values
    }

    /// The active-voxel mask, in slot order.
    #[inline]
    pub fn mask(&self) -> &NodeMask {
        &self.mask
    }

    /// The number of active voxels.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.mask.count_on()
    }

    /// Iterates `(world coordinate, value)` for every active voxel, in slot order.
    pub fn iter_on(&self) -> impl Iterator<Item = (IVec3, V)> + '_ {
        self.mask
            .iter_on()
            .map(move |i| (self.origin + LeafShape::slot_offset(i), self.values[i]))
    }
}

impl<V: Value> TreeNode for LeafNode<V> {
    type Value = V;

    const TOTAL_LOG2: u32 = LeafShape::LOG2DIM;

    fn filled(origin: IVec3, fill: V) -> Self {
        Self {
            origin,
            values: [fill; LEAF_SIZE],
            mask: NodeMask::all_on(LEAF_SIZE),
        }
    }

    fn empty(origin: IVec3, ambient: V) -> Self {
        Self {
            origin,
            values: [ambient; LEAF_SIZE],
            mask: NodeMask::new(LEAF_SIZE),
        }
    }

    fn origin(&self) -> IVec3 {
        self.origin
    }

    fn get(&self, p: IVec3, _background: V) -> V {
        self.values[Self::offset_of(p)]
    }

    fn set(&mut self, p: IVec3, value: V, _background: V) {
        debug_assert_eq!(Self::origin_for(p), self.origin);
        let offset = Self::offset_of(p);
        self.values[offset] = value;
        self.mask.set_on(offset);
    }

    fn is_active(&self, p: IVec3) -> bool {
        self.mask.is_on(Self::offset_of(p))
    }

    fn active_voxel_count(&self) -> u64 {
        self.mask.count_on() as u64
    }
}
