use crate::mask::NodeMask;
use crate::shape::NodeShape;
use crate::value::Value;

use glam::IVec3;
use std::fmt;
use std::iter;
use std::marker::PhantomData;

/// A node of the sparse tree: either a dense leaf or an internal fan-out level.
///
/// Coordinates passed to node methods are world coordinates; each node masks
/// out the bits relevant to its own level.
pub trait TreeNode {
    type Value: Value;

    /// Log2 of the node's span along each axis, in voxels.
    const TOTAL_LOG2: u32;

    /// A node whose entire span holds the constant `fill`, all active.
    fn filled(origin: IVec3, fill: Self::Value) -> Self;

    /// A node carved out of background space: nothing active, reads `ambient`.
    fn empty(origin: IVec3, ambient: Self::Value) -> Self;

    /// The minimum corner of this node's extent.
    fn origin(&self) -> IVec3;

    /// The value at `p`, which must lie within this node's span. Empty slots
    /// resolve to `background`.
    fn get(&self, p: IVec3, background: Self::Value) -> Self::Value;

    /// Writes the voxel at `p`, materializing descendants on demand. Children
    /// grown out of empty slots are pre-filled with `background`.
    fn set(&mut self, p: IVec3, value: Self::Value, background: Self::Value);

    /// Whether the voxel at `p` is active.
    fn is_active(&self, p: IVec3) -> bool;

    /// Active voxels in this subtree, counting constant tiles by their full span.
    fn active_voxel_count(&self) -> u64;

    /// The origin of the node that would contain `p` at this level.
    #[inline]
    fn origin_for(p: IVec3) -> IVec3 {
        let span = 1i32 << Self::TOTAL_LOG2;
        p & !(span - 1)
    }
}

/// One child slot of an [`InternalNode`].
///
/// Ownership is strictly tree-shaped, so a materialized child is exclusively
/// owned by its slot.
#[derive(Debug)]
pub(crate) enum ChildSlot<C: TreeNode> {
    /// Unpopulated space; reads as the grid background.
    Empty,
    /// A constant value covering the slot's entire span without a materialized child.
    Tile(C::Value),
    /// A materialized child node.
    Child(Box<C>),
}

/// An internal tree node, generic over its child node type `C` and fan-out
/// shape `S`.
///
/// Instantiated twice: lower nodes fan out over leaves and upper nodes fan out
/// over lower nodes. Each slot is empty, a constant tile, or an owned child;
/// the active mask tracks which slots carry data.
pub struct InternalNode<C: TreeNode, S> {
    origin: IVec3,
    slots: Box<[ChildSlot<C>]>,
    active: NodeMask,
    shape: PhantomData<S>,
}

// Manual impl so that `S` stays a pure marker without a `Debug` bound.
impl<C: TreeNode + fmt::Debug, S> fmt::Debug for InternalNode<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalNode")
            .field("origin", &self.origin)
            .field("slots", &self.slots)
            .field("active", &self.active)
            .finish()
    }
}

impl<C, S> InternalNode<C, S>
where
    C: TreeNode,
    S: NodeShape,
{
    /// Linear index of the child slot covering `p`.
    #[inline]
    fn slot_of(p: IVec3) -> usize {
        let offset = (p >> C::TOTAL_LOG2 as i32) & (S::DIM - 1);
        S::slot_index(offset)
    }

    /// Returns the existing child covering `p`, or materializes one first.
    ///
    /// A slot holding a tile becomes a child pre-filled with the tile's value;
    /// an empty slot becomes a child pre-filled with `background`. This is the
    /// operation that grows the tree on demand.
    pub(crate) fn get_or_create_child(&mut self, p: IVec3, background: C::Value) -> &mut C {
        let i = Self::slot_of(p);
        if !matches!(self.slots[i], ChildSlot::Child(_)) {
            let child = match &self.slots[i] {
                ChildSlot::Tile(tile) => C::filled(C::origin_for(p), *tile),
                _ => C::empty(C::origin_for(p), background),
            };
            self.slots[i] = ChildSlot::Child(Box::new(child));
        }
        match &mut self.slots[i] {
            ChildSlot::Child(child) => child,
            _ => unreachable!(),
        }
    }

    /// Replaces the child slot covering `p` with a constant active tile,
    /// dropping any materialized child in that slot.
    pub(crate) fn set_child_tile(&mut self, p: IVec3, tile: C::Value) {
        let i = Self::slot_of(p);
        self.slots[i] = ChildSlot::Tile(tile);
        self.active.set_on(i);
    }

    /// Iterates the materialized children in ascending slot order.
    ///
    /// This ordering is stable across repeated calls on an unmodified node; the
    /// snapshot sessions depend on it.
    pub fn child_nodes(&self) -> impl Iterator<Item = &C> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            ChildSlot::Child(child) => Some(child.as_ref()),
            _ => None,
        })
    }

    /// The number of materialized children.
    pub fn child_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, ChildSlot::Child(_)))
            .count()
    }
}

impl<C, S> TreeNode for InternalNode<C, S>
where
    C: TreeNode,
    S: NodeShape,
{
    type Value = C::Value;

    const TOTAL_LOG2: u32 = S::LOG2DIM + C::TOTAL_LOG2;

    fn filled(origin: IVec3, fill: C::Value) -> Self {
        Self {
            origin,
            slots: iter::repeat_with(|| ChildSlot::Tile(fill))
                .take(S::SLOTS)
                .collect(),
            active: NodeMask::all_on(S::SLOTS),
            shape: PhantomData,
        }
    }

    fn empty(origin: IVec3, _ambient: C::Value) -> Self {
        Self {
            origin,
            slots: iter::repeat_with(|| ChildSlot::Empty)
                .take(S::SLOTS)
                .collect(),
            active: NodeMask::new(S::SLOTS),
            shape: PhantomData,
        }
    }

    fn origin(&self) -> IVec3 {
        self.origin
    }

    fn get(&self, p: IVec3, background: C::Value) -> C::Value {
        match &self.slots[Self::slot_of(p)] {
            ChildSlot::Empty => background,
            ChildSlot::Tile(tile) => *tile,
            ChildSlot::Child(child) => child.get(p, background),
        }
    }

    fn set(&mut self, p: IVec3, value: C::Value, background: C::Value) {
        let i = Self::slot_of(p);
        self.get_or_create_child(p, background).set(p, value, background);
        self.active.set_on(i);
    }

    fn is_active(&self, p: IVec3) -> bool {
        let i = Self::slot_of(p);
        match &self.slots[i] {
            ChildSlot::Empty => false,
            ChildSlot::Tile(_) => self.active.is_on(i),
            ChildSlot::Child(child) => child.is_active(p),
        }
    }

    fn active_voxel_count(&self) -> u64 {
        let tile_span = 1u64 << (3 * C::TOTAL_LOG2);
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                ChildSlot::Empty => 0,
                ChildSlot::Tile(_) => {
                    if self.active.is_on(i) {
                        tile_span
                    } else {
                        0
                    }
                }
                ChildSlot::Child(child) => child.active_voxel_count(),
            })
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::leaf::{LeafNode, LEAF_SIZE};
    use crate::shape::LowerShape;

    type Lower = InternalNode<LeafNode<u8>, LowerShape>;

    #[test]
    fn empty_node_reads_background() {
        let node = Lower::empty(IVec3::ZERO, 0);
        assert_eq!(node.get(IVec3::new(100, 50, 3), 7), 7);
        assert!(!node.is_active(IVec3::new(100, 50, 3)));
        assert_eq!(node.child_count(), 0);
        assert_eq!(node.active_voxel_count(), 0);
    }

    #[test]
    fn set_materializes_one_leaf() {
        let mut node = Lower::empty(IVec3::ZERO, 0);
        node.set(IVec3::new(9, 10, 11), 5, 0);

        assert_eq!(node.get(IVec3::new(9, 10, 11), 0), 5);
        assert!(node.is_active(IVec3::new(9, 10, 11)));
        assert_eq!(node.child_count(), 1);
        assert_eq!(node.active_voxel_count(), 1);

        // A second write into the same leaf reuses it.
        node.set(IVec3::new(8, 8, 8), 6, 0);
        assert_eq!(node.child_count(), 1);
        assert_eq!(node.active_voxel_count(), 2);
    }

    #[test]
    fn tile_reads_everywhere_in_its_span() {
        let mut node = Lower::empty(IVec3::ZERO, 0);
        node.set_child_tile(IVec3::new(16, 16, 16), 9);

        assert_eq!(node.get(IVec3::new(16, 16, 16), 0), 9);
        assert_eq!(node.get(IVec3::new(23, 23, 23), 0), 9);
        assert!(node.is_active(IVec3::new(20, 20, 20)));
        // Outside the tile's slot nothing changes.
        assert_eq!(node.get(IVec3::new(0, 0, 0), 0), 0);
        assert_eq!(node.child_count(), 0);
        assert_eq!(node.active_voxel_count(), LEAF_SIZE as u64);
    }

    #[test]
    fn write_into_tile_splats_the_tile_value() {
        let mut node = Lower::empty(IVec3::ZERO, 0);
        node.set_child_tile(IVec3::new(16, 16, 16), 9);
        node.set(IVec3::new(17, 18, 19), 2, 0);

        // The written voxel changed, the rest of the former tile kept its value.
        assert_eq!(node.get(IVec3::new(17, 18, 19), 0), 2);
        assert_eq!(node.get(IVec3::new(16, 16, 16), 0), 9);
        assert_eq!(node.get(IVec3::new(23, 23, 23), 0), 9);
        assert_eq!(node.child_count(), 1);
        assert_eq!(node.active_voxel_count(), LEAF_SIZE as u64);
    }

    #[test]
    fn children_come_back_in_ascending_slot_order() {
        let mut node = Lower::empty(IVec3::ZERO, 0);
        // Insert out of order.
        node.set(IVec3::new(120, 120, 120), 1, 0);
        node.set(IVec3::new(0, 0, 0), 2, 0);
        node.set(IVec3::new(64, 0, 0), 3, 0);

        let origins: Vec<_> = node.child_nodes().map(|leaf| leaf.origin()).collect();
        let mut sorted_by_slot = origins.clone();
        sorted_by_slot.sort_by_key(|o| Lower::slot_of(*o));
        assert_eq!(origins, sorted_by_slot);
        assert_eq!(origins.len(), 3);

        // Repeated traversal yields the identical sequence.
        let again: Vec<_> = node.child_nodes().map(|leaf| leaf.origin()).collect();
        assert_eq!(origins, again);
    }

    #[test]
    fn negative_coordinates_land_in_range() {
        let mut node = Lower::empty(IVec3::splat(-128), 0);
        node.set(IVec3::splat(-1), 4, 0);
        assert_eq!(node.get(IVec3::splat(-1), 0), 4);
        assert_eq!(node.child_nodes().next().unwrap().origin(), IVec3::splat(-8));
    }
}
