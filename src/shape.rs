use glam::IVec3;
use ndshape::{ConstPow2Shape3i32, ConstShape};

/// The fan-out of one tree level: a cubic grid of child slots.
///
/// Each level's slot lookup is a shift and mask per axis, so the shapes are all
/// powers of two.
pub trait NodeShape {
    /// The number of bits to shift a coordinate to translate between this level and the one below.
    const LOG2DIM: u32;
    /// Child slots along each axis.
    const DIM: i32;
    /// Total child slots in one node.
    const SLOTS: usize;

    /// Linearizes a local slot offset. Every component of `offset` must be in `0..DIM`.
    fn slot_index(offset: IVec3) -> usize;

    /// Inverse of [`slot_index`](Self::slot_index).
    fn slot_offset(index: usize) -> IVec3;
}

/// The fan-out of a leaf node: 8x8x8 voxels.
pub type LeafShape = ConstPow2Shape3i32<3, 3, 3>;
/// The fan-out of a lower internal node: 16x16x16 leaves, spanning 128 voxels per axis.
pub type LowerShape = ConstPow2Shape3i32<4, 4, 4>;
/// The fan-out of an upper internal node: 32x32x32 lower nodes, spanning 4096 voxels per axis.
pub type UpperShape = ConstPow2Shape3i32<5, 5, 5>;

macro_rules! impl_node_shape {
    ($name:ty, $log2:literal) => {
        impl NodeShape for $name {
            const LOG2DIM: u32 = $log2;
            const DIM: i32 = 1 << $log2;
            const SLOTS: usize = 1 << (3 * $log2);

            #[inline]
            fn slot_index(offset: IVec3) -> usize {
                debug_assert!(
                    offset.cmpge(IVec3::ZERO).all()
                        && offset.cmplt(IVec3::splat(Self::DIM)).all()
                );
                <$name>::linearize(offset.to_array()) as usize
            }

            #[inline]
            fn slot_offset(index: usize) -> IVec3 {
                IVec3::from_array(<$name>::delinearize(index as i32))
            }
        }
    };
}

impl_node_shape!(LeafShape, 3);
impl_node_shape!(LowerShape, 4);
impl_node_shape!(UpperShape, 5);
