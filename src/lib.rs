//! Sparse hierarchical voxel grids in the style of a VDB build tree.
//!
//! A [`Grid`] maps signed 32-bit integer coordinates to fixed-width unsigned
//! scalars ([`Value`], instantiated for `u8` and `u16`). Storage is a
//! four-level sparse tree: a root hash map of [`UpperNode`]s (32³ fan-out),
//! each fanning out into [`LowerNode`]s (16³), each fanning out into dense
//! [`LeafNode`]s of 8³ voxels. A grid starts empty and uniform at its
//! background value; point writes materialize exactly the node chain needed to
//! hold them, and nothing shrinks the tree afterwards.
//!
//! # Reads, writes, and accumulation
//!
//! [`Grid::get`] never fails: untouched space reads the background, space under
//! a constant tile reads the tile's value, and allocated leaves read their
//! stored voxel. [`Grid::set`] grows the tree on demand, and [`Grid::add`]
//! accumulates with the value type's native wraparound.
//!
//! # Iteration sessions
//!
//! [`Grid::leaf_blocks`] and [`Grid::lower_origins`] flatten the current tree
//! into indexable snapshots ([`LeafSnapshot`], [`OriginSnapshot`]). Sessions
//! copy their payloads up front, so later mutation of the grid can never
//! invalidate them; they simply do not observe it. Traversal order is
//! deterministic: root nodes by ascending origin, then ascending slot index at
//! every level, reproducible across repeated captures of an unmodified tree.
//!
//! # Handles
//!
//! [`GridRegistry`] owns grids for callers that cannot hold borrows and hands
//! out generational [`GridHandle`]s. Any use of a destroyed handle, including
//! a double destroy, is reported as [`GridError::StaleHandle`] rather than
//! touching freed memory.
//!
//! # Concurrency
//!
//! Everything here is single-threaded and synchronous. Sharing a grid between
//! threads requires external mutual exclusion, even for read-only access
//! concurrent with a writer, since writes relink internal slots.

mod error;
mod grid;
mod leaf;
mod mask;
mod node;
mod registry;
mod shape;
mod snapshot;
mod tree;
mod value;

pub use error::*;
pub use grid::*;
pub use leaf::*;
pub use mask::*;
pub use node::*;
pub use registry::*;
pub use shape::*;
pub use snapshot::*;
pub use tree::*;
pub use value::*;

pub use glam;

use ahash::AHashMap;

type SmallKeyHashMap<K, V> = AHashMap<K, V>;
