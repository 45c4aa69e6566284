use crate::error::GridError;
use crate::grid::Grid;
use crate::snapshot::{LeafSnapshot, OriginSnapshot};
use crate::value::Value;

use glam::IVec3;
use log::debug;
use slab::Slab;

/// A checked reference to a grid owned by a [`GridRegistry`].
///
/// Handles are generational: destroying a grid invalidates its handle even if
/// the slot is later reused, so use-after-destroy is detected instead of
/// reading another grid's memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Entry<V: Value> {
    generation: u32,
    grid: Grid<V>,
}

/// Owns grids on behalf of callers that identify them by value-like handles
/// rather than borrows.
///
/// Every handle-keyed operation validates the handle first and fails with
/// [`GridError::StaleHandle`] on a destroyed or unknown grid, including a
/// double destroy.
#[derive(Debug, Default)]
pub struct GridRegistry<V: Value> {
    grids: Slab<Entry<V>>,
    next_generation: u32,
}

impl<V: Value> GridRegistry<V> {
    pub fn new() -> Self {
        Self {
            grids: Slab::new(),
            next_generation: 0,
        }
    }

    /// The number of live grids.
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Creates an empty grid with the given background and returns its handle.
    pub fn create(&mut self, background: V) -> GridHandle {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        let index = self.grids.insert(Entry {
            generation,
            grid: Grid::new(background),
        }) as u32;
        let handle = GridHandle { index, generation };
        debug!("created grid {handle:?} with background {background:?}");
        handle
    }

    /// Destroys the grid behind `handle`, releasing its whole tree.
    pub fn destroy(&mut self, handle: GridHandle) -> Result<(), GridError> {
        self.get(handle)?;
        self.grids.remove(handle.index as usize);
        debug!("destroyed grid {handle:?}");
        Ok(())
    }

    /// Borrows the grid behind `handle`.
    pub fn get(&self, handle: GridHandle) -> Result<&Grid<V>, GridError> {
        self.grids
            .get(handle.index as usize)
            .filter(|entry| entry.generation == handle.generation)
            .map(|entry| &entry.grid)
            .ok_or(GridError::StaleHandle(handle))
    }

    /// Mutably borrows the grid behind `handle`.
    pub fn get_mut(&mut self, handle: GridHandle) -> Result<&mut Grid<V>, GridError> {
        self.grids
            .get_mut(handle.index as usize)
            .filter(|entry| entry.generation == handle.generation)
            .map(|entry| &mut entry.grid)
            .ok_or(GridError::StaleHandle(handle))
    }

    /// The value at `p` in the grid behind `handle`.
    pub fn get_value(&self, handle: GridHandle, p: IVec3) -> Result<V, GridError> {
        Ok(self.get(handle)?.get(p))
    }

    /// Writes the voxel at `p` in the grid behind `handle`.
    pub fn set_value(&mut self, handle: GridHandle, p: IVec3, value: V) -> Result<(), GridError> {
        self.get_mut(handle)?.set(p, value);
        Ok(())
    }

    /// Adds `delta` at `p` with wraparound, returning the new value.
    pub fn add_value(&mut self, handle: GridHandle, p: IVec3, delta: V) -> Result<V, GridError> {
        Ok(self.get_mut(handle)?.add(p, delta))
    }

    /// Whether the voxel at `p` is active.
    pub fn is_active(&self, handle: GridHandle, p: IVec3) -> Result<bool, GridError> {
        Ok(self.get(handle)?.is_active(p))
    }

    /// Captures a leaf-block iteration session for the grid behind `handle`.
    pub fn leaf_blocks(&self, handle: GridHandle) -> Result<LeafSnapshot<V>, GridError> {
        Ok(self.get(handle)?.leaf_blocks())
    }

    /// Captures a lower-node origin session for the grid behind `handle`.
    pub fn lower_origins(&self, handle: GridHandle) -> Result<OriginSnapshot, GridError> {
        Ok(self.get(handle)?.lower_origins())
    }
}
