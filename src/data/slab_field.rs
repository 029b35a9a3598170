//! Slab-owned field storage with explicit ghost planes.
//!
//! There is no globally addressable array: each rank holds exactly its
//! own rows, plus two ghost planes caching the neighbors' boundary
//! rows. Ghost planes are written only by the halo refresh (crate-
//! private accessors) and read through [`SlabField::stencil_get`]; the
//! public mutation API covers owned rows only, so a sweep cannot write
//! into borrowed state by construction.

use std::ops::Range;

use bytemuck::Pod;

use crate::data::plane::Plane;
use crate::topology::slab::SlabPartition;

/// One rank's slab of the global field.
#[derive(Debug, Clone, PartialEq)]
pub struct SlabField<T> {
    extent: usize,
    start_row: usize,
    end_row: usize,
    /// Owned rows, `nrow × extent × extent`, row-major.
    rows: Vec<T>,
    /// Cached copy of the neighbor's row `start_row - 1`.
    ghost_below: Plane<T>,
    /// Cached copy of the neighbor's row `end_row`.
    ghost_above: Plane<T>,
}

impl<T: Pod> SlabField<T> {
    pub fn zeroed(partition: &SlabPartition) -> Self {
        let extent = partition.extent();
        Self {
            extent,
            start_row: partition.start_row(),
            end_row: partition.end_row(),
            rows: vec![T::zeroed(); partition.nrow() * extent * extent],
            ghost_below: Plane::zeroed(extent),
            ghost_above: Plane::zeroed(extent),
        }
    }

    #[inline]
    pub fn extent(&self) -> usize {
        self.extent
    }

    #[inline]
    pub fn start_row(&self) -> usize {
        self.start_row
    }

    #[inline]
    pub fn end_row(&self) -> usize {
        self.end_row
    }

    #[inline]
    pub fn nrow(&self) -> usize {
        self.end_row - self.start_row
    }

    /// Owned global row indices.
    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }

    #[inline]
    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(self.rows().contains(&i), "row {i} not owned");
        debug_assert!(j < self.extent && k < self.extent);
        ((i - self.start_row) * self.extent + j) * self.extent + k
    }

    /// Read an owned cell.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> T {
        self.rows[self.offset(i, j, k)]
    }

    /// Write an owned cell.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: T) {
        let at = self.offset(i, j, k);
        self.rows[at] = value;
    }

    /// Read a cell for stencil evaluation: owned rows, or the ghost
    /// planes at `start_row - 1` and `end_row`.
    #[inline]
    pub fn stencil_get(&self, i: usize, j: usize, k: usize) -> T {
        if i + 1 == self.start_row {
            self.ghost_below.get(j, k)
        } else if i == self.end_row {
            self.ghost_above.get(j, k)
        } else {
            self.get(i, j, k)
        }
    }

    /// One owned row as a contiguous plane slice.
    #[inline]
    pub fn row_values(&self, i: usize) -> &[T] {
        let plane = self.extent * self.extent;
        let from = (i - self.start_row) * plane;
        &self.rows[from..from + plane]
    }

    /// All owned cells in row-major order (the gather payload).
    #[inline]
    pub fn owned_values(&self) -> &[T] {
        &self.rows
    }

    pub fn ghost_below(&self) -> &Plane<T> {
        &self.ghost_below
    }

    pub fn ghost_above(&self) -> &Plane<T> {
        &self.ghost_above
    }

    /// Halo refresh fuses received planes through these; nothing else
    /// may write ghost state.
    pub(crate) fn ghost_below_mut(&mut self) -> &mut Plane<T> {
        &mut self.ghost_below
    }

    pub(crate) fn ghost_above_mut(&mut self) -> &mut Plane<T> {
        &mut self.ghost_above
    }
}
