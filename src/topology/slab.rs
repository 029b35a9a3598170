//! Slab decomposition of the grid's primary axis.
//!
//! The interior rows `[1, extent-1)` are split into equal contiguous
//! slabs, one per rank, in rank order. The Dirichlet face rows 0 and
//! `extent-1` are owned by no rank; the first and last slab see them as
//! permanently zero ghost planes.

use std::ops::Range;

use crate::error::RelaxError;

/// Contiguous range of global rows owned by one rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlabPartition {
    extent: usize,
    start_row: usize,
    end_row: usize,
}

impl SlabPartition {
    /// Compute rank `rank`'s slab of the interior rows.
    ///
    /// The union of all ranks' `[start_row, end_row)` ranges tiles
    /// `[1, extent-1)` exactly. Configurations where the interior does
    /// not divide evenly are rejected instead of silently truncated.
    ///
    /// # Errors
    /// - [`RelaxError::InvalidConfig`] if `extent < 3` or `nproc == 0`;
    /// - [`RelaxError::RankOutOfRange`] if `rank >= nproc`;
    /// - [`RelaxError::PartitionMismatch`] if `(extent - 2) % nproc != 0`.
    pub fn new(extent: usize, nproc: usize, rank: usize) -> Result<Self, RelaxError> {
        if extent < 3 {
            return Err(RelaxError::InvalidConfig(format!(
                "extent {extent} leaves no interior rows"
            )));
        }
        if nproc == 0 {
            return Err(RelaxError::InvalidConfig("empty process group".into()));
        }
        if rank >= nproc {
            return Err(RelaxError::RankOutOfRange { rank, nproc });
        }
        let interior = extent - 2;
        if interior % nproc != 0 {
            return Err(RelaxError::PartitionMismatch { interior, nproc });
        }
        let chunk = interior / nproc;
        Ok(Self {
            extent,
            start_row: chunk * rank + 1,
            end_row: chunk * (rank + 1) + 1,
        })
    }

    /// Grid extent N on every axis.
    #[inline]
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// First owned global row.
    #[inline]
    pub fn start_row(&self) -> usize {
        self.start_row
    }

    /// One past the last owned global row.
    #[inline]
    pub fn end_row(&self) -> usize {
        self.end_row
    }

    /// Number of owned rows; always `end_row - start_row`.
    #[inline]
    pub fn nrow(&self) -> usize {
        self.end_row - self.start_row
    }

    /// The owned global row indices.
    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }
}
