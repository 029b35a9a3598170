//! RelaxError: unified error type for slab-relax public APIs.
//!
//! Every fallible operation in the crate reports through this enum, so
//! callers see a single error surface for configuration, partitioning,
//! and transport failures. Transport errors are fatal to a distributed
//! run: ranks cooperate in lockstep and cannot recover individually.

use thiserror::Error;

/// Unified error type for slab-relax operations.
#[derive(Debug, Error)]
pub enum RelaxError {
    /// Configuration rejected before the solve started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The interior rows do not tile evenly across the process group.
    #[error("interior extent {interior} does not divide evenly over {nproc} ranks")]
    PartitionMismatch { interior: usize, nproc: usize },
    /// Rank index outside the process group.
    #[error("rank {rank} out of range for a group of {nproc}")]
    RankOutOfRange { rank: usize, nproc: usize },
    /// A point-to-point or collective transfer failed.
    #[error("communication with rank {neighbor} failed: {source}")]
    Comm {
        neighbor: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A message arrived with the wrong byte length.
    #[error("short message from rank {neighbor}: expected {expected} bytes, got {got}")]
    ShortMessage {
        neighbor: usize,
        expected: usize,
        got: usize,
    },
    /// Gathered slabs do not reassemble into a full grid.
    #[error("gather mismatch: expected {expected} cells, assembled {got}")]
    GatherMismatch { expected: usize, got: usize },
}

impl RelaxError {
    /// Shorthand for a transport failure with a plain-text cause.
    pub fn comm(neighbor: usize, msg: impl Into<String>) -> Self {
        RelaxError::Comm {
            neighbor,
            source: msg.into().into(),
        }
    }
}
