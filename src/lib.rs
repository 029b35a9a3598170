//! # slab-relax
//!
//! Distributed red-black successive over-relaxation (SOR) for elliptic
//! boundary-value problems on dense cubic grids, decomposed into slabs
//! along one axis across a group of cooperating ranks.
//!
//! Each rank owns a contiguous slab of interior rows plus two ghost
//! planes caching its neighbors' boundary rows. One iteration refreshes
//! the ghosts, sweeps the even checkerboard color, refreshes again,
//! sweeps the odd color, and reduces the largest per-cell correction to
//! a global value so every rank makes the identical termination
//! decision. Grid faces are fixed to zero (Dirichlet condition).
//!
//! ## Backends
//!
//! Communication runs over the [`Communicator`](algs::communicator::Communicator)
//! trait:
//! - [`NoComm`](algs::communicator::NoComm) for single-rank runs and
//!   serial tests;
//! - [`ThreadComm`](algs::communicator::ThreadComm) for in-process
//!   multi-rank tests (one thread per simulated rank);
//! - `MpiComm` for real distributed runs (feature `mpi-support`), with
//!   native MPI collectives.
//!
//! ## Quick start
//!
//! ```
//! use slab_relax::prelude::*;
//!
//! let comm = NoComm;
//! let config = RelaxConfig { extent: 10, ..Default::default() };
//! let solver = Solver::new(&comm, config)?;
//! let partition = solver.partition()?;
//! let mut field = SlabField::zeroed(&partition);
//! init_field(&mut field);
//! let report = solver.run(&mut field)?;
//! assert!(report.iterations >= 1);
//! # Ok::<(), slab_relax::error::RelaxError>(())
//! ```

pub mod algs;
pub mod config;
pub mod data;
pub mod error;
pub mod problem;
pub mod solver;
pub mod topology;

/// A convenient prelude importing the most-used traits and types.
pub mod prelude {
    pub use crate::algs::collective::Collectives;
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::communicator::{CommTag, Communicator, NoComm, ThreadComm, Wait};
    pub use crate::algs::halo::refresh_ghosts;
    pub use crate::algs::sweep::{sweep_color, Color};
    pub use crate::config::RelaxConfig;
    pub use crate::data::plane::Plane;
    pub use crate::data::slab_field::SlabField;
    pub use crate::error::RelaxError;
    pub use crate::problem::{init_field, weighted_checksum};
    pub use crate::solver::{RunReport, Solver, Termination};
    pub use crate::topology::line::{HaloSlot, LineTopology, SlabPosition};
    pub use crate::topology::slab::SlabPartition;
}
