//! Fixed-budget iteration driver for the distributed relaxation.
//!
//! Every rank runs the identical loop in lockstep: refresh ghosts,
//! sweep the even color, refresh again (the odd sweep depends on rows
//! the even sweep just rewrote on the neighbors), sweep the odd color,
//! then rendezvous and reduce the largest correction so every rank
//! makes the same termination decision. The halo joins and the
//! collectives are the only suspension points.

use crate::algs::collective::{Collectives, BARRIER, GATHER_FIELD, REDUCE_EPS};
use crate::algs::halo::refresh_ghosts;
use crate::algs::sweep::{sweep_color, Color};
use crate::config::RelaxConfig;
use crate::data::slab_field::SlabField;
use crate::error::RelaxError;
use crate::topology::line::LineTopology;
use crate::topology::slab::SlabPartition;

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The global maximum correction fell below the tolerance.
    Converged,
    /// The iteration budget ran out first; not a failure.
    IterationBudget,
}

/// Summary of a completed solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    /// Iterations actually executed.
    pub iterations: u32,
    /// Final global maximum correction.
    pub eps: f64,
    pub termination: Termination,
}

/// Orchestrates the relaxation over one process group.
pub struct Solver<'a, C: Collectives> {
    comm: &'a C,
    topo: LineTopology,
    config: RelaxConfig,
}

impl<'a, C: Collectives> Solver<'a, C> {
    /// Validate `config` against the group and build the driver.
    pub fn new(comm: &'a C, config: RelaxConfig) -> Result<Self, RelaxError> {
        config.validate(comm.size())?;
        let topo = LineTopology::new(comm.rank(), comm.size())?;
        Ok(Self { comm, topo, config })
    }

    pub fn config(&self) -> &RelaxConfig {
        &self.config
    }

    /// This rank's slab of the interior rows.
    pub fn partition(&self) -> Result<SlabPartition, RelaxError> {
        SlabPartition::new(self.config.extent, self.comm.size(), self.comm.rank())
    }

    /// One full relaxation step; returns the global maximum correction.
    ///
    /// The maximum is accumulated over *both* color sweeps before the
    /// reduction.
    pub fn step(&self, field: &mut SlabField<f64>) -> Result<f64, RelaxError> {
        refresh_ghosts(self.comm, &self.topo, field)?;
        let mut eps = sweep_color(field, Color::Even, self.config.relaxation);
        refresh_ghosts(self.comm, &self.topo, field)?;
        eps = eps.max(sweep_color(field, Color::Odd, self.config.relaxation));
        self.comm.barrier(BARRIER)?;
        self.comm.allreduce_max(REDUCE_EPS, eps)
    }

    /// Drive [`Solver::step`] until the global correction falls below
    /// the tolerance or the iteration budget runs out.
    pub fn run(&self, field: &mut SlabField<f64>) -> Result<RunReport, RelaxError> {
        let mut eps = f64::INFINITY;
        for it in 1..=self.config.max_iterations {
            eps = self.step(field)?;
            log::trace!("it={it} eps={eps:e}");
            if eps < self.config.tolerance {
                log::debug!("converged after {it} iterations, eps={eps:e}");
                return Ok(RunReport {
                    iterations: it,
                    eps,
                    termination: Termination::Converged,
                });
            }
        }
        log::warn!(
            "iteration budget {} exhausted, eps={eps:e}",
            self.config.max_iterations
        );
        Ok(RunReport {
            iterations: self.config.max_iterations,
            eps,
            termination: Termination::IterationBudget,
        })
    }

    /// Assemble the full grid on rank 0: slabs in rank order between
    /// the two zero Dirichlet face rows. Returns `None` elsewhere.
    pub fn gather(&self, field: &SlabField<f64>) -> Result<Option<Vec<f64>>, RelaxError> {
        let gathered = self
            .comm
            .gather_at_root(GATHER_FIELD, bytemuck::cast_slice(field.owned_values()))?;
        let Some(bytes) = gathered else {
            return Ok(None);
        };

        let n = self.config.extent;
        let plane = n * n;
        let interior_cells = (n - 2) * plane;
        // The raw bytes are not guaranteed f64-aligned; re-collect.
        let interior: Vec<f64> = bytemuck::pod_collect_to_vec(&bytes);
        if interior.len() != interior_cells {
            return Err(RelaxError::GatherMismatch {
                expected: interior_cells,
                got: interior.len(),
            });
        }
        let mut full = vec![0.0f64; n * plane];
        full[plane..plane + interior_cells].copy_from_slice(&interior);
        Ok(Some(full))
    }
}
