//! MPI benchmark driver: initialize, relax, gather, checksum, report
//! the elapsed time on the coordinating rank.
//!
//! Run with the launcher of your MPI installation, e.g.
//! `mpirun -n 8 slab_relax_mpi [config.json]`. The only stdout output
//! is the elapsed seconds, printed once by rank 0; the checksum and the
//! run report go to the log.

use std::time::Instant;

use slab_relax::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let universe = mpi::initialize().ok_or("MPI initialization failed")?;
    let comm = MpiComm::new(universe.world());

    let config = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => RelaxConfig::default(),
    };

    let solver = Solver::new(&comm, config.clone())?;
    let partition = solver.partition()?;

    let start = Instant::now();

    let mut field = SlabField::zeroed(&partition);
    init_field(&mut field);
    let report = solver.run(&mut field)?;
    let gathered = solver.gather(&field)?;

    let elapsed = start.elapsed().as_secs_f64();

    if let Some(cells) = gathered {
        let sum = weighted_checksum(&cells, config.extent)?;
        log::debug!(
            "checksum={sum} iterations={} eps={:e}",
            report.iterations,
            report.eps
        );
        println!("{elapsed:.6}");
    }
    Ok(())
}
