//! Multi-rank runs over ThreadComm must reproduce the dense reference,
//! proving the halo exchange and reduction correct.

mod common;

use common::DenseGrid;
use serial_test::serial;
use slab_relax::prelude::*;

const TOL: f64 = 1e-9;

/// Run the solver on `nproc` simulated ranks; returns the gathered full
/// grid and every rank's run report.
fn solve_distributed(extent: usize, nproc: usize) -> (Vec<f64>, Vec<RunReport>) {
    ThreadComm::reset_mailbox();
    let handles: Vec<_> = (0..nproc)
        .map(|rank| {
            std::thread::spawn(move || {
                let comm = ThreadComm::new(rank, nproc);
                let config = RelaxConfig {
                    extent,
                    relaxation: 0.5,
                    tolerance: 1e-7,
                    max_iterations: 100,
                };
                let solver = Solver::new(&comm, config).unwrap();
                let partition = solver.partition().unwrap();
                let mut field = SlabField::zeroed(&partition);
                init_field(&mut field);
                let report = solver.run(&mut field).unwrap();
                let gathered = solver.gather(&field).unwrap();
                (report, gathered)
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(nproc);
    let mut full = None;
    for handle in handles {
        let (report, gathered) = handle.join().unwrap();
        reports.push(report);
        if let Some(cells) = gathered {
            assert!(full.is_none(), "only rank 0 may hold the gathered grid");
            full = Some(cells);
        }
    }
    (full.expect("rank 0 must gather the grid"), reports)
}

fn assert_matches_reference(extent: usize, nproc: usize) {
    let (full, reports) = solve_distributed(extent, nproc);

    let mut reference = DenseGrid::initialized(extent);
    let (ref_iterations, _) = reference.run(0.5, 1e-7, 100);

    // Lockstep: every rank reaches the identical termination decision.
    for report in &reports {
        assert_eq!(report.iterations, ref_iterations);
        assert_eq!(report.termination, reports[0].termination);
    }

    for (at, (a, b)) in full.iter().zip(reference.cells().iter()).enumerate() {
        assert!(
            (a - b).abs() <= TOL,
            "P={nproc}: cell {at} diverged: {a} vs {b}"
        );
    }
}

#[test]
#[serial]
fn one_rank_matches_reference() {
    assert_matches_reference(12, 1);
}

#[test]
#[serial]
fn two_ranks_match_reference() {
    assert_matches_reference(12, 2);
}

#[test]
#[serial]
fn five_ranks_match_reference() {
    assert_matches_reference(12, 5);
}

#[test]
#[serial]
fn four_ranks_match_reference_on_the_reference_extent() {
    assert_matches_reference(10, 4);
}

#[test]
fn uneven_rank_count_is_rejected_up_front() {
    // 10 interior rows cannot tile over 3 ranks; every rank must see
    // the same configuration error before any message is posted.
    let comm = ThreadComm::new(0, 3);
    let config = RelaxConfig {
        extent: 12,
        ..Default::default()
    };
    assert!(matches!(
        Solver::new(&comm, config),
        Err(RelaxError::PartitionMismatch {
            interior: 10,
            nproc: 3
        })
    ));
}
