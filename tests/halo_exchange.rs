//! Ghost-plane refresh across a three-rank line, including the
//! second refresh of an iteration picking up freshly swept rows.

use serial_test::serial;
use slab_relax::prelude::*;

fn seeded_field(extent: usize, nproc: usize, rank: usize) -> SlabField<f64> {
    let p = SlabPartition::new(extent, nproc, rank).unwrap();
    let mut f = SlabField::zeroed(&p);
    for i in p.rows() {
        for j in 0..extent {
            for k in 0..extent {
                f.set(i, j, k, (1000 * i + 10 * j + k) as f64);
            }
        }
    }
    f
}

#[test]
#[serial]
fn middle_rank_sees_both_neighbors() {
    ThreadComm::reset_mailbox();
    let extent = 8; // 6 interior rows over 3 ranks: 2 rows each
    let handles: Vec<_> = (0..3)
        .map(|rank| {
            std::thread::spawn(move || {
                let comm = ThreadComm::new(rank, 3);
                let topo = LineTopology::new(rank, 3).unwrap();
                let mut field = seeded_field(extent, 3, rank);
                refresh_ghosts(&comm, &topo, &mut field).unwrap();
                field
            })
        })
        .collect();
    let fields: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Rank 1 owns rows 3..5; its ghosts are rank 0's row 2 and rank 2's
    // row 5.
    assert_eq!(fields[1].ghost_below().values(), fields[0].row_values(2));
    assert_eq!(fields[1].ghost_above().values(), fields[2].row_values(5));
    // End ranks keep their outer Dirichlet plane at zero.
    assert!(fields[0].ghost_below().values().iter().all(|&v| v == 0.0));
    assert!(fields[2].ghost_above().values().iter().all(|&v| v == 0.0));
}

#[test]
#[serial]
fn second_refresh_tracks_rewritten_boundary_rows() {
    ThreadComm::reset_mailbox();
    let extent = 8;
    let handles: Vec<_> = (0..2)
        .map(|rank| {
            std::thread::spawn(move || {
                let comm = ThreadComm::new(rank, 2);
                let topo = LineTopology::new(rank, 2).unwrap();
                let mut field = seeded_field(extent, 2, rank);

                refresh_ghosts(&comm, &topo, &mut field).unwrap();
                let stale = if rank == 1 {
                    Some(field.ghost_below().values().to_vec())
                } else {
                    None
                };

                // Rank 0 rewrites its shared boundary row between the
                // two refreshes of an iteration.
                if rank == 0 {
                    let boundary = field.end_row() - 1;
                    for j in 0..extent {
                        for k in 0..extent {
                            field.set(boundary, j, k, -1.0);
                        }
                    }
                }
                refresh_ghosts(&comm, &topo, &mut field).unwrap();
                (field, stale)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let (field1, stale) = &results[1];
    let stale = stale.as_ref().unwrap();
    // The first refresh delivered the seeded row, the second its
    // rewritten replacement.
    assert!(stale.iter().all(|&v| v >= 0.0));
    assert!(field1.ghost_below().values().iter().all(|&v| v == -1.0));
}
