//! Ghost-plane refresh between slab neighbors.
//!
//! Before every sweep each rank re-synchronizes its two ghost planes
//! with the authoritative boundary rows of its neighbors. Two message
//! streams run in opposite directions, on distinct tags so they can
//! never be confused:
//!
//! - **end-row stream** ([`HALO_END_ROW`]): rank r sends its last owned
//!   row up to r+1, where it becomes r+1's lower ghost;
//! - **start-row stream** ([`HALO_START_ROW`]): rank r sends its first
//!   owned row down to r-1, where it becomes r-1's upper ghost.
//!
//! All active transfers are posted non-blocking and joined with a
//! single wait-all before any ghost data is fused; the active set
//! shrinks per [`SlabPosition`](crate::topology::SlabPosition) so no
//! rank ever waits on a transfer that was never posted.

use crate::algs::communicator::{CommTag, Communicator, Wait};
use crate::algs::wire::cast_slice;
use crate::data::slab_field::SlabField;
use crate::error::RelaxError;
use crate::topology::line::{HaloSlot, LineTopology};

/// Tag for the upward (end-row) stream.
pub const HALO_END_ROW: CommTag = CommTag(315);
/// Tag for the downward (start-row) stream.
pub const HALO_START_ROW: CommTag = CommTag(316);

/// Refresh both ghost planes from the neighboring ranks.
///
/// Invoked twice per iteration: the second color's sweep depends on the
/// boundary rows the first sweep just rewrote on the neighbors.
///
/// # Errors
/// [`RelaxError::Comm`] or [`RelaxError::ShortMessage`] if a transfer
/// fails. Every pending handle is drained before the error is returned;
/// the failure is fatal to the distributed run.
pub fn refresh_ghosts<C: Communicator>(
    comm: &C,
    topo: &LineTopology,
    field: &mut SlabField<f64>,
) -> Result<(), RelaxError> {
    let plane_bytes = field.extent() * field.extent() * std::mem::size_of::<f64>();

    // 1) post all receives into scratch buffers
    let mut pending_recvs: Vec<(HaloSlot, usize, C::RecvHandle)> = Vec::with_capacity(2);
    let mut recv_bufs: Vec<Vec<u8>> = Vec::with_capacity(2);
    for &slot in topo.active_slots() {
        let Some(peer) = topo.slot_peer(slot) else {
            continue;
        };
        let tag = match slot {
            HaloSlot::LowerRecv => HALO_END_ROW,
            HaloSlot::UpperRecv => HALO_START_ROW,
            _ => continue,
        };
        let mut buf = vec![0u8; plane_bytes];
        let handle = comm.irecv(peer, tag, &mut buf);
        pending_recvs.push((slot, peer, handle));
        recv_bufs.push(buf);
    }

    // 2) post all sends; the borrowed rows stay untouched until the wait-all
    let mut pending_sends = Vec::with_capacity(2);
    for &slot in topo.active_slots() {
        let Some(peer) = topo.slot_peer(slot) else {
            continue;
        };
        let (tag, row) = match slot {
            HaloSlot::UpperSend => (HALO_END_ROW, field.end_row() - 1),
            HaloSlot::LowerSend => (HALO_START_ROW, field.start_row()),
            _ => continue,
        };
        pending_sends.push(comm.isend(peer, tag, cast_slice(field.row_values(row))));
    }

    // 3) wait for all receives; collect but do not early-return
    let mut fused: Vec<(HaloSlot, Vec<u8>)> = Vec::with_capacity(2);
    let mut maybe_err = None;
    for (slot, peer, handle) in pending_recvs {
        match handle.wait() {
            Some(data) if data.len() == plane_bytes => {
                if maybe_err.is_none() {
                    fused.push((slot, data));
                }
            }
            Some(data) => {
                if maybe_err.is_none() {
                    maybe_err = Some(RelaxError::ShortMessage {
                        neighbor: peer,
                        expected: plane_bytes,
                        got: data.len(),
                    });
                }
            }
            None => {
                if maybe_err.is_none() {
                    maybe_err = Some(RelaxError::comm(peer, "halo receive returned no data"));
                }
            }
        }
    }

    // 4) always drain the send handles before returning
    for send in pending_sends {
        let _ = send.wait();
    }
    if let Some(err) = maybe_err {
        return Err(err);
    }

    // 5) fuse received planes into the ghost buffers
    for (slot, data) in fused {
        match slot {
            HaloSlot::LowerRecv => field.ghost_below_mut().as_bytes_mut().copy_from_slice(&data),
            HaloSlot::UpperRecv => field.ghost_above_mut().as_bytes_mut().copy_from_slice(&data),
            _ => unreachable!("only receive slots are fused"),
        }
    }
    Ok(())
}
