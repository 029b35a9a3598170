//! Collectives built from the point-to-point primitives.
//!
//! The reduction round-trip (fan-in to rank 0, fold, fan-out) gives
//! every backend barrier / all-reduce-max / gather for free; the MPI
//! backend overrides them with the native collective calls. Rank 0 is
//! always the coordinating rank.

use bytemuck::Zeroable;

use crate::algs::communicator::{CommTag, Communicator, Wait};
use crate::algs::wire::{cast_slice, cast_slice_mut, WireScalar};
use crate::error::RelaxError;

/// Tag for the convergence all-reduce.
pub const REDUCE_EPS: CommTag = CommTag(317);
/// Tag for the pre-reduction barrier.
pub const BARRIER: CommTag = CommTag(318);
/// Tag for the final field gather.
pub const GATHER_FIELD: CommTag = CommTag(319);

/// Collective operations over a process group.
///
/// The default implementations are correct for any [`Communicator`];
/// backends with native collectives override them.
pub trait Collectives: Communicator + Sized {
    /// Rendezvous: no rank returns before every rank has entered.
    fn barrier(&self, tag: CommTag) -> Result<(), RelaxError> {
        let token = [1u8];
        let mut scratch = [0u8];
        if self.rank() == 0 {
            // 1) fan-in: collect one token from every other rank
            let mut pending = Vec::with_capacity(self.size() - 1);
            for peer in 1..self.size() {
                let mut buf = [0u8; 1];
                let handle = self.irecv(peer, tag, &mut buf);
                pending.push((peer, handle));
            }
            let mut maybe_err = None;
            for (peer, handle) in pending {
                if handle.wait().is_none() && maybe_err.is_none() {
                    maybe_err = Some(RelaxError::comm(peer, "barrier token lost"));
                }
            }
            if let Some(err) = maybe_err {
                return Err(err);
            }
            // 2) fan-out: release everyone
            let releases: Vec<_> = (1..self.size())
                .map(|peer| self.isend(peer, tag, &token))
                .collect();
            for send in releases {
                let _ = send.wait();
            }
        } else {
            let send = self.isend(0, tag, &token);
            let _ = send.wait();
            let handle = self.irecv(0, tag, &mut scratch);
            handle
                .wait()
                .ok_or_else(|| RelaxError::comm(0, "barrier release lost"))?;
        }
        Ok(())
    }

    /// Global maximum of `local`, identical on every rank afterwards.
    fn allreduce_max(&self, tag: CommTag, local: f64) -> Result<f64, RelaxError> {
        if self.size() == 1 {
            return Ok(local);
        }
        if self.rank() == 0 {
            // 1) post all receives, then fold
            let mut pending = Vec::with_capacity(self.size() - 1);
            let mut bufs = Vec::with_capacity(self.size() - 1);
            for peer in 1..self.size() {
                let mut buf = [0u8; 8];
                let handle = self.irecv(peer, tag, &mut buf);
                pending.push((peer, handle));
                bufs.push(buf);
            }
            let mut global = local;
            let mut maybe_err = None;
            for (peer, handle) in pending {
                match handle.wait() {
                    Some(data) if data.len() == 8 => {
                        if maybe_err.is_none() {
                            let mut rec = WireScalar::zeroed();
                            cast_slice_mut(std::slice::from_mut(&mut rec))
                                .copy_from_slice(&data);
                            global = global.max(rec.get());
                        }
                    }
                    Some(data) => {
                        if maybe_err.is_none() {
                            maybe_err = Some(RelaxError::ShortMessage {
                                neighbor: peer,
                                expected: 8,
                                got: data.len(),
                            });
                        }
                    }
                    None => {
                        if maybe_err.is_none() {
                            maybe_err =
                                Some(RelaxError::comm(peer, "reduction contribution lost"));
                        }
                    }
                }
            }
            if let Some(err) = maybe_err {
                return Err(err);
            }
            // 2) broadcast the folded value
            let rec = WireScalar::of(global);
            let broadcasts: Vec<_> = (1..self.size())
                .map(|peer| self.isend(peer, tag, cast_slice(std::slice::from_ref(&rec))))
                .collect();
            for send in broadcasts {
                let _ = send.wait();
            }
            Ok(global)
        } else {
            let rec = WireScalar::of(local);
            let send = self.isend(0, tag, cast_slice(std::slice::from_ref(&rec)));
            let _ = send.wait();
            let mut buf = [0u8; 8];
            let handle = self.irecv(0, tag, &mut buf);
            let data = handle
                .wait()
                .ok_or_else(|| RelaxError::comm(0, "reduction result lost"))?;
            if data.len() != 8 {
                return Err(RelaxError::ShortMessage {
                    neighbor: 0,
                    expected: 8,
                    got: data.len(),
                });
            }
            let mut rec = WireScalar::zeroed();
            cast_slice_mut(std::slice::from_mut(&mut rec)).copy_from_slice(&data);
            Ok(rec.get())
        }
    }

    /// Collect equal-length byte payloads onto rank 0 in rank order.
    /// Returns `None` on every other rank.
    fn gather_at_root(&self, tag: CommTag, local: &[u8]) -> Result<Option<Vec<u8>>, RelaxError> {
        if self.size() == 1 {
            return Ok(Some(local.to_vec()));
        }
        if self.rank() == 0 {
            let chunk = local.len();
            let mut out = vec![0u8; chunk * self.size()];
            out[..chunk].copy_from_slice(local);
            let mut pending = Vec::with_capacity(self.size() - 1);
            let mut bufs: Vec<Vec<u8>> = Vec::with_capacity(self.size() - 1);
            for peer in 1..self.size() {
                let mut buf = vec![0u8; chunk];
                let handle = self.irecv(peer, tag, &mut buf);
                pending.push((peer, handle));
                bufs.push(buf);
            }
            let mut maybe_err = None;
            for (peer, handle) in pending {
                match handle.wait() {
                    Some(data) if data.len() == chunk => {
                        if maybe_err.is_none() {
                            out[peer * chunk..(peer + 1) * chunk].copy_from_slice(&data);
                        }
                    }
                    Some(data) => {
                        if maybe_err.is_none() {
                            maybe_err = Some(RelaxError::ShortMessage {
                                neighbor: peer,
                                expected: chunk,
                                got: data.len(),
                            });
                        }
                    }
                    None => {
                        if maybe_err.is_none() {
                            maybe_err = Some(RelaxError::comm(peer, "gather chunk lost"));
                        }
                    }
                }
            }
            if let Some(err) = maybe_err {
                return Err(err);
            }
            Ok(Some(out))
        } else {
            let send = self.isend(0, tag, local);
            let _ = send.wait();
            Ok(None)
        }
    }
}

impl Collectives for crate::algs::communicator::NoComm {}
impl Collectives for crate::algs::communicator::ThreadComm {}

#[cfg(feature = "mpi-support")]
mod mpi_native {
    use super::*;
    use crate::algs::communicator::MpiComm;
    use mpi::collective::SystemOperation;
    use mpi::traits::{Communicator as _, CommunicatorCollectives, Root};

    impl Collectives for MpiComm {
        fn barrier(&self, _tag: CommTag) -> Result<(), RelaxError> {
            self.world().barrier();
            Ok(())
        }

        fn allreduce_max(&self, _tag: CommTag, local: f64) -> Result<f64, RelaxError> {
            let mut global = 0.0f64;
            self.world()
                .all_reduce_into(&local, &mut global, SystemOperation::max());
            Ok(global)
        }

        fn gather_at_root(
            &self,
            _tag: CommTag,
            local: &[u8],
        ) -> Result<Option<Vec<u8>>, RelaxError> {
            let root = self.world().process_at_rank(0);
            if self.rank() == 0 {
                let mut out = vec![0u8; local.len() * self.size()];
                root.gather_into_root(local, &mut out[..]);
                Ok(Some(out))
            } else {
                root.gather_into(local);
                Ok(None)
            }
        }
    }
}
