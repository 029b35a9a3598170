//! Thin façade over in-process or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices*. All handles are waitable but
//! non-blocking: halo and collective code posts everything first and
//! calls `.wait()` before it trusts that a buffer is ready.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;

use bytes::Bytes;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// Typed channel id separating concurrent message streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    #[inline]
    pub fn as_u16(self) -> u16 {
        self.0
    }
}

/// Non-blocking communication interface (minimal by design).
pub trait Communicator: Send + Sync {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    /// This process's index within the group.
    fn rank(&self) -> usize;
    /// Number of cooperating processes.
    fn size(&self) -> usize;

    fn isend(&self, peer: usize, tag: CommTag, buf: &[u8]) -> Self::SendHandle;
    fn irecv(&self, peer: usize, tag: CommTag, buf: &mut [u8]) -> Self::RecvHandle;
}

/// Anything that can be waited on.
pub trait Wait {
    /// Block until completion and return the received bytes (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// No-op comm for single-rank runs and serial unit tests.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn isend(&self, _peer: usize, _tag: CommTag, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: CommTag, _buf: &mut [u8]) {}
}

// --- ThreadComm: in-process multi-rank backend -----------------------------

type Key = (usize, usize, u16); // (src, dst, tag)

/// Process-global mailbox. Each edge keeps a FIFO queue so repeated
/// sends on one `(src, dst, tag)` edge (one per iteration) arrive in
/// order. Tests sharing this state are serialized with `serial_test`.
static MAILBOX: Lazy<DashMap<Key, Mutex<VecDeque<Bytes>>>> = Lazy::new(DashMap::new);

/// In-process communicator: one instance per simulated rank, all
/// sharing the global mailbox. Receives poll from a helper thread until
/// a message with the matching key arrives.
#[derive(Clone, Debug)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
}

impl ThreadComm {
    pub fn new(rank: usize, size: usize) -> Self {
        Self { rank, size }
    }

    /// Drop every queued message. Tests call this between scenarios so
    /// a failed run cannot leak messages into the next one.
    pub fn reset_mailbox() {
        MAILBOX.clear();
    }
}

pub struct LocalHandle {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
    handle: Option<JoinHandle<()>>,
}

impl Wait for LocalHandle {
    fn wait(mut self) -> Option<Vec<u8>> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let mut guard = self.slot.lock();
        guard.take()
    }
}

impl Communicator for ThreadComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn isend(&self, peer: usize, tag: CommTag, buf: &[u8]) {
        let key = (self.rank, peer, tag.as_u16());
        MAILBOX
            .entry(key)
            .or_default()
            .lock()
            .push_back(Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: CommTag, buf: &mut [u8]) -> LocalHandle {
        let key = (peer, self.rank, tag.as_u16());
        let slot = Arc::new(Mutex::new(None));
        let slot_clone = Arc::clone(&slot);
        let capacity = buf.len();
        let handle = std::thread::spawn(move || {
            loop {
                let popped = MAILBOX
                    .get(&key)
                    .and_then(|entry| entry.lock().pop_front());
                if let Some(bytes) = popped {
                    let take = bytes.len().min(capacity);
                    *slot_clone.lock() = Some(bytes[..take].to_vec());
                    break;
                }
                std::thread::yield_now();
            }
        });
        LocalHandle {
            slot,
            handle: Some(handle),
        }
    }
}

// --- MPI backend (feature = "mpi-support") ---------------------------------

#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use mpi::point_to_point::Status;
    use mpi::request::{Request, StaticScope};
    use mpi::topology::SimpleCommunicator;
    // Anonymous import: rsmpi's Communicator trait methods without the
    // name clashing with ours.
    use mpi::traits::{Communicator as _, Destination, Source};

    /// MPI-backed communicator over the world group.
    ///
    /// All calls are made from the owning rank's single thread; the
    /// raw communicator handle is safe to move between threads as long
    /// as only one uses it at a time.
    pub struct MpiComm {
        world: SimpleCommunicator,
    }

    unsafe impl Send for MpiComm {}
    unsafe impl Sync for MpiComm {}

    impl MpiComm {
        /// Wrap an already-initialized world communicator. The caller
        /// owns the MPI universe and finalizes it after the solve.
        pub fn new(world: SimpleCommunicator) -> Self {
            Self { world }
        }

        pub fn world(&self) -> &SimpleCommunicator {
            &self.world
        }
    }

    pub enum MpiHandle {
        Send(Request<'static, [u8], StaticScope>),
        Recv {
            req: Request<'static, [u8], StaticScope>,
            buf: &'static mut [u8],
        },
    }

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            match self {
                MpiHandle::Send(req) => {
                    let _: Status = req.wait();
                    None
                }
                MpiHandle::Recv { req, buf } => {
                    let _: Status = req.wait();
                    Some(buf.to_vec())
                }
            }
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiHandle;
        type RecvHandle = MpiHandle;

        fn rank(&self) -> usize {
            self.world.rank() as usize
        }

        fn size(&self) -> usize {
            self.world.size() as usize
        }

        fn isend(&self, peer: usize, tag: CommTag, buf: &[u8]) -> MpiHandle {
            // Safety: callers keep `buf` untouched and alive until the
            // matching wait-all; the request never outlives it.
            let buf: &'static [u8] = unsafe { std::mem::transmute(buf) };
            let req = self
                .world
                .process_at_rank(peer as i32)
                .immediate_send_with_tag(StaticScope, buf, i32::from(tag.as_u16()));
            MpiHandle::Send(req)
        }

        fn irecv(&self, peer: usize, tag: CommTag, buf: &mut [u8]) -> MpiHandle {
            let ptr = buf.as_mut_ptr();
            let len = buf.len();
            // Safety: as above; the buffer outlives the request, and the
            // second view is only read after the request completes.
            let buf: &'static mut [u8] = unsafe { std::mem::transmute(buf) };
            let req = self
                .world
                .process_at_rank(peer as i32)
                .immediate_receive_into_with_tag(StaticScope, buf, i32::from(tag.as_u16()));
            let view: &'static mut [u8] = unsafe { std::slice::from_raw_parts_mut(ptr, len) };
            MpiHandle::Recv { req, buf: view }
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::{MpiComm, MpiHandle};
