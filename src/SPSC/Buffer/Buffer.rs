// This is the shared ring for the SPSC pair - one payload band, one signal band

use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr::NonNull;
use std::sync::atomic::AtomicU32;

/// A bounded, lock-free, single-producer single-consumer (SPSC) ring buffer
/// view over a raw memory region.
///
/// The region may live on this process's heap or in a named shared-memory
/// mapping; the view is agnostic. Its layout is fixed (see
/// [`layout`](super::layout)): a one-cache-line [`RegionHeader`] holding both
/// wrap-tagged pointers, then `capacity` payload cells, then `capacity`
/// one-byte signal cells.
///
/// ### Concurrency design
/// - **Producer (publish)**: writes the payload cell at `write_pt.val`, tags
///   the matching signal cell, then advances `write_pt` with a release store.
///   The pointer advance is the publication: a consumer that observes the new
///   pointer also observes the payload and signal stores before it.
/// - **Consumer (consume)**: reads payload and signal at `read_pt.val`, then
///   advances `read_pt` with a release store, handing the slot back to the
///   producer.
/// - **Signal band**: per-slot tags live in a separate parallel array so the
///   consumer can inspect framing without touching a payload cache line.
///
/// Neither side ever performs an atomic read-modify-write on the hot path;
/// the wrap generations in the two pointers disambiguate full from empty.
///
/// Payloads are plain old data (`T: Copy`): overwriting a slot runs no
/// destructor, and reading never consumes.
///
/// [`RegionHeader`]: super::layout::RegionHeader
pub struct RingBuffer<T> {
    /// Base of the region; the header sits at offset 0.
    pub(crate) region: NonNull<u8>,

    /// Slot count. Mirrors the header word so the hot path never re-reads
    /// shared memory for an immutable value.
    pub(crate) capacity: usize,

    /// First payload cell.
    pub(crate) payload: NonNull<T>,

    /// First signal byte.
    pub(crate) signal: NonNull<u8>,

    pub(crate) _marker: PhantomData<T>,
}

// The view itself moves between threads; the SPSC discipline (one producer
// handle, one consumer handle) is enforced by the types that wrap it.
unsafe impl<T: Copy + Send> Send for RingBuffer<T> {}
unsafe impl<T: Copy + Send> Sync for RingBuffer<T> {}

/// Degenerate single-slot ring with no backpressure.
///
/// `size()` is pinned to 1: a push overwrites slot 0, a pop always reads
/// slot 0, and neither ever blocks. There is deliberately no correctness
/// relationship between the two sides - the variant exists to measure one
/// side's maximum rate in isolation. Slot accesses are volatile so a torn
/// read under contention stays a measurement artifact, never undefined
/// behavior on the plain-old-data payloads this crate carries.
pub struct InfiniteRing<T> {
    pub(crate) slot: UnsafeCell<MaybeUninit<T>>,
    pub(crate) signal: UnsafeCell<u8>,
    pub(crate) write_finished: AtomicU32,
}

unsafe impl<T: Copy + Send> Send for InfiniteRing<T> {}
unsafe impl<T: Copy + Send> Sync for InfiniteRing<T> {}
