// In src/SPSC/consumer.rs
use std::fmt;
use std::sync::Arc;

use crate::Core::SharedMemory::SharedMemoryBackend;
use crate::SPSC::Buffer::Buffer_impl::spin_wait;
use crate::SPSC::Buffer::layout::PointerValue;
use crate::SPSC::Buffer::RingBuffer;
use crate::SPSC::Structs::Buffer_Structs::Signal;

/// The consuming half of an SPSC channel.
///
/// Exactly one `Consumer` exists per ring. It owns the read pointer: only
/// this handle advances it, and the producer only ever reads it. Items leave
/// the ring by copy ([`pop`], [`pop_range`]) or are inspected in place and
/// then discarded ([`peek`] / [`recycle`]). Consuming calls block by
/// busy-spinning while the ring is empty.
///
/// [`pop`]: Consumer::pop
/// [`pop_range`]: Consumer::pop_range
/// [`peek`]: Consumer::peek
/// [`recycle`]: Consumer::recycle
pub struct Consumer<T> {
    ring: RingBuffer<T>,
    _region: Arc<dyn SharedMemoryBackend>,
}

impl<T: Copy + Send> Consumer<T> {
    pub(crate) fn new(region: Arc<dyn SharedMemoryBackend>, ring: RingBuffer<T>) -> Self {
        Self {
            ring,
            _region: region,
        }
    }

    /// Pop the head item into `out`, and its signal into `out_signal` when
    /// supplied. Spins until an item is available.
    ///
    /// The payload and signal reads happen before the read pointer advances;
    /// the advance is the release that hands the slot back to the producer.
    pub fn pop(&mut self, out: &mut T, out_signal: Option<&mut Signal>) {
        while self.ring.size() == 0 {
            spin_wait();
        }
        let index = self.ring.head_index(0);
        if let Some(signal) = out_signal {
            *signal = self.ring.signal_at(index);
        }
        *out = self.ring.payload_at(index);
        self.ring.release(1);
    }

    /// Pop exactly `N` items, spinning until the ring holds at least `N`.
    /// The read pointer advances once, by `N`.
    ///
    /// # Panics
    /// If `N` exceeds the ring capacity.
    pub fn pop_range<const N: usize>(
        &mut self,
        out: &mut [T; N],
        mut out_signals: Option<&mut [Signal; N]>,
    ) {
        assert!(
            N <= self.ring.capacity(),
            "pop_range of {N} from a ring of capacity {}",
            self.ring.capacity()
        );
        while self.ring.size() < N {
            spin_wait();
        }
        for i in 0..N {
            let index = self.ring.head_index(i);
            out[i] = self.ring.payload_at(index);
            if let Some(signals) = out_signals.as_deref_mut() {
                signals[i] = self.ring.signal_at(index);
            }
        }
        self.ring.release(N);
    }

    /// Borrow the head payload without consuming it, spinning until an item
    /// is available; the head signal is copied into `out_signal` when
    /// supplied.
    ///
    /// The borrow ends before the next consuming call (`&mut self` enforces
    /// it), and the read pointer does not move.
    pub fn peek(&mut self, out_signal: Option<&mut Signal>) -> &T {
        while self.ring.size() == 0 {
            spin_wait();
        }
        let index = self.ring.head_index(0);
        if let Some(signal) = out_signal {
            *signal = self.ring.signal_at(index);
        }
        unsafe { &*self.ring.slot_ptr(index) }
    }

    /// Discard `n` head items without copying them out.
    ///
    /// # Panics
    /// If `n` exceeds the ring capacity, or more items than the ring
    /// currently holds are discarded (caller contract).
    pub fn recycle(&mut self, n: usize) {
        assert!(
            n <= self.ring.capacity(),
            "recycle({n}) from a ring of capacity {}",
            self.ring.capacity()
        );
        assert!(
            n <= self.ring.size(),
            "recycle({n}) with only {} items enqueued",
            self.ring.size()
        );
        self.ring.release(n);
    }

    pub fn size(&self) -> usize {
        self.ring.size()
    }

    pub fn space_avail(&self) -> usize {
        self.ring.space_avail()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// True once the producer published end-of-stream. Readable from the
    /// consumer process because the latch lives in the shared header.
    pub fn write_finished(&self) -> bool {
        self.ring.write_finished()
    }

    /// Snapshot of the read pointer, for observability and tests.
    pub fn read_pointer(&self) -> PointerValue {
        self.ring.read_pointer()
    }

    pub(crate) fn ring(&self) -> &RingBuffer<T> {
        &self.ring
    }
}

impl<T: Copy + Send> fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_consumer(self, f)
    }
}
