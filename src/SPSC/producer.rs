// In src/SPSC/producer.rs
use std::fmt;
use std::sync::Arc;

use crate::Core::SharedMemory::SharedMemoryBackend;
use crate::SPSC::Buffer::Buffer_impl::spin_wait;
use crate::SPSC::Buffer::layout::PointerValue;
use crate::SPSC::Buffer::RingBuffer;
use crate::SPSC::Structs::Buffer_Structs::Signal;

/// The producing half of an SPSC channel.
///
/// Exactly one `Producer` exists per ring. It owns the write pointer: only
/// this handle advances it, and the consumer only ever reads it. Publication
/// happens either in place ([`allocate`] then [`push`]) or by value
/// ([`push_item`]); both block by busy-spinning while the ring is full.
///
/// [`allocate`]: Producer::allocate
/// [`push`]: Producer::push
/// [`push_item`]: Producer::push_item
pub struct Producer<T> {
    ring: RingBuffer<T>,
    outstanding: bool,
    _region: Arc<dyn SharedMemoryBackend>,
}

impl<T: Copy + Send> Producer<T> {
    pub(crate) fn new(region: Arc<dyn SharedMemoryBackend>, ring: RingBuffer<T>) -> Self {
        Self {
            ring,
            outstanding: false,
            _region: region,
        }
    }

    /// Claim the next write slot for in-place construction.
    ///
    /// Spins until the ring has space, then returns an exclusive borrow of
    /// the slot. The consumer's pointer arithmetic guarantees it cannot reach
    /// this index until the matching [`push`](Producer::push) publishes it.
    ///
    /// # Panics
    /// If a previously allocated slot has not been pushed yet.
    pub fn allocate(&mut self) -> &mut T {
        assert!(
            !self.outstanding,
            "allocate() while a claimed slot is still unpublished"
        );
        while self.ring.space_avail() == 0 {
            spin_wait();
        }
        self.outstanding = true;
        let index = self.ring.write_index();
        unsafe { &mut *self.ring.slot_ptr(index) }
    }

    /// Publish the slot claimed by the matching [`allocate`](Producer::allocate),
    /// tagging it with `signal`.
    ///
    /// A no-op when no allocation is outstanding. [`Signal::Eof`] latches
    /// [`write_finished`](Producer::write_finished) permanently.
    ///
    /// # Panics
    /// If end-of-stream was already published.
    pub fn push(&mut self, signal: Signal) {
        if !self.outstanding {
            return;
        }
        assert!(
            !self.ring.write_finished(),
            "push() after end-of-stream was already published"
        );
        self.outstanding = false;
        self.ring.publish(signal);
    }

    /// Copy `item` into the next slot and publish it with `signal` in one
    /// call. Spins until the ring has space.
    pub fn push_item(&mut self, item: T, signal: Signal) {
        *self.allocate() = item;
        self.push(signal);
    }

    /// Enqueue every element of `items`; the final element carries `signal`,
    /// all preceding elements carry [`Signal::None`]. Blocks element-wise.
    pub fn insert<I>(&mut self, items: I, signal: Signal)
    where
        I: IntoIterator<Item = T>,
    {
        let mut items = items.into_iter().peekable();
        while let Some(item) = items.next() {
            let tag = if items.peek().is_none() {
                signal
            } else {
                Signal::None
            };
            self.push_item(item, tag);
        }
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

    /// True once any push carried [`Signal::Eof`].
    pub fn write_finished(&self) -> bool {
        self.ring.write_finished()
    }

    /// Snapshot of the write pointer, for observability and tests.
    pub fn write_pointer(&self) -> PointerValue {
        self.ring.write_pointer()
    }

    pub(crate) fn allocate_outstanding(&self) -> bool {
        self.outstanding
    }

    pub(crate) fn ring(&self) -> &RingBuffer<T> {
        &self.ring
    }
}

impl<T: Copy + Send> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_producer(self, f)
    }
}
