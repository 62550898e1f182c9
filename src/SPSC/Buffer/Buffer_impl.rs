use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::mem::{align_of, size_of, MaybeUninit};
use std::ptr::{self, NonNull};
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};
use std::cell::UnsafeCell;

use super::layout::{signal_band_offset, PointerValue, RegionHeader, HEADER_SIZE, REGION_MAGIC};
use super::Buffer::{InfiniteRing, RingBuffer};
use crate::SPSC::Structs::Buffer_Structs::Signal;

/// One spin iteration while waiting on the opposite pointer: always the CPU
/// pause hint, plus a cooperative OS yield under the `nice` feature.
#[inline]
pub(crate) fn spin_wait() {
    std::hint::spin_loop();
    #[cfg(feature = "nice")]
    std::thread::yield_now();
}

impl<T: Copy> RingBuffer<T> {
    /// Create a view over `region` and initialize a fresh header in it.
    ///
    /// # Safety
    /// `region` must point at least [`region_size::<T>(capacity)`] writable,
    /// zeroed, 64-byte aligned bytes that outlive the view, and no other view
    /// of the region may exist yet.
    ///
    /// [`region_size::<T>(capacity)`]: super::layout::region_size
    pub unsafe fn init(region: *mut u8, capacity: usize) -> Self {
        debug_assert!(capacity > 0 && capacity <= u32::MAX as usize);
        debug_assert!(align_of::<T>() <= HEADER_SIZE);
        RegionHeader::init(region, capacity);
        Self::view(region, capacity)
    }

    /// Create a view over an already initialized region.
    ///
    /// Validates the magic word, checks that `capacity` matches the value the
    /// creator wrote, and claims the single consumer-side attachment.
    ///
    /// # Safety
    /// `region` must point at a mapping of at least
    /// [`region_size::<T>(capacity)`] bytes that outlives the view.
    ///
    /// [`region_size::<T>(capacity)`]: super::layout::region_size
    pub unsafe fn attach(region: *mut u8, capacity: usize) -> io::Result<Self> {
        let header = &*(region as *const RegionHeader);
        if header.magic != REGION_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "region carries no ring header - not created by a producer",
            ));
        }
        if header.capacity != capacity as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "capacity mismatch between attachers: creator wrote {}, attacher expects {}",
                    header.capacity, capacity
                ),
            ));
        }
        if header
            .consumer_attached
            .compare_exchange(0, 1, Relaxed, Relaxed)
            .is_err()
        {
            return Err(io::Error::new(
                io::ErrorKind::AddrInUse,
                "a consumer is already attached to this region",
            ));
        }
        Ok(Self::view(region, capacity))
    }

    fn view(region: *mut u8, capacity: usize) -> Self {
        let payload = unsafe { region.add(HEADER_SIZE) } as *mut T;
        let signal = unsafe { region.add(signal_band_offset::<T>(capacity)) };
        Self {
            region: NonNull::new(region).expect("null region pointer"),
            capacity,
            payload: NonNull::new(payload).expect("null payload pointer"),
            signal: NonNull::new(signal).expect("null signal pointer"),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn header(&self) -> &RegionHeader {
        unsafe { &*(self.region.as_ptr() as *const RegionHeader) }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current element count.
    ///
    /// Derived from one acquire load of each pointer; under contention the
    /// two loads may straddle an advance on the other side, so the value is
    /// advisory - momentarily stale, eventually correct. The blocking loops
    /// in the producer and consumer re-check rather than trusting one sample.
    pub fn size(&self) -> usize {
        let w = self.header().write_pt.load_acquire();
        let r = self.header().read_pt.load_acquire();
        if w.val() == r.val() {
            if w.wrap_indicator() == r.wrap_indicator() {
                0
            } else {
                self.capacity
            }
        } else if r.val() < w.val() {
            w.val() - r.val()
        } else {
            self.capacity - r.val() + w.val()
        }
    }

    #[inline]
    pub fn space_avail(&self) -> usize {
        self.capacity - self.size()
    }

    /// Snapshot of the producer-owned pointer.
    #[inline]
    pub fn write_pointer(&self) -> PointerValue {
        self.header().write_pt.load_acquire()
    }

    /// Snapshot of the consumer-owned pointer.
    #[inline]
    pub fn read_pointer(&self) -> PointerValue {
        self.header().read_pt.load_acquire()
    }

    /// True once a push carried [`Signal::Eof`]. Terminal.
    #[inline]
    pub fn write_finished(&self) -> bool {
        self.header().write_finished.load(Acquire) != 0
    }

    #[inline]
    pub(crate) fn region_ptr(&self) -> *mut u8 {
        self.region.as_ptr()
    }

    // --- producer-side primitives ---

    /// Index of the slot the producer will publish next.
    #[inline]
    pub(crate) fn write_index(&self) -> usize {
        self.header().write_pt.load_relaxed().val()
    }

    #[inline]
    pub(crate) fn slot_ptr(&self, index: usize) -> *mut T {
        debug_assert!(index < self.capacity);
        unsafe { self.payload.as_ptr().add(index) }
    }

    /// Tag the current write slot and advance `write_pt`.
    ///
    /// The signal store precedes the release advance, so any consumer that
    /// observes the new pointer also observes the new signal and payload.
    pub(crate) fn publish(&self, signal: Signal) {
        let index = self.write_index();
        unsafe { self.signal.as_ptr().add(index).write(signal.as_raw()) };
        if signal == Signal::Eof {
            self.header().write_finished.store(1, Release);
        }
        self.header().write_pt.inc(self.capacity);
    }

    // --- consumer-side primitives ---

    /// Index of the slot `offset` positions past the consume head.
    #[inline]
    pub(crate) fn head_index(&self, offset: usize) -> usize {
        (self.header().read_pt.load_relaxed().val() + offset) % self.capacity
    }

    #[inline]
    pub(crate) fn signal_at(&self, index: usize) -> Signal {
        debug_assert!(index < self.capacity);
        Signal::from_raw(unsafe { self.signal.as_ptr().add(index).read() })
    }

    #[inline]
    pub(crate) fn payload_at(&self, index: usize) -> T {
        debug_assert!(index < self.capacity);
        unsafe { self.payload.as_ptr().add(index).read() }
    }

    /// Hand `n` consumed slots back to the producer. The release advance of
    /// `read_pt` orders the payload and signal reads before it.
    #[inline]
    pub(crate) fn release(&self, n: usize) {
        self.header().read_pt.inc_by(n, self.capacity);
    }
}

impl<T: Copy> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_ring_buffer(self, f)
    }
}

impl<T: Copy> InfiniteRing<T> {
    pub fn new() -> Self {
        Self {
            slot: UnsafeCell::new(MaybeUninit::zeroed()),
            signal: UnsafeCell::new(0),
            write_finished: AtomicU32::new(0),
        }
    }

    /// Pinned to 1: the slot is always considered occupied.
    #[inline]
    pub fn size(&self) -> usize {
        1
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        1
    }

    /// There is no backpressure; a push always has room.
    #[inline]
    pub fn space_avail(&self) -> usize {
        1
    }

    /// Overwrite slot 0. Never blocks.
    pub fn push_item(&self, item: T, signal: Signal) {
        unsafe {
            ptr::write_volatile((*self.slot.get()).as_mut_ptr(), item);
            ptr::write_volatile(self.signal.get(), signal.as_raw());
        }
        if signal == Signal::Eof {
            self.write_finished.store(1, Release);
        }
    }

    /// Read slot 0's current contents. Never blocks; before the first push
    /// this yields the zero-initialized payload.
    pub fn pop(&self, out: &mut T, out_signal: Option<&mut Signal>) {
        unsafe {
            *out = ptr::read_volatile((*self.slot.get()).as_ptr());
            if let Some(signal) = out_signal {
                *signal = Signal::from_raw(ptr::read_volatile(self.signal.get()));
            }
        }
    }

    #[inline]
    pub fn write_finished(&self) -> bool {
        self.write_finished.load(Acquire) != 0
    }
}

impl<T: Copy> Default for InfiniteRing<T> {
    fn default() -> Self {
        Self::new()
    }
}

// The signal band layout assumes one byte per slot.
const _: () = assert!(size_of::<Signal>() == 1);
