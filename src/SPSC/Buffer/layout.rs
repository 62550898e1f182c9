use std::fmt;
use std::mem::size_of;
use std::ptr;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Magic word identifying an initialized ring region ("RINGPIPE").
pub const REGION_MAGIC: u64 = 0x52494E4750495045;

/// The header occupies exactly one cache line; the payload band starts here.
pub const HEADER_SIZE: usize = 64;

/// A wrap-tagged ring position.
///
/// The low 32 bits hold the slot index in `[0, capacity)`; the high 32 bits
/// hold the wrap generation, which increments exactly when the index rolls
/// through zero. The pair is packed into one naturally aligned 64-bit word so
/// that every update is a single store and every read by the opposite side is
/// a single load - the other side can never observe a half-updated position.
///
/// The wrap generation is what disambiguates "full" from "empty" when the two
/// indices coincide: equal index and equal wrap is an empty ring, equal index
/// and differing wrap is a full one. No extra flag, no capacity-plus-one slot,
/// and no read-modify-write atomics on the hot path.
#[repr(transparent)]
pub struct Pointer {
    word: AtomicU64,
}

/// A decoded snapshot of a [`Pointer`] word.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct PointerValue(u64);

impl PointerValue {
    /// Slot index in `[0, capacity)`.
    #[inline]
    pub fn val(self) -> usize {
        (self.0 & 0xFFFF_FFFF) as usize
    }

    /// Wrap generation.
    #[inline]
    pub fn wrap_indicator(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    fn pack(value: u64, wrap: u32) -> Self {
        PointerValue(((wrap as u64) << 32) | value)
    }
}

impl fmt::Debug for PointerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerValue")
            .field("val", &self.val())
            .field("wrap", &self.wrap_indicator())
            .finish()
    }
}

impl Pointer {
    pub const fn zero() -> Self {
        Pointer {
            word: AtomicU64::new(0),
        }
    }

    /// Acquire load, pairing with the owning side's release stores: observing
    /// a new position also observes every slot store made before it.
    #[inline]
    pub fn load_acquire(&self) -> PointerValue {
        PointerValue(self.word.load(Ordering::Acquire))
    }

    /// Relaxed load. Only meaningful on the owning side, which is the sole
    /// writer of this word.
    #[inline]
    pub fn load_relaxed(&self) -> PointerValue {
        PointerValue(self.word.load(Ordering::Relaxed))
    }

    /// Advance by one slot, bumping the wrap generation on roll-through.
    /// Owner-side only; the store is the release that publishes the slot.
    #[inline]
    pub fn inc(&self, capacity: usize) {
        self.inc_by(1, capacity);
    }

    /// Advance by `n` slots: `wrap += (value + n) / capacity`,
    /// `value = (value + n) % capacity`. Owner-side only.
    #[inline]
    pub fn inc_by(&self, n: usize, capacity: usize) {
        debug_assert!(capacity > 0);
        let cur = self.load_relaxed();
        let pos = cur.val() as u64 + n as u64;
        let cap = capacity as u64;
        let next = PointerValue::pack(pos % cap, cur.wrap_indicator().wrapping_add((pos / cap) as u32));
        self.word.store(next.0, Ordering::Release);
    }
}

/// Control header at offset 0 of every ring region, heap or shared.
///
/// The first three words are the wire contract shared by both attaching
/// processes: the slot count, then the producer-owned write pointer, then the
/// consumer-owned read pointer. The remainder of the cache line carries the
/// magic word, the end-of-stream latch, and the per-direction attachment
/// claims. Both processes compute identical offsets regardless of where the
/// mapping lands in their address space.
#[repr(C, align(8))]
pub struct RegionHeader {
    /// Slot count, immutable after initialization.
    pub capacity: u64,

    /// Producer-owned position of the next slot to publish. Read by the
    /// consumer, written only by the producer.
    pub write_pt: Pointer,

    /// Consumer-owned position of the next slot to consume. Read by the
    /// producer, written only by the consumer.
    pub read_pt: Pointer,

    /// [`REGION_MAGIC`] once the header is initialized; attachers reject
    /// regions that do not carry it.
    pub magic: u64,

    /// Nonzero once a push carried [`Signal::Eof`]. Lives in the region so a
    /// consumer process observes end-of-stream structurally, not only through
    /// the in-band tag.
    ///
    /// [`Signal::Eof`]: crate::SPSC::Structs::Signal::Eof
    pub write_finished: AtomicU32,

    /// Claimed once by the creating (producer) side.
    pub producer_attached: AtomicU32,

    /// Claimed once, with a compare-exchange, by the attaching (consumer)
    /// side; a second consumer-side attachment fails construction.
    pub consumer_attached: AtomicU32,

    _pad: [u8; 20],
}

impl RegionHeader {
    /// Write a fresh header into region memory.
    ///
    /// # Safety
    /// `region` must point at least [`HEADER_SIZE`] writable, 8-byte aligned
    /// bytes that no other thread is concurrently accessing.
    pub unsafe fn init(region: *mut u8, capacity: usize) {
        ptr::write(
            region as *mut RegionHeader,
            RegionHeader {
                capacity: capacity as u64,
                write_pt: Pointer::zero(),
                read_pt: Pointer::zero(),
                magic: REGION_MAGIC,
                write_finished: AtomicU32::new(0),
                producer_attached: AtomicU32::new(1),
                consumer_attached: AtomicU32::new(0),
                _pad: [0; 20],
            },
        );
    }
}

/// Total bytes backing a ring of `capacity` payload slots: one header cache
/// line, the payload band, then one signal byte per slot.
#[inline]
pub fn region_size<T>(capacity: usize) -> usize {
    HEADER_SIZE + capacity * size_of::<T>() + capacity
}

/// Byte offset of the signal band within the region.
#[inline]
pub fn signal_band_offset<T>(capacity: usize) -> usize {
    HEADER_SIZE + capacity * size_of::<T>()
}
