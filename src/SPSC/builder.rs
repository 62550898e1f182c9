use std::io;
use std::mem::{align_of, size_of};
use std::sync::Arc;

use super::Buffer::layout::{region_size, HEADER_SIZE};
use super::Buffer::{InfiniteRing, RingBuffer};
use super::{Consumer, Producer};
use crate::Core::SharedMemory::{open_region, Direction, HeapMemory, SharedMemoryBackend};

/// Configures and constructs one SPSC channel.
///
/// One builder, three backings: [`build_heap`] splits a process-private ring
/// into a thread pair, [`build_shared_producer`] / [`build_shared_consumer`]
/// put the same ring into a named shared-memory region so two processes can
/// share it, and [`build_infinite`] yields the backpressure-free
/// rate-measurement variant.
///
/// [`build_heap`]: ChannelBuilder::build_heap
/// [`build_shared_producer`]: ChannelBuilder::build_shared_producer
/// [`build_shared_consumer`]: ChannelBuilder::build_shared_consumer
/// [`build_infinite`]: ChannelBuilder::build_infinite
pub struct ChannelBuilder {
    capacity: usize,
}

impl Default for ChannelBuilder {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

impl ChannelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot count of the ring. Any value in `1..=u32::MAX`; powers of two are
    /// not required.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    fn validate<T>(&self) -> io::Result<()> {
        if self.capacity == 0 || self.capacity > u32::MAX as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "ChannelBuilder: capacity out of range.\n\
                    ├─ Requested: {} slots\n\
                    ╰─ Expected: 1..=u32::MAX (the pointer word keeps positions in 32 bits)",
                    self.capacity
                ),
            ));
        }
        if size_of::<T>() == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "ChannelBuilder: zero-sized payloads are not supported",
            ));
        }
        if align_of::<T>() > HEADER_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "ChannelBuilder: payload alignment too large.\n\
                    ├─ align_of::<T>(): {} bytes\n\
                    ╰─ Expected: at most {HEADER_SIZE} (the payload band starts one cache line in)",
                    align_of::<T>()
                ),
            ));
        }
        Ok(())
    }

    /// Build a heap-backed ring and split it into its two thread-side halves.
    pub fn build_heap<T: Copy + Send>(self) -> io::Result<(Producer<T>, Consumer<T>)> {
        self.validate::<T>()?;
        let region: Arc<dyn SharedMemoryBackend> =
            Arc::new(HeapMemory::new(region_size::<T>(self.capacity))?);
        let producer_ring = unsafe { RingBuffer::init(region.as_ptr(), self.capacity) };
        let consumer_ring = unsafe { RingBuffer::attach(region.as_ptr(), self.capacity)? };
        Ok((
            Producer::new(Arc::clone(&region), producer_ring),
            Consumer::new(region, consumer_ring),
        ))
    }

    /// Create the named shared region and return its producing half.
    ///
    /// Fails with `AlreadyExists` when the name is taken, `PermissionDenied`
    /// when the backing object is not writable, `Unsupported` off Linux.
    pub fn build_shared_producer<T: Copy + Send>(self, name: &str) -> io::Result<Producer<T>> {
        self.validate::<T>()?;
        let region: Arc<dyn SharedMemoryBackend> = Arc::from(open_region(
            name,
            region_size::<T>(self.capacity),
            Direction::Producer,
        )?);
        let ring = unsafe { RingBuffer::init(region.as_ptr(), self.capacity) };
        Ok(Producer::new(region, ring))
    }

    /// Attach to an existing named shared region and return its consuming
    /// half. The capacity must match the creator's; a second consumer-side
    /// attachment is rejected.
    pub fn build_shared_consumer<T: Copy + Send>(self, name: &str) -> io::Result<Consumer<T>> {
        self.validate::<T>()?;
        let region: Arc<dyn SharedMemoryBackend> = Arc::from(open_region(
            name,
            region_size::<T>(self.capacity),
            Direction::Consumer,
        )?);
        let ring = unsafe { RingBuffer::attach(region.as_ptr(), self.capacity)? };
        Ok(Consumer::new(region, ring))
    }

    /// Build the degenerate single-slot variant used for rate measurement.
    pub fn build_infinite<T: Copy + Send>(self) -> InfiniteRing<T> {
        InfiniteRing::new()
    }
}
