use std::fmt;

use crate::Core::clock::MonotonicClock;
use crate::SPSC::Buffer::RingBuffer;
use crate::SPSC::{Consumer, Producer};

/// Debug function for RingBuffer
///
/// Safely displays the region location and both cursor snapshots without
/// dereferencing payload memory.
pub fn debug_ring_buffer<T: Copy>(buffer: &RingBuffer<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RingBuffer")
        .field("region", &format_args!("{:p}", buffer.region_ptr()))
        .field("capacity", &buffer.capacity())
        .field("write_pt", &buffer.write_pointer())
        .field("read_pt", &buffer.read_pointer())
        .field("write_finished", &buffer.write_finished())
        .finish_non_exhaustive()
}

/// Debug function for Producer
///
/// Shows:
/// - The underlying ring
/// - Whether an allocated slot is still unpublished
pub fn debug_producer<T: Copy + Send>(producer: &Producer<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Producer")
        .field("ring", producer.ring())
        .field("allocate_outstanding", &producer.allocate_outstanding())
        .finish()
}

/// Debug function for Consumer
pub fn debug_consumer<T: Copy + Send>(consumer: &Consumer<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Consumer")
        .field("ring", consumer.ring())
        .finish()
}

/// Debug function for MonotonicClock
///
/// Samples the current value; the read is lock-free so formatting never
/// blocks on the updater.
pub fn debug_monotonic_clock(clock: &MonotonicClock, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MonotonicClock")
        .field("seconds", &clock.read())
        .field("updater_alive", &clock.updater_alive())
        .finish()
}
