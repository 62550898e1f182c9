// Module naming follows project convention (SPSC = Single-Producer Single-Consumer)
#[allow(non_snake_case)]
pub mod SPSC;

// Debug implementations for various types
pub mod Debug {
    pub mod StructDebug;
}

#[allow(non_snake_case)]
pub mod Core {
    pub mod SharedMemory;
    pub use SharedMemory::{
        attach_shared_memory, create_shared_memory, gen_shm_name, open_region, Direction,
        HeapMemory, RawHandle, SharedMemoryBackend,
    };
    pub mod clock;
    pub use clock::{ClockKind, MonotonicClock};
}
