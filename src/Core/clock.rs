// Background-updated monotonic clock
// A pinned updater thread advances a double-buffered seconds counter that
// readers sample in O(1) without locks or syscalls

use std::fmt;
use std::io;
use std::sync::atomic::Ordering::{Acquire, Release};
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// Core the updater pins itself to when the caller does not choose one.
const DEFAULT_UPDATER_CORE: usize = 1;

/// Time source for the updater task.
///
/// Fixed at construction; a sum type rather than a trait object because the
/// source never changes once the updater is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Every updater iteration advances by exactly +1.0. For unit tests.
    Dummy,
    /// CPU cycle counter read behind serializing fences, with deltas divided
    /// by the base frequency discovered from the OS. x86_64 Linux only; the
    /// updater pins itself so consecutive samples stay frequency-coherent.
    Cycle,
    /// Deltas of the OS monotonic clock, accumulated by the updater so the
    /// readable value stays drift-free while being sampled by one thread.
    System,
}

struct ClockShared {
    /// First shadow of the seconds counter, stored as an `f64` bit pattern.
    a: CachePadded<AtomicU64>,
    /// Second shadow. The updater stores `a` then `b`; a reader that loads
    /// equal shadows holds a value published by a single iteration.
    b: CachePadded<AtomicU64>,
    done: AtomicBool,
}

/// Monotonic seconds counter advanced by a background updater thread.
///
/// Readers call [`read`](MonotonicClock::read) from any thread: two acquire
/// loads and an equality retry, no locking, no syscall. Dropping the handle
/// stops the updater and joins it; drop the clock before process exit rather
/// than leaking the handle.
pub struct MonotonicClock {
    shared: Arc<ClockShared>,
    updater: Option<JoinHandle<()>>,
}

impl MonotonicClock {
    /// Spawn the updater on the default core.
    pub fn new(kind: ClockKind) -> io::Result<Self> {
        Self::pinned(kind, DEFAULT_UPDATER_CORE)
    }

    /// Spawn the updater pinned to `core`. Pinning is best-effort advisory;
    /// source availability and thread spawn failures are construction errors.
    pub fn pinned(kind: ClockKind, core: usize) -> io::Result<Self> {
        let cycle_hz = match kind {
            ClockKind::Cycle => Some(cycle_counter_hz()?),
            _ => None,
        };
        let shared = Arc::new(ClockShared {
            a: CachePadded::new(AtomicU64::new(0)),
            b: CachePadded::new(AtomicU64::new(0)),
            done: AtomicBool::new(false),
        });
        let worker = Arc::clone(&shared);
        let updater = thread::Builder::new()
            .name("clock-updater".into())
            .spawn(move || run_updater(worker, kind, cycle_hz, core))?;
        Ok(Self {
            shared,
            updater: Some(updater),
        })
    }

    /// Current value in seconds.
    ///
    /// Loads shadow `a` then shadow `b` and retries until they match; a
    /// mismatch means the updater was mid-store. Consecutive reads from any
    /// one thread are non-decreasing.
    pub fn read(&self) -> f64 {
        loop {
            let a = self.shared.a.load(Acquire);
            let b = self.shared.b.load(Acquire);
            if a == b {
                return f64::from_bits(b);
            }
            std::hint::spin_loop();
        }
    }

    pub(crate) fn updater_alive(&self) -> bool {
        self.updater
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for MonotonicClock {
    fn drop(&mut self) {
        self.shared.done.store(true, Release);
        if let Some(updater) = self.updater.take() {
            let _ = updater.join();
        }
    }
}

impl fmt::Debug for MonotonicClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::Debug::StructDebug::debug_monotonic_clock(self, f)
    }
}

fn run_updater(shared: Arc<ClockShared>, kind: ClockKind, cycle_hz: Option<f64>, core: usize) {
    pin_current_thread(core);

    let mut seconds: f64 = 0.0;
    let mut last_cycle: u64 = match kind {
        ClockKind::Cycle => read_cycle_counter(),
        _ => 0,
    };
    let mut last_instant = Instant::now();

    while !shared.done.load(Acquire) {
        let delta = match kind {
            ClockKind::Dummy => 1.0,
            ClockKind::Cycle => {
                let now = read_cycle_counter();
                let elapsed = now.wrapping_sub(last_cycle);
                last_cycle = now;
                // Construction guarantees the frequency is known for Cycle
                elapsed as f64 / cycle_hz.unwrap_or(f64::INFINITY)
            }
            ClockKind::System => {
                let now = Instant::now();
                let elapsed = now.duration_since(last_instant).as_secs_f64();
                last_instant = now;
                elapsed
            }
        };
        seconds += delta;
        let bits = seconds.to_bits();
        shared.a.store(bits, Release);
        shared.b.store(bits, Release);
    }
}

/// Base frequency of the cycle counter in Hz, discovered from the OS.
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
fn cycle_counter_hz() -> io::Result<f64> {
    if let Ok(text) = std::fs::read_to_string("/sys/devices/system/cpu/cpu0/cpufreq/base_frequency")
    {
        if let Ok(khz) = text.trim().parse::<f64>() {
            return Ok(khz * 1_000.0);
        }
    }
    if let Ok(text) = std::fs::read_to_string("/proc/cpuinfo") {
        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("cpu MHz") {
                if let Some(value) = rest.split(':').nth(1) {
                    if let Ok(mhz) = value.trim().parse::<f64>() {
                        return Ok(mhz * 1_000_000.0);
                    }
                }
            }
        }
    }
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "cannot discover the cycle counter base frequency from the OS",
    ))
}

#[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
fn cycle_counter_hz() -> io::Result<f64> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "the cycle counter clock source requires x86_64 Linux",
    ))
}

/// Serialized cycle counter read: the fences keep the sample from drifting
/// across neighboring loads and stores.
#[cfg(target_arch = "x86_64")]
#[inline]
fn read_cycle_counter() -> u64 {
    use std::arch::x86_64::{_mm_lfence, _mm_mfence, _rdtsc};
    unsafe {
        _mm_mfence();
        _mm_lfence();
        let tsc = _rdtsc();
        _mm_lfence();
        tsc
    }
}

// Unreachable: construction already failed for Cycle off x86_64
#[cfg(not(target_arch = "x86_64"))]
#[inline]
fn read_cycle_counter() -> u64 {
    0
}

#[cfg(target_os = "linux")]
fn pin_current_thread(core: usize) {
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(core, &mut set);
        // Advisory: on a machine without this core the updater simply floats
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set);
    }
}

#[cfg(not(target_os = "linux"))]
fn pin_current_thread(_core: usize) {}
