// Shared memory backend abstraction for Linux
// Uses shm_open + mmap so a named region can be attached from a second process

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::io;
use std::ptr::NonNull;
use std::time::{SystemTime, UNIX_EPOCH};

/// Which side of the channel this process plays. The producer side creates
/// the named region and initializes its header; the consumer side attaches to
/// a region that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Producer,
    Consumer,
}

/// Memory backend trait shared by the heap and shared-memory backings
pub trait SharedMemoryBackend: Send + Sync + std::fmt::Debug {
    /// Get a pointer to the mapped memory region
    fn as_ptr(&self) -> *mut u8;

    /// Get the size of the mapped region in bytes
    fn size(&self) -> usize;

    /// Get the underlying handle, if the region has one
    fn raw_handle(&self) -> RawHandle;
}

/// Platform-specific handle type
#[derive(Debug, Clone, Copy)]
pub enum RawHandle {
    /// Unix file descriptor (Linux)
    Fd(i32),
    /// Process-private heap allocation; nothing to hand across a boundary
    Anon,
}

/// Create a new named shared memory region of `size` bytes.
///
/// Fails with `AlreadyExists` when the name is already taken and
/// `PermissionDenied` when the backing object cannot be opened read-write.
#[cfg(target_os = "linux")]
pub fn create_shared_memory(name: &str, size: usize) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Ok(Box::new(PosixSharedMemory::create(name, size)?))
}

/// Attach to an existing named shared memory region of exactly `size` bytes.
#[cfg(target_os = "linux")]
pub fn attach_shared_memory(name: &str, size: usize) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Ok(Box::new(PosixSharedMemory::attach(name, size)?))
}

#[cfg(not(target_os = "linux"))]
pub fn create_shared_memory(_name: &str, _size: usize) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Shared memory only supported on Linux",
    ))
}

#[cfg(not(target_os = "linux"))]
pub fn attach_shared_memory(_name: &str, _size: usize) -> io::Result<Box<dyn SharedMemoryBackend>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Shared memory only supported on Linux",
    ))
}

/// Open a region for the given channel side: producers create, consumers
/// attach.
pub fn open_region(
    name: &str,
    size: usize,
    direction: Direction,
) -> io::Result<Box<dyn SharedMemoryBackend>> {
    match direction {
        Direction::Producer => create_shared_memory(name, size),
        Direction::Consumer => attach_shared_memory(name, size),
    }
}

/// A region name unlikely to collide across processes and test runs:
/// `/prefix-pid-nanos`.
pub fn gen_shm_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    format!("/{}-{}-{:x}", prefix, std::process::id(), nanos)
}

/// Process-private region with the same layout contract as the shared one.
/// Backs the heap variant of the ring; both channel halves keep the
/// allocation alive through an `Arc`.
#[derive(Debug)]
pub struct HeapMemory {
    ptr: NonNull<u8>,
    layout: Layout,
}

unsafe impl Send for HeapMemory {}
unsafe impl Sync for HeapMemory {}

impl HeapMemory {
    /// Allocate `size` zeroed bytes aligned to a cache line.
    pub fn new(size: usize) -> io::Result<Self> {
        let layout = Layout::from_size_align(size, 64).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("HeapMemory::new(): invalid layout for {size} bytes: {e}"),
            )
        })?;
        let ptr = unsafe { alloc_zeroed(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => Ok(Self { ptr, layout }),
            None => Err(io::Error::new(
                io::ErrorKind::OutOfMemory,
                format!("HeapMemory::new(): allocation of {size} bytes failed"),
            )),
        }
    }
}

impl Drop for HeapMemory {
    fn drop(&mut self) {
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

impl SharedMemoryBackend for HeapMemory {
    fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    fn size(&self) -> usize {
        self.layout.size()
    }

    fn raw_handle(&self) -> RawHandle {
        RawHandle::Anon
    }
}

#[cfg(target_os = "linux")]
use libc::c_void;
#[cfg(target_os = "linux")]
use std::ffi::CString;
#[cfg(target_os = "linux")]
use std::os::unix::io::RawFd;

#[cfg(target_os = "linux")]
#[derive(Debug)]
pub struct PosixSharedMemory {
    ptr: NonNull<u8>,
    size: usize,
    fd: RawFd,
    name: CString,
    /// The creating side unlinks the name on drop; attachers only unmap.
    owner: bool,
}

#[cfg(target_os = "linux")]
unsafe impl Send for PosixSharedMemory {}
#[cfg(target_os = "linux")]
unsafe impl Sync for PosixSharedMemory {}

#[cfg(target_os = "linux")]
impl PosixSharedMemory {
    fn shm_name(name: &str) -> io::Result<CString> {
        let normalized = if name.starts_with('/') {
            name.to_string()
        } else {
            format!("/{name}")
        };
        CString::new(normalized).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "shared memory name contains an interior NUL",
            )
        })
    }

    /// Create a new shared memory region. Exclusive: an existing object with
    /// the same name is a name collision, not something to reuse.
    pub fn create(name: &str, size: usize) -> io::Result<Self> {
        let c_name = Self::shm_name(name)?;

        let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_CREAT | libc::O_EXCL | libc::O_RDWR, 0o600) };
        if fd < 0 {
            let err = io::Error::last_os_error();
            return Err(io::Error::new(
                err.kind(),
                format!(
                    "PosixSharedMemory::create(): shm_open failed.\n\
                    ├─ Name: {name}\n\
                    ├─ Requested size: {size} bytes\n\
                    ╰─ Error: {err}"
                ),
            ));
        }

        // Set size (the new object is zero length and zero-filled on grow)
        if unsafe { libc::ftruncate(fd, size as libc::off_t) } != 0 {
            let err = io::Error::last_os_error();
            unsafe {
                libc::close(fd);
                libc::shm_unlink(c_name.as_ptr());
            }
            return Err(err);
        }

        let ptr = Self::map(fd, size).map_err(|err| {
            unsafe {
                libc::close(fd);
                libc::shm_unlink(c_name.as_ptr());
            }
            err
        })?;

        Ok(Self {
            ptr,
            size,
            fd,
            name: c_name,
            owner: true,
        })
    }

    /// Attach to an existing shared memory region created by a producer.
    pub fn attach(name: &str, size: usize) -> io::Result<Self> {
        let c_name = Self::shm_name(name)?;

        let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0) };
        if fd < 0 {
            let err = io::Error::last_os_error();
            return Err(io::Error::new(
                err.kind(),
                format!(
                    "PosixSharedMemory::attach(): shm_open failed.\n\
                    ├─ Name: {name}\n\
                    ╰─ Error: {err}"
                ),
            ));
        }

        // Both attachers must agree on the region size
        let mut stat: libc::stat = unsafe { std::mem::zeroed() };
        if unsafe { libc::fstat(fd, &mut stat) } != 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(err);
        }
        if stat.st_size as usize != size {
            unsafe { libc::close(fd) };
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "PosixSharedMemory::attach(): size mismatch between attachers.\n\
                    ├─ Name: {name}\n\
                    ├─ Creator's size: {} bytes\n\
                    ╰─ Attacher's size: {size} bytes",
                    stat.st_size
                ),
            ));
        }

        let ptr = Self::map(fd, size).map_err(|err| {
            unsafe { libc::close(fd) };
            err
        })?;

        Ok(Self {
            ptr,
            size,
            fd,
            name: c_name,
            owner: false,
        })
    }

    fn map(fd: RawFd, size: usize) -> io::Result<NonNull<u8>> {
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        Ok(NonNull::new(ptr as *mut u8).expect("mmap returned null"))
    }
}

#[cfg(target_os = "linux")]
impl Drop for PosixSharedMemory {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr.as_ptr() as *mut c_void, self.size);
            libc::close(self.fd);
            if self.owner {
                libc::shm_unlink(self.name.as_ptr());
            }
        }
    }
}

#[cfg(target_os = "linux")]
impl SharedMemoryBackend for PosixSharedMemory {
    fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    fn size(&self) -> usize {
        self.size
    }

    fn raw_handle(&self) -> RawHandle {
        RawHandle::Fd(self.fd)
    }
}
