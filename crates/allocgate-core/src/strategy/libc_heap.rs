//! Default strategy backed by `posix_memalign`/`free`.

use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};

use super::AllocStrategy;

/// General-purpose strategy that fronts the libc heap.
///
/// This is the "default allocator" the memory system hands out. It keeps
/// lightweight live counters so the harness and tests can observe which
/// strategy serviced a request.
pub struct LibcHeapStrategy {
    live: AtomicU64,
    total: AtomicU64,
}

impl LibcHeapStrategy {
    /// New strategy with zeroed counters. `const` so instances can live in
    /// statics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            live: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Currently live allocations.
    #[must_use]
    pub fn live(&self) -> u64 {
        self.live.load(Ordering::Relaxed)
    }

    /// Total allocations ever serviced.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl Default for LibcHeapStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocStrategy for LibcHeapStrategy {
    fn name(&self) -> &'static str {
        "libc-heap"
    }

    fn allocate(&self, size: usize, align: usize) -> *mut u8 {
        // posix_memalign requires the alignment to be a multiple of the
        // pointer width; the router's normalized alignments already are, but
        // direct callers may not be.
        let align = align.max(std::mem::size_of::<*mut u8>());
        let mut raw: *mut c_void = ptr::null_mut();
        // SAFETY: raw is a valid out-pointer; align is a power-of-two
        // multiple of the pointer width per the trait contract.
        let rc = unsafe { libc::posix_memalign(&mut raw, align, size) };
        if rc != 0 {
            return ptr::null_mut();
        }
        self.live.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
        raw.cast()
    }

    fn deallocate(&self, ptr: *mut u8, _size: usize, _align: usize) {
        if ptr.is_null() {
            return;
        }
        // SAFETY: the trait contract guarantees ptr came from allocate, i.e.
        // from posix_memalign.
        unsafe { libc::free(ptr.cast()) };
        self.live.fetch_sub(1, Ordering::Relaxed);
    }
}
