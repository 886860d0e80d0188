//! Small-object strategy: size-class freelists over the libc heap.
//!
//! Allocations that fit a size class are rounded up to the class size and
//! recycled through a per-class freelist instead of going back to libc on
//! every free. Requests outside the class table (too large, or alignment
//! above the class alignment) take the direct path. Because the router
//! replays the recorded size and alignment at free time, the class decision
//! is reproducible on deallocation without any per-block header.

use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::AllocStrategy;

/// Class sizes in bytes. Every class block is allocated at `CLASS_ALIGN`.
const CLASS_SIZES: [usize; 5] = [16, 32, 64, 128, 256];

/// Alignment every class block satisfies.
const CLASS_ALIGN: usize = 16;

/// Per-class freelist depth before frees go back to libc.
const MAX_CACHED_PER_CLASS: usize = 64;

/// Small-object strategy handed out by the memory system for requests below
/// the router's small-object threshold.
pub struct SmallObjectStrategy {
    /// Free block addresses per class, most recently freed on top.
    bins: [Mutex<Vec<usize>>; CLASS_SIZES.len()],
    live: AtomicU64,
    class_hits: AtomicU64,
    direct: AtomicU64,
}

impl SmallObjectStrategy {
    /// New strategy with empty freelists. `const` so instances can live in
    /// statics.
    #[must_use]
    pub const fn new() -> Self {
        const EMPTY_BIN: Mutex<Vec<usize>> = Mutex::new(Vec::new());
        Self {
            bins: [EMPTY_BIN; CLASS_SIZES.len()],
            live: AtomicU64::new(0),
            class_hits: AtomicU64::new(0),
            direct: AtomicU64::new(0),
        }
    }

    /// Currently live allocations.
    #[must_use]
    pub fn live(&self) -> u64 {
        self.live.load(Ordering::Relaxed)
    }

    /// Requests serviced through a size class.
    #[must_use]
    pub fn class_hits(&self) -> u64 {
        self.class_hits.load(Ordering::Relaxed)
    }

    /// Requests that bypassed the class table.
    #[must_use]
    pub fn direct_requests(&self) -> u64 {
        self.direct.load(Ordering::Relaxed)
    }

    fn class_index(size: usize, align: usize) -> Option<usize> {
        if align > CLASS_ALIGN {
            return None;
        }
        CLASS_SIZES.iter().position(|&class| size <= class)
    }

    fn raw_alloc(size: usize, align: usize) -> *mut u8 {
        let align = align.max(std::mem::size_of::<*mut u8>());
        let mut raw: *mut c_void = ptr::null_mut();
        // SAFETY: raw is a valid out-pointer; align is a power-of-two
        // multiple of the pointer width.
        let rc = unsafe { libc::posix_memalign(&mut raw, align, size) };
        if rc != 0 {
            return ptr::null_mut();
        }
        raw.cast()
    }
}

impl Default for SmallObjectStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocStrategy for SmallObjectStrategy {
    fn name(&self) -> &'static str {
        "small-object"
    }

    fn allocate(&self, size: usize, align: usize) -> *mut u8 {
        let Some(class) = Self::class_index(size, align) else {
            self.direct.fetch_add(1, Ordering::Relaxed);
            let ptr = Self::raw_alloc(size, align);
            if !ptr.is_null() {
                self.live.fetch_add(1, Ordering::Relaxed);
            }
            return ptr;
        };

        if let Some(addr) = self.bins[class].lock().pop() {
            self.class_hits.fetch_add(1, Ordering::Relaxed);
            self.live.fetch_add(1, Ordering::Relaxed);
            return addr as *mut u8;
        }

        let ptr = Self::raw_alloc(CLASS_SIZES[class], CLASS_ALIGN);
        if !ptr.is_null() {
            self.class_hits.fetch_add(1, Ordering::Relaxed);
            self.live.fetch_add(1, Ordering::Relaxed);
        }
        ptr
    }

    fn deallocate(&self, ptr: *mut u8, size: usize, align: usize) {
        if ptr.is_null() {
            return;
        }
        self.live.fetch_sub(1, Ordering::Relaxed);

        if let Some(class) = Self::class_index(size, align) {
            let mut bin = self.bins[class].lock();
            if bin.len() < MAX_CACHED_PER_CLASS {
                bin.push(ptr as usize);
                return;
            }
        }
        // SAFETY: the trait contract guarantees ptr came from allocate, i.e.
        // ultimately from posix_memalign.
        unsafe { libc::free(ptr.cast()) };
    }
}
