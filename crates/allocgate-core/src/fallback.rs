//! Emergency fallback allocation path.
//!
//! Used whenever the strategy layer is unavailable: before the memory system
//! is initialized, or when a call is a reentrant one (meaning we are already
//! inside allocator machinery and must not recurse into it). Storage comes
//! straight from `libc::malloc`, over-allocated so any requested alignment
//! can be honored.
//!
//! The raw base pointer is written immediately before the aligned address
//! (the classic aligned-malloc layout) *and* carried out-of-band in the
//! allocation record. The record is what deallocation actually uses; the
//! in-band copy is never re-derived from the user pointer.

use std::mem;
use std::ptr;

use crate::align::{align_up, normalize_alignment};

/// Result of a successful fallback allocation.
#[derive(Debug, Clone, Copy)]
pub struct FallbackBlock {
    /// Aligned address handed to the caller.
    pub ptr: *mut u8,
    /// Raw base pointer that must be passed to [`free_fallback`].
    pub storage: *mut u8,
}

/// Allocates `size` bytes at the given alignment from the libc heap.
///
/// Returns `None` when the raw allocation fails; the caller propagates that
/// as an ordinary allocation failure.
#[must_use]
pub fn allocate_fallback(size: usize, alignment: usize) -> Option<FallbackBlock> {
    let alignment = normalize_alignment(alignment);
    let extra = alignment.checked_add(mem::size_of::<*mut u8>())?;
    let total = size.checked_add(extra)?;

    // SAFETY: plain malloc of a positive byte count.
    let storage = unsafe { libc::malloc(total) }.cast::<u8>();
    if storage.is_null() {
        return None;
    }

    let aligned = align_up(storage as usize + mem::size_of::<*mut u8>(), alignment);
    // SAFETY: aligned is within the block (total >= size + alignment + word),
    // and aligned - word is word-aligned because alignment is a power of two
    // >= the pointer width.
    unsafe {
        let slot = (aligned as *mut *mut u8).sub(1);
        slot.write(storage);
    }

    Some(FallbackBlock {
        ptr: aligned as *mut u8,
        storage,
    })
}

/// Releases storage obtained from [`allocate_fallback`].
///
/// `storage` is the raw base pointer captured at allocation time.
pub fn free_fallback(storage: *mut u8) {
    // SAFETY: storage came from libc::malloc in allocate_fallback.
    unsafe { libc::free(storage.cast()) };
}

/// Best-effort release of an arbitrary pointer through libc.
///
/// Used for nested deallocations and for untracked pointers where no record
/// exists to consult.
pub fn free_raw(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: degraded-safety path by contract; the pointer is assumed to be
    // ordinary libc heap storage.
    unsafe { libc::free(ptr.cast()) };
}
