//! `GlobalAlloc` adapter.
//!
//! Installs the router as the process-wide allocator:
//!
//! ```rust,ignore
//! use allocgate_core::global::RoutedAlloc;
//!
//! #[global_allocator]
//! static GLOBAL: RoutedAlloc = RoutedAlloc;
//! ```
//!
//! `GlobalAlloc` is a non-throwing contract, so every path maps to the
//! null-on-failure form of the router. Deallocation passes the layout through
//! as size/alignment hints; the allocation record still decides how the block
//! is actually released.

use std::alloc::{GlobalAlloc, Layout};
use std::ptr;

use crate::router::{allocate_routed, deallocate_routed};

/// Zero-sized adapter between `GlobalAlloc` and the router.
pub struct RoutedAlloc;

unsafe impl GlobalAlloc for RoutedAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        allocate_routed(layout.size(), layout.align(), true, "global alloc")
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = allocate_routed(layout.size(), layout.align(), true, "global alloc_zeroed");
        if !ptr.is_null() {
            // SAFETY: ptr points to at least layout.size() bytes (a zero
            // size was normalized to one, which we may also zero).
            unsafe { ptr::write_bytes(ptr, 0, layout.size().max(1)) };
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        deallocate_routed(ptr, layout.size(), layout.align());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = allocate_routed(new_size, layout.align(), true, "global realloc");
        if new_ptr.is_null() {
            return ptr::null_mut();
        }
        let copy_len = layout.size().min(new_size);
        // SAFETY: both blocks are valid for copy_len bytes and cannot
        // overlap, the new block being freshly allocated.
        unsafe { ptr::copy_nonoverlapping(ptr, new_ptr, copy_len) };
        deallocate_routed(ptr, layout.size(), layout.align());
        new_ptr
    }
}
