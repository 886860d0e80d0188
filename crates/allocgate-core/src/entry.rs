//! Typed allocation entry points.
//!
//! The full variant table the router is reached through: scalar and array
//! forms, implicit and explicit alignment, fatal and non-throwing contracts,
//! and the release variants with optional size/alignment hints. Array
//! variants pre-compute the byte count and treat overflow as an allocation
//! failure under the caller's contract.

use std::ptr::NonNull;

use crate::oom;
use crate::router::{allocate_routed, deallocate_routed};

fn expect_non_null(ptr: *mut u8) -> NonNull<u8> {
    match NonNull::new(ptr) {
        Some(ptr) => ptr,
        // Fatal-contract allocations never return null; the router aborts
        // before handing one back.
        None => std::process::abort(),
    }
}

fn array_bytes(count: usize, elem_size: usize) -> Option<usize> {
    count.checked_mul(elem_size)
}

/// Scalar allocation at default alignment. Failure is fatal.
#[must_use]
pub fn allocate(size: usize) -> NonNull<u8> {
    expect_non_null(allocate_routed(size, 0, false, "allocate"))
}

/// Scalar allocation at default alignment. Returns `None` on failure.
#[must_use]
pub fn try_allocate(size: usize) -> Option<NonNull<u8>> {
    NonNull::new(allocate_routed(size, 0, true, "try_allocate"))
}

/// Scalar allocation at an explicit alignment. Failure is fatal.
#[must_use]
pub fn allocate_aligned(size: usize, alignment: usize) -> NonNull<u8> {
    expect_non_null(allocate_routed(size, alignment, false, "allocate_aligned"))
}

/// Scalar allocation at an explicit alignment. Returns `None` on failure.
#[must_use]
pub fn try_allocate_aligned(size: usize, alignment: usize) -> Option<NonNull<u8>> {
    NonNull::new(allocate_routed(size, alignment, true, "try_allocate_aligned"))
}

/// Array allocation at default alignment. Byte-count overflow and exhaustion
/// are both fatal.
#[must_use]
pub fn allocate_array(count: usize, elem_size: usize) -> NonNull<u8> {
    let Some(bytes) = array_bytes(count, elem_size) else {
        oom::check_on_failure(count, elem_size, "allocate_array overflow");
        std::process::abort();
    };
    expect_non_null(allocate_routed(bytes, 0, false, "allocate_array"))
}

/// Array allocation at default alignment. Returns `None` on overflow or
/// failure.
#[must_use]
pub fn try_allocate_array(count: usize, elem_size: usize) -> Option<NonNull<u8>> {
    let bytes = array_bytes(count, elem_size)?;
    NonNull::new(allocate_routed(bytes, 0, true, "try_allocate_array"))
}

/// Array allocation at an explicit alignment. Failure is fatal.
#[must_use]
pub fn allocate_array_aligned(count: usize, elem_size: usize, alignment: usize) -> NonNull<u8> {
    let Some(bytes) = array_bytes(count, elem_size) else {
        oom::check_on_failure(count, elem_size, "allocate_array_aligned overflow");
        std::process::abort();
    };
    expect_non_null(allocate_routed(
        bytes,
        alignment,
        false,
        "allocate_array_aligned",
    ))
}

/// Array allocation at an explicit alignment. Returns `None` on overflow or
/// failure.
#[must_use]
pub fn try_allocate_array_aligned(
    count: usize,
    elem_size: usize,
    alignment: usize,
) -> Option<NonNull<u8>> {
    let bytes = array_bytes(count, elem_size)?;
    NonNull::new(allocate_routed(
        bytes,
        alignment,
        true,
        "try_allocate_array_aligned",
    ))
}

/// Release with no hints.
pub fn release(ptr: *mut u8) {
    deallocate_routed(ptr, 0, 0);
}

/// Release with a size hint.
pub fn release_sized(ptr: *mut u8, size: usize) {
    deallocate_routed(ptr, size, 0);
}

/// Release with an alignment hint.
pub fn release_aligned(ptr: *mut u8, alignment: usize) {
    deallocate_routed(ptr, 0, alignment);
}

/// Release with both hints.
pub fn release_sized_aligned(ptr: *mut u8, size: usize, alignment: usize) {
    deallocate_routed(ptr, size, alignment);
}
