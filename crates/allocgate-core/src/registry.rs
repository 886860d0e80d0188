//! Allocation registry: one record per live routed pointer.
//!
//! A singly linked list with head insertion, guarded by a single
//! `std::sync::Mutex`. Two properties matter more than throughput here:
//!
//! - Nodes are carved directly out of `libc::malloc`, so bookkeeping never
//!   allocates through the router it serves.
//! - `std::sync::Mutex` is futex-based on the platforms we care about and
//!   does not allocate to lock, so taking the registry lock cannot itself
//!   re-enter the router.
//!
//! The list deliberately stays simple; a sharded map keyed by address would
//! scale better but is not needed for correctness.

use std::mem;
use std::ptr;
use std::sync::{Mutex, MutexGuard};

use crate::strategy::AllocatorRef;

/// Metadata needed to reverse one allocation decision at free time.
#[derive(Clone, Copy)]
pub struct AllocationRecord {
    /// Address returned to the caller.
    pub pointer: usize,
    /// Raw base storage; only meaningful when `used_fallback` is set.
    pub fallback_storage: usize,
    /// Handle that serviced the request; the null handle for fallback.
    pub allocator: AllocatorRef,
    /// Requested size (after zero-size normalization).
    pub size: usize,
    /// Normalized alignment.
    pub alignment: usize,
    /// True when the emergency fallback path produced the pointer.
    pub used_fallback: bool,
    next: *mut AllocationRecord,
}

/// List head; the raw pointer is only touched under the registry mutex.
struct Head(*mut AllocationRecord);

// SAFETY: Head is only ever accessed through the Mutex below, and the nodes
// it points to contain no thread-affine state (AllocatorRef targets are Sync).
unsafe impl Send for Head {}

static REGISTRY: Mutex<Head> = Mutex::new(Head(ptr::null_mut()));

fn head() -> MutexGuard<'static, Head> {
    match REGISTRY.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Registers a freshly allocated pointer.
///
/// Returns false when the bookkeeping node itself cannot be allocated; the
/// caller must then undo the original allocation so nothing leaks.
#[must_use]
pub fn register(
    pointer: usize,
    allocator: AllocatorRef,
    size: usize,
    alignment: usize,
    used_fallback: bool,
    fallback_storage: usize,
) -> bool {
    // SAFETY: allocating and initializing one node; malloc alignment is
    // sufficient for AllocationRecord.
    let node = unsafe { libc::malloc(mem::size_of::<AllocationRecord>()) }
        .cast::<AllocationRecord>();
    if node.is_null() {
        return false;
    }
    // SAFETY: node is non-null, properly sized, and not yet shared.
    unsafe {
        node.write(AllocationRecord {
            pointer,
            fallback_storage,
            allocator,
            size,
            alignment,
            used_fallback,
            next: ptr::null_mut(),
        });
    }

    let mut guard = head();
    // SAFETY: node is owned here; the list is protected by the lock.
    unsafe {
        (*node).next = guard.0;
    }
    guard.0 = node;
    true
}

/// Removes and returns the record for `pointer`.
///
/// Returns `None` when the pointer was never tracked (double free, foreign
/// pointer, or an allocation predating routing). The bookkeeping node is
/// destroyed before returning; the record comes back by value.
#[must_use]
pub fn unregister(pointer: usize) -> Option<AllocationRecord> {
    let mut guard = head();
    let mut previous: *mut AllocationRecord = ptr::null_mut();
    let mut current = guard.0;
    // SAFETY: every node in the list was written by register and is only
    // traversed under the lock.
    unsafe {
        while !current.is_null() {
            if (*current).pointer == pointer {
                if previous.is_null() {
                    guard.0 = (*current).next;
                } else {
                    (*previous).next = (*current).next;
                }
                drop(guard);
                let record = current.read();
                libc::free(current.cast());
                return Some(record);
            }
            previous = current;
            current = (*current).next;
        }
    }
    None
}

/// True when a record exists for `pointer`.
#[must_use]
pub fn is_tracked(pointer: usize) -> bool {
    let guard = head();
    let mut current = guard.0;
    // SAFETY: traversal under the lock.
    unsafe {
        while !current.is_null() {
            if (*current).pointer == pointer {
                return true;
            }
            current = (*current).next;
        }
    }
    false
}

/// Number of live records.
#[must_use]
pub fn live_count() -> usize {
    count_if(|_| true)
}

/// Number of live records serviced by a strategy (i.e. excluding fallback
/// allocations, which may legitimately outlive the memory system).
#[must_use]
pub fn live_routed_count() -> usize {
    count_if(|record| !record.used_fallback)
}

fn count_if(predicate: impl Fn(&AllocationRecord) -> bool) -> usize {
    let guard = head();
    let mut current = guard.0;
    let mut count = 0;
    // SAFETY: traversal under the lock.
    unsafe {
        while !current.is_null() {
            if predicate(&*current) {
                count += 1;
            }
            current = (*current).next;
        }
    }
    count
}
