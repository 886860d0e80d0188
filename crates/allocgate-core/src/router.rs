//! Global allocation router.
//!
//! The single choke point between allocation requests and the strategy
//! layer. Every call is classified by the per-thread reentry guard:
//!
//! - **Nested** calls (we are already inside the router on this thread, so
//!   some allocator internals are allocating) never touch the strategy layer;
//!   they are serviced by the libc fallback and still registered so the
//!   matching free is symmetric.
//! - **Primary** calls before [`crate::system::init`] either use the fallback
//!   (one-time warning) or are rejected as a contract violation, per
//!   [`crate::config`].
//! - **Primary** calls on an initialized system pick the small-object or
//!   default strategy via [`should_use_small`], register the result, and
//!   return it.
//!
//! The registry mutex is never held across a strategy call; the router locks
//! only while mutating its own bookkeeping.

use crate::align::{is_power_of_two, normalize_alignment};
use crate::config::{self, SMALL_ALIGN_CEILING};
use crate::diag::{self, WarnKind};
use crate::fallback;
use crate::oom;
use crate::reentry::{ReentryGuard, Side};
use crate::registry;
use crate::stats;
use crate::strategy::AllocatorRef;
use crate::system;

/// Context string used when the bookkeeping node itself cannot be allocated.
const METADATA_CONTEXT: &str = "allocation record";

/// Decides whether a request should route to the small-object strategy.
///
/// Pure function: false when the threshold is disabled (<= 0), when `size`
/// exceeds the threshold, or when `alignment` exceeds the fixed ceiling the
/// small-object strategy is guaranteed to honor.
#[must_use]
pub fn should_use_small(size: usize, alignment: usize, threshold: i64) -> bool {
    if threshold <= 0 {
        return false;
    }
    #[allow(clippy::cast_sign_loss)]
    if size > threshold as usize {
        return false;
    }
    if alignment > SMALL_ALIGN_CEILING {
        return false;
    }
    true
}

/// Allocates `size` bytes at `alignment` through the router.
///
/// A zero `size` is normalized to one so every allocation yields a distinct,
/// freeable address; `alignment` is normalized to a power of two at least
/// the platform minimum. With `nothrow` set, failure returns null; otherwise
/// failure is fatal and control never returns. `context` feeds diagnostics
/// only.
#[must_use]
pub fn allocate_routed(
    size: usize,
    alignment: usize,
    nothrow: bool,
    context: &'static str,
) -> *mut u8 {
    let guard = ReentryGuard::enter(Side::Alloc);

    let size = if size == 0 { 1 } else { size };
    let alignment = normalize_alignment(alignment);
    debug_assert!(is_power_of_two(alignment));

    if !guard.is_primary() {
        // Already inside allocator machinery on this thread; recursing into
        // the strategy layer could loop forever.
        stats::record_reentrant_allocation();
        return allocate_via_fallback(size, alignment, nothrow, context);
    }

    if !system::is_initialized() {
        if config::fallback_before_init() {
            diag::warn_fallback_once();
            return allocate_via_fallback(size, alignment, nothrow, context);
        }
        diag::warn(WarnKind::PreInitContractViolation, size, alignment);
        return oom::fail_allocation(size, alignment, nothrow, context);
    }

    let use_small = should_use_small(size, alignment, config::small_object_threshold());
    let mut allocator = if use_small {
        system::small_object_allocator()
    } else {
        system::default_allocator()
    };
    if !allocator.is_valid() {
        allocator = system::default_allocator();
    }

    let ptr = allocator.allocate_bytes(size, alignment);
    if ptr.is_null() {
        stats::record_failed_allocation();
        return oom::fail_allocation(size, alignment, nothrow, context);
    }

    if !registry::register(ptr as usize, allocator, size, alignment, false, 0) {
        // The bookkeeping node could not be created; unwind the allocation
        // so nothing leaks, then report the failure as the caller's.
        allocator.deallocate_bytes(ptr, size, alignment);
        stats::record_failed_allocation();
        return oom::fail_allocation(size, alignment, nothrow, METADATA_CONTEXT);
    }

    stats::record_routed(use_small);
    ptr
}

fn allocate_via_fallback(
    size: usize,
    alignment: usize,
    nothrow: bool,
    context: &'static str,
) -> *mut u8 {
    let Some(block) = fallback::allocate_fallback(size, alignment) else {
        stats::record_failed_allocation();
        return oom::fail_allocation(size, alignment, nothrow, context);
    };

    if !registry::register(
        block.ptr as usize,
        AllocatorRef::default(),
        size,
        alignment,
        true,
        block.storage as usize,
    ) {
        fallback::free_fallback(block.storage);
        stats::record_failed_allocation();
        return oom::fail_allocation(size, alignment, nothrow, METADATA_CONTEXT);
    }

    stats::record_fallback_allocation();
    block.ptr
}

/// Releases a pointer previously returned by [`allocate_routed`].
///
/// Null is a no-op. `size_hint` and `align_hint` come from sized/aligned
/// release variants; zero means "no hint". Hints are advisory: mismatches
/// against the record are reported but the recorded metadata always decides
/// how the block is released.
pub fn deallocate_routed(ptr: *mut u8, size_hint: usize, align_hint: usize) {
    if ptr.is_null() {
        return;
    }

    let guard = ReentryGuard::enter(Side::Dealloc);
    if !guard.is_primary() {
        // A nested allocation always used the fallback path, whose storage
        // is ordinary libc heap storage; release it the same way.
        fallback::free_raw(ptr);
        return;
    }

    let Some(record) = registry::unregister(ptr as usize) else {
        // Double free or a foreign pointer the router never tracked. Signal
        // it, then release best-effort so nothing leaks from this path.
        diag::warn(WarnKind::UntrackedFree, ptr as usize, 0);
        stats::record_untracked_free();
        fallback::free_raw(ptr);
        return;
    };

    if size_hint != 0 && size_hint != record.size {
        diag::warn(WarnKind::SizeHintMismatch, size_hint, record.size);
        stats::record_hint_mismatch();
    }
    if align_hint != 0 {
        let normalized = normalize_alignment(align_hint);
        if normalized != record.alignment {
            diag::warn(WarnKind::AlignHintMismatch, normalized, record.alignment);
            stats::record_hint_mismatch();
        }
    }

    if record.used_fallback {
        fallback::free_fallback(record.fallback_storage as *mut u8);
    } else {
        record
            .allocator
            .deallocate_bytes(ptr, record.size, record.alignment);
    }
    stats::record_free();
}
