//! Router counters.
//!
//! Plain relaxed atomics bumped on the allocation and deallocation paths,
//! with a value-type snapshot for reporting. The harness serializes the
//! snapshot; tests assert on deltas.

use std::sync::atomic::{AtomicU64, Ordering};

struct Counters {
    total_allocations: AtomicU64,
    total_frees: AtomicU64,
    small_routed: AtomicU64,
    default_routed: AtomicU64,
    fallback_allocations: AtomicU64,
    reentrant_allocations: AtomicU64,
    untracked_frees: AtomicU64,
    hint_mismatches: AtomicU64,
    failed_allocations: AtomicU64,
}

static COUNTERS: Counters = Counters {
    total_allocations: AtomicU64::new(0),
    total_frees: AtomicU64::new(0),
    small_routed: AtomicU64::new(0),
    default_routed: AtomicU64::new(0),
    fallback_allocations: AtomicU64::new(0),
    reentrant_allocations: AtomicU64::new(0),
    untracked_frees: AtomicU64::new(0),
    hint_mismatches: AtomicU64::new(0),
    failed_allocations: AtomicU64::new(0),
};

/// Point-in-time copy of the router counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Successful allocations, all paths.
    pub total_allocations: u64,
    /// Completed frees of tracked pointers.
    pub total_frees: u64,
    /// Allocations routed to the small-object strategy.
    pub small_routed: u64,
    /// Allocations routed to the default strategy.
    pub default_routed: u64,
    /// Allocations serviced by the emergency fallback.
    pub fallback_allocations: u64,
    /// Allocations classified as reentrant.
    pub reentrant_allocations: u64,
    /// Frees of pointers with no allocation record.
    pub untracked_frees: u64,
    /// Size or alignment hints that disagreed with the record.
    pub hint_mismatches: u64,
    /// Allocation attempts that returned nothing.
    pub failed_allocations: u64,
}

/// Takes a snapshot of all counters.
#[must_use]
pub fn snapshot() -> StatsSnapshot {
    StatsSnapshot {
        total_allocations: COUNTERS.total_allocations.load(Ordering::Relaxed),
        total_frees: COUNTERS.total_frees.load(Ordering::Relaxed),
        small_routed: COUNTERS.small_routed.load(Ordering::Relaxed),
        default_routed: COUNTERS.default_routed.load(Ordering::Relaxed),
        fallback_allocations: COUNTERS.fallback_allocations.load(Ordering::Relaxed),
        reentrant_allocations: COUNTERS.reentrant_allocations.load(Ordering::Relaxed),
        untracked_frees: COUNTERS.untracked_frees.load(Ordering::Relaxed),
        hint_mismatches: COUNTERS.hint_mismatches.load(Ordering::Relaxed),
        failed_allocations: COUNTERS.failed_allocations.load(Ordering::Relaxed),
    }
}

/// Zeroes every counter. Tests and harness scenarios only.
pub fn reset() {
    COUNTERS.total_allocations.store(0, Ordering::Relaxed);
    COUNTERS.total_frees.store(0, Ordering::Relaxed);
    COUNTERS.small_routed.store(0, Ordering::Relaxed);
    COUNTERS.default_routed.store(0, Ordering::Relaxed);
    COUNTERS.fallback_allocations.store(0, Ordering::Relaxed);
    COUNTERS.reentrant_allocations.store(0, Ordering::Relaxed);
    COUNTERS.untracked_frees.store(0, Ordering::Relaxed);
    COUNTERS.hint_mismatches.store(0, Ordering::Relaxed);
    COUNTERS.failed_allocations.store(0, Ordering::Relaxed);
}

pub(crate) fn record_routed(used_small: bool) {
    COUNTERS.total_allocations.fetch_add(1, Ordering::Relaxed);
    if used_small {
        COUNTERS.small_routed.fetch_add(1, Ordering::Relaxed);
    } else {
        COUNTERS.default_routed.fetch_add(1, Ordering::Relaxed);
    }
}

pub(crate) fn record_fallback_allocation() {
    COUNTERS.total_allocations.fetch_add(1, Ordering::Relaxed);
    COUNTERS.fallback_allocations.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_reentrant_allocation() {
    COUNTERS.reentrant_allocations.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_free() {
    COUNTERS.total_frees.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_untracked_free() {
    COUNTERS.untracked_frees.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_hint_mismatch() {
    COUNTERS.hint_mismatches.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_failed_allocation() {
    COUNTERS.failed_allocations.fetch_add(1, Ordering::Relaxed);
}
