//! Pre-init behavior with the libc fallback enabled (the default): an
//! allocation issued before `init` succeeds through the fallback path, emits
//! the one-time warning, and remains freeable after the system comes up.
//!
//! Ordering matters here, so this binary holds a single test.

use allocgate_core::diag::{self, WarnKind};
use allocgate_core::{entry, registry, stats, system};

#[test]
fn preinit_allocation_falls_back_then_system_takes_over() {
    assert!(!system::is_initialized());

    let early_a = entry::try_allocate_aligned(64, 32).expect("pre-init allocation");
    let early_b = entry::try_allocate(16).expect("pre-init allocation");
    assert_eq!(early_a.as_ptr() as usize % 32, 0);

    // Both allocations were serviced by the fallback and tracked.
    assert!(registry::is_tracked(early_a.as_ptr() as usize));
    assert!(registry::is_tracked(early_b.as_ptr() as usize));
    let snapshot = stats::snapshot();
    assert_eq!(snapshot.fallback_allocations, 2);

    // Exactly one warning for any number of pre-init allocations.
    assert_eq!(diag::warn_count(WarnKind::FallbackBeforeInit), 1);

    system::init().expect("init");

    // Routed allocations now bypass the fallback.
    let routed = entry::try_allocate(64).expect("routed allocation");
    assert_eq!(stats::snapshot().fallback_allocations, 2);
    entry::release(routed.as_ptr());

    // Fallback allocations made before init free correctly afterwards.
    entry::release_aligned(early_a.as_ptr(), 32);
    entry::release(early_b.as_ptr());
    assert!(!registry::is_tracked(early_a.as_ptr() as usize));
    assert_eq!(diag::warn_count(WarnKind::UntrackedFree), 0);

    // With every routed record drained, shutdown succeeds and pre-init
    // contract checks apply again.
    system::shutdown().expect("shutdown");
    assert!(!system::is_initialized());
}
