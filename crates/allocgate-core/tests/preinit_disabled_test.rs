//! Pre-init behavior with the libc fallback disabled: allocation before
//! `init` is a contract violation and fails under the caller's contract.
//!
//! Ordering matters here, so this binary holds a single test.

use allocgate_core::diag::{self, WarnKind};
use allocgate_core::{RouterConfig, config, entry, system};

#[test]
fn preinit_allocation_is_a_contract_violation_when_fallback_disabled() {
    assert!(!system::is_initialized());
    config::set(RouterConfig {
        fallback_before_init: false,
        ..RouterConfig::default()
    })
    .expect("config before init");

    // Non-throwing contract: null result, no process damage.
    assert!(entry::try_allocate(64).is_none());
    assert!(entry::try_allocate_aligned(64, 32).is_none());
    assert_eq!(diag::warn_count(WarnKind::PreInitContractViolation), 2);
    assert_eq!(diag::warn_count(WarnKind::FallbackBeforeInit), 0);
    assert!(diag::warn_count(WarnKind::OutOfMemory) >= 2);

    // The same call works once the system is initialized.
    system::init().expect("init");
    assert_eq!(config::set(RouterConfig::default()), Err(allocgate_core::SystemError::ConfigLocked));
    let ptr = entry::try_allocate(64).expect("routed allocation");
    entry::release(ptr.as_ptr());
    system::shutdown().expect("shutdown");
}
