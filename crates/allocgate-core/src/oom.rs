//! Out-of-memory policy.
//!
//! Every failed allocation funnels through here. The check itself only runs
//! diagnostics and returns; the caller's contract then decides between a null
//! result (non-throwing callers) and process termination (throwing callers,
//! for whom control must never return).

use std::process;
use std::ptr;

use crate::diag::{self, WarnKind};

/// Runs OOM diagnostics for a failed allocation. Never terminates.
pub fn check_on_failure(size: usize, alignment: usize, context: &'static str) {
    diag::warn(WarnKind::OutOfMemory, size, alignment);
    if diag::stderr_mirror_enabled() {
        eprintln!("[allocgate] allocation failure context: {context}");
    }
}

/// Resolves a failed allocation according to the caller's contract.
///
/// Non-throwing callers get a null pointer back. For throwing-contract
/// callers the failure is fatal: diagnostics run, then the process aborts and
/// control never returns.
#[must_use]
pub fn fail_allocation(
    size: usize,
    alignment: usize,
    nothrow: bool,
    context: &'static str,
) -> *mut u8 {
    check_on_failure(size, alignment, context);
    if nothrow {
        return ptr::null_mut();
    }
    eprintln!("[allocgate] fatal: allocation failed ({context}): size={size} align={alignment}");
    process::abort();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothrow_failure_returns_null_after_diagnostics() {
        let before = diag::warn_count(WarnKind::OutOfMemory);
        let ptr = fail_allocation(1024, 16, true, "unit test");
        assert!(ptr.is_null());
        assert!(diag::warn_count(WarnKind::OutOfMemory) >= before + 1);
    }
}
