//! Router configuration.
//!
//! All knobs have compile-time defaults and a pre-init override window:
//! once the memory system is initialized the configuration is locked, so the
//! routing decision never changes under live allocations. Values are read
//! through relaxed atomics on the hot path.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use crate::diag;
use crate::error::SystemError;
use crate::system;

/// Default small-object threshold in bytes.
pub const DEFAULT_SMALL_OBJECT_THRESHOLD: i64 = 256;

/// Alignment ceiling for the small-object heuristic. Requests above this
/// alignment never route to the small-object strategy, which is not
/// guaranteed to honor larger alignments.
pub const SMALL_ALIGN_CEILING: usize = 16;

static SMALL_OBJECT_THRESHOLD: AtomicI64 = AtomicI64::new(DEFAULT_SMALL_OBJECT_THRESHOLD);
static FALLBACK_BEFORE_INIT: AtomicBool = AtomicBool::new(true);

/// Router configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Requests of at most this many bytes prefer the small-object strategy.
    /// Zero or negative disables the heuristic entirely.
    pub small_object_threshold: i64,
    /// When true, allocations before `init` are serviced by the libc
    /// fallback (with a one-time warning). When false, pre-init allocation
    /// is a contract violation.
    pub fallback_before_init: bool,
    /// Mirror diagnostic records to stderr as they are recorded.
    pub mirror_warnings_to_stderr: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            small_object_threshold: DEFAULT_SMALL_OBJECT_THRESHOLD,
            fallback_before_init: true,
            mirror_warnings_to_stderr: false,
        }
    }
}

/// Applies a configuration. Fails with [`SystemError::ConfigLocked`] once the
/// memory system is initialized.
pub fn set(config: RouterConfig) -> Result<(), SystemError> {
    if system::is_initialized() {
        return Err(SystemError::ConfigLocked);
    }
    SMALL_OBJECT_THRESHOLD.store(config.small_object_threshold, Ordering::Relaxed);
    FALLBACK_BEFORE_INIT.store(config.fallback_before_init, Ordering::Relaxed);
    diag::set_stderr_mirror(config.mirror_warnings_to_stderr);
    Ok(())
}

/// Current small-object threshold.
#[must_use]
pub fn small_object_threshold() -> i64 {
    SMALL_OBJECT_THRESHOLD.load(Ordering::Relaxed)
}

/// Whether pre-init allocations may use the libc fallback.
#[must_use]
pub fn fallback_before_init() -> bool {
    FALLBACK_BEFORE_INIT.load(Ordering::Relaxed)
}
