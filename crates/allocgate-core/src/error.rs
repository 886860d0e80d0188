//! Error types for the memory-system lifecycle seam.
//!
//! The router hot paths themselves stay pointer-based (null means failure,
//! mirroring the allocator contract); `Result` only appears where callers can
//! meaningfully react, namely init/shutdown and configuration.

use thiserror::Error;

/// Lifecycle and configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SystemError {
    /// `init` was called while the system was already initialized.
    #[error("memory system is already initialized")]
    AlreadyInitialized,

    /// `shutdown` was called before `init`.
    #[error("memory system is not initialized")]
    NotInitialized,

    /// `shutdown` was called while routed allocations were still live.
    #[error("{count} routed allocations are still live")]
    LiveAllocations {
        /// Number of non-fallback records still tracked.
        count: usize,
    },

    /// Configuration can only change before `init`.
    #[error("router configuration is locked while the memory system is initialized")]
    ConfigLocked,
}
