//! Workload and inspection harness for the allocgate router.
//!
//! Drives the router with synthetic allocation workloads and emits
//! machine-readable JSON reports: counter snapshots, routing decisions, and
//! registry state. The CLI entry point lives in `bin/harness.rs`.

pub mod report;
pub mod workload;

use thiserror::Error;

/// Harness-level failures.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Memory system lifecycle failed.
    #[error("memory system error: {0}")]
    System(#[from] allocgate_core::SystemError),

    /// Report serialization failed.
    #[error("report serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A worker thread panicked mid-workload.
    #[error("workload thread panicked")]
    WorkerPanic,

    /// The probe allocation was refused.
    #[error("probe allocation of {size} bytes at alignment {align} failed")]
    ProbeFailed {
        /// Requested size.
        size: usize,
        /// Requested alignment.
        align: usize,
    },
}
