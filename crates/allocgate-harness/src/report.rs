//! JSON report types.

use serde::Serialize;

use allocgate_core::StatsSnapshot;

/// Serializable copy of the router counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatsReport {
    pub total_allocations: u64,
    pub total_frees: u64,
    pub small_routed: u64,
    pub default_routed: u64,
    pub fallback_allocations: u64,
    pub reentrant_allocations: u64,
    pub untracked_frees: u64,
    pub hint_mismatches: u64,
    pub failed_allocations: u64,
}

impl From<StatsSnapshot> for StatsReport {
    fn from(snapshot: StatsSnapshot) -> Self {
        Self {
            total_allocations: snapshot.total_allocations,
            total_frees: snapshot.total_frees,
            small_routed: snapshot.small_routed,
            default_routed: snapshot.default_routed,
            fallback_allocations: snapshot.fallback_allocations,
            reentrant_allocations: snapshot.reentrant_allocations,
            untracked_frees: snapshot.untracked_frees,
            hint_mismatches: snapshot.hint_mismatches,
            failed_allocations: snapshot.failed_allocations,
        }
    }
}

/// Output of the `churn` workload.
#[derive(Debug, Serialize)]
pub struct ChurnReport {
    /// Worker thread count.
    pub threads: usize,
    /// Allocate/free iterations per thread.
    pub iterations: usize,
    /// Largest request size in bytes.
    pub max_size: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u128,
    /// Registry records live after the workload (expected zero).
    pub live_records: usize,
    /// Router counters after the workload.
    pub stats: StatsReport,
}

/// Which path serviced the probe allocation.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbePath {
    Small,
    Default,
    Fallback,
}

/// Output of the `probe` command.
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    /// Requested size in bytes.
    pub size: usize,
    /// Requested alignment (0 means default).
    pub requested_align: usize,
    /// Alignment after normalization.
    pub normalized_align: usize,
    /// Returned address, hex.
    pub address: String,
    /// Whether the address satisfies the normalized alignment.
    pub alignment_ok: bool,
    /// Strategy path that serviced the request.
    pub path: ProbePath,
}
