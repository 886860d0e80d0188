//! Synthetic workloads driven through the router.

use std::thread;
use std::time::Instant;

use allocgate_core::{entry, normalize_alignment, registry, stats, system};

use crate::HarnessError;
use crate::report::{ChurnReport, ProbePath, ProbeReport};

fn ensure_init() -> Result<(), HarnessError> {
    match system::init() {
        Ok(()) | Err(allocgate_core::SystemError::AlreadyInitialized) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Runs a mixed allocate/free workload across `threads` workers and reports
/// the resulting counters and registry state.
pub fn churn(threads: usize, iterations: usize, max_size: usize) -> Result<ChurnReport, HarnessError> {
    ensure_init()?;
    stats::reset();

    let max_size = max_size.max(1);
    let started = Instant::now();

    let mut workers = Vec::new();
    for seed in 0..threads {
        workers.push(thread::spawn(move || {
            let mut state = (seed as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
            for _ in 0..iterations {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let size = 1 + (state as usize % max_size);
                let align = 1usize << ((state >> 59) as u32 % 8);
                let Some(ptr) = entry::try_allocate_aligned(size, align) else {
                    continue;
                };
                entry::release_sized_aligned(ptr.as_ptr(), size, align);
            }
        }));
    }
    for worker in workers {
        worker.join().map_err(|_| HarnessError::WorkerPanic)?;
    }

    Ok(ChurnReport {
        threads,
        iterations,
        max_size,
        duration_ms: started.elapsed().as_millis(),
        live_records: registry::live_count(),
        stats: stats::snapshot().into(),
    })
}

/// Performs a single routed allocation and reports which path serviced it.
pub fn probe(size: usize, align: usize) -> Result<ProbeReport, HarnessError> {
    ensure_init()?;

    let before = stats::snapshot();
    let ptr = entry::try_allocate_aligned(size, align)
        .ok_or(HarnessError::ProbeFailed { size, align })?;
    let after = stats::snapshot();

    let path = if after.small_routed > before.small_routed {
        ProbePath::Small
    } else if after.default_routed > before.default_routed {
        ProbePath::Default
    } else {
        ProbePath::Fallback
    };

    let normalized = normalize_alignment(align);
    let address = ptr.as_ptr() as usize;
    let report = ProbeReport {
        size,
        requested_align: align,
        normalized_align: normalized,
        address: format!("{address:#x}"),
        alignment_ok: address % normalized == 0,
        path,
    };

    entry::release_aligned(ptr.as_ptr(), align);
    Ok(report)
}
