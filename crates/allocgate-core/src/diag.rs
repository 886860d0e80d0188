//! Structured diagnostics for the router.
//!
//! Warnings are recorded as fixed-size structured records (kind plus two
//! numeric operands) in a bounded ring, with per-kind atomic counters on the
//! side. Recording a warning never allocates, so diagnostics are safe to emit
//! from any point inside the allocation paths. An optional stderr mirror
//! prints one line per record for interactive debugging.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Diagnostic categories emitted by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarnKind {
    /// Allocation routed through the libc fallback before init (emitted once).
    FallbackBeforeInit,
    /// Pre-init allocation observed while the fallback is disabled.
    PreInitContractViolation,
    /// Free of a pointer with no allocation record (double free or foreign
    /// pointer).
    UntrackedFree,
    /// Sized release whose hint disagrees with the recorded size.
    SizeHintMismatch,
    /// Aligned release whose hint disagrees with the recorded alignment.
    AlignHintMismatch,
    /// An allocation attempt failed.
    OutOfMemory,
}

/// Number of [`WarnKind`] variants.
pub const WARN_KIND_COUNT: usize = 6;

impl WarnKind {
    const fn index(self) -> usize {
        match self {
            WarnKind::FallbackBeforeInit => 0,
            WarnKind::PreInitContractViolation => 1,
            WarnKind::UntrackedFree => 2,
            WarnKind::SizeHintMismatch => 3,
            WarnKind::AlignHintMismatch => 4,
            WarnKind::OutOfMemory => 5,
        }
    }

    /// Stable label used by the stderr mirror and the harness report.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            WarnKind::FallbackBeforeInit => "fallback_before_init",
            WarnKind::PreInitContractViolation => "preinit_contract_violation",
            WarnKind::UntrackedFree => "untracked_free",
            WarnKind::SizeHintMismatch => "size_hint_mismatch",
            WarnKind::AlignHintMismatch => "align_hint_mismatch",
            WarnKind::OutOfMemory => "out_of_memory",
        }
    }
}

/// One recorded warning. The operands are kind-specific (hint vs recorded
/// value for mismatches, size and alignment for allocation events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagRecord {
    /// Category.
    pub kind: WarnKind,
    /// First operand.
    pub a: usize,
    /// Second operand.
    pub b: usize,
}

/// Ring capacity; older records are overwritten once full.
const RING_CAPACITY: usize = 64;

struct Ring {
    records: [Option<DiagRecord>; RING_CAPACITY],
    next: usize,
}

impl Ring {
    const fn new() -> Self {
        Self {
            records: [None; RING_CAPACITY],
            next: 0,
        }
    }

    fn push(&mut self, record: DiagRecord) {
        self.records[self.next] = Some(record);
        self.next = (self.next + 1) % RING_CAPACITY;
    }

    fn drain(&mut self) -> Vec<DiagRecord> {
        let mut out = Vec::new();
        for offset in 0..RING_CAPACITY {
            let slot = (self.next + offset) % RING_CAPACITY;
            if let Some(record) = self.records[slot].take() {
                out.push(record);
            }
        }
        self.next = 0;
        out
    }
}

static RING: Mutex<Ring> = Mutex::new(Ring::new());

static COUNTS: [AtomicU64; WARN_KIND_COUNT] = {
    const ZERO: AtomicU64 = AtomicU64::new(0);
    [ZERO; WARN_KIND_COUNT]
};

static STDERR_MIRROR: AtomicBool = AtomicBool::new(false);
static FALLBACK_WARNED: AtomicBool = AtomicBool::new(false);

fn ring() -> std::sync::MutexGuard<'static, Ring> {
    match RING.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Records a warning.
pub fn warn(kind: WarnKind, a: usize, b: usize) {
    COUNTS[kind.index()].fetch_add(1, Ordering::Relaxed);
    ring().push(DiagRecord { kind, a, b });
    if STDERR_MIRROR.load(Ordering::Relaxed) {
        eprintln!("[allocgate] {}: a={a} b={b}", kind.label());
    }
}

/// Emits the one-time "routing through libc until init" warning.
///
/// Exactly one thread wins the first emission; all others observe the flag
/// already set and return without recording anything.
pub fn warn_fallback_once() {
    if FALLBACK_WARNED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
    {
        warn(WarnKind::FallbackBeforeInit, 0, 0);
    }
}

/// Enables or disables the stderr mirror.
pub fn set_stderr_mirror(enabled: bool) {
    STDERR_MIRROR.store(enabled, Ordering::Relaxed);
}

/// True when records are being mirrored to stderr.
#[must_use]
pub fn stderr_mirror_enabled() -> bool {
    STDERR_MIRROR.load(Ordering::Relaxed)
}

/// Total warnings recorded for a kind since process start (or [`reset`]).
#[must_use]
pub fn warn_count(kind: WarnKind) -> u64 {
    COUNTS[kind.index()].load(Ordering::Relaxed)
}

/// Drains and returns the buffered records, oldest first.
#[must_use]
pub fn take_records() -> Vec<DiagRecord> {
    ring().drain()
}

/// Clears counters, buffered records, and the one-time fallback flag.
///
/// Intended for tests and the harness between scenarios.
pub fn reset() {
    for count in &COUNTS {
        count.store(0, Ordering::Relaxed);
    }
    let _ = ring().drain();
    FALLBACK_WARNED.store(false, Ordering::Relaxed);
}
