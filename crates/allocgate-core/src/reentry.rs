//! Per-thread reentry detection for the router.
//!
//! Each direction (allocation, deallocation) has its own thread-local flag so
//! that an allocation performed while inside a deallocation is still treated
//! as a primary allocation. The flags are const-initialized `Cell`s: reading
//! or writing them never allocates, which matters because this code runs
//! inside the allocator itself.

use std::cell::Cell;
use std::thread::LocalKey;

thread_local! {
    static ALLOC_ENTERED: Cell<bool> = const { Cell::new(false) };
    static DEALLOC_ENTERED: Cell<bool> = const { Cell::new(false) };
}

/// Which router entry point the guard protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Allocation path.
    Alloc,
    /// Deallocation path.
    Dealloc,
}

impl Side {
    fn flag(self) -> &'static LocalKey<Cell<bool>> {
        match self {
            Side::Alloc => &ALLOC_ENTERED,
            Side::Dealloc => &DEALLOC_ENTERED,
        }
    }
}

/// Scoped marker for "this thread is inside the router".
///
/// The outermost guard on a thread is primary and owns the flag: it sets it
/// on entry and clears it on drop, no matter how the scope exits. Nested
/// guards observe the flag already set and leave it untouched.
pub struct ReentryGuard {
    side: Side,
    primary: bool,
}

impl ReentryGuard {
    /// Enters the router on the given side.
    ///
    /// If thread-local storage is already torn down (thread exit), the call
    /// is classified nested so the caller stays on the fallback path.
    #[must_use]
    pub fn enter(side: Side) -> Self {
        let primary = side
            .flag()
            .try_with(|flag| {
                if flag.get() {
                    false
                } else {
                    flag.set(true);
                    true
                }
            })
            .unwrap_or(false);
        Self { side, primary }
    }

    /// True for the outermost call on this thread.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.primary
    }
}

impl Drop for ReentryGuard {
    fn drop(&mut self) {
        if self.primary {
            let _ = self.side.flag().try_with(|flag| flag.set(false));
        }
    }
}
