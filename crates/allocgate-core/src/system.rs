//! Memory system lifecycle.
//!
//! The process-wide object that owns the strategy instances and hands out
//! handles to the router. The initialized flag is a plain atomic because it
//! is read on every single allocation; the mutex only guards the handle table
//! during init and shutdown.
//!
//! Teardown ordering is the surrounding runtime's responsibility: `shutdown`
//! refuses to proceed while strategy-serviced allocations are still tracked,
//! but fallback allocations may legitimately outlive the system (they were
//! made before it existed).

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::SystemError;
use crate::registry;
use crate::strategy::{AllocStrategy, AllocatorRef, LibcHeapStrategy, SmallObjectStrategy};

static LIBC_HEAP: LibcHeapStrategy = LibcHeapStrategy::new();
static SMALL_OBJECTS: SmallObjectStrategy = SmallObjectStrategy::new();

static INITIALIZED: AtomicBool = AtomicBool::new(false);

struct Handles {
    default_alloc: AllocatorRef,
    small_alloc: AllocatorRef,
}

static HANDLES: Mutex<Handles> = Mutex::new(Handles {
    default_alloc: AllocatorRef::null(),
    small_alloc: AllocatorRef::null(),
});

/// Initializes the memory system with the builtin strategies.
pub fn init() -> Result<(), SystemError> {
    init_with(&LIBC_HEAP, &SMALL_OBJECTS)
}

/// Initializes the memory system with externally supplied strategies.
///
/// The strategies must outlive every allocation they service, hence the
/// `'static` bound; embedders typically leak a boxed instance.
pub fn init_with(
    default_alloc: &'static dyn AllocStrategy,
    small_alloc: &'static dyn AllocStrategy,
) -> Result<(), SystemError> {
    let mut handles = HANDLES.lock();
    if INITIALIZED.load(Ordering::Acquire) {
        return Err(SystemError::AlreadyInitialized);
    }
    handles.default_alloc = AllocatorRef::new(default_alloc);
    handles.small_alloc = AllocatorRef::new(small_alloc);
    INITIALIZED.store(true, Ordering::Release);
    Ok(())
}

/// Shuts the memory system down.
///
/// Fails while strategy-serviced allocations are still live; the registry
/// must be drained of routed records first.
pub fn shutdown() -> Result<(), SystemError> {
    let mut handles = HANDLES.lock();
    if !INITIALIZED.load(Ordering::Acquire) {
        return Err(SystemError::NotInitialized);
    }
    let live = registry::live_routed_count();
    if live != 0 {
        return Err(SystemError::LiveAllocations { count: live });
    }
    INITIALIZED.store(false, Ordering::Release);
    handles.default_alloc = AllocatorRef::default();
    handles.small_alloc = AllocatorRef::default();
    Ok(())
}

/// True once `init` has completed and `shutdown` has not.
#[must_use]
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// Handle to the default strategy; the null handle before init.
#[must_use]
pub fn default_allocator() -> AllocatorRef {
    HANDLES.lock().default_alloc
}

/// Handle to the small-object strategy; the null handle before init.
#[must_use]
pub fn small_object_allocator() -> AllocatorRef {
    HANDLES.lock().small_alloc
}

/// The builtin default strategy, for counter inspection.
#[must_use]
pub fn builtin_default() -> &'static LibcHeapStrategy {
    &LIBC_HEAP
}

/// The builtin small-object strategy, for counter inspection.
#[must_use]
pub fn builtin_small() -> &'static SmallObjectStrategy {
    &SMALL_OBJECTS
}
