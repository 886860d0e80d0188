//! Allocation strategies and the type-erased handle the router uses to reach
//! them.
//!
//! A strategy is anything implementing the two-operation [`AllocStrategy`]
//! contract. The router holds strategies only through [`AllocatorRef`], a
//! `Copy` value type that never owns the strategy it references; strategy
//! lifetimes belong to the memory system (or to whoever leaked a `'static`
//! instance into [`crate::system::init_with`]).

#[allow(unsafe_code)]
mod libc_heap;
#[allow(unsafe_code)]
mod small;

pub use libc_heap::LibcHeapStrategy;
pub use small::SmallObjectStrategy;

/// Two-operation allocation contract.
///
/// Implementations must be `Sync`: the router calls them from arbitrary
/// threads without holding any of its own locks.
pub trait AllocStrategy: Sync {
    /// Short strategy name for diagnostics.
    fn name(&self) -> &'static str;

    /// Allocates `size` bytes at the given alignment. Returns null on
    /// failure. `align` is a power of two (the router normalizes first).
    fn allocate(&self, size: usize, align: usize) -> *mut u8;

    /// Releases a block previously returned by `allocate` with the exact
    /// same `size` and `align`.
    fn deallocate(&self, ptr: *mut u8, size: usize, align: usize);
}

/// Type-erased, non-owning reference to a strategy.
///
/// The default value is the null handle: "no allocator bound".
#[derive(Clone, Copy, Default)]
pub struct AllocatorRef {
    target: Option<&'static dyn AllocStrategy>,
}

impl AllocatorRef {
    /// Binds a handle to a strategy.
    #[must_use]
    pub fn new(target: &'static dyn AllocStrategy) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// The null handle: no allocator bound. Same as `default()`, usable in
    /// const contexts.
    #[must_use]
    pub const fn null() -> Self {
        Self { target: None }
    }

    /// Returns true when an allocator is bound.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.target.is_some()
    }

    /// Strategy name, or `"<unbound>"` for the null handle.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.target {
            Some(target) => target.name(),
            None => "<unbound>",
        }
    }

    /// Allocates through the bound strategy. Null when unbound or on
    /// strategy failure.
    #[must_use]
    pub fn allocate_bytes(&self, size: usize, align: usize) -> *mut u8 {
        match self.target {
            Some(target) => target.allocate(size, align),
            None => std::ptr::null_mut(),
        }
    }

    /// Deallocates through the bound strategy. No-op when unbound.
    pub fn deallocate_bytes(&self, ptr: *mut u8, size: usize, align: usize) {
        if let Some(target) = self.target {
            target.deallocate(ptr, size, align);
        }
    }

    /// Returns true when both handles reference the same strategy instance.
    #[must_use]
    pub fn refers_to(&self, other: &'static dyn AllocStrategy) -> bool {
        match self.target {
            Some(target) => std::ptr::eq(
                std::ptr::from_ref(target).cast::<u8>(),
                std::ptr::from_ref(other).cast::<u8>(),
            ),
            None => false,
        }
    }
}

impl std::fmt::Debug for AllocatorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocatorRef")
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static HEAP: LibcHeapStrategy = LibcHeapStrategy::new();

    #[test]
    fn null_handle_is_inert() {
        let handle = AllocatorRef::default();
        assert!(!handle.is_valid());
        assert_eq!(handle.name(), "<unbound>");
        assert!(handle.allocate_bytes(64, 16).is_null());
        // Must not crash.
        handle.deallocate_bytes(std::ptr::null_mut(), 64, 16);
    }

    #[test]
    fn bound_handle_round_trips() {
        let handle = AllocatorRef::new(&HEAP);
        assert!(handle.is_valid());
        assert!(handle.refers_to(&HEAP));
        let ptr = handle.allocate_bytes(64, 16);
        assert!(!ptr.is_null());
        assert_eq!(ptr as usize % 16, 0);
        handle.deallocate_bytes(ptr, 64, 16);
    }
}
