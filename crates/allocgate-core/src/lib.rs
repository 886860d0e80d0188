//! # allocgate-core
//!
//! Global dynamic-memory routing layer.
//!
//! Every allocation and deallocation request entering this crate is funneled
//! through a single router ([`router::allocate_routed`] /
//! [`router::deallocate_routed`]) that picks one of several pluggable
//! allocation strategies, keeps per-pointer bookkeeping so the matching free
//! is always serviced by the allocator that produced the pointer, and applies
//! a deterministic out-of-memory policy.
//!
//! ## Design
//!
//! - **Strategies** are opaque behind [`strategy::AllocatorRef`]: a two
//!   operation contract (allocate bytes with alignment, deallocate bytes with
//!   size and alignment). The router never names a concrete strategy.
//!
//! - **Recursion safety**: per-thread reentry flags classify every call as
//!   primary or nested. Nested calls never touch the strategy layer; they use
//!   the emergency libc fallback so allocator internals can allocate without
//!   recursing into the router.
//!
//! - **Bookkeeping**: a mutex-guarded singly linked list of allocation
//!   records, with nodes carved directly out of `libc::malloc` so the
//!   registry never allocates through the layer it serves.
//!
//! - **Usable before init**: allocations issued before [`system::init`] are
//!   serviced by the fallback path (with a one-time warning) or rejected as a
//!   contract violation, depending on [`config`].
//!
//! No `unsafe` code is permitted at the crate level; the modules that must
//! touch raw storage opt in explicitly.

#![deny(unsafe_code)]

pub mod align;
pub mod config;
pub mod diag;
pub mod entry;
pub mod error;
#[allow(unsafe_code)]
pub mod fallback;
#[allow(unsafe_code)]
#[cfg(feature = "global-route")]
pub mod global;
pub mod oom;
pub mod reentry;
#[allow(unsafe_code)]
pub mod registry;
pub mod router;
pub mod stats;
#[allow(unsafe_code)]
pub mod strategy;
pub mod system;

pub use align::{align_up, is_power_of_two, normalize_alignment, MIN_ALIGNMENT};
pub use config::RouterConfig;
pub use error::SystemError;
pub use router::{allocate_routed, deallocate_routed, should_use_small};
pub use stats::StatsSnapshot;
pub use strategy::{AllocStrategy, AllocatorRef};
