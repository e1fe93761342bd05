//! # lumen-memory
//!
//! Pool-backed memory allocators for the Lumen renderer and its tools.
//!
//! Each allocator obtains one block of bytes from the host heap when it is
//! initialized and serves every later request out of it:
//! - [`MallocAllocator`](allocator::MallocAllocator) forwards to the C heap
//! - [`LinearAllocator`](allocator::LinearAllocator) bumps a cursor and is
//!   cleared as a whole
//! - [`StackAllocator`](allocator::StackAllocator) releases in LIFO order via
//!   markers, addresses or RAII frames
//! - [`DoubleStackAllocator`](allocator::DoubleStackAllocator) runs two
//!   stacks from opposite ends of one pool
//! - [`HeapAllocator`](allocator::HeapAllocator) is a general-purpose heap over
//!   a two-level segregated-fit pool ([`tlsf`])
//!
//! [`MemoryService`](service::MemoryService) owns the system heap.
//!
//! ## Quick Start
//!
//! ```rust
//! use lumen_memory::prelude::*;
//!
//! let mut service = MemoryService::new();
//! service.init(Some(&MemoryServiceConfiguration::new(1024 * 1024)))?;
//!
//! let heap = service.system_allocator();
//! let block = heap.acquire(256, 16).unwrap();
//! heap.release(block);
//!
//! let mut scratch = StackAllocator::with_capacity(4096)?;
//! {
//!     let mut frame = scratch.frame();
//!     frame.acquire(1024, 64).unwrap();
//! }
//! assert_eq!(scratch.allocated_size(), 0);
//!
//! service.shutdown();
//! # Ok::<(), MemoryError>(())
//! ```
//!
//! ## Failure model
//!
//! - Running out of pool space is ordinary: `acquire` returns `None`
//! - Lifecycle and configuration problems are returned as [`MemoryError`]
//! - Broken invariants (foreign pointers, bad alignment, use before `init`,
//!   leaks at heap shutdown) go through [`diagnostics::fatal`], which logs and
//!   panics
//!
//! ## Features
//!
//! - `debug-ui` (default): text rendering of heap pools and the service panel

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]
// Allocators hand out raw pool addresses; every unsafe block carries a SAFETY note
#![allow(unsafe_code)]

// Error types
pub mod error;

pub mod diagnostics;
mod macros;

// Core modules
pub mod allocator;
pub mod core;
#[cfg(feature = "debug-ui")]
#[cfg_attr(docsrs, doc(cfg(feature = "debug-ui")))]
pub mod debug_ui;
pub mod service;
pub mod stats;
pub mod tlsf;
pub mod utils;

// Re-export core types for convenience
pub use crate::error::{MemoryError, MemoryResult, Result};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::core::traits::{Allocator, Lifecycle, MemoryUsage};
    pub use crate::core::types::size::{GB, KB, MB};

    // Error types
    pub use crate::error::{MemoryError, MemoryResult};

    // Allocator types
    pub use crate::allocator::{
        BottomMarker, DoubleStackAllocator, HeapAllocator, LinearAllocator, MallocAllocator,
        StackAllocator, StackConfig, StackFrame, StackMarker, TopMarker,
    };

    pub use crate::service::{MemoryService, MemoryServiceConfiguration};
    pub use crate::stats::AllocatorStats;

    #[cfg(feature = "debug-ui")]
    pub use crate::debug_ui::{DebugUi, TextPanel};
}

/// Initialize the process-wide memory service.
///
/// Shorthand for `MemoryService::instance().init(configuration)`.
///
/// # Examples
///
/// ```rust
/// fn main() -> lumen_memory::MemoryResult<()> {
///     lumen_memory::init(None)?;
///
///     // Your application code here
///
///     lumen_memory::shutdown();
///     Ok(())
/// }
/// ```
pub fn init(configuration: Option<&service::MemoryServiceConfiguration>) -> MemoryResult<()> {
    service::MemoryService::instance().init(configuration)
}

/// Shut down the process-wide memory service.
///
/// Live heap blocks at this point are a fatal diagnostic.
pub fn shutdown() {
    service::MemoryService::instance().shutdown();
}
