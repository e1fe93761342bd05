//! Core traits for memory management
//!
//! This module defines the allocator contract shared by every allocator in
//! the crate, the pool lifecycle, and usage reporting.
//!
//! `acquire` reports capacity exhaustion as `None`; that is an expected
//! outcome callers handle. Misuse (bad alignment, foreign pointers, use before
//! `init`) is an integrity failure and goes through
//! [`crate::diagnostics::fatal`].

use core::ptr::NonNull;

use tracing::trace;

use crate::error::MemoryResult;

/// Uniform acquire/release interface
///
/// Implemented by [`MallocAllocator`](crate::allocator::MallocAllocator),
/// [`LinearAllocator`](crate::allocator::LinearAllocator),
/// [`StackAllocator`](crate::allocator::StackAllocator) and
/// [`HeapAllocator`](crate::allocator::HeapAllocator).
///
/// The two-ended [`DoubleStackAllocator`](crate::allocator::DoubleStackAllocator)
/// does not implement it, since it has no default side:
///
/// ```compile_fail
/// use lumen_memory::allocator::{Allocator, DoubleStackAllocator};
///
/// let mut allocator = DoubleStackAllocator::with_capacity(1024).unwrap();
/// let _ = allocator.acquire(16, 8);
/// ```
pub trait Allocator {
    /// Acquires `size` bytes aligned to `alignment`
    ///
    /// `alignment` must be a power of two. Returns `None` when the request
    /// cannot be satisfied (including `size == 0`).
    fn acquire(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>>;

    /// Same as [`acquire`](Self::acquire); `file` and `line` are only logged
    fn acquire_annotated(
        &mut self,
        size: usize,
        alignment: usize,
        file: &'static str,
        line: u32,
    ) -> Option<NonNull<u8>> {
        let ptr = self.acquire(size, alignment);
        trace!(size, alignment, file, line, ptr = ?ptr, "acquire");
        ptr
    }

    /// Releases memory previously returned by `acquire`
    ///
    /// What happens to the bytes depends on the allocator: the heap frees the
    /// block, the stack rewinds to it, the linear arena ignores the call.
    fn release(&mut self, ptr: NonNull<u8>);

    /// Allocator name for logs and diagnostics
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Pool lifecycle for allocators that own a host-heap pool
pub trait Lifecycle {
    /// Obtains a pool of `size` bytes from the host heap
    ///
    /// Fails if the allocator is already initialized, if `size` is zero, or
    /// if the host heap cannot provide the memory.
    fn init(&mut self, size: usize) -> MemoryResult<()>;

    /// Returns the pool to the host heap
    ///
    /// All addresses handed out so far become invalid. A no-op when the
    /// allocator is not initialized.
    fn shutdown(&mut self);

    /// Whether the allocator currently owns a pool
    fn is_initialized(&self) -> bool;
}

/// Memory usage tracking trait
///
/// Implemented by allocators that track usage statistics.
pub trait MemoryUsage {
    /// Get currently used memory in bytes
    fn used_memory(&self) -> usize;

    /// Get available memory in bytes (if known)
    fn available_memory(&self) -> Option<usize>;

    /// Get total memory capacity in bytes (if known)
    fn total_memory(&self) -> Option<usize> {
        match (self.used_memory(), self.available_memory()) {
            (used, Some(available)) => Some(used + available),
            _ => None,
        }
    }

    /// Returns memory usage as a percentage (0.0 to 100.0)
    ///
    /// Returns `None` if total memory is unknown.
    fn memory_usage_percent(&self) -> Option<f32> {
        self.total_memory().map(|total| {
            if total == 0 {
                0.0
            } else {
                (self.used_memory() as f32 / total as f32) * 100.0
            }
        })
    }

    /// Returns detailed memory usage information
    fn memory_usage(&self) -> BasicMemoryUsage {
        BasicMemoryUsage {
            used: self.used_memory(),
            available: self.available_memory(),
            total: self.total_memory(),
            usage_percent: self.memory_usage_percent(),
        }
    }
}

/// Basic memory usage information
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicMemoryUsage {
    /// Currently used memory in bytes
    pub used: usize,
    /// Available memory in bytes (None if unlimited)
    pub available: Option<usize>,
    /// Total memory capacity in bytes (None if unlimited)
    pub total: Option<usize>,
    /// Memory usage as percentage (None if cannot be calculated)
    pub usage_percent: Option<f32>,
}

impl core::fmt::Display for BasicMemoryUsage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "used: {} bytes", self.used)?;

        if let Some(total) = self.total {
            write!(f, ", total: {total} bytes")?;
        }

        if let Some(percent) = self.usage_percent {
            write!(f, " ({percent:.1}%)")?;
        }

        Ok(())
    }
}
