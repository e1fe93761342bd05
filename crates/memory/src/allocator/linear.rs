//! Monotonic bump arena
//!
//! Allocation only moves the cursor forward; individual releases are ignored
//! and the whole arena is reclaimed with [`LinearAllocator::clear`].

use core::ptr::NonNull;

use tracing::trace;

use super::bump::{bump_up, check_alignment, require_pool};
use crate::core::HostPool;
use crate::core::traits::{Allocator, Lifecycle, MemoryUsage};
use crate::error::{MemoryError, MemoryResult};

const NAME: &str = "LinearAllocator";

/// Linear (bump) allocator over a single host pool
///
/// # Examples
/// ```
/// use lumen_memory::allocator::{Allocator, LinearAllocator};
///
/// let mut arena = LinearAllocator::with_capacity(1024)?;
/// let a = arena.acquire(16, 1).unwrap();
/// let b = arena.acquire(8, 8).unwrap();
/// assert!(b.as_ptr() as usize >= a.as_ptr() as usize + 16);
///
/// arena.clear();
/// assert_eq!(arena.acquire(16, 1), Some(a));
/// # Ok::<(), lumen_memory::MemoryError>(())
/// ```
#[derive(Debug, Default)]
pub struct LinearAllocator {
    pool: Option<HostPool>,
    allocated_size: usize,
}

impl LinearAllocator {
    /// An allocator with no pool; call [`Lifecycle::init`] before use
    pub const fn new() -> Self {
        Self {
            pool: None,
            allocated_size: 0,
        }
    }

    /// An allocator with a pool of `size` bytes
    pub fn with_capacity(size: usize) -> MemoryResult<Self> {
        let mut allocator = Self::new();
        allocator.init(size)?;
        Ok(allocator)
    }

    /// Rewinds the cursor to the start of the pool
    ///
    /// Every address handed out so far becomes reusable.
    pub fn clear(&mut self) {
        self.allocated_size = 0;
    }

    /// Bytes consumed so far, alignment padding included
    pub fn allocated_size(&self) -> usize {
        self.allocated_size
    }

    /// Pool capacity, zero when not initialized
    pub fn total_size(&self) -> usize {
        self.pool.as_ref().map_or(0, HostPool::len)
    }
}

impl Lifecycle for LinearAllocator {
    fn init(&mut self, size: usize) -> MemoryResult<()> {
        if self.pool.is_some() {
            return Err(MemoryError::already_initialized(NAME));
        }
        self.pool = Some(HostPool::allocate(size)?);
        self.allocated_size = 0;
        trace!(size, "LinearAllocator created");
        Ok(())
    }

    fn shutdown(&mut self) {
        self.clear();
        if let Some(pool) = self.pool.take() {
            trace!(size = pool.len(), "LinearAllocator shut down");
        }
    }

    fn is_initialized(&self) -> bool {
        self.pool.is_some()
    }
}

impl Allocator for LinearAllocator {
    fn acquire(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        check_alignment(alignment);
        let pool = require_pool(&self.pool, NAME);
        if size == 0 {
            return None;
        }

        let (start, end) = bump_up(pool.base_addr(), self.allocated_size, size, alignment, pool.len())?;
        self.allocated_size = end;
        Some(pool.at(start))
    }

    /// No-op: memory is reclaimed by [`LinearAllocator::clear`]
    fn release(&mut self, _ptr: NonNull<u8>) {
        require_pool(&self.pool, NAME);
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

impl MemoryUsage for LinearAllocator {
    fn used_memory(&self) -> usize {
        self.allocated_size
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.total_size() - self.allocated_size)
    }
}
