//! Stack allocator implementation

use core::ptr::NonNull;

use tracing::trace;

use super::{StackConfig, StackFrame, StackMarker};
use crate::allocator::bump::{bump_up, check_alignment, require_pool};
use crate::core::HostPool;
use crate::core::traits::{Allocator, Lifecycle, MemoryUsage};
use crate::diagnostics::fatal;
use crate::error::{MemoryError, MemoryResult};

const NAME: &str = "StackAllocator";

/// LIFO bump allocator over a single host pool
///
/// Acquisition works like [`LinearAllocator`](crate::allocator::LinearAllocator).
/// Memory is given back in stack order, either by rewinding to a
/// [`StackMarker`] or by releasing an address, which discards it and
/// everything acquired after it.
///
/// # Examples
/// ```
/// use lumen_memory::allocator::{Allocator, StackAllocator};
///
/// let mut stack = StackAllocator::with_capacity(1024)?;
/// let marker = stack.get_marker();
///
/// stack.acquire(100, 8).unwrap();
/// stack.acquire(200, 8).unwrap();
/// stack.free_marker(marker);
///
/// assert_eq!(stack.allocated_size(), 0);
/// # Ok::<(), lumen_memory::MemoryError>(())
/// ```
#[derive(Debug, Default)]
pub struct StackAllocator {
    pool: Option<HostPool>,
    allocated_size: usize,
    config: StackConfig,
}

impl StackAllocator {
    /// An allocator with no pool and the default configuration
    pub fn new() -> Self {
        Self::with_config(StackConfig::default())
    }

    /// An allocator with no pool; call [`Lifecycle::init`] before use
    pub fn with_config(config: StackConfig) -> Self {
        Self {
            pool: None,
            allocated_size: 0,
            config,
        }
    }

    /// An allocator with a pool of `size` bytes and the default configuration
    pub fn with_capacity(size: usize) -> MemoryResult<Self> {
        let mut allocator = Self::new();
        allocator.init(size)?;
        Ok(allocator)
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Snapshot of the current cursor
    pub fn get_marker(&self) -> StackMarker {
        StackMarker {
            position: self.allocated_size,
        }
    }

    /// Rewinds to `marker`
    ///
    /// Only ever shrinks: a marker at or above the cursor (a repeated free,
    /// or a marker taken after a deeper rewind) leaves the allocator as is.
    pub fn free_marker(&mut self, marker: StackMarker) {
        if marker.position < self.allocated_size {
            self.rewind_to(marker.position);
        }
    }

    /// Rewinds the cursor to the start of the pool
    pub fn clear(&mut self) {
        self.rewind_to(0);
    }

    /// Opens a scope that rewinds to the current cursor when dropped
    pub fn frame(&mut self) -> StackFrame<'_> {
        StackFrame::new(self)
    }

    /// Bytes consumed so far, alignment padding included
    pub fn allocated_size(&self) -> usize {
        self.allocated_size
    }

    /// Pool capacity, zero when not initialized
    pub fn total_size(&self) -> usize {
        self.pool.as_ref().map_or(0, HostPool::len)
    }

    fn rewind_to(&mut self, offset: usize) {
        debug_assert!(offset <= self.allocated_size);
        if let (Some(pattern), Some(pool)) = (self.config.dealloc_pattern, &self.pool) {
            pool.fill(offset, self.allocated_size - offset, pattern);
        }
        self.allocated_size = offset;
    }
}

impl Lifecycle for StackAllocator {
    fn init(&mut self, size: usize) -> MemoryResult<()> {
        if self.pool.is_some() {
            return Err(MemoryError::already_initialized(NAME));
        }
        self.pool = Some(HostPool::allocate(size)?);
        self.allocated_size = 0;
        trace!(size, "StackAllocator created");
        Ok(())
    }

    fn shutdown(&mut self) {
        self.allocated_size = 0;
        if let Some(pool) = self.pool.take() {
            trace!(size = pool.len(), "StackAllocator shut down");
        }
    }

    fn is_initialized(&self) -> bool {
        self.pool.is_some()
    }
}

impl Allocator for StackAllocator {
    fn acquire(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        check_alignment(alignment);
        let pool = require_pool(&self.pool, NAME);
        if size == 0 {
            return None;
        }

        let (start, end) = bump_up(pool.base_addr(), self.allocated_size, size, alignment, pool.len())?;
        if let Some(pattern) = self.config.alloc_pattern {
            pool.fill(start, size, pattern);
        }
        self.allocated_size = end;
        Some(pool.at(start))
    }

    /// Rewinds to `ptr`, discarding it and everything acquired after it
    ///
    /// `ptr` must lie inside the live range `[base, base + allocated_size)`;
    /// anything else is a fatal diagnostic.
    fn release(&mut self, ptr: NonNull<u8>) {
        let pool = require_pool(&self.pool, NAME);
        let Some(offset) = pool.offset_of(ptr, self.allocated_size) else {
            fatal(&MemoryError::invalid_operation(format!(
                "{ptr:p} is outside the live range of {NAME} ({} bytes at {:p})",
                self.allocated_size,
                pool.base()
            )));
        };
        self.rewind_to(offset);
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

impl MemoryUsage for StackAllocator {
    fn used_memory(&self) -> usize {
        self.allocated_size
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.total_size() - self.allocated_size)
    }
}
