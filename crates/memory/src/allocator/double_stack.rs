//! Two-ended stack allocator
//!
//! One pool, two cursors: `bottom` grows up from offset 0 and `top` grows down
//! from the end. Each end behaves like an independent stack; they fail once
//! they would meet. Typical use is keeping long-lived data at one end and
//! per-frame scratch at the other.
//!
//! The type does not implement [`Allocator`](crate::allocator::Allocator).
//! There is no sensible default end for a generic `acquire`, so every call
//! names its side.

use core::ptr::NonNull;

use tracing::trace;

use super::bump::{bump_down, bump_up, check_alignment, require_pool};
use crate::core::HostPool;
use crate::core::traits::{Lifecycle, MemoryUsage};
use crate::error::{MemoryError, MemoryResult};
use crate::fatal_assert;

const NAME: &str = "DoubleStackAllocator";

/// Snapshot of the bottom cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BottomMarker(usize);

/// Snapshot of the top cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopMarker(usize);

impl BottomMarker {
    pub const fn position(self) -> usize {
        self.0
    }
}

impl TopMarker {
    pub const fn position(self) -> usize {
        self.0
    }
}

/// Two opposing bump stacks sharing one pool
///
/// # Examples
/// ```
/// use lumen_memory::allocator::DoubleStackAllocator;
///
/// let mut stacks = DoubleStackAllocator::with_capacity(1024)?;
/// stacks.acquire_bottom(100, 1).unwrap();
/// stacks.acquire_top(200, 1).unwrap();
/// assert_eq!((stacks.bottom(), stacks.top()), (100, 824));
///
/// // the ends may not meet
/// assert!(stacks.acquire_bottom(724, 1).is_none());
/// assert!(stacks.acquire_top(724, 1).is_none());
/// # Ok::<(), lumen_memory::MemoryError>(())
/// ```
#[derive(Debug, Default)]
pub struct DoubleStackAllocator {
    pool: Option<HostPool>,
    bottom: usize,
    top: usize,
}

impl DoubleStackAllocator {
    /// An allocator with no pool; call [`Lifecycle::init`] before use
    pub const fn new() -> Self {
        Self {
            pool: None,
            bottom: 0,
            top: 0,
        }
    }

    /// An allocator with a pool of `size` bytes
    pub fn with_capacity(size: usize) -> MemoryResult<Self> {
        let mut allocator = Self::new();
        allocator.init(size)?;
        Ok(allocator)
    }

    /// Acquires `size` bytes from the bottom end
    ///
    /// Fails if the run would reach the top cursor.
    pub fn acquire_bottom(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        check_alignment(alignment);
        let pool = require_pool(&self.pool, NAME);
        if size == 0 {
            return None;
        }

        let (start, end) = bump_up(pool.base_addr(), self.bottom, size, alignment, self.top)?;
        if end >= self.top {
            return None;
        }
        self.bottom = end;
        let ptr = pool.at(start);
        self.check_cursors();
        Some(ptr)
    }

    /// Acquires `size` bytes from the top end
    ///
    /// The address is aligned down, so the run stays below the previous top.
    /// Fails if the run would reach the bottom cursor.
    pub fn acquire_top(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        check_alignment(alignment);
        let pool = require_pool(&self.pool, NAME);
        if size == 0 || size > self.top {
            return None;
        }

        let start = bump_down(pool.base_addr(), self.top, size, alignment)?;
        if start <= self.bottom {
            return None;
        }
        self.top = start;
        let ptr = pool.at(start);
        self.check_cursors();
        Some(ptr)
    }

    /// Gives back `size` bytes from the bottom end; saturates at 0
    pub fn release_bottom(&mut self, size: usize) {
        require_pool(&self.pool, NAME);
        self.bottom = self.bottom.saturating_sub(size);
    }

    /// Gives back `size` bytes from the top end; saturates at the pool end
    pub fn release_top(&mut self, size: usize) {
        let total = require_pool(&self.pool, NAME).len();
        if size > total - self.top {
            self.top = total;
        } else {
            self.top += size;
        }
    }

    pub fn get_bottom_marker(&self) -> BottomMarker {
        BottomMarker(self.bottom)
    }

    pub fn get_top_marker(&self) -> TopMarker {
        TopMarker(self.top)
    }

    /// Rewinds the bottom end to `marker` if that shrinks it
    pub fn free_bottom_marker(&mut self, marker: BottomMarker) {
        if marker.0 < self.bottom {
            self.bottom = marker.0;
        }
    }

    /// Rewinds the top end to `marker` if that shrinks it
    ///
    /// A marker at the very end of the pool is ignored; use
    /// [`clear_top`](Self::clear_top) to empty the top end.
    pub fn free_top_marker(&mut self, marker: TopMarker) {
        if marker.0 > self.top && marker.0 < self.total_size() {
            self.top = marker.0;
        }
    }

    pub fn clear_bottom(&mut self) {
        self.bottom = 0;
    }

    pub fn clear_top(&mut self) {
        self.top = self.total_size();
    }

    /// Bottom cursor (bytes used from the start)
    pub fn bottom(&self) -> usize {
        self.bottom
    }

    /// Top cursor (offset of the lowest top-end byte)
    pub fn top(&self) -> usize {
        self.top
    }

    /// Pool capacity, zero when not initialized
    pub fn total_size(&self) -> usize {
        self.pool.as_ref().map_or(0, HostPool::len)
    }

    fn check_cursors(&self) {
        fatal_assert!(
            self.bottom <= self.top,
            MemoryError::invalid_operation(format!(
                "{NAME} bottom {} crossed top {}",
                self.bottom, self.top
            ))
        );
    }
}

impl Lifecycle for DoubleStackAllocator {
    fn init(&mut self, size: usize) -> MemoryResult<()> {
        if self.pool.is_some() {
            return Err(MemoryError::already_initialized(NAME));
        }
        let pool = HostPool::allocate(size)?;
        self.bottom = 0;
        self.top = pool.len();
        self.pool = Some(pool);
        trace!(size, "DoubleStackAllocator created");
        Ok(())
    }

    fn shutdown(&mut self) {
        self.bottom = 0;
        self.top = 0;
        if let Some(pool) = self.pool.take() {
            trace!(size = pool.len(), "DoubleStackAllocator shut down");
        }
    }

    fn is_initialized(&self) -> bool {
        self.pool.is_some()
    }
}

impl MemoryUsage for DoubleStackAllocator {
    fn used_memory(&self) -> usize {
        self.bottom + (self.total_size() - self.top)
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.top - self.bottom)
    }
}
