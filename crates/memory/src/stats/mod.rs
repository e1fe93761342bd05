//! Statistics for pool-backed allocators
//!
//! Statistics are gathered by walking a pool rather than maintained
//! incrementally; see [`walker`] for the handler objects that accumulate them.

use core::fmt;

use crate::utils::format_bytes;

pub mod walker;

pub use walker::{BlockInfo, ExitWalker, PoolWalker};
#[cfg(feature = "debug-ui")]
pub use walker::UiWalker;

/// Totals accumulated over a pool walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Bytes in blocks that are still in use
    pub allocated_bytes: usize,
    /// Bytes managed by the pool, used or free
    pub total_bytes: usize,
    /// Number of blocks still in use
    pub allocation_count: usize,
}

impl AllocatorStats {
    /// Creates an empty record
    pub const fn new() -> Self {
        Self {
            allocated_bytes: 0,
            total_bytes: 0,
            allocation_count: 0,
        }
    }

    /// Records one used block of `size` bytes
    ///
    /// Zero-sized records do not count as an allocation.
    pub fn add(&mut self, size: usize) {
        if size == 0 {
            return;
        }
        self.allocated_bytes += size;
        self.allocation_count += 1;
    }

    /// Records a block of `size` bytes toward the pool total
    pub fn add_total(&mut self, size: usize) {
        self.total_bytes += size;
    }

    /// Whether every block has been released
    pub const fn is_clean(&self) -> bool {
        self.allocated_bytes == 0 && self.allocation_count == 0
    }
}

impl fmt::Display for AllocatorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} used of {} in {} block(s)",
            format_bytes(self.allocated_bytes),
            format_bytes(self.total_bytes),
            self.allocation_count
        )
    }
}
