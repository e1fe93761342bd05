//! RAII-based stack frame for automatic restoration

use core::ops::{Deref, DerefMut};

use super::{StackAllocator, StackMarker};

/// RAII helper for stack-based scoped allocation
///
/// Snapshots the cursor on creation and rewinds to it when dropped. The frame
/// dereferences to the allocator, so scoped allocations go through it.
///
/// ```
/// use lumen_memory::allocator::{Allocator, StackAllocator};
///
/// let mut stack = StackAllocator::with_capacity(1024)?;
/// stack.acquire(64, 8).unwrap();
/// {
///     let mut frame = stack.frame();
///     frame.acquire(256, 16).unwrap();
///     assert!(frame.allocated_size() >= 320);
/// }
/// assert_eq!(stack.allocated_size(), 64);
/// # Ok::<(), lumen_memory::MemoryError>(())
/// ```
pub struct StackFrame<'a> {
    allocator: &'a mut StackAllocator,
    marker: StackMarker,
}

impl<'a> StackFrame<'a> {
    /// Creates a new stack frame that will restore to the current position
    /// when dropped
    pub fn new(allocator: &'a mut StackAllocator) -> Self {
        let marker = allocator.get_marker();
        Self { allocator, marker }
    }

    /// Position this frame rewinds to
    pub fn marker(&self) -> StackMarker {
        self.marker
    }

    /// Manually restore and consume this frame
    pub fn restore(self) {
        drop(self);
    }
}

impl Deref for StackFrame<'_> {
    type Target = StackAllocator;

    fn deref(&self) -> &Self::Target {
        self.allocator
    }
}

impl DerefMut for StackFrame<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.allocator
    }
}

impl Drop for StackFrame<'_> {
    fn drop(&mut self) {
        self.allocator.free_marker(self.marker);
    }
}

impl core::fmt::Debug for StackFrame<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StackFrame")
            .field("marker", &self.marker)
            .field("allocated_size", &self.allocator.allocated_size())
            .finish()
    }
}
