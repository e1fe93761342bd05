//! Stack marker for position tracking

/// Marker representing a position in the stack allocator
///
/// Passing it to [`StackAllocator::free_marker`](super::StackAllocator::free_marker)
/// rewinds the allocator to this position, releasing everything acquired
/// after the marker was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackMarker {
    pub(super) position: usize,
}

impl StackMarker {
    /// Cursor offset captured by this marker
    pub const fn position(self) -> usize {
        self.position
    }
}
