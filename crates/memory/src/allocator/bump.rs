//! Cursor arithmetic shared by the bump allocators

use crate::core::HostPool;
use crate::diagnostics::fatal;
use crate::error::MemoryError;
use crate::utils::{align_down, checked_align_up};

/// Fires the fatal diagnostic for a non-power-of-two alignment
#[inline]
pub(crate) fn check_alignment(alignment: usize) {
    if !alignment.is_power_of_two() {
        fatal(&MemoryError::invalid_alignment(alignment));
    }
}

/// The pool of an initialized allocator; fatal if there is none
#[inline]
#[track_caller]
pub(crate) fn require_pool<'a>(pool: &'a Option<HostPool>, allocator: &'static str) -> &'a HostPool {
    match pool {
        Some(pool) => pool,
        None => fatal(&MemoryError::not_initialized(allocator)),
    }
}

/// Places `size` bytes above `cursor`, aligning the absolute address
///
/// Returns the `(start, end)` offsets of the run, or `None` if it would end
/// past `limit` (or overflow).
#[inline]
pub(crate) fn bump_up(
    base: usize,
    cursor: usize,
    size: usize,
    alignment: usize,
    limit: usize,
) -> Option<(usize, usize)> {
    let start = checked_align_up(base.checked_add(cursor)?, alignment)? - base;
    let end = start.checked_add(size)?;
    (end <= limit).then_some((start, end))
}

/// Places `size` bytes below `cursor`, aligning the absolute address down
///
/// Returns the start offset, or `None` if `size` exceeds `cursor`.
#[inline]
pub(crate) fn bump_down(base: usize, cursor: usize, size: usize, alignment: usize) -> Option<usize> {
    let unaligned = cursor.checked_sub(size)?;
    let start = align_down(base + unaligned, alignment);
    start.checked_sub(base)
}
