//! Host-heap pool owned by a single allocator
//!
//! # Safety
//!
//! `HostPool` is the only place that talks to the host heap on behalf of the
//! pool-backed allocators:
//! - Memory is obtained once with `std::alloc::alloc` and an explicit
//!   [`Layout`] aligned to [`POOL_ALIGN`]
//! - The same layout is used to return it in `Drop`
//! - The pool never hands out references, only the base address; allocators
//!   do their own bounds arithmetic on top of it

use core::alloc::Layout;
use core::ptr::NonNull;
use std::alloc;

use super::types::alignment::POOL_ALIGN;
use crate::error::{MemoryError, MemoryResult};

/// A block of raw bytes obtained once from the host heap
pub(crate) struct HostPool {
    base: NonNull<u8>,
    layout: Layout,
}

impl HostPool {
    /// Obtains `size` bytes from the host heap
    pub(crate) fn allocate(size: usize) -> MemoryResult<Self> {
        if size == 0 {
            return Err(MemoryError::invalid_layout("pool size cannot be zero"));
        }

        let layout = Layout::from_size_align(size, POOL_ALIGN)
            .map_err(|_| MemoryError::size_overflow("pool layout"))?;

        // SAFETY: layout has a non-zero size (checked above).
        let raw = unsafe { alloc::alloc(layout) };
        let base = NonNull::new(raw).ok_or_else(|| MemoryError::allocation_failed(size, POOL_ALIGN))?;

        Ok(Self { base, layout })
    }

    /// Base address of the pool
    #[inline]
    pub(crate) fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Base address as an integer, for offset arithmetic
    #[inline]
    pub(crate) fn base_addr(&self) -> usize {
        self.base.as_ptr() as usize
    }

    /// Pool capacity in bytes
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    /// Address of the byte at `offset`
    ///
    /// `offset` must not exceed [`len`](Self::len).
    #[inline]
    pub(crate) fn at(&self, offset: usize) -> NonNull<u8> {
        debug_assert!(offset <= self.len());
        // SAFETY: offset stays within the allocation (or one past its end),
        // and the base is non-null so the result is non-null.
        unsafe { self.base.add(offset) }
    }

    /// Offset of `ptr` from the base, if it lies inside `[base, base + limit)`
    #[inline]
    pub(crate) fn offset_of(&self, ptr: NonNull<u8>, limit: usize) -> Option<usize> {
        let offset = (ptr.as_ptr() as usize).checked_sub(self.base_addr())?;
        (offset < limit.min(self.len())).then_some(offset)
    }

    /// Fills `[offset, offset + len)` with `pattern`
    pub(crate) fn fill(&self, offset: usize, len: usize, pattern: u8) {
        debug_assert!(offset + len <= self.len());
        // SAFETY: the range lies within the pool (asserted above), the pool
        // memory is exclusively owned by this value and is plain bytes.
        unsafe { core::ptr::write_bytes(self.at(offset).as_ptr(), pattern, len) };
    }
}

impl Drop for HostPool {
    fn drop(&mut self) {
        // SAFETY: base was returned by alloc::alloc with exactly this layout
        // and is released only here.
        unsafe { alloc::dealloc(self.base.as_ptr(), self.layout) };
    }
}

// SAFETY: HostPool exclusively owns its allocation; nothing else holds the
// base pointer as an owner, so moving the pool to another thread is sound.
unsafe impl Send for HostPool {}

impl core::fmt::Debug for HostPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HostPool")
            .field("base", &self.base)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_is_aligned() {
        let pool = HostPool::allocate(100).unwrap();
        assert_eq!(pool.base_addr() % POOL_ALIGN, 0);
        assert_eq!(pool.len(), 100);
    }

    #[test]
    fn test_zero_sized_pool_rejected() {
        assert_eq!(
            HostPool::allocate(0).unwrap_err().code(),
            "MEM:ALLOC:LAYOUT"
        );
    }

    #[test]
    fn test_offset_of_bounds() {
        let pool = HostPool::allocate(64).unwrap();
        assert_eq!(pool.offset_of(pool.at(10), 64), Some(10));
        assert_eq!(pool.offset_of(pool.at(10), 10), None);
        assert_eq!(pool.offset_of(pool.at(64), 64), None);

        let outside = NonNull::new((pool.base_addr() - 1) as *mut u8).unwrap();
        assert_eq!(pool.offset_of(outside, 64), None);
    }

    #[test]
    fn test_fill() {
        let pool = HostPool::allocate(32).unwrap();
        pool.fill(0, 32, 0xAB);
        // SAFETY: pool is 32 bytes and was just filled.
        let byte = unsafe { *pool.at(31).as_ptr() };
        assert_eq!(byte, 0xAB);
    }
}
