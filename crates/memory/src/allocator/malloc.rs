//! Pass-through allocator over the C heap

use core::ptr::NonNull;
use std::collections::BTreeSet;

use tracing::warn;

use crate::core::traits::Allocator;
use crate::diagnostics::fatal;
use crate::error::MemoryError;

/// Alignment `malloc` guarantees on mainstream platforms (glibc, musl, MSVC
/// CRT, libSystem): two machine words.
pub const MALLOC_ALIGN: usize = 2 * size_of::<usize>();

/// Forwards every request to `libc::malloc` / `libc::free`
///
/// There is no pool and no lifecycle. Alignment is whatever the host heap
/// provides ([`MALLOC_ALIGN`]); larger alignments cannot be honoured and are
/// reported as `None`. Live addresses are remembered so that releasing an
/// address this allocator did not hand out is caught instead of reaching
/// `free`.
#[derive(Debug, Default)]
pub struct MallocAllocator {
    live: BTreeSet<usize>,
}

impl MallocAllocator {
    pub const fn new() -> Self {
        Self {
            live: BTreeSet::new(),
        }
    }

    /// Number of blocks acquired and not yet released
    pub fn live_blocks(&self) -> usize {
        self.live.len()
    }
}

impl Allocator for MallocAllocator {
    fn acquire(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        if !alignment.is_power_of_two() {
            fatal(&MemoryError::invalid_alignment(alignment));
        }
        if size == 0 || alignment > MALLOC_ALIGN {
            return None;
        }

        // SAFETY: plain FFI call; a null result is handled below.
        let raw = unsafe { libc::malloc(size) };
        let ptr = NonNull::new(raw.cast::<u8>())?;
        self.live.insert(ptr.as_ptr() as usize);
        Some(ptr)
    }

    fn release(&mut self, ptr: NonNull<u8>) {
        if !self.live.remove(&(ptr.as_ptr() as usize)) {
            fatal(&MemoryError::invalid_operation(format!(
                "{ptr:p} was not acquired from this MallocAllocator"
            )));
        }
        // SAFETY: ptr came from libc::malloc (it was in `live`) and is freed
        // exactly once.
        unsafe { libc::free(ptr.as_ptr().cast()) };
    }
}

impl Drop for MallocAllocator {
    fn drop(&mut self) {
        if self.live.is_empty() {
            return;
        }
        warn!(blocks = self.live.len(), "MallocAllocator dropped with live blocks; freeing them");
        for addr in core::mem::take(&mut self.live) {
            // SAFETY: every address in `live` came from libc::malloc and has
            // not been freed.
            unsafe { libc::free(addr as *mut libc::c_void) };
        }
    }
}
