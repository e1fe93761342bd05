//! General-purpose heap over a TLSF pool
//!
//! [`HeapAllocator`] owns one host pool and hands out variable-sized blocks
//! from it through [`Tlsf`]. It keeps a running count of live bytes (the
//! pool-reported block sizes, which may exceed the requested sizes) and
//! refuses to shut down while any block is still live.

use core::ptr::NonNull;

use tracing::{error, info, trace, warn};

use crate::allocator::bump::check_alignment;
use crate::core::HostPool;
use crate::core::traits::{Allocator, Lifecycle, MemoryUsage};
#[cfg(feature = "debug-ui")]
use crate::debug_ui::DebugUi;
use crate::diagnostics::fatal;
use crate::error::{MemoryError, MemoryResult};
#[cfg(feature = "debug-ui")]
use crate::stats::UiWalker;
use crate::stats::{AllocatorStats, BlockInfo, ExitWalker};
use crate::tlsf::Tlsf;

const NAME: &str = "HeapAllocator";

#[derive(Debug)]
struct Heap {
    // dropped before the pool it points into
    tlsf: Tlsf,
    pool: HostPool,
}

/// TLSF-backed heap with live-byte accounting
///
/// # Examples
/// ```
/// use lumen_memory::allocator::{Allocator, HeapAllocator, Lifecycle};
///
/// let mut heap = HeapAllocator::with_capacity(64 * 1024)?;
/// let a = heap.acquire(100, 1).unwrap();
/// let b = heap.acquire(256, 64).unwrap();
/// assert_eq!(b.as_ptr() as usize % 64, 0);
///
/// heap.release(a);
/// heap.release(b);
/// assert_eq!(heap.allocated_size(), 0);
/// heap.shutdown();
/// # Ok::<(), lumen_memory::MemoryError>(())
/// ```
#[derive(Debug, Default)]
pub struct HeapAllocator {
    heap: Option<Heap>,
    allocated_size: usize,
    max_size: usize,
}

impl HeapAllocator {
    /// An allocator with no pool; call [`Lifecycle::init`] before use
    pub const fn new() -> Self {
        Self {
            heap: None,
            allocated_size: 0,
            max_size: 0,
        }
    }

    /// An allocator with a pool of `size` bytes
    pub fn with_capacity(size: usize) -> MemoryResult<Self> {
        let mut allocator = Self::new();
        allocator.init(size)?;
        Ok(allocator)
    }

    /// Sum of the sizes of all live blocks
    pub fn allocated_size(&self) -> usize {
        self.allocated_size
    }

    /// Size of the host pool, zero when not initialized
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Usable size of the live block at `ptr`
    pub fn block_size(&self, ptr: NonNull<u8>) -> Option<usize> {
        self.heap.as_ref()?.tlsf.block_size(ptr)
    }

    /// [`release`](Allocator::release) for nullable pointers; null is a no-op
    pub fn release_raw(&mut self, ptr: *mut u8) {
        if let Some(ptr) = NonNull::new(ptr) {
            self.release(ptr);
        }
    }

    /// Walks the pool and totals used and free blocks
    pub fn statistics(&self) -> AllocatorStats {
        let mut stats = AllocatorStats::new();
        if let Some(heap) = &self.heap {
            heap.tlsf.pool().walk(&mut |block: BlockInfo| {
                stats.add_total(block.size);
                if block.used {
                    stats.add(block.size);
                }
            });
        }
        stats
    }

    /// Verifies the pool's block structure and the live-byte counter
    pub fn check(&self) -> MemoryResult<()> {
        let Some(heap) = &self.heap else {
            return Ok(());
        };
        heap.tlsf.check()?;

        let live = self.statistics().allocated_bytes;
        if live != self.allocated_size {
            return Err(MemoryError::invalid_operation(format!(
                "live-byte counter is {} but the pool holds {live} live bytes",
                self.allocated_size
            )));
        }
        Ok(())
    }

    /// Shuts down unless blocks are still live
    ///
    /// Every live block is logged at ERROR level. With leaks the allocator is
    /// left untouched and `LeakOnShutdown` is returned; otherwise the pool
    /// goes back to the host heap and the final walk totals are returned.
    /// A no-op on an allocator that is not initialized.
    pub fn try_shutdown(&mut self) -> MemoryResult<AllocatorStats> {
        let Some(heap) = &self.heap else {
            return Ok(AllocatorStats::new());
        };

        let mut stats = AllocatorStats::new();
        heap.tlsf.pool().walk(&mut ExitWalker::new(&mut stats));
        debug_assert_eq!(stats.allocated_bytes, self.allocated_size);

        if stats.allocated_bytes != 0 {
            return Err(MemoryError::leak_on_shutdown(
                stats.allocated_bytes,
                stats.allocation_count,
            ));
        }

        info!(max_size = self.max_size, "HeapAllocator shutdown: all memory free");
        if let Some(Heap { tlsf, pool }) = self.heap.take() {
            tlsf.destroy();
            drop(pool);
        }
        self.allocated_size = 0;
        self.max_size = 0;
        Ok(stats)
    }

    /// Renders one line per block followed by the totals
    #[cfg(feature = "debug-ui")]
    pub fn debug_ui(&self, ui: &mut dyn DebugUi) {
        if !ui.begin_panel("Heap") {
            return;
        }

        match &self.heap {
            Some(heap) => {
                let mut stats = AllocatorStats::new();
                heap.tlsf.pool().walk(&mut UiWalker::new(&mut stats, &mut *ui));
                ui.text(&format!("Total: {stats}"));
            }
            None => ui.text("not initialized"),
        }

        ui.end_panel();
    }

    #[track_caller]
    fn heap_mut(&mut self) -> &mut Heap {
        match &mut self.heap {
            Some(heap) => heap,
            None => fatal(&MemoryError::not_initialized(NAME)),
        }
    }
}

impl Lifecycle for HeapAllocator {
    fn init(&mut self, size: usize) -> MemoryResult<()> {
        if self.heap.is_some() {
            return Err(MemoryError::already_initialized(NAME));
        }

        let pool = HostPool::allocate(size)?;
        let tlsf = Tlsf::create(pool.base(), pool.len())?;
        self.heap = Some(Heap { tlsf, pool });
        self.allocated_size = 0;
        self.max_size = size;
        trace!(size, "HeapAllocator created");
        Ok(())
    }

    /// Shuts down; live blocks are a fatal diagnostic
    fn shutdown(&mut self) {
        if let Err(err) = self.try_shutdown() {
            error!(
                allocated_bytes = self.allocated_size,
                "HeapAllocator shutdown failed: memory still allocated"
            );
            fatal(&err);
        }
    }

    fn is_initialized(&self) -> bool {
        self.heap.is_some()
    }
}

impl Allocator for HeapAllocator {
    fn acquire(&mut self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        check_alignment(alignment);
        let heap = self.heap_mut();
        if size == 0 {
            return None;
        }

        let ptr = if alignment == 1 {
            heap.tlsf.malloc(size)
        } else {
            heap.tlsf.memalign(alignment, size)
        }?;

        let Some(block_size) = heap.tlsf.block_size(ptr) else {
            fatal(&MemoryError::invalid_operation(format!(
                "{ptr:p} was just acquired but is not a live block"
            )));
        };
        self.allocated_size += block_size;
        Some(ptr)
    }

    /// Frees the block at `ptr`
    ///
    /// An address that is not a live block of this heap is a fatal
    /// diagnostic.
    fn release(&mut self, ptr: NonNull<u8>) {
        let heap = self.heap_mut();
        let Some(block_size) = heap.tlsf.block_size(ptr) else {
            fatal(&MemoryError::invalid_operation(format!(
                "{ptr:p} is not a live block of {NAME}"
            )));
        };
        if let Err(err) = heap.tlsf.free(ptr) {
            fatal(&err);
        }
        self.allocated_size -= block_size;
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

impl MemoryUsage for HeapAllocator {
    fn used_memory(&self) -> usize {
        self.allocated_size
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.max_size.saturating_sub(self.allocated_size))
    }
}

impl Drop for HeapAllocator {
    fn drop(&mut self) {
        if self.heap.is_some() && self.allocated_size != 0 {
            warn!(
                allocated_bytes = self.allocated_size,
                "HeapAllocator dropped without shutdown; releasing pool with live blocks"
            );
        }
    }
}
