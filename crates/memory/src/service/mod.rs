//! Process-wide memory service
//!
//! [`MemoryService`] owns the system heap every other subsystem draws its
//! dynamic memory from. Host applications should own one explicitly
//! ([`MemoryService::new`]); [`MemoryService::instance`] exists for call sites
//! that have no handle to pass around.

use core::ptr::NonNull;

use parking_lot::{Mutex, MutexGuard, const_mutex};
use tracing::{debug, info};

pub mod config;

pub use config::{DEFAULT_MAXIMUM_DYNAMIC_SIZE, MemoryServiceConfiguration};

use crate::allocator::{HeapAllocator, StackAllocator, StackConfig};
use crate::core::traits::{Allocator, Lifecycle};
#[cfg(feature = "debug-ui")]
use crate::debug_ui::DebugUi;
use crate::error::{MemoryError, MemoryResult};
#[cfg(feature = "debug-ui")]
use crate::utils::format_bytes;
use crate::utils::is_aligned;

const NAME: &str = "MemoryService";

const SCRATCH_SIZE: usize = 1024;

static INSTANCE: Mutex<MemoryService> = const_mutex(MemoryService::new());

/// Owner of the system heap
#[derive(Debug, Default)]
pub struct MemoryService {
    system_allocator: HeapAllocator,
}

impl MemoryService {
    pub const fn new() -> Self {
        Self {
            system_allocator: HeapAllocator::new(),
        }
    }

    /// Locks the process-wide instance
    ///
    /// The guard is the only way to reach it; hold it for as short as
    /// possible.
    pub fn instance() -> MutexGuard<'static, Self> {
        INSTANCE.lock()
    }

    /// Creates the system heap
    ///
    /// Without a configuration the heap gets
    /// [`DEFAULT_MAXIMUM_DYNAMIC_SIZE`] bytes.
    pub fn init(&mut self, configuration: Option<&MemoryServiceConfiguration>) -> MemoryResult<()> {
        info!("Memory Service Init");

        let size = match configuration {
            Some(configuration) => {
                configuration.validate()?;
                configuration.maximum_dynamic_size
            }
            None => {
                debug!(
                    size = DEFAULT_MAXIMUM_DYNAMIC_SIZE,
                    "no memory service configuration; using the default dynamic size"
                );
                DEFAULT_MAXIMUM_DYNAMIC_SIZE
            }
        };

        self.system_allocator.init(size)
    }

    /// Tears down the system heap; live blocks are a fatal diagnostic
    pub fn shutdown(&mut self) {
        info!("Memory Service Shutdown");
        self.system_allocator.shutdown();
    }

    pub fn is_initialized(&self) -> bool {
        self.system_allocator.is_initialized()
    }

    /// The heap backing dynamic allocations
    pub fn system_allocator(&mut self) -> &mut HeapAllocator {
        &mut self.system_allocator
    }

    /// Self-check of the initialized service
    ///
    /// Acquires and releases a few heap blocks, confirming alignment, that
    /// the memory is writable, and that the live-byte counter returns to its
    /// previous value. Then runs a marker round-trip on a scratch stack.
    pub fn test(&mut self) -> MemoryResult<()> {
        if !self.is_initialized() {
            return Err(MemoryError::not_initialized(NAME));
        }

        let heap = &mut self.system_allocator;
        let before = heap.allocated_size();

        let mut blocks: Vec<(NonNull<u8>, usize)> = Vec::new();
        let mut failure = None;
        for (size, alignment) in [(16, 1), (64, 16), (256, 64), (24, 8)] {
            let Some(ptr) = heap.acquire(size, alignment) else {
                failure = Some(MemoryError::allocation_failed(size, alignment));
                break;
            };
            if !is_aligned(ptr.as_ptr() as usize, alignment) {
                failure = Some(MemoryError::invalid_operation(format!(
                    "heap returned {ptr:p} for alignment {alignment}"
                )));
            }
            // SAFETY: ptr is a live heap block of at least `size` bytes.
            unsafe { core::ptr::write_bytes(ptr.as_ptr(), 0xA5, size) };
            blocks.push((ptr, size));
            if failure.is_some() {
                break;
            }
        }

        for &(ptr, _) in blocks.iter().rev() {
            heap.release(ptr);
        }
        if let Some(err) = failure {
            return Err(err);
        }

        if heap.allocated_size() != before {
            return Err(MemoryError::invalid_operation(format!(
                "heap holds {} live bytes after self-test, expected {before}",
                heap.allocated_size()
            )));
        }
        heap.check()?;

        let mut scratch = StackAllocator::with_config(StackConfig::production());
        scratch.init(SCRATCH_SIZE)?;
        let result = scratch_round_trip(&mut scratch);
        scratch.shutdown();
        result?;

        debug!(blocks = blocks.len(), "Memory Service self-test passed");
        Ok(())
    }

    /// Renders the "Memory Service" panel
    #[cfg(feature = "debug-ui")]
    pub fn debug_ui(&self, ui: &mut dyn DebugUi) {
        if !ui.begin_panel("Memory Service") {
            return;
        }

        ui.text(&format!(
            "System heap: {} of {}",
            format_bytes(self.system_allocator.allocated_size()),
            format_bytes(self.system_allocator.max_size())
        ));
        self.system_allocator.debug_ui(ui);

        ui.end_panel();
    }
}

/// Acquires below and above a marker, then rewinds to it
fn scratch_round_trip(scratch: &mut StackAllocator) -> MemoryResult<()> {
    fn acquire(scratch: &mut StackAllocator, size: usize, alignment: usize) -> MemoryResult<()> {
        scratch
            .acquire(size, alignment)
            .map(|_| ())
            .ok_or_else(|| MemoryError::allocation_failed(size, alignment))
    }

    acquire(scratch, 32, 8)?;
    let marker = scratch.get_marker();
    for alignment in [1, 16, 64] {
        acquire(scratch, 48, alignment)?;
    }

    scratch.free_marker(marker);
    if scratch.allocated_size() != marker.position() {
        return Err(MemoryError::invalid_operation(
            "scratch stack did not rewind to its marker",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> MemoryServiceConfiguration {
        MemoryServiceConfiguration::new(256 * 1024)
    }

    #[test]
    fn init_with_configuration() {
        let mut service = MemoryService::new();
        service.init(Some(&small())).unwrap();
        assert_eq!(service.system_allocator().max_size(), 256 * 1024);
        service.test().unwrap();
        service.shutdown();
        assert!(!service.is_initialized());
    }

    #[test]
    fn init_without_configuration_uses_default() {
        let mut service = MemoryService::new();
        service.init(None).unwrap();
        assert_eq!(
            service.system_allocator().max_size(),
            DEFAULT_MAXIMUM_DYNAMIC_SIZE
        );
        service.shutdown();
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let mut service = MemoryService::new();
        let err = service
            .init(Some(&MemoryServiceConfiguration::new(4)))
            .unwrap_err();
        assert_eq!(err.code(), "MEM:CONFIG:INVALID");
        assert!(!service.is_initialized());
    }

    #[test]
    fn self_test_requires_init() {
        let mut service = MemoryService::new();
        assert_eq!(service.test().unwrap_err().code(), "MEM:LIFECYCLE:UNINIT");
    }

    #[test]
    fn self_test_reports_exhaustion() {
        let mut service = MemoryService::new();
        service
            .init(Some(&MemoryServiceConfiguration::new(128)))
            .unwrap();
        let err = service.test().unwrap_err();
        assert_eq!(err.code(), "MEM:ALLOC:FAILED");
        assert_eq!(service.system_allocator().allocated_size(), 0);
        service.shutdown();
    }

    #[test]
    fn scratch_round_trip_rewinds() {
        let mut scratch = StackAllocator::with_capacity(SCRATCH_SIZE).unwrap();
        scratch_round_trip(&mut scratch).unwrap();
        assert_eq!(scratch.allocated_size(), 32);
    }

    #[test]
    fn scratch_round_trip_reports_exhaustion() {
        let mut scratch = StackAllocator::with_capacity(64).unwrap();
        let err = scratch_round_trip(&mut scratch).unwrap_err();
        assert_eq!(err, MemoryError::allocation_failed(48, 1));
    }

    #[test]
    fn scratch_round_trip_reports_exhaustion_before_marker() {
        let mut scratch = StackAllocator::with_capacity(16).unwrap();
        let err = scratch_round_trip(&mut scratch).unwrap_err();
        assert_eq!(err, MemoryError::allocation_failed(32, 8));
    }

    #[cfg(feature = "debug-ui")]
    #[test]
    fn debug_ui_panel() {
        use crate::debug_ui::TextPanel;

        let mut service = MemoryService::new();
        service.init(Some(&small())).unwrap();

        let mut panel = TextPanel::new();
        service.debug_ui(&mut panel);
        assert_eq!(panel.lines()[0], "[Memory Service]");
        assert_eq!(panel.lines()[1], "  System heap: 0 B of 256.00 KB");
        assert_eq!(panel.lines()[2], "  [Heap]");

        service.shutdown();
    }
}
