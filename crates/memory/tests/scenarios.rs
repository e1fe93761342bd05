//! End-to-end allocator scenarios

mod common;

use common::CapturedLogs;
use lumen_memory::allocator::{
    Allocator, DoubleStackAllocator, HeapAllocator, Lifecycle, LinearAllocator, MallocAllocator,
    StackAllocator,
};
use lumen_memory::core::size::MB;
use lumen_memory::MemoryError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn linear_clear_reuses_pool_start() {
    common::init_tracing();
    let mut arena = LinearAllocator::with_capacity(1024).unwrap();

    let p1 = arena.acquire(16, 1).unwrap();
    let p2 = arena.acquire(20, 4).unwrap();
    let p3 = arena.acquire(10, 1).unwrap();
    assert!(p1 < p2 && p2 < p3);

    arena.clear();
    let p4 = arena.acquire(10, 1).unwrap();
    assert_eq!(p4, p1);
}

#[test]
fn stack_release_rewinds_to_released_block() {
    common::init_tracing();
    let mut stack = StackAllocator::with_capacity(1024).unwrap();

    let _a1 = stack.acquire(16, 1).unwrap();
    let a2 = stack.acquire(20, 1).unwrap();
    let _a3 = stack.acquire(10, 1).unwrap();

    stack.release(a2);
    let a32 = stack.acquire(10, 1).unwrap();
    assert_eq!(a32, a2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// 1000 requests in [8, 4096) at alignment 16 overflow a 1 MiB heap, so
    /// some of them fail; releasing the ones that succeeded, newest first,
    /// must leave nothing behind.
    #[test]
    fn heap_randomized_acquire_then_reverse_release(
        sizes in prop::collection::vec(8usize..4096, 1000),
    ) {
        let logs = CapturedLogs::new();
        logs.capture(|| {
            let mut heap = HeapAllocator::with_capacity(MB).unwrap();

            let live: Vec<_> = sizes
                .iter()
                .filter_map(|&size| heap.acquire(size, 16))
                .collect();
            assert!(!live.is_empty());
            for ptr in &live {
                assert_eq!(ptr.as_ptr() as usize % 16, 0);
            }
            assert!(heap.allocated_size() <= heap.max_size());

            for &ptr in live.iter().rev() {
                heap.release(ptr);
            }
            assert_eq!(heap.allocated_size(), 0);
            heap.check().unwrap();

            heap.shutdown();
            assert!(!heap.is_initialized());
        });
        prop_assert!(logs.contents().contains("all memory free"));
    }
}

#[test]
fn heap_leak_is_reported_with_block() {
    let logs = CapturedLogs::new();
    let (address, result) = logs.capture(|| {
        let mut heap = HeapAllocator::with_capacity(64 * 1024).unwrap();
        let leaked = heap.acquire(100, 8).unwrap();
        (leaked.as_ptr() as usize, heap.try_shutdown())
    });

    assert_eq!(result, Err(MemoryError::leak_on_shutdown(104, 1)));
    let output = logs.contents();
    assert!(output.contains("Found active allocation"), "{output}");
    assert!(output.contains(&format!("{address:#x}")), "{output}");
    assert!(output.contains("size=104"), "{output}");
}

#[test]
#[should_panic(expected = "104 bytes still allocated in 1 block(s)")]
fn heap_leak_at_shutdown_is_fatal() {
    common::init_tracing();
    let mut heap = HeapAllocator::with_capacity(64 * 1024).unwrap();
    let _leaked = heap.acquire(100, 8).unwrap();
    heap.shutdown();
}

#[test]
fn double_stack_ends_do_not_meet() {
    common::init_tracing();
    let mut stacks = DoubleStackAllocator::with_capacity(1024).unwrap();

    stacks.acquire_bottom(100, 1).unwrap();
    stacks.acquire_top(200, 1).unwrap();
    assert_eq!(stacks.bottom(), 100);
    assert_eq!(stacks.top(), 824);

    // new_bottom >= top
    assert_eq!(stacks.acquire_bottom(724, 1), None);
    assert_eq!(stacks.acquire_bottom(800, 1), None);
    // new_top <= bottom
    assert_eq!(stacks.acquire_top(724, 1), None);
    assert_eq!(stacks.acquire_top(900, 1), None);
    assert_eq!((stacks.bottom(), stacks.top()), (100, 824));

    // the last byte between them is still usable from either end
    assert!(stacks.acquire_bottom(723, 1).is_some());
}

#[test]
fn double_stack_top_marker_restores_top() {
    common::init_tracing();
    let mut stacks = DoubleStackAllocator::with_capacity(1024).unwrap();
    stacks.acquire_top(100, 1).unwrap();

    let marker = stacks.get_top_marker();
    let t = stacks.top();
    stacks.acquire_top(50, 1).unwrap();
    assert_eq!(stacks.top(), t - 50);

    stacks.free_top_marker(marker);
    assert_eq!(stacks.top(), marker.position());
    assert_eq!(stacks.top(), t);
}

#[test]
fn malloc_drop_frees_live_blocks_with_warning() {
    let logs = CapturedLogs::new();
    logs.capture(|| {
        let mut allocator = MallocAllocator::new();
        let kept = allocator.acquire(64, 8).unwrap();
        allocator.acquire(128, 16).unwrap();
        let released = allocator.acquire(32, 1).unwrap();
        allocator.release(released);

        // SAFETY: 64 writable bytes were just acquired.
        unsafe { kept.as_ptr().write_bytes(0x3C, 64) };
        assert_eq!(allocator.live_blocks(), 2);
    });

    let output = logs.contents();
    assert!(output.contains("WARN"), "{output}");
    assert!(
        output.contains("MallocAllocator dropped with live blocks; freeing them"),
        "{output}"
    );
    assert!(output.contains("blocks=2"), "{output}");
}

#[test]
fn malloc_drop_without_live_blocks_is_silent() {
    let logs = CapturedLogs::new();
    logs.capture(|| {
        let mut allocator = MallocAllocator::new();
        let ptr = allocator.acquire(64, 8).unwrap();
        allocator.release(ptr);
    });

    assert!(!logs.contents().contains("MallocAllocator dropped"));
}
