//! Table-driven checks across allocators and configurations

mod common;

use lumen_memory::allocator::{
    Allocator, HeapAllocator, Lifecycle, LinearAllocator, MallocAllocator, StackAllocator,
    MALLOC_ALIGN,
};
use lumen_memory::service::MemoryServiceConfiguration;
use lumen_memory::tlsf::Tlsf;
use rstest::{fixture, rstest};

#[fixture]
fn heap() -> HeapAllocator {
    common::init_tracing();
    HeapAllocator::with_capacity(256 * 1024).unwrap()
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(8)]
#[case(16)]
#[case(64)]
#[case(256)]
#[case(4096)]
fn heap_honours_alignment(mut heap: HeapAllocator, #[case] alignment: usize) {
    let ptr = heap.acquire(100, alignment).unwrap();
    assert_eq!(ptr.as_ptr() as usize % alignment, 0);
    assert!(heap.block_size(ptr).unwrap() >= 100);

    heap.release(ptr);
    assert_eq!(heap.allocated_size(), 0);
    heap.shutdown();
}

#[rstest]
#[case::linear(Box::new(LinearAllocator::with_capacity(8192).unwrap()))]
#[case::stack(Box::new(StackAllocator::with_capacity(8192).unwrap()))]
#[case::heap(Box::new(HeapAllocator::with_capacity(8192).unwrap()))]
fn zero_size_requests_are_none(#[case] mut allocator: Box<dyn Allocator>) {
    assert_eq!(allocator.acquire(0, 1), None);
    assert_eq!(allocator.acquire(0, 64), None);
}

#[rstest]
#[case::linear(Box::new(LinearAllocator::with_capacity(512).unwrap()), 512)]
#[case::stack(Box::new(StackAllocator::with_capacity(512).unwrap()), 512)]
#[case::heap(Box::new(HeapAllocator::with_capacity(512).unwrap()), 512 - Tlsf::size_overhead())]
fn oversized_requests_are_none(#[case] mut allocator: Box<dyn Allocator>, #[case] capacity: usize) {
    assert_eq!(allocator.acquire(capacity + 1, 1), None, "{}", allocator.name());
}

#[rstest]
#[case(1)]
#[case(4)]
#[case(MALLOC_ALIGN)]
fn malloc_within_host_alignment(#[case] alignment: usize) {
    let mut allocator = MallocAllocator::new();
    let ptr = allocator.acquire(48, alignment).unwrap();
    assert_eq!(ptr.as_ptr() as usize % alignment, 0);
    allocator.release(ptr);
}

#[rstest]
#[case(r#"{}"#, Some(32 * 1024 * 1024 + 24))]
#[case(r#"{"maximum_dynamic_size": 65536}"#, Some(65536))]
#[case(r#"{"maximum_dynamic_size": 32}"#, Some(32))]
#[case(r#"{"maximum_dynamic_size": 31}"#, None)]
#[case(r#"{"maximum_dynamic_size": -1}"#, None)]
#[case(r#"not json"#, None)]
fn configuration_documents(#[case] json: &str, #[case] expected: Option<usize>) {
    let parsed = MemoryServiceConfiguration::from_json(json).ok();
    assert_eq!(parsed.map(|config| config.maximum_dynamic_size), expected);
}

#[rstest]
#[case(0)]
#[case(16)]
fn heap_init_rejects_unusable_sizes(#[case] size: usize) {
    let mut heap = HeapAllocator::new();
    assert!(heap.init(size).is_err());
    assert!(!heap.is_initialized());
}
