//! Allocators built on process-owned pools
//!
//! - [`MallocAllocator`] - pass-through to the C heap
//! - [`LinearAllocator`] - monotonic bump arena, cleared as a whole
//! - [`StackAllocator`] - LIFO bump arena with markers and RAII frames
//! - [`DoubleStackAllocator`] - two opposing stacks sharing one pool
//! - [`HeapAllocator`] - general-purpose TLSF heap with leak detection
//!
//! Every pool-backed allocator obtains its bytes from the host heap once, in
//! `init`, and returns them in `shutdown` (or on drop).

mod bump;

pub mod double_stack;
pub mod heap;
pub mod linear;
pub mod malloc;
pub mod stack;

pub use crate::core::traits::{Allocator, Lifecycle, MemoryUsage};
pub use double_stack::{BottomMarker, DoubleStackAllocator, TopMarker};
pub use heap::HeapAllocator;
pub use linear::LinearAllocator;
pub use malloc::{MALLOC_ALIGN, MallocAllocator};
pub use stack::{StackAllocator, StackConfig, StackFrame, StackMarker};
