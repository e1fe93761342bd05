//! Public macros for lumen-memory crate

/// Acquire memory, recording the call site
///
/// Expands to [`Allocator::acquire_annotated`](crate::allocator::Allocator::acquire_annotated)
/// with `file!()` and `line!()`, which are logged at TRACE level. The result
/// is the same as a plain `acquire`.
///
/// # Examples
/// ```
/// use lumen_memory::acquire;
/// use lumen_memory::allocator::LinearAllocator;
///
/// let mut arena = LinearAllocator::with_capacity(256)?;
/// let ptr = acquire!(&mut arena, 64, 16).unwrap();
/// assert_eq!(ptr.as_ptr() as usize % 16, 0);
/// # Ok::<(), lumen_memory::MemoryError>(())
/// ```
#[macro_export]
macro_rules! acquire {
    ($allocator:expr, $size:expr, $alignment:expr $(,)?) => {
        $crate::allocator::Allocator::acquire_annotated(
            $allocator,
            $size,
            $alignment,
            ::core::file!(),
            ::core::line!(),
        )
    };
}
