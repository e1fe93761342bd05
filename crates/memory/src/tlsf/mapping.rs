//! Size-class mapping for the two-level index
//!
//! Block sizes are split into first-level classes by power of two and each
//! first-level class into `SL_INDEX_COUNT` linear second-level classes. Sizes
//! below `SMALL_BLOCK_SIZE` all live in first-level class 0, one second-level
//! class per `ALIGN_SIZE` step.

pub(crate) const ALIGN_SIZE_LOG2: u32 = 3;
/// Granularity of every block size and address in the pool
pub const ALIGN_SIZE: usize = 1 << ALIGN_SIZE_LOG2;

pub(crate) const SL_INDEX_COUNT_LOG2: u32 = 5;
pub(crate) const SL_INDEX_COUNT: usize = 1 << SL_INDEX_COUNT_LOG2;

#[cfg(target_pointer_width = "64")]
pub(crate) const FL_INDEX_MAX: u32 = 39;
#[cfg(not(target_pointer_width = "64"))]
pub(crate) const FL_INDEX_MAX: u32 = 30;

pub(crate) const FL_INDEX_SHIFT: u32 = SL_INDEX_COUNT_LOG2 + ALIGN_SIZE_LOG2;
pub(crate) const FL_INDEX_COUNT: usize = (FL_INDEX_MAX - FL_INDEX_SHIFT + 1) as usize;
pub(crate) const SMALL_BLOCK_SIZE: usize = 1 << FL_INDEX_SHIFT;

/// Smallest block the pool hands out or keeps on a free list
pub const BLOCK_SIZE_MIN: usize = 16;
/// Blocks (and pools) must be strictly smaller than this
pub const BLOCK_SIZE_MAX: usize = 1 << FL_INDEX_MAX;

const _: () = assert!(FL_INDEX_COUNT <= u32::BITS as usize);
const _: () = assert!(SL_INDEX_COUNT <= u32::BITS as usize);

#[inline]
fn floor_log2(size: usize) -> u32 {
    debug_assert!(size > 0);
    usize::BITS - 1 - size.leading_zeros()
}

/// Class a free block of `size` bytes is filed under
#[inline]
pub(crate) fn mapping_insert(size: usize) -> (usize, usize) {
    if size < SMALL_BLOCK_SIZE {
        (0, size / (SMALL_BLOCK_SIZE / SL_INDEX_COUNT))
    } else {
        let fl = floor_log2(size);
        let sl = (size >> (fl - SL_INDEX_COUNT_LOG2)) ^ SL_INDEX_COUNT;
        ((fl - (FL_INDEX_SHIFT - 1)) as usize, sl)
    }
}

/// First class whose every block can hold `size` bytes
///
/// Rounds the request up to the next second-level boundary so any block found
/// at or above the returned class is large enough. `None` when the request is
/// beyond the largest class.
#[inline]
pub(crate) fn mapping_search(size: usize) -> Option<(usize, usize)> {
    let size = if size >= SMALL_BLOCK_SIZE {
        let round = (1_usize << (floor_log2(size) - SL_INDEX_COUNT_LOG2)) - 1;
        size.checked_add(round)?
    } else {
        size
    };

    let (fl, sl) = mapping_insert(size);
    (fl < FL_INDEX_COUNT).then_some((fl, sl))
}

/// Smallest size in class `(fl, sl)`
#[cfg(test)]
fn class_floor(fl: usize, sl: usize) -> usize {
    if fl == 0 {
        sl * (SMALL_BLOCK_SIZE / SL_INDEX_COUNT)
    } else {
        let log2 = fl as u32 + FL_INDEX_SHIFT - 1;
        (1 << log2) + (sl << (log2 - SL_INDEX_COUNT_LOG2))
    }
}
