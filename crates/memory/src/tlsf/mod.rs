//! Two-level segregated-fit pool
//!
//! [`Tlsf`] manages a caller-provided region of bytes as a set of physically
//! contiguous blocks. Free blocks are filed into size classes indexed by a
//! first-level bitmap (power of two) and per-class second-level bitmaps (32
//! linear subdivisions), so finding a block large enough for a request is a
//! pair of bit scans.
//!
//! Block metadata is kept out of band, in a map keyed by offset, instead of in
//! headers inside the managed region. The pool therefore never reads or writes
//! the region itself, and releasing an address that is not the start of a live
//! block is detected and reported instead of corrupting neighbouring blocks.
//!
//! Invariants (checked by [`Tlsf::check`]):
//! - blocks tile `[0, capacity)` without gaps or overlap
//! - every block size is a multiple of [`ALIGN_SIZE`] and at least
//!   [`BLOCK_SIZE_MIN`]
//! - no two free blocks are physical neighbours (freeing coalesces)
//! - a free block is on exactly the free list its size maps to, and a bitmap
//!   bit is set exactly when its list is non-empty
//!
//! Free lists are doubly linked through the block records, so taking a block
//! off its list is O(1) once the record is found; the record lookup is
//! O(log N) in the number of blocks.

use core::fmt;
use core::ptr::NonNull;
use std::collections::BTreeMap;

use tracing::debug;

mod mapping;

use mapping::{FL_INDEX_COUNT, SL_INDEX_COUNT, mapping_insert, mapping_search};
pub use mapping::{ALIGN_SIZE, BLOCK_SIZE_MAX, BLOCK_SIZE_MIN};

use crate::diagnostics::fatal;
use crate::error::{MemoryError, MemoryResult};
use crate::stats::{BlockInfo, PoolWalker};
use crate::utils::{align_down, align_up, checked_align_up, is_aligned};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    size: usize,
    used: bool,
    /// Free-list neighbours; both `None` while the block is not listed
    prev_free: Option<usize>,
    next_free: Option<usize>,
}

impl Block {
    const fn unlisted(size: usize, used: bool) -> Self {
        Self {
            size,
            used,
            prev_free: None,
            next_free: None,
        }
    }
}

#[inline]
fn list_index(fl: usize, sl: usize) -> usize {
    fl * SL_INDEX_COUNT + sl
}

/// TLSF block manager over an externally owned region
pub struct Tlsf {
    base: NonNull<u8>,
    capacity: usize,
    blocks: BTreeMap<usize, Block>,
    fl_bitmap: u32,
    sl_bitmap: [u32; FL_INDEX_COUNT],
    /// Head offset of each free list, `[fl * SL_INDEX_COUNT + sl]`
    free_heads: Vec<Option<usize>>,
}

// SAFETY: Tlsf only does address arithmetic on `base`; it never dereferences
// it, so moving it across threads cannot race on the managed bytes.
unsafe impl Send for Tlsf {}

/// Rounds a request to the pool granularity; `None` for zero or oversized
/// requests.
fn adjust_request_size(size: usize, alignment: usize) -> Option<usize> {
    if size == 0 {
        return None;
    }
    let aligned = checked_align_up(size, alignment)?;
    (aligned < BLOCK_SIZE_MAX).then_some(aligned.max(BLOCK_SIZE_MIN))
}

impl Tlsf {
    /// Bytes at the end of a region that are never handed out
    pub const fn size_overhead() -> usize {
        2 * ALIGN_SIZE
    }

    /// Builds a pool over `[base, base + bytes)`
    ///
    /// The last [`size_overhead`](Self::size_overhead) bytes are reserved as
    /// a terminating sentinel. The caller keeps ownership of the region and
    /// must keep it alive for as long as addresses from this pool are used.
    pub fn create(base: NonNull<u8>, bytes: usize) -> MemoryResult<Self> {
        if !is_aligned(base.as_ptr() as usize, ALIGN_SIZE) {
            return Err(MemoryError::invalid_layout(
                "TLSF pool base must be 8-byte aligned",
            ));
        }

        let capacity = align_down(bytes.saturating_sub(Self::size_overhead()), ALIGN_SIZE);
        if capacity < BLOCK_SIZE_MIN {
            return Err(MemoryError::invalid_layout(&format!(
                "TLSF pool of {bytes} bytes cannot hold a block (needs at least {})",
                Self::size_overhead() + BLOCK_SIZE_MIN
            )));
        }
        if capacity >= BLOCK_SIZE_MAX {
            return Err(MemoryError::invalid_layout(&format!(
                "TLSF pool of {bytes} bytes exceeds the largest block class"
            )));
        }

        let mut tlsf = Self {
            base,
            capacity,
            blocks: BTreeMap::new(),
            fl_bitmap: 0,
            sl_bitmap: [0; FL_INDEX_COUNT],
            free_heads: vec![None; FL_INDEX_COUNT * SL_INDEX_COUNT],
        };
        tlsf.insert_free(0, capacity);

        debug!(base = ?base, capacity, "TLSF pool created");
        Ok(tlsf)
    }

    /// Tears the pool down; the region itself stays with its owner
    pub fn destroy(self) {
        debug!(base = ?self.base, blocks = self.blocks.len(), "TLSF pool destroyed");
    }

    /// Bytes available for blocks
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Acquires a block of at least `size` bytes aligned to [`ALIGN_SIZE`]
    pub fn malloc(&mut self, size: usize) -> Option<NonNull<u8>> {
        let adjusted = adjust_request_size(size, ALIGN_SIZE)?;
        let offset = self.locate_free(adjusted)?;
        self.prepare_used(offset, adjusted)
    }

    /// Acquires a block of at least `size` bytes whose address is a multiple
    /// of `alignment`
    ///
    /// Searches for a block large enough to carve an aligned run out of, and
    /// returns the leading gap to the free lists. A gap smaller than a minimum
    /// block is pushed out by another `alignment` step.
    pub fn memalign(&mut self, alignment: usize, size: usize) -> Option<NonNull<u8>> {
        if !alignment.is_power_of_two() {
            return None;
        }
        if alignment <= ALIGN_SIZE {
            return self.malloc(size);
        }

        let adjusted = adjust_request_size(size, ALIGN_SIZE)?;
        let gap_minimum = BLOCK_SIZE_MIN;
        let with_gap = adjust_request_size(
            adjusted.checked_add(alignment)?.checked_add(gap_minimum)?,
            alignment,
        )?;

        let mut offset = self.locate_free(with_gap)?;

        let block_addr = self.base_addr() + offset;
        let mut aligned = align_up(block_addr, alignment);
        let mut gap = aligned - block_addr;

        if gap != 0 && gap < gap_minimum {
            let step = (gap_minimum - gap).max(alignment);
            aligned = align_up(aligned + step, alignment);
            gap = aligned - block_addr;
        }

        if gap != 0 {
            offset = self.trim_free_leading(offset, gap);
        }
        self.prepare_used(offset, adjusted)
    }

    /// Returns the block starting at `ptr` to the pool
    ///
    /// Coalesces with free physical neighbours. Returns the usable size of
    /// the released block. Fails without touching the pool if `ptr` is not
    /// the start of a live block.
    pub fn free(&mut self, ptr: NonNull<u8>) -> MemoryResult<usize> {
        let offset = self.offset_of(ptr).ok_or_else(|| {
            MemoryError::invalid_operation(format!("{ptr:p} does not belong to this TLSF pool"))
        })?;

        let freed = match self.blocks.get_mut(&offset) {
            Some(block) if block.used => {
                block.used = false;
                block.size
            }
            Some(_) => {
                return Err(MemoryError::invalid_operation(format!(
                    "{ptr:p} is already free"
                )));
            }
            None => {
                return Err(MemoryError::invalid_operation(format!(
                    "{ptr:p} is not the start of a block"
                )));
            }
        };

        let mut start = offset;
        let mut size = freed;

        let prev = self
            .blocks
            .range(..offset)
            .next_back()
            .map(|(&prev_offset, &prev)| (prev_offset, prev));
        if let Some((prev_offset, prev)) = prev
            && !prev.used
        {
            self.remove_free(prev_offset);
            self.blocks.remove(&offset);
            start = prev_offset;
            size += prev.size;
        }

        let next_offset = offset + freed;
        if let Some(&next) = self.blocks.get(&next_offset)
            && !next.used
        {
            self.remove_free(next_offset);
            self.blocks.remove(&next_offset);
            size += next.size;
        }

        self.insert_free(start, size);
        Ok(freed)
    }

    /// Usable size of the live block starting at `ptr`
    pub fn block_size(&self, ptr: NonNull<u8>) -> Option<usize> {
        let offset = self.offset_of(ptr)?;
        self.blocks
            .get(&offset)
            .filter(|block| block.used)
            .map(|block| block.size)
    }

    /// Read-only view for walking the pool
    pub fn pool(&self) -> PoolRef<'_> {
        PoolRef { tlsf: self }
    }

    /// Verifies the structural invariants listed in the module docs
    pub fn check(&self) -> MemoryResult<()> {
        let broken = |reason: String| Err(MemoryError::invalid_operation(reason));

        let mut expected = 0;
        let mut prev_free = false;
        let mut free_blocks = 0;

        for (&offset, block) in &self.blocks {
            if offset != expected {
                return broken(format!("block at {offset} but previous block ends at {expected}"));
            }
            if block.size < BLOCK_SIZE_MIN || !is_aligned(block.size, ALIGN_SIZE) {
                return broken(format!("block at {offset} has invalid size {}", block.size));
            }
            if block.used {
                if block.prev_free.is_some() || block.next_free.is_some() {
                    return broken(format!("used block at {offset} is linked into a free list"));
                }
            } else {
                if prev_free {
                    return broken(format!("free block at {offset} follows a free block"));
                }
                free_blocks += 1;
            }
            prev_free = !block.used;
            expected = offset + block.size;
        }

        if expected != self.capacity {
            return broken(format!("blocks end at {expected}, pool capacity is {}", self.capacity));
        }

        let mut listed = 0;
        for fl in 0..FL_INDEX_COUNT {
            for sl in 0..SL_INDEX_COUNT {
                let mut prev = None;
                let mut cursor = self.free_heads[list_index(fl, sl)];
                while let Some(offset) = cursor {
                    let Some(block) = self.blocks.get(&offset).filter(|block| !block.used) else {
                        return broken(format!("class ({fl}, {sl}) lists {offset}, which is not a free block"));
                    };
                    if mapping_insert(block.size) != (fl, sl) {
                        return broken(format!("free block at {offset} filed under the wrong class ({fl}, {sl})"));
                    }
                    if block.prev_free != prev {
                        return broken(format!("free block at {offset} has a stale back link"));
                    }
                    listed += 1;
                    if listed > free_blocks {
                        return broken(format!("free lists hold more entries than the {free_blocks} free blocks"));
                    }
                    prev = cursor;
                    cursor = block.next_free;
                }

                let flagged = self.sl_bitmap[fl] & (1 << sl) != 0;
                if self.free_heads[list_index(fl, sl)].is_some() != flagged {
                    return broken(format!("second-level bit ({fl}, {sl}) out of sync"));
                }
            }
            if (self.sl_bitmap[fl] != 0) != (self.fl_bitmap & (1 << fl) != 0) {
                return broken(format!("first-level bit {fl} out of sync"));
            }
        }

        if listed != free_blocks {
            return broken(format!("{listed} free-list entries for {free_blocks} free blocks"));
        }

        Ok(())
    }

    #[inline]
    fn base_addr(&self) -> usize {
        self.base.as_ptr() as usize
    }

    #[inline]
    fn offset_of(&self, ptr: NonNull<u8>) -> Option<usize> {
        let offset = (ptr.as_ptr() as usize).checked_sub(self.base_addr())?;
        (offset < self.capacity).then_some(offset)
    }

    #[inline]
    fn ptr_at(&self, offset: usize) -> Option<NonNull<u8>> {
        NonNull::new(self.base.as_ptr().wrapping_add(offset))
    }

    /// Records a free block of `size` bytes at `offset` and pushes it onto
    /// the head of its class list
    fn insert_free(&mut self, offset: usize, size: usize) {
        let (fl, sl) = mapping_insert(size);
        let index = list_index(fl, sl);
        let head = self.free_heads[index];

        self.blocks.insert(
            offset,
            Block {
                next_free: head,
                ..Block::unlisted(size, false)
            },
        );
        if let Some(head) = head
            && let Some(block) = self.blocks.get_mut(&head)
        {
            block.prev_free = Some(offset);
        }

        self.free_heads[index] = Some(offset);
        self.sl_bitmap[fl] |= 1 << sl;
        self.fl_bitmap |= 1 << fl;
    }

    /// Unlinks the listed free block at `offset` from its class list
    ///
    /// The block record stays in place, free but unlisted. A block that is
    /// not on the list its size maps to means the index is corrupt.
    fn remove_free(&mut self, offset: usize) {
        let Some(&block) = self.blocks.get(&offset).filter(|block| !block.used) else {
            fatal(&MemoryError::invalid_operation(format!(
                "TLSF free-list entry {offset} is not a free block"
            )));
        };
        let (fl, sl) = mapping_insert(block.size);
        let index = list_index(fl, sl);

        match block.prev_free {
            Some(prev) => match self.blocks.get_mut(&prev) {
                Some(prev) if prev.next_free == Some(offset) => prev.next_free = block.next_free,
                _ => fatal(&MemoryError::invalid_operation(format!(
                    "TLSF free block {offset} has a broken back link"
                ))),
            },
            None if self.free_heads[index] == Some(offset) => self.free_heads[index] = block.next_free,
            None => fatal(&MemoryError::invalid_operation(format!(
                "TLSF free block {offset} is missing from class ({fl}, {sl})"
            ))),
        }
        if let Some(next) = block.next_free
            && let Some(next) = self.blocks.get_mut(&next)
        {
            next.prev_free = block.prev_free;
        }

        if let Some(unlinked) = self.blocks.get_mut(&offset) {
            unlinked.prev_free = None;
            unlinked.next_free = None;
        }
        if self.free_heads[index].is_none() {
            self.clear_bit(fl, sl);
        }
    }

    fn clear_bit(&mut self, fl: usize, sl: usize) {
        self.sl_bitmap[fl] &= !(1 << sl);
        if self.sl_bitmap[fl] == 0 {
            self.fl_bitmap &= !(1 << fl);
        }
    }

    fn find_suitable(&self, fl: usize, sl: usize) -> Option<(usize, usize)> {
        let mut fl = fl;
        let mut sl_map = self.sl_bitmap[fl] & (u32::MAX << sl);

        if sl_map == 0 {
            let fl_map = self.fl_bitmap & u32::MAX.checked_shl(fl as u32 + 1).unwrap_or(0);
            if fl_map == 0 {
                return None;
            }
            fl = fl_map.trailing_zeros() as usize;
            sl_map = self.sl_bitmap[fl];
        }

        Some((fl, sl_map.trailing_zeros() as usize))
    }

    /// Takes a free block of at least `size` bytes off its free list
    fn locate_free(&mut self, size: usize) -> Option<usize> {
        let (fl, sl) = mapping_search(size)?;
        let (fl, sl) = self.find_suitable(fl, sl)?;

        let offset = self.free_heads[list_index(fl, sl)]?;
        self.remove_free(offset);

        debug_assert!(self.blocks.get(&offset).is_some_and(|b| b.size >= size));
        Some(offset)
    }

    /// Splits `gap` bytes off the front of an unlisted free block and files
    /// them as a free block; returns the offset of the remainder
    fn trim_free_leading(&mut self, offset: usize, gap: usize) -> usize {
        let size = self.blocks.get(&offset).map_or(0, |block| block.size);
        debug_assert!(size >= gap + BLOCK_SIZE_MIN);

        self.blocks.insert(offset + gap, Block::unlisted(size - gap, false));
        self.insert_free(offset, gap);
        offset + gap
    }

    /// Trims an unlisted free block to `size` and marks it used
    fn prepare_used(&mut self, offset: usize, size: usize) -> Option<NonNull<u8>> {
        let block = self.blocks.get_mut(&offset)?;
        block.used = true;

        let remainder = block.size - size;
        if remainder >= BLOCK_SIZE_MIN {
            block.size = size;
            self.insert_free(offset + size, remainder);
        }

        self.ptr_at(offset)
    }
}

impl fmt::Debug for Tlsf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tlsf")
            .field("base", &self.base)
            .field("capacity", &self.capacity)
            .field("blocks", &self.blocks.len())
            .finish()
    }
}

/// Borrowed view of a [`Tlsf`] pool
#[derive(Debug, Clone, Copy)]
pub struct PoolRef<'a> {
    tlsf: &'a Tlsf,
}

impl PoolRef<'_> {
    /// Hands every block, used or free, to `walker` in address order
    pub fn walk(&self, walker: &mut dyn PoolWalker) {
        let base = self.tlsf.base_addr();
        for (&offset, block) in &self.tlsf.blocks {
            walker.visit(BlockInfo {
                address: base + offset,
                size: block.size,
                used: block.used,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HostPool;

    fn pool(bytes: usize) -> (HostPool, Tlsf) {
        let region = HostPool::allocate(bytes).unwrap();
        let tlsf = Tlsf::create(region.base(), bytes).unwrap();
        (region, tlsf)
    }

    fn snapshot(tlsf: &Tlsf) -> Vec<BlockInfo> {
        let mut blocks = Vec::new();
        tlsf.pool().walk(&mut |block: BlockInfo| blocks.push(block));
        blocks
    }

    #[test]
    fn create_reserves_overhead() {
        let (_region, tlsf) = pool(4096);
        assert_eq!(tlsf.capacity(), 4096 - Tlsf::size_overhead());
        tlsf.check().unwrap();

        let blocks = snapshot(&tlsf);
        assert_eq!(blocks.len(), 1);
        assert!(!blocks[0].used);
    }

    #[test]
    fn create_rejects_tiny_and_misaligned_regions() {
        let region = HostPool::allocate(64).unwrap();
        assert!(Tlsf::create(region.base(), Tlsf::size_overhead() + 8).is_err());

        let misaligned = region.at(4);
        assert_eq!(
            Tlsf::create(misaligned, 32).unwrap_err().code(),
            "MEM:ALLOC:LAYOUT"
        );
    }

    #[test]
    fn malloc_rounds_to_granularity() {
        let (_region, mut tlsf) = pool(4096);
        let a = tlsf.malloc(1).unwrap();
        let b = tlsf.malloc(17).unwrap();

        assert_eq!(tlsf.block_size(a), Some(BLOCK_SIZE_MIN));
        assert_eq!(tlsf.block_size(b), Some(24));
        assert!(is_aligned(a.as_ptr() as usize, ALIGN_SIZE));
        assert!(is_aligned(b.as_ptr() as usize, ALIGN_SIZE));
        assert_eq!(tlsf.malloc(0), None);
        tlsf.check().unwrap();
    }

    #[test]
    fn free_coalesces_back_to_one_block() {
        let (_region, mut tlsf) = pool(64 * 1024);
        let a = tlsf.malloc(100).unwrap();
        let b = tlsf.malloc(200).unwrap();
        let c = tlsf.malloc(300).unwrap();

        assert_eq!(tlsf.free(b).unwrap(), 200);
        tlsf.check().unwrap();
        tlsf.free(a).unwrap();
        tlsf.check().unwrap();
        tlsf.free(c).unwrap();
        tlsf.check().unwrap();

        let blocks = snapshot(&tlsf);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].size, tlsf.capacity());
    }

    #[test]
    fn interleaved_frees_share_one_class_list() {
        let count = 4000;
        let (_region, mut tlsf) = pool(count * BLOCK_SIZE_MIN + 4096);
        let blocks: Vec<_> = (0..count).map(|_| tlsf.malloc(BLOCK_SIZE_MIN).unwrap()).collect();

        // every other block: thousands of isolated entries in class (0, 2)
        for ptr in blocks.iter().step_by(2) {
            tlsf.free(*ptr).unwrap();
        }
        tlsf.check().unwrap();
        let free = snapshot(&tlsf).iter().filter(|block| !block.used).count();
        assert_eq!(free, count / 2 + 1);

        // each of these merges with the neighbours on both sides
        for ptr in blocks.iter().skip(1).step_by(2) {
            tlsf.free(*ptr).unwrap();
        }
        tlsf.check().unwrap();

        let blocks = snapshot(&tlsf);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].size, tlsf.capacity());
    }

    #[test]
    fn list_head_is_reused_after_unlink() {
        let (_region, mut tlsf) = pool(4096);
        let a = tlsf.malloc(32).unwrap();
        let _b = tlsf.malloc(32).unwrap();
        let c = tlsf.malloc(32).unwrap();
        let _d = tlsf.malloc(32).unwrap();

        tlsf.free(a).unwrap();
        tlsf.free(c).unwrap();
        tlsf.check().unwrap();

        // the most recently freed block of the class comes back first
        assert_eq!(tlsf.malloc(32), Some(c));
        assert_eq!(tlsf.malloc(32), Some(a));
        tlsf.check().unwrap();
    }

    #[test]
    #[should_panic(expected = "is not a free block")]
    fn unlinking_a_used_block_is_fatal() {
        let (_region, mut tlsf) = pool(4096);
        let a = tlsf.malloc(32).unwrap();
        let offset = tlsf.offset_of(a).unwrap();
        tlsf.remove_free(offset);
    }

    #[test]
    #[should_panic(expected = "is missing from class")]
    fn unlisted_free_block_is_fatal() {
        let (_region, mut tlsf) = pool(4096);
        let a = tlsf.malloc(32).unwrap();
        let offset = tlsf.offset_of(a).unwrap();
        if let Some(block) = tlsf.blocks.get_mut(&offset) {
            block.used = false;
        }
        tlsf.remove_free(offset);
    }

    #[test]
    fn check_detects_stale_links() {
        let (_region, mut tlsf) = pool(4096);
        let a = tlsf.malloc(32).unwrap();
        let offset = tlsf.offset_of(a).unwrap();
        if let Some(block) = tlsf.blocks.get_mut(&offset) {
            block.next_free = Some(offset);
        }
        assert_eq!(tlsf.check().unwrap_err().code(), "MEM:INVALID_OP");
    }

    #[test]
    fn memalign_returns_aligned_blocks() {
        let (_region, mut tlsf) = pool(256 * 1024);
        let mut live = Vec::new();
        for alignment in [16, 32, 64, 256, 4096] {
            let ptr = tlsf.memalign(alignment, 40).unwrap();
            assert!(is_aligned(ptr.as_ptr() as usize, alignment));
            assert!(tlsf.block_size(ptr).unwrap() >= 40);
            live.push(ptr);
        }
        tlsf.check().unwrap();

        for ptr in live {
            tlsf.free(ptr).unwrap();
        }
        tlsf.check().unwrap();
        assert_eq!(snapshot(&tlsf).len(), 1);
    }

    #[test]
    fn memalign_rejects_bad_alignment() {
        let (_region, mut tlsf) = pool(4096);
        assert_eq!(tlsf.memalign(24, 8), None);
    }

    #[test]
    fn exhaustion_is_none() {
        let (_region, mut tlsf) = pool(1024);
        assert_eq!(tlsf.malloc(tlsf.capacity() + ALIGN_SIZE), None);

        let mut count = 0;
        while tlsf.malloc(64).is_some() {
            count += 1;
        }
        assert!(count > 0);
        tlsf.check().unwrap();
    }

    #[test]
    fn foreign_and_double_free_are_errors() {
        let (region, mut tlsf) = pool(4096);
        let a = tlsf.malloc(32).unwrap();
        let b = tlsf.malloc(32).unwrap();

        let inside = region.at(a.as_ptr() as usize - region.base_addr() + 8);
        assert_eq!(tlsf.free(inside).unwrap_err().code(), "MEM:INVALID_OP");

        let mut outside = [0u8; 8];
        assert!(tlsf.free(NonNull::from(&mut outside).cast()).is_err());

        tlsf.free(a).unwrap();
        assert!(tlsf.free(a).is_err());
        assert_eq!(tlsf.block_size(a), None);
        assert_eq!(tlsf.block_size(b), Some(32));
        tlsf.check().unwrap();
    }

    #[test]
    fn walk_reports_used_and_free() {
        let (_region, mut tlsf) = pool(4096);
        let a = tlsf.malloc(64).unwrap();

        let blocks = snapshot(&tlsf);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0],
            BlockInfo {
                address: a.as_ptr() as usize,
                size: 64,
                used: true
            }
        );
        assert!(!blocks[1].used);
        assert_eq!(blocks[0].size + blocks[1].size, tlsf.capacity());
    }
}
