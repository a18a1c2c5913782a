//! Process-wide slab/bitmap allocator used as the backing allocator for the
//! rest of the Qentem core.
//!
//! A [`Reserver`] owns a list of [`Block`]s, each a fixed-size, OS-backed
//! region of memory plus a bitmap that tracks which fixed-size `CELL` cells
//! within it are in use. Allocation walks the block list looking for a run
//! of free cells; if none fits, a new block is grown to
//! `max(BLOCK, next_power_of_two(n))` bytes.
//!
//! The first block ever created is canonical and is never freed, so
//! [`Reserver::total_blocks`] is always at least 1 once any allocation has
//! happened. Every other block is dropped the moment a `release` leaves it
//! fully empty.

mod bitmap;
mod block;
mod error;

use std::ptr::NonNull;

pub use error::ReserverError;

use block::Block;

/// Default cell granularity in bytes, matching the original engine's
/// `sizeof(void*) * 2` on a 64-bit target.
pub const DEFAULT_CELL: usize = 16;
/// Default block size in bytes (one page).
pub const DEFAULT_BLOCK: usize = 4096;

/// A slab/bitmap allocator. `CELL` is the allocation granularity in bytes;
/// `BLOCK` is the size of a freshly grown block when nothing else fits.
#[derive(Debug, Default)]
pub struct Reserver<const CELL: usize = DEFAULT_CELL, const BLOCK: usize = DEFAULT_BLOCK> {
    blocks: Vec<Block>,
}

impl<const CELL: usize, const BLOCK: usize> Reserver<CELL, BLOCK> {
    /// Creates an empty reserver. No block is allocated until the first
    /// `reserve` call.
    #[must_use]
    pub const fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    fn cells_needed(n: usize) -> usize {
        if n == 0 { 1 } else { n.div_ceil(CELL) }
    }

    /// Reserves at least `n` bytes and returns a pointer to the start of the
    /// allocation. Never returns null; grows a new block on the caller's
    /// behalf when no existing block has a large enough free run.
    ///
    /// # Errors
    /// Returns [`ReserverError::OutOfMemory`] if the OS allocator fails to
    /// provide a new block.
    pub fn reserve(&mut self, n: usize) -> Result<NonNull<u8>, ReserverError> {
        let needed = Self::cells_needed(n);

        for block in &mut self.blocks {
            if let Some(start_cell) = block.find_free_run(needed) {
                block.mark_used(start_cell, needed);
                return Ok(block.cell_ptr(start_cell));
            }
        }

        let grown = BLOCK.max((n.max(1)).next_power_of_two());
        let mut block = Block::new(grown, CELL)?;
        let start_cell = block.find_free_run(needed).expect("fresh block always fits");
        block.mark_used(start_cell, needed);
        let ptr = block.cell_ptr(start_cell);
        self.blocks.push(block);
        Ok(ptr)
    }

    fn locate_mut(&mut self, ptr: NonNull<u8>) -> Option<(usize, usize)> {
        for (index, block) in self.blocks.iter().enumerate() {
            if let Some(cell) = block.cell_index(ptr) {
                return Some((index, cell));
            }
        }
        None
    }

    /// Releases an allocation of `n` bytes previously returned by
    /// [`Reserver::reserve`] (or shrunk/expanded since). Any non-canonical
    /// block (index != 0) that becomes fully empty as a result is dropped
    /// immediately.
    pub fn release(&mut self, ptr: NonNull<u8>, n: usize) {
        let Some((index, start_cell)) = self.locate_mut(ptr) else {
            return;
        };
        let needed = Self::cells_needed(n);
        let block = &mut self.blocks[index];
        block.mark_free(start_cell, needed);

        if index != 0 && block.is_empty() {
            self.blocks.remove(index);
        }
    }

    /// Attempts to grow an allocation in place from `old` to `new` bytes.
    /// Succeeds only if the cells immediately following the current
    /// allocation are free and within the same block; this is all-or-nothing
    /// (no partial expansion). Returns the achieved size: `new` on success,
    /// `old` otherwise.
    pub fn try_expand(&mut self, ptr: NonNull<u8>, old: usize, new: usize) -> usize {
        if new <= old {
            return old;
        }
        let Some((index, start_cell)) = self.locate_mut(ptr) else {
            return old;
        };
        let old_needed = Self::cells_needed(old);
        let new_needed = Self::cells_needed(new);
        let extra = new_needed - old_needed;

        let block = &mut self.blocks[index];
        if block.run_is_free(start_cell + old_needed, extra) {
            block.mark_used(start_cell + old_needed, extra);
            new
        } else {
            old
        }
    }

    /// Shrinks an allocation from `old` to `new` bytes, releasing the
    /// trailing cells. Always succeeds when `new <= old`.
    pub fn shrink(&mut self, ptr: NonNull<u8>, old: usize, new: usize) -> bool {
        if new > old {
            return false;
        }
        let Some((index, start_cell)) = self.locate_mut(ptr) else {
            return false;
        };
        let old_needed = Self::cells_needed(old);
        let new_needed = Self::cells_needed(new);
        if new_needed < old_needed {
            let block = &mut self.blocks[index];
            block.mark_free(start_cell + new_needed, old_needed - new_needed);
        }
        true
    }

    /// True iff every block currently held is fully free. Given that
    /// non-canonical empty blocks are dropped eagerly, this is true iff
    /// there is at most one block and it is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Block::is_empty)
    }

    /// Number of blocks currently held (0 before the first allocation).
    #[must_use]
    pub fn total_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Iterates over the blocks currently held, exposing each one's usable
    /// size in bytes. Mirrors the original engine's `GetBlocks()` accessor,
    /// used by tests that need to drive a reserve that exactly fills a
    /// block.
    pub fn blocks(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.iter().map(Block::usable_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==== basic reserve/release ====

    #[test]
    fn reserve_then_release_collapses_to_one_block() {
        const SIZE: usize = 16;
        const PAGE: usize = 4096;
        let mut r: Reserver<SIZE, PAGE> = Reserver::new();

        let v1 = r.reserve(SIZE).unwrap();
        let v2 = r.reserve(SIZE).unwrap();
        let v3 = r.reserve(PAGE * 2).unwrap();
        let v4 = r.reserve(PAGE * 2).unwrap();
        r.release(v3, PAGE * 2);
        r.release(v1, SIZE);
        r.release(v2, SIZE);
        r.release(v4, PAGE * 2);

        assert!(r.is_empty());
        assert_eq!(r.total_blocks(), 1);
    }

    #[test]
    fn repeated_growth_and_shrink_returns_to_one_block() {
        let mut r: Reserver = Reserver::new();
        let mut allocations = Vec::new();
        let mut size = 16usize;
        for _ in 0..10 {
            let ptr = r.reserve(size).unwrap();
            allocations.push((ptr, size));
            if allocations.len() > 1 {
                let (p, s) = allocations.remove(0);
                r.release(p, s);
            }
            size *= 2;
        }
        for (p, s) in allocations {
            r.release(p, s);
        }
        assert!(r.is_empty());
        assert_eq!(r.total_blocks(), 1);
    }

    // ==== shrink ====

    #[test]
    fn shrink_frees_trailing_cells_for_reuse() {
        let mut r: Reserver<16, { 4 * 1024 }> = Reserver::new();

        let v1 = r.reserve(48).unwrap();
        assert!(r.shrink(v1, 48, 16));

        let v2 = r.reserve(16).unwrap();
        // v2 should immediately follow the 16 bytes retained by v1.
        assert_eq!(unsafe { v1.as_ptr().add(16) }, v2.as_ptr());

        r.release(v1, 16);
        r.release(v2, 16);
        assert!(r.is_empty());
        assert_eq!(r.total_blocks(), 1);
    }

    #[test]
    fn non_canonical_block_collapses_on_full_release() {
        let mut r: Reserver<16, { 4 * 1024 }> = Reserver::new();
        let max = r.blocks().next().unwrap_or(4 * 1024);
        let half = max / 2;

        let v1 = r.reserve(max).unwrap();
        assert!(r.shrink(v1, max, half));
        assert!(!r.is_empty());
        assert_eq!(r.total_blocks(), 1);

        let v2 = r.reserve(8 * 1024).unwrap();
        assert_eq!(r.total_blocks(), 2);

        r.release(v2, 8 * 1024);
        assert!(!r.is_empty());
        assert_eq!(r.total_blocks(), 1);

        r.release(v1, half);
        assert!(r.is_empty());
        assert_eq!(r.total_blocks(), 1);
    }

    // ==== expand ====

    #[test]
    fn expand_in_place_when_trailing_cells_are_free() {
        let mut r: Reserver<16, { 8 * 1024 }> = Reserver::new();

        let v1 = r.reserve(16).unwrap();
        assert_eq!(r.try_expand(v1, 16, 32), 32);
        r.release(v1, 32);
        assert!(r.is_empty());
    }

    #[test]
    fn expand_fails_all_or_nothing_when_blocked() {
        let mut r: Reserver<16, { 8 * 1024 }> = Reserver::new();

        let v1 = r.reserve(64).unwrap();
        let v2 = r.reserve(64).unwrap();

        assert!(r.shrink(v1, 64, 16));
        // Only 3 cells (48 bytes) are free before v2 blocks the run at cell 4;
        // expanding to 128 bytes (8 cells) needs more than that and fails wholesale.
        assert_eq!(r.try_expand(v1, 16, 128), 16);
        // Expanding to exactly 64 bytes (4 cells) fits in the freed run and succeeds.
        assert_eq!(r.try_expand(v1, 16, 64), 64);

        r.release(v1, 64);
        r.release(v2, 64);
        assert!(r.is_empty());
    }
}
