use std::collections::VecDeque;
use std::rc::Rc;

use crate::block::RangeBlock;
use crate::error::Result;
use crate::loader::RangeLoader;
use crate::sidecar::RecordEntry;

/// Default number of symbols fetched per block
pub const DEFAULT_BLOCK_SIZE: usize = 4096;
/// Default bound on resident blocks per provider
pub const DEFAULT_MAX_BLOCKS: usize = 5;

/// A bounded cache of [`RangeBlock`]s keyed by raw coordinate range
///
/// On a miss the cache invokes its injected [`RangeLoader`] for a block-sized,
/// block-aligned region and admits the result. Admission is bounded: once
/// `max_blocks` blocks are resident, the oldest-admitted block is evicted
/// first (FIFO). Resident ranges are pairwise disjoint because loads are
/// always aligned to `block_size` and a region is never admitted twice.
///
/// Cache-owned blocks are never mutated after insertion; eviction never
/// touches edit overlays, which live in the
/// [`EditOverlayStore`](crate::EditOverlayStore).
pub struct BlockCache {
    /// Number of symbols requested per load
    block_size: usize,

    /// Bound on resident blocks
    max_blocks: usize,

    /// Resident blocks in admission order (front = oldest)
    blocks: VecDeque<RangeBlock>,

    /// Source of raw symbol data
    loader: Rc<dyn RangeLoader>,
}

impl BlockCache {
    #[must_use]
    pub fn new(loader: Rc<dyn RangeLoader>) -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_blocks: DEFAULT_MAX_BLOCKS,
            blocks: VecDeque::new(),
            loader,
        }
    }

    /// Number of symbols fetched per block
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Sets the block size for future loads.
    ///
    /// Takes effect for blocks admitted after the call; intended to be tuned
    /// before the first access.
    pub fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size.max(1);
    }

    /// Bound on resident blocks
    #[must_use]
    pub fn max_blocks(&self) -> usize {
        self.max_blocks
    }

    pub fn set_max_blocks(&mut self, max_blocks: usize) {
        self.max_blocks = max_blocks.max(1);
    }

    /// Number of currently resident blocks
    #[must_use]
    pub fn n_resident(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the block containing the raw `position`, loading it on a miss.
    ///
    /// `Ok(None)` signals end-of-data: the loader had nothing for the aligned
    /// region, or the region's block ends before `position`. Callers treat
    /// that as an out-of-range sentinel, not an error.
    pub fn get(&mut self, position: u64, entry: &RecordEntry) -> Result<Option<&RangeBlock>> {
        if let Some(found) = self.blocks.iter().position(|b| b.contains(position)) {
            return Ok(Some(&self.blocks[found]));
        }

        let aligned = position - position % self.block_size as u64;

        // A resident block already starts at this alignment but does not
        // contain the position, so the position is past the source tail.
        if self.blocks.iter().any(|b| b.start() == aligned) {
            return Ok(None);
        }

        let Some(data) = self.loader.load_range(aligned, self.block_size, entry)? else {
            return Ok(None);
        };
        if data.is_empty() {
            return Ok(None);
        }

        if self.blocks.len() >= self.max_blocks {
            self.blocks.pop_front();
        }
        let block = RangeBlock::new(aligned, data);
        let satisfied = block.contains(position);
        self.blocks.push_back(block);

        if satisfied {
            Ok(self.blocks.back())
        } else {
            Ok(None)
        }
    }
}
