use std::rc::Rc;

use crate::cache::BlockCache;
use crate::error::{ProviderError, Result};
use crate::loader::RangeLoader;
use crate::overlay::EditOverlayStore;
use crate::sidecar::RecordEntry;

/// A virtual, file-backed, editable sequence
///
/// `VirtualSequenceProvider` presents one record of a large flat file as an
/// ordinary indexable, mutable sequence without materializing it. Reads are
/// served from a bounded [`BlockCache`]; writes copy the touched block into
/// an [`EditOverlayStore`] overlay and edit the copy, so the cache itself
/// stays immutable and evictable.
///
/// Three coordinate spaces are kept consistent:
///
/// * **raw**: byte offsets within the untouched record,
/// * **block**: the originally-cached aligned ranges,
/// * **logical**: the 0-based index space seen by the caller after all
///   edits applied so far.
///
/// For every logical index below [`len`](Self::len), exactly one of
/// {an overlay covers it} or {its drift-corrected raw position addresses a
/// never-edited block} holds; overlays and raw blocks partition the logical
/// space with no gaps or double coverage.
///
/// Operations on one provider must come from a single logical owner at a
/// time; overlay range-shifting is not safe under interleaved writers.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
/// use virtseq::{Alphabet, RecordEntry, SliceLoader, VirtualSequenceProvider};
///
/// let loader = Rc::new(SliceLoader::new(b"ACGTACGTAC".to_vec()));
/// let entry = RecordEntry::new(0, 10, Alphabet::Dna, "chr1");
/// let mut provider = VirtualSequenceProvider::new(loader, entry)
///     .with_block_size(4)
///     .with_max_blocks(2);
///
/// assert_eq!(provider.len(), 10);
/// assert_eq!(provider.get(0).unwrap(), Some(b'A'));
///
/// provider.insert_range(4, b"NN").unwrap();
/// assert_eq!(provider.to_vec(), b"ACGTNNACGTAC");
/// ```
pub struct VirtualSequenceProvider {
    /// Logical (post-edit) length of the sequence
    count: usize,

    /// Whether mutation is rejected
    read_only: bool,

    /// Sidecar entry describing the backing record
    entry: RecordEntry,

    /// Bounded cache of raw blocks
    cache: BlockCache,

    /// Edited copies of blocks, in logical coordinates
    overlays: EditOverlayStore,
}

impl VirtualSequenceProvider {
    /// Creates a provider bound to the record described by `entry`, reading
    /// through the shared `loader`.
    #[must_use]
    pub fn new(loader: Rc<dyn RangeLoader>, entry: RecordEntry) -> Self {
        Self {
            count: entry.symbols() as usize,
            read_only: false,
            cache: BlockCache::new(loader),
            overlays: EditOverlayStore::new(),
            entry,
        }
    }

    /// Sets the symbols-per-block tunable. Intended before the first access.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.cache.set_block_size(block_size);
        self
    }

    /// Sets the resident-block bound.
    #[must_use]
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.cache.set_max_blocks(max_blocks);
        self
    }

    /// Number of symbols fetched per block
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.cache.block_size()
    }

    pub fn set_block_size(&mut self, block_size: usize) {
        self.cache.set_block_size(block_size);
    }

    #[must_use]
    pub fn max_blocks(&self) -> usize {
        self.cache.max_blocks()
    }

    pub fn set_max_blocks(&mut self, max_blocks: usize) {
        self.cache.set_max_blocks(max_blocks);
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// The sidecar entry this provider is bound to
    #[must_use]
    pub fn entry(&self) -> &RecordEntry {
        &self.entry
    }

    /// Current logical length of the sequence
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the symbol at logical `index`.
    ///
    /// `Ok(None)` is the out-of-range sentinel: the index lies at or beyond
    /// the logical length, or the backing source had no data for the
    /// drift-corrected raw position. Plain reads never fail on end-of-data.
    pub fn get(&mut self, index: usize) -> Result<Option<u8>> {
        if index >= self.count {
            return Ok(None);
        }

        let mut position = index as i64;
        if !self.overlays.is_empty() {
            if let Some(ordinal) = self.overlays.covering(position) {
                return Ok(self
                    .overlays
                    .get(ordinal)
                    .and_then(|overlay| overlay.symbol_at(position)));
            }
            position += self.overlays.drift(position);
        }
        if position < 0 {
            return Ok(None);
        }

        match self.cache.get(position as u64, &self.entry)? {
            Some(block) => Ok(block.symbol_at(position as u64)),
            None => Ok(None),
        }
    }

    /// Replaces the symbol at logical `index`.
    ///
    /// Implemented as remove-one-then-insert-one, so the touched block gains
    /// an overlay exactly like any other edit.
    pub fn set(&mut self, index: usize, symbol: u8) -> Result<()> {
        self.check_writable(index)?;
        self.remove_range(index, 1)?;
        self.insert_range(index, &[symbol])
    }

    /// Inserts `text` before logical `index` (`index == len()` appends).
    ///
    /// An empty `text` is a no-op. For an append the overlay covering
    /// `index - 1` anchors the insertion, so it lands inside the last block
    /// rather than past it.
    pub fn insert_range(&mut self, index: usize, text: &[u8]) -> Result<()> {
        self.check_writable(index)?;
        if index > self.count {
            return Err(self.out_of_range(index));
        }
        if text.is_empty() {
            return Ok(());
        }

        let ordinal = self.locate_or_create_overlay(index)?;
        self.overlays.apply_edit(ordinal, index as i64, 0, text);
        self.count += text.len();
        Ok(())
    }

    /// Removes `length` symbols starting at logical `index`.
    ///
    /// A removal spanning several blocks is satisfied by an explicit loop:
    /// each pass consumes what the overlay covering `index` can give, then
    /// continues with the remainder against the next block.
    pub fn remove_range(&mut self, index: usize, length: usize) -> Result<()> {
        self.check_writable(index)?;
        if length == 0 {
            return Ok(());
        }
        if index >= self.count || length > self.count - index {
            return Err(self.out_of_range(index));
        }

        let mut remaining = length;
        while remaining > 0 {
            let ordinal = self.locate_or_create_overlay(index)?;
            let removed = self.overlays.apply_edit(ordinal, index as i64, remaining, &[]);
            if removed == 0 {
                // nothing left to anchor the remainder against; bail out
                // rather than spin
                return Err(ProviderError::EndOfSource {
                    id: self.entry.id().to_string(),
                    index,
                }
                .into());
            }
            self.count -= removed;
            remaining -= removed;
        }
        Ok(())
    }

    /// Replaces `text.len()` symbols starting at logical `index` with `text`.
    pub fn replace_range(&mut self, index: usize, text: &[u8]) -> Result<()> {
        self.check_writable(index)?;
        if text.is_empty() {
            return Err(ProviderError::EmptyText {
                id: self.entry.id().to_string(),
                index,
            }
            .into());
        }
        self.remove_range(index, text.len())?;
        self.insert_range(index, text)
    }

    /// Index of the first occurrence of `symbol`, by linear scan.
    pub fn index_of(&mut self, symbol: u8) -> Result<Option<usize>> {
        for index in 0..self.count {
            if self.get(index)? == Some(symbol) {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Whether `symbol` occurs anywhere in the sequence.
    pub fn contains(&mut self, symbol: u8) -> Result<bool> {
        Ok(self.index_of(symbol)?.is_some())
    }

    /// A lazy, finite, restartable iterator over the logical symbols.
    ///
    /// Positions the backing source cannot satisfy yield the `0` sentinel,
    /// preserving lenient legacy indexing.
    pub fn iter(&mut self) -> SymbolIter<'_> {
        SymbolIter {
            provider: self,
            index: 0,
        }
    }

    /// Materializes the current logical sequence.
    pub fn to_vec(&mut self) -> Vec<u8> {
        self.iter().collect()
    }

    /// Returns the ordinal of the overlay covering logical `position`,
    /// creating one from the underlying block when none exists yet.
    ///
    /// For a position at the current end (append), the block containing
    /// `position - 1` anchors the new overlay. Failing to locate an anchor
    /// block is a hard error: a write has nowhere to land.
    fn locate_or_create_overlay(&mut self, position: usize) -> Result<u64> {
        let at_end = position >= self.count;
        let anchor = if at_end {
            position.saturating_sub(1)
        } else {
            position
        };
        if let Some(ordinal) = self.overlays.covering(anchor as i64) {
            return Ok(ordinal);
        }

        let drift = self.overlays.drift(position as i64);
        let raw = position as i64 + drift;
        let raw_anchor = if at_end { raw - 1 } else { raw };
        if raw_anchor < 0 {
            return Err(self.end_of_source(position));
        }

        let block_size = self.cache.block_size();
        let block = match self.cache.get(raw_anchor as u64, &self.entry)? {
            Some(block) => block.clone(),
            None => return Err(self.end_of_source(position)),
        };
        Ok(self
            .overlays
            .create(raw_anchor as u64, &block, block_size, drift))
    }

    fn check_writable(&self, index: usize) -> Result<()> {
        if self.read_only {
            return Err(ProviderError::ReadOnly {
                id: self.entry.id().to_string(),
                index,
            }
            .into());
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> crate::error::Error {
        ProviderError::OutOfRange {
            id: self.entry.id().to_string(),
            index,
            len: self.count,
        }
        .into()
    }

    fn end_of_source(&self, index: usize) -> crate::error::Error {
        ProviderError::EndOfSource {
            id: self.entry.id().to_string(),
            index,
        }
        .into()
    }

    #[cfg(test)]
    pub(crate) fn overlays(&self) -> &EditOverlayStore {
        &self.overlays
    }

    #[cfg(test)]
    pub(crate) fn n_resident_blocks(&self) -> usize {
        self.cache.n_resident()
    }
}

/// Iterator over the logical symbols of a [`VirtualSequenceProvider`]
pub struct SymbolIter<'a> {
    provider: &'a mut VirtualSequenceProvider,
    index: usize,
}

impl Iterator for SymbolIter<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.provider.len() {
            return None;
        }
        let symbol = self
            .provider
            .get(self.index)
            .ok()
            .flatten()
            .unwrap_or_default();
        self.index += 1;
        Some(symbol)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.provider.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}
