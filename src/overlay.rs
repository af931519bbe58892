use std::collections::BTreeMap;

use crate::block::RangeBlock;

/// A mutable, growable buffer shadowing a cached block once written to
///
/// Overlay coordinates live in the *current logical* space and move as
/// earlier overlays grow or shrink. `original_len` is fixed at creation and
/// is what drift arithmetic compares the current length against.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Current logical coordinate of the first symbol
    start: i64,

    /// Current logical coordinate of the last symbol (inclusive);
    /// `start - 1` when every symbol has been removed
    end: i64,

    /// Length of the source block when the overlay was created
    original_len: usize,

    /// The edited symbol data
    buffer: Vec<u8>,
}

impl Overlay {
    fn from_block(block: &RangeBlock, drift: i64) -> Self {
        Self {
            start: block.start() as i64 - drift,
            end: block.end() as i64 - drift,
            original_len: block.len(),
            buffer: block.data().to_vec(),
        }
    }

    /// Current logical coordinate of the first symbol
    #[must_use]
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Current logical coordinate of the last symbol (inclusive)
    #[must_use]
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Length of the source block at overlay creation time
    #[must_use]
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Current number of symbols held by the overlay
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether the logical position falls inside the overlay's current range
    #[must_use]
    pub fn contains(&self, position: i64) -> bool {
        position >= self.start && position <= self.end
    }

    /// The symbol at the given logical position, or `None` outside the range
    #[must_use]
    pub fn symbol_at(&self, position: i64) -> Option<u8> {
        if position < self.start {
            return None;
        }
        self.buffer.get((position - self.start) as usize).copied()
    }

    /// Net length change introduced by edits to this overlay so far.
    /// Negative when the overlay has grown past its original length.
    fn shrinkage(&self) -> i64 {
        self.original_len as i64 - self.buffer.len() as i64
    }
}

/// Sparse store of edit overlays, keyed by block ordinal
///
/// The ordinal of an overlay is `raw_position / block_size` of the block it
/// was created from, so one overlay exists per edited raw block and ordinals
/// stay monotone with the overlays' coordinate order. The store owns the two
/// pieces of coordinate bookkeeping that keep the logical space consistent:
///
/// * [`shift_following`](Self::shift_following) moves every overlay after a
///   length-changing edit so later overlays keep addressing their symbols;
/// * [`drift`](Self::drift) converts a logical position with no covering
///   overlay back to raw coordinates by summing the net shrink/growth of
///   every fully-preceding overlay.
#[derive(Debug, Default)]
pub struct EditOverlayStore {
    overlays: BTreeMap<u64, Overlay>,
}

impl EditOverlayStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Number of overlays created so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// Ordinal of the overlay whose current range contains `position`
    #[must_use]
    pub fn covering(&self, position: i64) -> Option<u64> {
        self.overlays
            .iter()
            .find(|(_, overlay)| overlay.contains(position))
            .map(|(&ordinal, _)| ordinal)
    }

    #[must_use]
    pub fn get(&self, ordinal: u64) -> Option<&Overlay> {
        self.overlays.get(&ordinal)
    }

    /// Creates an overlay from a cached block.
    ///
    /// `raw_position` is the drift-corrected position the write was aimed at
    /// and determines the ordinal; `drift` converts the block's raw range
    /// into current logical coordinates. An overlay already registered for
    /// the ordinal is kept: its bookkeeping must not be reset once edits
    /// have been applied.
    pub fn create(
        &mut self,
        raw_position: u64,
        block: &RangeBlock,
        block_size: usize,
        drift: i64,
    ) -> u64 {
        let ordinal = raw_position / block_size.max(1) as u64;
        self.overlays
            .entry(ordinal)
            .or_insert_with(|| Overlay::from_block(block, drift));
        ordinal
    }

    /// Applies an edit at an absolute logical `position` inside the overlay.
    ///
    /// Removes at most `removed` symbols (clamped to what remains from the
    /// local offset), splices in `inserted`, adjusts the overlay's `end` by
    /// the net delta, and shifts every following overlay by the same delta.
    ///
    /// Returns the number of symbols actually removed; a removal spanning
    /// past this overlay's end reports a short count so the caller can
    /// continue with the next block.
    pub fn apply_edit(
        &mut self,
        ordinal: u64,
        position: i64,
        removed: usize,
        inserted: &[u8],
    ) -> usize {
        let Some(overlay) = self.overlays.get_mut(&ordinal) else {
            return 0;
        };
        let local = (position - overlay.start).max(0) as usize;
        let removable = removed.min(overlay.buffer.len().saturating_sub(local));
        overlay
            .buffer
            .splice(local..local + removable, inserted.iter().copied());

        let delta = inserted.len() as i64 - removable as i64;
        overlay.end += delta;
        let start = overlay.start;
        self.shift_following(start, delta);
        removable
    }

    /// Adds `delta` to the range of every overlay starting strictly after
    /// `start`, keeping later overlays' coordinates correct after an earlier
    /// length-changing edit.
    pub fn shift_following(&mut self, start: i64, delta: i64) {
        for overlay in self.overlays.values_mut() {
            if overlay.start > start {
                overlay.start += delta;
                overlay.end += delta;
            }
        }
    }

    /// Cumulative shrink/growth of every overlay ending before `position`.
    ///
    /// Adding the result to a logical position with no covering overlay
    /// recovers the raw position; growth makes the sum negative because the
    /// logical space runs ahead of the raw one.
    #[must_use]
    pub fn drift(&self, position: i64) -> i64 {
        self.overlays
            .values()
            .filter(|overlay| overlay.end < position)
            .map(Overlay::shrinkage)
            .sum()
    }

    /// Iterates over overlays in ordinal order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Overlay)> {
        self.overlays
            .iter()
            .map(|(&ordinal, overlay)| (ordinal, overlay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(block: &RangeBlock, block_size: usize) -> (EditOverlayStore, u64) {
        let mut store = EditOverlayStore::new();
        let ordinal = store.create(block.start(), block, block_size, 0);
        (store, ordinal)
    }

    #[test]
    fn create_seeds_from_block() {
        let block = RangeBlock::new(4, b"ACGT".to_vec());
        let (store, ordinal) = store_with(&block, 4);
        assert_eq!(ordinal, 1);

        let overlay = store.get(ordinal).unwrap();
        assert_eq!(overlay.start(), 4);
        assert_eq!(overlay.end(), 7);
        assert_eq!(overlay.original_len(), 4);
        assert_eq!(overlay.symbol_at(5), Some(b'C'));
    }

    #[test]
    fn create_applies_drift() {
        let mut store = EditOverlayStore::new();
        let block = RangeBlock::new(8, b"ACGT".to_vec());
        // two symbols were removed before this block: logical runs behind raw
        let ordinal = store.create(8, &block, 4, 2);
        let overlay = store.get(ordinal).unwrap();
        assert_eq!(overlay.start(), 6);
        assert_eq!(overlay.end(), 9);
    }

    #[test]
    fn insert_grows_and_shifts_following() {
        let mut store = EditOverlayStore::new();
        let first = RangeBlock::new(0, b"ACGT".to_vec());
        let second = RangeBlock::new(4, b"TGCA".to_vec());
        let first_ord = store.create(0, &first, 4, 0);
        let second_ord = store.create(4, &second, 4, 0);

        let removed = store.apply_edit(first_ord, 2, 0, b"NN");
        assert_eq!(removed, 0);

        let first = store.get(first_ord).unwrap();
        assert_eq!(first.len(), 6);
        assert_eq!(first.end(), 5);

        // the later overlay moved right by the inserted length
        let second = store.get(second_ord).unwrap();
        assert_eq!(second.start(), 6);
        assert_eq!(second.end(), 9);
    }

    #[test]
    fn shift_is_strictly_after() {
        let mut store = EditOverlayStore::new();
        let first = RangeBlock::new(0, b"ACGT".to_vec());
        let first_ord = store.create(0, &first, 4, 0);

        store.shift_following(0, 5);
        // the overlay at the edited start itself must not move
        assert_eq!(store.get(first_ord).unwrap().start(), 0);
    }

    #[test]
    fn removal_is_clamped_to_overlay_end() {
        let block = RangeBlock::new(0, b"ACGT".to_vec());
        let (mut store, ordinal) = store_with(&block, 4);

        let removed = store.apply_edit(ordinal, 2, 10, &[]);
        assert_eq!(removed, 2);
        let overlay = store.get(ordinal).unwrap();
        assert_eq!(overlay.len(), 2);
        assert_eq!(overlay.end(), 1);
    }

    #[test]
    fn drift_sums_fully_preceding_overlays() {
        let mut store = EditOverlayStore::new();
        let first = RangeBlock::new(0, b"ACGT".to_vec());
        let second = RangeBlock::new(4, b"TGCA".to_vec());
        let first_ord = store.create(0, &first, 4, 0);
        let second_ord = store.create(4, &second, 4, 0);

        // shrink the first overlay by 2, grow the second by 3
        store.apply_edit(first_ord, 0, 2, &[]);
        store.apply_edit(second_ord, 2, 0, b"NNN");

        // positions inside the first overlay see no drift
        assert_eq!(store.drift(1), 0);
        // past the first overlay only: +2 (shrunk)
        assert_eq!(store.drift(4), 2);
        // past both: +2 - 3
        assert_eq!(store.drift(100), -1);
    }

    #[test]
    fn emptied_overlay_still_counts_toward_drift() {
        let block = RangeBlock::new(0, b"ACGT".to_vec());
        let (mut store, ordinal) = store_with(&block, 4);

        let removed = store.apply_edit(ordinal, 0, 4, &[]);
        assert_eq!(removed, 4);
        let overlay = store.get(ordinal).unwrap();
        assert!(overlay.is_empty());
        assert_eq!(overlay.end(), -1);
        assert!(store.covering(0).is_none());
        assert_eq!(store.drift(0), 4);
    }
}
