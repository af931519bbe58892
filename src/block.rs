/// An immutable-origin chunk of symbol data covering an inclusive raw range
///
/// A `RangeBlock` holds the symbols loaded for one aligned region of the
/// backing source. Blocks admitted to the [`BlockCache`](crate::BlockCache)
/// are never mutated; edits are applied to
/// [`Overlay`](crate::Overlay) copies instead.
#[derive(Debug, Clone)]
pub struct RangeBlock {
    /// Raw coordinate of the first symbol in the block
    start: u64,

    /// Raw coordinate of the last symbol in the block (inclusive)
    end: u64,

    /// The symbol data itself
    data: Vec<u8>,
}

impl RangeBlock {
    /// Creates a block starting at `start` from freshly loaded symbol data.
    ///
    /// # Panics
    /// Panics if `data` is empty; the cache never admits empty loads.
    #[must_use]
    pub fn new(start: u64, data: Vec<u8>) -> Self {
        assert!(!data.is_empty(), "RangeBlock requires at least one symbol");
        Self {
            start,
            end: start + data.len() as u64 - 1,
            data,
        }
    }

    /// Raw coordinate of the first symbol
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Raw coordinate of the last symbol (inclusive)
    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of symbols in the block
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the raw position falls inside this block's range
    #[must_use]
    pub fn contains(&self, position: u64) -> bool {
        position >= self.start && position <= self.end
    }

    /// The symbol at the given raw position, or `None` outside the range
    #[must_use]
    pub fn symbol_at(&self, position: u64) -> Option<u8> {
        if position < self.start {
            return None;
        }
        self.data.get((position - self.start) as usize).copied()
    }

    /// A view of the block's symbol data
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_and_lookup() {
        let block = RangeBlock::new(8, b"ACGT".to_vec());
        assert_eq!(block.start(), 8);
        assert_eq!(block.end(), 11);
        assert_eq!(block.len(), 4);
        assert!(block.contains(8));
        assert!(block.contains(11));
        assert!(!block.contains(7));
        assert!(!block.contains(12));
        assert_eq!(block.symbol_at(9), Some(b'C'));
        assert_eq!(block.symbol_at(12), None);
        assert_eq!(block.symbol_at(0), None);
    }

    #[test]
    fn single_symbol_block() {
        let block = RangeBlock::new(0, vec![b'A']);
        assert_eq!(block.start(), block.end());
        assert_eq!(block.symbol_at(0), Some(b'A'));
    }
}
