use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::error::{CollectionError, Result};
use crate::loader::RangeLoader;
use crate::provider::VirtualSequenceProvider;
use crate::sidecar::index::{RecordEntry, SidecarIndex};
use crate::Alphabet;

/// Default number of materializations between dead-entry sweeps
pub const DEFAULT_SWEEP_THRESHOLD: usize = 100 * 1024;

/// One materialized record of a [`SequenceCollection`]
///
/// Wraps a [`VirtualSequenceProvider`] together with the sidecar metadata it
/// was built from. The provider sits behind a `RefCell` so a record handed
/// out as `Rc<SequenceRecord>` can still be read and edited; the single
/// logical owner assumption of the provider applies unchanged.
pub struct SequenceRecord {
    /// Position of the record in the collection
    index: usize,

    /// Sidecar entry the record was resolved from
    entry: RecordEntry,

    /// The virtualized sequence itself
    provider: RefCell<VirtualSequenceProvider>,
}

impl SequenceRecord {
    /// Position of the record in the collection
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The record identifier from the sidecar
    #[must_use]
    pub fn id(&self) -> &str {
        self.entry.id()
    }

    /// Alphabet the record's symbols belong to
    #[must_use]
    pub fn alphabet(&self) -> Alphabet {
        self.entry.alphabet
    }

    /// Current logical length of the sequence
    #[must_use]
    pub fn len(&self) -> usize {
        self.provider.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct access to the underlying provider for reads and edits
    #[must_use]
    pub fn provider(&self) -> &RefCell<VirtualSequenceProvider> {
        &self.provider
    }

    /// The symbol at logical `index` (see [`VirtualSequenceProvider::get`])
    pub fn get(&self, index: usize) -> Result<Option<u8>> {
        self.provider.borrow_mut().get(index)
    }

    /// Materializes the record's current logical sequence.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.provider.borrow_mut().to_vec()
    }
}

/// Weak-reference cache of lazily materialized sequence records
///
/// A `SequenceCollection` presents every record of an indexed flat file as a
/// read-only, list-like collection without keeping the records in memory.
/// Each `get` either upgrades a live weak reference or rebuilds the record
/// from its sidecar entry and the shared loader; once all external strong
/// references to a record are dropped, the record is freed and a later `get`
/// reconstructs it fresh.
///
/// Dead weak entries are swept from the map every
/// [`sweep_threshold`](Self::with_sweep_threshold) materializations, bounding
/// map growth independent of drop timing.
///
/// The collection itself is structurally read-only: [`insert`](Self::insert),
/// [`remove`](Self::remove), [`push`](Self::push), and [`clear`](Self::clear)
/// all fail with [`CollectionError::Unsupported`]. Only materialized records
/// may be edited, through their own providers.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
/// use virtseq::{Alphabet, RecordEntry, SidecarIndex, SliceLoader};
/// use virtseq::sidecar::SequenceCollection;
///
/// let mut index = SidecarIndex::new(8);
/// index.push(RecordEntry::new(0, 4, Alphabet::Dna, "r1"));
/// index.push(RecordEntry::new(4, 8, Alphabet::Dna, "r2"));
///
/// let loader = Rc::new(SliceLoader::new(b"ACGTTGCA".to_vec()));
/// let collection = SequenceCollection::new(index, loader);
///
/// assert_eq!(collection.len(), 2);
/// let record = collection.get(1).unwrap();
/// assert_eq!(record.to_vec(), b"TGCA");
/// ```
pub struct SequenceCollection {
    /// Positional index over the source records
    index: SidecarIndex,

    /// Loader shared by every provider built from this collection
    loader: Rc<dyn RangeLoader>,

    /// Whether materialized records are created read-only
    create_read_only: bool,

    /// Materializations between dead-entry sweeps
    sweep_threshold: usize,

    /// Record number to weak reference of its materialized object
    entries: RefCell<HashMap<usize, Weak<SequenceRecord>>>,

    /// Materializations since construction
    insertions: Cell<usize>,
}

impl SequenceCollection {
    #[must_use]
    pub fn new(index: SidecarIndex, loader: Rc<dyn RangeLoader>) -> Self {
        Self {
            index,
            loader,
            create_read_only: false,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
            entries: RefCell::new(HashMap::new()),
            insertions: Cell::new(0),
        }
    }

    /// Sets whether records are materialized read-only.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.create_read_only = read_only;
        self
    }

    /// Sets the number of materializations between dead-entry sweeps.
    #[must_use]
    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold.max(1);
        self
    }

    /// Number of records in the backing index
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.n_records()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.n_records() == 0
    }

    /// The backing sidecar index
    #[must_use]
    pub fn sidecar(&self) -> &SidecarIndex {
        &self.index
    }

    /// Returns the record at `record`, materializing it when necessary.
    ///
    /// A live previously materialized record is returned by identity; a dead
    /// or absent one is rebuilt from its sidecar entry.
    pub fn get(&self, record: usize) -> Result<Rc<SequenceRecord>> {
        if let Some(live) = self
            .entries
            .borrow()
            .get(&record)
            .and_then(Weak::upgrade)
        {
            return Ok(live);
        }

        let entry = self.index.entry(record)?.clone();
        let mut provider = VirtualSequenceProvider::new(Rc::clone(&self.loader), entry.clone());
        let symbols = entry.symbols() as usize;
        if symbols > 0 && symbols < provider.block_size() {
            provider.set_block_size(symbols);
        }
        provider.set_read_only(self.create_read_only);

        let materialized = Rc::new(SequenceRecord {
            index: record,
            entry,
            provider: RefCell::new(provider),
        });

        let insertions = self.insertions.get() + 1;
        self.insertions.set(insertions);
        if insertions % self.sweep_threshold == 0 {
            self.sweep();
        }
        self.entries
            .borrow_mut()
            .insert(record, Rc::downgrade(&materialized));
        Ok(materialized)
    }

    /// Drops map entries whose record has been freed.
    pub fn sweep(&self) {
        self.entries
            .borrow_mut()
            .retain(|_, weak| weak.strong_count() > 0);
    }

    /// Number of weak entries currently held (live or not)
    #[must_use]
    pub fn n_tracked(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Position of a previously materialized record, by object identity.
    #[must_use]
    pub fn index_of(&self, record: &Rc<SequenceRecord>) -> Option<usize> {
        self.entries
            .borrow()
            .iter()
            .find(|(_, weak)| {
                weak.upgrade()
                    .is_some_and(|live| Rc::ptr_eq(&live, record))
            })
            .map(|(&index, _)| index)
    }

    /// Whether this exact record object came from the collection and is live.
    #[must_use]
    pub fn contains(&self, record: &Rc<SequenceRecord>) -> bool {
        self.index_of(record).is_some()
    }

    /// A lazy, restartable iterator over all records in index order.
    pub fn iter(&self) -> impl Iterator<Item = Result<Rc<SequenceRecord>>> + '_ {
        (0..self.len()).map(move |record| self.get(record))
    }

    /// Not supported: the collection is structurally read-only.
    pub fn insert(&self, _record: usize, _item: Rc<SequenceRecord>) -> Result<()> {
        Err(CollectionError::Unsupported("insert").into())
    }

    /// Not supported: the collection is structurally read-only.
    pub fn remove(&self, _record: usize) -> Result<()> {
        Err(CollectionError::Unsupported("remove").into())
    }

    /// Not supported: the collection is structurally read-only.
    pub fn push(&self, _item: Rc<SequenceRecord>) -> Result<()> {
        Err(CollectionError::Unsupported("push").into())
    }

    /// Not supported: the collection is structurally read-only.
    pub fn clear(&self) -> Result<()> {
        Err(CollectionError::Unsupported("clear").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ProviderError};
    use crate::loader::SliceLoader;

    fn collection(source: &[u8], record_len: u64) -> SequenceCollection {
        let mut index = SidecarIndex::new(source.len() as u64);
        let mut start = 0;
        let mut record = 0;
        while start < source.len() as u64 {
            let end = (start + record_len).min(source.len() as u64);
            index.push(RecordEntry::new(
                start,
                end,
                Alphabet::Dna,
                &format!("rec{record}"),
            ));
            start = end;
            record += 1;
        }
        let loader = Rc::new(SliceLoader::new(source.to_vec()));
        SequenceCollection::new(index, loader)
    }

    #[test]
    fn materializes_records_lazily() -> Result<()> {
        let collection = collection(b"ACGTTGCAAANN", 4);
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.n_tracked(), 0);

        let record = collection.get(1)?;
        assert_eq!(record.id(), "rec1");
        assert_eq!(record.to_vec(), b"TGCA");
        assert_eq!(collection.n_tracked(), 1);
        Ok(())
    }

    #[test]
    fn live_records_returned_by_identity() -> Result<()> {
        let collection = collection(b"ACGTTGCA", 4);
        let first = collection.get(0)?;
        let again = collection.get(0)?;
        assert!(Rc::ptr_eq(&first, &again));
        assert_eq!(collection.index_of(&first), Some(0));
        assert!(collection.contains(&first));
        Ok(())
    }

    #[test]
    fn dropped_records_rebuilt_fresh() -> Result<()> {
        let collection = collection(b"ACGTTGCA", 4);
        let first = collection.get(0)?;
        let contents = first.to_vec();
        drop(first);

        collection.sweep();
        assert_eq!(collection.n_tracked(), 0);

        let rebuilt = collection.get(0)?;
        assert_eq!(rebuilt.to_vec(), contents);
        Ok(())
    }

    #[test]
    fn sweep_threshold_bounds_map_growth() -> Result<()> {
        let collection = collection(&b"ACGT".repeat(64), 4).with_sweep_threshold(16);
        for record in 0..64 {
            let materialized = collection.get(record)?;
            drop(materialized);
        }
        // every 16th materialization swept the dead entries behind it
        assert!(collection.n_tracked() <= 16);
        Ok(())
    }

    #[test]
    fn structural_mutation_unsupported() -> Result<()> {
        let collection = collection(b"ACGTTGCA", 4);
        let record = collection.get(0)?;

        assert!(matches!(
            collection.insert(0, Rc::clone(&record)).unwrap_err(),
            Error::CollectionError(CollectionError::Unsupported("insert"))
        ));
        assert!(collection.remove(0).is_err());
        assert!(collection.push(record).is_err());
        assert!(collection.clear().is_err());
        Ok(())
    }

    #[test]
    fn read_only_flag_propagates() -> Result<()> {
        let locked = collection(b"ACGTTGCA", 4).with_read_only(true);
        let record = locked.get(0)?;

        let err = record.provider().borrow_mut().set(0, b'N').unwrap_err();
        assert!(matches!(
            err,
            Error::ProviderError(ProviderError::ReadOnly { .. })
        ));
        // elements of a writable collection stay internally mutable
        let writable = collection(b"ACGTTGCA", 4);
        let record = writable.get(0)?;
        record.provider().borrow_mut().set(0, b'N')?;
        assert_eq!(record.to_vec(), b"NCGT");
        Ok(())
    }

    #[test]
    fn block_size_clamped_to_short_records() -> Result<()> {
        let collection = collection(b"ACGTTGCA", 4);
        let record = collection.get(0)?;
        assert_eq!(record.provider().borrow().block_size(), 4);
        Ok(())
    }

    #[test]
    fn iteration_visits_every_record() -> Result<()> {
        let collection = collection(b"ACGTTGCAAANN", 4);
        let ids: Vec<String> = collection
            .iter()
            .map(|record| record.map(|r| r.id().to_string()))
            .collect::<Result<_>>()?;
        assert_eq!(ids, ["rec0", "rec1", "rec2"]);

        let edits_hold: Vec<Vec<u8>> = collection
            .iter()
            .map(|record| record.map(|r| r.to_vec()))
            .collect::<Result<_>>()?;
        assert_eq!(edits_hold, [b"ACGT".to_vec(), b"TGCA".to_vec(), b"AANN".to_vec()]);
        Ok(())
    }

    #[test]
    fn missing_record_is_out_of_range() {
        let collection = collection(b"ACGT", 4);
        assert!(collection.get(5).is_err());
    }
}
