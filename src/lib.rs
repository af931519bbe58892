//! # virtseq
//!
//! Memory-bounded random access and in-place editing for large sequence
//! files.
//!
//! Sequence-analysis tools regularly face records of millions of symbols,
//! far too large to materialize per record, yet algorithms want to treat
//! them as ordinary indexable, mutable sequences. `virtseq` virtualizes the
//! data instead: reads pull fixed-size, aligned blocks through a bounded
//! cache, and edits land in sparse overlay copies of just the touched
//! blocks, so memory stays proportional to the working set rather than the
//! file.
//!
//! ## Overview
//!
//! * [`VirtualSequenceProvider`]: one record as an indexable, editable,
//!   enumerable sequence. Position translation between the post-edit
//!   logical space and raw file offsets is handled internally.
//! * [`BlockCache`]: bounded FIFO cache of [`RangeBlock`]s, filled through
//!   an injected [`RangeLoader`].
//! * [`EditOverlayStore`]: growable copies of edited blocks plus the
//!   range-shifting and drift bookkeeping that keeps every coordinate space
//!   consistent across an arbitrary edit history.
//! * [`SequenceCollection`](sidecar::SequenceCollection): a whole file of
//!   records as a read-only list, lazily materialized through a
//!   [`SidecarIndex`] and held by weak reference only.
//!
//! Everything is single-threaded and blocking; a provider expects one
//! logical owner at a time, and the backing source is assumed immutable for
//! the provider's lifetime.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::rc::Rc;
//! use virtseq::{Alphabet, RecordEntry, SliceLoader, VirtualSequenceProvider};
//!
//! // a 10-symbol record, read in 4-symbol blocks, at most 2 resident
//! let loader = Rc::new(SliceLoader::new(b"ACGTACGTAC".to_vec()));
//! let entry = RecordEntry::new(0, 10, Alphabet::Dna, "chr1");
//! let mut sequence = VirtualSequenceProvider::new(loader, entry)
//!     .with_block_size(4)
//!     .with_max_blocks(2);
//!
//! // reads look like ordinary indexing
//! assert_eq!(sequence.get(6).unwrap(), Some(b'G'));
//!
//! // edits shift the logical space without touching the source
//! sequence.insert_range(4, b"NN").unwrap();
//! sequence.remove_range(0, 2).unwrap();
//! assert_eq!(sequence.len(), 10);
//! assert_eq!(sequence.to_vec(), b"GTNNACGTAC");
//! ```

mod alphabet;
mod block;
mod cache;
mod error;
mod loader;
mod overlay;
mod provider;
pub mod sidecar;

pub mod prelude;

pub use alphabet::Alphabet;
pub use block::RangeBlock;
pub use cache::{BlockCache, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_BLOCKS};
pub use error::{CollectionError, Error, IndexError, ProviderError, Result};
pub use loader::{MmapLoader, RangeLoader, SliceLoader};
pub use overlay::{EditOverlayStore, Overlay};
pub use provider::{SymbolIter, VirtualSequenceProvider};
pub use sidecar::{RecordEntry, SequenceCollection, SequenceRecord, SidecarIndex};

#[cfg(test)]
mod testing {
    use super::*;
    use anyhow::Result;
    use nucgen::Sequence;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::io::Write;
    use std::rc::Rc;

    /// End-to-end over a generated multi-record source file: sidecar on
    /// disk, memory-mapped loader, lazy collection, and per-record edits.
    #[test]
    fn collection_over_mapped_file() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut generated = Sequence::new();
        let record_lens = [10_000usize, 333, 4096, 17];

        let dir = tempfile::tempdir()?;
        let source_path = dir.path().join("records.seq");
        let mut source = Vec::new();
        let mut expected = Vec::new();

        for &len in &record_lens {
            generated.fill_buffer(&mut rng, len);
            source.extend_from_slice(generated.bytes());
            expected.push(generated.bytes().to_vec());
        }

        let mut handle = std::fs::File::create(&source_path)?;
        handle.write_all(&source)?;
        handle.flush()?;

        let index = {
            let mut index = SidecarIndex::new(source.len() as u64);
            let mut start = 0u64;
            for (record, &len) in record_lens.iter().enumerate() {
                index.push(RecordEntry::new(
                    start,
                    start + len as u64,
                    Alphabet::Dna,
                    &format!("read{record}"),
                ));
                start += len as u64;
            }
            let sidecar_path = dir.path().join("records.seq.vsx");
            index.save_to_path(&sidecar_path)?;
            SidecarIndex::from_path(&sidecar_path)?
        };

        let loader = Rc::new(MmapLoader::new(&source_path)?);
        let collection = SequenceCollection::new(index, loader);
        assert_eq!(collection.len(), record_lens.len());

        // untouched records reproduce the source exactly
        for (record, expected) in expected.iter().enumerate() {
            let materialized = collection.get(record)?;
            assert_eq!(materialized.len(), expected.len());
            assert_eq!(&materialized.to_vec(), expected);
        }

        // edits on one record leave the others alone
        let edited = collection.get(1)?;
        edited.provider().borrow_mut().insert_range(0, b"NNNN")?;
        edited.provider().borrow_mut().remove_range(10, 5)?;
        assert_eq!(edited.len(), 333 + 4 - 5);

        let untouched = collection.get(2)?;
        assert_eq!(untouched.to_vec(), expected[2]);

        // a live record keeps its edits across lookups
        let same = collection.get(1)?;
        assert!(Rc::ptr_eq(&edited, &same));
        assert_eq!(same.len(), 332);

        // once dropped, the record is rebuilt pristine from the source
        drop(edited);
        drop(same);
        collection.sweep();
        let rebuilt = collection.get(1)?;
        assert_eq!(rebuilt.len(), 333);
        assert_eq!(&rebuilt.to_vec(), &expected[1]);

        Ok(())
    }

    /// The documented driving scenario, end to end through the collection.
    #[test]
    fn scenario_through_collection() -> Result<()> {
        let mut index = SidecarIndex::new(10);
        index.push(RecordEntry::new(0, 10, Alphabet::Dna, "seq"));
        let loader = Rc::new(SliceLoader::new(b"ACGTACGTAC".to_vec()));
        let collection = SequenceCollection::new(index, loader);

        let record = collection.get(0)?;
        {
            let mut provider = record.provider().borrow_mut();
            provider.set_block_size(4);
            provider.set_max_blocks(2);
            assert_eq!(provider.to_vec(), b"ACGTACGTAC");

            provider.insert_range(4, b"NN")?;
            assert_eq!(provider.len(), 12);
            assert_eq!(provider.to_vec(), b"ACGTNNACGTAC");

            provider.remove_range(0, 2)?;
            assert_eq!(provider.len(), 10);
            assert_eq!(provider.to_vec(), b"GTNNACGTAC");
        }
        assert_eq!(record.get(0)?, Some(b'G'));
        Ok(())
    }
}
