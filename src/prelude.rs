pub use super::{
    Alphabet, BlockCache, EditOverlayStore, MmapLoader, RangeBlock, RangeLoader, RecordEntry,
    Result, SequenceCollection, SequenceRecord, SidecarIndex, SliceLoader,
    VirtualSequenceProvider,
};
