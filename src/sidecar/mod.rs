//! # Sidecar indexing and record collections
//!
//! Random access into a multi-record flat file needs to know where each
//! record's symbols live without scanning the file. That knowledge is kept
//! in a *sidecar index*: a small auxiliary file built once by a
//! format-specific parser, mapping record number to byte range, alphabet,
//! and record id.
//!
//! ## Sidecar file structure
//!
//! ```text
//! ┌───────────────────┐
//! │   Index Header    │ 32 bytes (magic + source size)
//! ├───────────────────┤
//! │                   │
//! │  Record Entries   │ zstd-compressed, variable size
//! │                   │
//! └───────────────────┘
//! ```
//!
//! Each entry carries the record's byte range in the source (end exclusive),
//! a one-byte alphabet code, and the record id. Loading a sidecar validates
//! its magic number and that the source file still has the size recorded at
//! write time.
//!
//! ## Collections
//!
//! [`SequenceCollection`] sits on top of a [`SidecarIndex`] and a shared
//! loader and presents the file as a read-only list of lazily materialized
//! records. Records are held by weak reference only: whatever the caller
//! drops is freed, and a periodic sweep keeps the tracking map bounded.

mod collection;
mod index;

pub use collection::{SequenceCollection, SequenceRecord, DEFAULT_SWEEP_THRESHOLD};
pub use index::{
    IndexHeader, RecordEntry, SidecarIndex, INDEX_EXTENSION, INDEX_MAGIC, SIZE_INDEX_HEADER,
};
