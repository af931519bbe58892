use std::fs::File;
use std::path::Path;

use auto_impl::auto_impl;
use memmap2::Mmap;

use crate::error::Result;
use crate::sidecar::RecordEntry;

/// Source of raw symbol data for a virtual sequence
///
/// A `RangeLoader` is the seam between the virtualization core and whatever
/// produces record bytes (typically a format-specific parser). Coordinates
/// passed to [`load_range`](RangeLoader::load_range) are raw positions
/// *within* the record described by `entry`, starting at 0.
///
/// A short or absent result signals end-of-data for the requested region and
/// is never an error; loaders only fail on genuine I/O problems.
#[auto_impl(&, Box, Rc)]
pub trait RangeLoader {
    /// Loads up to `length` symbols starting at raw position `start` of the
    /// record described by `entry`.
    ///
    /// Returns `Ok(None)` when `start` lies at or beyond the record's end.
    /// A partial read at the record tail returns the remaining symbols.
    fn load_range(&self, start: u64, length: usize, entry: &RecordEntry) -> Result<Option<Vec<u8>>>;
}

/// A loader over an in-memory byte source
///
/// Useful for tests and for sources small enough to sit in memory while the
/// editing machinery is still wanted. The buffer holds the *entire* source
/// file; record windows are taken from each entry's byte range.
#[derive(Debug, Clone)]
pub struct SliceLoader {
    bytes: Vec<u8>,
}

impl SliceLoader {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl RangeLoader for SliceLoader {
    fn load_range(&self, start: u64, length: usize, entry: &RecordEntry) -> Result<Option<Vec<u8>>> {
        Ok(window(&self.bytes, start, length, entry))
    }
}

/// A memory-mapped loader over a flat symbol file
///
/// The file is mapped once and shared by every provider built on it; slicing
/// the map is stateless, so providers never contend over a seek position.
pub struct MmapLoader {
    mmap: Mmap,
}

impl MmapLoader {
    /// Maps the source file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap })
    }

    /// Total size of the mapped source in bytes
    #[must_use]
    pub fn source_len(&self) -> u64 {
        self.mmap.len() as u64
    }
}

impl RangeLoader for MmapLoader {
    fn load_range(&self, start: u64, length: usize, entry: &RecordEntry) -> Result<Option<Vec<u8>>> {
        Ok(window(&self.mmap, start, length, entry))
    }
}

/// Cuts the requested window out of a record's byte range, clamped to both
/// the record end and the end of the source itself.
fn window(source: &[u8], start: u64, length: usize, entry: &RecordEntry) -> Option<Vec<u8>> {
    let lo = entry.byte_start + start;
    let hi = (lo + length as u64).min(entry.byte_end).min(source.len() as u64);
    if lo >= hi {
        return None;
    }
    Some(source[lo as usize..hi as usize].to_vec())
}
