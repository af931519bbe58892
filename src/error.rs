/// Custom Result type for virtseq operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the virtseq library, encompassing all possible error
/// cases that can occur while virtualizing sequence data.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors raised by a virtual sequence provider
    ProviderError(#[from] ProviderError),
    /// Errors raised by a sequence collection
    CollectionError(#[from] CollectionError),
    /// Errors related to sidecar index files
    IndexError(#[from] IndexError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// UTF-8 encoding/decoding errors
    Utf8Error(#[from] std::str::Utf8Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}

/// Errors raised at the public boundary of a [`VirtualSequenceProvider`](crate::VirtualSequenceProvider).
///
/// Every variant carries the attempted logical index and the record identifier
/// so failures can be diagnosed without inspecting internal block state.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// A mutating operation was attempted on a read-only sequence
    #[error("Sequence '{id}' is read-only: cannot edit at index {index}")]
    ReadOnly { id: String, index: usize },

    /// The requested logical index lies outside the editable range
    #[error("Requested index ({index}) is out of sequence range ({len}) for '{id}'")]
    OutOfRange {
        id: String,
        index: usize,
        len: usize,
    },

    /// A replacement was attempted with no replacement symbols
    #[error("Replacement text for sequence '{id}' at index {index} must not be empty")]
    EmptyText { id: String, index: usize },

    /// The loader could not supply the block needed to anchor a write
    #[error("Source ended while locating a block for index {index} of sequence '{id}'")]
    EndOfSource { id: String, index: usize },
}

/// Errors raised by structural mutation of a [`SequenceCollection`](crate::sidecar::SequenceCollection).
#[derive(thiserror::Error, Debug)]
pub enum CollectionError {
    /// The collection itself is read-only; only materialized records may be edited
    #[error("Virtual sequence collections are read-only: '{0}' is not supported")]
    Unsupported(&'static str),
}

/// Errors specific to reading and validating sidecar index files
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// The magic number in the sidecar header does not match the expected value
    #[error("Invalid magic number: {0}")]
    InvalidMagicNumber(u64),

    /// The reserved bytes in the sidecar header contain unexpected values
    #[error("Invalid reserved bytes")]
    InvalidReservedBytes,

    /// The size of the source file does not match what the sidecar recorded
    ///
    /// # Arguments
    /// * First `u64` - The actual source file size in bytes
    /// * Second `u64` - The size recorded in the sidecar header
    #[error("Source file size ({0}) does not match the sidecar expectation ({1})")]
    ByteSizeMismatch(u64, u64),

    /// The sidecar path does not identify the source file it indexes
    #[error("Cannot determine upstream source file from sidecar path: {0}")]
    MissingUpstreamFile(String),

    /// Attempted to access a record index that is beyond the available range
    ///
    /// # Arguments
    /// * First `usize` - The requested record index
    /// * Second `usize` - The number of records in the index
    #[error("Requested record index ({0}) is out of record range ({1})")]
    OutOfRange(usize, usize),

    /// The sidecar entry names an alphabet code this build does not know
    #[error("Unknown alphabet code in sidecar entry: {0}")]
    UnknownAlphabet(u8),
}
