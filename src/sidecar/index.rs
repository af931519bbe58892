use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use zstd::{Decoder, Encoder};

use crate::alphabet::Alphabet;
use crate::error::{IndexError, Result};

/// Size of `IndexHeader` in bytes
pub const SIZE_INDEX_HEADER: usize = 32;
/// Magic number to designate a sidecar index (SEQSIDEC)
#[allow(clippy::unreadable_literal)]
pub const INDEX_MAGIC: u64 = 0x4345444953514553;
/// Conventional file extension for sidecar indexes
pub const INDEX_EXTENSION: &str = "vsx";
/// Reserved header bytes
const INDEX_RESERVATION: [u8; SIZE_INDEX_HEADER - 16] = [42; SIZE_INDEX_HEADER - 16];

/// Positional descriptor of one record within a flat sequence file
///
/// A `RecordEntry` is what the sidecar index stores per record: the byte
/// range the record's symbols occupy in the source file (`byte_end`
/// exclusive), the alphabet its symbols belong to, and the record's
/// identifier. Resolving an entry is all a
/// [`SequenceCollection`](crate::sidecar::SequenceCollection) needs to build
/// a provider for the record without scanning the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    /// Byte offset of the record's first symbol in the source file
    pub byte_start: u64,

    /// Byte offset one past the record's last symbol
    pub byte_end: u64,

    /// Alphabet the record's symbols belong to
    pub alphabet: Alphabet,

    /// Record identifier (e.g. the FASTA header id)
    id: String,
}

impl RecordEntry {
    #[must_use]
    pub fn new(byte_start: u64, byte_end: u64, alphabet: Alphabet, id: &str) -> Self {
        Self {
            byte_start,
            byte_end,
            alphabet,
            id: id.to_string(),
        }
    }

    /// The record identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of symbols the record occupies in the source
    #[must_use]
    pub fn symbols(&self) -> u64 {
        self.byte_end.saturating_sub(self.byte_start)
    }

    /// Serializes the entry to the provided writer.
    ///
    /// Layout: `byte_start` (u64 LE), `byte_end` (u64 LE), alphabet code
    /// (u8), id length (u16 LE), id bytes.
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<LittleEndian>(self.byte_start)?;
        writer.write_u64::<LittleEndian>(self.byte_end)?;
        writer.write_u8(self.alphabet.code())?;
        writer.write_u16::<LittleEndian>(self.id.len() as u16)?;
        writer.write_all(self.id.as_bytes())?;
        Ok(())
    }

    /// Deserializes an entry from the provided reader.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let byte_start = reader.read_u64::<LittleEndian>()?;
        let byte_end = reader.read_u64::<LittleEndian>()?;
        let code = reader.read_u8()?;
        let Some(alphabet) = Alphabet::from_code(code) else {
            return Err(IndexError::UnknownAlphabet(code).into());
        };
        let id_len = reader.read_u16::<LittleEndian>()? as usize;
        let mut id_bytes = vec![0u8; id_len];
        reader.read_exact(&mut id_bytes)?;
        let id = std::str::from_utf8(&id_bytes)?.to_string();
        Ok(Self {
            byte_start,
            byte_end,
            alphabet,
            id,
        })
    }
}

/// Header of a serialized sidecar index file
///
/// Fixed 32 bytes: a magic number identifying the format and the size of the
/// indexed source file, which lets loading verify that a sidecar matches the
/// file it claims to index.
#[derive(Debug, Clone, Copy)]
pub struct IndexHeader {
    /// Magic number designating the sidecar format ("SEQSIDEC" in ASCII)
    magic: u64,

    /// Total size of the indexed source file in bytes
    bytes: u64,

    /// Reserved bytes for future extensions
    reserved: [u8; SIZE_INDEX_HEADER - 16],
}

impl IndexHeader {
    #[must_use]
    pub fn new(bytes: u64) -> Self {
        Self {
            magic: INDEX_MAGIC,
            bytes,
            reserved: INDEX_RESERVATION,
        }
    }

    /// Reads and validates a header from the provided reader.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buffer = [0; SIZE_INDEX_HEADER];
        reader.read_exact(&mut buffer)?;
        let magic = LittleEndian::read_u64(&buffer[0..8]);
        let bytes = LittleEndian::read_u64(&buffer[8..16]);
        let Ok(reserved) = buffer[16..SIZE_INDEX_HEADER].try_into() else {
            return Err(IndexError::InvalidReservedBytes.into());
        };
        if magic != INDEX_MAGIC {
            return Err(IndexError::InvalidMagicNumber(magic).into());
        }
        Ok(Self {
            magic,
            bytes,
            reserved,
        })
    }

    /// Serializes the header to the provided writer.
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut buffer = [0; SIZE_INDEX_HEADER];
        LittleEndian::write_u64(&mut buffer[0..8], self.magic);
        LittleEndian::write_u64(&mut buffer[8..16], self.bytes);
        buffer[16..].copy_from_slice(&self.reserved);
        writer.write_all(&buffer)?;
        Ok(())
    }

    /// Size of the indexed source file in bytes
    #[must_use]
    pub fn source_bytes(&self) -> u64 {
        self.bytes
    }
}

/// Prebuilt positional index over the records of a flat sequence file
///
/// A `SidecarIndex` maps record number to byte range and metadata, enabling
/// random access into multi-record files without rescanning them. Building
/// the index is the job of a format-specific parser; this type holds the
/// entries and owns the persisted form: a 32-byte header followed by a
/// zstd-compressed section of serialized [`RecordEntry`]s.
///
/// # Examples
///
/// ```rust,no_run
/// use virtseq::{Alphabet, RecordEntry, SidecarIndex};
///
/// let mut index = SidecarIndex::new(2048);
/// index.push(RecordEntry::new(0, 1024, Alphabet::Dna, "chr1"));
/// index.push(RecordEntry::new(1024, 2048, Alphabet::Dna, "chr2"));
/// index.save_to_path("genome.seq.vsx").unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SidecarIndex {
    /// Size of the indexed source file in bytes
    source_bytes: u64,

    /// Record entries in file order
    entries: Vec<RecordEntry>,
}

impl SidecarIndex {
    /// Creates an empty index for a source file of the given size.
    #[must_use]
    pub fn new(source_bytes: u64) -> Self {
        Self {
            source_bytes,
            entries: Vec::default(),
        }
    }

    /// Appends a record entry. Entries are expected in file order.
    pub fn push(&mut self, entry: RecordEntry) {
        self.entries.push(entry);
    }

    /// Number of records in the index
    #[must_use]
    pub fn n_records(&self) -> usize {
        self.entries.len()
    }

    /// The entry for `record`, or an out-of-range error.
    pub fn entry(&self, record: usize) -> Result<&RecordEntry> {
        self.entries
            .get(record)
            .ok_or_else(|| IndexError::OutOfRange(record, self.entries.len()).into())
    }

    /// A view of all entries in file order
    #[must_use]
    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    /// Size of the indexed source file in bytes
    #[must_use]
    pub fn source_bytes(&self) -> u64 {
        self.source_bytes
    }

    /// Saves the index: header, then the zstd-compressed entry section.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = File::create(path).map(BufWriter::new)?;
        IndexHeader::new(self.source_bytes).write_bytes(&mut writer)?;
        let mut writer = Encoder::new(writer, 3)?.auto_finish();
        for entry in &self.entries {
            entry.write_bytes(&mut writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Loads an index from a sidecar path, validating it against the source.
    ///
    /// The sidecar must carry the `.vsx` suffix appended to the source file's
    /// own name (`genome.seq` → `genome.seq.vsx`); the source must still
    /// exist and match the size recorded when the sidecar was written.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let sidecar = path.as_ref();
        let display = sidecar.to_string_lossy().to_string();
        let Some(upstream) = display.strip_suffix(&format!(".{INDEX_EXTENSION}")) else {
            return Err(IndexError::MissingUpstreamFile(display).into());
        };
        let source_size = std::fs::metadata(upstream)?.len();

        let mut reader = File::open(sidecar).map(BufReader::new)?;
        let header = IndexHeader::from_reader(&mut reader)?;
        if header.source_bytes() != source_size {
            return Err(IndexError::ByteSizeMismatch(source_size, header.source_bytes()).into());
        }

        let buffer = {
            let mut buffer = Vec::new();
            let mut decoder = Decoder::new(reader)?;
            decoder.read_to_end(&mut buffer)?;
            buffer
        };

        let mut index = Self::new(header.source_bytes());
        let mut cursor = &buffer[..];
        while !cursor.is_empty() {
            index.push(RecordEntry::from_reader(&mut cursor)?);
        }
        Ok(index)
    }
}
