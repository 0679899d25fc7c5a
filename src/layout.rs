//! File layout
//!
//! The physical format of the single backing file.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Header (12 bytes)                                        │
//! │   FormatVersion: i32 (4) | IndexPointer: u64 (8)         │
//! ├──────────────────────────────────────────────────────────┤
//! │ Data Region (variable)                                   │
//! │   blob payloads and superseded index backups,            │
//! │   interleaved by history of writes                       │
//! ├──────────────────────────────────────────────────────────┤
//! │ Current Index (at IndexPointer)                          │
//! │   Len: u32 (4) | JSON map key → {location,size}          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. `IndexPointer` always addresses the most
//! recently committed, complete serialized index: it is the last field
//! written during any mutation and therefore the commit marker.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{BlobFileError, Result};

// =============================================================================
// Shared Constants
// =============================================================================

/// The single supported format version
pub const FORMAT_VERSION: i32 = 1;

/// Header size: FormatVersion (4) + IndexPointer (8) = 12 bytes
pub const HEADER_SIZE: u64 = 12;

/// Byte offset of the IndexPointer field within the header
pub const INDEX_PTR_OFFSET: u64 = 4;

// =============================================================================
// File Header
// =============================================================================

/// The fixed-size file prefix: format version plus current index pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Format version tag; must equal [`FORMAT_VERSION`]
    pub version: i32,
    /// Byte offset of the current valid serialized index
    pub index_ptr: u64,
}

impl FileHeader {
    /// Header for a freshly initialized file: the empty index sits
    /// immediately past the header.
    pub fn initial() -> Self {
        Self {
            version: FORMAT_VERSION,
            index_ptr: HEADER_SIZE,
        }
    }

    /// Read and validate a header from the start of `reader`
    ///
    /// Fails with `UnsupportedVersion` before the pointer is trusted if the
    /// version tag is not the single known value.
    pub fn read_from(reader: &mut impl Read) -> Result<Self> {
        let mut header = [0u8; HEADER_SIZE as usize];
        reader.read_exact(&mut header)?;

        let version = i32::from_le_bytes(header[0..4].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(BlobFileError::UnsupportedVersion(version));
        }

        let index_ptr = u64::from_le_bytes(header[4..12].try_into().unwrap());

        Ok(Self { version, index_ptr })
    }

    /// Write the header at the current position of `writer`
    pub fn write_to(&self, writer: &mut impl Write) -> Result<()> {
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&self.index_ptr.to_le_bytes())?;
        Ok(())
    }
}

/// Overwrite the header's IndexPointer field with `ptr`
///
/// This single 8-byte write is the commit point of every mutation: a crash
/// before it leaves the header addressing the previous index.
pub fn write_index_ptr(file: &mut File, ptr: u64) -> Result<()> {
    file.seek(SeekFrom::Start(INDEX_PTR_OFFSET))?;
    file.write_all(&ptr.to_le_bytes())?;
    Ok(())
}
