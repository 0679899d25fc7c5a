//! Binary index
//!
//! In-memory mapping from blob keys to their byte ranges in the data region,
//! plus the (de)serialization of the whole mapping as one length-prefixed
//! unit.
//!
//! ## Serialized Form
//! ```text
//! ┌──────────────┬────────────────────────────────────────┐
//! │ Len: u32 (4) │ Payload: JSON map key → {location,size} │
//! └──────────────┴────────────────────────────────────────┘
//! ```
//!
//! The mapping is always written and rewritten whole. Every mutation of the
//! store re-serializes the entire index; there is no incremental update.

use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{BlobFileError, Result};

/// Upper bound on the serialized index payload (64 MB).
///
/// A length prefix beyond this is treated as corruption rather than an
/// allocation request.
pub(crate) const MAX_INDEX_PAYLOAD: u32 = 64 * 1024 * 1024;

/// Location record for one blob: exactly where its bytes live in the file.
///
/// Entries are immutable once written; a removed key's entry is dropped from
/// the index but its bytes stay behind as unreachable garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Absolute byte offset of the blob in the file
    pub location: u64,
    /// Blob length in bytes
    pub size: u32,
}

/// In-memory mapping from blob key to its location record
///
/// Keys are unique; no ordering is guaranteed or required. One instance is
/// exclusively owned by one open store.
#[derive(Debug, Clone, Default)]
pub struct BinaryIndex {
    entries: HashMap<String, IndexEntry>,
}

impl BinaryIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff an entry exists for `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up the location record for `key`
    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.entries.get(key)
    }

    /// Insert an entry for `key`
    ///
    /// Callers gate on `contains_key` first; inserting an existing key
    /// replaces the entry.
    pub fn insert(&mut self, key: impl Into<String>, entry: IndexEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Remove the entry for `key`, returning whether removal occurred
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True iff the index holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialize the entire mapping as one length-prefixed unit
    ///
    /// Returns the full unit including the 4-byte length prefix, so callers
    /// can use `bytes.len()` directly in offset arithmetic.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = serde_json::to_vec(&self.entries)?;

        let mut bytes = Vec::with_capacity(4 + payload.len());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);

        Ok(bytes)
    }

    /// Read one length-prefixed unit from `reader` and reconstruct the mapping
    ///
    /// Reads exactly the prefixed number of payload bytes; anything following
    /// the unit is left untouched in the reader.
    pub fn from_reader(reader: &mut impl Read) -> Result<Self> {
        let mut len_bytes = [0u8; 4];
        reader.read_exact(&mut len_bytes)?;
        let len = u32::from_le_bytes(len_bytes);

        if len > MAX_INDEX_PAYLOAD {
            return Err(BlobFileError::IndexCorrupted(format!(
                "index payload length {} exceeds maximum {}",
                len, MAX_INDEX_PAYLOAD
            )));
        }

        let mut payload = vec![0u8; len as usize];
        reader.read_exact(&mut payload)?;

        let entries: HashMap<String, IndexEntry> = serde_json::from_slice(&payload)?;

        Ok(Self { entries })
    }
}
