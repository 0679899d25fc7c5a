//! Single-file blob store
//!
//! The public storage engine: one physical file holding a header, an
//! append-only data region, and a relocatable serialized index.
//!
//! ## Responsibilities
//! - Open or create the backing file and load the index
//! - Expose get/add/remove/exists/missing-keys operations
//! - Enforce the locking discipline
//! - Perform the index-relocation write algorithm
//!
//! ## Concurrency Model: Shared-Reader / Exclusive-Writer
//!
//! - **Reads** (`get_blob`, `blob_exists`, `missing_blobs`): shared lock.
//!   Any number proceed in parallel; each `get_blob` opens its own
//!   read-only file handle for the byte range it needs.
//!
//! - **Writes** (`add_blob`, `remove_blob`): exclusive lock held across the
//!   whole algorithm — index mutation, blob bytes, index rewrite, and the
//!   header pointer update. Writes are strictly serialized; a reader that
//!   acquires the lock after a writer's section sees the committed index.
//!
//! The lock is process-local. Two processes opening the same file
//! concurrently can corrupt it.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{BlobFileError, Result};
use crate::index::{BinaryIndex, IndexEntry};
use crate::layout::{self, FileHeader};
use crate::provider::BlobProvider;

/// Lifecycle of a store instance; `Ready` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreState {
    Uninitialized,
    Initializing,
    Ready,
}

/// State guarded by the reader/writer lock
struct StoreInner {
    state: StoreState,
    /// The materialized index, exclusively owned by this instance
    index: BinaryIndex,
    /// Offset of the current committed index in the file
    index_ptr: u64,
}

/// A key-addressed blob store persisting all blobs plus its index inside
/// one physical file
///
/// Construct with [`SingleFileBlobStore::new`] and call
/// [`initialize`](SingleFileBlobStore::initialize) before use, or use
/// [`open`](SingleFileBlobStore::open) to do both.
pub struct SingleFileBlobStore {
    /// Store configuration
    config: Config,

    /// Index, pointer, and lifecycle state under one reader/writer lock
    inner: RwLock<StoreInner>,
}

impl SingleFileBlobStore {
    /// Create a store instance against the configured path
    ///
    /// The instance starts uninitialized; every operation fails with
    /// `NotInitialized` until [`initialize`](Self::initialize) succeeds.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            inner: RwLock::new(StoreInner {
                state: StoreState::Uninitialized,
                index: BinaryIndex::new(),
                index_ptr: layout::HEADER_SIZE,
            }),
        }
    }

    /// Create and initialize a store with the given config
    pub fn open(config: Config) -> Result<Self> {
        let store = Self::new(config);
        store.initialize()?;
        Ok(store)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified backing file
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().path(path).build())
    }

    /// Read or create the file layout and load the index
    ///
    /// - Empty or missing file: writes a fresh header (version 1, pointer
    ///   just past the header) followed by an empty serialized index.
    /// - Non-empty file: reads the header, fails with `UnsupportedVersion`
    ///   on an unknown version tag, then loads the index at the stored
    ///   pointer.
    ///
    /// Idempotent once `Ready`. A failed initialization returns the
    /// instance to its uninitialized state.
    pub fn initialize(&self) -> Result<()> {
        let mut inner = self.inner.write();

        if inner.state == StoreState::Ready {
            return Ok(());
        }
        inner.state = StoreState::Initializing;

        match self.load_or_create(&mut inner) {
            Ok(()) => {
                inner.state = StoreState::Ready;
                Ok(())
            }
            Err(e) => {
                inner.state = StoreState::Uninitialized;
                Err(e)
            }
        }
    }

    fn load_or_create(&self, inner: &mut StoreInner) -> Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.config.path)?;

        if file.metadata()?.len() == 0 {
            // Fresh file: header, then the empty index right behind it
            let header = FileHeader::initial();
            header.write_to(&mut file)?;

            let index = BinaryIndex::new();
            file.write_all(&index.to_bytes()?)?;
            self.finish_write(&mut file)?;

            inner.index = index;
            inner.index_ptr = header.index_ptr;

            tracing::info!(path = %self.config.path.display(), "created blob store file");
        } else {
            let header = FileHeader::read_from(&mut file)?;

            file.seek(SeekFrom::Start(header.index_ptr))?;
            let index = BinaryIndex::from_reader(&mut file)?;

            tracing::info!(
                path = %self.config.path.display(),
                blobs = index.len(),
                "opened blob store file"
            );

            inner.index = index;
            inner.index_ptr = header.index_ptr;
        }

        Ok(())
    }

    // =========================================================================
    // Public Operations
    // =========================================================================

    /// Copy the blob stored under `key` into `dest`
    ///
    /// Takes the shared lock; concurrent reads proceed in parallel, each on
    /// its own read-only file handle. Returns `Ok(false)` without touching
    /// `dest` if the key is absent.
    pub fn get_blob(&self, key: &str, dest: &mut impl Write) -> Result<bool> {
        let inner = self.inner.read();
        Self::ensure_ready(&inner)?;

        let entry = match inner.index.get(key) {
            Some(entry) => *entry,
            None => return Ok(false),
        };

        let mut file = File::open(&self.config.path)?;
        file.seek(SeekFrom::Start(entry.location))?;

        let mut buf = vec![0u8; entry.size as usize];
        file.read_exact(&mut buf)?;
        dest.write_all(&buf)?;

        tracing::trace!(key, size = entry.size, "blob read");
        Ok(true)
    }

    /// Store `bytes` under `key` if the key is absent
    ///
    /// Add-if-absent, never overwrite: returns `Ok(false)` without mutation
    /// when the key already exists. Holds the exclusive lock across the
    /// whole write algorithm:
    ///
    /// 1. snapshot the current serialized index (the "old index");
    /// 2. insert the new entry and serialize (the "new index");
    /// 3. write the old index to the backup offset
    ///    `index_ptr + bytes.len() + new_index.len()`, keeping it
    ///    recoverable at a derivable position while its original bytes are
    ///    overwritten;
    /// 4. write the blob at `index_ptr`, over the old index's location;
    /// 5. write the new index immediately after the blob;
    /// 6. overwrite the header's pointer field — the commit point;
    /// 7. flush/sync and close the write handle.
    pub fn add_blob(&self, key: &str, bytes: &[u8]) -> Result<bool> {
        let mut inner = self.inner.write();
        Self::ensure_ready(&inner)?;

        if inner.index.contains_key(key) {
            tracing::debug!(key, "add skipped, key already present");
            return Ok(false);
        }

        let size = u32::try_from(bytes.len())
            .map_err(|_| BlobFileError::BlobTooLarge(bytes.len()))?;

        let old_index_bytes = inner.index.to_bytes()?;

        let location = inner.index_ptr;
        inner.index.insert(key, IndexEntry { location, size });

        let written = inner
            .index
            .to_bytes()
            .and_then(|new_index_bytes| {
                self.write_blob(location, bytes, &old_index_bytes, &new_index_bytes)
            });

        match written {
            Ok(new_ptr) => {
                inner.index_ptr = new_ptr;
                tracing::debug!(key, size, "blob appended");
                Ok(true)
            }
            Err(e) => {
                // Keep the in-memory index matching the last committed one
                inner.index.remove(key);
                Err(e)
            }
        }
    }

    /// Remove the blob stored under `key`
    ///
    /// Returns `Ok(false)` if the key is absent. The blob's bytes are not
    /// reclaimed or overwritten; they become unreachable garbage. There is
    /// no compaction.
    pub fn remove_blob(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.write();
        Self::ensure_ready(&inner)?;

        let entry = match inner.index.get(key) {
            Some(entry) => *entry,
            None => return Ok(false),
        };
        inner.index.remove(key);

        if let Err(e) = self.save_index(&inner) {
            inner.index.insert(key, entry);
            return Err(e);
        }

        tracing::debug!(key, "blob removed");
        Ok(true)
    }

    /// Check whether a blob exists under `key`
    pub fn blob_exists(&self, key: &str) -> Result<bool> {
        let inner = self.inner.read();
        Self::ensure_ready(&inner)?;

        Ok(inner.index.contains_key(key))
    }

    /// Return, in input order, every key of `keys` that is not stored
    ///
    /// Answers under a single shared lock acquisition.
    pub fn missing_blobs(&self, keys: &[&str]) -> Result<Vec<String>> {
        let inner = self.inner.read();
        Self::ensure_ready(&inner)?;

        Ok(keys
            .iter()
            .filter(|key| !inner.index.contains_key(key))
            .map(|key| (*key).to_string())
            .collect())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of blobs currently indexed
    pub fn blob_count(&self) -> usize {
        self.inner.read().index.len()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn ensure_ready(inner: &StoreInner) -> Result<()> {
        if inner.state == StoreState::Ready {
            Ok(())
        } else {
            Err(BlobFileError::NotInitialized)
        }
    }

    /// Perform the on-disk half of `add_blob`; returns the new index pointer
    ///
    /// The backup lands past the end of blob + new index, so it never
    /// collides with bytes written afterwards.
    fn write_blob(
        &self,
        index_ptr: u64,
        bytes: &[u8],
        old_index_bytes: &[u8],
        new_index_bytes: &[u8],
    ) -> Result<u64> {
        let mut file = OpenOptions::new().write(true).open(&self.config.path)?;

        // Old index first, relocated to where nothing will overwrite it
        let backup_offset = index_ptr + bytes.len() as u64 + new_index_bytes.len() as u64;
        file.seek(SeekFrom::Start(backup_offset))?;
        file.write_all(old_index_bytes)?;

        // Blob payload over the old index's original location
        file.seek(SeekFrom::Start(index_ptr))?;
        file.write_all(bytes)?;

        // New index immediately behind the blob
        let new_ptr = index_ptr + bytes.len() as u64;
        file.write_all(new_index_bytes)?;

        // Commit
        layout::write_index_ptr(&mut file, new_ptr)?;
        self.finish_write(&mut file)?;

        Ok(new_ptr)
    }

    /// Persist the in-memory index in place at the current index pointer
    ///
    /// Unlike `add_blob`, the index is rewritten over its own bytes with no
    /// backup copy: a crash mid-write can leave the index torn.
    fn save_index(&self, inner: &StoreInner) -> Result<()> {
        let index_bytes = inner.index.to_bytes()?;

        let mut file = OpenOptions::new().write(true).open(&self.config.path)?;
        file.seek(SeekFrom::Start(inner.index_ptr))?;
        file.write_all(&index_bytes)?;

        layout::write_index_ptr(&mut file, inner.index_ptr)?;
        self.finish_write(&mut file)?;

        Ok(())
    }

    fn finish_write(&self, file: &mut File) -> Result<()> {
        file.flush()?;
        if self.config.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }
}

// =============================================================================
// BlobProvider Implementation
// =============================================================================

impl BlobProvider for SingleFileBlobStore {
    fn get_blob(&self, key: &str, mut dest: &mut dyn Write) -> Result<bool> {
        SingleFileBlobStore::get_blob(self, key, &mut dest)
    }

    fn add_blob(&self, key: &str, bytes: &[u8]) -> Result<bool> {
        SingleFileBlobStore::add_blob(self, key, bytes)
    }

    fn remove_blob(&self, key: &str) -> Result<bool> {
        SingleFileBlobStore::remove_blob(self, key)
    }

    fn blob_exists(&self, key: &str) -> Result<bool> {
        SingleFileBlobStore::blob_exists(self, key)
    }

    fn missing_blobs(&self, keys: &[&str]) -> Result<Vec<String>> {
        SingleFileBlobStore::missing_blobs(self, keys)
    }
}
