//! Blob provider contract
//!
//! The capability set shared by all blob backends. The single-file store in
//! this crate is one implementation; sibling providers (filesystem-per-key,
//! in-memory, network-backed) and the multi-provider façade that chains them
//! implement and consume the same surface.

use std::io::Write;

use crate::error::Result;

/// Key-addressed blob storage.
///
/// All implementations must satisfy these invariants:
/// - Blobs are opaque byte sequences; the provider never interprets them.
/// - `add_blob` is add-if-absent, never overwrite: an existing key makes the
///   call a no-op signalled by `Ok(false)`.
/// - Existence conflicts are expected outcomes and are reported through the
///   boolean return value, never through `Err`.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlobProvider: Send + Sync {
    /// Copy the blob stored under `key` into `dest`.
    ///
    /// Returns `Ok(false)` without touching `dest` if the key is absent.
    fn get_blob(&self, key: &str, dest: &mut dyn Write) -> Result<bool>;

    /// Store `bytes` under `key` if the key is absent.
    ///
    /// Returns `Ok(false)` without mutation if the key already exists.
    fn add_blob(&self, key: &str, bytes: &[u8]) -> Result<bool>;

    /// Remove the blob stored under `key`. Returns whether it existed.
    fn remove_blob(&self, key: &str) -> Result<bool>;

    /// Check whether a blob exists under `key`.
    fn blob_exists(&self, key: &str) -> Result<bool>;

    /// Return, in input order, every key of `keys` that is not stored.
    ///
    /// Default implementation calls `blob_exists` per key. Backends may
    /// override to answer under a single lock or round-trip.
    fn missing_blobs(&self, keys: &[&str]) -> Result<Vec<String>> {
        let mut missing = Vec::new();
        for key in keys {
            if !self.blob_exists(key)? {
                missing.push((*key).to_string());
            }
        }
        Ok(missing)
    }
}
