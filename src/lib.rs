//! # blobfile
//!
//! A single-file, append-friendly blob storage engine:
//! - Arbitrary binary blobs plus a compact index inside one physical file
//! - Concurrent readers, single writer per process
//! - Crash-consistent writes via in-place index relocation
//! - Add-if-absent semantics; removals leave unreachable garbage behind
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SingleFileBlobStore                       │
//! │          (get / add / remove / exists / missing)             │
//! └───────────┬─────────────────────────────────┬───────────────┘
//!             │ shared lock                     │ exclusive lock
//!             ▼                                 ▼
//!     ┌──────────────┐                 ┌──────────────────┐
//!     │ BinaryIndex  │                 │    FileLayout    │
//!     │ (key→range)  │                 │ (header + data + │
//!     │              │                 │  index regions)  │
//!     └──────────────┘                 └──────────────────┘
//! ```
//!
//! The index is held fully in memory and re-serialized whole on every
//! mutation; blob payloads are only ever appended. The header's index
//! pointer is the last field written by any mutation, making it the commit
//! marker for crash consistency.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod index;
pub mod layout;
pub mod provider;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BlobFileError, Result};
pub use config::Config;
pub use index::{BinaryIndex, IndexEntry};
pub use provider::BlobProvider;
pub use store::SingleFileBlobStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of blobfile
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
