//! Error types for blobfile
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using BlobFileError
pub type Result<T> = std::result::Result<T, BlobFileError>;

/// Unified error type for blobfile operations
#[derive(Debug, Error)]
pub enum BlobFileError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("store is not initialized")]
    NotInitialized,

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(i32),

    #[error("index corruption detected: {0}")]
    IndexCorrupted(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("index serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Limit Errors
    // -------------------------------------------------------------------------
    #[error("blob of {0} bytes exceeds the 32-bit size field")]
    BlobTooLarge(usize),
}
