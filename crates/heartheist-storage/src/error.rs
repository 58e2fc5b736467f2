//! Error types for storage backends.

/// Errors returned by a [`StorageBackend`](crate::StorageBackend).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be opened or created.
    #[error("failed to open storage at '{path}': {reason}")]
    Open { path: String, reason: String },

    /// A read failed.
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// A write failed.
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Listing keys failed.
    #[error("failed to list keys with prefix '{prefix}': {reason}")]
    List { prefix: String, reason: String },

    /// The key is not usable by this backend.
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },
}
