//! Storage backend abstraction for Heart Heist.
//!
//! This crate defines the [`StorageBackend`] trait — a pure key-value storage
//! interface that knows nothing about scenes, stages, or templates. The scene
//! library in `heartheist-core` wraps a storage backend and decides which keys
//! exist and what they contain.
//!
//! Two implementations are provided:
//!
//! - [`FsBackend`] — production default, one file per key inside a directory
//! - [`MemoryBackend`] — in-memory, for tests and ephemeral deployments

mod error;
mod fs_backend;
mod memory;

pub use error::StorageError;
pub use fs_backend::FsBackend;
pub use memory::MemoryBackend;

/// A pluggable key-value storage backend.
///
/// Keys are flat UTF-8 names such as `vault.html`. Values are opaque byte
/// arrays; callers decide the encoding.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails, or
    /// [`StorageError::InvalidKey`] if the key is not a flat name.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a key-value pair, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails, or
    /// [`StorageError::InvalidKey`] if the key is not a flat name.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// List all keys that start with the given prefix, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::List`] if the underlying backend fails.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`get`](StorageBackend::get) and checks
    /// for `Some`. Backends may override this with a more efficient check.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Reject keys that could escape a flat namespace.
///
/// Shared by every backend so that in-memory tests catch the same bad keys the
/// filesystem backend would.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0'])
        || key.starts_with('.');
    if bad {
        return Err(StorageError::InvalidKey {
            reason: format!("'{key}' is not a flat key name"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_names_are_valid() {
        assert!(validate_key("vault.html").is_ok());
        assert!(validate_key("finale_2.html").is_ok());
    }

    #[test]
    fn traversal_and_separators_are_rejected() {
        for key in ["", ".", "..", "../etc/passwd", "a/b", "a\\b", ".hidden", "nul\0"] {
            assert!(
                matches!(validate_key(key), Err(StorageError::InvalidKey { .. })),
                "{key:?} should be rejected"
            );
        }
    }
}
