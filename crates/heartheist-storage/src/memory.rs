//! In-memory storage backend.
//!
//! Nothing survives a restart. Used by tests and by deployments that only
//! ever serve the built-in scenes.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::{StorageBackend, StorageError, validate_key};

/// A storage backend backed by a `BTreeMap` behind an async `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        self.entries
            .write()
            .await
            .insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        Ok(self.entries.read().await.contains_key(key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_roundtrip() {
        let backend = MemoryBackend::new();
        backend.put("vault.html", b"<p>hi</p>").await.unwrap();
        assert_eq!(
            backend.get("vault.html").await.unwrap(),
            Some(b"<p>hi</p>".to_vec())
        );
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("nope.html").await.unwrap(), None);
        assert!(!backend.exists("nope.html").await.unwrap());
    }

    #[tokio::test]
    async fn list_filters_by_prefix_in_order() {
        let backend = MemoryBackend::new();
        backend.put("rain.html", b"r").await.unwrap();
        backend.put("puzzle.html", b"p").await.unwrap();
        backend.put("readme.txt", b"x").await.unwrap();

        assert_eq!(
            backend.list("r").await.unwrap(),
            vec!["rain.html".to_owned(), "readme.txt".to_owned()]
        );
        assert_eq!(backend.list("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn invalid_key_is_rejected() {
        let backend = MemoryBackend::new();
        let err = backend.put("../x", b"x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { .. }));
    }
}
