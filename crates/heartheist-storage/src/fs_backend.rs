//! Filesystem storage backend — the production default.
//!
//! Each key is a file directly inside one directory. All filesystem calls are
//! dispatched to a blocking thread via [`tokio::task::spawn_blocking`] so the
//! async executor never stalls on disk I/O.
//!
//! Keys are validated as flat names before they touch the filesystem, so a
//! key can never address anything outside the configured directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{StorageBackend, StorageError, validate_key};

/// A storage backend that keeps one file per key inside a directory.
///
/// # Examples
///
/// ```no_run
/// # use heartheist_storage::FsBackend;
/// let backend = FsBackend::open("./stages").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: Arc<PathBuf>,
}

impl FsBackend {
    /// Open (creating if necessary) the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the directory cannot be created or
    /// the path exists but is not a directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(|e| StorageError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if !path.is_dir() {
            return Err(StorageError::Open {
                path: path.display().to_string(),
                reason: "not a directory".to_owned(),
            });
        }

        Ok(Self {
            root: Arc::new(path.to_path_buf()),
        })
    }

    /// Return the directory backing this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait::async_trait]
impl StorageBackend for FsBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let file = self.file_for(key)?;
        let key = key.to_owned();
        tokio::task::spawn_blocking(move || match std::fs::read(&file) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key,
                reason: e.to_string(),
            }),
        })
        .await
        .map_err(|e| StorageError::Read {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let file = self.file_for(key)?;
        let key = key.to_owned();
        let value = value.to_vec();
        tokio::task::spawn_blocking(move || {
            std::fs::write(&file, &value).map_err(|e| StorageError::Write {
                key,
                reason: e.to_string(),
            })
        })
        .await
        .map_err(|e| StorageError::Write {
            key: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let root = Arc::clone(&self.root);
        let prefix = prefix.to_owned();
        tokio::task::spawn_blocking(move || {
            let entries = std::fs::read_dir(root.as_path()).map_err(|e| StorageError::List {
                prefix: prefix.clone(),
                reason: e.to_string(),
            })?;

            let mut keys = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| StorageError::List {
                    prefix: prefix.clone(),
                    reason: e.to_string(),
                })?;
                if !entry.path().is_file() {
                    continue;
                }
                // Non-UTF-8 file names cannot be keys; skip them.
                let Ok(name) = entry.file_name().into_string() else {
                    tracing::debug!(path = %entry.path().display(), "skipping non-UTF-8 file name");
                    continue;
                };
                if name.starts_with(&prefix) && validate_key(&name).is_ok() {
                    keys.push(name);
                }
            }
            keys.sort();
            Ok(keys)
        })
        .await
        .map_err(|e| StorageError::List {
            prefix: String::new(),
            reason: format!("blocking task panicked: {e}"),
        })?
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let file = self.file_for(key)?;
        Ok(file.is_file())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("stages");
        let backend = FsBackend::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(backend.path(), nested.as_path());
    }

    #[tokio::test]
    async fn open_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            FsBackend::open(&file),
            Err(StorageError::Open { .. })
        ));
    }

    #[tokio::test]
    async fn put_writes_a_file_named_after_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        backend.put("finale.html", b"<h1>yes</h1>").await.unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join("finale.html")).unwrap();
        assert_eq!(on_disk, "<h1>yes</h1>");
        assert!(backend.exists("finale.html").await.unwrap());
        assert_eq!(
            backend.get("finale.html").await.unwrap(),
            Some(b"<h1>yes</h1>".to_vec())
        );
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        assert_eq!(backend.get("rain.html").await.unwrap(), None);
        assert!(!backend.exists("rain.html").await.unwrap());
    }

    #[tokio::test]
    async fn list_skips_directories_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path()).unwrap();
        backend.put("vault.html", b"v").await.unwrap();
        backend.put("puzzle.html", b"p").await.unwrap();
        std::fs::create_dir(dir.path().join("rain.html.d")).unwrap();

        assert_eq!(
            backend.list("").await.unwrap(),
            vec!["puzzle.html".to_owned(), "vault.html".to_owned()]
        );
        assert_eq!(backend.list("v").await.unwrap(), vec!["vault.html".to_owned()]);
    }

    #[tokio::test]
    async fn traversal_keys_never_reach_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::open(dir.path().join("inner")).unwrap();
        let err = backend.put("../escape.html", b"x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { .. }));
        assert!(!dir.path().join("escape.html").exists());
    }
}
