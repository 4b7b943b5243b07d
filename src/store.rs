//! Blob store capability backing the task repository.
//!
//! The repository needs exactly two things from its storage: fetch the blob
//! for a key and replace it wholesale. A filesystem directory, an embedded
//! database, or an in-memory map can all satisfy that, which keeps the
//! repository logic storage-agnostic.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

/// Key-value persistence capability.
pub trait BlobStore {
    /// Fetch the blob stored under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`.
    fn set(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

impl<S: BlobStore + ?Sized> BlobStore for &S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<()> {
        (**self).set(key, bytes)
    }
}

/// Filesystem-backed blob store: one file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl BlobStore for FsBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(&path)?))
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<()> {
        write_atomic(&self.key_path(key), bytes)
    }
}

/// Write data atomically using temp file + rename, so readers never see a
/// partially written blob.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// In-memory blob store for tests and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(blobs.get(key).cloned())
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_roundtrips() {
        let store = MemoryBlobStore::new();
        assert!(store.get("missing").unwrap().is_none());

        store.set("blob", b"first").unwrap();
        assert_eq!(store.get("blob").unwrap().unwrap(), b"first");

        store.set("blob", b"second").unwrap();
        assert_eq!(store.get("blob").unwrap().unwrap(), b"second");
    }

    #[test]
    fn fs_store_roundtrips() {
        let temp = TempDir::new().unwrap();
        let store = FsBlobStore::new(temp.path());

        assert!(store.get("tasks.json").unwrap().is_none());

        store.set("tasks.json", b"{\"tasks\":[]}").unwrap();
        assert_eq!(store.get("tasks.json").unwrap().unwrap(), b"{\"tasks\":[]}");
    }

    #[test]
    fn fs_store_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let store = FsBlobStore::new(temp.path());

        store.set("tasks.json", b"{}").unwrap();

        assert!(temp.path().join("tasks.json").exists());
        assert!(!temp.path().join("tasks.tmp").exists());
    }
}
