//! File-backed store shared between the app and the service extension
//!
//! The whole store is a single JSON object on disk. Every operation takes an
//! exclusive advisory lock on a sibling `.lock` file, so read-modify-write
//! cycles from different processes never interleave. Writes go to a temp
//! file that is renamed over the document.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::debug;

use super::{KeyValueStore, StoreKey, StoreValue, UpdateFn};
use crate::error::StoreError;

type Document = BTreeMap<String, StoreValue>;

/// JSON file implementation of KeyValueStore
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

/// A locked snapshot of the document; the lock is released on drop
struct Locked {
    _guard: File,
    path: PathBuf,
    document: Document,
}

impl FileStore {
    /// Create a store backed by `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn lock(&self) -> Result<Locked, StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || lock_blocking(path))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    async fn commit(locked: Locked) -> Result<(), StoreError> {
        tokio::task::spawn_blocking(move || write_document(&locked.path, &locked.document))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

fn lock_blocking(path: PathBuf) -> Result<Locked, StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let guard = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(&path))?;
    FileExt::lock_exclusive(&guard)?;

    let document = read_document(&path)?;
    Ok(Locked {
        _guard: guard,
        path,
        document,
    })
}

fn read_document(path: &Path) -> Result<Document, StoreError> {
    if !path.exists() {
        return Ok(Document::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Document::new());
    }
    serde_json::from_str(&content).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn write_document(path: &Path, document: &Document) -> Result<(), StoreError> {
    let content =
        serde_json::to_string_pretty(document).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    debug!(path = %path.display(), keys = document.len(), "Store persisted");
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &StoreKey) -> Result<Option<StoreValue>, StoreError> {
        let locked = self.lock().await?;
        Ok(locked.document.get(&key.as_key()).cloned())
    }

    async fn set(&self, key: &StoreKey, value: StoreValue) -> Result<(), StoreError> {
        let mut locked = self.lock().await?;
        locked.document.insert(key.as_key(), value);
        Self::commit(locked).await
    }

    async fn remove(&self, key: &StoreKey) -> Result<Option<StoreValue>, StoreError> {
        let mut locked = self.lock().await?;
        let removed = locked.document.remove(&key.as_key());
        if removed.is_some() {
            Self::commit(locked).await?;
        }
        Ok(removed)
    }

    async fn update(
        &self,
        key: &StoreKey,
        f: UpdateFn<'_>,
    ) -> Result<Option<StoreValue>, StoreError> {
        let mut locked = self.lock().await?;
        let name = key.as_key();
        let next = f(locked.document.get(&name).cloned());
        match &next {
            Some(value) => {
                locked.document.insert(name, value.clone());
            }
            None => {
                locked.document.remove(&name);
            }
        }
        Self::commit(locked).await?;
        Ok(next)
    }
}
