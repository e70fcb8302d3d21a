//! Durable file-backed vector store.
//!
//! [`FileVectorStore`] keeps the working set in memory (same representation
//! as the in-memory backend) and persists each collection as one JSON
//! snapshot under a root directory: `<root>/<collection>.json`. Snapshots are
//! written to a temporary file and renamed into place, so readers of the
//! on-disk state never observe a partially written collection. Existing
//! snapshots are loaded when the store is opened.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Entry, SearchResult};
use crate::error::{RagError, Result};
use crate::store::{CollectionData, VectorStore};

const BACKEND: &str = "File";

/// A durable [`VectorStore`] persisting one JSON snapshot per collection.
#[derive(Debug)]
pub struct FileVectorStore {
    root: PathBuf,
    collections: RwLock<HashMap<String, CollectionData>>,
}

impl FileVectorStore {
    /// Open (or create) a store rooted at `root`, loading every persisted
    /// collection found there.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexUnavailable`] if the directory cannot be
    /// created or read, or if a persisted snapshot cannot be parsed.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let location = root.display().to_string();

        fs::create_dir_all(&root).await.map_err(|e| RagError::IndexUnavailable {
            location: location.clone(),
            message: format!("cannot create index directory: {e}"),
        })?;

        let mut collections = HashMap::new();
        let mut dir = fs::read_dir(&root).await.map_err(|e| RagError::IndexUnavailable {
            location: location.clone(),
            message: format!("cannot read index directory: {e}"),
        })?;
        while let Some(dirent) = dir.next_entry().await.map_err(|e| RagError::IndexUnavailable {
            location: location.clone(),
            message: format!("cannot enumerate index directory: {e}"),
        })? {
            let path = dirent.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let raw = fs::read_to_string(&path).await.map_err(|e| RagError::IndexUnavailable {
                location: location.clone(),
                message: format!("cannot read snapshot '{}': {e}", path.display()),
            })?;
            let data: CollectionData =
                serde_json::from_str(&raw).map_err(|e| RagError::IndexUnavailable {
                    location: location.clone(),
                    message: format!("corrupt snapshot '{}': {e}", path.display()),
                })?;
            debug!(collection = name, entries = data.entries.len(), "loaded collection snapshot");
            collections.insert(name.to_string(), data);
        }

        info!(root = %location, collections = collections.len(), "opened file vector store");
        Ok(Self { root, collections: RwLock::new(collections) })
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    /// Collection names double as file stems, so restrict them to a safe set.
    fn validate_name(name: &str) -> Result<()> {
        let ok = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if ok {
            Ok(())
        } else {
            Err(RagError::VectorStore {
                backend: BACKEND.to_string(),
                message: format!(
                    "invalid collection name '{name}': use ASCII letters, digits, '_' or '-'"
                ),
            })
        }
    }

    /// Persist one collection atomically: write a temp file, then rename.
    async fn flush(&self, name: &str, data: &CollectionData) -> Result<()> {
        let serialized = serde_json::to_vec(data).map_err(|e| RagError::VectorStore {
            backend: BACKEND.to_string(),
            message: format!("cannot serialize collection '{name}': {e}"),
        })?;
        let final_path = self.snapshot_path(name);
        let tmp_path = self.root.join(format!("{name}.json.tmp"));
        fs::write(&tmp_path, &serialized).await.map_err(|e| RagError::VectorStore {
            backend: BACKEND.to_string(),
            message: format!("cannot write snapshot for '{name}': {e}"),
        })?;
        fs::rename(&tmp_path, &final_path).await.map_err(|e| RagError::VectorStore {
            backend: BACKEND.to_string(),
            message: format!("cannot publish snapshot for '{name}': {e}"),
        })?;
        Ok(())
    }
}

fn unknown_collection(name: &str) -> RagError {
    RagError::VectorStore {
        backend: BACKEND.to_string(),
        message: format!("collection '{name}' does not exist"),
    }
}

#[async_trait]
impl VectorStore for FileVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        Self::validate_name(name)?;
        let mut collections = self.collections.write().await;
        match collections.get(name) {
            Some(existing) if existing.dimensions != dimensions => {
                return Err(RagError::VectorStore {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "collection '{name}' already exists with dimension {}, requested {dimensions}",
                        existing.dimensions
                    ),
                });
            }
            Some(_) => return Ok(()),
            None => {}
        }
        let data = CollectionData::new(dimensions);
        self.flush(name, &data).await?;
        collections.insert(name.to_string(), data);
        debug!(collection = name, dimensions, "created collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        match fs::remove_file(self.snapshot_path(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RagError::VectorStore {
                backend: BACKEND.to_string(),
                message: format!("cannot delete snapshot for '{name}': {e}"),
            }),
        }
    }

    async fn upsert(&self, collection: &str, entries: &[Entry]) -> Result<()> {
        // The write lock is held across the flush so concurrent upserts
        // cannot publish snapshots out of order.
        let mut collections = self.collections.write().await;
        let data = collections.get_mut(collection).ok_or_else(|| unknown_collection(collection))?;
        data.upsert(BACKEND, entries)?;
        self.flush(collection, data).await
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let data = collections.get(collection).ok_or_else(|| unknown_collection(collection))?;
        data.search(BACKEND, embedding, top_k)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let data = collections.get(collection).ok_or_else(|| unknown_collection(collection))?;
        Ok(data.entries.len())
    }
}
