//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps collections in a `HashMap` behind a
//! `tokio::sync::RwLock`. Suitable for tests, development, and small corpora;
//! the durable counterpart is [`FileVectorStore`](crate::persist::FileVectorStore).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Entry, SearchResult};
use crate::error::{RagError, Result};
use crate::store::{CollectionData, VectorStore};

const BACKEND: &str = "InMemory";

/// An in-memory vector store with cosine-similarity search.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, CollectionData>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn unknown_collection(name: &str) -> RagError {
    RagError::VectorStore {
        backend: BACKEND.to_string(),
        message: format!("collection '{name}' does not exist"),
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        match collections.get(name) {
            Some(existing) if existing.dimensions != dimensions => {
                Err(RagError::VectorStore {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "collection '{name}' already exists with dimension {}, requested {dimensions}",
                        existing.dimensions
                    ),
                })
            }
            Some(_) => Ok(()),
            None => {
                collections.insert(name.to_string(), CollectionData::new(dimensions));
                Ok(())
            }
        }
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, entries: &[Entry]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let data = collections.get_mut(collection).ok_or_else(|| unknown_collection(collection))?;
        data.upsert(BACKEND, entries)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Tag;

    fn entry(id: &str, embedding: Vec<f32>) -> Entry {
        Entry {
            id: id.to_string(),
            text: format!("text for {id}"),
            embedding,
            tag: Tag::Planet { planet_name: "Sun".into(), source_file: "planets.json".into() },
        }
    }

    #[tokio::test]
    async fn search_returns_fewer_than_top_k_when_collection_is_small() {
        let store = InMemoryVectorStore::new();
        store.create_collection("astro", 2).await.unwrap();
        store
            .upsert("astro", &[entry("a", vec![1.0, 0.0]), entry("b", vec![0.0, 1.0])])
            .await
            .unwrap();

        let results = store.search("astro", &[1.0, 0.1], 5).await.unwrap();
        assert_eq!(results.len(), 2);
        // Best-first: the first result is the closer vector.
        assert_eq!(results[0].id, "a");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let store = InMemoryVectorStore::new();
        store.create_collection("astro", 3).await.unwrap();
        let err = store.upsert("astro", &[entry("a", vec![1.0, 0.0])]).await.unwrap_err();
        assert!(matches!(err, RagError::VectorStore { .. }));

        let err = store.create_collection("astro", 4).await.unwrap_err();
        assert!(matches!(err, RagError::VectorStore { .. }));
    }

    #[tokio::test]
    async fn mismatched_query_dimension_is_rejected_not_truncated() {
        let store = InMemoryVectorStore::new();
        store.create_collection("astro", 4).await.unwrap();
        store.upsert("astro", &[entry("a", vec![1.0, 0.0, 0.0, 0.0])]).await.unwrap();

        // A shorter query would zip-truncate against the stored vectors and
        // score 1.0; it must error instead.
        let err = store.search("astro", &[1.0, 0.0], 5).await.unwrap_err();
        assert!(matches!(err, RagError::VectorStore { .. }));

        let err = store.search("astro", &[1.0, 0.0, 0.0, 0.0, 0.0], 5).await.unwrap_err();
        assert!(matches!(err, RagError::VectorStore { .. }));
    }

    #[tokio::test]
    async fn upsert_replaces_by_id_without_growing() {
        let store = InMemoryVectorStore::new();
        store.create_collection("astro", 2).await.unwrap();
        store.upsert("astro", &[entry("a", vec![1.0, 0.0])]).await.unwrap();
        store.upsert("astro", &[entry("a", vec![0.0, 1.0])]).await.unwrap();
        assert_eq!(store.count("astro").await.unwrap(), 1);

        let results = store.search("astro", &[0.0, 1.0], 1).await.unwrap();
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn ties_resolve_by_insertion_order() {
        let store = InMemoryVectorStore::new();
        store.create_collection("astro", 2).await.unwrap();
        // Two entries equidistant from the query.
        store
            .upsert("astro", &[entry("first", vec![1.0, 0.0]), entry("second", vec![1.0, 0.0])])
            .await
            .unwrap();
        let results = store.search("astro", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results[0].id, "first");
        assert_eq!(results[1].id, "second");
    }
}
