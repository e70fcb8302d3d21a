//! Vector store trait for storing and searching embedded entries.

use async_trait::async_trait;

use crate::document::{Entry, SearchResult};
use crate::error::Result;

/// A storage backend for embedded entries with similarity search.
///
/// Implementations manage named collections of [`Entry`]s. One collection is
/// one (name, metric, dimension) triple: the metric is always cosine
/// similarity with higher-is-better scores, and the dimension is fixed when
/// the collection is created — upserts with a different vector dimension are
/// rejected rather than silently mixed.
///
/// Score ties are broken by insertion order, which is stable within one
/// process.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection with the given embedding dimension.
    ///
    /// No-op if the collection already exists with the same dimension; fails
    /// if it exists with a different one.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Upsert entries into a collection, keyed by entry id.
    ///
    /// Entries must carry embeddings of the collection's dimension. Each
    /// entry becomes visible atomically; the batch as a whole is not
    /// transactional.
    async fn upsert(&self, collection: &str, entries: &[Entry]) -> Result<()>;

    /// Search for the `top_k` entries closest to the given embedding.
    ///
    /// The query embedding must have the collection's dimension; mismatched
    /// queries are rejected, never truncated. Returns results ordered
    /// best-first by cosine similarity, fewer than `top_k` if the collection
    /// holds fewer entries.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;

    /// The number of entries currently stored in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;
}

/// In-process representation of one collection, shared by the local backends.
///
/// Entries are held in insertion order so that score ties resolve stably.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub(crate) struct CollectionData {
    pub(crate) dimensions: usize,
    pub(crate) entries: Vec<Entry>,
}

impl CollectionData {
    pub(crate) fn new(dimensions: usize) -> Self {
        Self { dimensions, entries: Vec::new() }
    }

    /// Upsert by id: replace in place when the id exists, append otherwise.
    pub(crate) fn upsert(&mut self, backend: &str, incoming: &[Entry]) -> Result<()> {
        for entry in incoming {
            if entry.embedding.len() != self.dimensions {
                return Err(crate::error::RagError::VectorStore {
                    backend: backend.to_string(),
                    message: format!(
                        "entry '{}' has dimension {} but the collection expects {}",
                        entry.id,
                        entry.embedding.len(),
                        self.dimensions
                    ),
                });
            }
            match self.entries.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => *existing = entry.clone(),
                None => self.entries.push(entry.clone()),
            }
        }
        Ok(())
    }

    /// Score all entries against `embedding` and return the best `top_k`.
    ///
    /// The query vector must have the collection's dimension; a mismatched
    /// query would otherwise zip-truncate against the stored vectors and
    /// score plausibly but wrongly.
    ///
    /// The stable sort preserves insertion order among equal scores.
    pub(crate) fn search(
        &self,
        backend: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        if embedding.len() != self.dimensions {
            return Err(crate::error::RagError::VectorStore {
                backend: backend.to_string(),
                message: format!(
                    "query has dimension {} but the collection expects {}",
                    embedding.len(),
                    self.dimensions
                ),
            });
        }
        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                id: entry.id.clone(),
                score: cosine_similarity(&entry.embedding, embedding),
                text: entry.text.clone(),
                tag: entry.tag.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
