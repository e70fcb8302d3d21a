//! Query-time retrieval: embed the question, search the index.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::store::VectorStore;

/// Retrieves ranked candidates for a natural-language query.
///
/// Every call re-embeds the query and re-searches the store — no caching.
/// Embedding-provider variance between calls is an accepted limitation, not
/// something the retriever papers over.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection: String,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever over the given provider and store.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `top_k` is zero.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        top_k: usize,
    ) -> Result<Self> {
        if top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(Self { embedder, store, collection: collection.into(), top_k })
    }

    /// Embed `query` and return up to `top_k` candidates, best-first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            RagError::Pipeline(format!("query embedding failed: {e}"))
        })?;

        let results = self
            .store
            .search(&self.collection, &query_embedding, self.top_k)
            .await
            .map_err(|e| {
                error!(collection = %self.collection, error = %e, "vector store search failed");
                RagError::Pipeline(format!(
                    "search failed in collection '{}': {e}",
                    self.collection
                ))
            })?;

        debug!(query_len = query.len(), result_count = results.len(), "retrieval completed");
        Ok(results)
    }
}
