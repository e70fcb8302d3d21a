//! RAG pipeline orchestrator.
//!
//! [`RagPipeline`] wires the components together: normalize → embed → store
//! at ingestion time, retrieve → assemble → generate at query time. The two
//! flows share nothing but the vector store. Construct one pipeline per
//! process at startup and pass it by reference; there is no global instance.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::RagConfig;
use crate::context::assemble;
use crate::completion::CompletionModel;
use crate::document::{Entry, SearchResult, Unit};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::guard::GenerationGuard;
use crate::retriever::Retriever;
use crate::store::VectorStore;

/// The answer to one question together with the evidence offered to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    /// The generated answer.
    pub answer: String,
    /// Evidence previews in retrieval order, each truncated for display.
    pub evidence: Vec<SearchResult>,
}

/// The RAG pipeline orchestrator.
pub struct RagPipeline {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    retriever: Retriever,
    guard: GenerationGuard,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ensure the configured collection exists, with the embedder's dimension.
    pub async fn create_collection(&self) -> Result<()> {
        let dimensions = self.embedder.dimensions();
        self.store.create_collection(&self.config.collection, dimensions).await.map_err(|e| {
            error!(collection = %self.config.collection, error = %e, "failed to create collection");
            RagError::Pipeline(format!(
                "failed to create collection '{}': {e}",
                self.config.collection
            ))
        })
    }

    /// Ingest normalized units: assign ids, embed, upsert as one batch.
    ///
    /// Embedding calls run concurrently up to the configured bound; the first
    /// failure aborts the batch and names the failing unit. Ingestion is
    /// at-least-once and performs no deduplication — re-running appends new
    /// entries with fresh ids, so operators wanting a clean rebuild should
    /// delete the collection first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyCorpus`] if `units` is empty, before any
    /// store interaction.
    pub async fn ingest(&self, units: Vec<Unit>) -> Result<usize> {
        if units.is_empty() {
            return Err(RagError::EmptyCorpus);
        }

        self.create_collection().await?;

        let embedder = Arc::clone(&self.embedder);
        let entries: Vec<Entry> = stream::iter(units.into_iter().map(|unit| {
            let embedder = Arc::clone(&embedder);
            let id = Uuid::new_v4().to_string();
            async move {
                let embedding =
                    embedder.embed(&unit.text).await.map_err(|e| RagError::Ingestion {
                        unit_id: id.clone(),
                        message: format!("embedding failed: {e}"),
                    })?;
                Ok::<Entry, RagError>(Entry { id, text: unit.text, embedding, tag: unit.tag })
            }
        }))
        .buffered(self.config.embed_concurrency)
        .try_collect()
        .await?;

        let count = entries.len();
        self.store.upsert(&self.config.collection, &entries).await.map_err(|e| {
            error!(collection = %self.config.collection, error = %e, "upsert failed during ingestion");
            RagError::Pipeline(format!("upsert failed: {e}"))
        })?;

        info!(collection = %self.config.collection, unit_count = count, "ingested domain units");
        Ok(count)
    }

    /// Answer one question: retrieve → assemble → generate.
    ///
    /// The configured collection is created on first use, so querying before
    /// any ingestion retrieves zero evidence rather than failing. Zero
    /// retrieved evidence is not an error; the empty context still goes to
    /// generation. Returns the answer plus evidence previews truncated to
    /// `preview_chars`, in retrieval order.
    pub async fn answer(&self, question: &str) -> Result<RagAnswer> {
        self.create_collection().await?;
        let results = self.retriever.retrieve(question).await?;
        let context = assemble(&results, self.config.max_context_chars);
        let answer = self.guard.generate(question, &context).await?;

        let evidence = results
            .into_iter()
            .map(|mut r| {
                r.text = truncate_chars(&r.text, self.config.preview_chars);
                r
            })
            .collect();

        Ok(RagAnswer { answer, evidence })
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

/// Builder for constructing a [`RagPipeline`].
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    completion: Option<Arc<dyn CompletionModel>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the completion model.
    pub fn completion(mut self, completion: Arc<dyn CompletionModel>) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;
        let completion = self
            .completion
            .ok_or_else(|| RagError::Config("completion model is required".to_string()))?;

        let retriever = Retriever::new(
            Arc::clone(&embedder),
            Arc::clone(&store),
            config.collection.clone(),
            config.top_k,
        )?;
        let guard =
            GenerationGuard::new(completion, config.temperature, config.max_output_tokens);

        Ok(RagPipeline { config, embedder, store, retriever, guard })
    }
}
