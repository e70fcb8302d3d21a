//! Qdrant vector store backend.
//!
//! Available behind the `qdrant` feature. Maps collections to Qdrant
//! collections configured with cosine distance; Qdrant's score for cosine
//! collections is already a similarity, so no conversion is needed to keep
//! the crate-wide higher-is-better convention. Entry text and the provenance
//! tag are stored in the point payload, the tag as a JSON string.

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::{Payload, Qdrant};
use tracing::debug;

use crate::document::{Entry, SearchResult, Tag};
use crate::error::{RagError, Result};
use crate::store::VectorStore;

const BACKEND: &str = "qdrant";

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Create a new Qdrant vector store connecting to the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(|e| RagError::IndexUnavailable {
            location: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { client })
    }

    /// Create a new Qdrant vector store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::VectorStore { backend: BACKEND.to_string(), message: e.to_string() }
    }

    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        if collections.collections.iter().any(|c| c.name == name) {
            // Qdrant itself rejects vectors whose dimension differs from the
            // collection's configured size, so mixing stays impossible.
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client.delete_collection(name).await.map_err(Self::map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, entries: &[Entry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut points = Vec::with_capacity(entries.len());
        for entry in entries {
            let tag_json = serde_json::to_string(&entry.tag).map_err(|e| RagError::VectorStore {
                backend: BACKEND.to_string(),
                message: format!("cannot serialize tag for entry '{}': {e}", entry.id),
            })?;
            let mut payload_map = serde_json::Map::new();
            payload_map
                .insert("text".to_string(), serde_json::Value::String(entry.text.clone()));
            payload_map.insert("tag".to_string(), serde_json::Value::String(tag_json));
            let payload =
                Payload::try_from(serde_json::Value::Object(payload_map)).unwrap_or_default();

            points.push(PointStruct::new(entry.id.clone(), entry.embedding.clone(), payload));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = entries.len(), "upserted entries to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let mut results = Vec::with_capacity(response.result.len());
        for scored in response.result {
            let id = scored
                .id
                .as_ref()
                .and_then(|pid| match &pid.point_id_options {
                    Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
                    Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                    None => None,
                })
                .unwrap_or_default();

            let text =
                scored.payload.get("text").and_then(Self::extract_string).unwrap_or_default();

            let tag_json = scored.payload.get("tag").and_then(Self::extract_string).ok_or_else(
                || RagError::VectorStore {
                    backend: BACKEND.to_string(),
                    message: format!("point '{id}' is missing its provenance tag"),
                },
            )?;
            let tag: Tag =
                serde_json::from_str(&tag_json).map_err(|e| RagError::VectorStore {
                    backend: BACKEND.to_string(),
                    message: format!("point '{id}' has a corrupt provenance tag: {e}"),
                })?;

            results.push(SearchResult { id, score: scored.score, text, tag });
        }

        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(Self::map_err)?;
        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }
}
