//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Name of the collection holding the domain knowledge.
    pub collection: String,
    /// Number of candidates requested from similarity search.
    pub top_k: usize,
    /// Hard cap on combined evidence characters passed to the model.
    pub max_context_chars: usize,
    /// Display length each evidence preview is truncated to in responses.
    pub preview_chars: usize,
    /// Sampling temperature for generation. Low by default: calm, factual.
    pub temperature: f32,
    /// Bound on generated output tokens.
    pub max_output_tokens: u32,
    /// Maximum in-flight embedding calls during a batch ingest.
    pub embed_concurrency: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            collection: "astrology_knowledge".to_string(),
            top_k: 5,
            max_context_chars: 4000,
            preview_chars: 250,
            temperature: 0.4,
            max_output_tokens: 600,
            embed_concurrency: 4,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the number of candidates requested from similarity search.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the evidence character budget.
    pub fn max_context_chars(mut self, chars: usize) -> Self {
        self.config.max_context_chars = chars;
        self
    }

    /// Set the evidence preview display length.
    pub fn preview_chars(mut self, chars: usize) -> Self {
        self.config.preview_chars = chars;
        self
    }

    /// Set the generation sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the bound on generated output tokens.
    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.config.max_output_tokens = tokens;
        self
    }

    /// Set the maximum in-flight embedding calls during ingest.
    pub fn embed_concurrency(mut self, concurrency: usize) -> Self {
        self.config.embed_concurrency = concurrency;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `collection` is empty
    /// - `top_k == 0`
    /// - `max_context_chars == 0`
    /// - `embed_concurrency == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.collection.is_empty() {
            return Err(RagError::Config("collection name must not be empty".to_string()));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.max_context_chars == 0 {
            return Err(RagError::Config(
                "max_context_chars must be greater than zero".to_string(),
            ));
        }
        if self.config.embed_concurrency == 0 {
            return Err(RagError::Config(
                "embed_concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}
