//! OpenAI-backed embedding and completion providers.
//!
//! This module is the only place in the crate that knows the provider's
//! actual endpoints and wire format. Both providers talk to an
//! OpenAI-compatible base URL, which is normalized and validated once at
//! construction time rather than patched per request.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::completion::{ChatMessage, CompletionModel};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// The default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// The dimensionality of `text-embedding-3-large`.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 3072;

/// The default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Embedding calls time out faster than completion calls.
const EMBED_TIMEOUT: Duration = Duration::from_secs(30);
const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

/// Normalize an OpenAI-compatible base URL.
///
/// Rule: trailing slashes are stripped, and `/v1` is appended when the path
/// does not already end in it. The scheme must be `http` or `https`.
///
/// # Errors
///
/// Returns [`RagError::Config`] for a non-http(s) or empty URL, so a bad
/// configuration fails at startup rather than on the first request.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(RagError::Config(format!(
            "base URL '{raw}' must start with http:// or https://"
        )));
    }
    if trimmed.ends_with("/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/v1"))
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize, Default)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Parse an upstream error body into (code, human-readable detail).
fn parse_error_body(body: &str) -> (Option<String>, String) {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => {
            let detail = parsed.error.message.unwrap_or_else(|| body.to_string());
            (parsed.error.code, detail)
        }
        Err(_) => (None, body.to_string()),
    }
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Create a new embedder with the given API key and the default model,
    /// dimensions, and base URL.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Embedding {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self {
            client: build_client(EMBED_TIMEOUT)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    /// Set the embedding model id and its output dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Set and normalize the base URL. Fails fast on an invalid URL.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::Embedding {
            provider: "OpenAI".into(),
            message: "API returned an empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "OpenAI", batch_size = texts.len(), model = %self.model, "embedding batch");

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { model: &self.model, input: texts.to_vec() })
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "embedding request failed");
                RagError::Embedding {
                    provider: "OpenAI".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let (_, detail) = parse_error_body(&body);
            error!(provider = "OpenAI", %status, "embeddings API error");
            return Err(RagError::Embedding {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse embeddings response");
            RagError::Embedding {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let embeddings: Vec<Vec<f32>> = parsed.data.into_iter().map(|d| d.embedding).collect();
        for embedding in &embeddings {
            if embedding.len() != self.dimensions {
                return Err(RagError::Embedding {
                    provider: "OpenAI".into(),
                    message: format!(
                        "expected {}-dimensional embeddings from '{}', got {}",
                        self.dimensions,
                        self.model,
                        embedding.len()
                    ),
                });
            }
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Completion model ───────────────────────────────────────────────

/// A [`CompletionModel`] backed by the OpenAI chat completions API.
pub struct OpenAiChatModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChatModel {
    /// Create a new chat model with the given API key and the default model
    /// and base URL.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Completion {
                provider: "OpenAI".into(),
                status: None,
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self {
            client: build_client(CHAT_TIMEOUT)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
        })
    }

    /// Set the chat model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set and normalize the base URL. Fails fast on an invalid URL.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    /// Map a non-success upstream response to the completion error taxonomy.
    fn map_failure(&self, status: reqwest::StatusCode, body: &str) -> RagError {
        let (code, detail) = parse_error_body(body);
        let misconfigured = status == reqwest::StatusCode::NOT_FOUND
            || code.as_deref() == Some("model_not_found");
        if misconfigured {
            return RagError::ModelMisconfigured { model: self.model.clone(), message: detail };
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return RagError::CompletionUnavailable {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            };
        }
        RagError::Completion {
            provider: "OpenAI".into(),
            status: Some(status.as_u16()),
            message: format!("API returned {status}: {detail}"),
        }
    }
}

#[async_trait]
impl CompletionModel for OpenAiChatModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String> {
        debug!(provider = "OpenAI", model = %self.model, message_count = messages.len(), "requesting completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                temperature,
                max_tokens: max_output_tokens,
                messages,
            })
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "completion request failed");
                if e.is_timeout() {
                    RagError::CompletionUnavailable {
                        provider: "OpenAI".into(),
                        message: format!("request timed out: {e}"),
                    }
                } else {
                    RagError::Completion {
                        provider: "OpenAI".into(),
                        status: None,
                        message: format!("request failed: {e}"),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "OpenAI", %status, model = %self.model, "chat API error");
            return Err(self.map_failure(status, &body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse chat response");
            RagError::Completion {
                provider: "OpenAI".into(),
                status: None,
                message: format!("failed to parse response: {e}"),
            }
        })?;

        parsed.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            RagError::Completion {
                provider: "OpenAI".into(),
                status: None,
                message: "response contained no choices".into(),
            }
        })
    }
}
