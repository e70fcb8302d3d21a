//! Error types for the `jyotish-rag` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval-augmented generation pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// A domain source document is missing a required structural key.
    #[error("Malformed domain data in '{source_file}': {message}")]
    MalformedDomainData {
        /// The source file whose structure is invalid.
        source_file: String,
        /// A description of the structural problem.
        message: String,
    },

    /// Normalization produced zero retrievable units; there is nothing to index.
    #[error("Domain sources produced zero retrievable units; refusing to build an empty index")]
    EmptyCorpus,

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A generic upstream failure from the completion provider.
    #[error("Completion error ({provider}): {message}")]
    Completion {
        /// The completion provider that produced the error.
        provider: String,
        /// HTTP status code, when the failure came from an HTTP response.
        status: Option<u16>,
        /// A description of the failure, including the response body when available.
        message: String,
    },

    /// A transient upstream failure (rate limit, 5xx). Safe to retry at the caller's discretion.
    #[error("Completion provider temporarily unavailable ({provider}): {message}")]
    CompletionUnavailable {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The configured completion model id is unknown or unavailable upstream.
    #[error("Model '{model}' is misconfigured or unavailable: {message}")]
    ModelMisconfigured {
        /// The offending model id, as configured.
        model: String,
        /// The upstream diagnostic.
        message: String,
    },

    /// The persisted index could not be opened or created.
    #[error("Vector index unavailable at '{location}': {message}")]
    IndexUnavailable {
        /// Filesystem path or service handle of the index.
        location: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A batch ingestion failure, identifying the unit that failed.
    #[error("Ingestion failed at unit '{unit_id}': {message}")]
    Ingestion {
        /// The id of the unit whose embedding or storage failed.
        unit_id: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl RagError {
    /// Whether the error represents a transient upstream condition that a
    /// caller may reasonably retry. The pipeline itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RagError::CompletionUnavailable { .. })
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
