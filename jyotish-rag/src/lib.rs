//! Retrieval-augmented generation core for the Jyotish knowledge service.
//!
//! Answers natural-language questions about Vedic astrology reference
//! material by retrieving semantically relevant evidence from a vector index
//! and conditioning a completion call on it. The crate provides:
//!
//! - [`domain`] — normalization of structured domain records into
//!   retrievable [`Unit`]s
//! - [`embedding`] / [`completion`] — provider capability traits, with
//!   OpenAI-backed implementations in [`openai`]
//! - [`store`] — the [`VectorStore`] trait, plus in-memory
//!   ([`inmemory`]), durable file-backed ([`persist`]) and Qdrant
//!   (feature `qdrant`) backends
//! - [`retriever`], [`context`], [`guard`] — the query-time components
//! - [`pipeline`] — the [`RagPipeline`] orchestrator for batch ingestion
//!   and per-question answering
//!
//! Scores are cosine similarity everywhere: higher is more relevant.

pub mod completion;
pub mod config;
pub mod context;
pub mod document;
pub mod domain;
pub mod embedding;
pub mod error;
pub mod guard;
pub mod inmemory;
pub mod openai;
pub mod persist;
pub mod pipeline;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod retriever;
pub mod store;

pub use completion::{ChatMessage, CompletionModel, Role};
pub use config::{RagConfig, RagConfigBuilder};
pub use context::assemble;
pub use document::{Entry, SearchResult, Tag, Unit};
pub use domain::{load_domain_dir, normalize, SourceFile};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use guard::GenerationGuard;
pub use inmemory::InMemoryVectorStore;
pub use openai::{OpenAiChatModel, OpenAiEmbedder};
pub use persist::FileVectorStore;
pub use pipeline::{RagAnswer, RagPipeline, RagPipelineBuilder};
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
pub use retriever::Retriever;
pub use store::VectorStore;
