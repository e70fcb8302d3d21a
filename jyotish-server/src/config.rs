//! Server configuration, resolved once from the environment at startup.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};

/// Runtime settings for the service.
///
/// Everything has a sane default except the API credential. The base URL is
/// normalized by the provider constructors, so a bad value fails at startup
/// rather than on the first request.
#[derive(Debug, Clone)]
pub struct Settings {
    /// OpenAI API key. Required; no default.
    pub openai_api_key: String,
    /// Chat model id for final answers.
    pub openai_chat_model: String,
    /// Embedding model id for semantic retrieval.
    pub openai_embedding_model: String,
    /// Output dimensionality of the embedding model.
    pub openai_embedding_dimensions: usize,
    /// OpenAI-compatible API base URL.
    pub openai_base_url: String,
    /// Directory where the file-backed index persists collections.
    pub index_dir: PathBuf,
    /// Collection name for the domain knowledge.
    pub collection: String,
    /// Candidates retrieved per query.
    pub top_k: usize,
    /// Hard cap on combined evidence characters passed to the model.
    pub max_context_chars: usize,
    /// Directory holding the domain source JSON for ingestion.
    pub domain_data_dir: PathBuf,
    /// Path to the house-lords table for chart interpretation.
    pub house_lords_path: PathBuf,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw.parse::<T>().with_context(|| format!("invalid {name}: '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Settings {
    /// Resolve settings from the environment.
    ///
    /// # Errors
    ///
    /// Fails when `OPENAI_API_KEY` is absent or a numeric override does not
    /// parse — startup-time failures, by design.
    pub fn from_env() -> anyhow::Result<Self> {
        let Ok(openai_api_key) = env::var("OPENAI_API_KEY") else {
            bail!("OPENAI_API_KEY must be set");
        };

        Ok(Self {
            openai_api_key,
            openai_chat_model: var_or("OPENAI_CHAT_MODEL", "gpt-4o-mini"),
            openai_embedding_model: var_or("OPENAI_EMBEDDING_MODEL", "text-embedding-3-large"),
            openai_embedding_dimensions: parse_or("OPENAI_EMBEDDING_DIMENSIONS", 3072)?,
            openai_base_url: var_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            index_dir: PathBuf::from(var_or("INDEX_DIR", "./index_storage")),
            collection: var_or("COLLECTION", "astrology_knowledge"),
            top_k: parse_or("TOP_K", 5)?,
            max_context_chars: parse_or("MAX_CONTEXT_CHARS", 4000)?,
            domain_data_dir: PathBuf::from(var_or("DOMAIN_DATA_DIR", "./data/domain")),
            house_lords_path: PathBuf::from(var_or(
                "HOUSE_LORDS_PATH",
                "./data/house_lords.json",
            )),
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8000)))?,
        })
    }
}
