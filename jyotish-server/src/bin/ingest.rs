//! One-shot ingestion: loads the domain JSON files, normalizes them into
//! retrievable units, embeds them, and writes them into the index.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use jyotish_rag::{
    load_domain_dir, normalize, FileVectorStore, OpenAiChatModel, OpenAiEmbedder, RagConfig,
    RagPipeline,
};
use jyotish_server::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    let embedder = OpenAiEmbedder::new(settings.openai_api_key.clone())?
        .with_model(&settings.openai_embedding_model, settings.openai_embedding_dimensions)
        .with_base_url(&settings.openai_base_url)?;
    let chat = OpenAiChatModel::new(settings.openai_api_key.clone())?
        .with_model(&settings.openai_chat_model)
        .with_base_url(&settings.openai_base_url)?;
    let store = FileVectorStore::open(&settings.index_dir).await?;

    let rag_config = RagConfig::builder()
        .collection(&settings.collection)
        .top_k(settings.top_k)
        .max_context_chars(settings.max_context_chars)
        .build()?;

    let pipeline = RagPipeline::builder()
        .config(rag_config)
        .embedder(Arc::new(embedder))
        .store(Arc::new(store))
        .completion(Arc::new(chat))
        .build()?;

    let sources = load_domain_dir(&settings.domain_data_dir)?;
    let units = normalize(&sources)?;
    let ingested = pipeline.ingest(units).await?;

    println!(
        "Ingested {ingested} units into '{}' at {}",
        settings.collection,
        settings.index_dir.display()
    );
    Ok(())
}
