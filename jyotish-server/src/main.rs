use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jyotish_rag::{
    FileVectorStore, OpenAiChatModel, OpenAiEmbedder, RagConfig, RagPipeline,
};

use jyotish_server::config::Settings;
use jyotish_server::interpret::HouseLordsMap;
use jyotish_server::routes;
use jyotish_server::state::AppState;

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
    pipeline.create_collection().await?;

    let house_lords = HouseLordsMap::load(&settings.house_lords_path)?;

    let state = AppState { pipeline: Arc::new(pipeline), house_lords: Arc::new(house_lords) };

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    info!(addr = %settings.bind_addr, "serving");
    axum::serve(listener, app).await.context("server exited")?;

    Ok(())
}
