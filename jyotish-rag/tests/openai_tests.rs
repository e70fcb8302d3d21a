//! Provider error-taxonomy tests against a stub HTTP server.

use jyotish_rag::embedding::EmbeddingProvider;
use jyotish_rag::completion::{ChatMessage, CompletionModel};
use jyotish_rag::openai::{OpenAiChatModel, OpenAiEmbedder};
use jyotish_rag::RagError;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_model(server: &MockServer, model: &str) -> OpenAiChatModel {
    OpenAiChatModel::new("test-key")
        .unwrap()
        .with_model(model)
        .with_base_url(&server.uri())
        .unwrap()
}

fn question() -> Vec<ChatMessage> {
    vec![ChatMessage::system("policy"), ChatMessage::user("question")]
}

#[tokio::test]
async fn model_not_found_maps_to_model_misconfigured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "model_not_found", "message": "The model does not exist" }
        })))
        .mount(&server)
        .await;

    let model = chat_model(&server, "gpt-nonexistent");
    let err = model.complete(&question(), 0.4, 600).await.unwrap_err();

    match err {
        RagError::ModelMisconfigured { model, message } => {
            assert_eq!(model, "gpt-nonexistent", "error must name the configured model id");
            assert!(message.contains("does not exist"));
        }
        other => panic!("expected ModelMisconfigured, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_maps_to_retryable_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": "rate_limit_exceeded", "message": "Slow down" }
        })))
        .mount(&server)
        .await;

    let model = chat_model(&server, "gpt-4o-mini");
    let err = model.complete(&question(), 0.4, 600).await.unwrap_err();
    assert!(err.is_retryable(), "429 must map to the retryable class, got {err:?}");
}

#[tokio::test]
async fn generic_http_failure_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "messages must not be empty" }
        })))
        .mount(&server)
        .await;

    let model = chat_model(&server, "gpt-4o-mini");
    let err = model.complete(&question(), 0.4, 600).await.unwrap_err();

    match err {
        RagError::Completion { status, message, .. } => {
            assert_eq!(status, Some(400));
            assert!(message.contains("messages must not be empty"));
        }
        other => panic!("expected Completion, got {other:?}"),
    }
}

#[tokio::test]
async fn successful_completion_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Mars rules courage.  " } }
            ]
        })))
        .mount(&server)
        .await;

    let model = chat_model(&server, "gpt-4o-mini");
    let answer = model.complete(&question(), 0.4, 600).await.unwrap();
    // The raw completion is returned as-is; trimming is the guard's job.
    assert_eq!(answer, "  Mars rules courage.  ");
}

#[tokio::test]
async fn embeddings_enforce_the_configured_dimension() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "embedding": [0.1, 0.2] } ]
        })))
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new("test-key")
        .unwrap()
        .with_model("text-embedding-3-small", 2)
        .with_base_url(&server.uri())
        .unwrap();
    assert_eq!(embedder.embed("hello world").await.unwrap(), vec![0.1, 0.2]);

    let strict = OpenAiEmbedder::new("test-key")
        .unwrap()
        .with_model("text-embedding-3-small", 1536)
        .with_base_url(&server.uri())
        .unwrap();
    let err = strict.embed("hello world").await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));
}

#[tokio::test]
async fn embedding_failure_carries_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new("test-key")
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap();
    let err = embedder.embed("hello").await.unwrap_err();
    match err {
        RagError::Embedding { provider, message } => {
            assert_eq!(provider, "OpenAI");
            assert!(message.contains("500"));
        }
        other => panic!("expected Embedding, got {other:?}"),
    }
}
