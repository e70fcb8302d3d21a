use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use jyotish_rag::{
    ChatMessage, CompletionModel, EmbeddingProvider, InMemoryVectorStore, RagConfig, RagError,
    RagPipeline, Result as RagResult, Tag, Unit,
};
use jyotish_server::interpret::HouseLordsMap;
use jyotish_server::routes::router;
use jyotish_server::state::AppState;

const DIMS: usize = 16;

struct HashEmbedder;

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        let mut v = vec![0.0f32; DIMS];
        for (i, b) in text.bytes().enumerate() {
            v[i % DIMS] += f32::from(b) / 255.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(f32::EPSILON);
        Ok(v.into_iter().map(|x| x / norm).collect())
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

struct StaticModel(&'static str);

#[async_trait]
impl CompletionModel for StaticModel {
    fn model_id(&self) -> &str {
        "static-test-model"
    }

    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _temperature: f32,
        _max_output_tokens: u32,
    ) -> RagResult<String> {
        Ok(self.0.to_string())
    }
}

struct UnavailableModel;

#[async_trait]
impl CompletionModel for UnavailableModel {
    fn model_id(&self) -> &str {
        "unavailable-test-model"
    }

    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _temperature: f32,
        _max_output_tokens: u32,
    ) -> RagResult<String> {
        Err(RagError::CompletionUnavailable {
            provider: "test".to_string(),
            message: "upstream down".to_string(),
        })
    }
}

fn pipeline(answer: &'static str) -> RagPipeline {
    pipeline_with_model(Arc::new(StaticModel(answer)))
}

fn pipeline_with_model(model: Arc<dyn CompletionModel>) -> RagPipeline {
    let config = RagConfig::builder().collection("test_knowledge").top_k(3).build().unwrap();
    RagPipeline::builder()
        .config(config)
        .embedder(Arc::new(HashEmbedder))
        .store(Arc::new(InMemoryVectorStore::new()))
        .completion(model)
        .build()
        .unwrap()
}

fn house_lords() -> HouseLordsMap {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let table = json!({
        "house_lords": [
            {
                "house_number": 1,
                "house_name": "1st House",
                "theme": "Self, body, and identity",
                "natural_lord": "Mars"
            }
        ]
    });
    write!(file, "{table}").unwrap();
    HouseLordsMap::load(file.path()).unwrap()
}

fn app(rag: RagPipeline) -> axum::Router {
    router(AppState { pipeline: Arc::new(rag), house_lords: Arc::new(house_lords()) })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(pipeline("unused"));
    let response =
        app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!({ "status": "ok", "service": "jyotish-rag" }));
}

#[tokio::test]
async fn rag_chat_returns_answer_with_previews() {
    let rag = pipeline("The Sun strengthens self-expression here.");
    rag.ingest(vec![Unit {
        text: "Planet Sun in the 1st House:\nEffect: visibility.\n".to_string(),
        tag: Tag::PlanetInHouse {
            house_number: 1,
            planet_name: "Sun".to_string(),
            source_file: "planets_in_house.json".to_string(),
        },
    }])
    .await
    .unwrap();

    let response = app(rag)
        .oneshot(post_json("/chat/rag", json!({ "query": "Sun in the first house?" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["answer"], "The Sun strengthens self-expression here.");
    let previews = body["retrieved_context_preview"].as_array().unwrap();
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0]["meta"]["type"], "planet_in_house");
    assert_eq!(previews[0]["meta"]["planet_name"], "Sun");
    assert!(previews[0]["score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn rag_chat_failure_is_opaque_500() {
    let response = app(pipeline_with_model(Arc::new(UnavailableModel)))
        .oneshot(post_json("/chat/rag", json!({ "query": "anything" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body, json!({ "detail": "RAG pipeline failure" }));
}

#[tokio::test]
async fn rag_chat_answers_on_a_fresh_deployment() {
    // No ingestion has ever run: the query must still answer, with zero
    // evidence, rather than fail.
    let response = app(pipeline("No relevant material is available."))
        .oneshot(post_json("/chat/rag", json!({ "query": "anything" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["answer"], "No relevant material is available.");
    assert_eq!(body["retrieved_context_preview"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn chart_interpret_joins_house_lords() {
    let response = app(pipeline("unused"))
        .oneshot(post_json(
            "/chart/interpret",
            json!({
                "name": "Asha",
                "houses": { "1": "Sun", "4": "Saturn" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user"]["name"], "Asha");
    // House 4 is absent from the test table, so only house 1 is interpreted.
    let interpretations = body["interpretations"].as_array().unwrap();
    assert_eq!(interpretations.len(), 1);
    assert_eq!(interpretations[0]["natural_lord"], "Mars");
    assert!(interpretations[0]["interpretation"]["host_guest_dynamics"]
        .as_str()
        .unwrap()
        .contains("naturally guided by Mars"));
}
