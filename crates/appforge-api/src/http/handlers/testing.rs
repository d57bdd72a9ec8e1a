//! Shared test fixtures for handler tests.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::Stream;
use secrecy::SecretString;
use serde_json::Value;
use tempfile::TempDir;

use appforge_core::gateway::{BoxCompletionGateway, CompletionGateway};
use appforge_core::quota::QuotaTracker;
use appforge_infra::sqlite::pool::DatabasePool;
use appforge_types::llm::{
    CompletionRequest, CompletionResponse, GatewayError, ModelCandidate, StreamEvent, Usage,
};

use crate::http::extractors::auth::hash_session_token;
use crate::http::router::build_router;
use crate::state::AppState;

pub(crate) const TEST_TOKEN: &str = "session-token-1";
pub(crate) const TEST_USER: &str = "user-1";

/// Gateway whose `complete` outcomes are scripted per model id and whose
/// `stream` replays fixed chunks. Counts invocations so tests can assert
/// the gateway was (or was not) reached.
pub(crate) struct ScriptedGateway {
    pub outcomes: HashMap<String, Result<String, String>>,
    pub stream_chunks: Vec<String>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            stream_chunks: vec!["streamed ".to_string(), "fallback".to_string()],
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn succeed(mut self, model: &str, content: &str) -> Self {
        self.outcomes
            .insert(model.to_string(), Ok(content.to_string()));
        self
    }

    pub fn fail(mut self, model: &str, error: &str) -> Self {
        self.outcomes
            .insert(model.to_string(), Err(error.to_string()));
        self
    }
}

impl CompletionGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcomes.get(&request.model) {
            Some(Ok(content)) => Ok(CompletionResponse {
                id: "cmpl-test".to_string(),
                content: content.clone(),
                model: request.model.clone(),
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            }),
            Some(Err(message)) => Err(GatewayError::Provider {
                message: message.clone(),
            }),
            None => Err(GatewayError::Provider {
                message: format!("no script for model {}", request.model),
            }),
        }
    }

    fn stream(
        &self,
        _request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send + 'static>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let events: Vec<Result<StreamEvent, GatewayError>> = self
            .stream_chunks
            .iter()
            .map(|c| Ok(StreamEvent::TextDelta { text: c.clone() }))
            .chain([
                Ok(StreamEvent::Usage(Usage {
                    input_tokens: 10,
                    output_tokens: 5,
                })),
                Ok(StreamEvent::Done),
            ])
            .collect();
        Box::pin(futures_util::stream::iter(events))
    }
}

pub(crate) fn test_roster() -> Vec<ModelCandidate> {
    vec![
        ModelCandidate::new("model/a", "Model A"),
        ModelCandidate::new("model/b", "Model B"),
        ModelCandidate::new("model/c", "Model C"),
    ]
}

/// A router backed by a temp-file database and the given gateway, with
/// one session token seeded. The TempDir must outlive the test.
pub(crate) async fn test_router(
    gateway: ScriptedGateway,
    quota: Arc<QuotaTracker>,
) -> (TempDir, Router, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let database_url = format!(
        "sqlite://{}/test.db?mode=rwc",
        dir.path().display()
    );
    let db = DatabasePool::new(&database_url).await.unwrap();

    sqlx::query(
        "INSERT INTO session_tokens (id, token_hash, user_id, created_at) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(uuid::Uuid::now_v7().to_string())
    .bind(hash_session_token(TEST_TOKEN))
    .bind(TEST_USER)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(&db.writer)
    .await
    .unwrap();

    let state = AppState::from_parts(
        db,
        BoxCompletionGateway::new(gateway),
        quota,
        test_roster(),
        "model/a".to_string(),
        Some(SecretString::from("whsec_test")),
    );
    let router = build_router(state.clone());
    (dir, router, state)
}

pub(crate) fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {TEST_TOKEN}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub(crate) fn get_authed(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {TEST_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

pub(crate) async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub(crate) async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
