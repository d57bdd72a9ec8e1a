//! Chat completion pipeline.
//!
//! Stages run in a fixed order: authentication, quota gate, best-effort
//! persistence of the latest user message, then either a multi-model
//! fan-out (materialized JSON response) or a single-model stream. A
//! fan-out in which no candidate succeeds falls through to the stream
//! path rather than erroring.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use appforge_core::fanout;
use appforge_types::config::DEFAULT_MAX_TOKENS;
use appforge_types::llm::{CompletionRequest, Message, MessageRole, StreamEvent};
use appforge_types::quota::QuotaSnapshot;

use crate::http::error::AppError;
use crate::http::extractors::Authenticated;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub model_id: Option<String>,
    /// Opaque chat identifier; generated when absent.
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub use_multiple_models: bool,
}

fn usage_json(snapshot: &QuotaSnapshot) -> Value {
    json!({
        "totalTokens": snapshot.total_tokens,
        "limit": snapshot.limit,
        "percentage": snapshot.percentage,
    })
}

pub async fn chat(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(body): Json<ChatRequest>,
) -> Result<Response, AppError> {
    if body.messages.is_empty() {
        return Err(AppError::Validation("messages must not be empty".to_string()));
    }

    // Quota gate before any model invocation or persistence.
    let snapshot = state.quota.snapshot();
    if snapshot.is_exhausted() {
        warn!(
            user_id = %auth.user_id,
            percentage = snapshot.percentage,
            "request rejected by quota gate"
        );
        return Err(AppError::QuotaExceeded(snapshot));
    }

    let chat_uuid = body
        .chat_id
        .clone()
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    // Persist the latest user message. Best effort: generation proceeds
    // even if the write fails.
    if let Some(last) = body.messages.last() {
        if last.role == MessageRole::User {
            state
                .chat_service
                .save_message_best_effort(
                    &auth.user_id,
                    &chat_uuid,
                    MessageRole::User,
                    last.content.clone(),
                )
                .await;
        }
    }

    if body.use_multiple_models {
        let outcomes = state
            .fanout
            .run(
                &state.gateway,
                &body.messages,
                body.model_id.as_deref(),
                DEFAULT_MAX_TOKENS,
            )
            .await;

        if let Some(winner) = fanout::first_success(&outcomes) {
            let text = winner.response.clone().unwrap_or_default();
            info!(
                user_id = %auth.user_id,
                model = %winner.candidate.id,
                alternatives = outcomes.iter().filter(|o| o.is_success()).count() - 1,
                "fan-out produced a winner"
            );

            state
                .chat_service
                .save_message_best_effort(
                    &auth.user_id,
                    &chat_uuid,
                    MessageRole::Assistant,
                    text.clone(),
                )
                .await;

            let alternatives: Vec<Value> = fanout::alternatives(&outcomes, winner)
                .into_iter()
                .map(|o| {
                    json!({
                        "modelName": o.candidate.name,
                        "response": o.response,
                    })
                })
                .collect();

            let payload = json!({
                "response": text,
                "modelUsed": winner.candidate.name,
                "chatId": chat_uuid,
                "tokenUsage": usage_json(&state.quota.snapshot()),
                "alternatives": alternatives,
            });
            return Ok((StatusCode::OK, Json(payload)).into_response());
        }

        warn!(
            user_id = %auth.user_id,
            candidates = outcomes.len(),
            "every fan-out candidate failed, falling back to streaming"
        );
    }

    stream_response(&state, body, chat_uuid)
}

/// Single-model streaming path. The response body is the raw text
/// deltas; metadata travels in headers so the client can associate the
/// stream with a chat and knows to call save-message afterwards.
fn stream_response(
    state: &AppState,
    body: ChatRequest,
    chat_uuid: String,
) -> Result<Response, AppError> {
    let model = body
        .model_id
        .clone()
        .unwrap_or_else(|| state.default_model.clone());

    let request = CompletionRequest {
        model: model.clone(),
        messages: body.messages,
        max_tokens: DEFAULT_MAX_TOKENS,
        temperature: None,
        stream: true,
    };

    let events = state.gateway.stream(request);
    let text_stream = events.filter_map(|event| async move {
        match event {
            Ok(StreamEvent::TextDelta { text }) => Some(Ok::<String, axum::Error>(text)),
            Ok(StreamEvent::Usage(_)) | Ok(StreamEvent::Done) => None,
            Err(e) => Some(Err(axum::Error::new(e))),
        }
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header("x-chat-id", chat_uuid)
        .header("x-model", model)
        .header("x-thinking", "true")
        .header("x-save-required", "true")
        .body(Body::from_stream(text_stream))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(response)
}
