//! Explicit message persistence.
//!
//! Streamed responses are not persisted server-side; the client calls
//! this endpoint once the stream has been drained. Also used to attach
//! a title to a session.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use appforge_types::llm::MessageRole;

use crate::http::error::AppError;
use crate::http::extractors::Authenticated;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMessageRequest {
    #[serde(default)]
    pub chat_uuid: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

pub async fn save_message(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(body): Json<SaveMessageRequest>,
) -> Result<Json<Value>, AppError> {
    let chat_uuid = body
        .chat_uuid
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("chatUuid is required".to_string()))?;
    let message = body
        .message
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("message is required".to_string()))?;
    let role: MessageRole = body
        .role
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("role is required".to_string()))?
        .parse()
        .map_err(AppError::Validation)?;

    let (session, _) = state
        .chat_service
        .save_message(
            &auth.user_id,
            chat_uuid,
            role,
            message.to_string(),
            body.title.as_deref(),
        )
        .await?;

    debug!(
        user_id = %auth.user_id,
        chat_uuid = %session.chat_uuid,
        role = %role,
        "message saved"
    );

    Ok(Json(json!({
        "success": true,
        "chatId": session.id,
        "chatUuid": session.chat_uuid,
    })))
}
