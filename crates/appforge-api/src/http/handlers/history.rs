//! Chat history retrieval.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::http::error::AppError;
use crate::http::extractors::Authenticated;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(default)]
    pub chat_uuid: Option<String>,
}

/// With `chatUuid`: one session plus its messages in creation order, or
/// 404. Without: all of the caller's sessions, most recently updated
/// first, messages omitted.
pub async fn history(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, AppError> {
    match query.chat_uuid.as_deref().filter(|s| !s.is_empty()) {
        Some(chat_uuid) => {
            let Some((session, messages)) = state
                .chat_service
                .get_history(&auth.user_id, chat_uuid)
                .await?
            else {
                return Err(AppError::NotFound("chat".to_string()));
            };
            Ok(Json(json!({
                "chat": session,
                "messages": messages,
            })))
        }
        None => {
            let chats = state.chat_service.list_sessions(&auth.user_id).await?;
            Ok(Json(json!({ "chats": chats })))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use appforge_core::quota::QuotaTracker;

    use crate::http::handlers::testing::{
        ScriptedGateway, body_json, get_authed, post_json, test_router,
    };

    #[tokio::test]
    async fn test_unauthenticated_history_is_401() {
        let quota = Arc::new(QuotaTracker::new(0));
        let (_dir, router, _state) = test_router(ScriptedGateway::new(), quota).await;

        let request = axum::http::Request::builder()
            .method("GET")
            .uri("/api/v1/chat/history")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_chat_uuid_is_404() {
        let quota = Arc::new(QuotaTracker::new(0));
        let (_dir, router, _state) = test_router(ScriptedGateway::new(), quota).await;

        let response = router
            .oneshot(get_authed("/api/v1/chat/history?chatUuid=nope"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_single_chat_includes_messages() {
        let quota = Arc::new(QuotaTracker::new(0));
        let (_dir, router, _state) = test_router(ScriptedGateway::new(), quota).await;

        let save = json!({ "chatUuid": "chat-1", "message": "hello", "role": "user" });
        router
            .clone()
            .oneshot(post_json("/api/v1/chat/save-message", save))
            .await
            .unwrap();

        let response = router
            .oneshot(get_authed("/api/v1/chat/history?chatUuid=chat-1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["chat"]["chat_uuid"], "chat-1");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[tokio::test]
    async fn test_list_sorted_by_recency() {
        let quota = Arc::new(QuotaTracker::new(0));
        let (_dir, router, _state) = test_router(ScriptedGateway::new(), quota).await;

        for uuid in ["chat-old", "chat-new"] {
            let save = json!({ "chatUuid": uuid, "message": "hi", "role": "user" });
            router
                .clone()
                .oneshot(post_json("/api/v1/chat/save-message", save))
                .await
                .unwrap();
        }
        // Touch the older chat so it becomes the most recent.
        let save = json!({ "chatUuid": "chat-old", "message": "again", "role": "user" });
        router
            .clone()
            .oneshot(post_json("/api/v1/chat/save-message", save))
            .await
            .unwrap();

        let response = router
            .oneshot(get_authed("/api/v1/chat/history"))
            .await
            .unwrap();
        let body = body_json(response).await;
        let chats = body["chats"].as_array().unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0]["chat_uuid"], "chat-old");
        assert_eq!(chats[1]["chat_uuid"], "chat-new");
    }
}
