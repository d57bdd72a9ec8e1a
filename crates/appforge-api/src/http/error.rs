//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

use appforge_types::error::{RepositoryError, WebhookError};
use appforge_types::quota::QuotaSnapshot;

/// API-level errors, each mapped to an HTTP status and a flat JSON body
/// of the form `{"error": "...", "code": "..."}`.
#[derive(Debug)]
pub enum AppError {
    /// 401. Missing or unrecognized session token.
    Unauthorized,
    /// 429. Token quota gate rejected the request; carries the usage
    /// snapshot so the client can render consumption.
    QuotaExceeded(QuotaSnapshot),
    /// 400. Malformed or incomplete request payload.
    Validation(String),
    /// 404.
    NotFound(String),
    /// 400. Webhook signature problems.
    Webhook(WebhookError),
    /// 500.
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound("record".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<WebhookError> for AppError {
    fn from(e: WebhookError) -> Self {
        Self::Webhook(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, usage) = match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "authentication required".to_string(),
                None,
            ),
            Self::QuotaExceeded(snapshot) => (
                StatusCode::TOO_MANY_REQUESTS,
                "QUOTA_EXCEEDED",
                "AI token limit exceeded".to_string(),
                Some(snapshot),
            ),
            Self::Validation(message) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message, None)
            }
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{what} not found"),
                None,
            ),
            Self::Webhook(e) => {
                warn!(error = %e, "webhook rejected");
                (
                    StatusCode::BAD_REQUEST,
                    "WEBHOOK_ERROR",
                    e.to_string(),
                    None,
                )
            }
            Self::Internal(message) => {
                error!(error = %message, "internal error");
                let message = if message.is_empty() {
                    "internal server error".to_string()
                } else {
                    message
                };
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message, None)
            }
        };

        let mut body = json!({ "error": message, "code": code });
        if let Some(snapshot) = usage {
            body["usage"] = json!({
                "totalTokens": snapshot.total_tokens,
                "limit": snapshot.limit,
                "percentage": snapshot.percentage,
            });
        }

        (status, Json(body)).into_response()
    }
}
