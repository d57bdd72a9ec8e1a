//! Session-token authentication extractor.
//!
//! Tokens arrive as `Authorization: Bearer <token>` or `X-Session-Token`.
//! Only the SHA-256 hash of a token is stored, so lookups hash the
//! presented value and match against `session_tokens.token_hash`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated caller. Resolving this extractor fails the request
/// with 401 before any handler body runs, so unauthenticated requests
/// produce no side effects.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user_id: String,
}

/// Hex SHA-256 of a session token, the form stored at rest.
pub fn hash_session_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    if let Some(value) = parts.headers.get("authorization") {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim());
            }
        }
    }
    parts
        .headers
        .get("x-session-token")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let token_hash = hash_session_token(token);
        let row: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM session_tokens WHERE token_hash = ?")
                .bind(&token_hash)
                .fetch_optional(&state.db.reader)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;

        let Some((user_id,)) = row else {
            return Err(AppError::Unauthorized);
        };

        // Touch last_used_at; a failed touch never fails the request.
        if let Err(e) = sqlx::query(
            "UPDATE session_tokens SET last_used_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
             WHERE token_hash = ?",
        )
        .bind(&token_hash)
        .execute(&state.db.writer)
        .await
        {
            warn!(error = %e, "failed to touch session token");
        }

        Ok(Authenticated { user_id })
    }
}
