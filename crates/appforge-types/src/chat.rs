//! Chat session and message types.
//!
//! A `ChatSession` is a persisted conversation thread owned by one user,
//! addressed externally by an opaque `chat_uuid`. Messages are immutable
//! once created; ordering is by creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::llm::MessageRole;

/// A persisted conversation thread owned by one user.
///
/// Created lazily on first message when no session exists yet for the
/// `(user_id, chat_uuid)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    /// Internal id (UUID v7).
    pub id: Uuid,
    /// Caller-facing opaque identifier. Generated when not supplied.
    pub chat_uuid: String,
    /// Owning user.
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Bumped on every message append; history lists sort on it.
    pub updated_at: DateTime<Utc>,
}

/// A single message within a chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
