//! Chat service orchestrating session lifecycle and message persistence.
//!
//! Generic over `ChatStore` so appforge-core never depends on
//! appforge-infra. The session invariant lives here: a ChatSession row
//! exists before any message row referencing it is written, enforced by
//! running the upsert synchronously before every append.

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use appforge_types::chat::{ChatMessage, ChatSession, MessageRole};
use appforge_types::error::RepositoryError;

use crate::chat::store::ChatStore;

/// Default display title for lazily created sessions.
const DEFAULT_TITLE: &str = "New Chat";

/// Orchestrates chat session lifecycle and message persistence.
pub struct ChatService<S: ChatStore> {
    store: S,
}

impl<S: ChatStore> ChatService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist a message, creating the session on first use.
    ///
    /// Two sequential calls with the same `chat_uuid` append two rows
    /// under one session.
    pub async fn save_message(
        &self,
        user_id: &str,
        chat_uuid: &str,
        role: MessageRole,
        content: String,
        title: Option<&str>,
    ) -> Result<(ChatSession, ChatMessage), RepositoryError> {
        let session = self
            .store
            .upsert_session(user_id, chat_uuid, title.unwrap_or(DEFAULT_TITLE))
            .await?;

        let message = ChatMessage {
            id: Uuid::now_v7(),
            chat_id: session.id,
            role,
            content,
            created_at: Utc::now(),
        };
        self.store.append_message(&message).await?;

        Ok((session, message))
    }

    /// Best-effort variant of [`save_message`](Self::save_message).
    ///
    /// Persistence failures here are logged and swallowed: the pipeline
    /// never aborts a user-visible generation because a row failed to
    /// write. Non-transactional by contract.
    pub async fn save_message_best_effort(
        &self,
        user_id: &str,
        chat_uuid: &str,
        role: MessageRole,
        content: String,
    ) {
        if let Err(e) = self
            .save_message(user_id, chat_uuid, role, content, None)
            .await
        {
            warn!(
                chat_uuid = %chat_uuid,
                role = %role,
                error = %e,
                "message persistence failed, continuing"
            );
        }
    }

    /// A session with its messages in creation order, or None.
    pub async fn get_history(
        &self,
        user_id: &str,
        chat_uuid: &str,
    ) -> Result<Option<(ChatSession, Vec<ChatMessage>)>, RepositoryError> {
        let Some(session) = self.store.get_session(user_id, chat_uuid).await? else {
            return Ok(None);
        };
        let messages = self.store.get_messages(&session.id).await?;
        Ok(Some((session, messages)))
    }

    /// All of a user's sessions, most recently updated first, without
    /// their messages.
    pub async fn list_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        self.store.list_sessions(user_id).await
    }
}
