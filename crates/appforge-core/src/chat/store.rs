//! ChatStore trait definition.
//!
//! Persistence seam for chat sessions and messages. The implementation
//! lives in appforge-infra (`SqliteChatStore`). Uses native async fn in
//! traits (RPITIT).

use appforge_types::chat::{ChatMessage, ChatSession};
use appforge_types::error::RepositoryError;

/// Repository trait for chat session and message persistence.
pub trait ChatStore: Send + Sync {
    /// Atomically fetch the session for `(user_id, chat_uuid)`, creating
    /// it when absent.
    ///
    /// Must be race-safe: two concurrent calls for the same new pair
    /// yield one session, never two. Implementations rely on a unique
    /// constraint plus conflict-do-nothing rather than read-then-write.
    fn upsert_session(
        &self,
        user_id: &str,
        chat_uuid: &str,
        title: &str,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Look up a session by its caller-facing uuid, scoped to one user.
    fn get_session(
        &self,
        user_id: &str,
        chat_uuid: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// List a user's sessions, most recently updated first.
    fn list_sessions(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Append a message row and bump the session's `updated_at`.
    fn append_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Messages for a session, ordered by created_at ASC.
    fn get_messages(
        &self,
        chat_id: &uuid::Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;
}
