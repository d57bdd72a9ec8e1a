//! SQLite chat store implementation.
//!
//! Implements `ChatStore` from `appforge-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reader for
//! SELECTs and writer for mutations.
//!
//! Session creation is an atomic upsert: `INSERT .. ON CONFLICT(user_id,
//! chat_uuid) DO NOTHING` followed by a read, so two concurrent
//! first-messages for the same new chat_uuid resolve to one session.

use appforge_core::chat::store::ChatStore;
use appforge_types::chat::{ChatMessage, ChatSession, MessageRole};
use appforge_types::error::RepositoryError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatStore`.
pub struct SqliteChatStore {
    pool: DatabasePool,
}

impl SqliteChatStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    id: String,
    chat_uuid: String,
    user_id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_uuid: row.try_get("chat_uuid")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        Ok(ChatSession {
            id,
            chat_uuid: self.chat_uuid,
            user_id: self.user_id,
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct ChatMessageRow {
    id: String,
    chat_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let chat_id = Uuid::parse_str(&self.chat_id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        Ok(ChatMessage {
            id,
            chat_id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// ChatStore implementation
// ---------------------------------------------------------------------------

impl ChatStore for SqliteChatStore {
    async fn upsert_session(
        &self,
        user_id: &str,
        chat_uuid: &str,
        title: &str,
    ) -> Result<ChatSession, RepositoryError> {
        let now = format_datetime(&Utc::now());

        // Conflict-do-nothing on the (user_id, chat_uuid) unique index;
        // a concurrent creator simply wins the race and we read its row.
        sqlx::query(
            r#"INSERT INTO chats (id, chat_uuid, user_id, title, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id, chat_uuid) DO NOTHING"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(chat_uuid)
        .bind(user_id)
        .bind(title)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query("SELECT * FROM chats WHERE user_id = ? AND chat_uuid = ?")
            .bind(user_id)
            .bind(chat_uuid)
            .fetch_one(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        ChatSessionRow::from_row(&row)
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .into_session()
    }

    async fn get_session(
        &self,
        user_id: &str,
        chat_uuid: &str,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chats WHERE user_id = ? AND chat_uuid = ?")
            .bind(user_id)
            .bind(chat_uuid)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn list_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chats WHERE user_id = ? ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                ChatSessionRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_session()
            })
            .collect()
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO messages (id, chat_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.chat_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // History lists sort on updated_at.
        sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&message.created_at))
            .bind(message.chat_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_messages(
        &self,
        chat_id: &Uuid,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE chat_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(chat_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                ChatMessageRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_message()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    async fn test_store() -> (tempfile::TempDir, SqliteChatStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, SqliteChatStore::new(pool))
    }

    fn message(chat_id: Uuid, role: MessageRole, content: &str, at: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            chat_id,
            role,
            content: content.to_string(),
            created_at: at,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_user_and_uuid() {
        let (_dir, store) = test_store().await;

        let first = store
            .upsert_session("user-1", "chat-1", "New Chat")
            .await
            .unwrap();
        let second = store
            .upsert_session("user-1", "chat-1", "Some Other Title")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        // The original title sticks; conflict-do-nothing never updates.
        assert_eq!(second.title, "New Chat");
    }

    #[tokio::test]
    async fn test_same_uuid_different_users_are_distinct_sessions() {
        let (_dir, store) = test_store().await;

        let a = store
            .upsert_session("user-1", "chat-1", "New Chat")
            .await
            .unwrap();
        let b = store
            .upsert_session("user-2", "chat-1", "New Chat")
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_messages_ordered_by_creation_time() {
        let (_dir, store) = test_store().await;
        let session = store
            .upsert_session("user-1", "chat-1", "New Chat")
            .await
            .unwrap();

        let now = Utc::now();
        // Insert out of order; the read path must sort by created_at.
        store
            .append_message(&message(
                session.id,
                MessageRole::Assistant,
                "second",
                now + Duration::seconds(2),
            ))
            .await
            .unwrap();
        store
            .append_message(&message(session.id, MessageRole::User, "first", now))
            .await
            .unwrap();

        let messages = store.get_messages(&session.id).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_append_bumps_updated_at_for_history_sort() {
        let (_dir, store) = test_store().await;

        let older = store
            .upsert_session("user-1", "chat-old", "New Chat")
            .await
            .unwrap();
        let newer = store
            .upsert_session("user-1", "chat-new", "New Chat")
            .await
            .unwrap();

        // Append to the older chat later; it should float to the top.
        store
            .append_message(&message(
                older.id,
                MessageRole::User,
                "bump",
                Utc::now() + Duration::seconds(5),
            ))
            .await
            .unwrap();

        let sessions = store.list_sessions("user-1").await.unwrap();
        assert_eq!(sessions[0].id, older.id);
        assert_eq!(sessions[1].id, newer.id);
    }

    #[tokio::test]
    async fn test_list_sessions_scoped_to_user() {
        let (_dir, store) = test_store().await;
        store
            .upsert_session("user-1", "chat-1", "New Chat")
            .await
            .unwrap();
        store
            .upsert_session("user-2", "chat-2", "New Chat")
            .await
            .unwrap();

        let sessions = store.list_sessions("user-1").await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].chat_uuid, "chat-1");
    }
}
