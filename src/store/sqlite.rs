//! SQLite persistence backend.
//!
//! One database file with two tables, `chats` and `messages`, created
//! at startup. Timestamps are stored as RFC 3339 text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::Role;
use crate::store::{chat_title, ChatRecord, ChatStore, MessageRecord, StoreError};

/// A `ChatStore` backed by SQLite via sqlx.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `path` and runs the
    /// schema migration. Pass `":memory:"` for an ephemeral database.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite chat store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chats (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL,
                title      TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("chats table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id         TEXT PRIMARY KEY,
                chat_id    TEXT NOT NULL REFERENCES chats(id),
                role       TEXT NOT NULL,
                content    TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("messages table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_chat_created
             ON messages(chat_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("messages index: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chats_user_updated
             ON chats(user_id, updated_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("chats index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_chat(row: &SqliteRow) -> Result<ChatRecord, StoreError> {
        Ok(ChatRecord {
            id: parse_uuid(row.try_get("id").map_err(storage)?)?,
            user_id: row.try_get("user_id").map_err(storage)?,
            title: row.try_get("title").map_err(storage)?,
            created_at: parse_timestamp(row.try_get("created_at").map_err(storage)?)?,
            updated_at: parse_timestamp(row.try_get("updated_at").map_err(storage)?)?,
        })
    }

    fn row_to_message(row: &SqliteRow) -> Result<MessageRecord, StoreError> {
        let role: String = row.try_get("role").map_err(storage)?;
        Ok(MessageRecord {
            id: parse_uuid(row.try_get("id").map_err(storage)?)?,
            chat_id: parse_uuid(row.try_get("chat_id").map_err(storage)?)?,
            role: Role::parse(&role)
                .ok_or_else(|| StoreError::Storage(format!("Unknown role: {role}")))?,
            content: row.try_get("content").map_err(storage)?,
            created_at: parse_timestamp(row.try_get("created_at").map_err(storage)?)?,
        })
    }
}

fn storage(e: sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn parse_uuid(s: String) -> Result<Uuid, StoreError> {
    Uuid::parse_str(&s).map_err(|e| StoreError::Storage(format!("Invalid uuid: {e}")))
}

fn parse_timestamp(s: String) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Storage(format!("Invalid timestamp: {e}")))
}

#[async_trait]
impl ChatStore for SqliteStore {
    async fn get_or_create_chat(
        &self,
        user_id: &str,
        chat_id: Option<Uuid>,
        first_message: &str,
    ) -> Result<Uuid, StoreError> {
        if let Some(id) = chat_id {
            return Ok(id);
        }

        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO chats (id, user_id, title, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(user_id)
        .bind(chat_title(first_message))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(id)
    }

    async fn append_message(
        &self,
        chat_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();

        let updated = sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(chat_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::ChatNotFound(chat_id));
        }

        sqlx::query(
            "INSERT INTO messages (id, chat_id, role, content, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(chat_id.to_string())
        .bind(role.as_str())
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<MessageRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, chat_id, role, content, created_at
             FROM messages WHERE chat_id = ?
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(chat_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(Self::row_to_message).collect()
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, user_id, title, created_at, updated_at
             FROM chats WHERE user_id = ?
             ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(Self::row_to_chat).collect()
    }

    async fn update_title(&self, chat_id: Uuid, title: &str) -> Result<(), StoreError> {
        let updated = sqlx::query("UPDATE chats SET title = ? WHERE id = ?")
            .bind(title)
            .bind(chat_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::ChatNotFound(chat_id));
        }
        Ok(())
    }
}
