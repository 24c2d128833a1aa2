pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::Role;

/// Maximum length of a chat title derived from its first message.
const TITLE_MAX_CHARS: usize = 50;

/// A chat owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One persisted message within a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Errors from the persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
    #[error("Chat not found: {0}")]
    ChatNotFound(Uuid),
}

/// Repository interface for chats and messages.
///
/// The narrow contract the boundary layer consumes; the agent core
/// never touches it.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Returns the given chat id, or creates a fresh chat for the user
    /// titled after the first message.
    async fn get_or_create_chat(
        &self,
        user_id: &str,
        chat_id: Option<Uuid>,
        first_message: &str,
    ) -> Result<Uuid, StoreError>;

    /// Appends one message to a chat and bumps the chat's updated
    /// timestamp.
    async fn append_message(
        &self,
        chat_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<(), StoreError>;

    /// Lists a chat's messages in append order.
    async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<MessageRecord>, StoreError>;

    /// Lists a user's chats, most recently updated first.
    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatRecord>, StoreError>;

    /// Replaces a chat's title.
    async fn update_title(&self, chat_id: Uuid, title: &str) -> Result<(), StoreError>;
}

/// Derives a chat title from its first message.
pub fn chat_title(first_message: &str) -> String {
    first_message.chars().take(TITLE_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_truncates_on_char_boundaries() {
        assert_eq!(chat_title("short"), "short");
        let long = "à".repeat(80);
        assert_eq!(chat_title(&long).chars().count(), 50);
    }
}
