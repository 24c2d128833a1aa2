//! In-memory store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::session::Role;
use crate::store::{chat_title, ChatRecord, ChatStore, MessageRecord, StoreError};

/// A `ChatStore` backed by process-local maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    chats: RwLock<HashMap<Uuid, ChatRecord>>,
    messages: RwLock<HashMap<Uuid, Vec<MessageRecord>>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn get_or_create_chat(
        &self,
        user_id: &str,
        chat_id: Option<Uuid>,
        first_message: &str,
    ) -> Result<Uuid, StoreError> {
        if let Some(id) = chat_id {
            return Ok(id);
        }

        let now = Utc::now();
        let chat = ChatRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: chat_title(first_message),
            created_at: now,
            updated_at: now,
        };
        let id = chat.id;
        self.chats.write().await.insert(id, chat);
        self.messages.write().await.insert(id, Vec::new());
        Ok(id)
    }

    async fn append_message(
        &self,
        chat_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        {
            let mut chats = self.chats.write().await;
            let chat = chats
                .get_mut(&chat_id)
                .ok_or(StoreError::ChatNotFound(chat_id))?;
            chat.updated_at = now;
        }

        self.messages
            .write()
            .await
            .entry(chat_id)
            .or_default()
            .push(MessageRecord {
                id: Uuid::new_v4(),
                chat_id,
                role,
                content: content.to_string(),
                created_at: now,
            });
        Ok(())
    }

    async fn list_messages(&self, chat_id: Uuid) -> Result<Vec<MessageRecord>, StoreError> {
        Ok(self
            .messages
            .read()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_chats(&self, user_id: &str) -> Result<Vec<ChatRecord>, StoreError> {
        let mut chats: Vec<ChatRecord> = self
            .chats
            .read()
            .await
            .values()
            .filter(|chat| chat.user_id == user_id)
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    async fn update_title(&self, chat_id: Uuid, title: &str) -> Result<(), StoreError> {
        let mut chats = self.chats.write().await;
        let chat = chats
            .get_mut(&chat_id)
            .ok_or(StoreError::ChatNotFound(chat_id))?;
        chat.title = title.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_chat_titled_after_first_message() {
        let store = MemoryStore::new();
        let id = store
            .get_or_create_chat("u1", None, "What's the weather in Paris?")
            .await
            .unwrap();
        let chats = store.list_chats("u1").await.unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].id, id);
        assert_eq!(chats[0].title, "What's the weather in Paris?");
    }

    #[tokio::test]
    async fn existing_chat_id_is_returned_untouched() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let got = store
            .get_or_create_chat("u1", Some(id), "ignored")
            .await
            .unwrap();
        assert_eq!(got, id);
    }

    #[tokio::test]
    async fn messages_come_back_in_append_order() {
        let store = MemoryStore::new();
        let id = store.get_or_create_chat("u1", None, "hi").await.unwrap();
        store.append_message(id, Role::User, "hi").await.unwrap();
        store
            .append_message(id, Role::Assistant, "hello")
            .await
            .unwrap();

        let messages = store.list_messages(id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn append_to_unknown_chat_fails() {
        let store = MemoryStore::new();
        let err = store
            .append_message(Uuid::new_v4(), Role::User, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ChatNotFound(_)));
    }

    #[tokio::test]
    async fn chats_sort_by_recent_activity() {
        let store = MemoryStore::new();
        let first = store.get_or_create_chat("u1", None, "one").await.unwrap();
        let second = store.get_or_create_chat("u1", None, "two").await.unwrap();
        store.append_message(first, Role::User, "bump").await.unwrap();

        let chats = store.list_chats("u1").await.unwrap();
        assert_eq!(chats[0].id, first);
        assert_eq!(chats[1].id, second);
    }
}
