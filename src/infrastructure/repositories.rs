//! DB Repository abstractions

use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{Chat, ChatPatch, ChatSummary, Message, NewChat, NewMessage};
use crate::infrastructure::error::StoreError;
use crate::infrastructure::traits::ChatRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use di::{Ref, injectable};

#[injectable(ChatRepository)]
pub struct DbChatRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl ChatRepository for DbChatRepository {
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, StoreError> {
        let chats = sqlx::query_as(
            "SELECT c.*, \
             (SELECT MAX(created_at) FROM messages WHERE chat_id = c.id) AS last_message_at, \
             (SELECT COUNT(*) FROM messages WHERE chat_id = c.id) AS message_count \
             FROM chats c \
             ORDER BY datetime(last_message_at) DESC NULLS LAST",
        )
        .fetch_all(&**self.connection)
        .await?;
        Ok(chats)
    }

    async fn get_chat(&self, chat_id: i64) -> Result<Chat, StoreError> {
        sqlx::query_as("SELECT * FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(&**self.connection)
            .await?
            .ok_or(StoreError::NotFound)
    }

    // Absent fields bind as NULL and the schema decides what that means.
    async fn create_chat(&self, chat: NewChat) -> Result<Chat, StoreError> {
        let chat =
            sqlx::query_as("INSERT INTO chats (uuid, waiting, ai) VALUES (?, ?, ?) RETURNING *")
                .bind(chat.uuid)
                .bind(chat.waiting)
                .bind(chat.ai)
                .fetch_one(&**self.connection)
                .await?;
        Ok(chat)
    }

    async fn update_chat(&self, chat_id: i64, patch: ChatPatch) -> Result<Chat, StoreError> {
        sqlx::query_as(
            "UPDATE chats SET \
             waiting = COALESCE(?, waiting), \
             ai = COALESCE(?, ai), \
             read = COALESCE(?, read) \
             WHERE id = ? RETURNING *",
        )
        .bind(patch.waiting)
        .bind(patch.ai)
        .bind(patch.read)
        .bind(chat_id)
        .fetch_optional(&**self.connection)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn list_messages(&self, chat_id: i64) -> Result<Vec<Message>, StoreError> {
        let messages = sqlx::query_as(
            "SELECT * FROM messages WHERE chat_id = ? ORDER BY datetime(created_at) ASC, id ASC",
        )
        .bind(chat_id)
        .fetch_all(&**self.connection)
        .await?;
        Ok(messages)
    }

    async fn create_message(
        &self,
        message: NewMessage,
        created_at: DateTime<Utc>,
    ) -> Result<Message, StoreError> {
        let message = sqlx::query_as(
            "INSERT INTO messages (chat_id, message, message_type, ai, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(message.chat_id)
        .bind(message.message)
        .bind(message.message_type)
        .bind(message.ai)
        .bind(created_at)
        .fetch_one(&**self.connection)
        .await?;
        Ok(message)
    }
}
