//! Infrastructure traits, used for DI on higher levels

use crate::infrastructure::entities::{Chat, ChatPatch, ChatSummary, Message, NewChat, NewMessage};
use crate::infrastructure::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// All chats with their derived stats, newest activity first, NULLs last.
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, StoreError>;

    async fn get_chat(&self, chat_id: i64) -> Result<Chat, StoreError>;

    async fn create_chat(&self, chat: NewChat) -> Result<Chat, StoreError>;

    /// Partial update: fields absent from the patch keep their stored value.
    async fn update_chat(&self, chat_id: i64, patch: ChatPatch) -> Result<Chat, StoreError>;

    /// Messages of one chat in thread order. An unknown chat yields an empty
    /// list, not an error.
    async fn list_messages(&self, chat_id: i64) -> Result<Vec<Message>, StoreError>;

    async fn create_message(
        &self,
        message: NewMessage,
        created_at: DateTime<Utc>,
    ) -> Result<Message, StoreError>;
}
