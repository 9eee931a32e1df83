//! DI "Interfaces"

use crate::infrastructure::entities;
use crate::infrastructure::entities::{ChatPatch, MessageType, NewChat, NewMessage};
use crate::infrastructure::error::StoreError;
use async_trait::async_trait;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Lists all chats with their derived thread stats, most recent activity
    /// first.
    async fn list_chats(&self) -> Result<Vec<entities::ChatSummary>, StoreError>;

    /// Fetches a single chat.
    ///
    /// Returns `Err` if no chat has the given id.
    async fn get_chat(&self, chat_id: i64) -> Result<entities::Chat, StoreError>;

    /// Creates a new chat.
    async fn create_chat(&self, chat: NewChat) -> Result<entities::Chat, StoreError>;

    /// Applies a partial update to a chat's flags. Fields left unset keep
    /// their stored value.
    ///
    /// Returns `Err` if no chat has the given id.
    async fn update_chat(
        &self,
        chat_id: i64,
        patch: ChatPatch,
    ) -> Result<entities::Chat, StoreError>;

    /// Lists a chat's messages in thread order. An unknown chat id yields an
    /// empty thread.
    async fn list_messages(&self, chat_id: i64) -> Result<Vec<entities::Message>, StoreError>;

    /// Appends a raw message row.
    ///
    /// The named transitions below should be used instead where one fits.
    async fn create_message(&self, message: NewMessage) -> Result<entities::Message, StoreError>;

    /// A customer wrote in: the chat needs attention and the question joins
    /// its thread.
    async fn customer_message_arrives(
        &self,
        chat_id: i64,
        text: String,
    ) -> Result<entities::Message, StoreError> {
        self.update_chat(
            chat_id,
            ChatPatch {
                waiting: Some(true),
                ai: None,
                read: None,
            },
        )
        .await?;
        self.create_message(NewMessage {
            chat_id: Some(chat_id),
            message: Some(text),
            message_type: Some(MessageType::Question),
            ai: None,
        })
        .await
    }

    /// An operator takes the chat over from the AI responder.
    async fn take_over(&self, chat_id: i64) -> Result<entities::Chat, StoreError> {
        self.update_chat(
            chat_id,
            ChatPatch {
                waiting: Some(true),
                ai: Some(false),
                read: None,
            },
        )
        .await
    }

    /// The chat is handed back to the AI responder.
    async fn return_to_ai(&self, chat_id: i64) -> Result<entities::Chat, StoreError> {
        self.update_chat(
            chat_id,
            ChatPatch {
                waiting: Some(false),
                ai: Some(true),
                read: None,
            },
        )
        .await
    }

    /// An operator opened the thread: the chat is acknowledged and marked
    /// read. Who owns replies does not change.
    async fn operator_opens_chat(&self, chat_id: i64) -> Result<entities::Chat, StoreError> {
        self.update_chat(
            chat_id,
            ChatPatch {
                waiting: Some(false),
                ai: None,
                read: Some(true),
            },
        )
        .await
    }

    /// Whoever currently owns the chat sends a reply. Flags are left as they
    /// are.
    async fn responder_replies(
        &self,
        chat_id: i64,
        text: String,
    ) -> Result<entities::Message, StoreError> {
        let chat = self.get_chat(chat_id).await?;
        self.create_message(NewMessage {
            chat_id: Some(chat_id),
            message: Some(text),
            message_type: Some(MessageType::Answer),
            ai: Some(chat.ai),
        })
        .await
    }
}
