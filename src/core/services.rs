//! Implementations for the service the app needs.
//!

use crate::core::notify::{ChangeNotifier, Topic};
use crate::core::traits::ChatService;
use crate::infrastructure::entities::{Chat, ChatPatch, ChatSummary, Message, NewChat, NewMessage};
use crate::infrastructure::error::StoreError;
use crate::infrastructure::traits::ChatRepository;
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};

/// Store facade that publishes a change notification after every successful
/// write, so open directory and thread views refresh themselves.
#[injectable(ChatService)]
pub struct HandoffChatService {
    repo: Ref<dyn ChatRepository>,
    notifier: Ref<ChangeNotifier>,
}

#[async_trait]
impl ChatService for HandoffChatService {
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, StoreError> {
        self.repo.list_chats().await
    }

    async fn get_chat(&self, chat_id: i64) -> Result<Chat, StoreError> {
        self.repo.get_chat(chat_id).await
    }

    async fn create_chat(&self, chat: NewChat) -> Result<Chat, StoreError> {
        let chat = self.repo.create_chat(chat).await?;
        self.notifier.publish(Topic::ChatListChanged);
        Ok(chat)
    }

    async fn update_chat(&self, chat_id: i64, patch: ChatPatch) -> Result<Chat, StoreError> {
        let chat = self.repo.update_chat(chat_id, patch).await?;
        self.notifier.publish(Topic::ChatChanged(chat_id));
        self.notifier.publish(Topic::ChatListChanged);
        Ok(chat)
    }

    async fn list_messages(&self, chat_id: i64) -> Result<Vec<Message>, StoreError> {
        self.repo.list_messages(chat_id).await
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let message = self.repo.create_message(message, Utc::now()).await?;
        self.notifier.publish(Topic::NewMessage(message.chat_id));
        self.notifier.publish(Topic::ChatListChanged);
        Ok(message)
    }
}
