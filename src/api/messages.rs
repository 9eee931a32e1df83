//! Messages endpoints

use crate::api::ApiError;
use crate::api::messages::schemas::{CreateMessage, Message};
use crate::core::traits::ChatService;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/", post(new_message))
        .route("/:chat_id", get(chat_messages))
}

async fn chat_messages(
    Inject(chat_service): Inject<dyn ChatService>,
    Path(chat_id): Path<i64>,
) -> Result<(StatusCode, Json<Vec<Message>>), ApiError> {
    let messages = chat_service.list_messages(chat_id).await?;

    Ok((
        StatusCode::OK,
        Json(messages.into_iter().map(Message::from).collect()),
    ))
}

async fn new_message(
    Inject(chat_service): Inject<dyn ChatService>,
    Json(message): Json<CreateMessage>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let message = chat_service.create_message(message.into()).await?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum MessageType {
        Question,
        Answer,
    }

    impl From<entities::MessageType> for MessageType {
        fn from(message_type: entities::MessageType) -> Self {
            match message_type {
                entities::MessageType::Question => MessageType::Question,
                entities::MessageType::Answer => MessageType::Answer,
            }
        }
    }

    impl From<MessageType> for entities::MessageType {
        fn from(message_type: MessageType) -> Self {
            match message_type {
                MessageType::Question => entities::MessageType::Question,
                MessageType::Answer => entities::MessageType::Answer,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct CreateMessage {
        pub chat_id: Option<i64>,
        pub message: Option<String>,
        pub message_type: Option<MessageType>,
        pub ai: Option<bool>,
    }

    impl From<CreateMessage> for entities::NewMessage {
        fn from(message: CreateMessage) -> Self {
            entities::NewMessage {
                chat_id: message.chat_id,
                message: message.message,
                message_type: message.message_type.map(entities::MessageType::from),
                ai: message.ai,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct Message {
        pub id: i64,
        pub chat_id: i64,
        pub message: String,
        pub message_type: MessageType,
        pub ai: Option<bool>,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Message> for Message {
        fn from(message: entities::Message) -> Self {
            Message {
                id: message.id,
                chat_id: message.chat_id,
                message: message.message,
                message_type: message.message_type.into(),
                ai: message.ai,
                created_at: message.created_at,
            }
        }
    }
}
