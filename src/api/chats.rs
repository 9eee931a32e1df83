//! Chats endpoints

use crate::api::ApiError;
use crate::api::chats::schemas::{ChatSummary, CreateChat, UpdateChat};
use crate::core::traits::ChatService;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_chats).post(new_chat))
        .route("/:id", get(chat_by_id).patch(patch_chat))
}

async fn list_chats(
    Inject(chat_service): Inject<dyn ChatService>,
) -> Result<(StatusCode, Json<Vec<ChatSummary>>), ApiError> {
    let chats = chat_service.list_chats().await?;

    Ok((
        StatusCode::OK,
        Json(chats.into_iter().map(ChatSummary::from).collect()),
    ))
}

async fn chat_by_id(
    Inject(chat_service): Inject<dyn ChatService>,
    Path(chat_id): Path<i64>,
) -> Result<(StatusCode, Json<schemas::Chat>), ApiError> {
    let chat = chat_service.get_chat(chat_id).await?;

    Ok((StatusCode::OK, Json(chat.into())))
}

async fn new_chat(
    Inject(chat_service): Inject<dyn ChatService>,
    Json(chat): Json<CreateChat>,
) -> Result<(StatusCode, Json<schemas::Chat>), ApiError> {
    let chat = chat_service.create_chat(chat.into()).await?;

    Ok((StatusCode::CREATED, Json(chat.into())))
}

async fn patch_chat(
    Inject(chat_service): Inject<dyn ChatService>,
    Path(chat_id): Path<i64>,
    Json(patch): Json<UpdateChat>,
) -> Result<(StatusCode, Json<schemas::Chat>), ApiError> {
    let chat = chat_service.update_chat(chat_id, patch.into()).await?;

    Ok((StatusCode::OK, Json(chat.into())))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug, Default)]
    pub struct CreateChat {
        pub uuid: Option<String>,
        pub waiting: Option<bool>,
        pub ai: Option<bool>,
    }

    impl From<CreateChat> for entities::NewChat {
        fn from(chat: CreateChat) -> Self {
            entities::NewChat {
                uuid: chat.uuid,
                waiting: chat.waiting,
                ai: chat.ai,
            }
        }
    }

    /// Subset of flags to change; anything left out keeps its stored value.
    #[derive(Deserialize, Debug, Default)]
    pub struct UpdateChat {
        pub waiting: Option<bool>,
        pub ai: Option<bool>,
        pub read: Option<bool>,
    }

    impl From<UpdateChat> for entities::ChatPatch {
        fn from(patch: UpdateChat) -> Self {
            entities::ChatPatch {
                waiting: patch.waiting,
                ai: patch.ai,
                read: patch.read,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct Chat {
        pub id: i64,
        pub uuid: String,
        pub waiting: bool,
        pub ai: bool,
        pub read: bool,
    }

    impl From<entities::Chat> for Chat {
        fn from(chat: entities::Chat) -> Self {
            Chat {
                id: chat.id,
                uuid: chat.uuid,
                waiting: chat.waiting,
                ai: chat.ai,
                read: chat.read,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ChatSummary {
        pub id: i64,
        pub uuid: String,
        pub waiting: bool,
        pub ai: bool,
        pub read: bool,
        pub last_message_at: Option<DateTime<Utc>>,
        pub message_count: i64,
    }

    impl From<entities::ChatSummary> for ChatSummary {
        fn from(chat: entities::ChatSummary) -> Self {
            ChatSummary {
                id: chat.id,
                uuid: chat.uuid,
                waiting: chat.waiting,
                ai: chat.ai,
                read: chat.read,
                last_message_at: chat.last_message_at,
                message_count: chat.message_count,
            }
        }
    }
}
