use crate::infrastructure::error::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use log::error;
use serde::Serialize;

pub mod chats;
pub mod messages;

pub fn router() -> Router {
    Router::new()
        .nest("/chats", chats::router())
        .nest("/messages", messages::router())
}

/// Error wire format, `{"error": "..."}`.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// What a handler can answer besides its payload. Database failures are
/// logged here and leave the process as an opaque 500.
#[derive(Debug)]
pub enum ApiError {
    ChatNotFound,
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::ChatNotFound,
            StoreError::Database(e) => {
                error!("{e}");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ChatNotFound => (StatusCode::NOT_FOUND, "Chat not found"),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
