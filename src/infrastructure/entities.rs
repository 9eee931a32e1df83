//! Database entities

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Chat {
    pub id: i64,
    pub uuid: String,
    pub waiting: bool,
    pub ai: bool,
    #[sqlx(default)]
    pub read: bool,
}

/// Chat row plus the stats derived from its messages at read time.
#[derive(Debug, Clone, FromRow)]
pub struct ChatSummary {
    pub id: i64,
    pub uuid: String,
    pub waiting: bool,
    pub ai: bool,
    #[sqlx(default)]
    pub read: bool,
    pub last_message_at: Option<DateTime<Utc>>,
    pub message_count: i64,
}

/// question = customer-originated, answer = responder-originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum MessageType {
    Question,
    Answer,
}

#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    pub message: String,
    pub message_type: MessageType,
    /// NULL for customer messages, true/false for AI/human answers.
    pub ai: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a chat insert. Absent fields are bound as NULL and the schema
/// decides; the backend itself does not validate.
#[derive(Debug, Clone, Default)]
pub struct NewChat {
    pub uuid: Option<String>,
    pub waiting: Option<bool>,
    pub ai: Option<bool>,
}

/// Fields for a message append. `ai` is the stored tri-state value, so absent
/// and NULL mean the same thing here.
#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub chat_id: Option<i64>,
    pub message: Option<String>,
    pub message_type: Option<MessageType>,
    pub ai: Option<bool>,
}

/// Partial update of a chat's flags. `None` means "leave unchanged", never
/// "set to NULL"; the update COALESCEs each field with its prior value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatPatch {
    pub waiting: Option<bool>,
    pub ai: Option<bool>,
    pub read: Option<bool>,
}
