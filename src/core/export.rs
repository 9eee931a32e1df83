//! Transcript export in JSON and plain text

use crate::infrastructure::entities::{Chat, Message, MessageType};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

#[derive(Serialize)]
struct ChatInfo<'a> {
    id: i64,
    uuid: &'a str,
    waiting: bool,
    ai: bool,
}

#[derive(Serialize)]
struct TranscriptMessage<'a> {
    id: i64,
    chat_id: i64,
    message: &'a str,
    message_type: &'a str,
    ai: Option<bool>,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a Message> for TranscriptMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            id: message.id,
            chat_id: message.chat_id,
            message: &message.message,
            message_type: match message.message_type {
                MessageType::Question => "question",
                MessageType::Answer => "answer",
            },
            ai: message.ai,
            created_at: message.created_at,
        }
    }
}

#[derive(Serialize)]
struct Transcript<'a> {
    #[serde(rename = "chatInfo")]
    chat_info: ChatInfo<'a>,
    messages: Vec<TranscriptMessage<'a>>,
}

/// Serializes one chat and its thread for download. Pure, the caller brings
/// the rows.
pub fn export_transcript(
    chat: &Chat,
    messages: &[Message],
    format: ExportFormat,
) -> Result<Vec<u8>, serde_json::Error> {
    match format {
        ExportFormat::Json => serde_json::to_vec_pretty(&Transcript {
            chat_info: ChatInfo {
                id: chat.id,
                uuid: &chat.uuid,
                waiting: chat.waiting,
                ai: chat.ai,
            },
            messages: messages.iter().map(TranscriptMessage::from).collect(),
        }),
        ExportFormat::Text => Ok(format_chat_as_text(chat, messages).into_bytes()),
    }
}

/// Suggested download name, `chat_<id>_export.json` or `.txt`.
pub fn export_file_name(chat_id: i64, format: ExportFormat) -> String {
    let extension = match format {
        ExportFormat::Json => "json",
        ExportFormat::Text => "txt",
    };
    format!("chat_{chat_id}_export.{extension}")
}

fn format_chat_as_text(chat: &Chat, messages: &[Message]) -> String {
    let mut text = format!("Chat ID: {}\n", chat.uuid);
    text.push_str(&format!(
        "Status: {}\n",
        if chat.waiting { "Waiting" } else { "Active" }
    ));
    text.push_str(&format!(
        "Agent: {}\n\n",
        if chat.ai { "AI" } else { "Human" }
    ));
    text.push_str(&format!("CHAT HISTORY ({} messages):\n", messages.len()));
    text.push_str("-----------------------------------\n\n");

    for message in messages {
        let time = moscow_full_date(message.created_at);
        let kind = match message.message_type {
            MessageType::Question => "Q",
            MessageType::Answer => "A",
        };
        let agent = match message.ai {
            None => "Customer",
            Some(true) => "AI",
            Some(false) => "Human Agent",
        };
        text.push_str(&format!(
            "[{time}] [{kind}] [{agent}]:\n{}\n\n",
            message.message
        ));
    }
    text
}

// Transcripts are rendered in the support desk's wall clock, which has no
// daylight saving.
fn moscow_full_date(at: DateTime<Utc>) -> String {
    let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
    at.with_timezone(&moscow)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
