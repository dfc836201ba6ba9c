//! Chat types
//!
//! Wire types of chats and messages plus the pure helpers that turn a page of
//! messages into what a chat view renders: day separators and avatar flags.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::files::{Attachment, FileMetadata, FileUpload};

/// Public part of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub members: Vec<Profile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub text: Option<String>,
    pub author: Profile,
    pub attachments: Vec<Attachment>,
    pub chat_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of a rendered chat history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatItem {
    /// Separator shown before the first message of a day
    Date { key: String, data: DateTime<Utc> },
    /// A message; `avatar` marks the start of a run by one author
    Message {
        key: String,
        avatar: bool,
        data: Message,
    },
}

impl ChatItem {
    pub fn key(&self) -> &str {
        match self {
            Self::Date { key, .. } | Self::Message { key, .. } => key,
        }
    }
}

fn same_day(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Sort messages by creation time and interleave day separators
pub fn order_messages(messages: &[Message]) -> Vec<ChatItem> {
    let mut sorted: Vec<&Message> = messages.iter().collect();
    sorted.sort_by_key(|m| m.created_at);

    let mut ordered = Vec::with_capacity(sorted.len() * 2);
    let mut previous: Option<&Message> = None;

    for current in sorted {
        let new_day = previous.map_or(true, |p| !same_day(&p.created_at, &current.created_at));
        let avatar = new_day || previous.is_some_and(|p| p.author.id != current.author.id);

        if new_day {
            ordered.push(ChatItem::Date {
                key: format!(
                    "date-{}",
                    current.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
                ),
                data: current.created_at,
            });
        }
        ordered.push(ChatItem::Message {
            key: format!("message-{}", current.id),
            avatar,
            data: current.clone(),
        });
        previous = Some(current);
    }

    ordered
}

/// Up to two uppercase letters of a name, e.g. `JS` for `John Smith`
pub fn get_initial(name: &str) -> String {
    name.chars().filter(|c| c.is_uppercase()).take(2).collect()
}

/// Body of `POST /api/chat/{chat_id}/messages`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub files: Vec<FileMetadata>,
}

/// Stored message plus one upload slot per announced file, in request order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message: Message,
    pub uploads: Vec<FileUpload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditMessageRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameChatRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub usernames: Vec<String>,
}

/// Query of the history endpoint: how many messages the client already has
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub from: usize,
}
