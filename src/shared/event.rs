/**
 * Real-time Event System
 *
 * This module defines the events pushed to realtime subscribers. Every event
 * is published on a channel (a chat id or a user id) and carries a kebab-case
 * event name plus a JSON payload.
 */
use serde::{Deserialize, Serialize};

/// Type of real-time event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// A message was sent in a chat
    CreatedMessage,
    /// A message text was edited
    UpdatedMessage,
    /// A message was deleted
    DeletedMessage,
    /// The user was added to a new chat
    CreatedChat,
    /// A chat was renamed
    UpdatedChat,
    /// A chat was dissolved
    DeletedChat,
    /// A member left a chat
    LeftChat,
    /// Name, phone or username of the user changed
    ProfileUpdate,
    /// Avatar of the user changed
    AvatarUpdate,
}

impl EventType {
    /// Wire name used as the SSE `event:` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedMessage => "created-message",
            Self::UpdatedMessage => "updated-message",
            Self::DeletedMessage => "deleted-message",
            Self::CreatedChat => "created-chat",
            Self::UpdatedChat => "updated-chat",
            Self::DeletedChat => "deleted-chat",
            Self::LeftChat => "left-chat",
            Self::ProfileUpdate => "profile-update",
            Self::AvatarUpdate => "avatar-update",
        }
    }
}

/// Real-time event that is delivered to every subscriber of a channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealtimeEvent {
    /// Channel the event was published on
    pub channel: String,
    /// Type of event
    pub event_type: EventType,
    /// Event payload (JSON-serializable data)
    pub payload: serde_json::Value,
    /// Timestamp when event occurred (RFC 3339)
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(channel: impl Into<String>, event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            channel: channel.into(),
            event_type,
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Decode the payload into a concrete type
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, crate::shared::SharedError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}
