use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One message in a conversation as seen by a reply engine.
///
/// Turns are created by the caller and only ever read by engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// `true` when the user wrote this turn, `false` for the assistant.
    pub is_user: bool,
    /// The text content of the turn.
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            is_user: true,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            is_user: false,
            text: text.into(),
        }
    }
}

/// The role of a message sender in the wire/history format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged message, as posted to the remote chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Converts to an engine turn. System messages count as assistant-authored.
    pub fn to_turn(&self) -> Turn {
        Turn {
            is_user: self.role == Role::User,
            text: self.content.clone(),
        }
    }
}

/// Delivery status of a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    Pending,
    Sent,
    Failed,
}

/// Represents a single persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// The unique identifier for the message.
    pub id: Uuid,
    /// Whether the user authored this message.
    #[serde(rename = "isUser")]
    pub is_user: bool,
    /// The text content of the message.
    pub text: String,
    /// Unix timestamp in milliseconds of when the message was created.
    pub ts: i64,
    /// Delivery status of the message.
    pub status: SyncStatus,
}

impl ChatRecord {
    /// Creates a record stamped with a fresh id and the current time.
    pub fn new(is_user: bool, text: impl Into<String>, status: SyncStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            is_user,
            text: text.into(),
            ts: Utc::now().timestamp_millis(),
            status,
        }
    }

    pub fn to_message(&self) -> ChatMessage {
        let role = if self.is_user { Role::User } else { Role::Assistant };
        ChatMessage::new(role, self.text.clone())
    }
}
