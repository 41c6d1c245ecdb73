//! Message entity - one participant's copy of a sent message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::Conversation;
use crate::error::DomainError;
use crate::value_objects::{ReactionEmoji, Snowflake};

/// Kind of payload a message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Text,
    Icon,
    Image,
    Voice,
    Video,
    Config,
}

impl MessageType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Icon => "ICON",
            Self::Image => "IMAGE",
            Self::Voice => "VOICE",
            Self::Video => "VIDEO",
            Self::Config => "CONFIG",
        }
    }
}

impl FromStr for MessageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEXT" => Ok(Self::Text),
            "ICON" => Ok(Self::Icon),
            "IMAGE" => Ok(Self::Image),
            "VOICE" => Ok(Self::Voice),
            "VIDEO" => Ok(Self::Video),
            "CONFIG" => Ok(Self::Config),
            other => Err(DomainError::InvalidContent(format!(
                "unknown message type {other:?}"
            ))),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub conversation_id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub content: String,
    pub message_type: MessageType,
    /// The other participant's copy of this message
    pub mirror_message_id: Snowflake,
    pub reaction: Option<ReactionEmoji>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Check whether `other` is this message's mirror (and vice versa)
    #[inline]
    pub fn is_mirror_of(&self, other: &Message) -> bool {
        self.id != other.id
            && self.mirror_message_id == other.id
            && other.mirror_message_id == self.id
    }
}

/// The sender's copy and the receiver's copy of one send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePair {
    /// Lives in the sender's conversation
    pub sent: Message,
    /// Lives in the mirror conversation
    pub mirrored: Message,
}

impl MessagePair {
    /// Build both copies from pre-allocated ids.
    ///
    /// `conversation` is the sender's view; the mirrored copy is placed in
    /// `conversation.mirror_id` with sender and receiver swapped.
    pub fn new(
        ids: (Snowflake, Snowflake),
        conversation: &Conversation,
        content: String,
        message_type: MessageType,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let (sent_id, mirrored_id) = ids;
        if conversation.owner_id == conversation.counterpart_id {
            return Err(DomainError::SelfMessage);
        }
        if content.trim().is_empty() {
            return Err(DomainError::InvalidContent(
                "content must not be empty".to_string(),
            ));
        }

        let sent = Message {
            id: sent_id,
            conversation_id: conversation.id,
            sender_id: conversation.owner_id,
            receiver_id: conversation.counterpart_id,
            content,
            message_type,
            mirror_message_id: mirrored_id,
            reaction: None,
            created_at,
        };
        let mirrored = Message {
            id: mirrored_id,
            conversation_id: conversation.mirror_id,
            sender_id: conversation.counterpart_id,
            receiver_id: conversation.owner_id,
            content: sent.content.clone(),
            mirror_message_id: sent_id,
            ..sent.clone()
        };

        Ok(Self { sent, mirrored })
    }
}
