//! Response DTOs for service operations
//!
//! All response DTOs implement `Serialize` for JSON output and `Deserialize`
//! so they can be served from the cache.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mirror_core::DisplayConfig;

// ============================================================================
// Conversation Responses
// ============================================================================

/// One participant's view of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub id: String,
    pub owner_id: String,
    pub counterpart_id: String,
    pub mirror_id: String,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread: bool,
    pub display: DisplayConfig,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Message Responses
// ============================================================================

/// One participant's copy of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub message_type: String,
    pub mirror_message_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reaction: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    /// The sender's copy
    pub message: MessageResponse,
    /// The receiver's copy
    pub mirror_message: MessageResponse,
    /// The receiver's conversation, present only when this send created the pair
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mirror_conversation: Option<ConversationResponse>,
}

// ============================================================================
// Reaction Responses
// ============================================================================

/// Reaction now shared by both copies of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionResponse {
    pub message_id: String,
    pub mirror_message_id: String,
    pub emoji: Option<String>,
}
