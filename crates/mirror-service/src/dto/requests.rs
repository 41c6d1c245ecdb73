//! Request DTOs for service operations
//!
//! All request DTOs implement `Deserialize`; those with bounded fields also
//! implement `Validate`. Snowflake ids arrive as strings.

use serde::Deserialize;
use validator::Validate;

use mirror_core::DisplayConfig;

// ============================================================================
// Conversation Requests
// ============================================================================

/// Display settings for a conversation, as seen by its owner
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DisplayRequest {
    #[validate(length(max = 64, message = "Nickname must be at most 64 characters"))]
    pub nickname_owner: Option<String>,

    #[validate(length(max = 64, message = "Nickname must be at most 64 characters"))]
    pub nickname_counterpart: Option<String>,

    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: Option<String>,

    #[validate(length(max = 32, message = "Emoji must be at most 32 characters"))]
    pub emoji: Option<String>,

    /// Background image reference
    #[validate(length(max = 255, message = "Background must be at most 255 characters"))]
    pub background: Option<String>,
}

impl From<DisplayRequest> for DisplayConfig {
    fn from(request: DisplayRequest) -> Self {
        Self {
            nickname_owner: request.nickname_owner,
            nickname_counterpart: request.nickname_counterpart,
            color: request.color,
            emoji: request.emoji,
            background: request.background,
        }
    }
}

// ============================================================================
// Message Requests
// ============================================================================

/// Send message request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Receiver user ID (Snowflake as string)
    pub receiver_id: String,

    /// Sender's conversation ID, when the pair already exists
    #[serde(default)]
    pub conversation_id: Option<String>,

    pub content: String,

    /// One of TEXT, ICON, IMAGE, VOICE, VIDEO, CONFIG. Required; a missing
    /// type is rejected as invalid content.
    #[serde(default)]
    pub message_type: Option<String>,

    /// Applied only when this send creates the conversation pair
    #[serde(default)]
    #[validate(nested)]
    pub display: Option<DisplayRequest>,
}

// ============================================================================
// Reaction Requests
// ============================================================================

/// Set or clear the reaction on a mirrored message pair
#[derive(Debug, Clone, Deserialize)]
pub struct ReactRequest {
    /// Emoji from the fixed set; absent or blank clears the reaction
    #[serde(default)]
    pub emoji: Option<String>,

    /// Message ID (Snowflake as string)
    pub message_id: String,

    /// Mirror message ID (Snowflake as string)
    pub mirror_message_id: String,
}
