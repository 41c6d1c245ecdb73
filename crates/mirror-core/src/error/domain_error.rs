//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Conversation not found: {0}")]
    ConversationNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("A conversation needs two distinct participants")]
    InvalidParticipants,

    #[error("Invalid message content: {0}")]
    InvalidContent(String),

    #[error("Cannot send a message to yourself")]
    SelfMessage,

    #[error("Invalid emoji: {0:?}")]
    InvalidEmoji(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Conversation pair already exists between {owner_id} and {counterpart_id}")]
    ConversationPairExists {
        owner_id: Snowflake,
        counterpart_id: Snowflake,
    },

    #[error("Messages {message_id} and {mirror_message_id} are not mirrors of each other")]
    MismatchedMirror {
        message_id: Snowflake,
        mirror_message_id: Snowflake,
    },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ConversationNotFound(_) => "UNKNOWN_CONVERSATION",

            // Validation
            Self::InvalidParticipants => "INVALID_PARTICIPANTS",
            Self::InvalidContent(_) => "INVALID_CONTENT",
            Self::SelfMessage => "SELF_MESSAGE",
            Self::InvalidEmoji(_) => "INVALID_EMOJI",
            Self::ValidationError(_) => "VALIDATION_ERROR",

            // Conflict
            Self::ConversationPairExists { .. } => "CONVERSATION_PAIR_EXISTS",
            Self::MismatchedMirror { .. } => "MISMATCHED_MIRROR",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ConversationNotFound(_))
    }

    /// Check if this is a validation error (rejected before any write)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidParticipants
                | Self::InvalidContent(_)
                | Self::SelfMessage
                | Self::InvalidEmoji(_)
                | Self::ValidationError(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::ConversationPairExists { .. } | Self::MismatchedMirror { .. }
        )
    }
}
