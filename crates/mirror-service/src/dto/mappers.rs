//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use mirror_core::entities::{Conversation, Message};

use super::responses::{ConversationResponse, MessageResponse};

// ============================================================================
// Conversation Mappers
// ============================================================================

impl From<&Conversation> for ConversationResponse {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id.to_string(),
            owner_id: conversation.owner_id.to_string(),
            counterpart_id: conversation.counterpart_id.to_string(),
            mirror_id: conversation.mirror_id.to_string(),
            last_message_at: conversation.last_message_at,
            unread: conversation.unread,
            display: conversation.display.clone(),
            created_at: conversation.created_at,
        }
    }
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self::from(&conversation)
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.to_string(),
            sender_id: message.sender_id.to_string(),
            receiver_id: message.receiver_id.to_string(),
            content: message.content.clone(),
            message_type: message.message_type.to_string(),
            mirror_message_id: message.mirror_message_id.to_string(),
            reaction: message.reaction.map(|emoji| emoji.to_string()),
            created_at: message.created_at,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self::from(&message)
    }
}
