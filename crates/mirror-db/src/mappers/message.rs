//! Message entity <-> model mapper

use mirror_core::entities::{Message, MessageType};
use mirror_core::error::DomainError;
use mirror_core::value_objects::{ReactionEmoji, Snowflake};

use crate::models::MessageModel;

/// Convert MessageModel to Message entity.
///
/// Columns are constrained by the schema, so a value that does not parse is
/// reported as an internal fault rather than bad input.
impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let message_type = model.message_type.parse::<MessageType>().map_err(|_| {
            DomainError::InternalError(format!(
                "message {} has unknown type {:?}",
                model.id, model.message_type
            ))
        })?;
        let reaction = model
            .reaction
            .as_deref()
            .map(str::parse::<ReactionEmoji>)
            .transpose()
            .map_err(|_| {
                DomainError::InternalError(format!("message {} has unknown reaction", model.id))
            })?;

        Ok(Message {
            id: Snowflake::new(model.id),
            conversation_id: Snowflake::new(model.conversation_id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            content: model.content,
            message_type,
            mirror_message_id: Snowflake::new(model.mirror_message_id),
            reaction,
            created_at: model.created_at,
        })
    }
}

/// Message entity reference prepared for insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: &'a str,
    pub message_type: &'static str,
    pub mirror_message_id: i64,
    pub reaction: Option<&'static str>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            conversation_id: message.conversation_id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            receiver_id: message.receiver_id.into_inner(),
            content: &message.content,
            message_type: message.message_type.as_str(),
            mirror_message_id: message.mirror_message_id.into_inner(),
            reaction: message.reaction.map(ReactionEmoji::as_str),
        }
    }
}
