//! Conversation entity <-> model mapper

use mirror_core::entities::{Conversation, DisplayConfig};
use mirror_core::value_objects::Snowflake;

use crate::models::ConversationModel;

/// Convert ConversationModel to Conversation entity
impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: Snowflake::new(model.id),
            owner_id: Snowflake::new(model.owner_id),
            counterpart_id: Snowflake::new(model.counterpart_id),
            mirror_id: Snowflake::new(model.mirror_id),
            last_message_at: model.last_message_at,
            unread: model.unread,
            display: DisplayConfig {
                nickname_owner: model.nickname_owner,
                nickname_counterpart: model.nickname_counterpart,
                color: model.color,
                emoji: model.emoji,
                background: model.background,
            },
            created_at: model.created_at,
        }
    }
}

/// Conversation entity reference prepared for insertion
pub struct ConversationInsert<'a> {
    pub id: i64,
    pub owner_id: i64,
    pub counterpart_id: i64,
    pub mirror_id: i64,
    pub nickname_owner: Option<&'a str>,
    pub nickname_counterpart: Option<&'a str>,
    pub color: Option<&'a str>,
    pub emoji: Option<&'a str>,
    pub background: Option<&'a str>,
}

impl<'a> ConversationInsert<'a> {
    pub fn new(conversation: &'a Conversation) -> Self {
        let display = &conversation.display;
        Self {
            id: conversation.id.into_inner(),
            owner_id: conversation.owner_id.into_inner(),
            counterpart_id: conversation.counterpart_id.into_inner(),
            mirror_id: conversation.mirror_id.into_inner(),
            nickname_owner: display.nickname_owner.as_deref(),
            nickname_counterpart: display.nickname_counterpart.as_deref(),
            color: display.color.as_deref(),
            emoji: display.emoji.as_deref(),
            background: display.background.as_deref(),
        }
    }
}
