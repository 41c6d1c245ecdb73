//! Test fixtures and data generators
//!
//! Provides fresh participant ids and ready-made requests.

use std::sync::OnceLock;

use mirror_core::{Snowflake, SnowflakeGenerator};
use mirror_service::dto::{DisplayRequest, ReactRequest, SendMessageRequest};

fn ids() -> &'static SnowflakeGenerator {
    static GENERATOR: OnceLock<SnowflakeGenerator> = OnceLock::new();
    GENERATOR.get_or_init(|| SnowflakeGenerator::new(1000))
}

/// A fresh, never-seen participant id
pub fn new_user() -> Snowflake {
    ids().generate()
}

/// Two distinct fresh participants
pub fn new_users() -> (Snowflake, Snowflake) {
    (new_user(), new_user())
}

/// A TEXT message to `receiver_id` with no conversation hint
pub fn text_to(receiver_id: Snowflake, content: &str) -> SendMessageRequest {
    SendMessageRequest {
        receiver_id: receiver_id.to_string(),
        conversation_id: None,
        content: content.to_string(),
        message_type: Some("TEXT".to_string()),
        display: None,
    }
}

/// A TEXT message inside an existing conversation
pub fn text_in(receiver_id: Snowflake, conversation_id: &str, content: &str) -> SendMessageRequest {
    SendMessageRequest {
        conversation_id: Some(conversation_id.to_string()),
        ..text_to(receiver_id, content)
    }
}

/// Display settings chosen by the initiating owner
pub fn display(nickname_owner: &str, nickname_counterpart: &str) -> DisplayRequest {
    DisplayRequest {
        nickname_owner: Some(nickname_owner.to_string()),
        nickname_counterpart: Some(nickname_counterpart.to_string()),
        color: Some("#ff8800".to_string()),
        emoji: Some("🌊".to_string()),
        background: None,
    }
}

pub fn react(emoji: Option<&str>, message_id: &str, mirror_message_id: &str) -> ReactRequest {
    ReactRequest {
        emoji: emoji.map(str::to_string),
        message_id: message_id.to_string(),
        mirror_message_id: mirror_message_id.to_string(),
    }
}
