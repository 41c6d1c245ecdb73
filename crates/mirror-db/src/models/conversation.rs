//! Conversation database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: i64,
    pub owner_id: i64,
    pub counterpart_id: i64,
    pub mirror_id: i64,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread: bool,
    pub nickname_owner: Option<String>,
    pub nickname_counterpart: Option<String>,
    pub color: Option<String>,
    pub emoji: Option<String>,
    pub background: Option<String>,
    pub created_at: DateTime<Utc>,
}
