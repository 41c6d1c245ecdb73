//! Conversation entity - one participant's view of a two-party thread

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Cosmetic settings for one side of a conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Nickname the owner gave themselves in this thread
    pub nickname_owner: Option<String>,
    /// Nickname the owner gave the counterpart
    pub nickname_counterpart: Option<String>,
    pub color: Option<String>,
    pub emoji: Option<String>,
    pub background: Option<String>,
}

impl DisplayConfig {
    /// The same settings seen from the counterpart's side (nicknames swapped)
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            nickname_owner: self.nickname_counterpart.clone(),
            nickname_counterpart: self.nickname_owner.clone(),
            color: self.color.clone(),
            emoji: self.emoji.clone(),
            background: self.background.clone(),
        }
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub counterpart_id: Snowflake,
    /// The counterpart's view of the same thread
    pub mirror_id: Snowflake,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread: bool,
    pub display: DisplayConfig,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Check whether `other` is this conversation's mirror (and vice versa)
    #[inline]
    pub fn is_mirror_of(&self, other: &Conversation) -> bool {
        self.id != other.id
            && self.mirror_id == other.id
            && other.mirror_id == self.id
            && self.owner_id == other.counterpart_id
            && self.counterpart_id == other.owner_id
    }

    /// Check whether this view belongs to `owner_id` and faces `counterpart_id`
    #[inline]
    pub fn is_between(&self, owner_id: Snowflake, counterpart_id: Snowflake) -> bool {
        self.owner_id == owner_id && self.counterpart_id == counterpart_id
    }

    /// Apply the metadata change a new message causes on this side
    pub fn record_message(&mut self, at: DateTime<Utc>, unread: bool) {
        self.last_message_at = Some(at);
        self.unread = unread;
    }
}

/// Two conversation records that mirror each other, built together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPair {
    /// The initiating owner's view
    pub origin: Conversation,
    /// The counterpart's view
    pub mirror: Conversation,
}

impl ConversationPair {
    /// Build both sides of a new thread from pre-allocated ids.
    ///
    /// `display` is the initiating owner's configuration; the counterpart's
    /// side receives it with the nicknames swapped.
    pub fn new(
        ids: (Snowflake, Snowflake),
        owner_id: Snowflake,
        counterpart_id: Snowflake,
        display: DisplayConfig,
    ) -> Result<Self, DomainError> {
        let (origin_id, mirror_id) = ids;
        if owner_id == counterpart_id {
            return Err(DomainError::InvalidParticipants);
        }
        if origin_id == mirror_id {
            return Err(DomainError::InternalError(
                "mirror conversations need distinct ids".to_string(),
            ));
        }

        // Microseconds, the precision the store keeps
        let now = Utc::now().trunc_subsecs(6);
        let mirror_display = display.mirrored();

        Ok(Self {
            origin: Conversation {
                id: origin_id,
                owner_id,
                counterpart_id,
                mirror_id,
                last_message_at: None,
                unread: false,
                display,
                created_at: now,
            },
            mirror: Conversation {
                id: mirror_id,
                owner_id: counterpart_id,
                counterpart_id: owner_id,
                mirror_id: origin_id,
                last_message_at: None,
                unread: false,
                display: mirror_display,
                created_at: now,
            },
        })
    }

    /// Pair two loaded records, checking the back-references
    pub fn from_loaded(origin: Conversation, mirror: Conversation) -> Result<Self, DomainError> {
        if !origin.is_mirror_of(&mirror) {
            return Err(DomainError::InternalError(format!(
                "conversation {} and {} are not a mirror pair",
                origin.id, mirror.id
            )));
        }
        Ok(Self { origin, mirror })
    }
}
